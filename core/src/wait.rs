//! One-shot predicate waits.

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures::Stream;
use pin_project_lite::pin_project;
use tracing::debug;

use crate::{Cancelled, CancellationToken, WaitForCancellationFutureOwned};

pin_project! {
    /// Future returned by [`first_where`].
    #[must_use = "futures do nothing unless polled"]
    pub struct FirstWhere<S, P> {
        #[pin]
        stream: Option<S>,
        predicate: P,
        token: CancellationToken,
        #[pin]
        cancelled: Option<WaitForCancellationFutureOwned>,
    }
}

/// Waits for the first item of `stream` that satisfies `predicate`.
///
/// The stream is dropped as soon as the future resolves, which releases its
/// tick registration. Resolves with [`Cancelled`] if `token` is cancelled
/// first or if the stream ends without a match. A match on the very first
/// poll resolves without waiting for another tick.
pub fn first_where<S, P>(stream: S, predicate: P, token: &CancellationToken) -> FirstWhere<S, P>
where
    S: Stream,
    P: FnMut(&S::Item) -> bool,
{
    FirstWhere {
        stream: Some(stream),
        predicate,
        token: token.clone(),
        cancelled: Some(token.clone().cancelled_owned()),
    }
}

impl<S, P> Future for FirstWhere<S, P>
where
    S: Stream,
    P: FnMut(&S::Item) -> bool,
{
    type Output = Result<S::Item, Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        if this.token.is_cancelled() {
            if this.stream.is_some() {
                debug!(target: "safeline::wait", "wait cancelled before a match");
            }
            this.stream.set(None);
            this.cancelled.set(None);
            return Poll::Ready(Err(Cancelled));
        }

        let outcome = loop {
            let Some(stream) = this.stream.as_mut().as_pin_mut() else {
                // Polled again after resolving.
                return Poll::Ready(Err(Cancelled));
            };
            match stream.poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if (this.predicate)(&item) {
                        break Ok(item);
                    }
                }
                Poll::Ready(None) => {
                    debug!(target: "safeline::wait", "stream ended before a match");
                    break Err(Cancelled);
                }
                Poll::Pending => {
                    let cancelled = this
                        .cancelled
                        .as_mut()
                        .as_pin_mut()
                        .is_some_and(|cancelled| cancelled.poll(cx).is_ready());
                    if !cancelled {
                        return Poll::Pending;
                    }
                    debug!(target: "safeline::wait", "wait cancelled before a match");
                    break Err(Cancelled);
                }
            }
        };

        this.stream.set(None);
        this.cancelled.set(None);
        Poll::Ready(outcome)
    }
}

impl<S: fmt::Debug, P> fmt::Debug for FirstWhere<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstWhere")
            .field("stream", &self.stream)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
