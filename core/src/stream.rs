//! [`ChangeStream`]: a [`Differ`] driven by a [`Ticker`].

use alloc::boxed::Box;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures::Stream;
use futures::stream::FusedStream;
use tracing::{debug, trace};

use crate::{CancellationToken, Differ, TickRegistration, Ticker, WaitForCancellationFutureOwned};

/// A lazy, cancellable stream of distinct values from a polled source.
///
/// The source is polled at most once per tick, starting with the first tick
/// after the stream was created. A value is yielded only when it differs from
/// the previous one this stream yielded. The stream ends once its token is
/// cancelled, and the tick registration is released at that point.
///
/// # Example
///
/// ```rust
/// use futures::{StreamExt, executor::LocalPool, task::LocalSpawnExt};
/// use safeline_core::{CancellationToken, ChangeStream, Ticker};
/// use std::{cell::Cell, rc::Rc};
///
/// let ticker = Ticker::new();
/// let token = CancellationToken::new();
/// let source = Rc::new(Cell::new(1));
/// let mut stream = ChangeStream::distinct(&ticker, &token, {
///     let source = source.clone();
///     move || source.get()
/// });
///
/// let mut pool = LocalPool::new();
/// let seen = Rc::new(Cell::new(0));
/// pool.spawner()
///     .spawn_local({
///         let seen = seen.clone();
///         async move {
///             while let Some(value) = stream.next().await {
///                 seen.set(value);
///             }
///         }
///     })
///     .unwrap();
///
/// ticker.tick();
/// pool.run_until_stalled();
/// assert_eq!(seen.get(), 1);
/// ```
#[must_use = "streams do nothing unless polled"]
pub struct ChangeStream<T> {
    differ: Differ<T>,
    ticker: Ticker,
    token: CancellationToken,
    seen_frame: u64,
    registration: Option<TickRegistration>,
    cancelled: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
}

// The buffered value is never pinned.
impl<T> Unpin for ChangeStream<T> {}

impl<T: Clone + 'static> ChangeStream<T> {
    /// Subscribes to `poll`, treating values for which `equals` holds as
    /// unchanged.
    pub fn new(
        ticker: &Ticker,
        token: &CancellationToken,
        poll: impl FnMut() -> T + 'static,
        equals: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        Self::from_differ(ticker, token, Differ::new(poll, equals))
    }

    /// Subscribes to a source that reports `None` while it is not ready.
    pub fn try_new(
        ticker: &Ticker,
        token: &CancellationToken,
        poll: impl FnMut() -> Option<T> + 'static,
        equals: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        Self::from_differ(ticker, token, Differ::try_new(poll, equals))
    }

    /// Drives an existing differ from `ticker`.
    pub fn from_differ(ticker: &Ticker, token: &CancellationToken, differ: Differ<T>) -> Self {
        Self {
            differ,
            ticker: ticker.clone(),
            token: token.clone(),
            seen_frame: ticker.frame(),
            registration: Some(ticker.registration()),
            cancelled: Some(Box::pin(token.clone().cancelled_owned())),
        }
    }

    fn release(&mut self) {
        self.cancelled = None;
        if self.registration.take().is_some() {
            debug!(target: "safeline::stream", "change stream released");
        }
    }
}

impl<T: PartialEq + Clone + 'static> ChangeStream<T> {
    /// Subscribes to `poll`, comparing values with [`PartialEq`].
    pub fn distinct(
        ticker: &Ticker,
        token: &CancellationToken,
        poll: impl FnMut() -> T + 'static,
    ) -> Self {
        Self::from_differ(ticker, token, Differ::distinct(poll))
    }
}

impl<T: Clone + 'static> Stream for ChangeStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        if this.registration.is_none() {
            return Poll::Ready(None);
        }
        if this.token.is_cancelled() {
            this.release();
            return Poll::Ready(None);
        }

        let frame = this.ticker.frame();
        if frame > this.seen_frame {
            this.seen_frame = frame;
            if let Some(value) = this.differ.sample() {
                if this.token.is_cancelled() {
                    this.release();
                    return Poll::Ready(None);
                }
                trace!(target: "safeline::stream", frame, "change stream emitting");
                return Poll::Ready(Some(value));
            }
        }

        if let Some(registration) = &this.registration {
            registration.set_waker(cx.waker());
        }
        if let Some(cancelled) = this.cancelled.as_mut()
            && cancelled.as_mut().poll(cx).is_ready()
        {
            this.release();
            return Poll::Ready(None);
        }
        Poll::Pending
    }
}

impl<T: Clone + 'static> FusedStream for ChangeStream<T> {
    fn is_terminated(&self) -> bool {
        self.registration.is_none()
    }
}

impl<T: fmt::Debug> fmt::Debug for ChangeStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeStream")
            .field("differ", &self.differ)
            .field("seen_frame", &self.seen_frame)
            .field("released", &self.registration.is_none())
            .finish_non_exhaustive()
    }
}
