//! Cooperative cancellation.
//!
//! Streams and waits check the token before polling and before emitting, and
//! hold a [`WaitForCancellationFutureOwned`] so a cancellation is observed
//! without waiting for another tick. Dropping that future deregisters the
//! task's waker from the token.

pub use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Error returned when an operation is cancelled before it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

#[cfg(test)]
mod tests {
    use core::future::Future;
    use core::pin::pin;
    use core::task::Context;

    use futures::task::noop_waker_ref;

    use super::CancellationToken;

    #[test]
    fn child_of_cancelled_parent_starts_cancelled() {
        let parent = CancellationToken::new();
        parent.cancel();
        assert!(parent.child_token().is_cancelled());
    }

    #[test]
    fn owned_wait_resolves_without_a_runtime() {
        let token = CancellationToken::new();
        let mut cancelled = pin!(token.clone().cancelled_owned());
        let mut cx = Context::from_waker(noop_waker_ref());

        assert!(cancelled.as_mut().poll(&mut cx).is_pending());
        token.cancel();
        assert!(cancelled.as_mut().poll(&mut cx).is_ready());
    }
}
