//! Single-flight request coordination.
//!
//! Chat and recommendation calls are expensive (each one drives an LLM
//! generation server-side), so a duplicate submitted while one is already
//! running is suppressed rather than queued: the duplicate caller gets a
//! [`Flight::Skipped`] outcome immediately and nothing goes on the wire.
//! Independent operations never serialize against each other.
//!
//! The flags live in an explicit coordinator value handed to whoever issues
//! calls; there is no process-wide state. Check-and-set is a single atomic
//! compare-exchange, so the invariant holds on a multi-threaded runtime.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use fitfusion_api::ApiError;
use tracing::debug;

/// The operations subject to single-flight suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Chat,
    Recommendations,
}

impl Operation {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        match self {
            Operation::Chat => 0,
            Operation::Recommendations => 1,
        }
    }
}

/// Outcome of a guarded call. `Skipped` is distinct from both success and
/// failure: the wrapped call was never made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flight<T> {
    Completed(T),
    Skipped,
}

impl<T> Flight<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Flight::Skipped)
    }

    pub fn into_completed(self) -> Option<T> {
        match self {
            Flight::Completed(value) => Some(value),
            Flight::Skipped => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestCoordinator {
    in_flight: [AtomicBool; Operation::COUNT],
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self, operation: Operation) -> bool {
        self.in_flight[operation.index()].load(Ordering::Acquire)
    }

    /// Run `call` under the single-flight guard for `operation`.
    ///
    /// If another call for the same operation is in flight, returns
    /// `Ok(Flight::Skipped)` without polling `call`. Otherwise the flag is
    /// held for the duration of the call and cleared on every exit path;
    /// the call's error, if any, is forwarded unchanged.
    pub async fn run<T, F>(&self, operation: Operation, call: F) -> Result<Flight<T>, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let flag = &self.in_flight[operation.index()];
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(?operation, "request already in progress, skipping duplicate call");
            return Ok(Flight::Skipped);
        }

        let _clear = ClearOnDrop { flag };
        let value = call.await?;
        Ok(Flight::Completed(value))
    }
}

/// Clears the busy flag when the guarded call settles, including when the
/// future is dropped mid-flight.
struct ClearOnDrop<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn operations_have_independent_flags() {
        let coordinator = RequestCoordinator::new();

        let outcome = coordinator
            .run(Operation::Chat, async {
                assert!(!coordinator.is_busy(Operation::Recommendations));
                Ok(1)
            })
            .await
            .unwrap();

        assert_eq!(outcome, Flight::Completed(1));
        assert!(!coordinator.is_busy(Operation::Chat));
    }

    #[tokio::test]
    async fn dropping_a_guarded_future_clears_the_flag() {
        let coordinator = RequestCoordinator::new();

        {
            let pending = coordinator.run(Operation::Chat, std::future::pending::<Result<(), ApiError>>());
            tokio::pin!(pending);
            // Poll once so the flag is taken, then drop the future.
            assert!(futures_poll_once(pending.as_mut()).await.is_none());
            assert!(coordinator.is_busy(Operation::Chat));
        }

        assert!(!coordinator.is_busy(Operation::Chat));
    }

    /// Poll a future exactly once, returning its output if ready.
    async fn futures_poll_once<F: Future>(future: std::pin::Pin<&mut F>) -> Option<F::Output> {
        use std::task::Poll;
        let mut future = Some(future);
        std::future::poll_fn(move |cx| {
            let polled = future
                .take()
                .map(|f| f.poll(cx))
                .unwrap_or(Poll::Pending);
            match polled {
                Poll::Ready(output) => Poll::Ready(Some(output)),
                Poll::Pending => Poll::Ready(None),
            }
        })
        .await
    }
}
