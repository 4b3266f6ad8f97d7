use futures::future::{self, Either, LocalBoxFuture};
use std::future::Future;
use std::time::Duration;

/// Clock, timer and task spawning for a single-threaded executor.
pub trait Runtime {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
    /// Runs `task` detached on the current thread.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Races `fut` against `limit`. `None` means the limit elapsed first.
pub async fn with_timeout<R, F>(runtime: &R, limit: Option<Duration>, fut: F) -> Option<F::Output>
where
    R: Runtime + ?Sized,
    F: Future,
{
    let Some(limit) = limit else {
        return Some(fut.await);
    };

    let fut = std::pin::pin!(fut);
    match future::select(fut, runtime.sleep(limit)).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use self::native::TokioRuntime;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::Runtime;
    use futures::FutureExt;
    use futures::future::LocalBoxFuture;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Tokio-backed runtime. Spawning needs an enclosing `LocalSet`.
    #[derive(Debug, Clone)]
    pub struct TokioRuntime {
        origin: Instant,
    }

    impl TokioRuntime {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for TokioRuntime {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Runtime for TokioRuntime {
        fn now(&self) -> Duration {
            self.origin.elapsed()
        }

        fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
            tokio::time::sleep(duration).boxed_local()
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            tokio::task::spawn_local(task);
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_elapses_first() {
        let runtime = TokioRuntime::new();
        let slow = tokio::time::sleep(Duration::from_secs(10));
        let outcome = with_timeout(&runtime, Some(Duration::from_secs(1)), slow).await;
        assert!(outcome.is_none());
        assert!(runtime.now() >= Duration::from_secs(1));
        assert!(runtime.now() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_future_wins_and_no_limit() {
        let runtime = TokioRuntime::new();
        let fast = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            7
        };
        assert_eq!(with_timeout(&runtime, Some(Duration::from_secs(1)), fast).await, Some(7));
        assert_eq!(with_timeout(&runtime, None, async { 3 }).await, Some(3));
    }
}
