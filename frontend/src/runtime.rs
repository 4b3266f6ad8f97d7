use analysis::Runtime;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use gloo_timers::future::TimeoutFuture;
use js_sys::Date;
use std::time::Duration;

/// Browser event loop: `Date.now()` clock, `setTimeout` timers and
/// `spawn_local` tasks.
pub struct BrowserRuntime {
    origin_ms: f64,
}

impl BrowserRuntime {
    pub fn new() -> Self {
        Self {
            origin_ms: Date::now(),
        }
    }
}

impl Runtime for BrowserRuntime {
    fn now(&self) -> Duration {
        Duration::from_secs_f64((Date::now() - self.origin_ms).max(0.0) / 1000.0)
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).boxed_local()
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
