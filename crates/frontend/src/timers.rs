use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use dioxus::core::Task;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

/// Milliseconds from the page's monotonic clock.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_default()
}

pub async fn sleep_ms(ms: f64) {
    TimeoutFuture::new(ms.max(0.0).ceil() as u32).await;
}

/// One scheduled task per slot. Scheduling again cancels the previous task.
///
/// Owned by a component instance and cancelled from its `use_drop`.
#[derive(Clone, Default)]
pub struct TimerSlot(Rc<Cell<Option<Task>>>);

impl TimerSlot {
    pub fn schedule(&self, fut: impl Future<Output = ()> + 'static) {
        self.cancel();
        self.0.set(Some(spawn(fut)));
    }

    pub fn cancel(&self) {
        if let Some(task) = self.0.take() {
            task.cancel();
        }
    }
}
