//! Repeating-callback cadence primitive
//!
//! The [`Ticker`] drives autoplay but knows nothing about playback: it fires
//! a callback at a fixed period until stopped, with at most one cadence
//! active per instance. The callback returns `false` to end its own cadence,
//! which is how the engine stops autoplay from inside a tick.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Cadence period for a speed multiplier: `base / speed`, floored at 1ms
/// because a zero-period interval panics.
pub fn cadence_period(base: Duration, speed: f64) -> Duration {
    Duration::from_secs_f64(base.as_secs_f64() / speed).max(Duration::from_millis(1))
}

/// Cancellable repeating-callback timer.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start firing `on_tick` every `period`. Any previous cadence is
    /// stopped first, so at most one cadence is ever active.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send,
    {
        self.stop();

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = tokio::spawn(async move {
            let mut ticks = interval(period.max(Duration::from_millis(1)));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // an interval's first tick completes immediately; consume it so
            // the first callback fires one full period after start
            ticks.tick().await;
            loop {
                ticks.tick().await;
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                if !on_tick().await {
                    break;
                }
            }
        });

        self.cancel = Some(cancel);
        self.handle = Some(handle);
    }

    /// Stop the active cadence, if any. No callback fires after this
    /// returns. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a cadence is currently active
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
