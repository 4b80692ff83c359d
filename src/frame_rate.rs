//! Frame counter and frame-rate estimator
//!
//! The frame poller bumps the counter on every displayed frame; the estimator
//! samples and resets it once per window.

use crate::control_panel::MIN_TIMER_PERIOD;
use crate::ui_port::UiPort;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// `round(count / elapsed)`, 0 when nothing arrived or no time passed
pub fn frames_per_second(count: u64, elapsed: Duration) -> u32 {
    let secs = elapsed.as_secs_f64();
    if count == 0 || secs <= 0.0 {
        return 0;
    }
    (count as f64 / secs).round() as u32
}

struct FrameWindow {
    frame_count: u64,
    window_start: Instant,
}

/// Frames displayed since the last sample
pub struct FrameCounter {
    window: Mutex<FrameWindow>,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self {
            window: Mutex::new(FrameWindow {
                frame_count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    pub async fn record_frame(&self) {
        self.window.lock().await.frame_count += 1;
    }

    pub async fn frame_count(&self) -> u64 {
        self.window.lock().await.frame_count
    }

    /// Compute FPS over the current window, then start a new one
    pub async fn sample(&self) -> u32 {
        let mut window = self.window.lock().await;
        let now = Instant::now();
        let fps = frames_per_second(window.frame_count, now - window.window_start);
        window.frame_count = 0;
        window.window_start = now;
        fps
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodically publishes the observed frame rate
pub struct FrameRateEstimator {
    counter: Arc<FrameCounter>,
    ui: Arc<dyn UiPort>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl FrameRateEstimator {
    pub fn new(counter: Arc<FrameCounter>, ui: Arc<dyn UiPort>, period: Duration) -> Self {
        Self {
            counter,
            ui,
            period: period.max(MIN_TIMER_PERIOD),
            task: Mutex::new(None),
        }
    }

    /// First sample one period after start
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            tracing::warn!("Frame-rate estimator already running");
            return;
        }

        let estimator = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + estimator.period, estimator.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                estimator.sample_once().await;
            }
        }));
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
    }

    pub async fn sample_once(&self) -> u32 {
        let fps = self.counter.sample().await;
        self.ui.set_fps(fps);
        tracing::trace!(fps, "Frame rate sampled");
        fps
    }
}
