//! FramePoller - Still-Frame Stream Emulation
//!
//! ## Responsibilities
//!
//! - Request `/capture?t=<stamp>` once at start, then on a fixed cadence
//! - Swap each frame into the display surface
//! - Show the failure overlay when a capture fails
//!
//! No back-pressure: every tick spawns its own request, so a slow device can
//! have several captures in flight and they may complete out of order.

use crate::control_panel::MIN_TIMER_PERIOD;
use crate::device_client::DeviceApi;
use crate::frame_rate::FrameCounter;
use crate::ui_port::UiPort;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Overlay text while captures fail
pub const CAPTURE_FAILED_MESSAGE: &str = "Camera connection failed";

/// FramePoller instance
pub struct FramePoller {
    device: Arc<dyn DeviceApi>,
    ui: Arc<dyn UiPort>,
    counter: Arc<FrameCounter>,
    period: Duration,
    last_stamp: AtomicI64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl FramePoller {
    pub fn new(
        device: Arc<dyn DeviceApi>,
        ui: Arc<dyn UiPort>,
        counter: Arc<FrameCounter>,
        period: Duration,
    ) -> Self {
        Self {
            device,
            ui,
            counter,
            period: period.max(MIN_TIMER_PERIOD),
            last_stamp: AtomicI64::new(0),
            task: Mutex::new(None),
        }
    }

    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            tracing::warn!("Frame polling already running");
            return;
        }

        tracing::info!(period_ms = self.period.as_millis() as u64, "Starting frame poller");

        let poller = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(poller.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let poller = Arc::clone(&poller);
                tokio::spawn(async move {
                    poller.capture_once().await;
                });
            }
        }));
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            tracing::info!("Frame poller stopped");
        }
    }

    /// Cache-busting stamp: wall-clock milliseconds, bumped so that no two
    /// requests share one
    fn next_stamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let stamp = now.max(prev + 1);
            match self.last_stamp.compare_exchange_weak(
                prev,
                stamp,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return stamp,
                Err(actual) => prev = actual,
            }
        }
    }

    /// Fetch one frame and update the display. Returns true on success.
    pub async fn capture_once(&self) -> bool {
        let stamp = self.next_stamp();

        match self.device.capture(stamp).await {
            Ok(frame) => {
                self.counter.record_frame().await;
                self.ui.show_frame(frame);
                self.ui.set_overlay(None);
                true
            }
            Err(e) => {
                tracing::debug!(stamp, error = %e, "Frame capture failed");
                self.ui.set_overlay(Some(CAPTURE_FAILED_MESSAGE));
                false
            }
        }
    }
}
