//! ParamUpdater - Debounced Camera Parameter Updates
//!
//! ## Responsibilities
//!
//! - Instant display feedback for slider moves
//! - Coalesce bursts of edits into one trailing request per parameter
//! - Disable parameters the firmware reports as unsupported (HTTP 501)
//!
//! Only a *scheduled* send is cancelled by a newer edit. Once the quiet
//! period elapses the request is issued and runs to completion.

use crate::device_client::{DeviceApi, ParamOutcome};
use crate::log_sink::LogSink;
use crate::ui_port::UiPort;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

/// Leading-integer parse: optional sign, then digits; trailing text ignored.
/// `"12.7"` → 12, `" -3px"` → -3, `"abc"` → None.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

struct PendingSend {
    generation: u64,
    handle: JoinHandle<()>,
}

/// ParamUpdater instance
pub struct ParamUpdater {
    device: Arc<dyn DeviceApi>,
    ui: Arc<dyn UiPort>,
    log: Arc<LogSink>,
    quiet_period: Duration,
    pending: Mutex<HashMap<String, PendingSend>>,
    unsupported: RwLock<HashSet<String>>,
    generation: AtomicU64,
}

impl ParamUpdater {
    pub fn new(
        device: Arc<dyn DeviceApi>,
        ui: Arc<dyn UiPort>,
        log: Arc<LogSink>,
        quiet_period: Duration,
    ) -> Self {
        Self {
            device,
            ui,
            log,
            quiet_period,
            pending: Mutex::new(HashMap::new()),
            unsupported: RwLock::new(HashSet::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Slider moved: show the value now, send it once edits stop
    pub async fn on_parameter_changed(self: &Arc<Self>, param: &str, raw_value: &str) {
        if self.is_unsupported(param).await {
            tracing::debug!(param = %param, "Ignoring edit to unsupported parameter");
            return;
        }

        self.ui.set_param_display(param, raw_value);

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let updater = Arc::clone(self);
        let name = param.to_string();
        let raw = raw_value.to_string();

        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.remove(param) {
            previous.handle.abort();
            tracing::trace!(param = %param, "Replaced pending send");
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(updater.quiet_period).await;
            updater.fire(&name, generation, &raw).await;
        });
        pending.insert(param.to_string(), PendingSend { generation, handle });
    }

    async fn fire(&self, param: &str, generation: u64, raw_value: &str) {
        {
            let mut pending = self.pending.lock().await;
            if pending.get(param).map(|p| p.generation) == Some(generation) {
                pending.remove(param);
            }
        }
        self.send(param, raw_value).await;
    }

    async fn send(&self, param: &str, raw_value: &str) {
        let Some(value) = parse_int(raw_value) else {
            self.log
                .error(format!("Invalid value for {}: {:?}", param, raw_value))
                .await;
            return;
        };

        match self.device.set_camera_param(param, value).await {
            Ok(ParamOutcome::Applied) => {
                self.log.success(format!("Camera {}: {}", param, value)).await;
            }
            Ok(ParamOutcome::Unsupported) => {
                self.unsupported.write().await.insert(param.to_string());
                self.ui.disable_control(param);
                tracing::warn!(param = %param, "Firmware does not support parameter");
                self.log
                    .error(format!("Unsupported parameter: {}", param))
                    .await;
            }
            Ok(ParamOutcome::Rejected { detail }) => {
                let message = match detail {
                    Some(detail) => format!("Camera setting failed ({})", detail),
                    None => "Camera setting failed".to_string(),
                };
                self.log.error(message).await;
            }
            Err(e) => {
                tracing::warn!(param = %param, value, error = %e, "Camera parameter request failed");
                self.log.error(format!("Camera setting error: {}", e)).await;
            }
        }
    }

    pub async fn is_unsupported(&self, param: &str) -> bool {
        self.unsupported.read().await.contains(param)
    }

    /// Parameters with a send still waiting for its quiet period
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Drop every scheduled send (teardown)
    pub async fn cancel_all(&self) {
        let mut pending = self.pending.lock().await;
        for (_, send) in pending.drain() {
            send.handle.abort();
        }
    }
}
