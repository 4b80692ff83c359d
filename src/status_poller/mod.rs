//! StatusPoller - Periodic Device Status Sync
//!
//! ## Responsibilities
//!
//! - Fetch `/api/status` once at start, then on a fixed cadence
//! - Replace the status snapshot and push it to the UI
//! - Drive the connection indicator
//! - Leave sliders the user is dragging alone
//!
//! Each tick's fetch runs in its own task; a slow reply may land after a
//! newer one (last writer wins).

use crate::camera_params::STATUS_SYNCED_PARAMS;
use crate::connection_tracker::{ConnectionState, ConnectionTracker};
use crate::control_panel::MIN_TIMER_PERIOD;
use crate::device_client::{DeviceApi, DeviceStatus};
use crate::log_sink::LogSink;
use crate::ui_port::{fields, UiPort, PLACEHOLDER, SPEED_PLACEHOLDER};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// StatusPoller instance
pub struct StatusPoller {
    device: Arc<dyn DeviceApi>,
    ui: Arc<dyn UiPort>,
    log: Arc<LogSink>,
    connection: Arc<ConnectionTracker>,
    snapshot: RwLock<Option<DeviceStatus>>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusPoller {
    pub fn new(
        device: Arc<dyn DeviceApi>,
        ui: Arc<dyn UiPort>,
        log: Arc<LogSink>,
        connection: Arc<ConnectionTracker>,
        period: Duration,
    ) -> Self {
        Self {
            device,
            ui,
            log,
            connection,
            snapshot: RwLock::new(None),
            period: period.max(MIN_TIMER_PERIOD),
            task: Mutex::new(None),
        }
    }

    /// Start polling; the first poll fires immediately
    pub async fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            tracing::warn!("Status polling already running");
            return;
        }

        tracing::info!(period_ms = self.period.as_millis() as u64, "Starting status poller");

        let poller = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(poller.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let poller = Arc::clone(&poller);
                tokio::spawn(async move {
                    poller.poll_once().await;
                });
            }
        }));
    }

    /// Cancel the periodic timer. Polls already in flight finish on their own.
    pub async fn stop(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
            tracing::info!("Status poller stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task.lock().await.is_some()
    }

    /// One extra poll after `delay`, outside the regular cadence
    pub fn schedule_refresh(self: &Arc<Self>, delay: Duration) -> JoinHandle<()> {
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            poller.poll_once().await;
        })
    }

    /// Latest snapshot that arrived without an error
    pub async fn latest(&self) -> Option<DeviceStatus> {
        self.snapshot.read().await.clone()
    }

    /// Fetch and apply one status snapshot. Returns true on success.
    pub async fn poll_once(&self) -> bool {
        match self.device.fetch_status().await {
            Ok(status) => {
                self.connection.update(true).await;
                self.ui.set_connection(ConnectionState::Connected);
                self.render(&status);
                *self.snapshot.write().await = Some(status);
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Status poll failed");
                self.connection.update(false).await;
                self.ui.set_connection(ConnectionState::Disconnected);
                self.log
                    .error(format!("ESP32-CAM connection failed: {}", e))
                    .await;
                false
            }
        }
    }

    fn render(&self, status: &DeviceStatus) {
        let ui = &self.ui;

        ui.set_field(
            fields::IP_ADDRESS,
            status.ip_address.as_deref().unwrap_or(PLACEHOLDER),
        );
        ui.set_field(
            fields::MOTOR_STATUS,
            match status.motor_running() {
                Some(true) => "Running",
                Some(false) => "Stopped",
                None => PLACEHOLDER,
            },
        );
        ui.set_field(
            fields::CURRENT_COMMAND,
            status.current_command.as_deref().unwrap_or(PLACEHOLDER),
        );

        let led_on = status.led_on();
        ui.set_field(
            fields::LED_STATUS,
            match led_on {
                Some(true) => "On",
                Some(false) => "Off",
                None => PLACEHOLDER,
            },
        );
        ui.set_led_switch(led_on.unwrap_or(false));

        let speed = status.speed.map(|s| s.to_string());
        ui.set_field(fields::SPEED_VALUE, speed.as_deref().unwrap_or(PLACEHOLDER));
        ui.set_field(
            fields::SPEED_DISPLAY,
            speed.as_deref().unwrap_or(SPEED_PLACEHOLDER),
        );

        match &status.camera_settings {
            Some(settings) => {
                for param in STATUS_SYNCED_PARAMS {
                    let value = settings.get(param);
                    let label = value.map(|v| v.to_string());
                    ui.set_field(
                        &fields::setting_value(param),
                        label.as_deref().unwrap_or(PLACEHOLDER),
                    );
                    if !ui.set_slider_if_idle(param, value.unwrap_or(0)) {
                        tracing::trace!(param = %param, "Slider in use, skipping sync");
                    }
                }
                for (param, value) in settings.extra_values() {
                    ui.set_field(&fields::setting_value(param), &value.to_string());
                    ui.set_slider_if_idle(param, value);
                }
            }
            None => {
                for param in STATUS_SYNCED_PARAMS {
                    ui.set_field(&fields::setting_value(param), PLACEHOLDER);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_client::mock::{DeviceCall, MockDevice};
    use crate::device_client::CameraSettings;
    use crate::log_sink::Severity;
    use crate::ui_port::PanelView;

    fn sample_status() -> DeviceStatus {
        DeviceStatus {
            ip_address: Some("192.168.0.65".to_string()),
            motor_status: Some("running".to_string()),
            current_command: Some("center".to_string()),
            led_state: Some("on".to_string()),
            speed: Some(180),
            camera_settings: Some(CameraSettings {
                brightness: Some(1),
                contrast: Some(2),
                agc_gain: Some(25),
                ..Default::default()
            }),
            error: None,
        }
    }

    struct Fixture {
        device: Arc<MockDevice>,
        view: Arc<PanelView>,
        log: Arc<LogSink>,
        connection: Arc<ConnectionTracker>,
        poller: Arc<StatusPoller>,
    }

    fn fixture() -> Fixture {
        let device = Arc::new(MockDevice::new());
        let view = Arc::new(PanelView::new());
        let log = Arc::new(LogSink::default());
        let connection = Arc::new(ConnectionTracker::new());
        let poller = Arc::new(StatusPoller::new(
            device.clone(),
            view.clone(),
            log.clone(),
            connection.clone(),
            Duration::from_millis(1000),
        ));
        Fixture { device, view, log, connection, poller }
    }

    #[tokio::test]
    async fn test_successful_poll_renders_fields() {
        let f = fixture();
        f.device.set_status(Some(sample_status()));

        assert!(f.poller.poll_once().await);

        assert_eq!(f.connection.state().await, ConnectionState::Connected);
        assert_eq!(f.view.connection(), Some(ConnectionState::Connected));
        assert_eq!(f.view.field(fields::IP_ADDRESS).as_deref(), Some("192.168.0.65"));
        assert_eq!(f.view.field(fields::MOTOR_STATUS).as_deref(), Some("Running"));
        assert_eq!(f.view.field(fields::LED_STATUS).as_deref(), Some("On"));
        assert_eq!(f.view.field(fields::SPEED_DISPLAY).as_deref(), Some("180"));
        assert_eq!(f.view.field("brightness-value").as_deref(), Some("1"));
        assert!(f.view.led_switch());
        assert_eq!(f.view.slider("agc_gain"), Some(25));
        assert_eq!(f.poller.latest().await, Some(sample_status()));
        assert!(f.log.is_empty().await);
    }

    #[tokio::test]
    async fn test_absent_fields_render_placeholders() {
        let f = fixture();
        f.device.set_status(Some(sample_status()));
        f.poller.poll_once().await;

        f.device.set_status(Some(DeviceStatus::default()));
        f.poller.poll_once().await;

        assert_eq!(f.view.field(fields::IP_ADDRESS).as_deref(), Some(PLACEHOLDER));
        assert_eq!(f.view.field(fields::MOTOR_STATUS).as_deref(), Some(PLACEHOLDER));
        assert_eq!(f.view.field(fields::SPEED_VALUE).as_deref(), Some(PLACEHOLDER));
        assert_eq!(
            f.view.field(fields::SPEED_DISPLAY).as_deref(),
            Some(SPEED_PLACEHOLDER)
        );
        assert_eq!(f.view.field("contrast-value").as_deref(), Some(PLACEHOLDER));
        assert_eq!(f.poller.latest().await, Some(DeviceStatus::default()));
    }

    #[tokio::test]
    async fn test_grabbed_slider_survives_poll() {
        let f = fixture();
        f.view.set_slider("brightness", -1);
        f.view.grab_slider("brightness");
        f.device.set_status(Some(sample_status()));

        f.poller.poll_once().await;

        assert_eq!(f.view.slider("brightness"), Some(-1));
        // Read-only label still follows the device
        assert_eq!(f.view.field("brightness-value").as_deref(), Some("1"));
        assert_eq!(f.view.slider("contrast"), Some(2));
    }

    #[tokio::test]
    async fn test_error_field_keeps_last_known_values() {
        let f = fixture();
        f.device.set_status(Some(sample_status()));
        f.poller.poll_once().await;

        f.device.set_status(Some(DeviceStatus {
            error: Some(serde_json::json!("ESP32 unreachable")),
            ..Default::default()
        }));
        assert!(!f.poller.poll_once().await);

        assert_eq!(f.connection.state().await, ConnectionState::Disconnected);
        assert_eq!(f.view.connection(), Some(ConnectionState::Disconnected));
        assert_eq!(f.view.field(fields::IP_ADDRESS).as_deref(), Some("192.168.0.65"));
        assert_eq!(f.poller.latest().await, Some(sample_status()));

        let entries = f.log.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].severity, Severity::Error);
        assert!(entries[0].message.contains("ESP32 unreachable"));
    }

    #[tokio::test]
    async fn test_transport_failure_marks_disconnected() {
        let f = fixture();
        f.device.set_status(None);

        assert!(!f.poller.poll_once().await);
        assert_eq!(f.view.connection(), Some(ConnectionState::Disconnected));
        assert_eq!(f.log.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_every_period() {
        let f = fixture();
        f.poller.start().await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(f.device.count(|c| *c == DeviceCall::Status), 1);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(f.device.count(|c| *c == DeviceCall::Status), 3);

        f.poller.stop().await;
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(f.device.count(|c| *c == DeviceCall::Status), 3);
        assert!(!f.poller.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_still_polls() {
        let f = fixture();
        let poller = Arc::new(StatusPoller::new(
            f.device.clone(),
            f.view.clone(),
            f.log.clone(),
            f.connection.clone(),
            Duration::ZERO,
        ));
        poller.start().await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        poller.stop().await;
        assert!(f.device.count(|c| *c == DeviceCall::Status) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_refresh_polls_once() {
        let f = fixture();
        f.poller
            .schedule_refresh(Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(f.device.count(|c| *c == DeviceCall::Status), 1);
    }
}
