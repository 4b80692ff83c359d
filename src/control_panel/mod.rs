//! ControlPanel - Component Wiring
//!
//! Owns every panel component, shares one log/UI/device between them and
//! drives the three periodic timers.

use crate::command_dispatcher::CommandDispatcher;
use crate::connection_tracker::ConnectionTracker;
use crate::device_client::{DeviceApi, DeviceCommand};
use crate::frame_poller::FramePoller;
use crate::frame_rate::{FrameCounter, FrameRateEstimator};
use crate::keyboard::KeyboardBridge;
use crate::log_sink::LogSink;
use crate::param_updater::ParamUpdater;
use crate::preset::PresetApplier;
use crate::status_poller::StatusPoller;
use crate::ui_port::UiPort;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Shortest period a periodic timer runs with
pub const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

/// Timer periods and delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTiming {
    pub status_interval: Duration,
    pub frame_interval: Duration,
    pub fps_interval: Duration,
    /// Quiet period before a camera parameter edit is sent
    pub param_debounce: Duration,
    /// Delay of the extra status poll after a speed/LED command
    pub refresh_delay: Duration,
}

impl Default for PanelTiming {
    fn default() -> Self {
        Self {
            status_interval: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(100),
            fps_interval: Duration::from_millis(1000),
            param_debounce: Duration::from_millis(300),
            refresh_delay: Duration::from_millis(100),
        }
    }
}

/// ControlPanel instance
pub struct ControlPanel {
    pub log: Arc<LogSink>,
    pub connection: Arc<ConnectionTracker>,
    pub status: Arc<StatusPoller>,
    pub frames: Arc<FramePoller>,
    pub fps: Arc<FrameRateEstimator>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub params: Arc<ParamUpdater>,
    pub presets: PresetApplier,
    pub keyboard: KeyboardBridge,
}

impl ControlPanel {
    pub fn new(
        device: Arc<dyn DeviceApi>,
        ui: Arc<dyn UiPort>,
        timing: PanelTiming,
        log_capacity: usize,
    ) -> Self {
        let log = Arc::new(LogSink::new(log_capacity));
        let connection = Arc::new(ConnectionTracker::new());
        let counter = Arc::new(FrameCounter::new());

        let status = Arc::new(StatusPoller::new(
            device.clone(),
            ui.clone(),
            log.clone(),
            connection.clone(),
            timing.status_interval,
        ));
        let frames = Arc::new(FramePoller::new(
            device.clone(),
            ui.clone(),
            counter.clone(),
            timing.frame_interval,
        ));
        let fps = Arc::new(FrameRateEstimator::new(
            counter,
            ui.clone(),
            timing.fps_interval,
        ));
        let dispatcher = Arc::new(CommandDispatcher::new(
            device.clone(),
            ui.clone(),
            log.clone(),
            status.clone(),
            timing.refresh_delay,
        ));
        let params = Arc::new(ParamUpdater::new(
            device.clone(),
            ui.clone(),
            log.clone(),
            timing.param_debounce,
        ));
        let presets = PresetApplier::new(device, ui, log.clone());
        let keyboard = KeyboardBridge::new(dispatcher.clone());

        Self {
            log,
            connection,
            status,
            frames,
            fps,
            dispatcher,
            params,
            presets,
            keyboard,
        }
    }

    /// Start status, frame and FPS timers
    pub async fn start(&self) {
        self.status.start().await;
        self.frames.start().await;
        self.fps.start().await;
        self.log.info("System initialized").await;
    }

    /// Cancel every timer and scheduled send, then fire a best-effort stop.
    /// The returned handle may be awaited (with a timeout) or dropped.
    pub async fn shutdown(&self) -> JoinHandle<bool> {
        tracing::info!("Shutting down control panel");

        self.status.stop().await;
        self.frames.stop().await;
        self.fps.stop().await;
        self.params.cancel_all().await;

        self.dispatcher.dispatch(DeviceCommand::STOP)
    }
}
