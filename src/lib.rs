//! ESP32-CAM Panel Library
//!
//! Browser control panel for an ESP32-CAM car: drive the motors, switch the
//! LED, tune the OV2640 camera and watch a polled still-frame stream.
//!
//! ## Architecture
//!
//! 1. DeviceClient - ESP32-CAM HTTP API adapter (`DeviceApi` trait)
//! 2. LogSink - Bounded activity log, newest first
//! 3. ConnectionTracker - Connected/disconnected indicator state
//! 4. StatusPoller - Periodic status sync into the UI
//! 5. FramePoller - Still-frame polling with cache-busting stamps
//! 6. FrameRateEstimator - Frames per second over a sliding window
//! 7. CommandDispatcher - Motion, speed and LED commands
//! 8. ParamUpdater - Debounced camera parameter updates
//! 9. PresetApplier - Built-in camera tuning bundles
//! 10. KeyboardBridge - Key events to commands
//! 11. ControlPanel - Wiring and lifecycle
//! 12. WebAPI - REST endpoints for the page
//!
//! All display changes flow through the [`ui_port::UiPort`] trait.

pub mod camera_params;
pub mod command_dispatcher;
pub mod connection_tracker;
pub mod control_panel;
pub mod device_client;
pub mod error;
pub mod frame_poller;
pub mod frame_rate;
pub mod keyboard;
pub mod log_sink;
pub mod models;
pub mod param_updater;
pub mod preset;
pub mod state;
pub mod status_poller;
pub mod ui_port;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
