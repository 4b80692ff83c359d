//! Camera Presets
//!
//! ## Responsibilities
//!
//! - Define the built-in camera tuning bundles (reset/day/night/indoor/outdoor)
//! - Apply a bundle one parameter at a time, bypassing the debounce
//!
//! Two presets applied at once interleave per parameter; whichever request
//! for a parameter lands last wins.

use crate::device_client::{DeviceApi, ParamOutcome};
use crate::log_sink::LogSink;
use crate::ui_port::UiPort;
use serde::Serialize;
use std::sync::Arc;

/// Preset ID constants
pub mod preset_ids {
    pub const RESET: &str = "reset";
    pub const DAY: &str = "day";
    pub const NIGHT: &str = "night";
    pub const INDOOR: &str = "indoor";
    pub const OUTDOOR: &str = "outdoor";
}

/// Named bundle of camera settings
#[derive(Debug, Clone, Serialize)]
pub struct CameraPreset {
    pub id: &'static str,
    pub name: &'static str,
    /// Logged once every pair has been attempted
    pub success_message: &'static str,
    /// Applied in this order
    pub settings: Vec<(&'static str, i64)>,
}

impl CameraPreset {
    /// Firmware defaults
    pub fn reset() -> Self {
        Self {
            id: preset_ids::RESET,
            name: "Reset to default",
            success_message: "Camera settings reset",
            settings: vec![
                ("brightness", 2),
                ("contrast", 2),
                ("saturation", 1),
                ("agc_gain", 30),
                ("gainceiling", 6),
                ("aec_value", 2000),
                ("aec2", 1),
                ("quality", 10),
                ("denoise", 0),
            ],
        }
    }

    /// Dark surroundings: everything at maximum
    pub fn night() -> Self {
        Self {
            id: preset_ids::NIGHT,
            name: "Night mode",
            success_message: "Night mode applied (all settings at maximum)",
            settings: vec![
                ("brightness", 2),
                ("contrast", 2),
                ("saturation", 2),
                ("agc_gain", 30),
                ("gainceiling", 6),
                ("aec_value", 2400),
                ("aec2", 1),
                ("quality", 10),
                ("denoise", 4),
            ],
        }
    }

    pub fn day() -> Self {
        Self {
            id: preset_ids::DAY,
            name: "Day mode",
            success_message: "Day mode applied",
            settings: vec![
                ("brightness", 0),
                ("contrast", 2),
                ("saturation", 2),
                ("agc_gain", 10),
                ("gainceiling", 3),
                ("aec_value", 100),
                ("aec2", 1),
                ("quality", 10),
                ("denoise", 0),
            ],
        }
    }

    /// Office lighting
    pub fn indoor() -> Self {
        Self {
            id: preset_ids::INDOOR,
            name: "Indoor mode",
            success_message: "Indoor mode applied",
            settings: vec![
                ("brightness", 1),
                ("contrast", 2),
                ("saturation", 1),
                ("sharpness", 0),
                ("agc_gain", 20),
                ("gainceiling", 5),
                ("aec_value", 800),
                ("ae_level", 1),
                ("awb", 1),
                ("wb_mode", 3),
                ("quality", 10),
                ("denoise", 2),
            ],
        }
    }

    /// Natural daylight outside
    pub fn outdoor() -> Self {
        Self {
            id: preset_ids::OUTDOOR,
            name: "Outdoor mode",
            success_message: "Outdoor mode applied",
            settings: vec![
                ("brightness", 0),
                ("contrast", 2),
                ("saturation", 2),
                ("sharpness", 2),
                ("agc_gain", 8),
                ("gainceiling", 2),
                ("aec_value", 50),
                ("ae_level", 0),
                ("awb", 1),
                ("wb_mode", 1),
                ("quality", 8),
                ("denoise", 0),
            ],
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![
            Self::reset(),
            Self::day(),
            Self::night(),
            Self::indoor(),
            Self::outdoor(),
        ]
    }

    pub fn find(id: &str) -> Option<Self> {
        Self::builtin().into_iter().find(|p| p.id == id)
    }
}

/// Outcome counts of one preset run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PresetReport {
    pub applied: usize,
    pub failed: usize,
}

/// Applies presets through the single-shot parameter request
pub struct PresetApplier {
    device: Arc<dyn DeviceApi>,
    ui: Arc<dyn UiPort>,
    log: Arc<LogSink>,
}

impl PresetApplier {
    pub fn new(device: Arc<dyn DeviceApi>, ui: Arc<dyn UiPort>, log: Arc<LogSink>) -> Self {
        Self { device, ui, log }
    }

    /// Send every pair in order; a failed pair is logged and skipped over
    pub async fn apply(&self, preset: &CameraPreset) -> PresetReport {
        tracing::info!(preset = preset.id, params = preset.settings.len(), "Applying camera preset");

        let mut report = PresetReport::default();
        for &(param, value) in &preset.settings {
            let failure = match self.device.set_camera_param(param, value).await {
                Ok(ParamOutcome::Applied) => None,
                Ok(ParamOutcome::Unsupported) => Some("unsupported by firmware".to_string()),
                Ok(ParamOutcome::Rejected { detail }) => {
                    Some(detail.unwrap_or_else(|| "rejected".to_string()))
                }
                Err(e) => Some(e.to_string()),
            };

            // The control reflects the preset either way
            self.ui.set_slider(param, value);

            match failure {
                None => report.applied += 1,
                Some(reason) => {
                    report.failed += 1;
                    tracing::warn!(preset = preset.id, param, value, reason = %reason, "Preset parameter failed");
                    self.log
                        .error(format!("Failed to set {}={}: {}", param, value, reason))
                        .await;
                }
            }
        }

        self.log.success(preset.success_message).await;
        report
    }
}
