//! Shared request/response types of the web API

use crate::camera_params::{self, CameraParamSpec};
use crate::log_sink::{LogEntry, Severity};
use crate::ui_port::ViewSnapshot;
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub device_url: String,
}

/// Everything the page renders, in one payload
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    #[serde(flatten)]
    pub view: ViewSnapshot,
    /// Newest first
    pub log: Vec<LogLine>,
}

/// Activity log line as rendered on the page
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub id: u64,
    /// Local `HH:MM:SS`
    pub time: String,
    pub message: String,
    pub severity: Severity,
}

impl From<LogEntry> for LogLine {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            time: entry.time_label(),
            message: entry.message,
            severity: entry.severity,
        }
    }
}

/// Catalog entry with the page element ids of its controls
#[derive(Debug, Clone, Serialize)]
pub struct CameraParamInfo {
    #[serde(flatten)]
    pub spec: CameraParamSpec,
    pub slider_id: String,
    pub display_id: String,
}

impl From<&CameraParamSpec> for CameraParamInfo {
    fn from(spec: &CameraParamSpec) -> Self {
        Self {
            spec: *spec,
            slider_id: camera_params::slider_id(spec.name),
            display_id: camera_params::display_id(spec.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    Down,
    Up,
}

/// POST /api/panel/keys
#[derive(Debug, Clone, Deserialize)]
pub struct KeyRequest {
    pub key: String,
    pub phase: KeyPhase,
    #[serde(default)]
    pub text_input: bool,
}

/// POST /api/panel/led-switch
#[derive(Debug, Clone, Deserialize)]
pub struct LedSwitchRequest {
    pub on: bool,
}

/// POST /api/panel/camera/:param
///
/// `value` is the raw slider text; a JSON number is accepted too.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraParamRequest {
    pub value: serde_json::Value,
}

impl CameraParamRequest {
    pub fn raw_value(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Query of POST /api/panel/speed/:op
#[derive(Debug, Clone, Deserialize)]
pub struct SpeedQuery {
    pub step: Option<u32>,
}

/// Reply of the command-issuing endpoints
#[derive(Debug, Clone, Serialize)]
pub struct CommandAccepted {
    pub command: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_param_raw_value() {
        let text: CameraParamRequest = serde_json::from_str(r#"{"value":"12"}"#).unwrap();
        assert_eq!(text.raw_value(), "12");

        let number: CameraParamRequest = serde_json::from_str(r#"{"value":1200.0}"#).unwrap();
        assert_eq!(number.raw_value(), "1200.0");
    }

    #[test]
    fn test_camera_param_info_ids() {
        let spec = camera_params::lookup("agc_gain").unwrap();
        let info = CameraParamInfo::from(spec);
        assert_eq!(info.slider_id, "agc-slider");
        assert_eq!(info.display_id, "agc-display");
    }

    #[test]
    fn test_key_request_defaults() {
        let req: KeyRequest = serde_json::from_str(r#"{"key":"w","phase":"up"}"#).unwrap();
        assert_eq!(req.phase, KeyPhase::Up);
        assert!(!req.text_input);
    }
}
