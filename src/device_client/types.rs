//! Device API type definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Smallest speed step the firmware accepts
pub const SPEED_STEP_MIN: u32 = 1;
/// Largest speed step the firmware accepts
pub const SPEED_STEP_MAX: u32 = 100;
/// Step used by the keyboard and the speed buttons
pub const SPEED_STEP_DEFAULT: u32 = 10;

/// Camera tuning values reported in `/api/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub brightness: Option<i64>,
    pub contrast: Option<i64>,
    pub agc_gain: Option<i64>,
    /// Any other setting the firmware variant reports
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl CameraSettings {
    /// Value of a named setting, if reported as an integer
    pub fn get(&self, param: &str) -> Option<i64> {
        match param {
            "brightness" => self.brightness,
            "contrast" => self.contrast,
            "agc_gain" => self.agc_gain,
            other => self.extra.get(other).and_then(|v| v.as_i64()),
        }
    }

    /// Integer settings beyond the three the firmware always reports
    pub fn extra_values(&self) -> impl Iterator<Item = (&str, i64)> {
        self.extra
            .iter()
            .filter_map(|(k, v)| v.as_i64().map(|n| (k.as_str(), n)))
    }
}

/// Device status snapshot (`GET /api/status`)
///
/// Every field is optional: the firmware omits or nulls fields it cannot
/// report, and the panel renders those as placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub ip_address: Option<String>,
    pub motor_status: Option<String>,
    pub current_command: Option<String>,
    pub led_state: Option<String>,
    pub speed: Option<i64>,
    pub camera_settings: Option<CameraSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl DeviceStatus {
    /// Error indicator carried by the payload, if any
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| match e {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// `Some(true)` when the motor reports `running`
    pub fn motor_running(&self) -> Option<bool> {
        self.motor_status.as_deref().map(|s| s == "running")
    }

    /// `Some(true)` when the LED reports `on`
    pub fn led_on(&self) -> Option<bool> {
        self.led_state.as_deref().map(|s| s == "on")
    }
}

/// Reply body of control, speed, LED and camera endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandReply {
    #[serde(default)]
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Result of a command the device answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// `success: true`
    Accepted,
    /// `success: false` or an error status
    Rejected { detail: Option<String> },
}

/// Result of a camera parameter request the device answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamOutcome {
    Applied,
    Rejected { detail: Option<String> },
    /// HTTP 501: this firmware variant does not implement the parameter
    Unsupported,
}

/// Motion command (`/api/control/<cmd>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionCommand {
    Center,
    Left,
    Right,
    Stop,
}

impl MotionCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Stop => "stop",
        }
    }
}

impl FromStr for MotionCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "center" => Ok(Self::Center),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "stop" => Ok(Self::Stop),
            other => Err(Error::Validation(format!("Invalid command: {}", other))),
        }
    }
}

/// Speed adjustment direction (`/api/speed/<op>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedDirection {
    Plus,
    Minus,
}

impl SpeedDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "plus",
            Self::Minus => "minus",
        }
    }
}

impl FromStr for SpeedDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "plus" => Ok(Self::Plus),
            "minus" => Ok(Self::Minus),
            other => Err(Error::Validation(format!("Invalid operation: {}", other))),
        }
    }
}

/// LED action (`/api/led/<state>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedAction {
    On,
    Off,
    Toggle,
}

impl LedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
        }
    }
}

impl FromStr for LedAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            other => Err(Error::Validation(format!("Invalid state: {}", other))),
        }
    }
}

/// Discrete device command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DeviceCommand {
    Motion(MotionCommand),
    Speed { direction: SpeedDirection, step: u32 },
    Led(LedAction),
}

impl DeviceCommand {
    pub const STOP: DeviceCommand = DeviceCommand::Motion(MotionCommand::Stop);

    /// Speed step command, with the step clamped to what the firmware accepts
    pub fn speed(direction: SpeedDirection, step: u32) -> Self {
        Self::Speed {
            direction,
            step: step.clamp(SPEED_STEP_MIN, SPEED_STEP_MAX),
        }
    }

    /// Request path (with query) on the device
    pub fn path(&self) -> String {
        match self {
            Self::Motion(cmd) => format!("/api/control/{}", cmd.as_str()),
            Self::Speed { direction, step } => {
                format!("/api/speed/{}?step={}", direction.as_str(), step)
            }
            Self::Led(action) => format!("/api/led/{}", action.as_str()),
        }
    }

    /// Speed and LED commands change state shown by the status poll
    pub fn mutates_status(&self) -> bool {
        !matches!(self, Self::Motion(_))
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motion(cmd) => write!(f, "motor {}", cmd.as_str()),
            Self::Speed { direction, step } => write!(f, "speed {} {}", direction.as_str(), step),
            Self::Led(action) => write!(f, "led {}", action.as_str()),
        }
    }
}
