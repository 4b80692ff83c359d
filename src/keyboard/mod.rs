//! Keyboard Control Bridge
//!
//! Arrow keys / WASD drive the car while held, space or S stops, `+`/`-`
//! change speed, L toggles the LED. Nothing is mapped while a text input
//! has focus.

use crate::command_dispatcher::CommandDispatcher;
use crate::device_client::{
    DeviceCommand, LedAction, MotionCommand, SpeedDirection, SPEED_STEP_DEFAULT,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Key event from the page
#[derive(Debug, Clone, Deserialize)]
pub struct KeyEvent {
    /// `KeyboardEvent.key` value (`"ArrowUp"`, `"w"`, `" "`, ...)
    pub key: String,
    /// Focus target is a text input
    #[serde(default)]
    pub text_input: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text_input: false,
        }
    }

    pub fn in_text_input(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text_input: true,
        }
    }
}

/// What the bridge did with a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyResponse {
    pub command: Option<DeviceCommand>,
    /// The page should suppress the browser's default action
    pub prevent_default: bool,
}

/// Keys that move the car; releasing one stops it
pub fn is_directional(key: &str) -> bool {
    matches!(
        key,
        "ArrowUp" | "ArrowLeft" | "ArrowRight" | "w" | "W" | "a" | "A" | "d" | "D"
    )
}

/// Key-down mapping
pub fn command_for_key(key: &str, speed_step: u32) -> Option<DeviceCommand> {
    let command = match key {
        "ArrowUp" | "w" | "W" => DeviceCommand::Motion(MotionCommand::Center),
        "ArrowLeft" | "a" | "A" => DeviceCommand::Motion(MotionCommand::Left),
        "ArrowRight" | "d" | "D" => DeviceCommand::Motion(MotionCommand::Right),
        " " | "s" | "S" => DeviceCommand::STOP,
        "+" | "=" => DeviceCommand::speed(SpeedDirection::Plus, speed_step),
        "-" | "_" => DeviceCommand::speed(SpeedDirection::Minus, speed_step),
        "l" | "L" => DeviceCommand::Led(LedAction::Toggle),
        _ => return None,
    };
    Some(command)
}

/// Maps key events onto dispatcher calls
pub struct KeyboardBridge {
    dispatcher: Arc<CommandDispatcher>,
    speed_step: u32,
}

impl KeyboardBridge {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self {
            dispatcher,
            speed_step: SPEED_STEP_DEFAULT,
        }
    }

    pub fn on_key_down(&self, event: &KeyEvent) -> KeyResponse {
        if event.text_input {
            return KeyResponse::default();
        }

        match command_for_key(&event.key, self.speed_step) {
            Some(command) => {
                self.dispatcher.dispatch(command);
                KeyResponse {
                    command: Some(command),
                    prevent_default: true,
                }
            }
            None => KeyResponse::default(),
        }
    }

    /// Momentary control: letting go of a direction stops the car
    pub fn on_key_up(&self, event: &KeyEvent) -> KeyResponse {
        if event.text_input || !is_directional(&event.key) {
            return KeyResponse::default();
        }

        self.dispatcher.dispatch(DeviceCommand::STOP);
        KeyResponse {
            command: Some(DeviceCommand::STOP),
            prevent_default: false,
        }
    }
}
