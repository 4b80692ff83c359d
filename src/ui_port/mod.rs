//! UI Port - Presentation Boundary
//!
//! Pollers and dispatchers push display changes through [`UiPort`] instead of
//! touching a document model. [`PanelView`] is the in-memory implementation
//! backing the web API (and the unit tests).

use crate::connection_tracker::ConnectionState;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Status field ids
pub mod fields {
    pub const IP_ADDRESS: &str = "ip-address";
    pub const MOTOR_STATUS: &str = "motor-status";
    pub const CURRENT_COMMAND: &str = "current-command";
    pub const LED_STATUS: &str = "led-status";
    pub const SPEED_VALUE: &str = "speed-value";
    pub const SPEED_DISPLAY: &str = "speed-display";

    /// Read-only value label for a camera setting (e.g. `brightness-value`)
    pub fn setting_value(param: &str) -> String {
        format!("{}-value", param)
    }
}

/// Shown for absent or null status fields
pub const PLACEHOLDER: &str = "-";
/// Placeholder of the big speed readout
pub const SPEED_PLACEHOLDER: &str = "--";

/// Display surface the panel logic drives
pub trait UiPort: Send + Sync {
    /// Set a text field by id
    fn set_field(&self, field: &str, value: &str);

    fn set_connection(&self, state: ConnectionState);

    fn set_led_switch(&self, on: bool);

    fn led_switch(&self) -> bool;

    /// Set a slider and its display unless the user is dragging it.
    /// Returns false when the update was skipped.
    fn set_slider_if_idle(&self, param: &str, value: i64) -> bool;

    /// Set a slider and its display unconditionally
    fn set_slider(&self, param: &str, value: i64);

    /// Update only the numeric label next to a slider
    fn set_param_display(&self, param: &str, value: &str);

    /// Permanently disable a parameter's input control
    fn disable_control(&self, param: &str);

    fn show_frame(&self, frame: Vec<u8>);

    /// `None` hides the overlay
    fn set_overlay(&self, message: Option<&str>);

    fn set_fps(&self, fps: u32);
}

/// Serializable copy of everything the view shows (except frame bytes)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewSnapshot {
    pub fields: BTreeMap<String, String>,
    pub sliders: BTreeMap<String, i64>,
    pub displays: BTreeMap<String, String>,
    pub active_sliders: BTreeSet<String>,
    pub disabled_controls: BTreeSet<String>,
    pub led_switch: bool,
    pub connection: Option<ConnectionState>,
    pub connection_text: String,
    pub overlay: Option<String>,
    pub fps: u32,
    pub fps_text: String,
    pub frames_shown: u64,
}

#[derive(Default)]
struct ViewState {
    snapshot: ViewSnapshot,
    frame: Option<Arc<Vec<u8>>>,
}

/// In-memory [`UiPort`]
#[derive(Default)]
pub struct PanelView {
    state: Mutex<ViewState>,
}

impl PanelView {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        // A panicked writer leaves plain data behind; keep serving it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The user started dragging a slider
    pub fn grab_slider(&self, param: &str) {
        self.state().snapshot.active_sliders.insert(param.to_string());
    }

    /// The user let go of a slider
    pub fn release_slider(&self, param: &str) {
        self.state().snapshot.active_sliders.remove(param);
    }

    pub fn field(&self, id: &str) -> Option<String> {
        self.state().snapshot.fields.get(id).cloned()
    }

    pub fn slider(&self, param: &str) -> Option<i64> {
        self.state().snapshot.sliders.get(param).copied()
    }

    pub fn display(&self, param: &str) -> Option<String> {
        self.state().snapshot.displays.get(param).cloned()
    }

    pub fn is_disabled(&self, param: &str) -> bool {
        self.state().snapshot.disabled_controls.contains(param)
    }

    pub fn connection(&self) -> Option<ConnectionState> {
        self.state().snapshot.connection
    }

    pub fn overlay(&self) -> Option<String> {
        self.state().snapshot.overlay.clone()
    }

    pub fn fps(&self) -> u32 {
        self.state().snapshot.fps
    }

    pub fn latest_frame(&self) -> Option<Arc<Vec<u8>>> {
        self.state().frame.clone()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.state().snapshot.clone()
    }
}

impl UiPort for PanelView {
    fn set_field(&self, field: &str, value: &str) {
        self.state()
            .snapshot
            .fields
            .insert(field.to_string(), value.to_string());
    }

    fn set_connection(&self, state: ConnectionState) {
        let mut view = self.state();
        view.snapshot.connection = Some(state);
        view.snapshot.connection_text = state.label().to_string();
    }

    fn set_led_switch(&self, on: bool) {
        self.state().snapshot.led_switch = on;
    }

    fn led_switch(&self) -> bool {
        self.state().snapshot.led_switch
    }

    fn set_slider_if_idle(&self, param: &str, value: i64) -> bool {
        let mut view = self.state();
        if view.snapshot.active_sliders.contains(param) {
            return false;
        }
        view.snapshot.sliders.insert(param.to_string(), value);
        view.snapshot
            .displays
            .insert(param.to_string(), value.to_string());
        true
    }

    fn set_slider(&self, param: &str, value: i64) {
        let mut view = self.state();
        view.snapshot.sliders.insert(param.to_string(), value);
        view.snapshot
            .displays
            .insert(param.to_string(), value.to_string());
    }

    fn set_param_display(&self, param: &str, value: &str) {
        self.state()
            .snapshot
            .displays
            .insert(param.to_string(), value.to_string());
    }

    fn disable_control(&self, param: &str) {
        self.state()
            .snapshot
            .disabled_controls
            .insert(param.to_string());
    }

    fn show_frame(&self, frame: Vec<u8>) {
        let mut view = self.state();
        view.frame = Some(Arc::new(frame));
        view.snapshot.frames_shown += 1;
    }

    fn set_overlay(&self, message: Option<&str>) {
        self.state().snapshot.overlay = message.map(str::to_string);
    }

    fn set_fps(&self, fps: u32) {
        let mut view = self.state();
        view.snapshot.fps = fps;
        view.snapshot.fps_text = format!("FPS: {}", fps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grabbed_slider_not_overwritten() {
        let view = PanelView::new();
        view.set_slider("brightness", 1);
        view.grab_slider("brightness");

        assert!(!view.set_slider_if_idle("brightness", -2));
        assert_eq!(view.slider("brightness"), Some(1));

        view.release_slider("brightness");
        assert!(view.set_slider_if_idle("brightness", -2));
        assert_eq!(view.slider("brightness"), Some(-2));
        assert_eq!(view.display("brightness").as_deref(), Some("-2"));
    }

    #[test]
    fn test_grab_is_per_slider() {
        let view = PanelView::new();
        view.grab_slider("contrast");
        assert!(view.set_slider_if_idle("brightness", 0));
    }

    #[test]
    fn test_frame_and_overlay() {
        let view = PanelView::new();
        view.set_overlay(Some("Camera connection failed"));
        view.show_frame(vec![1, 2, 3]);
        view.set_overlay(None);

        assert_eq!(view.latest_frame().unwrap().as_slice(), &[1, 2, 3]);
        assert!(view.overlay().is_none());
        assert_eq!(view.snapshot().frames_shown, 1);
    }

    #[test]
    fn test_fps_text() {
        let view = PanelView::new();
        view.set_fps(9);
        assert_eq!(view.snapshot().fps_text, "FPS: 9");
    }
}
