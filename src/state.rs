//! Application state
//!
//! Holds the configuration and the shared panel components

use crate::control_panel::{ControlPanel, PanelTiming};
use crate::error::{Error, Result};
use crate::log_sink::DEFAULT_LOG_CAPACITY;
use crate::ui_port::PanelView;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// ESP32-CAM base URL
    pub device_url: String,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Per-request timeout against the device
    pub request_timeout: Duration,
    pub status_interval: Duration,
    pub frame_interval: Duration,
    pub fps_interval: Duration,
    /// Quiet period of camera parameter edits
    pub param_debounce: Duration,
    /// Delay of the status refresh after a speed/LED command
    pub refresh_delay: Duration,
    /// Activity log entries kept
    pub log_capacity: usize,
    /// Frontend assets served as fallback
    pub static_dir: Option<PathBuf>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_millis(key: &str, default: u64) -> Duration {
    Duration::from_millis(env_or(key, default))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_url: std::env::var("DEVICE_URL")
                .unwrap_or_else(|_| "http://192.168.0.65".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 5000),
            request_timeout: env_millis("REQUEST_TIMEOUT_MS", 2000),
            status_interval: env_millis("STATUS_INTERVAL_MS", 1000),
            frame_interval: env_millis("FRAME_INTERVAL_MS", 100),
            fps_interval: env_millis("FPS_INTERVAL_MS", 1000),
            param_debounce: env_millis("PARAM_DEBOUNCE_MS", 300),
            refresh_delay: env_millis("REFRESH_DELAY_MS", 100),
            log_capacity: env_or("LOG_CAPACITY", DEFAULT_LOG_CAPACITY).max(1),
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
        }
    }
}

impl AppConfig {
    /// Reject settings the panel cannot run with
    pub fn validate(&self) -> Result<()> {
        let intervals = [
            ("STATUS_INTERVAL_MS", self.status_interval),
            ("FRAME_INTERVAL_MS", self.frame_interval),
            ("FPS_INTERVAL_MS", self.fps_interval),
        ];
        for (key, period) in intervals {
            if period.is_zero() {
                return Err(Error::Config(format!("{} must be at least 1", key)));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config("REQUEST_TIMEOUT_MS must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timing(&self) -> PanelTiming {
        PanelTiming {
            status_interval: self.status_interval,
            frame_interval: self.frame_interval,
            fps_interval: self.fps_interval,
            param_debounce: self.param_debounce,
            refresh_delay: self.refresh_delay,
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Panel components
    pub panel: Arc<ControlPanel>,
    /// Display state the panel writes to
    pub view: Arc<PanelView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_follows_config() {
        let config = AppConfig {
            param_debounce: Duration::from_millis(450),
            ..AppConfig::default()
        };
        let timing = config.timing();
        assert_eq!(timing.param_debounce, Duration::from_millis(450));
        assert_eq!(timing.status_interval, config.status_interval);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = AppConfig {
            frame_interval: Duration::ZERO,
            ..AppConfig::default()
        };
        match config.validate() {
            Err(Error::Config(msg)) => assert!(msg.contains("FRAME_INTERVAL_MS")),
            other => panic!("expected config error, got {:?}", other),
        }

        let config = AppConfig {
            status_interval: Duration::ZERO,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        std::env::set_var("ESP32CAM_PANEL_TEST_PORT", "not-a-port");
        assert_eq!(env_or::<u16>("ESP32CAM_PANEL_TEST_PORT", 5000), 5000);
        std::env::set_var("ESP32CAM_PANEL_TEST_PORT", "8081");
        assert_eq!(env_or::<u16>("ESP32CAM_PANEL_TEST_PORT", 5000), 8081);
    }
}
