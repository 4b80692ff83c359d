//! DeviceClient - ESP32-CAM HTTP API Adapter
//!
//! ## Responsibilities
//!
//! - Status, capture, control, speed, LED and camera endpoints
//! - Response classification (accepted / rejected / unsupported)
//! - Request timeout
//!
//! Pollers and dispatchers only see the [`DeviceApi`] trait.

pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use types::*;

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Operations the panel issues against the device
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// `GET /api/status`. A payload carrying an `error` field is an error.
    async fn fetch_status(&self) -> Result<DeviceStatus>;

    /// `GET /capture?t=<stamp>`
    async fn capture(&self, stamp: i64) -> Result<Vec<u8>>;

    /// Motion, speed or LED command
    async fn send_command(&self, command: &DeviceCommand) -> Result<CommandOutcome>;

    /// `GET /api/camera/<param>?value=<value>`
    async fn set_camera_param(&self, param: &str, value: i64) -> Result<ParamOutcome>;
}

/// reqwest-backed [`DeviceApi`]
pub struct HttpDeviceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDeviceClient {
    /// Create new client for `base_url` (e.g. `http://192.168.0.65`)
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a `{ success }` reply. Non-2xx answers without a JSON body
    /// count as rejected.
    fn classify_reply(status: StatusCode, body: &[u8]) -> Result<CommandOutcome> {
        match serde_json::from_slice::<CommandReply>(body) {
            Ok(reply) if reply.success && status.is_success() => Ok(CommandOutcome::Accepted),
            Ok(reply) => Ok(CommandOutcome::Rejected {
                detail: reply
                    .error
                    .or(reply.message)
                    .or_else(|| (!status.is_success()).then(|| format!("HTTP {}", status.as_u16()))),
            }),
            Err(_) if !status.is_success() => Ok(CommandOutcome::Rejected {
                detail: Some(format!("HTTP {}", status.as_u16())),
            }),
            Err(e) => Err(Error::Serialization(e)),
        }
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceClient {
    async fn fetch_status(&self) -> Result<DeviceStatus> {
        let path = "/api/status";
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        let parsed = serde_json::from_slice::<DeviceStatus>(&body);
        if !status.is_success() {
            // Error bodies may still explain what happened
            if let Some(msg) = parsed.ok().and_then(|s| s.error_message()) {
                return Err(Error::Device(msg));
            }
            return Err(Error::DeviceStatus {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let snapshot = parsed?;
        if let Some(msg) = snapshot.error_message() {
            return Err(Error::Device(msg));
        }

        Ok(snapshot)
    }

    async fn capture(&self, stamp: i64) -> Result<Vec<u8>> {
        let path = format!("/capture?t={}", stamp);
        let resp = self.client.get(self.url(&path)).send().await?;

        if !resp.status().is_success() {
            return Err(Error::DeviceStatus {
                status: resp.status().as_u16(),
                path,
            });
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::Device("empty frame".to_string()));
        }

        Ok(bytes.to_vec())
    }

    async fn send_command(&self, command: &DeviceCommand) -> Result<CommandOutcome> {
        let resp = self.client.get(self.url(&command.path())).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        tracing::debug!(command = %command, status = %status, "Device command answered");

        Self::classify_reply(status, &body)
    }

    async fn set_camera_param(&self, param: &str, value: i64) -> Result<ParamOutcome> {
        let path = format!(
            "/api/camera/{}?value={}",
            urlencoding::encode(param),
            value
        );
        let resp = self.client.get(self.url(&path)).send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_IMPLEMENTED {
            return Ok(ParamOutcome::Unsupported);
        }

        let body = resp.bytes().await?;
        Ok(match Self::classify_reply(status, &body)? {
            CommandOutcome::Accepted => ParamOutcome::Applied,
            CommandOutcome::Rejected { detail } => ParamOutcome::Rejected { detail },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpDeviceClient::new("http://192.168.0.65/", Duration::from_secs(2)).unwrap();
        assert_eq!(client.base_url(), "http://192.168.0.65");
        assert_eq!(client.url("/api/status"), "http://192.168.0.65/api/status");
    }

    #[test]
    fn test_classify_success() {
        let outcome =
            HttpDeviceClient::classify_reply(StatusCode::OK, br#"{"success":true}"#).unwrap();
        assert_eq!(outcome, CommandOutcome::Accepted);
    }

    #[test]
    fn test_classify_rejected_with_detail() {
        let outcome = HttpDeviceClient::classify_reply(
            StatusCode::OK,
            br#"{"success":false,"error":"motor driver fault"}"#,
        )
        .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Rejected {
                detail: Some("motor driver fault".to_string())
            }
        );
    }

    #[test]
    fn test_classify_error_status_without_json() {
        let outcome =
            HttpDeviceClient::classify_reply(StatusCode::BAD_GATEWAY, b"<html>").unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Rejected {
                detail: Some("HTTP 502".to_string())
            }
        );
    }

    #[test]
    fn test_classify_garbage_on_ok_is_parse_error() {
        let result = HttpDeviceClient::classify_reply(StatusCode::OK, b"not json");
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
