//! In-memory DeviceApi for unit tests

use super::{CommandOutcome, DeviceApi, DeviceCommand, DeviceStatus, ParamOutcome};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Request seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Status,
    Capture(i64),
    Command(String),
    CameraParam(String, i64),
}

pub struct MockDevice {
    /// `None` simulates a transport failure
    status: Mutex<Option<DeviceStatus>>,
    capture_ok: AtomicBool,
    commands_accepted: AtomicBool,
    transport_down: AtomicBool,
    unsupported: Mutex<HashSet<String>>,
    rejected: Mutex<HashSet<String>>,
    calls: Mutex<Vec<DeviceCall>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(Some(DeviceStatus::default())),
            capture_ok: AtomicBool::new(true),
            commands_accepted: AtomicBool::new(true),
            transport_down: AtomicBool::new(false),
            unsupported: Mutex::new(HashSet::new()),
            rejected: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_status(&self, status: Option<DeviceStatus>) {
        *self.status.lock().unwrap() = status;
    }

    pub fn set_capture_ok(&self, ok: bool) {
        self.capture_ok.store(ok, Ordering::SeqCst);
    }

    pub fn set_commands_accepted(&self, accepted: bool) {
        self.commands_accepted.store(accepted, Ordering::SeqCst);
    }

    /// Commands and camera params fail at the transport level
    pub fn set_transport_down(&self, down: bool) {
        self.transport_down.store(down, Ordering::SeqCst);
    }

    pub fn mark_unsupported(&self, param: &str) {
        self.unsupported.lock().unwrap().insert(param.to_string());
    }

    pub fn mark_rejected(&self, param: &str) {
        self.rejected.lock().unwrap().insert(param.to_string());
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn param_calls(&self) -> Vec<(String, i64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::CameraParam(p, v) => Some((p, v)),
                _ => None,
            })
            .collect()
    }

    pub fn command_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DeviceCall::Command(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: fn(&DeviceCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| wanted(c)).count()
    }

    fn record(&self, call: DeviceCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn transport_error() -> Error {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ))
    }
}

#[async_trait]
impl DeviceApi for MockDevice {
    async fn fetch_status(&self) -> Result<DeviceStatus> {
        self.record(DeviceCall::Status);
        let status = self.status.lock().unwrap().clone();
        match status {
            Some(s) => match s.error_message() {
                Some(msg) => Err(Error::Device(msg)),
                None => Ok(s),
            },
            None => Err(Self::transport_error()),
        }
    }

    async fn capture(&self, stamp: i64) -> Result<Vec<u8>> {
        self.record(DeviceCall::Capture(stamp));
        if self.capture_ok.load(Ordering::SeqCst) {
            Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])
        } else {
            Err(Self::transport_error())
        }
    }

    async fn send_command(&self, command: &DeviceCommand) -> Result<CommandOutcome> {
        self.record(DeviceCall::Command(command.path()));
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(Self::transport_error());
        }
        if self.commands_accepted.load(Ordering::SeqCst) {
            Ok(CommandOutcome::Accepted)
        } else {
            Ok(CommandOutcome::Rejected {
                detail: Some("rejected by mock".to_string()),
            })
        }
    }

    async fn set_camera_param(&self, param: &str, value: i64) -> Result<ParamOutcome> {
        self.record(DeviceCall::CameraParam(param.to_string(), value));
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(Self::transport_error());
        }
        if self.unsupported.lock().unwrap().contains(param) {
            return Ok(ParamOutcome::Unsupported);
        }
        if self.rejected.lock().unwrap().contains(param) {
            return Ok(ParamOutcome::Rejected { detail: None });
        }
        Ok(ParamOutcome::Applied)
    }
}
