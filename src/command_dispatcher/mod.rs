//! CommandDispatcher - Motion, Speed and LED Commands
//!
//! Fire-and-forget: [`CommandDispatcher::dispatch`] spawns the request and
//! returns at once. The outcome only shows up in the activity log (and, for
//! the LED switch, as a rollback of the optimistic toggle).

use crate::device_client::{
    CommandOutcome, DeviceApi, DeviceCommand, LedAction, SpeedDirection,
};
use crate::log_sink::LogSink;
use crate::status_poller::StatusPoller;
use crate::ui_port::UiPort;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// CommandDispatcher instance
pub struct CommandDispatcher {
    device: Arc<dyn DeviceApi>,
    ui: Arc<dyn UiPort>,
    log: Arc<LogSink>,
    status: Arc<StatusPoller>,
    refresh_delay: Duration,
}

impl CommandDispatcher {
    pub fn new(
        device: Arc<dyn DeviceApi>,
        ui: Arc<dyn UiPort>,
        log: Arc<LogSink>,
        status: Arc<StatusPoller>,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            device,
            ui,
            log,
            status,
            refresh_delay,
        }
    }

    /// Issue `command` in the background; the handle may be ignored
    pub fn dispatch(self: &Arc<Self>, command: DeviceCommand) -> JoinHandle<bool> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.execute(&command).await })
    }

    /// Issue `command` and log the outcome. Returns true when accepted.
    pub async fn execute(&self, command: &DeviceCommand) -> bool {
        tracing::info!(command = %command, "Sending device command");

        match self.device.send_command(command).await {
            Ok(CommandOutcome::Accepted) => {
                self.log.success(success_message(command)).await;
                if command.mutates_status() {
                    self.status.schedule_refresh(self.refresh_delay);
                }
                true
            }
            Ok(CommandOutcome::Rejected { detail }) => {
                let message = match detail {
                    Some(detail) => format!("{} ({})", failure_message(command), detail),
                    None => failure_message(command),
                };
                self.log.error(message).await;
                false
            }
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "Device command failed");
                self.log
                    .error(format!("{} error: {}", category(command), e))
                    .await;
                false
            }
        }
    }

    /// Optimistic LED switch: the toggle flips before this returns; the
    /// request and any rollback run in the background
    pub fn set_led_switch(self: &Arc<Self>, on: bool) -> JoinHandle<bool> {
        let prior = self.flip_led_switch(on);
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.send_led_switch(on, prior).await })
    }

    pub async fn apply_led_switch(&self, on: bool) -> bool {
        let prior = self.flip_led_switch(on);
        self.send_led_switch(on, prior).await
    }

    /// Returns the state before the flip
    fn flip_led_switch(&self, on: bool) -> bool {
        let prior = self.ui.led_switch();
        self.ui.set_led_switch(on);
        prior
    }

    async fn send_led_switch(&self, on: bool, prior: bool) -> bool {
        let action = if on { LedAction::On } else { LedAction::Off };
        let accepted = self.execute(&DeviceCommand::Led(action)).await;
        if !accepted {
            self.ui.set_led_switch(prior);
            tracing::debug!(prior, "LED switch rolled back");
        }
        accepted
    }
}

fn category(command: &DeviceCommand) -> &'static str {
    match command {
        DeviceCommand::Motion(_) => "Motor control",
        DeviceCommand::Speed { .. } => "Speed control",
        DeviceCommand::Led(_) => "LED control",
    }
}

fn success_message(command: &DeviceCommand) -> String {
    match command {
        DeviceCommand::Motion(cmd) => format!("Motor control: {}", cmd.as_str()),
        DeviceCommand::Speed { direction: SpeedDirection::Plus, step } => {
            format!("Speed increased: {}", step)
        }
        DeviceCommand::Speed { direction: SpeedDirection::Minus, step } => {
            format!("Speed decreased: {}", step)
        }
        DeviceCommand::Led(action) => format!("LED {}", action.as_str()),
    }
}

fn failure_message(command: &DeviceCommand) -> String {
    match command {
        DeviceCommand::Motion(cmd) => format!("Motor control failed: {}", cmd.as_str()),
        _ => format!("{} failed", category(command)),
    }
}
