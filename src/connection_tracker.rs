//! Connection State Tracker
//!
//! Derives the connected/disconnected indicator from the latest status poll.
//! Only the status poller mutates it.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Device connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Initial state (never polled)
    Unknown,
    /// Last status fetch succeeded without an error field
    Connected,
    /// Last status fetch failed or carried an error field
    Disconnected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "Checking connection...",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Connection transition event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Went from Connected (or Unknown) to Disconnected
    Lost,
    /// Went from Disconnected to Connected
    Recovered,
}

/// Tracks the device connection and detects transitions
pub struct ConnectionTracker {
    state: RwLock<ConnectionState>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ConnectionState::Unknown),
        }
    }

    /// Record the outcome of a status poll and return the transition, if any
    pub async fn update(&self, connected: bool) -> Option<ConnectionEvent> {
        let mut state = self.state.write().await;
        let prev = *state;
        let next = if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        *state = next;

        match (prev, next) {
            (ConnectionState::Connected, ConnectionState::Disconnected) => {
                tracing::warn!("Device connection lost");
                Some(ConnectionEvent::Lost)
            }
            (ConnectionState::Disconnected, ConnectionState::Connected) => {
                tracing::info!("Device connection recovered");
                Some(ConnectionEvent::Recovered)
            }
            (ConnectionState::Unknown, ConnectionState::Disconnected) => {
                tracing::warn!("Initial status poll failed - marking as disconnected");
                Some(ConnectionEvent::Lost)
            }
            _ => None,
        }
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_connected_no_event() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.state().await, ConnectionState::Unknown);
        assert!(tracker.update(true).await.is_none());
        assert_eq!(tracker.state().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_initial_failure_triggers_lost() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.update(false).await, Some(ConnectionEvent::Lost));
    }

    #[tokio::test]
    async fn test_connected_to_disconnected_triggers_lost() {
        let tracker = ConnectionTracker::new();
        tracker.update(true).await;
        assert_eq!(tracker.update(false).await, Some(ConnectionEvent::Lost));
        assert_eq!(tracker.state().await, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnected_to_connected_triggers_recovered() {
        let tracker = ConnectionTracker::new();
        tracker.update(false).await;
        assert_eq!(tracker.update(true).await, Some(ConnectionEvent::Recovered));
    }

    #[tokio::test]
    async fn test_repeated_failure_no_event() {
        let tracker = ConnectionTracker::new();
        tracker.update(false).await;
        assert!(tracker.update(false).await.is_none());
    }
}
