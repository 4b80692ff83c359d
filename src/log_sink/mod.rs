//! LogSink - User-Visible Activity Log (Ring Buffer)
//!
//! ## Responsibilities
//!
//! - Keep the most recent entries, newest first
//! - Evict the oldest entry once capacity is reached
//! - Mirror every entry to tracing

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::RwLock;
use tracing::Level;

/// Default number of entries kept
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Entry severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    /// tracing level the entry is mirrored at
    pub fn level(&self) -> Level {
        match self {
            Self::Info | Self::Success => Level::INFO,
            Self::Error => Level::ERROR,
        }
    }
}

/// Log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    /// Local wall-clock time, as shown next to the message
    pub fn time_label(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
    }
}

/// Newest-first ring buffer
struct LogRing {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl LogRing {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    fn push(&mut self, message: String, severity: Severity) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.entries.push_front(LogEntry {
            id,
            timestamp: Utc::now(),
            message,
            severity,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
        id
    }
}

const CLEARED_MESSAGE: &str = "Log cleared";

fn mirror(message: &str, severity: Severity) {
    if severity.level() == Level::ERROR {
        tracing::error!(message = %message, "panel log");
    } else {
        tracing::info!(message = %message, severity = ?severity, "panel log");
    }
}

/// LogSink instance
pub struct LogSink {
    ring: RwLock<LogRing>,
}

impl LogSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: RwLock::new(LogRing::new(capacity)),
        }
    }

    /// Append an entry; returns its id
    pub async fn push(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();
        mirror(&message, severity);
        self.ring.write().await.push(message, severity)
    }

    pub async fn info(&self, message: impl Into<String>) -> u64 {
        self.push(message, Severity::Info).await
    }

    pub async fn success(&self, message: impl Into<String>) -> u64 {
        self.push(message, Severity::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> u64 {
        self.push(message, Severity::Error).await
    }

    /// All entries, newest first
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.ring.read().await.entries.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.ring.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry, leaving a single "Log cleared" marker
    pub async fn clear(&self) {
        let mut ring = self.ring.write().await;
        ring.entries.clear();
        mirror(CLEARED_MESSAGE, Severity::Info);
        ring.push(CLEARED_MESSAGE.to_string(), Severity::Info);
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_newest_first() {
        let log = LogSink::default();
        log.info("first").await;
        log.success("second").await;

        let entries = log.entries().await;
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[0].severity, Severity::Success);
        assert_eq!(entries[1].message, "first");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let log = LogSink::new(50);
        for i in 0..51 {
            log.info(format!("entry {}", i)).await;
        }

        let entries = log.entries().await;
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].message, "entry 50");
        assert_eq!(entries[49].message, "entry 1");
        assert!(entries.iter().all(|e| e.message != "entry 0"));
    }

    #[tokio::test]
    async fn test_never_exceeds_capacity() {
        let log = LogSink::new(3);
        for i in 0..10 {
            log.error(format!("e{}", i)).await;
            assert!(log.len().await <= 3);
        }
    }

    #[tokio::test]
    async fn test_clear_leaves_marker() {
        let log = LogSink::default();
        log.error("boom").await;
        log.clear().await;

        let entries = log.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Log cleared");
        assert_eq!(entries[0].severity, Severity::Info);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_clear_marker_is_oldest_under_concurrent_pushes() {
        let log = Arc::new(LogSink::new(1000));
        for i in 0..20 {
            log.info(format!("before {}", i)).await;
        }

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let log = log.clone();
                tokio::spawn(async move {
                    for i in 0..50 {
                        log.success(format!("writer {} #{}", w, i)).await;
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        log.clear().await;
        for writer in writers {
            writer.await.unwrap();
        }

        let entries = log.entries().await;
        let markers = entries.iter().filter(|e| e.message == "Log cleared").count();
        assert_eq!(markers, 1);
        assert_eq!(entries.last().unwrap().message, "Log cleared");
        assert!(entries.iter().all(|e| !e.message.starts_with("before")));
    }

    #[test]
    fn test_severity_tracing_level() {
        assert_eq!(Severity::Error.level(), Level::ERROR);
        assert_eq!(Severity::Success.level(), Level::INFO);
        assert_eq!(Severity::Info.level(), Level::INFO);
    }
}
