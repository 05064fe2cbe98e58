use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use shared::notification::{Severity, Toast};
use tokio::sync::broadcast;
use tracing::debug;

pub const DEFAULT_TOAST_MS: u64 = 3000;
pub const ERROR_TOAST_MS: u64 = 5000;

/// Fan-out channel for user-facing messages. Sending with no subscriber is
/// not an error, the message is simply dropped.
#[derive(Debug)]
pub struct Notifier {
    sender: broadcast::Sender<Toast>,
    next_id: AtomicU64,
    default_ms: u64,
    error_ms: u64,
}

impl Notifier {
    pub fn new(default_ms: u64, error_ms: u64) -> Self {
        let (sender, _) = broadcast::channel(100);
        Self {
            sender,
            next_id: AtomicU64::new(1),
            default_ms,
            error_ms,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    pub fn add(&self, message: impl Into<String>, severity: Severity, duration_ms: u64) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            severity,
            duration_ms,
            created_at: Utc::now(),
        };
        debug!("Toast {} ({:?}): {}", id, severity, toast.message);
        let _ = self.sender.send(toast);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.add(message, Severity::Success, self.default_ms)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.add(message, Severity::Info, self.default_ms)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.add(message, Severity::Warning, self.default_ms)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.add(message, Severity::Error, self.error_ms)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_MS, ERROR_TOAST_MS)
    }
}
