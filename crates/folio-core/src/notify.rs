//! User-visible notifications (toasts).
//!
//! Components publish through a cloneable [`Notifier`]; front ends subscribe and
//! render them however they like. Publishing with no subscribers is fine.

use std::fmt;

use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Neutral information.
    Info,
    /// An action succeeded.
    Success,
    /// An action failed.
    Error,
}

/// One toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Broadcast sender for notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    /// Create a notifier with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Receive every notification published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publish a success toast.
    pub fn success(&self, message: impl Into<String>) {
        self.publish(Level::Success, message.into());
    }

    /// Publish an error toast.
    pub fn error(&self, message: impl Into<String>) {
        self.publish(Level::Error, message.into());
    }

    /// Publish an informational toast.
    pub fn info(&self, message: impl Into<String>) {
        self.publish(Level::Info, message.into());
    }

    fn publish(&self, level: Level, message: String) {
        tracing::debug!(?level, %message, "notification");
        // Err only means nobody is listening.
        let _ = self.tx.send(Notification { level, message });
    }
}
