//! Transient user-facing notifications.
//!
//! Stores report outcomes here ("Added to cart", "Failed to load cart") the
//! way a web storefront shows toasts. Front ends subscribe and render them;
//! every emission is also logged, so nothing is lost when nobody listens.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity. Slow subscribers beyond this lag and miss the
/// oldest notifications.
const DEFAULT_CAPACITY: usize = 64;

/// Whether a notification reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NotificationKind::Error)
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Broadcast hub for notifications.
///
/// Cheap to clone; clones share one channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit a success notification.
    pub fn success(&self, message: impl Into<String>) {
        self.emit(Notification::success(message));
    }

    /// Emit an error notification.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Notification::error(message));
    }

    /// Log and broadcast a notification. Returns the number of receivers.
    pub fn emit(&self, notification: Notification) -> usize {
        match notification.kind {
            NotificationKind::Success => {
                tracing::info!(message = %notification.message, "Notification");
            }
            NotificationKind::Error => {
                tracing::warn!(message = %notification.message, "Notification");
            }
        }
        // No subscribers is not an error
        self.sender.send(notification).unwrap_or(0)
    }

    /// Receive every notification emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
