//! Fire-and-forget delivery used by the sign-in flows.

use std::sync::Arc;

use tracing::{debug, warn};

use super::message::Notification;
use super::sender::Notifier;

/// Delivers notifications without ever failing the calling flow.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    /// Wraps a delivery backend.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Attempts delivery; failures are logged and swallowed.
    pub async fn dispatch(&self, notification: Notification) {
        match self.notifier.deliver(&notification).await {
            Ok(()) => debug!(kind = notification.kind(), "Notification delivered"),
            Err(e) => warn!(
                kind = notification.kind(),
                error = %e,
                "Notification delivery failed"
            ),
        }
    }
}
