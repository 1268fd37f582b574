//! Notification capability with interchangeable senders.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// A message recorded by the mock sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Capability interface for sending notifications.
///
/// The concrete sender is selected once at process startup by
/// configuration, never per call. Returns whether the send succeeded;
/// notification failures are never fatal to the operation that
/// triggered them.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool;
}

/// Sender that writes notifications to the log.
///
/// Stands in for a real mail/SMS integration in single-process
/// deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        tracing::info!(recipient, subject, body, "notification sent");
        true
    }
}

/// Sender that records every message for inspection in tests.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationSender {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl MockNotificationSender {
    /// Creates a new recording sender.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message sent so far.
    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> bool {
        self.sent.lock().await.push(SentNotification {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_sender_records_messages() {
        let sender = MockNotificationSender::new();
        assert!(sender.send("ops@example.com", "subject", "body").await);

        let sent = sender.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "ops@example.com");
        assert_eq!(sent[0].subject, "subject");
    }

    #[tokio::test]
    async fn log_sender_always_reports_success() {
        let sender = LogNotificationSender;
        assert!(sender.send("ops@example.com", "subject", "body").await);
    }
}
