use async_trait::async_trait;
use thiserror::Error;

/// Downstream notification could not be delivered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error sending processed envelope notification: {message}")]
pub struct NotificationSendingError {
    pub message: String,
}

impl NotificationSendingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Tells the downstream system that an envelope has been fully processed
#[async_trait]
pub trait ProcessedEnvelopeNotifier: Send + Sync {
    async fn notify(&self, envelope_id: &str) -> Result<(), NotificationSendingError>;
}
