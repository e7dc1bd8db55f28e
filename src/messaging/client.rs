use async_trait::async_trait;
use std::time::Duration;

use super::errors::MessagingResult;
use super::message::{LockToken, QueueMessage};

/// Settlement operations on a locked message
///
/// There is no "abandon" call; a message whose lock expires goes back onto the queue.
#[async_trait]
pub trait MessageOperations: Send + Sync {
    /// Remove the message from the queue, processing is done
    async fn complete(&self, lock_token: &LockToken) -> MessagingResult<()>;

    /// Move the message to the dead-letter side channel
    async fn dead_letter(
        &self,
        lock_token: &LockToken,
        reason: &str,
        description: &str,
    ) -> MessagingResult<()>;
}

/// Source of locked messages for the consumer loop
#[async_trait]
pub trait MessageReceiver: Send + Sync {
    /// Receive up to `max_messages` available messages, locking each for `lock_duration`
    async fn receive(
        &self,
        max_messages: usize,
        lock_duration: Duration,
    ) -> MessagingResult<Vec<QueueMessage>>;
}
