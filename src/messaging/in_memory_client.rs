//! # In-Memory Queue
//!
//! Queue transport kept entirely in process memory, used by the test suite and
//! for local runs without a broker.
//!
//! ## Semantics
//!
//! - **Peek-lock delivery**: `receive` hands out a message together with a lock
//!   token and hides it until the lock expires
//! - **Redelivery on lock expiry**: an unsettled message becomes available
//!   again once its lock runs out, with its delivery count incremented
//! - **Settlement**: `complete` removes the message, `dead_letter` moves it to a
//!   dead-letter store with reason and description; both require the current,
//!   unexpired lock
//! - **Shutdown**: after `shutdown` every operation reports an interruption

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use super::client::{MessageOperations, MessageReceiver};
use super::errors::{MessagingError, MessagingResult};
use super::message::{LockToken, QueueMessage};

/// Message stored in the queue together with its lock state
#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: Vec<u8>,
    enqueued_at: DateTime<Utc>,
    delivery_count: u32,
    lock: Option<(LockToken, DateTime<Utc>)>,
}

impl StoredMessage {
    fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.lock
            .map(|(_, locked_until)| locked_until <= now)
            .unwrap_or(true)
    }

    fn holds_lock(&self, lock_token: &LockToken, now: DateTime<Utc>) -> bool {
        matches!(
            self.lock,
            Some((token, locked_until)) if token == *lock_token && locked_until > now
        )
    }
}

/// Message moved to the dead-letter store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetteredMessage {
    pub message_id: String,
    pub body: Vec<u8>,
    pub delivery_count: u32,
    pub reason: String,
    pub description: String,
}

/// In-memory queue implementation
#[derive(Debug)]
pub struct InMemoryQueue {
    queue_name: String,
    messages: Mutex<VecDeque<StoredMessage>>,
    dead_letters: Mutex<Vec<DeadLetteredMessage>>,
    next_id: AtomicU64,
    completed: AtomicU64,
    is_shut_down: AtomicBool,
}

impl InMemoryQueue {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            messages: Mutex::new(VecDeque::new()),
            dead_letters: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            completed: AtomicU64::new(0),
            is_shut_down: AtomicBool::new(false),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Enqueue a message body, returning its message id
    pub fn send(&self, body: impl Into<Vec<u8>>) -> MessagingResult<String> {
        self.ensure_running("send")?;

        let message_id = format!(
            "{}-{}",
            self.queue_name,
            self.next_id.fetch_add(1, Ordering::Relaxed)
        );

        self.messages.lock().push_back(StoredMessage {
            message_id: message_id.clone(),
            body: body.into(),
            enqueued_at: Utc::now(),
            delivery_count: 0,
            lock: None,
        });

        debug!(queue = %self.queue_name, message_id = %message_id, "Message enqueued");
        Ok(message_id)
    }

    /// Messages still on the queue, locked or not
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of messages removed by `complete`
    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Snapshot of the dead-letter store
    pub fn dead_lettered(&self) -> Vec<DeadLetteredMessage> {
        self.dead_letters.lock().clone()
    }

    /// Stop the queue; subsequent operations report an interruption
    pub fn shutdown(&self) {
        info!(queue = %self.queue_name, "In-memory queue shutting down");
        self.is_shut_down.store(true, Ordering::SeqCst);
    }

    fn ensure_running(&self, operation: &str) -> MessagingResult<()> {
        if self.is_shut_down.load(Ordering::SeqCst) {
            return Err(MessagingError::interrupted(format!(
                "{operation} on queue {} after shutdown",
                self.queue_name
            )));
        }
        Ok(())
    }

    /// Remove the message holding `lock_token`, failing if the lock is no longer held
    fn take_locked(
        &self,
        lock_token: &LockToken,
        operation: &str,
    ) -> MessagingResult<StoredMessage> {
        self.ensure_running(operation)?;

        let now = Utc::now();
        let mut messages = self.messages.lock();
        let index = messages
            .iter()
            .position(|message| message.holds_lock(lock_token, now))
            .ok_or_else(|| MessagingError::lock_lost(lock_token.to_string()))?;

        messages
            .remove(index)
            .ok_or_else(|| MessagingError::internal(format!("message index {index} vanished")))
    }
}

#[async_trait]
impl MessageReceiver for InMemoryQueue {
    async fn receive(
        &self,
        max_messages: usize,
        lock_duration: Duration,
    ) -> MessagingResult<Vec<QueueMessage>> {
        self.ensure_running("receive")?;

        let now = Utc::now();
        let lock_duration = chrono::Duration::from_std(lock_duration).map_err(|e| {
            MessagingError::queue_operation(&self.queue_name, "receive", e.to_string())
        })?;
        let locked_until = now.checked_add_signed(lock_duration).ok_or_else(|| {
            MessagingError::queue_operation(
                &self.queue_name,
                "receive",
                format!("lock duration {lock_duration} is out of range"),
            )
        })?;

        let mut messages = self.messages.lock();
        let received: Vec<QueueMessage> = messages
            .iter_mut()
            .filter(|message| message.is_available(now))
            .take(max_messages)
            .map(|message| {
                let lock_token = LockToken::new();
                message.delivery_count += 1;
                message.lock = Some((lock_token, locked_until));

                QueueMessage {
                    message_id: message.message_id.clone(),
                    body: message.body.clone(),
                    delivery_count: message.delivery_count,
                    lock_token,
                    enqueued_at: message.enqueued_at,
                }
            })
            .collect();

        if !received.is_empty() {
            debug!(
                queue = %self.queue_name,
                count = received.len(),
                "Messages locked for delivery"
            );
        }

        Ok(received)
    }
}

#[async_trait]
impl MessageOperations for InMemoryQueue {
    async fn complete(&self, lock_token: &LockToken) -> MessagingResult<()> {
        let message = self.take_locked(lock_token, "complete")?;
        self.completed.fetch_add(1, Ordering::Relaxed);

        debug!(queue = %self.queue_name, message_id = %message.message_id, "Message completed");
        Ok(())
    }

    async fn dead_letter(
        &self,
        lock_token: &LockToken,
        reason: &str,
        description: &str,
    ) -> MessagingResult<()> {
        let message = self.take_locked(lock_token, "dead_letter")?;

        debug!(queue = %self.queue_name, message_id = %message.message_id, "Message dead-lettered");
        self.dead_letters.lock().push(DeadLetteredMessage {
            message_id: message.message_id,
            body: message.body,
            delivery_count: message.delivery_count,
            reason: reason.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }
}
