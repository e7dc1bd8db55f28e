//! # Queue Message Structures
//!
//! A delivered message as the orchestrator sees it: an opaque body plus the
//! bookkeeping the transport needs to settle it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Handle proving the current receiver holds the delivery lock of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockToken(Uuid);

impl LockToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LockToken {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for LockToken {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message received from the envelopes queue
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Transport-assigned message id, stable across redeliveries
    pub message_id: String,
    /// Raw payload bytes
    pub body: Vec<u8>,
    /// Number of times this message has been handed out, including this delivery
    pub delivery_count: u32,
    /// Lock held for this delivery
    pub lock_token: LockToken,
    /// When the message was first enqueued
    pub enqueued_at: chrono::DateTime<chrono::Utc>,
}

impl QueueMessage {
    /// Create a first-delivery message with a fresh lock
    pub fn new(message_id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
            delivery_count: 1,
            lock_token: LockToken::new(),
            enqueued_at: chrono::Utc::now(),
        }
    }

    /// Attempt number of the next delivery if this one is not settled
    pub fn next_delivery_attempt(&self) -> u32 {
        self.delivery_count + 1
    }
}
