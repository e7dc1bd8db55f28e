//! # Messaging Module
//!
//! Queue transport boundary for envelope messages. The orchestrator only needs
//! to receive locked messages and then complete or dead-letter them; redelivery
//! happens implicitly when a lock expires.

pub mod client;
pub mod errors;
pub mod in_memory_client;
pub mod message;

pub use client::{MessageOperations, MessageReceiver};
pub use errors::{MessagingError, MessagingResult};
pub use in_memory_client::{DeadLetteredMessage, InMemoryQueue};
pub use message::{LockToken, QueueMessage};
