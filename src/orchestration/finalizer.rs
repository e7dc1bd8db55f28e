//! # Envelope Processor Finalizer
//!
//! Settles a delivered message once its processing result is known:
//! successes are completed, unrecoverable failures are dead-lettered, and
//! potentially recoverable failures are left alone so the lock expires and
//! the queue redelivers the message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use super::processing_result::MessageProcessingResult;
use crate::constants::DEFAULT_DEAD_LETTER_REASON;
use crate::logging::log_error;
use crate::messaging::{MessageOperations, MessagingError, MessagingResult, QueueMessage};

/// What finalization did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizationAction {
    /// Message was removed from the queue
    Completed,
    /// Message was moved to the dead-letter store
    DeadLettered,
    /// Message lock is left to expire so the queue redelivers it
    LeftForRedelivery,
}

impl fmt::Display for FinalizationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::DeadLettered => write!(f, "dead_lettered"),
            Self::LeftForRedelivery => write!(f, "left_for_redelivery"),
        }
    }
}

pub struct EnvelopeProcessorFinalizer {
    message_operations: Arc<dyn MessageOperations>,
    dead_letter_reason: String,
}

impl fmt::Debug for EnvelopeProcessorFinalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeProcessorFinalizer")
            .field("dead_letter_reason", &self.dead_letter_reason)
            .finish()
    }
}

impl EnvelopeProcessorFinalizer {
    pub fn new(message_operations: Arc<dyn MessageOperations>) -> Self {
        Self::with_dead_letter_reason(message_operations, DEFAULT_DEAD_LETTER_REASON)
    }

    pub fn with_dead_letter_reason(
        message_operations: Arc<dyn MessageOperations>,
        dead_letter_reason: impl Into<String>,
    ) -> Self {
        Self {
            message_operations,
            dead_letter_reason: dead_letter_reason.into(),
        }
    }

    /// Settle `message` according to `result`
    pub async fn finalize_processed_message(
        &self,
        message: &QueueMessage,
        result: &MessageProcessingResult,
    ) -> MessagingResult<FinalizationAction> {
        match result {
            MessageProcessingResult::Success(_) => {
                self.message_operations
                    .complete(&message.lock_token)
                    .await?;
                info!(message_id = %message.message_id, "Completed message");
                Ok(FinalizationAction::Completed)
            }
            MessageProcessingResult::UnrecoverableFailure { cause, .. } => {
                self.message_operations
                    .dead_letter(&message.lock_token, &self.dead_letter_reason, &cause.to_string())
                    .await?;
                info!(
                    message_id = %message.message_id,
                    reason = %self.dead_letter_reason,
                    "Message was dead-lettered"
                );
                Ok(FinalizationAction::DeadLettered)
            }
            MessageProcessingResult::PotentiallyRecoverableFailure { .. } => {
                info!(
                    message_id = %message.message_id,
                    delivery_attempt = message.next_delivery_attempt(),
                    "Allowing message to return to queue"
                );
                Ok(FinalizationAction::LeftForRedelivery)
            }
        }
    }

    /// Finalize without failing the caller, except when the receiver is interrupted
    ///
    /// Any other finalization failure is logged and yields `Ok(None)`; the
    /// message lock then expires and the message is redelivered.
    pub async fn try_finalize_processed_message(
        &self,
        message: &QueueMessage,
        result: &MessageProcessingResult,
    ) -> MessagingResult<Option<FinalizationAction>> {
        match self.finalize_processed_message(message, result).await {
            Ok(action) => Ok(Some(action)),
            Err(err @ MessagingError::Interrupted { .. }) => {
                error!(
                    message_id = %message.message_id,
                    error = %err,
                    "Failed to finalize message, receiver interrupted"
                );
                Err(err)
            }
            Err(err) => {
                log_error(
                    "envelope_processor_finalizer",
                    "finalize_processed_message",
                    &err.to_string(),
                    Some(&format!(
                        "message_id={} result_type={}",
                        message.message_id,
                        result.result_type()
                    )),
                );
                Ok(None)
            }
        }
    }
}
