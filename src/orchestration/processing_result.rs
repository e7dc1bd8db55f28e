//! # Message Processing Result
//!
//! The single outcome produced for each message. Pipeline stages are chained
//! with [`MessageProcessingResult::and_then_async`], which only runs the next
//! stage while the result is still a success; the first failure is carried
//! through to finalization unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::{error, info};

use crate::error::ProcessingError;
use crate::models::Envelope;

/// Outcome of processing one message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageProcessingResult {
    Success(Envelope),
    UnrecoverableFailure {
        envelope: Option<Envelope>,
        cause: ProcessingError,
    },
    PotentiallyRecoverableFailure {
        envelope: Option<Envelope>,
        cause: ProcessingError,
    },
}

/// Result discriminant, used for logging and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageProcessingResultType {
    Success,
    UnrecoverableFailure,
    PotentiallyRecoverableFailure,
}

impl fmt::Display for MessageProcessingResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::UnrecoverableFailure => write!(f, "UNRECOVERABLE_FAILURE"),
            Self::PotentiallyRecoverableFailure => write!(f, "POTENTIALLY_RECOVERABLE_FAILURE"),
        }
    }
}

impl MessageProcessingResult {
    pub fn success(envelope: Envelope) -> Self {
        Self::Success(envelope)
    }

    pub fn unrecoverable(envelope: Option<Envelope>, cause: ProcessingError) -> Self {
        Self::UnrecoverableFailure { envelope, cause }
    }

    pub fn recoverable(envelope: Option<Envelope>, cause: ProcessingError) -> Self {
        Self::PotentiallyRecoverableFailure { envelope, cause }
    }

    /// Failure result whose kind follows from the cause
    pub fn failure(envelope: Option<Envelope>, cause: ProcessingError) -> Self {
        if cause.is_recoverable() {
            Self::recoverable(envelope, cause)
        } else {
            Self::unrecoverable(envelope, cause)
        }
    }

    pub fn result_type(&self) -> MessageProcessingResultType {
        match self {
            Self::Success(_) => MessageProcessingResultType::Success,
            Self::UnrecoverableFailure { .. } => MessageProcessingResultType::UnrecoverableFailure,
            Self::PotentiallyRecoverableFailure { .. } => {
                MessageProcessingResultType::PotentiallyRecoverableFailure
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            Self::Success(envelope) => Some(envelope),
            Self::UnrecoverableFailure { envelope, .. }
            | Self::PotentiallyRecoverableFailure { envelope, .. } => envelope.as_ref(),
        }
    }

    pub fn cause(&self) -> Option<&ProcessingError> {
        match self {
            Self::Success(_) => None,
            Self::UnrecoverableFailure { cause, .. }
            | Self::PotentiallyRecoverableFailure { cause, .. } => Some(cause),
        }
    }

    /// Run the next stage with the envelope if this is a success, otherwise pass the failure on
    pub async fn and_then_async<F, Fut>(self, stage: F) -> Self
    where
        F: FnOnce(Envelope) -> Fut,
        Fut: Future<Output = Self>,
    {
        match self {
            Self::Success(envelope) => stage(envelope).await,
            failure => failure,
        }
    }

    /// Log how processing of `message_id` ended
    pub fn log_process_finish(self, message_id: &str) -> Self {
        match &self {
            Self::Success(envelope) => {
                info!(
                    message_id = %message_id,
                    envelope_id = %envelope.id,
                    zip_file_name = %envelope.zip_file_name,
                    "Processed message"
                );
            }
            Self::UnrecoverableFailure { envelope, cause }
            | Self::PotentiallyRecoverableFailure { envelope, cause } => {
                let result_type = self.result_type();
                match (cause, envelope) {
                    (ProcessingError::MalformedEnvelope { .. }, _) => error!(
                        message_id = %message_id,
                        result_type = %result_type,
                        error = %cause,
                        "Rejected message because it's invalid"
                    ),
                    (_, Some(envelope)) => error!(
                        message_id = %message_id,
                        result_type = %result_type,
                        envelope_id = %envelope.id,
                        zip_file_name = %envelope.zip_file_name,
                        error_kind = cause.kind(),
                        error = %cause,
                        "Failed to process message"
                    ),
                    (_, None) => error!(
                        message_id = %message_id,
                        result_type = %result_type,
                        error_kind = cause.kind(),
                        error = %cause,
                        "Failed to process message"
                    ),
                }
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;

    fn envelope() -> Envelope {
        Envelope {
            id: "env-1".to_string(),
            zip_file_name: "file.zip".to_string(),
            jurisdiction: "BULKSCAN".to_string(),
            classification: Classification::Exception,
            case_ref: None,
            documents: vec![],
        }
    }

    #[tokio::test]
    async fn test_and_then_runs_next_stage_on_success() {
        let result = MessageProcessingResult::success(envelope())
            .and_then_async(|envelope| async move {
                MessageProcessingResult::recoverable(
                    Some(envelope),
                    ProcessingError::transient_infrastructure("retrieve_case", "timeout"),
                )
            })
            .await;

        assert_eq!(
            result.result_type(),
            MessageProcessingResultType::PotentiallyRecoverableFailure
        );
        assert_eq!(result.envelope().map(|e| e.id.as_str()), Some("env-1"));
    }

    #[tokio::test]
    async fn test_and_then_short_circuits_on_failure() {
        let cause = ProcessingError::malformed_envelope("syntax error at line 1 column 1");
        let mut stage_ran = false;

        let result = MessageProcessingResult::unrecoverable(None, cause.clone())
            .and_then_async(|envelope| {
                stage_ran = true;
                async move { MessageProcessingResult::success(envelope) }
            })
            .await;

        assert!(!stage_ran);
        assert_eq!(result.cause(), Some(&cause));
        assert!(result.envelope().is_none());
    }

    #[test]
    fn test_failure_picks_kind_from_cause() {
        let recoverable = MessageProcessingResult::failure(
            Some(envelope()),
            ProcessingError::transient_infrastructure("submit_event", "503"),
        );
        assert_eq!(
            recoverable.result_type(),
            MessageProcessingResultType::PotentiallyRecoverableFailure
        );

        let permanent = MessageProcessingResult::failure(
            Some(envelope()),
            ProcessingError::rejected_by_case_backend("submit_event", "422"),
        );
        assert_eq!(
            permanent.result_type(),
            MessageProcessingResultType::UnrecoverableFailure
        );
    }

    #[test]
    fn test_log_process_finish_returns_result_unchanged() {
        let result = MessageProcessingResult::success(envelope());
        assert_eq!(result.clone().log_process_finish("msg-1"), result);

        let failure = MessageProcessingResult::unrecoverable(
            None,
            ProcessingError::malformed_envelope("data error at line 1 column 5"),
        );
        assert_eq!(failure.clone().log_process_finish("msg-1"), failure);
    }

    #[test]
    fn test_result_type_display() {
        assert_eq!(MessageProcessingResultType::Success.to_string(), "SUCCESS");
        assert_eq!(
            MessageProcessingResultType::PotentiallyRecoverableFailure.to_string(),
            "POTENTIALLY_RECOVERABLE_FAILURE"
        );
    }
}
