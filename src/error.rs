//! # Error Types
//!
//! Structured errors for envelope processing. [`ProcessingError`] is the
//! failure taxonomy carried inside a processing result and is the only error
//! the finalizer looks at; [`OrchestratorError`] covers wiring the consumer
//! and the ways a running consumer stops abnormally.

use crate::config::ConfigurationError;
use thiserror::Error;

/// Why processing of a single message did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// Payload can never be turned into an envelope
    #[error("Invalid envelope message: {reason}")]
    MalformedEnvelope { reason: String },

    /// Case lookup or mutation failed in a way that may clear up on redelivery
    #[error("Case backend operation '{operation}' failed: {reason}")]
    TransientInfrastructure { operation: String, reason: String },

    /// The case backend refused the operation in a way that will not change on retry
    #[error("Case backend rejected operation '{operation}': {reason}")]
    RejectedByCaseBackend { operation: String, reason: String },

    /// Case was mutated but the downstream system was not told about it
    #[error("Failed to send processed notification for envelope {envelope_id}: {reason}")]
    PostMutationNotification { envelope_id: String, reason: String },
}

impl ProcessingError {
    pub fn malformed_envelope(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    pub fn transient_infrastructure(
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TransientInfrastructure {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn rejected_by_case_backend(
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RejectedByCaseBackend {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn post_mutation_notification(
        envelope_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PostMutationNotification {
            envelope_id: envelope_id.into(),
            reason: reason.into(),
        }
    }

    /// Whether redelivering the same message could lead to a different result
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TransientInfrastructure { .. })
    }

    /// Short stable label used in structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope { .. } => "malformed_envelope",
            Self::TransientInfrastructure { .. } => "transient_infrastructure",
            Self::RejectedByCaseBackend { .. } => "rejected_by_case_backend",
            Self::PostMutationNotification { .. } => "post_mutation_notification",
        }
    }
}

/// Top-level error for wiring and running the orchestrator
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Message processing interrupted: {0}")]
    Interrupted(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
