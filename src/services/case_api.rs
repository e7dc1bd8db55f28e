//! # Case Backend API
//!
//! Read and write access to case records in the case-management backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CaseDetails, CaseEvent};

/// Failures reported by the case backend collaborators
#[derive(Error, Debug)]
pub enum CaseApiError {
    #[error("Case backend transport error: {message}")]
    Transport { message: String },

    #[error("Case backend operation {operation} timed out after {timeout_seconds}s")]
    Timeout {
        operation: String,
        timeout_seconds: u64,
    },

    #[error("Case backend returned server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The backend refused the request as invalid; resubmitting it cannot succeed
    #[error("Case backend rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Stored case data does not have the expected shape
    #[error("Invalid data in case {case_ref}: {message}")]
    InvalidCaseData { case_ref: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaseApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout_seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_seconds,
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_case_data(case_ref: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCaseData {
            case_ref: case_ref.into(),
            message: message.into(),
        }
    }

    /// True only when retrying the same message is known to fail the same way
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::InvalidCaseData { .. })
    }
}

/// Looks up existing cases
#[async_trait]
pub trait CaseRetriever: Send + Sync {
    /// Fetch a case by reference; `Ok(None)` when the backend has no such case
    async fn retrieve(
        &self,
        jurisdiction: &str,
        case_ref: &str,
    ) -> Result<Option<CaseDetails>, CaseApiError>;
}

/// Submits mutation events to the case backend
#[async_trait]
pub trait CaseEventSubmitter: Send + Sync {
    async fn submit_event(&self, event: CaseEvent) -> Result<(), CaseApiError>;
}
