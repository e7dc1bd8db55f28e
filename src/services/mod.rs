//! # External Services
//!
//! Interfaces of the collaborators the pipeline calls out to. Implementations
//! (HTTP clients, authentication) live outside this crate; tests provide
//! recording doubles.

pub mod case_api;
pub mod notifier;

pub use case_api::{CaseApiError, CaseEventSubmitter, CaseRetriever};
pub use notifier::{NotificationSendingError, ProcessedEnvelopeNotifier};
