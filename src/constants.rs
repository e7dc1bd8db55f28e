//! # Constants
//!
//! Fixed names shared between the pipeline and the systems it talks to.

/// Reason attached to every dead-lettered message unless configured otherwise
pub const DEFAULT_DEAD_LETTER_REASON: &str = "Message processing error";

/// Default case backend events for the mutation strategies
pub mod case_events {
    pub const ATTACH_SCANNED_DOCS_EVENT_ID: &str = "attachScannedDocs";
    pub const ATTACH_SCANNED_DOCS_SUMMARY: &str = "Attach scanned documents";
    pub const CREATE_EXCEPTION_EVENT_ID: &str = "createException";
    pub const CREATE_EXCEPTION_SUMMARY: &str = "Create an exception record";
}

/// Field names in the case backend's case data
pub mod case_fields {
    pub const SCANNED_DOCUMENTS: &str = "scannedDocuments";
    pub const EVIDENCE_HANDLED: &str = "evidenceHandled";
}

/// Operation labels used in errors and log fields
pub mod operations {
    pub const RETRIEVE_CASE: &str = "retrieve_case";
    pub const BUILD_CASE_DATA: &str = "build_case_data";
    pub const SUBMIT_EVENT: &str = "submit_event";
}
