//! # Models
//!
//! Value types flowing through the pipeline: the envelope parsed from a queue
//! message, and the case-management backend's representation of a case and
//! its scanned documents.

pub mod case;
pub mod envelope;

pub use case::{
    CaseDetails, CaseEvent, CaseEventTarget, CcdCollectionItem, CcdDocument, EvidenceHandled,
    MergedCaseData, ScannedDocument,
};
pub use envelope::{Classification, Document, Envelope, OcrData};
