//! # Case Model
//!
//! The case-management backend's view of a case. Field names follow the
//! backend's JSON schema, which differs from the envelope payload: scanned
//! documents are wrapped in collection items, dates are naive UTC date-times
//! and document URLs are nested objects.
//!
//! Reading is lenient where the backend's own history is loose: older records
//! carry date-only scan dates and free-form handled flags.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Case record as returned by the case reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetails {
    /// Case reference the record was retrieved by
    pub reference: String,
    pub jurisdiction: String,
    /// Raw case data, keyed by backend field name
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Link to a document in the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcdDocument {
    pub document_url: String,
}

/// Backend collection entry; `id` is assigned by the backend and absent on new items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcdCollectionItem<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: T,
}

impl<T> CcdCollectionItem<T> {
    pub fn new(value: T) -> Self {
        Self { id: None, value }
    }
}

/// Scanned document in the backend's schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedDocument {
    pub file_name: String,
    pub control_number: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(deserialize_with = "scanned_date::deserialize")]
    pub scanned_date: NaiveDateTime,
    pub url: CcdDocument,
}

/// Backend scan dates: full date-times, RFC 3339 instants or bare dates (read as midnight)
mod scanned_date {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim())
            .ok_or_else(|| D::Error::custom(format!("unrecognised scanned date: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDateTime> {
        raw.parse::<NaiveDateTime>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|instant| instant.naive_utc()))
            .or_else(|| {
                raw.parse::<NaiveDate>()
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    }
}

/// Whether a caseworker has dealt with the attached evidence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum EvidenceHandled {
    Yes,
    #[default]
    No,
}

impl EvidenceHandled {
    /// Anything other than a case-insensitive "yes" (or `true`) reads as `No`
    pub fn from_case_value(value: &Value) -> Self {
        match value {
            Value::String(flag) if flag.trim().eq_ignore_ascii_case("yes") => EvidenceHandled::Yes,
            Value::Bool(true) => EvidenceHandled::Yes,
            _ => EvidenceHandled::No,
        }
    }
}

impl<'de> Deserialize<'de> for EvidenceHandled {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|value| Self::from_case_value(&value))
    }
}

impl fmt::Display for EvidenceHandled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceHandled::Yes => f.write_str("Yes"),
            EvidenceHandled::No => f.write_str("No"),
        }
    }
}

/// Case data submitted with a mutation event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCaseData {
    pub scanned_documents: Vec<CcdCollectionItem<ScannedDocument>>,
    #[serde(default)]
    pub evidence_handled: EvidenceHandled,
}

impl MergedCaseData {
    pub fn document_urls(&self) -> Vec<&str> {
        self.scanned_documents
            .iter()
            .map(|item| item.value.url.document_url.as_str())
            .collect()
    }
}

/// Which case an event applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseEventTarget {
    ExistingCase { case_ref: String },
    NewExceptionRecord,
}

/// Mutation submitted to the case backend
#[derive(Debug, Clone, PartialEq)]
pub struct CaseEvent {
    pub jurisdiction: String,
    pub target: CaseEventTarget,
    pub event_type_id: String,
    pub summary: String,
    pub data: MergedCaseData,
}
