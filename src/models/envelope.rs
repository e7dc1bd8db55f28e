//! # Envelope Model
//!
//! An envelope is one batch of scanned documents announced on the queue.
//! Values here are produced by the parser and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// OCR output attached to a document. Not carried by the payload yet.
pub type OcrData = serde_json::Value;

/// Why an envelope was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Documents for a case that does not exist yet
    NewApplication,
    /// Additional documents for an existing case
    SupplementaryEvidence,
    /// Documents that need manual handling
    Exception,
}

impl Classification {
    /// Every classification, in declaration order. Keep in sync with the enum.
    pub const ALL: [Classification; 3] = [
        Classification::NewApplication,
        Classification::SupplementaryEvidence,
        Classification::Exception,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::NewApplication => "NEW_APPLICATION",
            Classification::SupplementaryEvidence => "SUPPLEMENTARY_EVIDENCE",
            Classification::Exception => "EXCEPTION",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a classification literal that is not one of the known values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown envelope classification")]
pub struct UnknownClassification;

impl FromStr for Classification {
    type Err = UnknownClassification;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Classification::ALL
            .into_iter()
            .find(|classification| classification.as_str().eq_ignore_ascii_case(value))
            .ok_or(UnknownClassification)
    }
}

impl<'de> Deserialize<'de> for Classification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(serde::de::Error::custom)
    }
}

/// A single scanned document in an envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub file_name: String,
    pub control_number: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub scanned_at: DateTime<Utc>,
    /// Location in the document store; two documents with the same URL are the same document
    pub url: String,
    #[serde(skip)]
    pub ocr_data: Option<OcrData>,
}

/// Parsed envelope message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub id: String,
    pub zip_file_name: String,
    pub jurisdiction: String,
    pub classification: Classification,
    #[serde(default)]
    pub case_ref: Option<String>,
    pub documents: Vec<Document>,
}

impl Envelope {
    /// Case reference to look up, exactly as sent, if the envelope names a non-blank one
    pub fn case_reference(&self) -> Option<&str> {
        self.case_ref
            .as_deref()
            .filter(|case_ref| !case_ref.trim().is_empty())
    }
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        EpochSeconds(f64),
    }

    /// Accepts an RFC 3339 string or (fractional) seconds since the epoch
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| D::Error::custom("timestamp is not RFC 3339")),
            RawTimestamp::EpochSeconds(seconds) => {
                if !seconds.is_finite() {
                    return Err(D::Error::custom("timestamp is not a finite number"));
                }
                let whole = seconds.floor();
                let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
                DateTime::from_timestamp(whole as i64, nanos)
                    .ok_or_else(|| D::Error::custom("timestamp out of range"))
            }
        }
    }
}
