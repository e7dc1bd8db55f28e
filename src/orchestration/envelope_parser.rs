//! # Envelope Parser
//!
//! Turns a queue message body into an [`Envelope`]. Parsing either fully
//! succeeds or fails with [`ProcessingError::MalformedEnvelope`]; individual
//! field problems (bad timestamp, unknown classification) are not reported
//! separately because a malformed message can never be processed.
//!
//! Failure diagnostics carry only the error category and position. Decoder
//! messages can quote payload values, and values from a payload that failed
//! to parse are not trustworthy enough to end up in logs or dead-letter
//! descriptions.

use tracing::{info, warn};

use crate::config::EnvelopeCodecConfig;
use crate::error::ProcessingError;
use crate::models::Envelope;

/// Stateless envelope decoder built once from the codec configuration
#[derive(Debug, Clone)]
pub struct EnvelopeParser {
    codec: EnvelopeCodecConfig,
}

impl EnvelopeParser {
    pub fn new(codec: EnvelopeCodecConfig) -> Self {
        Self { codec }
    }

    /// Parse a message body received under `message_id`
    pub fn parse(&self, message_id: &str, bytes: &[u8]) -> Result<Envelope, ProcessingError> {
        let envelope = self.decode(bytes).map_err(|reason| {
            warn!(message_id = %message_id, reason = %reason, "Failed to parse envelope message");
            ProcessingError::malformed_envelope(reason)
        })?;

        info!(
            message_id = %message_id,
            envelope_id = %envelope.id,
            zip_file_name = %envelope.zip_file_name,
            jurisdiction = %envelope.jurisdiction,
            classification = %envelope.classification,
            case_ref = envelope.case_ref.as_deref().unwrap_or(""),
            "Parsed message"
        );

        Ok(envelope)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Envelope, String> {
        if bytes.len() > self.codec.max_payload_bytes {
            return Err(format!(
                "payload of {} bytes exceeds limit of {} bytes",
                bytes.len(),
                self.codec.max_payload_bytes
            ));
        }

        serde_json::from_slice(bytes).map_err(|e| describe_decode_error(&e))
    }
}

impl Default for EnvelopeParser {
    fn default() -> Self {
        Self::new(EnvelopeCodecConfig::default())
    }
}

fn describe_decode_error(error: &serde_json::Error) -> String {
    let category = match error.classify() {
        serde_json::error::Category::Io => "io",
        serde_json::error::Category::Syntax => "syntax",
        serde_json::error::Category::Data => "data",
        serde_json::error::Category::Eof => "unexpected end of input",
    };
    format!(
        "{category} error at line {} column {}",
        error.line(),
        error.column()
    )
}
