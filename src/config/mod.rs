//! # Orchestrator Configuration
//!
//! Typed configuration for the envelope consumer. Values come from built-in
//! defaults, optional TOML files and `ORCHESTRATOR__*` environment variables
//! (see [`ConfigManager`]). The loaded configuration is immutable and shared
//! by reference; nothing in the pipeline reads configuration lazily.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use envelope_orchestrator::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let max_concurrent = manager.config().queue.max_concurrent_messages;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{case_events, DEFAULT_DEAD_LETTER_REASON};
pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Longest message lock the consumer will ask the queue for
pub const MAX_LOCK_DURATION_SECONDS: u64 = 24 * 60 * 60;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub queue: QueueConfig,
    pub envelope: EnvelopeCodecConfig,
    pub events: CaseEventConfig,
}

impl OrchestratorConfig {
    /// Reject configurations the consumer cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        self.queue.validate()?;
        self.envelope.validate()?;
        self.events.validate()
    }
}

/// Queue consumption settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub queue_name: String,
    /// Upper bound on messages processed at the same time
    pub max_concurrent_messages: usize,
    /// Messages requested per receive call, capped by free task slots
    pub receive_batch_size: usize,
    pub lock_duration_seconds: u64,
    /// Pause between receive calls that returned nothing
    pub poll_interval_ms: u64,
    pub dead_letter_reason: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_name: "envelopes".to_string(),
            max_concurrent_messages: 10,
            receive_batch_size: 10,
            lock_duration_seconds: 60,
            poll_interval_ms: 500,
            dead_letter_reason: DEFAULT_DEAD_LETTER_REASON.to_string(),
        }
    }
}

impl QueueConfig {
    pub fn lock_duration(&self) -> Duration {
        Duration::from_secs(self.lock_duration_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.queue_name.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "queue_name",
                "queue",
            ));
        }
        if self.max_concurrent_messages == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_concurrent_messages",
                self.max_concurrent_messages,
                "must be greater than zero",
            ));
        }
        if self.receive_batch_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "receive_batch_size",
                self.receive_batch_size,
                "must be greater than zero",
            ));
        }
        if self.lock_duration_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "lock_duration_seconds",
                self.lock_duration_seconds,
                "must be greater than zero",
            ));
        }
        if self.lock_duration_seconds > MAX_LOCK_DURATION_SECONDS {
            return Err(ConfigurationError::invalid_value(
                "lock_duration_seconds",
                self.lock_duration_seconds,
                format!("must be at most {MAX_LOCK_DURATION_SECONDS}"),
            ));
        }
        if self.dead_letter_reason.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "dead_letter_reason",
                "queue",
            ));
        }
        Ok(())
    }
}

/// Decoding settings shared by the envelope parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeCodecConfig {
    /// Payloads larger than this are rejected without being decoded
    pub max_payload_bytes: usize,
}

impl Default for EnvelopeCodecConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: 1024 * 1024,
        }
    }
}

impl EnvelopeCodecConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_payload_bytes == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_payload_bytes",
                self.max_payload_bytes,
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Event type id and summary submitted with one kind of case mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEventDefinition {
    pub event_type_id: String,
    pub summary: String,
}

impl CaseEventDefinition {
    fn validate(&self, field: &str) -> ConfigResult<()> {
        if self.event_type_id.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "event_type_id",
                format!("events.{field}"),
            ));
        }
        Ok(())
    }
}

/// Backend events used by the mutation strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseEventConfig {
    pub attach_scanned_documents: CaseEventDefinition,
    pub create_exception_record: CaseEventDefinition,
}

impl Default for CaseEventConfig {
    fn default() -> Self {
        Self {
            attach_scanned_documents: CaseEventDefinition {
                event_type_id: case_events::ATTACH_SCANNED_DOCS_EVENT_ID.to_string(),
                summary: case_events::ATTACH_SCANNED_DOCS_SUMMARY.to_string(),
            },
            create_exception_record: CaseEventDefinition {
                event_type_id: case_events::CREATE_EXCEPTION_EVENT_ID.to_string(),
                summary: case_events::CREATE_EXCEPTION_SUMMARY.to_string(),
            },
        }
    }
}

impl CaseEventConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.attach_scanned_documents
            .validate("attach_scanned_documents")?;
        self.create_exception_record
            .validate("create_exception_record")
    }
}
