#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Envelope Orchestrator
//!
//! Queue consumer that turns scanned-document envelopes into case updates.
//!
//! ## Overview
//!
//! Each queue message carries one envelope: a batch of scanned documents
//! with a classification and, optionally, the reference of the case they
//! belong to. Processing a message runs a fixed pipeline:
//!
//! 1. **Parse** the message body into an [`Envelope`](models::Envelope)
//! 2. **Resolve** the referenced case, if any
//! 3. **Route** on classification and case existence to a mutation strategy
//! 4. **Mutate** the case backend: attach documents to the existing case
//!    (merged and deduplicated by URL) or create an exception record
//! 5. **Notify** the downstream system that the envelope was processed
//! 6. **Finalize** the message: complete it, dead-letter it, or leave it to
//!    be redelivered when its lock expires
//!
//! The first failing stage decides the result. Malformed payloads, permanent
//! backend refusals and notification failures are dead-lettered; transient
//! backend failures are retried through redelivery.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (defaults, TOML files, environment)
//! - [`error`] - Processing failure taxonomy and top-level errors
//! - [`logging`] - Structured logging setup
//! - [`messaging`] - Queue transport traits and the in-memory queue
//! - [`models`] - Envelope and case value types
//! - [`orchestration`] - Pipeline, finalizer and consumer
//! - [`services`] - Case backend and notifier interfaces
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use envelope_orchestrator::config::ConfigManager;
//! use envelope_orchestrator::messaging::InMemoryQueue;
//! use envelope_orchestrator::orchestration::{EnvelopeConsumer, EnvelopeEventProcessor};
//! use envelope_orchestrator::services::{
//!     CaseEventSubmitter, CaseRetriever, ProcessedEnvelopeNotifier,
//! };
//!
//! # async fn example(
//! #     retriever: Arc<dyn CaseRetriever>,
//! #     submitter: Arc<dyn CaseEventSubmitter>,
//! #     notifier: Arc<dyn ProcessedEnvelopeNotifier>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! envelope_orchestrator::logging::init_structured_logging();
//!
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//! let queue = Arc::new(InMemoryQueue::new(config.queue.queue_name.clone()));
//!
//! let processor = Arc::new(EnvelopeEventProcessor::new(
//!     config,
//!     retriever,
//!     submitter,
//!     notifier,
//!     queue.clone(),
//! ));
//! let consumer = EnvelopeConsumer::from_config(config, queue, processor)?;
//!
//! consumer.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod services;

pub use config::{ConfigManager, ConfigurationError, OrchestratorConfig};
pub use error::{OrchestratorError, OrchestratorResult, ProcessingError};
pub use messaging::{MessageOperations, MessageReceiver, MessagingError, QueueMessage};
pub use models::{Classification, Document, Envelope};
pub use orchestration::{
    EnvelopeConsumer, EnvelopeEventProcessor, FinalizationAction, MessageProcessingResult,
};
