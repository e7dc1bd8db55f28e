//! # Envelope Orchestration
//!
//! The per-message pipeline and the dispatcher around it.
//!
//! ## Core Components
//!
//! - **EnvelopeParser**: decodes a message body into an envelope
//! - **ClassificationRouter**: table-driven choice of case mutation strategy
//! - **DocumentReconciler**: merges existing and incoming documents by URL
//! - **CaseEventPublisher**: applies a strategy and submits the case event
//! - **EnvelopeEventProcessor**: chains the stages into one processing result
//! - **EnvelopeProcessorFinalizer**: completes, dead-letters or releases the message
//! - **EnvelopeConsumer**: polls the queue and runs messages concurrently

pub mod case_data_mapper;
pub mod classification_router;
pub mod consumer;
pub mod document_reconciler;
pub mod envelope_parser;
pub mod envelope_processor;
pub mod event_publisher;
pub mod finalizer;
pub mod processing_result;

pub use classification_router::{
    select_strategy, CaseCondition, MutationStrategy, Route, ROUTING_TABLE,
};
pub use consumer::{
    ConsumerShutdownHandle, ConsumerStats, ConsumerStatsSnapshot, EnvelopeConsumer,
};
pub use document_reconciler::merge_documents;
pub use envelope_parser::EnvelopeParser;
pub use envelope_processor::{EnvelopeEventProcessor, ProcessedMessage};
pub use event_publisher::CaseEventPublisher;
pub use finalizer::{EnvelopeProcessorFinalizer, FinalizationAction};
pub use processing_result::{MessageProcessingResult, MessageProcessingResultType};
