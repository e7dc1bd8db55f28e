//! # Envelope Event Processor
//!
//! Runs the per-message pipeline: parse, resolve the case and mutate it,
//! notify downstream, then finalize the message on the queue.
//!
//! [`EnvelopeEventProcessor::handle`] produces the processing result without
//! touching the queue; [`EnvelopeEventProcessor::finalize`] settles the message
//! from that result. [`EnvelopeEventProcessor::on_message`] does both and is
//! what a dispatcher calls for every delivered message.
//!
//! Stage failures never escape as errors. They become the failure variants
//! of [`MessageProcessingResult`]; the only error `on_message` returns is a
//! queue interruption raised while finalizing.

use std::sync::Arc;
use tracing::info;

use super::classification_router::select_strategy;
use super::envelope_parser::EnvelopeParser;
use super::event_publisher::CaseEventPublisher;
use super::finalizer::{EnvelopeProcessorFinalizer, FinalizationAction};
use super::processing_result::MessageProcessingResult;
use crate::config::OrchestratorConfig;
use crate::constants::operations;
use crate::error::ProcessingError;
use crate::messaging::{MessageOperations, MessagingResult, QueueMessage};
use crate::models::{CaseDetails, Envelope};
use crate::services::{
    CaseApiError, CaseEventSubmitter, CaseRetriever, ProcessedEnvelopeNotifier,
};

/// Result of handling and finalizing one message
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedMessage {
    pub result: MessageProcessingResult,
    /// `None` when finalization failed and the message was left to expire
    pub action: Option<FinalizationAction>,
}

pub struct EnvelopeEventProcessor {
    parser: EnvelopeParser,
    case_retriever: Arc<dyn CaseRetriever>,
    publisher: CaseEventPublisher,
    notifier: Arc<dyn ProcessedEnvelopeNotifier>,
    finalizer: EnvelopeProcessorFinalizer,
}

impl std::fmt::Debug for EnvelopeEventProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeEventProcessor")
            .field("parser", &self.parser)
            .field("publisher", &self.publisher)
            .field("finalizer", &self.finalizer)
            .finish()
    }
}

impl EnvelopeEventProcessor {
    pub fn new(
        config: &OrchestratorConfig,
        case_retriever: Arc<dyn CaseRetriever>,
        case_event_submitter: Arc<dyn CaseEventSubmitter>,
        notifier: Arc<dyn ProcessedEnvelopeNotifier>,
        message_operations: Arc<dyn MessageOperations>,
    ) -> Self {
        Self {
            parser: EnvelopeParser::new(config.envelope.clone()),
            case_retriever,
            publisher: CaseEventPublisher::new(case_event_submitter, config.events.clone()),
            notifier,
            finalizer: EnvelopeProcessorFinalizer::with_dead_letter_reason(
                message_operations,
                config.queue.dead_letter_reason.clone(),
            ),
        }
    }

    /// Handle a delivered message and settle it on the queue
    pub async fn on_message(&self, message: &QueueMessage) -> MessagingResult<ProcessedMessage> {
        let result = self.handle(message).await;
        let action = self.finalize(message, &result).await?;

        Ok(ProcessedMessage { result, action })
    }

    /// Run the pipeline for one message, without settling it
    pub async fn handle(&self, message: &QueueMessage) -> MessageProcessingResult {
        info!(
            message_id = %message.message_id,
            delivery_count = message.delivery_count,
            "Started processing message"
        );

        self.parse_envelope(message)
            .and_then_async(|envelope| self.publish_envelope(envelope))
            .await
            .and_then_async(|envelope| self.notify_processed_envelope(envelope))
            .await
            .log_process_finish(&message.message_id)
    }

    /// Settle `message` from `result`
    ///
    /// See [`EnvelopeProcessorFinalizer::try_finalize_processed_message`].
    pub async fn finalize(
        &self,
        message: &QueueMessage,
        result: &MessageProcessingResult,
    ) -> MessagingResult<Option<FinalizationAction>> {
        self.finalizer
            .try_finalize_processed_message(message, result)
            .await
    }

    fn parse_envelope(&self, message: &QueueMessage) -> MessageProcessingResult {
        match self.parser.parse(&message.message_id, &message.body) {
            Ok(envelope) => MessageProcessingResult::success(envelope),
            Err(cause) => MessageProcessingResult::unrecoverable(None, cause),
        }
    }

    async fn publish_envelope(&self, envelope: Envelope) -> MessageProcessingResult {
        match self.mutate_case(&envelope).await {
            Ok(()) => MessageProcessingResult::success(envelope),
            Err(cause) => MessageProcessingResult::failure(Some(envelope), cause),
        }
    }

    async fn mutate_case(&self, envelope: &Envelope) -> Result<(), ProcessingError> {
        let existing_case = self.retrieve_case(envelope).await?;

        let case_found = existing_case.is_some();
        let Some(strategy) = select_strategy(envelope.classification, case_found) else {
            info!(
                envelope_id = %envelope.id,
                classification = %envelope.classification,
                "No case mutation for classification"
            );
            return Ok(());
        };

        self.publisher
            .publish(strategy, envelope, existing_case.as_ref())
            .await
            .map_err(|err| {
                let operation = match err {
                    CaseApiError::InvalidCaseData { .. } => operations::BUILD_CASE_DATA,
                    _ => operations::SUBMIT_EVENT,
                };
                case_api_failure(operation, err)
            })
    }

    async fn retrieve_case(
        &self,
        envelope: &Envelope,
    ) -> Result<Option<CaseDetails>, ProcessingError> {
        let Some(case_ref) = envelope.case_reference() else {
            return Ok(None);
        };

        let case = self
            .case_retriever
            .retrieve(&envelope.jurisdiction, case_ref)
            .await
            .map_err(|err| case_api_failure(operations::RETRIEVE_CASE, err))?;

        info!(
            envelope_id = %envelope.id,
            case_ref = %case_ref,
            case_found = case.is_some(),
            "Case lookup finished"
        );

        Ok(case)
    }

    async fn notify_processed_envelope(&self, envelope: Envelope) -> MessageProcessingResult {
        match self.notifier.notify(&envelope.id).await {
            Ok(()) => MessageProcessingResult::success(envelope),
            // The case was already mutated; retrying the message would repeat that
            Err(err) => {
                let cause =
                    ProcessingError::post_mutation_notification(&envelope.id, err.to_string());
                MessageProcessingResult::unrecoverable(Some(envelope), cause)
            }
        }
    }
}

fn case_api_failure(operation: &str, err: CaseApiError) -> ProcessingError {
    if err.is_permanent() {
        ProcessingError::rejected_by_case_backend(operation, err.to_string())
    } else {
        ProcessingError::transient_infrastructure(operation, err.to_string())
    }
}
