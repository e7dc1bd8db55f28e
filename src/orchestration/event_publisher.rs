//! # Case Event Publisher
//!
//! Applies a [`MutationStrategy`] to an envelope and submits the resulting
//! case event to the backend.
//!
//! Both strategies read then write without any lock or concurrency token
//! around the sequence. Two messages attaching to the same case at the same
//! time can both read the same document list, and the later submission then
//! drops the documents added by the earlier one. Deduplication by URL keeps
//! redelivery of the *same* envelope safe; it does not close that race.

use std::sync::Arc;
use tracing::info;

use super::case_data_mapper::{build_case_data, existing_documents, existing_evidence_handled};
use super::classification_router::MutationStrategy;
use super::document_reconciler::merge_documents;
use crate::config::{CaseEventConfig, CaseEventDefinition};
use crate::models::{
    CaseDetails, CaseEvent, CaseEventTarget, Envelope, EvidenceHandled, MergedCaseData,
};
use crate::services::{CaseApiError, CaseEventSubmitter};

impl MutationStrategy {
    /// Case data this strategy submits for `envelope`
    pub fn apply(
        &self,
        envelope: &Envelope,
        existing_case: Option<&CaseDetails>,
    ) -> Result<MergedCaseData, CaseApiError> {
        match self {
            MutationStrategy::AttachToExistingCase => {
                let case = existing_case.ok_or_else(|| {
                    CaseApiError::invalid_case_data(
                        envelope.case_reference().unwrap_or_default(),
                        "no existing case to attach documents to",
                    )
                })?;

                let merged = merge_documents(&existing_documents(case)?, &envelope.documents);
                Ok(build_case_data(&merged, existing_evidence_handled(case)))
            }
            MutationStrategy::CreateExceptionRecord => {
                Ok(build_case_data(&envelope.documents, EvidenceHandled::No))
            }
        }
    }

    fn target(&self, existing_case: Option<&CaseDetails>) -> CaseEventTarget {
        match (self, existing_case) {
            (MutationStrategy::AttachToExistingCase, Some(case)) => CaseEventTarget::ExistingCase {
                case_ref: case.reference.clone(),
            },
            _ => CaseEventTarget::NewExceptionRecord,
        }
    }
}

/// Submits strategy output to the case backend
pub struct CaseEventPublisher {
    submitter: Arc<dyn CaseEventSubmitter>,
    events: CaseEventConfig,
}

impl std::fmt::Debug for CaseEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseEventPublisher")
            .field("events", &self.events)
            .finish()
    }
}

impl CaseEventPublisher {
    pub fn new(submitter: Arc<dyn CaseEventSubmitter>, events: CaseEventConfig) -> Self {
        Self { submitter, events }
    }

    fn definition(&self, strategy: MutationStrategy) -> &CaseEventDefinition {
        match strategy {
            MutationStrategy::AttachToExistingCase => &self.events.attach_scanned_documents,
            MutationStrategy::CreateExceptionRecord => &self.events.create_exception_record,
        }
    }

    /// Build the event `strategy` would submit, without submitting it
    pub fn build_event(
        &self,
        strategy: MutationStrategy,
        envelope: &Envelope,
        existing_case: Option<&CaseDetails>,
    ) -> Result<CaseEvent, CaseApiError> {
        let definition = self.definition(strategy);

        Ok(CaseEvent {
            jurisdiction: envelope.jurisdiction.clone(),
            target: strategy.target(existing_case),
            event_type_id: definition.event_type_id.clone(),
            summary: definition.summary.clone(),
            data: strategy.apply(envelope, existing_case)?,
        })
    }

    /// Apply `strategy` and submit the resulting event
    pub async fn publish(
        &self,
        strategy: MutationStrategy,
        envelope: &Envelope,
        existing_case: Option<&CaseDetails>,
    ) -> Result<(), CaseApiError> {
        let event = self.build_event(strategy, envelope, existing_case)?;

        info!(
            envelope_id = %envelope.id,
            strategy = %strategy,
            event_type_id = %event.event_type_id,
            document_count = event.data.scanned_documents.len(),
            "Submitting case event"
        );

        self.submitter.submit_event(event).await
    }
}
