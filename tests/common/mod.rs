#![allow(dead_code)]

pub mod mocks;
pub mod strategies;

use serde_json::{json, Value};
use std::sync::Arc;

use envelope_orchestrator::config::OrchestratorConfig;
use envelope_orchestrator::messaging::{MessageOperations, QueueMessage};
use envelope_orchestrator::models::CaseDetails;
use envelope_orchestrator::orchestration::EnvelopeEventProcessor;

pub use mocks::*;

pub const JURISDICTION: &str = "BULKSCAN";
pub const CASE_REF: &str = "1539007368674134";

pub fn document_json(url: &str) -> Value {
    json!({
        "fileName": format!("{}.pdf", url.rsplit('/').next().unwrap_or(url)),
        "controlNumber": "1000",
        "type": "other",
        "scannedAt": "2018-06-24T12:00:00Z",
        "url": url
    })
}

/// Queue message body for an envelope carrying documents with the given URLs
pub fn envelope_payload(classification: &str, case_ref: Option<&str>, urls: &[&str]) -> Vec<u8> {
    let mut envelope = json!({
        "id": "env-1",
        "zipFileName": "1_24-06-2018-00-00-00.zip",
        "jurisdiction": JURISDICTION,
        "classification": classification,
        "documents": urls.iter().map(|url| document_json(url)).collect::<Vec<_>>()
    });
    if let Some(case_ref) = case_ref {
        envelope["caseRef"] = json!(case_ref);
    }
    serde_json::to_vec(&envelope).unwrap()
}

/// Case record holding scanned documents with the given URLs
pub fn existing_case(urls: &[&str], evidence_handled: &str) -> CaseDetails {
    let documents: Vec<Value> = urls
        .iter()
        .map(|url| {
            json!({ "value": {
                "fileName": "existing.pdf",
                "controlNumber": "999",
                "type": "cherished",
                "scannedDate": "2018-01-01T09:30:00.000",
                "url": { "document_url": url }
            }})
        })
        .collect();

    CaseDetails {
        reference: CASE_REF.to_string(),
        jurisdiction: JURISDICTION.to_string(),
        data: json!({ "scannedDocuments": documents, "evidenceHandled": evidence_handled }),
    }
}

pub fn queue_message(body: Vec<u8>) -> QueueMessage {
    QueueMessage::new("msg-1", body)
}

/// Processor wired to recording collaborators
pub struct Harness {
    pub retriever: Arc<MockCaseRetriever>,
    pub submitter: Arc<MockCaseEventSubmitter>,
    pub notifier: Arc<MockNotifier>,
    pub operations: Arc<MockMessageOperations>,
    pub processor: EnvelopeEventProcessor,
}

impl Harness {
    pub fn new() -> Self {
        let retriever = Arc::new(MockCaseRetriever::default());
        let submitter = Arc::new(MockCaseEventSubmitter::default());
        let notifier = Arc::new(MockNotifier::default());
        let operations = Arc::new(MockMessageOperations::default());
        let processor = build_processor(
            retriever.clone(),
            submitter.clone(),
            notifier.clone(),
            operations.clone(),
        );

        Self {
            retriever,
            submitter,
            notifier,
            operations,
            processor,
        }
    }
}

pub fn build_processor(
    retriever: Arc<MockCaseRetriever>,
    submitter: Arc<MockCaseEventSubmitter>,
    notifier: Arc<MockNotifier>,
    operations: Arc<dyn MessageOperations>,
) -> EnvelopeEventProcessor {
    EnvelopeEventProcessor::new(
        &OrchestratorConfig::default(),
        retriever,
        submitter,
        notifier,
        operations,
    )
}
