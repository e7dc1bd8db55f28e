//! # Case Data Mapper
//!
//! Conversions between envelope documents and the case backend's scanned
//! document schema, and extraction of the current document list from a case.

use serde_json::Value;

use crate::constants::case_fields;
use crate::models::{
    CaseDetails, CcdCollectionItem, CcdDocument, Document, EvidenceHandled, MergedCaseData,
    ScannedDocument,
};
use crate::services::CaseApiError;

/// Envelope document to backend scanned document
pub fn to_scanned_document(document: &Document) -> ScannedDocument {
    ScannedDocument {
        file_name: document.file_name.clone(),
        control_number: document.control_number.clone(),
        doc_type: document.doc_type.clone(),
        subtype: document.subtype.clone(),
        scanned_date: document.scanned_at.naive_utc(),
        url: CcdDocument {
            document_url: document.url.clone(),
        },
    }
}

/// Backend scanned document to envelope document
pub fn to_document(scanned: &ScannedDocument) -> Document {
    Document {
        file_name: scanned.file_name.clone(),
        control_number: scanned.control_number.clone(),
        doc_type: scanned.doc_type.clone(),
        subtype: scanned.subtype.clone(),
        scanned_at: scanned.scanned_date.and_utc(),
        url: scanned.url.document_url.clone(),
        // TODO: carry OCR data once the case schema stores it
        ocr_data: None,
    }
}

/// Case data holding exactly `documents`, in order
pub fn build_case_data(
    documents: &[Document],
    evidence_handled: EvidenceHandled,
) -> MergedCaseData {
    MergedCaseData {
        scanned_documents: documents
            .iter()
            .map(|document| CcdCollectionItem::new(to_scanned_document(document)))
            .collect(),
        evidence_handled,
    }
}

/// Documents currently attached to a case; a case without the field has none
pub fn existing_documents(case: &CaseDetails) -> Result<Vec<Document>, CaseApiError> {
    let items: Vec<CcdCollectionItem<ScannedDocument>> =
        match case.data.get(case_fields::SCANNED_DOCUMENTS) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                CaseApiError::invalid_case_data(
                    &case.reference,
                    format!("{} cannot be read: {e}", case_fields::SCANNED_DOCUMENTS),
                )
            })?,
        };

    Ok(items.iter().map(|item| to_document(&item.value)).collect())
}

/// Handled flag currently stored on a case; missing or unrecognised values read as `No`
pub fn existing_evidence_handled(case: &CaseDetails) -> EvidenceHandled {
    case.data
        .get(case_fields::EVIDENCE_HANDLED)
        .map(EvidenceHandled::from_case_value)
        .unwrap_or_default()
}
