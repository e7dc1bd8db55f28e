use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use envelope_orchestrator::models::Document;

/// Strategy for document URLs drawn from a small pool, so lists overlap often
pub fn document_url_strategy() -> impl Strategy<Value = String> {
    "[a-h]".prop_map(|id| format!("http://dm-store/documents/{id}"))
}

/// Strategy for generating documents
pub fn document_strategy() -> impl Strategy<Value = Document> {
    (
        document_url_strategy(),
        "[a-z0-9_]{1,12}\\.pdf",
        "[0-9]{4,8}",
        prop::option::of("[a-z0-9]{1,8}"),
        0i64..2_000_000_000,
    )
        .prop_map(|(url, file_name, control_number, subtype, seconds)| Document {
            file_name,
            control_number,
            doc_type: "other".to_string(),
            subtype,
            scanned_at: Utc.timestamp_opt(seconds, 0).unwrap(),
            url,
            ocr_data: None,
        })
}

/// Strategy for document lists, possibly empty, possibly repeating URLs
pub fn document_list_strategy() -> impl Strategy<Value = Vec<Document>> {
    prop::collection::vec(document_strategy(), 0..10)
}
