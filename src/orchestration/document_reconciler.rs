//! # Document Reconciler
//!
//! Merges the documents already attached to a case with the documents
//! carried by an envelope. A document's URL is its identity.
//!
//! The merged list is the existing list verbatim, followed by every incoming
//! document whose URL is not yet in the result, in envelope order. Existing
//! entries are never removed or reordered, and re-merging the same envelope
//! is a no-op, which is what makes redelivered messages safe to reprocess.

use std::collections::HashSet;

use crate::models::Document;

/// Merge `incoming` into `existing`, skipping documents whose URL is already present
pub fn merge_documents(existing: &[Document], incoming: &[Document]) -> Vec<Document> {
    let mut merged = existing.to_vec();
    let mut seen_urls: HashSet<&str> = existing.iter().map(|doc| doc.url.as_str()).collect();

    for document in incoming {
        if seen_urls.insert(document.url.as_str()) {
            merged.push(document.clone());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn doc(url: &str, file_name: &str) -> Document {
        Document {
            file_name: file_name.to_string(),
            control_number: format!("ctrl-{file_name}"),
            doc_type: "other".to_string(),
            subtype: None,
            scanned_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            url: url.to_string(),
            ocr_data: None,
        }
    }

    fn urls(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|d| d.url.as_str()).collect()
    }

    #[test]
    fn test_appends_only_new_urls() {
        let existing = vec![doc("a", "existing.pdf")];
        let incoming = vec![doc("a", "duplicate.pdf"), doc("b", "new.pdf")];

        let merged = merge_documents(&existing, &incoming);

        assert_eq!(urls(&merged), vec!["a", "b"]);
        // The stored copy wins over the incoming duplicate
        assert_eq!(merged[0].file_name, "existing.pdf");
    }

    #[test]
    fn test_existing_order_is_preserved() {
        let existing = vec![doc("c", "3"), doc("a", "1"), doc("b", "2")];
        let incoming = vec![doc("d", "4"), doc("a", "1")];

        let merged = merge_documents(&existing, &incoming);
        assert_eq!(urls(&merged), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_empty_incoming_returns_existing() {
        let existing = vec![doc("a", "1"), doc("b", "2")];
        assert_eq!(merge_documents(&existing, &[]), existing);
    }

    #[test]
    fn test_empty_existing_collapses_incoming_duplicates() {
        let incoming = vec![doc("a", "first"), doc("b", "2"), doc("a", "second")];

        let merged = merge_documents(&[], &incoming);
        assert_eq!(urls(&merged), vec!["a", "b"]);
        assert_eq!(merged[0].file_name, "first");
    }

    #[test]
    fn test_existing_duplicates_are_left_alone() {
        let existing = vec![doc("a", "1"), doc("a", "2")];
        let merged = merge_documents(&existing, &[doc("a", "3")]);
        assert_eq!(merged, existing);
    }
}
