//! # Classification Router
//!
//! Chooses how an envelope mutates the case backend from its classification
//! and whether the referenced case exists. The decision is the data in
//! [`ROUTING_TABLE`]; supporting a new classification means adding rows there.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Classification;

/// Case mutation applied for an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStrategy {
    /// Merge the envelope's documents into the existing case
    AttachToExistingCase,
    /// Create a new exception record holding the envelope's documents
    CreateExceptionRecord,
}

impl fmt::Display for MutationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationStrategy::AttachToExistingCase => write!(f, "attach_to_existing_case"),
            MutationStrategy::CreateExceptionRecord => write!(f, "create_exception_record"),
        }
    }
}

/// Case lookup condition a route applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseCondition {
    Found,
    NotFound,
    Either,
}

impl CaseCondition {
    fn matches(self, case_found: bool) -> bool {
        match self {
            CaseCondition::Found => case_found,
            CaseCondition::NotFound => !case_found,
            CaseCondition::Either => true,
        }
    }
}

/// One row of the routing table; `strategy: None` means the envelope is accepted without mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub classification: Classification,
    pub case: CaseCondition,
    pub strategy: Option<MutationStrategy>,
}

pub const ROUTING_TABLE: &[Route] = &[
    Route {
        classification: Classification::SupplementaryEvidence,
        case: CaseCondition::Found,
        strategy: Some(MutationStrategy::AttachToExistingCase),
    },
    Route {
        classification: Classification::SupplementaryEvidence,
        case: CaseCondition::NotFound,
        strategy: Some(MutationStrategy::CreateExceptionRecord),
    },
    Route {
        classification: Classification::Exception,
        case: CaseCondition::Either,
        strategy: Some(MutationStrategy::CreateExceptionRecord),
    },
    // New applications are not handled yet
    Route {
        classification: Classification::NewApplication,
        case: CaseCondition::Either,
        strategy: None,
    },
];

/// Select the mutation strategy for an envelope, `None` meaning no mutation
pub fn select_strategy(
    classification: Classification,
    case_found: bool,
) -> Option<MutationStrategy> {
    ROUTING_TABLE
        .iter()
        .find(|route| route.classification == classification && route.case.matches(case_found))
        .and_then(|route| route.strategy)
}
