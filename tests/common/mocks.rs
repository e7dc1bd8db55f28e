//! Recording test doubles for the pipeline's collaborators
//!
//! Each mock records its calls and can be told to fail. Case API failures are
//! produced by a closure because `CaseApiError` is not `Clone`.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use envelope_orchestrator::messaging::{
    LockToken, MessageOperations, MessagingError, MessagingResult,
};
use envelope_orchestrator::models::{CaseDetails, CaseEvent};
use envelope_orchestrator::services::{
    CaseApiError, CaseEventSubmitter, CaseRetriever, NotificationSendingError,
    ProcessedEnvelopeNotifier,
};

type CaseApiFailure = Box<dyn Fn() -> CaseApiError + Send + Sync>;

#[derive(Default)]
pub struct MockCaseRetriever {
    cases: Mutex<HashMap<String, CaseDetails>>,
    failure: Mutex<Option<CaseApiFailure>>,
    lookups: Mutex<Vec<(String, String)>>,
}

impl MockCaseRetriever {
    pub fn with_case(&self, case: CaseDetails) {
        self.cases.lock().insert(case.reference.clone(), case);
    }

    pub fn fail_with(&self, failure: impl Fn() -> CaseApiError + Send + Sync + 'static) {
        *self.failure.lock() = Some(Box::new(failure));
    }

    /// `(jurisdiction, case_ref)` of every lookup, in call order
    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().clone()
    }
}

#[async_trait]
impl CaseRetriever for MockCaseRetriever {
    async fn retrieve(
        &self,
        jurisdiction: &str,
        case_ref: &str,
    ) -> Result<Option<CaseDetails>, CaseApiError> {
        self.lookups
            .lock()
            .push((jurisdiction.to_string(), case_ref.to_string()));

        if let Some(failure) = self.failure.lock().as_ref() {
            return Err(failure());
        }
        Ok(self.cases.lock().get(case_ref).cloned())
    }
}

#[derive(Default)]
pub struct MockCaseEventSubmitter {
    events: Mutex<Vec<CaseEvent>>,
    failure: Mutex<Option<CaseApiFailure>>,
}

impl MockCaseEventSubmitter {
    pub fn fail_with(&self, failure: impl Fn() -> CaseApiError + Send + Sync + 'static) {
        *self.failure.lock() = Some(Box::new(failure));
    }

    pub fn events(&self) -> Vec<CaseEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl CaseEventSubmitter for MockCaseEventSubmitter {
    async fn submit_event(&self, event: CaseEvent) -> Result<(), CaseApiError> {
        if let Some(failure) = self.failure.lock().as_ref() {
            return Err(failure());
        }
        self.events.lock().push(event);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockNotifier {
    notified: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl MockNotifier {
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    pub fn notified(&self) -> Vec<String> {
        self.notified.lock().clone()
    }
}

#[async_trait]
impl ProcessedEnvelopeNotifier for MockNotifier {
    async fn notify(&self, envelope_id: &str) -> Result<(), NotificationSendingError> {
        if let Some(message) = self.failure.lock().as_ref() {
            return Err(NotificationSendingError::new(message.clone()));
        }
        self.notified.lock().push(envelope_id.to_string());
        Ok(())
    }
}

/// Dead-letter call as recorded by [`MockMessageOperations`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadLetterCall {
    pub lock_token: LockToken,
    pub reason: String,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct MockMessageOperations {
    completed: Mutex<Vec<LockToken>>,
    dead_lettered: Mutex<Vec<DeadLetterCall>>,
    failure: Mutex<Option<MessagingError>>,
}

impl MockMessageOperations {
    pub fn fail_with(&self, error: MessagingError) {
        *self.failure.lock() = Some(error);
    }

    pub fn completed(&self) -> Vec<LockToken> {
        self.completed.lock().clone()
    }

    pub fn dead_lettered(&self) -> Vec<DeadLetterCall> {
        self.dead_lettered.lock().clone()
    }

    fn check_failure(&self) -> MessagingResult<()> {
        match self.failure.lock().as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MessageOperations for MockMessageOperations {
    async fn complete(&self, lock_token: &LockToken) -> MessagingResult<()> {
        self.check_failure()?;
        self.completed.lock().push(*lock_token);
        Ok(())
    }

    async fn dead_letter(
        &self,
        lock_token: &LockToken,
        reason: &str,
        description: &str,
    ) -> MessagingResult<()> {
        self.check_failure()?;
        self.dead_lettered.lock().push(DeadLetterCall {
            lock_token: *lock_token,
            reason: reason.to_string(),
            description: description.to_string(),
        });
        Ok(())
    }
}
