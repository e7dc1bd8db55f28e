//! # Envelope Consumer
//!
//! Dispatcher that owns the queue side of processing. It polls a
//! [`MessageReceiver`] for locked messages and runs each one through
//! [`EnvelopeEventProcessor::on_message`] on its own tokio task. A semaphore
//! of `max_concurrent_messages` permits bounds the tasks in flight, and a
//! message is only received when a permit is free for it.
//!
//! The consumer stops in two ways:
//! - a shutdown request through [`ConsumerShutdownHandle`] stops polling,
//!   waits for in-flight messages and returns `Ok(())`
//! - an interruption reported by the queue, either while receiving or while
//!   a task finalizes its message, stops polling the same way but returns
//!   [`OrchestratorError::Interrupted`]

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::envelope_processor::EnvelopeEventProcessor;
use super::finalizer::FinalizationAction;
use crate::config::{OrchestratorConfig, QueueConfig};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::messaging::{MessageReceiver, MessagingError, MessagingResult, QueueMessage};

/// Runtime statistics for the consumer
#[derive(Debug, Default)]
pub struct ConsumerStats {
    pub messages_received: AtomicU64,
    pub messages_completed: AtomicU64,
    pub messages_dead_lettered: AtomicU64,
    pub messages_left_for_redelivery: AtomicU64,
    /// Finalizations that failed, including interruptions
    pub finalize_errors: AtomicU64,
    pub receive_errors: AtomicU64,
    /// Received messages that could not be handed to a task; their locks expire unsettled
    pub dispatch_errors: AtomicU64,
    /// Message tasks that panicked or were cancelled
    pub task_failures: AtomicU64,
}

/// Point-in-time copy of [`ConsumerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerStatsSnapshot {
    pub messages_received: u64,
    pub messages_completed: u64,
    pub messages_dead_lettered: u64,
    pub messages_left_for_redelivery: u64,
    pub finalize_errors: u64,
    pub receive_errors: u64,
    pub dispatch_errors: u64,
    pub task_failures: u64,
}

impl ConsumerStats {
    pub fn snapshot(&self) -> ConsumerStatsSnapshot {
        ConsumerStatsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_completed: self.messages_completed.load(Ordering::Relaxed),
            messages_dead_lettered: self.messages_dead_lettered.load(Ordering::Relaxed),
            messages_left_for_redelivery: self
                .messages_left_for_redelivery
                .load(Ordering::Relaxed),
            finalize_errors: self.finalize_errors.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
            dispatch_errors: self.dispatch_errors.load(Ordering::Relaxed),
            task_failures: self.task_failures.load(Ordering::Relaxed),
        }
    }

    fn record_action(&self, action: Option<FinalizationAction>) {
        let counter = match action {
            Some(FinalizationAction::Completed) => &self.messages_completed,
            Some(FinalizationAction::DeadLettered) => &self.messages_dead_lettered,
            Some(FinalizationAction::LeftForRedelivery) => &self.messages_left_for_redelivery,
            None => &self.finalize_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Requests a graceful stop of a running [`EnvelopeConsumer`]
#[derive(Debug, Clone)]
pub struct ConsumerShutdownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl ConsumerShutdownHandle {
    pub fn shutdown(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.sender.borrow()
    }
}

pub struct EnvelopeConsumer {
    consumer_id: Uuid,
    receiver: Arc<dyn MessageReceiver>,
    processor: Arc<EnvelopeEventProcessor>,
    config: QueueConfig,
    permits: Arc<Semaphore>,
    shutdown: Arc<watch::Sender<bool>>,
    is_running: AtomicBool,
    stats: Arc<ConsumerStats>,
}

impl std::fmt::Debug for EnvelopeConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeConsumer")
            .field("consumer_id", &self.consumer_id)
            .field("config", &self.config)
            .field("is_running", &self.is_running.load(Ordering::Relaxed))
            .finish()
    }
}

impl EnvelopeConsumer {
    pub fn new(
        config: QueueConfig,
        receiver: Arc<dyn MessageReceiver>,
        processor: Arc<EnvelopeEventProcessor>,
    ) -> Self {
        let consumer_id = Uuid::new_v4();
        let (shutdown, _) = watch::channel(false);

        info!(
            consumer_id = %consumer_id,
            queue = %config.queue_name,
            max_concurrent_messages = config.max_concurrent_messages,
            "Creating EnvelopeConsumer"
        );

        Self {
            consumer_id,
            receiver,
            processor,
            permits: Arc::new(Semaphore::new(config.max_concurrent_messages)),
            config,
            shutdown: Arc::new(shutdown),
            is_running: AtomicBool::new(false),
            stats: Arc::new(ConsumerStats::default()),
        }
    }

    /// Consumer for a validated configuration
    pub fn from_config(
        config: &OrchestratorConfig,
        receiver: Arc<dyn MessageReceiver>,
        processor: Arc<EnvelopeEventProcessor>,
    ) -> OrchestratorResult<Self> {
        config.validate()?;
        Ok(Self::new(config.queue.clone(), receiver, processor))
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> ConsumerStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn shutdown_handle(&self) -> ConsumerShutdownHandle {
        ConsumerShutdownHandle {
            sender: self.shutdown.clone(),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    /// Poll and process messages until shutdown is requested or the queue is interrupted
    pub async fn run(&self) -> OrchestratorResult<()> {
        let mut shutdown_rx = self.shutdown.subscribe();
        let mut tasks: JoinSet<MessagingResult<()>> = JoinSet::new();
        let mut interruption: Option<MessagingError> = None;

        self.is_running.store(true, Ordering::SeqCst);
        info!(
            consumer_id = %self.consumer_id,
            queue = %self.config.queue_name,
            "Starting EnvelopeConsumer"
        );

        loop {
            while let Some(joined) = tasks.try_join_next() {
                if let Some(err) = self.settle_task(joined) {
                    interruption.get_or_insert(err);
                }
            }

            if interruption.is_some() || *shutdown_rx.borrow() {
                break;
            }

            let capacity = self
                .permits
                .available_permits()
                .min(self.config.receive_batch_size);

            if capacity == 0 {
                // Every permit is held by a running task; wait for one to finish
                tokio::select! {
                    Some(joined) = tasks.join_next() => {
                        if let Some(err) = self.settle_task(joined) {
                            interruption.get_or_insert(err);
                        }
                    }
                    _ = shutdown_rx.changed() => {}
                }
                continue;
            }

            match self.receiver.receive(capacity, self.config.lock_duration()).await {
                Ok(messages) if messages.is_empty() => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval()) => {}
                        _ = shutdown_rx.changed() => {}
                    }
                }
                Ok(messages) => {
                    debug!(
                        consumer_id = %self.consumer_id,
                        count = messages.len(),
                        "Received messages"
                    );
                    for message in messages {
                        self.dispatch(&mut tasks, message);
                    }
                }
                Err(err) if err.is_interruption() => {
                    warn!(
                        consumer_id = %self.consumer_id,
                        error = %err,
                        "Queue receive interrupted"
                    );
                    interruption.get_or_insert(err);
                }
                Err(err) => {
                    self.stats.receive_errors.fetch_add(1, Ordering::Relaxed);
                    error!(
                        consumer_id = %self.consumer_id,
                        error = %err,
                        "Failed to receive messages"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval()) => {}
                        _ = shutdown_rx.changed() => {}
                    }
                }
            }
        }

        info!(
            consumer_id = %self.consumer_id,
            in_flight = tasks.len(),
            "EnvelopeConsumer stopping, waiting for in-flight messages"
        );

        while let Some(joined) = tasks.join_next().await {
            if let Some(err) = self.settle_task(joined) {
                interruption.get_or_insert(err);
            }
        }

        self.is_running.store(false, Ordering::SeqCst);

        match interruption {
            Some(err) => {
                error!(
                    consumer_id = %self.consumer_id,
                    error = %err,
                    "EnvelopeConsumer interrupted"
                );
                Err(OrchestratorError::Interrupted(err.to_string()))
            }
            None => {
                info!(
                    consumer_id = %self.consumer_id,
                    stats = ?self.stats.snapshot(),
                    "EnvelopeConsumer stopped"
                );
                Ok(())
            }
        }
    }

    /// Spawn a task for `message`; without a free permit the message is left to its lock expiry
    fn dispatch(&self, tasks: &mut JoinSet<MessagingResult<()>>, message: QueueMessage) {
        let permit = match self.permits.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(err) => {
                self.stats.dispatch_errors.fetch_add(1, Ordering::Relaxed);
                error!(
                    consumer_id = %self.consumer_id,
                    message_id = %message.message_id,
                    error = %err,
                    "No processing permit for received message"
                );
                return;
            }
        };

        self.stats.messages_received.fetch_add(1, Ordering::Relaxed);

        let processor = self.processor.clone();
        let stats = self.stats.clone();

        tasks.spawn(async move {
            let _permit = permit;
            let processed = processor.on_message(&message).await?;
            stats.record_action(processed.action);
            Ok(())
        });
    }

    /// Record a finished task, returning the interruption it reported if any
    fn settle_task(
        &self,
        joined: Result<MessagingResult<()>, JoinError>,
    ) -> Option<MessagingError> {
        match joined {
            Ok(Ok(())) => None,
            Ok(Err(err)) => {
                self.stats.finalize_errors.fetch_add(1, Ordering::Relaxed);
                Some(err)
            }
            Err(join_error) => {
                self.stats.task_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    consumer_id = %self.consumer_id,
                    error = %join_error,
                    "Message processing task failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationError;
    use crate::messaging::InMemoryQueue;
    use crate::models::{CaseDetails, CaseEvent};
    use crate::services::{
        CaseApiError, CaseEventSubmitter, CaseRetriever, NotificationSendingError,
        ProcessedEnvelopeNotifier,
    };
    use async_trait::async_trait;

    /// Backend with no cases that accepts every event and notification
    struct EmptyBackend;

    #[async_trait]
    impl CaseRetriever for EmptyBackend {
        async fn retrieve(
            &self,
            _jurisdiction: &str,
            _case_ref: &str,
        ) -> Result<Option<CaseDetails>, CaseApiError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl CaseEventSubmitter for EmptyBackend {
        async fn submit_event(&self, _event: CaseEvent) -> Result<(), CaseApiError> {
            Ok(())
        }
    }

    #[async_trait]
    impl ProcessedEnvelopeNotifier for EmptyBackend {
        async fn notify(&self, _envelope_id: &str) -> Result<(), NotificationSendingError> {
            Ok(())
        }
    }

    fn consumer(config: &OrchestratorConfig) -> OrchestratorResult<EnvelopeConsumer> {
        let queue = Arc::new(InMemoryQueue::new(config.queue.queue_name.clone()));
        let backend = Arc::new(EmptyBackend);
        let processor = Arc::new(EnvelopeEventProcessor::new(
            config,
            backend.clone(),
            backend.clone(),
            backend,
            queue.clone(),
        ));
        EnvelopeConsumer::from_config(config, queue, processor)
    }

    #[tokio::test]
    async fn test_dispatch_without_permit_skips_message_and_keeps_running() {
        let consumer = consumer(&OrchestratorConfig::default()).unwrap();
        let held = consumer
            .permits
            .clone()
            .try_acquire_many_owned(consumer.config.max_concurrent_messages as u32)
            .unwrap();
        let mut tasks = JoinSet::new();

        consumer.dispatch(&mut tasks, QueueMessage::new("msg-1", b"{}".to_vec()));

        assert!(tasks.is_empty());
        let stats = consumer.stats();
        assert_eq!(stats.dispatch_errors, 1);
        assert_eq!(stats.messages_received, 0);
        assert_eq!(stats.finalize_errors, 0);

        drop(held);
        consumer.dispatch(&mut tasks, QueueMessage::new("msg-2", b"{}".to_vec()));
        assert_eq!(tasks.len(), 1);
        assert_eq!(consumer.stats().messages_received, 1);
        // The task runs to completion; settling an unknown lock is absorbed by the finalizer
        assert!(tasks.join_next().await.unwrap().unwrap().is_ok());
    }

    #[test]
    fn test_from_config_rejects_invalid_configuration() {
        let mut config = OrchestratorConfig::default();
        config.queue.receive_batch_size = 0;

        let err = consumer(&config).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::Configuration(ConfigurationError::InvalidValue { ref field, .. })
                if field == "receive_batch_size"
        ));
    }

    #[test]
    fn test_stats_record_actions() {
        let stats = ConsumerStats::default();
        stats.record_action(Some(FinalizationAction::Completed));
        stats.record_action(Some(FinalizationAction::Completed));
        stats.record_action(Some(FinalizationAction::DeadLettered));
        stats.record_action(Some(FinalizationAction::LeftForRedelivery));
        stats.record_action(None);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.messages_completed, 2);
        assert_eq!(snapshot.messages_dead_lettered, 1);
        assert_eq!(snapshot.messages_left_for_redelivery, 1);
        assert_eq!(snapshot.finalize_errors, 1);
        assert_eq!(snapshot.messages_received, 0);
    }

    #[test]
    fn test_shutdown_handle_is_shared() {
        let (sender, _) = watch::channel(false);
        let handle = ConsumerShutdownHandle {
            sender: Arc::new(sender),
        };
        let other = handle.clone();

        assert!(!other.is_shutdown_requested());
        handle.shutdown();
        assert!(other.is_shutdown_requested());
    }
}
