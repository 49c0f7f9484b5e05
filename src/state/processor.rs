use super::diff::StateDiffEngine;
use crate::audit::AuditStore;
use crate::error::IncompleteInput;
use crate::event::{decode_documents_event, DocumentsEvent};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Result of processing one documents event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Event was missing a required field; nothing was diffed
    Incomplete(IncompleteInput),

    Processed {
        /// Records produced by the diff
        detected: usize,
        persisted: usize,
        failed: usize,
    },
}

/// Runs the diff engine over documents events and writes the resulting
/// records to the audit store.
pub struct StateChangeProcessor {
    engine: StateDiffEngine,
    store: Arc<dyn AuditStore>,
}

impl StateChangeProcessor {
    pub fn new(engine: StateDiffEngine, store: Arc<dyn AuditStore>) -> Self {
        Self { engine, store }
    }

    /// Diff one event and persist each detected change.
    ///
    /// Every record is written independently: a failed write is logged and
    /// counted, and the remaining records are still attempted.
    pub async fn process(&self, event: &DocumentsEvent) -> ProcessOutcome {
        let thing_name = event.device_id().unwrap_or_default();
        let timestamp = event.timestamp_string().unwrap_or_default();

        let records = match self.engine.diff(
            &event.previous_reported(),
            &event.current_reported(),
            thing_name,
            &timestamp,
        ) {
            Ok(records) => records,
            Err(reason) => {
                warn!(reason = %reason, "Incomplete documents event, skipping");
                return ProcessOutcome::Incomplete(reason);
            }
        };

        let detected = records.len();
        let mut persisted = 0;
        let mut failed = 0;

        for record in &records {
            info!(
                thing_name = %record.thing_name,
                attribute = %record.attribute,
                previous_state = record.previous_state.as_deref().unwrap_or(super::ABSENT_VALUE),
                new_state = %record.new_state,
                "Change detected"
            );

            match self.store.put(record).await {
                Ok(()) => persisted += 1,
                Err(e) => {
                    error!(
                        actuator_id = %record.actuator_id(),
                        error = %e,
                        "Failed to persist audit record"
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            warn!(
                thing_name = %thing_name,
                detected = detected,
                persisted = persisted,
                failed = failed,
                "Documents event partially persisted"
            );
        }

        ProcessOutcome::Processed {
            detected,
            persisted,
            failed,
        }
    }

    /// Decode a raw documents event payload and process it.
    ///
    /// A payload that cannot be decoded is returned as an error so the
    /// dispatch loop can apply its own policy.
    pub async fn process_payload(&self, payload: &[u8]) -> Result<ProcessOutcome> {
        let event = decode_documents_event(payload).context("Failed to decode documents event")?;
        Ok(self.process(&event).await)
    }

    /// Consume documents events from a broadcast channel until it closes.
    pub async fn run(self: Arc<Self>, mut events: broadcast::Receiver<DocumentsEvent>) {
        info!("State change processor started");

        loop {
            match events.recv().await {
                Ok(event) => {
                    self.process(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "State change processor lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        warn!("Documents event channel closed");
    }
}
