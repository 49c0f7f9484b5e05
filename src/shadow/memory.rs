use super::{merge_snapshot, ShadowDocument, ShadowService, Snapshot};
use crate::event::DocumentsEvent;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Desired-state change pushed towards a device
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesiredUpdate {
    pub thing_name: String,
    /// Only the attributes changed by this update
    pub desired: Snapshot,
    pub version: u64,
}

/// In-process shadow service holding one document per device.
///
/// Every reported-state update emits a [`DocumentsEvent`] carrying the
/// document before and after the merge; every desired-state update emits a
/// [`DesiredUpdate`] for delivery to the device.
pub struct MemoryShadowService {
    documents: DashMap<String, ShadowDocument>,

    /// Broadcast channel for previous/current document pairs
    documents_tx: broadcast::Sender<DocumentsEvent>,

    /// Broadcast channel for desired-state changes
    desired_tx: broadcast::Sender<DesiredUpdate>,

    /// Last documents event stamp, epoch milliseconds
    last_event_ms: AtomicI64,
}

impl MemoryShadowService {
    pub fn new() -> Self {
        let (documents_tx, _) = broadcast::channel(1000);
        let (desired_tx, _) = broadcast::channel(1000);

        Self {
            documents: DashMap::new(),
            documents_tx,
            desired_tx,
            last_event_ms: AtomicI64::new(0),
        }
    }

    /// Merge a device's reported state and broadcast the resulting documents event.
    ///
    /// The event timestamp is in epoch milliseconds and strictly increases
    /// across events, so every change keeps its own audit row.
    pub fn report(&self, thing_name: &str, reported: Snapshot) -> DocumentsEvent {
        let mut document = self.documents.entry(thing_name.to_string()).or_default();

        let stamp = self.next_event_millis();

        // First report has no previous document
        let previous = (document.version > 0).then(|| document.clone());

        merge_snapshot(&mut document.state.reported, reported);
        document.version += 1;
        document.timestamp = stamp / 1000;

        let current = document.clone();
        drop(document);

        debug!(
            thing_name = %thing_name,
            version = current.version,
            "Reported state merged"
        );

        let event = DocumentsEvent {
            thing_name: Some(thing_name.to_string()),
            timestamp: Some(Value::from(stamp)),
            previous,
            current: Some(current),
        };

        let _ = self.documents_tx.send(event.clone());

        event
    }

    fn next_event_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let last = self
            .last_event_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(last + 1)
    }

    /// Get the full document for a device
    pub fn get_document(&self, thing_name: &str) -> Option<ShadowDocument> {
        self.documents.get(thing_name).map(|d| d.clone())
    }

    /// Subscribe to documents events (reported-state transitions)
    pub fn subscribe_documents(&self) -> broadcast::Receiver<DocumentsEvent> {
        self.documents_tx.subscribe()
    }

    /// Subscribe to desired-state updates
    pub fn subscribe_desired(&self) -> broadcast::Receiver<DesiredUpdate> {
        self.desired_tx.subscribe()
    }
}

impl Default for MemoryShadowService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShadowService for MemoryShadowService {
    async fn update_desired(&self, thing_name: &str, desired: Snapshot) -> Result<()> {
        let mut document = self.documents.entry(thing_name.to_string()).or_default();

        merge_snapshot(&mut document.state.desired, desired.clone());
        document.version += 1;
        document.timestamp = Utc::now().timestamp();

        let update = DesiredUpdate {
            thing_name: thing_name.to_string(),
            desired,
            version: document.version,
        };
        drop(document);

        info!(
            thing_name = %thing_name,
            version = update.version,
            attributes = update.desired.len(),
            "Desired state updated"
        );

        let _ = self.desired_tx.send(update);
        Ok(())
    }

    async fn get_reported(&self, thing_name: &str) -> Result<Snapshot> {
        self.documents
            .get(thing_name)
            .map(|d| d.state.reported.clone())
            .ok_or_else(|| anyhow!("No shadow exists for thing '{}'", thing_name))
    }
}
