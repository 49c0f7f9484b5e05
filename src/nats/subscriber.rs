use super::subjects::thing_from_subject;
use crate::credentials::CredentialValidator;
use crate::error::is_incomplete_input;
use crate::shadow::{MemoryShadowService, ShadowState};
use crate::state::StateChangeProcessor;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reported-state message published by a device
#[derive(Debug, Deserialize)]
struct ReportedUpdate {
    #[serde(default)]
    state: ShadowState,
}

/// Feed devices' reported state into the shadow service.
///
/// Runs until the subscription ends. Each message is merged into the
/// document of the thing named in its subject.
pub async fn run_reported_subscriber(
    client: async_nats::Client,
    pattern: String,
    shadow: Arc<MemoryShadowService>,
) -> Result<()> {
    let mut subscriber = client
        .subscribe(pattern.clone())
        .await
        .context(format!("Failed to subscribe to '{}'", pattern))?;

    info!(subject = %pattern, "Reported state subscriber started");

    while let Some(message) = subscriber.next().await {
        let subject = message.subject.as_str();

        let Some(thing_name) = thing_from_subject(subject, &pattern) else {
            warn!(subject = %subject, "Subject does not name a thing");
            continue;
        };

        let update: ReportedUpdate = match serde_json::from_slice(&message.payload) {
            Ok(update) => update,
            Err(e) => {
                warn!(thing_name = %thing_name, error = %e, "Malformed reported state");
                continue;
            }
        };

        if update.state.reported.is_empty() {
            debug!(thing_name = %thing_name, "Reported update without attributes");
            continue;
        }

        shadow.report(thing_name, update.state.reported);
    }

    warn!("Reported state subscription closed");
    Ok(())
}

/// Answer credential checks from the access controller.
pub async fn run_card_check_subscriber(
    client: async_nats::Client,
    subject: String,
    validator: Arc<CredentialValidator>,
) -> Result<()> {
    let mut subscriber = client
        .subscribe(subject.clone())
        .await
        .context(format!("Failed to subscribe to '{}'", subject))?;

    info!(subject = %subject, "Card check subscriber started");

    while let Some(message) = subscriber.next().await {
        match validator.handle_payload(&message.payload).await {
            Ok(_) => {}
            // Already logged by the validator
            Err(e) if is_incomplete_input(&e) => debug!(error = %e, "Card check skipped"),
            Err(e) => error!(error = ?e, "Card check rejected"),
        }
    }

    warn!("Card check subscription closed");
    Ok(())
}

/// Process documents events published by an external shadow service.
pub async fn run_documents_subscriber(
    client: async_nats::Client,
    subject: String,
    processor: Arc<StateChangeProcessor>,
) -> Result<()> {
    let mut subscriber = client
        .subscribe(subject.clone())
        .await
        .context(format!("Failed to subscribe to '{}'", subject))?;

    info!(subject = %subject, "Documents event subscriber started");

    while let Some(message) = subscriber.next().await {
        if let Err(e) = processor.process_payload(&message.payload).await {
            error!(subject = %message.subject, error = ?e, "Documents event dropped");
        }
    }

    warn!("Documents event subscription closed");
    Ok(())
}
