use super::subjects::delta_subject;
use crate::credentials::{VerdictPublisher, VerdictResult};
use crate::shadow::DesiredUpdate;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Publishes credential verdicts to the controller's response subject
#[derive(Clone)]
pub struct NatsVerdictPublisher {
    client: async_nats::Client,
    subject: String,
}

impl NatsVerdictPublisher {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl VerdictPublisher for NatsVerdictPublisher {
    async fn publish(&self, verdict: &VerdictResult) -> Result<()> {
        let payload =
            serde_json::to_vec(verdict).context("Failed to serialize verdict to JSON")?;

        debug!(
            subject = %self.subject,
            credential_id = %verdict.credential_id,
            "Publishing credential verdict"
        );

        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .context(format!("Failed to publish verdict to subject '{}'", self.subject))?;

        Ok(())
    }
}

/// Forwards desired-state updates to each device's delta subject
#[derive(Clone)]
pub struct DesiredStatePublisher {
    client: async_nats::Client,
    template: String,
}

impl DesiredStatePublisher {
    pub fn new(client: async_nats::Client, template: impl Into<String>) -> Self {
        Self {
            client,
            template: template.into(),
        }
    }

    /// Publish one update as `{"state": {...}, "version": n}`
    pub async fn publish(&self, update: &DesiredUpdate) -> Result<()> {
        let subject = delta_subject(&self.template, &update.thing_name);
        let payload = serde_json::to_vec(&json!({
            "state": update.desired,
            "version": update.version,
        }))
        .context("Failed to serialize desired state")?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context(format!("Failed to publish delta to subject '{}'", subject))?;

        Ok(())
    }

    /// Forward updates from the shadow service until the channel closes.
    pub async fn run(self, mut updates: broadcast::Receiver<DesiredUpdate>) {
        info!("Desired state forwarder started");

        loop {
            match updates.recv().await {
                Ok(update) => {
                    if let Err(e) = self.publish(&update).await {
                        error!(
                            thing_name = %update.thing_name,
                            error = %e,
                            "Failed to forward desired state"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Desired state forwarder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}
