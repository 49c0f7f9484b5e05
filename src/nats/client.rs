use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// NATS configuration
#[derive(Clone, Debug, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Subject pattern devices publish reported state on; `*` marks the thing name
    #[serde(default = "default_reported_subject")]
    pub reported_subject: String,

    /// Documents events published by an external shadow service
    #[serde(default = "default_documents_subject")]
    pub documents_subject: String,

    /// Subject desired-state updates are forwarded to; `{thing}` is replaced
    #[serde(default = "default_delta_subject")]
    pub delta_subject: String,

    #[serde(default = "default_rfid_request_subject")]
    pub rfid_request_subject: String,

    #[serde(default = "default_rfid_response_subject")]
    pub rfid_response_subject: String,
}

fn default_url() -> String {
    std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string())
}

fn default_reported_subject() -> String {
    "home.*.shadow.update".to_string()
}

fn default_documents_subject() -> String {
    "home.*.shadow.documents".to_string()
}

fn default_delta_subject() -> String {
    "home.{thing}.shadow.delta".to_string()
}

fn default_rfid_request_subject() -> String {
    "home.rfid.check_request".to_string()
}

fn default_rfid_response_subject() -> String {
    "home.rfid.check_response".to_string()
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reported_subject: default_reported_subject(),
            documents_subject: default_documents_subject(),
            delta_subject: default_delta_subject(),
            rfid_request_subject: default_rfid_request_subject(),
            rfid_response_subject: default_rfid_response_subject(),
        }
    }
}

/// Connected NATS client plus the subjects it serves
pub struct NatsClient {
    client: async_nats::Client,
    config: NatsConfig,
}

impl NatsClient {
    /// Connect to NATS
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        info!("Connecting to NATS at {}", config.url);

        let client = async_nats::connect(&config.url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS");

        Ok(Self { client, config })
    }

    /// Get underlying NATS client
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }

    pub fn config(&self) -> &NatsConfig {
        &self.config
    }
}
