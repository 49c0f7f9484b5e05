use anyhow::{Context, Result};
use serde::Deserialize;

// Re-export existing config types
pub use crate::nats::NatsConfig;
pub use crate::state::DiffPolicy;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomoticaConfig {
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub diff: DiffPolicy,
}

/// SQLite database locations
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_audit_db")]
    pub audit_db: String,
    #[serde(default = "default_credentials_db")]
    pub credentials_db: String,
    #[serde(default = "default_devices_db")]
    pub devices_db: String,
}

fn default_audit_db() -> String {
    "audit.db".to_string()
}

fn default_credentials_db() -> String {
    "credentials.db".to_string()
}

fn default_devices_db() -> String {
    "devices.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audit_db: default_audit_db(),
            credentials_db: default_credentials_db(),
            devices_db: default_devices_db(),
        }
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token guarding the admin routes; `DOMOTICA_ADMIN_TOKEN` overrides
    #[serde(default)]
    pub admin_token: Option<String>,
}

fn default_port() -> u16 {
    3000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            admin_token: None,
        }
    }
}

/// Voice skill configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// Location assumed when the user does not name one
    #[serde(default = "default_location")]
    pub default_location: String,
}

fn default_location() -> String {
    crate::command::DEFAULT_LOCATION.to_string()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_location: default_location(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<DomoticaConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: DomoticaConfig = toml::from_str(&contents).context("Failed to parse config")?;
    Ok(config)
}
