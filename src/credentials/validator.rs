use super::{CredentialRegistry, Verdict, VerdictPublisher, VerdictResult};
use crate::error::IncompleteInput;
use crate::event::decode_card_check;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Validates credential identifiers and publishes the verdict.
pub struct CredentialValidator {
    registry: Arc<dyn CredentialRegistry>,
    publisher: Arc<dyn VerdictPublisher>,
}

impl CredentialValidator {
    pub fn new(registry: Arc<dyn CredentialRegistry>, publisher: Arc<dyn VerdictPublisher>) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// Look up an already-decoded identifier and publish the verdict.
    ///
    /// - Blank identifier: `IncompleteInput`, no lookup, nothing published.
    /// - Registry hit: `VALID`. Miss or registry failure: `INVALID`.
    /// - A publish failure is logged and does not change the returned verdict.
    pub async fn validate(&self, credential_id: &str) -> Result<VerdictResult, IncompleteInput> {
        if credential_id.trim().is_empty() {
            warn!("Credential check without identifier, skipping lookup");
            return Err(IncompleteInput::MissingCredentialId);
        }

        let status = match self.registry.contains(credential_id).await {
            Ok(true) => Verdict::Valid,
            Ok(false) => Verdict::Invalid,
            Err(e) => {
                error!(
                    credential_id = %credential_id,
                    error = %e,
                    "Credential registry lookup failed, rejecting"
                );
                Verdict::Invalid
            }
        };

        info!(credential_id = %credential_id, status = ?status, "Credential validated");

        let result = VerdictResult {
            status,
            credential_id: credential_id.to_string(),
        };

        if let Err(e) = self.publisher.publish(&result).await {
            error!(
                credential_id = %credential_id,
                error = %e,
                "Failed to publish credential verdict"
            );
        }

        Ok(result)
    }

    /// Decode a raw check request payload, then validate its identifier.
    pub async fn handle_payload(&self, payload: &[u8]) -> Result<VerdictResult> {
        let request = decode_card_check(payload).context("Failed to decode card check request")?;
        let credential_id = request.card_uid.unwrap_or_default();

        let result = self.validate(&credential_id).await?;
        Ok(result)
    }
}
