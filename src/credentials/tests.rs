use super::*;
use anyhow::bail;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Registry fake with a fixed card list, or one that always errors
struct FakeRegistry {
    cards: Vec<&'static str>,
    broken: bool,
    lookups: AtomicUsize,
}

impl FakeRegistry {
    fn with_cards(cards: Vec<&'static str>) -> Self {
        Self {
            cards,
            broken: false,
            lookups: AtomicUsize::new(0),
        }
    }

    fn broken() -> Self {
        Self {
            cards: Vec::new(),
            broken: true,
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CredentialRegistry for FakeRegistry {
    async fn contains(&self, credential_id: &str) -> Result<bool> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            bail!("registry unreachable");
        }
        Ok(self.cards.iter().any(|card| *card == credential_id))
    }
}

#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<VerdictResult>>,
    broken: bool,
}

#[async_trait]
impl VerdictPublisher for RecordingPublisher {
    async fn publish(&self, verdict: &VerdictResult) -> Result<()> {
        if self.broken {
            bail!("broker down");
        }
        self.published.lock().unwrap().push(verdict.clone());
        Ok(())
    }
}

fn validator(
    registry: Arc<FakeRegistry>,
    publisher: Arc<RecordingPublisher>,
) -> CredentialValidator {
    CredentialValidator::new(registry, publisher)
}

#[tokio::test]
async fn test_registered_card_is_valid() {
    let registry = Arc::new(FakeRegistry::with_cards(vec!["04AABBCC"]));
    let publisher = Arc::new(RecordingPublisher::default());

    let result = validator(registry, publisher.clone())
        .validate("04AABBCC")
        .await
        .unwrap();

    assert_eq!(result.status, Verdict::Valid);
    assert_eq!(result.credential_id, "04AABBCC");
    assert_eq!(publisher.published.lock().unwrap().as_slice(), &[result]);
}

#[tokio::test]
async fn test_unknown_card_is_invalid_and_published() {
    let registry = Arc::new(FakeRegistry::with_cards(vec!["04AABBCC"]));
    let publisher = Arc::new(RecordingPublisher::default());

    let result = validator(registry, publisher.clone())
        .validate("DEADBEEF")
        .await
        .unwrap();

    assert_eq!(result.status, Verdict::Invalid);
    assert_eq!(publisher.published.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_identifier_skips_lookup() {
    let registry = Arc::new(FakeRegistry::with_cards(vec!["04AABBCC"]));
    let publisher = Arc::new(RecordingPublisher::default());
    let validator = validator(registry.clone(), publisher.clone());

    assert_eq!(
        validator.validate("").await,
        Err(crate::error::IncompleteInput::MissingCredentialId)
    );
    assert_eq!(
        validator.validate("   ").await,
        Err(crate::error::IncompleteInput::MissingCredentialId)
    );
    assert_eq!(registry.lookups.load(Ordering::SeqCst), 0);
    assert!(publisher.published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_registry_failure_fails_closed() {
    let registry = Arc::new(FakeRegistry::broken());
    let publisher = Arc::new(RecordingPublisher::default());

    let result = validator(registry, publisher.clone())
        .validate("04AABBCC")
        .await
        .unwrap();

    assert_eq!(result.status, Verdict::Invalid);
    assert_eq!(publisher.published.lock().unwrap()[0].status, Verdict::Invalid);
}

#[tokio::test]
async fn test_publish_failure_keeps_verdict() {
    let registry = Arc::new(FakeRegistry::with_cards(vec!["04AABBCC"]));
    let publisher = Arc::new(RecordingPublisher {
        published: Mutex::new(Vec::new()),
        broken: true,
    });

    let result = validator(registry, publisher).validate("04AABBCC").await;

    assert_eq!(result.unwrap().status, Verdict::Valid);
}

#[tokio::test]
async fn test_handle_payload_decodes_then_validates() {
    let registry = Arc::new(FakeRegistry::with_cards(vec!["04AABBCC"]));
    let publisher = Arc::new(RecordingPublisher::default());
    let validator = validator(registry, publisher);

    let result = validator
        .handle_payload(br#"{"card_uid": "04AABBCC"}"#)
        .await
        .unwrap();
    assert_eq!(result.status, Verdict::Valid);

    let missing_uid = validator.handle_payload(br#"{"other": 1}"#).await.unwrap_err();
    assert!(crate::error::is_incomplete_input(&missing_uid));

    let undecodable = validator.handle_payload(b"@@@").await.unwrap_err();
    assert!(!crate::error::is_incomplete_input(&undecodable));
}

#[test]
fn test_verdict_wire_format() {
    let result = VerdictResult {
        status: Verdict::Invalid,
        credential_id: "04AABBCC".to_string(),
    };

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        serde_json::json!({"status": "INVALID", "card_uid": "04AABBCC"})
    );
}
