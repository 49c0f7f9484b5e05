use anyhow::{Context, Result};
use domotica::api::{
    create_admin_router, create_health_router, create_history_router, create_shadow_router,
    create_voice_router, AdminAppState, HistoryAppState, ShadowAppState, VoiceAppState,
};
use domotica::audit::SqliteAuditStore;
use domotica::config::{load_config, DomoticaConfig};
use domotica::credentials::{CredentialValidator, SqliteCredentialRegistry};
use domotica::devices::SqliteDeviceMappingStore;
use domotica::nats::{
    run_card_check_subscriber, run_documents_subscriber, run_reported_subscriber,
    DesiredStatePublisher, NatsClient, NatsVerdictPublisher,
};
use domotica::shadow::MemoryShadowService;
use domotica::state::{StateChangeProcessor, StateDiffEngine};
use domotica::voice::VoiceSkill;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domotica=info".into()),
        )
        .init();

    info!("Domotica starting...");

    let mut config = match std::env::var("DOMOTICA_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) => DomoticaConfig::default(),
    };
    if let Ok(token) = std::env::var("DOMOTICA_ADMIN_TOKEN") {
        config.api.admin_token = Some(token);
    }

    info!(
        nats_url = %config.nats.url,
        audit_db = %config.storage.audit_db,
        credentials_db = %config.storage.credentials_db,
        devices_db = %config.storage.devices_db,
        api_port = config.api.port,
        report_removals = config.diff.report_removals,
        "Configuration loaded"
    );

    // Storage
    let audit_store = Arc::new(
        SqliteAuditStore::new(&config.storage.audit_db)
            .context("Failed to initialize audit store")?,
    );
    let registry = Arc::new(
        SqliteCredentialRegistry::new(&config.storage.credentials_db)
            .context("Failed to initialize credential registry")?,
    );
    let devices = Arc::new(
        SqliteDeviceMappingStore::new(&config.storage.devices_db)
            .context("Failed to initialize device mapping store")?,
    );

    // Shadow service and state change processor
    let shadow = Arc::new(MemoryShadowService::new());
    let processor = Arc::new(StateChangeProcessor::new(
        StateDiffEngine::new(config.diff),
        audit_store.clone(),
    ));
    tokio::spawn(processor.clone().run(shadow.subscribe_documents()));

    // NATS bindings
    let nats = NatsClient::connect(config.nats.clone()).await?;
    let client = nats.client().clone();

    let validator = Arc::new(CredentialValidator::new(
        registry.clone(),
        Arc::new(NatsVerdictPublisher::new(
            client.clone(),
            config.nats.rfid_response_subject.clone(),
        )),
    ));

    let forwarder = DesiredStatePublisher::new(client.clone(), config.nats.delta_subject.clone());
    tokio::spawn(forwarder.run(shadow.subscribe_desired()));

    let reported_task = tokio::spawn(run_reported_subscriber(
        client.clone(),
        config.nats.reported_subject.clone(),
        shadow.clone(),
    ));
    let documents_task = tokio::spawn(run_documents_subscriber(
        client.clone(),
        config.nats.documents_subject.clone(),
        processor.clone(),
    ));
    let card_task = tokio::spawn(run_card_check_subscriber(
        client,
        config.nats.rfid_request_subject.clone(),
        validator,
    ));

    // HTTP API
    let skill = Arc::new(VoiceSkill::new(
        devices.clone(),
        shadow.clone(),
        config.voice.default_location.clone(),
    ));

    let router = create_health_router()
        .merge(create_voice_router(Arc::new(VoiceAppState { skill })))
        .merge(create_shadow_router(Arc::new(ShadowAppState {
            shadow: shadow.clone(),
        })))
        .merge(create_history_router(Arc::new(HistoryAppState {
            audit: audit_store,
        })))
        .merge(create_admin_router(AdminAppState {
            registry,
            devices,
            admin_token: config.api.admin_token.clone(),
        }))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api.port))
        .await
        .context("Failed to bind API port")?;
    info!(port = config.api.port, "API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    reported_task.abort();
    documents_task.abort();
    card_task.abort();
    info!("Domotica stopped");

    Ok(())
}
