use std::sync::Arc;

use anyhow::Context;
use dashboard_service::config::Config;
use dashboard_service::config::CredentialBackendKind;
use dashboard_service::domain::credentials::ports::CredentialBackend;
use dashboard_service::domain::setup::ports::ServiceReloader;
use dashboard_service::inbound::http::router::create_router;
use dashboard_service::inbound::http::runtime::ServiceRuntime;
use dashboard_service::outbound::credentials::env::EnvCredentialStore;
use dashboard_service::outbound::credentials::namespace::detect_namespace;
use dashboard_service::outbound::credentials::secret::SecretCredentialStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "dashboard-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        allowed_origins = ?config.server.allowed_origins,
        credential_backend = ?config.credentials.backend,
        secret_name = %config.credentials.secret_name,
        session_hours = config.session.expiration_hours,
        "Configuration loaded"
    );

    let credentials = credential_backend(&config).await?;
    tracing::info!(backend = credentials.name(), "Credential store ready");

    let runtime = Arc::new(ServiceRuntime::new(
        credentials,
        None,
        chrono::Duration::hours(config.session.expiration_hours),
    ));
    runtime
        .reload()
        .await
        .map_err(anyhow::Error::msg)
        .context("Failed to load credentials")?;

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(runtime, config.server.allowed_origins.clone());

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn credential_backend(config: &Config) -> Result<CredentialBackend, anyhow::Error> {
    let use_cluster = match config.credentials.backend {
        CredentialBackendKind::Cluster => true,
        CredentialBackendKind::Environment => false,
        CredentialBackendKind::Auto => detect_namespace().is_some(),
    };

    if !use_cluster {
        return Ok(CredentialBackend::Environment(Arc::new(EnvCredentialStore::new())));
    }

    let store = SecretCredentialStore::new(config.credentials.secret_name.clone())
        .await
        .context("Failed to initialise cluster credential store")?;
    tracing::info!(
        namespace = %store.namespace(),
        secret_name = %config.credentials.secret_name,
        "Using cluster credential secret"
    );

    Ok(CredentialBackend::Cluster(Arc::new(store)))
}
