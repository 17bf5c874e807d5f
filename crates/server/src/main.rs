use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convertino_core::{
    create_authenticator, load_config, validate_config, ArtifactStore, Authenticator,
    InMemoryJobRegistry, JobOrchestrator, JobRegistry, MediaConverter, OrchestratorConfig,
    YtDlpConverter,
};
use convertino_server::api::create_router;
use convertino_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("CONVERTINO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Storage path: {:?}", config.storage.path);

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());
    if authenticator.is_development_mode() {
        warn!("Development mode: requests are not authenticated");
    }

    // Prepare the artifact store and drop anything past retention
    let store = Arc::new(ArtifactStore::new(&config.storage));
    store
        .ensure_dir()
        .await
        .context("Failed to create storage directory")?;
    match store.sweep_expired(config.storage.retention()).await {
        Ok(report) => info!(
            "Startup sweep: {} scanned, {} deleted, {} failed",
            report.scanned, report.deleted, report.failed
        ),
        Err(e) => warn!("Startup sweep failed: {}", e),
    }

    let sweeper = (config.storage.sweep_interval_secs > 0).then(|| {
        Arc::clone(&store).spawn_sweeper(
            Duration::from_secs(config.storage.sweep_interval_secs),
            config.storage.retention(),
        )
    });

    // Create converter
    let converter = Arc::new(YtDlpConverter::new(config.converter.clone()));
    if let Err(e) = converter.validate().await {
        warn!("Converter check failed, jobs will error until fixed: {}", e);
    } else {
        info!("Using converter: {}", converter.name());
    }

    // Create orchestrator
    let registry: Arc<dyn JobRegistry> = Arc::new(InMemoryJobRegistry::new());
    let orchestrator = Arc::new(JobOrchestrator::new(
        OrchestratorConfig::from(&config),
        registry,
        converter,
        Arc::clone(&store),
    ));

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        orchestrator,
        store,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server shutting down...");
    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
