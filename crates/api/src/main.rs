use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sitelink_companycam::CompanyCamApi;
use sitelink_db::{EntityStore, MemoryStore, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitelink_api::config::{ServerConfig, StoreBackend};
use sitelink_api::router::build_app_router;
use sitelink_api::state::AppState;

/// A memory store that should be written back to disk on shutdown.
struct PendingSnapshot {
    store: Arc<MemoryStore>,
    path: PathBuf,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitelink_api=debug,sitelink_messaging=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let (store, snapshot): (Arc<dyn EntityStore>, Option<PendingSnapshot>) = match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = sitelink_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            sitelink_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            sitelink_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn EntityStore> = Arc::new(PgStore::new(pool));
            (store, None)
        }
        StoreBackend::Memory { snapshot_path } => match snapshot_path {
            Some(path) => {
                let store = Arc::new(
                    MemoryStore::load(path)
                        .await
                        .expect("Failed to load store snapshot"),
                );
                tracing::info!(path = %path.display(), "Memory store loaded from snapshot");
                let pending = PendingSnapshot {
                    store: Arc::clone(&store),
                    path: path.clone(),
                };
                let store: Arc<dyn EntityStore> = store;
                (store, Some(pending))
            }
            None => {
                tracing::warn!("Using an unsaved memory store; data is lost on exit");
                let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::new());
                (store, None)
            }
        },
    };

    // --- CompanyCam ---
    let companycam = config.companycam.api_token.as_ref().map(|token| {
        let mut api = CompanyCamApi::new(config.companycam.base_url.clone());
        api.set_api_token(token.clone());
        api
    });
    if companycam.is_none() {
        tracing::info!("COMPANYCAM_API_TOKEN not set, CompanyCam sync disabled");
    }

    // --- App state and router ---
    let state = AppState::new(store, config.clone(), companycam);
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(PendingSnapshot { store, path }) = snapshot {
        let timeout = Duration::from_secs(config.shutdown_timeout_secs);
        match tokio::time::timeout(timeout, store.save(&path)).await {
            Ok(Ok(())) => tracing::info!(path = %path.display(), "Memory store snapshot saved"),
            Ok(Err(e)) => tracing::error!(error = %e, "Failed to save memory store snapshot"),
            Err(_) => tracing::error!("Timed out saving memory store snapshot"),
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
