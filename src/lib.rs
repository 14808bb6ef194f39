//! Agency Site API - library for app logic and testing

pub mod config;
pub mod db;
pub mod logging;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::Store;
use crate::state::{AppState, SharedState};

/// Request bodies are small JSON documents; cap at 1 MB.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("invalid HOST/PORT configuration: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// CORS for the site front end. With no configured origins every origin is allowed.
pub fn configure_cors(allowed_origins: Option<&[String]>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ]);

    match allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            base.allow_origin(origins)
        }
        None => base.allow_origin(Any),
    }
}

/// Create and configure the application router.
pub fn create_app(state: SharedState, allowed_origins: Option<&[String]>) -> Router {
    let cors = configure_cors(allowed_origins);

    Router::new()
        .route("/", get(routes::health::liveness))
        .route("/health/database", get(routes::health::health_database))
        .route("/projects", get(routes::projects::list_featured))
        .route("/projects/{id}", get(routes::projects::get_project))
        .route("/services", get(routes::services::list_services))
        .route("/contact", post(routes::contact::submit))
        .merge(routes::admin::router(state.clone()))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors)
}

/// Connects and migrates the store. Failures are logged and the server runs without one.
async fn connect_store(config: &AppConfig) -> Option<Store> {
    let Some(db_config) = &config.database else {
        tracing::info!("DATABASE_URL not set. Running without database connection.");
        return None;
    };

    let pool = match db::init_pool(db_config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                "Failed to initialize database pool: {}. Continuing without database.",
                e
            );
            return None;
        }
    };

    if let Err(e) = db::run_migrations(&pool).await {
        tracing::error!("Failed to run database migrations: {}", e);
    }

    let read_pool = match db::init_read_pool(db_config).await {
        Ok(read_pool) => read_pool,
        Err(e) => {
            tracing::warn!(
                "Failed to open read-only query pool: {}. Continuing without database.",
                e
            );
            pool.close().await;
            return None;
        }
    };

    Some(Store::new(pool, read_pool))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Dropping the guards stops the background log writers.
    let _log_guards = logging::init(&config.logging);

    let addr = config.bind_addr()?;

    let store = connect_store(&config).await;
    let state = Arc::new(AppState::new(store.clone(), config.admin_token.clone()));

    if state.admin_token().is_none() {
        tracing::warn!("ADMIN_API_TOKEN is not set; /admin routes are open");
    }

    let app = create_app(state, config.allowed_origins.as_deref());

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    if let Some(store) = store {
        store.close().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}
