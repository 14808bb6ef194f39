/**
 * Health Routes
 * Liveness and database health endpoints
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::state::SharedState;

/// Liveness response for GET /
#[derive(Debug, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET / - Liveness
pub async fn liveness() -> impl IntoResponse {
    Json(LivenessResponse {
        status: "ok".to_string(),
        message: "Agency Site API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health/database - Database health check
pub async fn health_database(State(state): State<SharedState>) -> impl IntoResponse {
    let check = match state.store() {
        Ok(store) => match store.ping().await {
            Ok(duration) => ServiceCheck {
                status: "healthy".to_string(),
                response_time: Some(duration.as_millis() as u64),
                error: None,
            },
            Err(e) => ServiceCheck {
                status: "unhealthy".to_string(),
                response_time: None,
                error: Some(e.to_string()),
            },
        },
        Err(e) => ServiceCheck {
            status: "unhealthy".to_string(),
            response_time: None,
            error: Some(e.to_string()),
        },
    };

    (StatusCode::OK, Json(check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_json, seeded_state, unconfigured_state};
    use axum::routing::get;
    use axum::Router;

    fn test_router(state: SharedState) -> Router {
        Router::new()
            .route("/", get(liveness))
            .route("/health/database", get(health_database))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_liveness_reports_version() {
        let (status, body) = get_json(test_router(unconfigured_state()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health_database_unhealthy_without_store() {
        let (status, body) = get_json(test_router(unconfigured_state()), "/health/database").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unhealthy");
        assert!(body.get("responseTime").is_none());
    }

    #[tokio::test]
    async fn test_health_database_healthy_with_store() {
        let (status, body) = get_json(test_router(seeded_state().await), "/health/database").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["responseTime"].is_u64());
    }
}
