/**
 * Admin Routes
 * Database browser and contact inbox
 */
pub mod messages;
pub mod query;
pub mod tables;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use sha2::{Digest, Sha256};

use crate::routes::ErrorResponse;
use crate::state::SharedState;

/// All `/admin/*` routes, guarded by [`require_admin`].
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/tables", get(tables::list_tables))
        .route("/admin/tables/{table_name}/schema", get(tables::table_schema))
        .route("/admin/tables/{table_name}/data", get(tables::table_data))
        .route("/admin/query", post(query::run_query))
        .route("/admin/messages", get(messages::list_messages))
        .route("/admin/messages/{id}/status", patch(messages::update_status))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

fn tokens_match(given: &str, expected: &str) -> bool {
    Sha256::digest(given.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Requires `Authorization: Bearer <token>` when an admin token is configured.
pub async fn require_admin(
    State(state): State<SharedState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token() else {
        return next.run(request).await;
    };

    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(t) if tokens_match(t, expected) => next.run(request).await,
        Some(_) => {
            tracing::warn!(uri = %request.uri(), "admin request with invalid token");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Invalid token")),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Authorization required")),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::test_support::{get_json, send, seeded_store};
    use axum::body::Body;
    use std::sync::Arc;

    async fn guarded_app() -> Router {
        let state = Arc::new(AppState::new(
            Some(seeded_store().await),
            Some("s3cret".to_string()),
        ));
        router(state.clone()).with_state(state)
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (status, body) = get_json(guarded_app().await, "/admin/tables").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization required");
    }

    #[tokio::test]
    async fn test_wrong_token_is_unauthorized() {
        let req = axum::http::Request::get("/admin/tables")
            .header("authorization", "Bearer nope")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(guarded_app().await, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let req = axum::http::Request::get("/admin/tables")
            .header("authorization", "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(guarded_app().await, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["tables"].is_array());
    }
}
