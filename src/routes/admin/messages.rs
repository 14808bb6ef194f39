/**
 * Admin Message Routes
 * Contact inbox listing and status changes
 */
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::{ContactMessage, MessageStatus};
use crate::routes::ErrorResponse;
use crate::state::SharedState;

/// Response for GET /admin/messages
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<ContactMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request body for PATCH /admin/messages/{id}/status
#[derive(Debug, Deserialize, Serialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Success response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// GET /admin/messages - Contact messages, newest first
pub async fn list_messages(State(state): State<SharedState>) -> impl IntoResponse {
    let result = match state.store() {
        Ok(store) => store.contact_messages().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(messages) => (
            StatusCode::OK,
            Json(MessagesResponse {
                messages,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!("Failed to fetch contact messages: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessagesResponse {
                    messages: Vec::new(),
                    error: Some("Failed to fetch messages".to_string()),
                }),
            )
        }
    }
}

/// PATCH /admin/messages/{id}/status - Move a message between new/read/replied
pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let invalid_status = || {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "Invalid status. Valid statuses: new, read, replied",
            )),
        )
            .into_response()
    };

    let status = match payload {
        Ok(Json(body)) => match MessageStatus::parse(body.status.trim()) {
            Some(s) => s,
            None => return invalid_status(),
        },
        Err(_) => return invalid_status(),
    };

    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Message not found")),
        )
            .into_response()
    };

    let Ok(id) = id.trim().parse::<i64>() else {
        return not_found();
    };

    let result = match state.store() {
        Ok(store) => store.set_message_status(id, status).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(true) => {
            tracing::info!(message_id = id, status = status.as_str(), "message status updated");
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Ok(false) => not_found(),
        Err(e) => {
            tracing::error!("Failed to update message {} status: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to update message")),
            )
                .into_response()
        }
    }
}
