/**
 * Contact Routes
 * Contact form submission
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::models::NewContactMessage;
use crate::routes::ErrorResponse;
use crate::state::SharedState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /contact
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service: Option<String>,
}

/// Response for POST /contact
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub status: String,
    pub message: String,
}

// ============================================================================
// Validation
// ============================================================================

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 255;
const MAX_MESSAGE_LEN: usize = 5000;
const MAX_PHONE_LEN: usize = 50;
const MAX_COMPANY_LEN: usize = 100;
const MAX_SERVICE_LEN: usize = 100;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Name and message cannot be empty")]
    EmptyAfterTrim,
}

/// Trims, then keeps at most `max` characters.
fn clamp(value: &str, max: usize) -> String {
    value.trim().chars().take(max).collect()
}

fn clamp_optional(value: Option<&str>, max: usize) -> Option<String> {
    value.map(|v| clamp(v, max)).filter(|v| !v.is_empty())
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Validates a submission and produces the sanitized message.
///
/// Over-long fields are truncated, never rejected. The email shape is checked
/// on the value as submitted; the emptiness check runs after trimming.
pub fn sanitize(request: &ContactRequest) -> Result<NewContactMessage, ContactError> {
    let (Some(name), Some(email), Some(message)) = (
        required(&request.name),
        required(&request.email),
        required(&request.message),
    ) else {
        return Err(ContactError::MissingFields);
    };

    if !EMAIL_REGEX.is_match(email) {
        return Err(ContactError::InvalidEmail);
    }

    let name = clamp(name, MAX_NAME_LEN);
    let email = clamp(email, MAX_EMAIL_LEN);
    let message = clamp(message, MAX_MESSAGE_LEN);

    if name.is_empty() || message.is_empty() {
        return Err(ContactError::EmptyAfterTrim);
    }

    Ok(NewContactMessage {
        name,
        email,
        message,
        phone: clamp_optional(request.phone.as_deref(), MAX_PHONE_LEN),
        company: clamp_optional(request.company.as_deref(), MAX_COMPANY_LEN),
        service: clamp_optional(request.service.as_deref(), MAX_SERVICE_LEN),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /contact - Accept or reject a contact form submission.
/// Accepted submissions are recorded when a database is configured; a failed
/// write is logged and the submission is still acknowledged.
pub async fn submit(
    State(state): State<SharedState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            tracing::debug!("Rejected contact body: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Invalid request body")),
            )
                .into_response();
        }
    };

    let submission = match sanitize(&request) {
        Ok(s) => s,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string())))
                .into_response();
        }
    };

    match state.store() {
        Ok(store) => match store.insert_contact_message(&submission).await {
            Ok(id) => tracing::info!(message_id = id, "contact message recorded"),
            Err(e) => tracing::warn!("Failed to record contact message: {}", e),
        },
        Err(_) => tracing::info!("contact message accepted without database, not recorded"),
    }

    (
        StatusCode::OK,
        Json(ContactResponse {
            status: "ok".to_string(),
            message: "Contact form submitted successfully".to_string(),
        }),
    )
        .into_response()
}
