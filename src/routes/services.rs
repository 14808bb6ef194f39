/**
 * Service Routes
 * Agency service offerings in display order
 */
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::db::models::Service;
use crate::state::SharedState;

/// Response for GET /services
#[derive(Debug, Serialize, Deserialize)]
pub struct ServicesResponse {
    pub services: Vec<Service>,
}

/// GET /services - All services by `order_index`. Degrades to an empty list on failure.
pub async fn list_services(State(state): State<SharedState>) -> impl IntoResponse {
    let services = match state.store() {
        Ok(store) => store.services().await,
        Err(e) => Err(e),
    };

    let services = services.unwrap_or_else(|e| {
        if e.is_not_configured() {
            tracing::debug!("No database configured, serving empty service list");
        } else {
            tracing::warn!("Failed to fetch services: {}", e);
        }
        Vec::new()
    });

    Json(ServicesResponse { services })
}
