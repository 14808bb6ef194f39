/**
 * Admin Query Route
 * Ad-hoc read-only SQL for the database browser
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use crate::db::read_only::{check_read_only, QueryGuardError};
use crate::routes::ErrorResponse;
use crate::state::SharedState;

/// Response for POST /admin/query
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub row_count: usize,
    pub execution_time: u64,
}

fn error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// POST /admin/query - Execute a single SELECT or read-only PRAGMA
pub async fn run_query(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> impl IntoResponse {
    let sql = match payload {
        Ok(Json(body)) => body
            .get("query")
            .and_then(Value::as_str)
            .map(str::to_owned),
        Err(_) => None,
    };

    let Some(sql) = sql else {
        return error(StatusCode::BAD_REQUEST, QueryGuardError::Empty.to_string());
    };

    if let Err(e) = check_read_only(&sql) {
        return if e.is_policy_violation() {
            tracing::warn!(query = %sql, reason = %e, "rejected admin query");
            error(StatusCode::FORBIDDEN, e.to_string())
        } else {
            error(StatusCode::BAD_REQUEST, e.to_string())
        };
    }

    let store = match state.store() {
        Ok(s) => s,
        Err(e) => return error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let start = Instant::now();
    match store.run_read_query(&sql).await {
        Ok(output) => {
            let execution_time = start.elapsed().as_millis() as u64;
            tracing::info!(
                rows = output.rows.len(),
                duration_ms = execution_time,
                "admin query executed"
            );
            Json(QueryResponse {
                row_count: output.rows.len(),
                columns: output.columns,
                rows: output.rows,
                execution_time,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(query = %sql, "Admin query failed: {}", e);
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
