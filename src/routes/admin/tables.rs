/**
 * Admin Table Routes
 * Table listing, schema inspection and paginated rows
 */
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use crate::db::models::{TableColumn, TableSummary};
use crate::state::SharedState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for GET /admin/tables
#[derive(Debug, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<TableSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Column metadata as shown by the browser
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub notnull: i64,
    pub pk: i64,
    pub default_value: Option<String>,
}

impl From<TableColumn> for ColumnInfo {
    fn from(col: TableColumn) -> Self {
        Self {
            name: col.name,
            column_type: col.declared_type,
            notnull: col.notnull,
            pk: col.pk,
            default_value: col.dflt_value,
        }
    }
}

/// Response for GET /admin/tables/{table}/schema
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub columns: Vec<ColumnInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters for GET /admin/tables/{table}/data.
/// Kept as strings so a malformed value falls back to the default instead of rejecting.
#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

const DEFAULT_LIMIT: i64 = 100;
const DEFAULT_OFFSET: i64 = 0;

fn parse_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Response for GET /admin/tables/{table}/data
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDataResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Value>,
    pub row_count: i64,
    pub execution_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin/tables - Tables with row counts
pub async fn list_tables(State(state): State<SharedState>) -> impl IntoResponse {
    let result = match state.store() {
        Ok(store) => store.table_summaries().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(tables) => Json(TablesResponse {
            tables,
            error: None,
        }),
        Err(e) => {
            tracing::error!("Failed to list tables: {}", e);
            Json(TablesResponse {
                tables: Vec::new(),
                error: Some("Failed to fetch tables. Database may not be configured.".to_string()),
            })
        }
    }
}

/// GET /admin/tables/{table}/schema - Column metadata
pub async fn table_schema(
    State(state): State<SharedState>,
    Path(table_name): Path<String>,
) -> impl IntoResponse {
    let result = match state.store() {
        Ok(store) => store.table_columns(&table_name).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(columns) => (
            StatusCode::OK,
            Json(SchemaResponse {
                columns: columns.into_iter().map(ColumnInfo::from).collect(),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(table = %table_name, "Failed to fetch schema: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SchemaResponse {
                    columns: Vec::new(),
                    error: Some("Failed to fetch schema".to_string()),
                }),
            )
        }
    }
}

/// GET /admin/tables/{table}/data?limit=&offset= - One page of rows plus the total count
pub async fn table_data(
    State(state): State<SharedState>,
    Path(table_name): Path<String>,
    Query(query): Query<DataQuery>,
) -> impl IntoResponse {
    let limit = parse_or(query.limit.as_deref(), DEFAULT_LIMIT);
    let offset = parse_or(query.offset.as_deref(), DEFAULT_OFFSET);

    let start = Instant::now();
    let result = match state.store() {
        Ok(store) => store.table_page(&table_name, limit, offset).await,
        Err(e) => Err(e),
    };
    let execution_time = start.elapsed().as_millis() as u64;

    match result {
        Ok(page) => (
            StatusCode::OK,
            Json(TableDataResponse {
                columns: page.columns,
                rows: page.rows,
                row_count: page.total,
                execution_time,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(table = %table_name, "Failed to fetch table data: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TableDataResponse {
                    columns: Vec::new(),
                    rows: Vec::new(),
                    row_count: 0,
                    execution_time: 0,
                    error: Some("Failed to fetch table data".to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_json, seeded_state, unconfigured_state};
    use axum::Router;

    fn test_router(state: SharedState) -> Router {
        crate::routes::admin::router(state.clone()).with_state(state)
    }

    #[test]
    fn test_parse_or_falls_back() {
        assert_eq!(parse_or(None, 100), 100);
        assert_eq!(parse_or(Some("25"), 100), 25);
        assert_eq!(parse_or(Some("lots"), 100), 100);
    }

    #[tokio::test]
    async fn test_list_tables_with_counts() {
        let (status, body) = get_json(test_router(seeded_state().await), "/admin/tables").await;
        assert_eq!(status, StatusCode::OK);

        let tables = body["tables"].as_array().unwrap();
        let projects = tables.iter().find(|t| t["name"] == "projects").unwrap();
        assert_eq!(projects["count"], 8);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_list_tables_without_store_reports_error() {
        let (status, body) = get_json(test_router(unconfigured_state()), "/admin/tables").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tables"], serde_json::json!([]));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_schema_lists_columns() {
        let (status, body) = get_json(
            test_router(seeded_state().await),
            "/admin/tables/services/schema",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let columns = body["columns"].as_array().unwrap();
        assert_eq!(columns[0]["name"], "id");
        assert_eq!(columns[0]["pk"], 1);
        let name = columns.iter().find(|c| c["name"] == "name").unwrap();
        assert_eq!(name["type"], "TEXT");
        assert_eq!(name["notnull"], 1);
        let order = columns.iter().find(|c| c["name"] == "order_index").unwrap();
        assert_eq!(order["defaultValue"], "0");
    }

    #[tokio::test]
    async fn test_schema_without_store_returns_500() {
        let (status, body) = get_json(
            test_router(unconfigured_state()),
            "/admin/tables/services/schema",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["columns"], serde_json::json!([]));
        assert_eq!(body["error"], "Failed to fetch schema");
    }

    #[tokio::test]
    async fn test_data_paginates() {
        let (status, body) = get_json(
            test_router(seeded_state().await),
            "/admin/tables/projects/data?limit=3&offset=2",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().unwrap().len(), 3);
        assert_eq!(body["rowCount"], 8);
        assert_eq!(body["columns"][1], "title");
        assert!(body["executionTime"].is_u64());
    }

    #[tokio::test]
    async fn test_data_defaults_when_params_malformed() {
        let (status, body) = get_json(
            test_router(seeded_state().await),
            "/admin/tables/projects/data?limit=abc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_data_for_unknown_table_returns_zeroed_500() {
        let (status, body) = get_json(
            test_router(seeded_state().await),
            "/admin/tables/nope/data",
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["rowCount"], 0);
        assert_eq!(body["executionTime"], 0);
        assert_eq!(body["rows"], serde_json::json!([]));
        assert_eq!(body["error"], "Failed to fetch table data");
    }
}
