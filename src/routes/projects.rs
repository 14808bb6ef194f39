/**
 * Project Routes
 * Featured projects for the homepage and single project lookup
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::Project;
use crate::routes::ErrorResponse;
use crate::state::SharedState;

/// Number of projects shown in the homepage carousel
const FEATURED_LIMIT: i64 = 6;

/// Response for GET /projects
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
}

/// Response for GET /projects/{id}
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub project: Project,
}

/// GET /projects - Featured projects, newest first.
/// Never fails: any store problem yields an empty list so the site keeps rendering.
pub async fn list_featured(State(state): State<SharedState>) -> impl IntoResponse {
    let projects = match state.store() {
        Ok(store) => store.featured_projects(FEATURED_LIMIT).await,
        Err(e) => Err(e),
    };

    let projects = projects.unwrap_or_else(|e| {
        if e.is_not_configured() {
            tracing::debug!("No database configured, serving empty project list");
        } else {
            tracing::warn!("Failed to fetch featured projects: {}", e);
        }
        Vec::new()
    });

    Json(ProjectsResponse { projects })
}

/// GET /projects/{id} - Single project
pub async fn get_project(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Project not found")),
        )
            .into_response()
    };

    // Ids are integers; anything else cannot match a row.
    let Ok(id) = id.trim().parse::<i64>() else {
        return not_found();
    };

    let result = match state.store() {
        Ok(store) => store.project(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(Some(project)) => (StatusCode::OK, Json(ProjectResponse { project })).into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!("Database error fetching project {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to fetch project")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{broken_state, get_json, seeded_state, unconfigured_state};
    use axum::routing::get;
    use axum::Router;

    fn test_router(state: SharedState) -> Router {
        Router::new()
            .route("/projects", get(list_featured))
            .route("/projects/{id}", get(get_project))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_featured_projects_capped_at_six() {
        let (status, body) = get_json(test_router(seeded_state().await), "/projects").await;
        assert_eq!(status, StatusCode::OK);

        let projects = body["projects"].as_array().unwrap();
        assert_eq!(projects.len(), 6);
        assert_eq!(projects[0]["id"], 8);
        assert!(projects.iter().all(|p| p["featured"] == true));
    }

    #[tokio::test]
    async fn test_projects_empty_array_without_store() {
        let (status, body) = get_json(test_router(unconfigured_state()), "/projects").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "projects": [] }));
    }

    #[tokio::test]
    async fn test_projects_empty_array_on_store_outage() {
        let (status, body) = get_json(test_router(broken_state().await), "/projects").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "projects": [] }));
    }

    #[tokio::test]
    async fn test_get_project_by_id() {
        let (status, body) = get_json(test_router(seeded_state().await), "/projects/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["project"]["title"], "Project 3");
    }

    #[tokio::test]
    async fn test_missing_project_returns_404() {
        let (status, body) = get_json(test_router(seeded_state().await), "/projects/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "Project not found" }));
    }

    #[tokio::test]
    async fn test_non_numeric_id_returns_404() {
        let (status, _) = get_json(test_router(seeded_state().await), "/projects/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_project_lookup_on_outage_returns_500() {
        let (status, body) = get_json(test_router(broken_state().await), "/projects/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch project");
    }
}
