//! Shared fixtures for unit tests: a migrated, seeded database file per test.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use once_cell::sync::Lazy;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::db::{self, DbConfig, Store};
use crate::state::AppState;

static SCRATCH: Lazy<TempDir> = Lazy::new(|| tempfile::tempdir().unwrap());
static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// A single-connection in-memory pool, for tests that only need a connection.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

/// Config for a fresh database file in the scratch directory.
fn scratch_config() -> DbConfig {
    let n = NEXT_DB.fetch_add(1, Ordering::Relaxed);
    let path = SCRATCH.path().join(format!("site-{n}.db"));
    DbConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 4,
        connect_timeout_secs: 5,
    }
}

/// Migrated store with 8 projects (7 featured) and 3 services.
pub async fn seeded_store() -> Store {
    let config = scratch_config();
    let pool = db::init_pool(&config).await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    for i in 1..=8 {
        sqlx::query(
            "INSERT INTO projects (id, title, description, image_url, category, featured, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(i as i64)
        .bind(format!("Project {i}"))
        .bind(format!("Description {i}"))
        .bind(format!("/images/{i}.jpg"))
        .bind("branding")
        .bind(i != 4)
        .bind(format!("2024-01-{:02} 10:00:00", i))
        .execute(&pool)
        .await
        .unwrap();
    }

    for (name, order) in [("SEO", 3), ("Web Development", 1), ("Brand Identity", 2)] {
        sqlx::query("INSERT INTO services (name, description, icon, order_index) VALUES (?, ?, ?, ?)")
            .bind(name)
            .bind(format!("{name} services"))
            .bind("star")
            .bind(order as i64)
            .execute(&pool)
            .await
            .unwrap();
    }

    let read_pool = db::init_read_pool(&config).await.unwrap();
    Store::new(pool, read_pool)
}

pub async fn seeded_state() -> Arc<AppState> {
    Arc::new(AppState::new(Some(seeded_store().await), None))
}

/// State with no store at all, as when `DATABASE_URL` is unset.
pub fn unconfigured_state() -> Arc<AppState> {
    Arc::new(AppState::new(None, None))
}

/// State whose pools have been closed, so every query fails.
pub async fn broken_state() -> Arc<AppState> {
    let store = seeded_store().await;
    store.close().await;
    Arc::new(AppState::new(Some(store), None))
}

/// Sends a request and decodes the JSON body.
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

pub async fn post_json(app: Router, uri: &str, json: &Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(json).unwrap()))
        .unwrap();
    send(app, req).await
}

pub async fn patch_json(app: Router, uri: &str, json: &Value) -> (StatusCode, Value) {
    let req = Request::patch(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(json).unwrap()))
        .unwrap();
    send(app, req).await
}
