//! Shared application state handed to every handler through axum `State`.

use std::sync::Arc;

use crate::db::{Store, StoreError};

pub type SharedState = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppState {
    store: Option<Store>,
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(store: Option<Store>, admin_token: Option<String>) -> Self {
        Self { store, admin_token }
    }

    /// The configured store, or [`StoreError::NotConfigured`].
    pub fn store(&self) -> Result<&Store, StoreError> {
        self.store.as_ref().ok_or(StoreError::NotConfigured)
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }
}
