/**
 * Routes Module
 * API route handlers
 */
pub mod admin;
pub mod contact;
pub mod health;
pub mod projects;
pub mod services;

use serde::{Deserialize, Serialize};

/// Error body shared by every handler
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
