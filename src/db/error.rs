//! Error types for the store layer.

/// Errors returned by [`Store`](super::Store) queries.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// No `DATABASE_URL` was configured, so there is no pool to query.
    #[error("database is not configured")]
    NotConfigured,

    /// Underlying SQLite/sqlx error.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A column held a SQLite storage class that has no JSON mapping.
    #[error("unsupported sqlite type: {type_name}")]
    UnsupportedValue { type_name: String },

    /// Failed to decode a SQLite value to its Rust representation.
    #[error("failed to decode {type_name}: {source}")]
    Decode {
        type_name: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, StoreError::NotConfigured)
    }
}
