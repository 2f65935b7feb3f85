//! Order service error taxonomy.
//!
//! Mirrors `composable_rust_auth::error`'s doc-banner-per-category style, but
//! the categories here are the ones §7 actually names: validation (4xx),
//! database (500), and configuration (fatal at startup).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════
// Order service errors
// ═══════════════════════════════════════════════════════════════════════

/// Errors raised by the order service's HTTP and saga-transition code paths.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request body failed validation (§7 "Validation errors").
    #[error("{0}")]
    Validation(String),

    /// A database operation failed.
    #[error("db error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
