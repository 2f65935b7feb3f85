//! Inventory service error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised by the inventory service's HTTP and reservation code paths.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The requested SKU has no row in `stock` (§6 `GET /v1/stock/{sku}`).
    #[error("not found")]
    NotFound,

    /// A database operation failed.
    #[error("db error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
