//! HTTP surface (§6 "HTTP surface (Inventory service)").
//!
//! Grounded on
//! `original_source/services/inventory-service/cmd/server/main.go`'s
//! `getStockHandler`.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use crate::AppState;
use crate::db;
use crate::error::InventoryError;

/// `GET /healthz`.
pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /v1/stock/{sku}`.
///
/// # Errors
///
/// Returns [`InventoryError::NotFound`] (404) if the SKU has no `stock` row,
/// [`InventoryError::Database`] (500) for any other database failure.
pub async fn get_stock(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<impl IntoResponse, InventoryError> {
    let stock = db::get_stock(&state.pool, &sku).await?.ok_or(InventoryError::NotFound)?;
    Ok(Json(stock))
}
