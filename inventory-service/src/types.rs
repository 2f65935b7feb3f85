//! HTTP response DTOs for the inventory service.

use serde::Serialize;

/// Response body of `GET /v1/stock/{sku}`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockView {
    /// Stock keeping unit.
    pub sku: String,
    /// Units physically on hand.
    pub on_hand: i64,
    /// Units currently held by an outstanding `RESERVED` reservation.
    pub reserved: i64,
}
