//! HTTP request/response DTOs for the order service.

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Customer placing the order.
    pub user_id: String,
    /// Line items requested.
    pub items: Vec<CreateOrderItem>,
}

/// One requested line item.
#[derive(Debug, Deserialize)]
pub struct CreateOrderItem {
    /// Stock keeping unit.
    pub sku: String,
    /// Quantity requested; must be `> 0`.
    pub qty: i64,
    /// Unit price in minor currency units; must be `>= 0`.
    pub unit_price: i64,
}

/// The stored view of an order, returned from intake and replay.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderView {
    /// Order identifier, e.g. `ord_<uuid>`.
    pub id: String,
    /// Customer that placed the order.
    pub user_id: String,
    /// Current saga status.
    pub status: String,
    /// Total price across all line items.
    pub total_amount: i64,
    /// Settlement currency, always `"INR"` in this deployment.
    pub currency: String,
}
