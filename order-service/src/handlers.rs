//! HTTP intake (§4.5, §6).
//!
//! Grounded on
//! `original_source/services/order-service/cmd/server/main.go`'s
//! `createOrderHandler`: same idempotency-key-first lookup, same
//! insert-order/insert-items/insert-idempotency/insert-outbox/insert-audit
//! sequence inside one transaction.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use redstone_common::envelope::{Envelope, EventType, OrderCreatedPayload, OrderItem};
use uuid::Uuid;

use crate::db;
use crate::error::OrderError;
use crate::outbox::insert_outbox_row;
use crate::types::{CreateOrderRequest, OrderView};
use crate::{AppState, CURRENCY};

/// `GET /healthz`.
pub async fn healthz() -> &'static str {
    "ok"
}

/// `POST /v1/orders`.
///
/// # Errors
///
/// Returns [`OrderError::Validation`] (400) for a missing `Idempotency-Key`
/// header or an invalid body, [`OrderError::Database`] (500) for any
/// database failure.
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, OrderError> {
    let idem_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OrderError::Validation("missing Idempotency-Key".to_string()))?
        .to_string();

    if req.user_id.is_empty() || req.items.is_empty() {
        return Err(OrderError::Validation("user_id and items required".to_string()));
    }

    let mut total: i64 = 0;
    let mut items = Vec::with_capacity(req.items.len());
    for item in &req.items {
        if item.sku.is_empty() || item.qty <= 0 || item.unit_price < 0 {
            return Err(OrderError::Validation("invalid item".to_string()));
        }
        total += item.qty * item.unit_price;
        items.push(OrderItem {
            sku: item.sku.clone(),
            qty: item.qty,
            unit_price: item.unit_price,
        });
    }

    if let Some(existing_order_id) = db::find_order_by_idempotency_key(&state.pool, &idem_key).await? {
        let order = db::get_order(&state.pool, &existing_order_id)
            .await?
            .ok_or(OrderError::Validation("idempotency key points at a missing order".to_string()))?;
        return Ok((StatusCode::OK, Json(order)));
    }

    let order_id = format!("ord_{}", Uuid::new_v4());
    let correlation_id = Uuid::new_v4();

    let mut tx = state.pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders(id, user_id, status, total_amount, currency, created_at, updated_at) \
         VALUES ($1, $2, 'PENDING', $3, $4, now(), now())",
    )
    .bind(&order_id)
    .bind(&req.user_id)
    .bind(total)
    .bind(CURRENCY)
    .execute(&mut *tx)
    .await?;

    for item in &items {
        sqlx::query(
            "INSERT INTO order_items(order_id, sku, qty, unit_price, total_price) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&order_id)
        .bind(&item.sku)
        .bind(item.qty)
        .bind(item.unit_price)
        .bind(item.qty * item.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("INSERT INTO idempotency(idem_key, order_id, created_at) VALUES ($1, $2, now()) ON CONFLICT (idem_key) DO NOTHING")
        .bind(&idem_key)
        .bind(&order_id)
        .execute(&mut *tx)
        .await?;

    let created = Envelope::new(EventType::OrderCreated, correlation_id, OrderCreatedPayload {
        order_id: order_id.clone(),
        user_id: req.user_id.clone(),
        items,
    });
    let payload = serde_json::to_vec(&created).map_err(|e| OrderError::Validation(e.to_string()))?;

    insert_outbox_row(&mut *tx, &order_id, EventType::OrderCreated.as_str(), &payload).await?;

    sqlx::query("INSERT INTO order_events(order_id, type, payload, created_at) VALUES ($1, $2, $3, now())")
        .bind(&order_id)
        .bind(EventType::OrderCreated.as_str())
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    metrics::counter!("order_service.orders.created").increment(1);
    tracing::info!(order_id, user_id = req.user_id, total_amount = total, "order created");

    let order = OrderView {
        id: order_id,
        user_id: req.user_id,
        status: "PENDING".to_string(),
        total_amount: total,
        currency: CURRENCY.to_string(),
    };
    Ok((StatusCode::CREATED, Json(order)))
}
