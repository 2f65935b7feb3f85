//! Per-SKU reservation engine (§4.3).
//!
//! `try_reserve` is grounded on
//! `original_source/services/inventory-service/cmd/server/consume.go`'s
//! `tryReserve`, with one deliberate strengthening: items are locked in
//! ascending SKU order (§9 "Per-SKU deadlock avoidance") rather than
//! request order, so two orders that overlap on SKUs can never deadlock
//! against each other's `SELECT ... FOR UPDATE`.
//!
//! `finalize_reservations`/`release_reservations` have no Go counterpart —
//! `original_source`'s consumer loop only ever reserves, it never consumes
//! `OrderConfirmed`/`OrderCancelled`. Added here because §3's lifecycle
//! requires it (`RESERVED -> COMPLETED` on confirm, `RESERVED ->
//! CANCELLED` on cancel).

use redstone_common::envelope::OrderItem;
use redstone_common::error::ServiceError;
use sqlx::PgPool;

/// Reserve every item of an order atomically, or reserve none.
///
/// Locks `stock` rows for the order's SKUs, sorted lexicographically, then
/// checks `available = on_hand - reserved` for each before mutating any of
/// them. A missing SKU or insufficient availability aborts the whole
/// transaction with the exact reason string §4.3 specifies.
///
/// # Errors
///
/// Returns [`ServiceError::SkuNotFound`], [`ServiceError::InsufficientStock`],
/// or [`ServiceError::Database`] for any other database failure. All three
/// are business rejections the caller turns into an `InventoryFailed`
/// event, not an HTTP-visible error (§7).
pub async fn try_reserve(pool: &PgPool, order_id: &str, items: &[OrderItem]) -> Result<(), ServiceError> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| a.sku.cmp(&b.sku));

    let mut tx = pool.begin().await.map_err(|_| ServiceError::Database)?;

    for item in &sorted {
        let row: Option<(i64, i64)> = sqlx::query_as("SELECT on_hand, reserved FROM stock WHERE sku = $1 FOR UPDATE")
            .bind(&item.sku)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|_| ServiceError::Database)?;

        let Some((on_hand, reserved)) = row else {
            return Err(ServiceError::SkuNotFound(item.sku.clone()));
        };

        let available = on_hand - reserved;
        if available < item.qty {
            return Err(ServiceError::InsufficientStock(item.sku.clone()));
        }

        sqlx::query("UPDATE stock SET reserved = reserved + $2 WHERE sku = $1")
            .bind(&item.sku)
            .bind(item.qty)
            .execute(&mut *tx)
            .await
            .map_err(|_| ServiceError::Database)?;

        sqlx::query(
            "INSERT INTO reservations(order_id, sku, qty, status, created_at) VALUES ($1, $2, $3, 'RESERVED', now())",
        )
        .bind(order_id)
        .bind(&item.sku)
        .bind(item.qty)
        .execute(&mut *tx)
        .await
        .map_err(|_| ServiceError::Database)?;
    }

    tx.commit().await.map_err(|_| ServiceError::Database)?;

    tracing::info!(order_id, "inventory reserved");
    metrics::counter!("inventory_service.reservation.reserved").increment(1);

    Ok(())
}

/// Move every `RESERVED` reservation of an order to a terminal status,
/// applying the matching `stock` adjustment.
///
/// `finalize = true` consumes the hold permanently
/// (`on_hand -= qty, reserved -= qty`, status `COMPLETED`); `finalize =
/// false` restores it (`reserved -= qty`, status `CANCELLED`). No rows
/// found is a no-op commit — §4.3 "idempotent replay tolerated" — so
/// redelivery of `OrderConfirmed`/`OrderCancelled` after the first
/// application is harmless.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on any database failure; the caller should
/// treat this as transient (§7) and retry without committing.
async fn settle_reservations(pool: &PgPool, order_id: &str, finalize: bool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let rows: Vec<(i64, String, i64)> = sqlx::query_as(
        "SELECT id, sku, qty FROM reservations WHERE order_id = $1 AND status = 'RESERVED' FOR UPDATE",
    )
    .bind(order_id)
    .fetch_all(&mut *tx)
    .await?;

    if rows.is_empty() {
        tx.rollback().await?;
        return Ok(());
    }

    for (_, sku, qty) in &rows {
        if finalize {
            sqlx::query("UPDATE stock SET on_hand = on_hand - $2, reserved = reserved - $2 WHERE sku = $1")
                .bind(sku)
                .bind(qty)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE stock SET reserved = reserved - $2 WHERE sku = $1")
                .bind(sku)
                .bind(qty)
                .execute(&mut *tx)
                .await?;
        }
    }

    let target_status = if finalize { "COMPLETED" } else { "CANCELLED" };
    sqlx::query("UPDATE reservations SET status = $2 WHERE order_id = $1 AND status = 'RESERVED'")
        .bind(order_id)
        .bind(target_status)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(order_id, status = target_status, "reservations settled");
    metrics::counter!("inventory_service.reservation.settled", "status" => target_status).increment(1);

    Ok(())
}

/// Consume the reserved hold on `OrderConfirmed`: `on_hand` and `reserved`
/// both drop, reservations move to `COMPLETED`.
///
/// # Errors
///
/// See [`settle_reservations`].
pub async fn finalize_reservations(pool: &PgPool, order_id: &str) -> Result<(), sqlx::Error> {
    settle_reservations(pool, order_id, true).await
}

/// Release the reserved hold on `OrderCancelled`: only `reserved` drops,
/// `on_hand` is untouched, reservations move to `CANCELLED`.
///
/// # Errors
///
/// See [`settle_reservations`].
pub async fn release_reservations(pool: &PgPool, order_id: &str) -> Result<(), sqlx::Error> {
    settle_reservations(pool, order_id, false).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_sort_lexicographically_for_lock_ordering() {
        let mut items = vec![
            OrderItem { sku: "SKU-B".to_string(), qty: 1, unit_price: 1 },
            OrderItem { sku: "SKU-A".to_string(), qty: 1, unit_price: 1 },
        ];
        items.sort_by(|a, b| a.sku.cmp(&b.sku));
        assert_eq!(items[0].sku, "SKU-A");
        assert_eq!(items[1].sku, "SKU-B");
    }
}
