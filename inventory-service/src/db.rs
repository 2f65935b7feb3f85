//! Schema setup and read-side queries.
//!
//! Schema grounded verbatim on
//! `original_source/services/inventory-service/cmd/server/migrate.go`: the
//! same three tables, created idempotently at startup, plus the same two
//! seed `stock` rows inserted with conflict-ignore (§1's "database
//! migration/seed scripts" are an excluded external collaborator — reduced
//! to the simplest faithful stand-in, same as `order-service::db`).

use sqlx::PgPool;

use crate::types::StockView;

/// Create every inventory-service table if it does not already exist, and
/// seed the starter `stock` rows the scenarios in §8 assume.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any statement fails; the caller should treat
/// this as fatal (§7 "Fatal startup errors").
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS stock (
            sku TEXT PRIMARY KEY,
            on_hand BIGINT NOT NULL,
            reserved BIGINT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS reservations (
            id BIGSERIAL PRIMARY KEY,
            order_id TEXT NOT NULL,
            sku TEXT NOT NULL,
            qty BIGINT NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS processed_events (
            event_id UUID PRIMARY KEY,
            processed_at TIMESTAMPTZ NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO stock(sku, on_hand, reserved) VALUES \
         ('SKU-RED-1', 100, 0), ('SKU-RED-2', 50, 0) \
         ON CONFLICT (sku) DO NOTHING",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch the stock row for one SKU.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a genuine database failure (not found is
/// `Ok(None)`, not an error).
pub async fn get_stock(pool: &PgPool, sku: &str) -> Result<Option<StockView>, sqlx::Error> {
    sqlx::query_as("SELECT sku, on_hand, reserved FROM stock WHERE sku = $1")
        .bind(sku)
        .fetch_optional(pool)
        .await
}

/// Check whether `event_id` has already been recorded in `processed_events`.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a genuine database failure.
pub async fn is_processed(pool: &PgPool, event_id: &uuid::Uuid) -> Result<bool, sqlx::Error> {
    let row: Option<(uuid::Uuid,)> = sqlx::query_as("SELECT event_id FROM processed_events WHERE event_id = $1")
        .bind(event_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Record `event_id` as processed, tolerating a concurrent duplicate insert.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a genuine database failure.
pub async fn mark_processed(pool: &PgPool, event_id: &uuid::Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO processed_events(event_id, processed_at) VALUES ($1, now()) ON CONFLICT (event_id) DO NOTHING")
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(())
}
