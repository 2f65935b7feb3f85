//! Schema setup and read-side queries.
//!
//! Schema grounded verbatim on
//! `original_source/services/order-service/cmd/server/migrate.go`: the same
//! five tables, created idempotently at startup rather than through a
//! migration framework (§1's "database migrations/seed scripts" are an
//! excluded external collaborator — reduced to the simplest faithful
//! stand-in).

use sqlx::PgPool;

use crate::types::OrderView;

/// Create every order-service table if it does not already exist.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any statement fails; the caller should treat
/// this as fatal (§7 "Fatal startup errors").
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            status TEXT NOT NULL,
            total_amount BIGINT NOT NULL,
            currency TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS order_items (
            id BIGSERIAL PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            sku TEXT NOT NULL,
            qty BIGINT NOT NULL,
            unit_price BIGINT NOT NULL,
            total_price BIGINT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS order_events (
            id BIGSERIAL PRIMARY KEY,
            order_id TEXT NOT NULL,
            type TEXT NOT NULL,
            payload JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS idempotency (
            idem_key TEXT PRIMARY KEY,
            order_id TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS outbox (
            id BIGSERIAL PRIMARY KEY,
            aggregate_id TEXT NOT NULL,
            event_type TEXT NOT NULL,
            payload JSONB NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            published_at TIMESTAMPTZ
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Look up an order by its `idem_key` from a previous intake.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a genuine database failure (not found is
/// `Ok(None)`, not an error).
pub async fn find_order_by_idempotency_key(
    pool: &PgPool,
    idem_key: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT order_id FROM idempotency WHERE idem_key = $1")
        .bind(idem_key)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(order_id,)| order_id))
}

/// Fetch the stored view of one order.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on a genuine database failure (not found is
/// `Ok(None)`, not an error).
pub async fn get_order(pool: &PgPool, id: &str) -> Result<Option<OrderView>, sqlx::Error> {
    sqlx::query_as("SELECT id, user_id, status, total_amount, currency FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
