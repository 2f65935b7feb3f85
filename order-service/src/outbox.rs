//! Transactional outbox: write-ahead rows plus the background publisher
//! that drains them (§4.1).
//!
//! Algorithm grounded on
//! `original_source/services/order-service/cmd/server/outbox.go`'s
//! `outboxLoop`/`drainOutbox`, adapted to `redstone_broker::EventProducer`
//! for the publish call and strengthened so a publish failure does not let
//! a later row for the *same* aggregate jump ahead of it within the batch
//! (§4.1 "Do not advance past a failing row within the same aggregate").

use std::collections::HashSet;
use std::time::Duration;

use redstone_broker::EventProducer;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_millis(400);
const BATCH: i64 = 50;

/// Write a `PENDING` outbox row inside the caller's transaction (or pool).
///
/// Generic over any `sqlx` executor so callers inside an open transaction
/// (order intake, consumer handlers emitting `OrderConfirmed`/
/// `OrderCancelled`) and callers with a bare pool can share this helper.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if the insert fails.
pub async fn insert_outbox_row<'e, E>(
    executor: E,
    aggregate_id: &str,
    event_type: &str,
    payload: &[u8],
) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO outbox(aggregate_id, event_type, payload, status, created_at) \
         VALUES ($1, $2, $3, 'PENDING', now())",
    )
    .bind(aggregate_id)
    .bind(event_type)
    .bind(payload)
    .execute(executor)
    .await?;
    Ok(())
}

/// Drain up to one batch of `PENDING` outbox rows, publishing in ascending
/// `id` order and marking each `PUBLISHED` on broker acknowledgement.
pub async fn drain_outbox(pool: &PgPool, producer: &EventProducer) {
    let rows: Result<Vec<(i64, String, Vec<u8>)>, sqlx::Error> = sqlx::query_as(
        "SELECT id, aggregate_id, payload FROM outbox \
         WHERE status = 'PENDING' ORDER BY id ASC LIMIT $1",
    )
    .bind(BATCH)
    .fetch_all(pool)
    .await;

    let rows = match rows {
        Ok(rows) => rows,
        Err(error) => {
            tracing::error!(%error, "outbox query failed");
            return;
        },
    };

    let mut failed_aggregates: HashSet<String> = HashSet::new();

    for (id, aggregate_id, payload) in rows {
        if failed_aggregates.contains(&aggregate_id) {
            continue;
        }

        match producer.publish(&aggregate_id, &payload).await {
            Ok(()) => {
                if let Err(error) = sqlx::query(
                    "UPDATE outbox SET status = 'PUBLISHED', published_at = now() WHERE id = $1",
                )
                .bind(id)
                .execute(pool)
                .await
                {
                    tracing::error!(%error, outbox_id = id, "failed to mark outbox row published");
                    failed_aggregates.insert(aggregate_id);
                } else {
                    metrics::counter!("order_service.outbox.published").increment(1);
                }
            },
            Err(error) => {
                tracing::warn!(%error, outbox_id = id, aggregate_id, "outbox publish failed, will retry");
                metrics::counter!("order_service.outbox.publish_failed").increment(1);
                failed_aggregates.insert(aggregate_id);
            },
        }
    }
}

/// Run the publisher loop until `cancel` fires.
pub async fn outbox_loop(pool: PgPool, producer: EventProducer, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(TICK);
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("outbox loop shutting down");
                return;
            }
            _ = ticker.tick() => {
                drain_outbox(&pool, &producer).await;
            }
        }
    }
}
