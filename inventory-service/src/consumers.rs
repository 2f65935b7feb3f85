//! Consumer for the `orders` topic (§4.4).
//!
//! Grounded on
//! `original_source/services/inventory-service/cmd/server/consume.go`'s
//! `consumeOrdersLoop` for the `OrderCreated` branch (dedupe via
//! `processed_events`, `tryReserve`, publish `InventoryReserved`/
//! `InventoryFailed`). The `OrderConfirmed`/`OrderCancelled` branches are
//! added here (§4.3): the Go source never subscribes to
//! its own reservations' resolution, so stock held by a completed or
//! compensated saga would never be settled. Here all three discriminators
//! arrive on the same `orders` topic and dedupe through the same
//! `processed_events` table.

use std::time::Duration;

use redstone_broker::{EventConsumer, EventProducer};
use redstone_common::envelope::{Envelope, EventType, InventoryFailedPayload, InventoryReservedPayload};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::db;
use crate::reservation::{finalize_reservations, release_reservations, try_reserve};

const BACKOFF: Duration = Duration::from_millis(500);

/// Run the `orders` consumer loop until `cancel` fires.
pub async fn consume_orders_loop(
    pool: PgPool,
    consumer: EventConsumer,
    producer: EventProducer,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            tracing::info!("orders consumer shutting down");
            return;
        }

        let message = match consumer.fetch().await {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%error, "orders fetch failed");
                tokio::time::sleep(BACKOFF).await;
                continue;
            },
        };

        let Some(payload) = message.payload() else {
            let _ = consumer.commit(&message);
            continue;
        };

        let header = match redstone_common::envelope::EnvelopeHeader::parse(payload) {
            Ok(header) => header,
            Err(_) => {
                let _ = consumer.commit(&message);
                continue;
            },
        };

        let already_processed = match db::is_processed(&pool, &header.event_id).await {
            Ok(seen) => seen,
            Err(error) => {
                tracing::warn!(%error, "processed_events lookup failed");
                tokio::time::sleep(BACKOFF).await;
                continue;
            },
        };

        if already_processed {
            let _ = consumer.commit(&message);
            continue;
        }

        match EventType::parse(&header.event_type) {
            Some(EventType::OrderCreated) => {
                handle_order_created(&pool, &producer, payload).await;
            },
            Some(EventType::OrderConfirmed) => {
                if let Ok(envelope) =
                    serde_json::from_slice::<Envelope<redstone_common::envelope::OrderConfirmedPayload>>(payload)
                {
                    if let Err(error) = finalize_reservations(&pool, &envelope.payload.order_id).await {
                        tracing::warn!(%error, order_id = envelope.payload.order_id, "finalize failed, will retry");
                        tokio::time::sleep(BACKOFF).await;
                        continue;
                    }
                }
            },
            Some(EventType::OrderCancelled) => {
                if let Ok(envelope) =
                    serde_json::from_slice::<Envelope<redstone_common::envelope::OrderCancelledPayload>>(payload)
                {
                    if let Err(error) = release_reservations(&pool, &envelope.payload.order_id).await {
                        tracing::warn!(%error, order_id = envelope.payload.order_id, "release failed, will retry");
                        tokio::time::sleep(BACKOFF).await;
                        continue;
                    }
                }
            },
            _ => {},
        }

        if let Err(error) = db::mark_processed(&pool, &header.event_id).await {
            tracing::warn!(%error, "failed to mark event processed, will retry");
            tokio::time::sleep(BACKOFF).await;
            continue;
        }

        let _ = consumer.commit(&message);
    }
}

async fn handle_order_created(pool: &PgPool, producer: &EventProducer, payload: &[u8]) {
    let Ok(envelope) = serde_json::from_slice::<Envelope<redstone_common::envelope::OrderCreatedPayload>>(payload)
    else {
        return;
    };
    let order_id = &envelope.payload.order_id;

    match try_reserve(pool, order_id, &envelope.payload.items).await {
        Ok(()) => {
            let out = Envelope::new(
                EventType::InventoryReserved,
                envelope.correlation_id,
                InventoryReservedPayload { order_id: order_id.clone() },
            );
            publish_envelope(producer, order_id, &out).await;
        },
        Err(error) => {
            metrics::counter!("inventory_service.reservation.failed").increment(1);
            let out = Envelope::new(
                EventType::InventoryFailed,
                envelope.correlation_id,
                InventoryFailedPayload { order_id: order_id.clone(), reason: error.to_string() },
            );
            publish_envelope(producer, order_id, &out).await;
        },
    }
}

async fn publish_envelope<T: serde::Serialize>(producer: &EventProducer, order_id: &str, out: &Envelope<T>) {
    let Ok(bytes) = serde_json::to_vec(out) else {
        return;
    };
    if let Err(error) = producer.publish(order_id, &bytes).await {
        tracing::warn!(%error, order_id, "inventory outcome publish failed");
    }
}
