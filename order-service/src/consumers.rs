//! Consumers for the `inventory` and `payments` topics (§4.4, §4.2).
//!
//! Grounded on
//! `original_source/services/order-service/cmd/server/consume.go`'s
//! `consumeInventoryLoop`/`consumePaymentLoop`. Order service does not use a
//! `processed_events` dedupe table (§9 Open Question resolution: it relies
//! on `saga::update_order_status`'s status-convergent update instead, which
//! is naturally idempotent on replay without a separate dedupe row).

use std::time::Duration;

use redstone_broker::EventConsumer;
use redstone_common::envelope::{Envelope, EventType, OrderCancelledPayload, OrderConfirmedPayload};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::outbox::insert_outbox_row;
use crate::saga::{OrderStatus, update_order_status};

const BACKOFF: Duration = Duration::from_millis(500);

/// Consume `InventoryReserved`/`InventoryFailed` and advance the saga.
///
/// On `InventoryFailed`, also writes an `OrderCancelled` outbox row — the
/// Order service is the sole producer of compensating events (§4.2), it
/// never re-emits `InventoryFailed` itself (§9 Open Question 2).
pub async fn consume_inventory_loop(pool: PgPool, consumer: EventConsumer, cancel: CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            tracing::info!("inventory consumer shutting down");
            return;
        }

        let message = match consumer.fetch().await {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%error, "inventory fetch failed");
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

        match EventType::parse(&header.event_type) {
            Some(EventType::InventoryReserved) => {
                if let Ok(envelope) = serde_json::from_slice::<
                    Envelope<redstone_common::envelope::InventoryReservedPayload>,
                >(payload)
                {
                    let _ = update_order_status(
                        &pool,
                        &envelope.payload.order_id,
                        OrderStatus::InventoryReserved,
                        EventType::InventoryReserved.as_str(),
                        payload,
                    )
                    .await;
                }
            },
            Some(EventType::InventoryFailed) => {
                if let Ok(envelope) = serde_json::from_slice::<
                    Envelope<redstone_common::envelope::InventoryFailedPayload>,
                >(payload)
                {
                    let _ = update_order_status(
                        &pool,
                        &envelope.payload.order_id,
                        OrderStatus::Cancelled,
                        EventType::InventoryFailed.as_str(),
                        payload,
                    )
                    .await;

                    emit_order_cancelled(&pool, &envelope.payload.order_id, envelope.correlation_id, &envelope.payload.reason)
                        .await;
                }
            },
            _ => {},
        }

        let _ = consumer.commit(&message);
    }
}

/// Consume `PaymentCaptured`/`PaymentFailed` and advance the saga to its
/// terminal state.
///
/// `OrderConfirmed` rides the outbox like every other Order-produced event
/// (§4.2) rather than a direct producer write, so the outbox stays the
/// single source of truth for the `orders` topic.
pub async fn consume_payments_loop(pool: PgPool, consumer: EventConsumer, cancel: CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            tracing::info!("payments consumer shutting down");
            return;
        }

        let message = match consumer.fetch().await {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%error, "payments fetch failed");
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

        match EventType::parse(&header.event_type) {
            Some(EventType::PaymentCaptured) => {
                if let Ok(envelope) = serde_json::from_slice::<
                    Envelope<redstone_common::envelope::PaymentCapturedPayload>,
                >(payload)
                {
                    let order_id = envelope.payload.order_id.clone();

                    let _ = update_order_status(
                        &pool,
                        &order_id,
                        OrderStatus::Paid,
                        EventType::PaymentCaptured.as_str(),
                        payload,
                    )
                    .await;

                    let confirmed =
                        Envelope::new(EventType::OrderConfirmed, envelope.correlation_id, OrderConfirmedPayload {
                            order_id: order_id.clone(),
                        });
                    if let Ok(bytes) = serde_json::to_vec(&confirmed) {
                        if let Err(error) = insert_outbox_row(
                            &pool,
                            &order_id,
                            EventType::OrderConfirmed.as_str(),
                            &bytes,
                        )
                        .await
                        {
                            tracing::error!(%error, order_id, "failed to write OrderConfirmed outbox row");
                        }

                        let _ = update_order_status(
                            &pool,
                            &order_id,
                            OrderStatus::Confirmed,
                            EventType::OrderConfirmed.as_str(),
                            &bytes,
                        )
                        .await;
                    }
                }
            },
            Some(EventType::PaymentFailed) => {
                if let Ok(envelope) = serde_json::from_slice::<
                    Envelope<redstone_common::envelope::PaymentFailedPayload>,
                >(payload)
                {
                    let _ = update_order_status(
                        &pool,
                        &envelope.payload.order_id,
                        OrderStatus::Cancelled,
                        EventType::PaymentFailed.as_str(),
                        payload,
                    )
                    .await;

                    emit_order_cancelled(&pool, &envelope.payload.order_id, envelope.correlation_id, &envelope.payload.reason)
                        .await;
                }
            },
            _ => {},
        }

        let _ = consumer.commit(&message);
    }
}

async fn emit_order_cancelled(pool: &PgPool, order_id: &str, correlation_id: uuid::Uuid, reason: &str) {
    let cancelled = Envelope::new(EventType::OrderCancelled, correlation_id, OrderCancelledPayload {
        order_id: order_id.to_string(),
        reason: reason.to_string(),
    });
    let Ok(bytes) = serde_json::to_vec(&cancelled) else {
        return;
    };
    if let Err(error) = insert_outbox_row(pool, order_id, EventType::OrderCancelled.as_str(), &bytes).await {
        tracing::error!(%error, order_id, "failed to write OrderCancelled outbox row");
    }
}
