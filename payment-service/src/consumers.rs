//! Consumer for the `inventory` topic (§4.4).
//!
//! Grounded on
//! `original_source/services/payment-service/cmd/server/main.go`'s
//! `consumeInventoryLoop`: same mock decision (decline when `order_id` ends
//! in `'0'`), same direct publish without an outbox (Payment, like
//! Inventory, is not a saga-initiating producer in the outbox sense — only
//! Order writes through a transactional outbox, §4.1).
//!
//! No `processed_events` dedupe table here (§3, §4.4): this
//! service has no datastore. Re-processing a duplicate `InventoryReserved`
//! simply re-evaluates the same deterministic mock decision and republishes
//! it under a fresh `event_id`; Order's status-convergent update (§4.2)
//! absorbs the duplicate downstream.

use std::time::Duration;

use redstone_broker::{EventConsumer, EventProducer};
use redstone_common::envelope::{Envelope, EventType, InventoryReservedPayload, PaymentCapturedPayload, PaymentFailedPayload};
use tokio_util::sync::CancellationToken;

const BACKOFF: Duration = Duration::from_millis(500);

/// Run the `inventory` consumer loop until `cancel` fires.
pub async fn consume_inventory_loop(consumer: EventConsumer, producer: EventProducer, cancel: CancellationToken) {
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

        if matches!(EventType::parse(&header.event_type), Some(EventType::InventoryReserved)) {
            if let Ok(envelope) = serde_json::from_slice::<Envelope<InventoryReservedPayload>>(payload) {
                decide_and_publish(&producer, &envelope).await;
            }
        }

        let _ = consumer.commit(&message);
    }
}

/// Mock payment decision: decline when `order_id` ends in `'0'`, otherwise
/// capture for zero amount (§9 Open Question 3 — a real gateway would need
/// the order total, which this event does not carry).
async fn decide_and_publish(producer: &EventProducer, envelope: &Envelope<InventoryReservedPayload>) {
    let order_id = &envelope.payload.order_id;

    if order_id.ends_with('0') {
        let out = Envelope::new(
            EventType::PaymentFailed,
            envelope.correlation_id,
            PaymentFailedPayload { order_id: order_id.clone(), reason: "mock decline".to_string() },
        );
        metrics::counter!("payment_service.decision.declined").increment(1);
        publish_envelope(producer, order_id, &out).await;
    } else {
        let out = Envelope::new(
            EventType::PaymentCaptured,
            envelope.correlation_id,
            PaymentCapturedPayload { order_id: order_id.clone(), amount: 0 },
        );
        metrics::counter!("payment_service.decision.captured").increment(1);
        publish_envelope(producer, order_id, &out).await;
    }
}

async fn publish_envelope<T: serde::Serialize>(producer: &EventProducer, order_id: &str, out: &Envelope<T>) {
    let Ok(bytes) = serde_json::to_vec(out) else {
        return;
    };
    if let Err(error) = producer.publish(order_id, &bytes).await {
        tracing::warn!(%error, order_id, "payment outcome publish failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn decline_rule_matches_orders_ending_in_zero() {
        assert!("ord_10".ends_with('0'));
        assert!(!"ord_11".ends_with('0'));
    }

    #[tokio::test]
    async fn envelope_round_trips_through_json() {
        let envelope = Envelope::new(
            EventType::InventoryReserved,
            Uuid::new_v4(),
            InventoryReservedPayload { order_id: "ord_1".to_string() },
        );
        let bytes = serde_json::to_vec(&envelope).expect("serialize");
        let decoded: Envelope<InventoryReservedPayload> = serde_json::from_slice(&bytes).expect("deserialize");
        assert_eq!(decoded.payload.order_id, "ord_1");
    }
}
