//! Shared consume loop fanned out across `orders`, `inventory`, `payments`
//! (§4.4, §2).
//!
//! Grounded on
//! `original_source/services/notification-service/cmd/server/main.go`'s
//! `consume` helper, which logs `event_type` + `order_id` out of a
//! schemaless `map[string]any` unmarshal. Realized here with the typed
//! decode registry (`redstone_common::envelope::EventKind::decode`, §9
//! "generic envelope then typed decode") instead of re-parsing into an
//! untyped JSON map, since the registry already exists and gives a
//! correlation id for free.

use std::time::Duration;

use redstone_broker::EventConsumer;
use redstone_common::envelope::EventKind;
use tokio_util::sync::CancellationToken;

const BACKOFF: Duration = Duration::from_millis(500);

/// Drain one topic, logging every event this deployment recognizes.
///
/// This is the trivial log-sink stand-in for the notification fan-out
/// (§1 "Excluded as external collaborators" — reduced to the simplest
/// faithful stand-in). No dedupe table: logging twice has no externally
/// observable side effect worth guarding against.
pub async fn consume(stream: &'static str, consumer: EventConsumer, cancel: CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            tracing::info!(stream, "consumer shutting down");
            return;
        }

        let message = match consumer.fetch().await {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(%error, stream, "consume fetch failed");
                tokio::time::sleep(BACKOFF).await;
                continue;
            },
        };

        if let Some(payload) = message.payload() {
            match EventKind::decode(payload) {
                Ok(event) => {
                    tracing::info!(
                        stream,
                        event_type = %event.event_type(),
                        order_id = event.order_id(),
                        "notify"
                    );
                },
                Err(Some(error)) => {
                    tracing::debug!(%error, stream, "malformed event payload, skipping");
                },
                Err(None) => {
                    tracing::debug!(stream, "unrecognized event_type, skipping");
                },
            }
        }

        let _ = consumer.commit(&message);
    }
}
