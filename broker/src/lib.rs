//! Kafka-compatible producer/consumer wrapper for the Redstone saga topics.
//!
//! Grounded on `composable-rust-redpanda::RedpandaEventBus`: same
//! `ClientConfig` setup (`bootstrap.servers`, `acks`, manual offset commits),
//! same `rdkafka::producer::FutureProducer` /
//! `rdkafka::consumer::StreamConsumer` choice. Adapted to the saga's literal
//! fetch-one/commit-one consumer loop (§4.4) rather than a
//! channel-forwarding subscription model, since every service here drives
//! its own dedupe-then-commit pipeline per message instead of handing
//! messages off to an internal bus.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{Message, OwnedMessage};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use thiserror::Error;

/// Errors surfaced by the broker wrapper.
///
/// All variants are transient-infrastructure per §7's taxonomy: callers
/// should back off ~500ms and retry rather than treat these as permanent.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Producer or consumer client construction failed.
    #[error("failed to connect to broker: {0}")]
    Connect(String),

    /// A publish attempt did not reach an acknowledging broker.
    #[error("publish failed: {0}")]
    Publish(String),

    /// A fetch attempt failed (network error, rebalance, etc.).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// Committing a consumed offset failed.
    #[error("commit failed: {0}")]
    Commit(String),
}

/// A single-topic producer with required-acks-all durability.
pub struct EventProducer {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl EventProducer {
    /// Create a producer for `topic` against the given bootstrap servers.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Connect`] if the underlying client cannot be
    /// constructed.
    pub fn new(bootstrap_servers: &str, topic: impl Into<String>) -> Result<Self, BrokerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .create()
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        Ok(Self {
            producer,
            topic: topic.into(),
            timeout: Duration::from_secs(5),
        })
    }

    /// Publish `payload` keyed by `key` (partition key = `order_id` bytes
    /// per §6), waiting for broker acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Publish`] if the broker does not acknowledge
    /// the write within the configured timeout.
    pub async fn publish(&self, key: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let record = FutureRecord::to(&self.topic).payload(payload).key(key);

        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => {
                tracing::debug!(
                    topic = %self.topic,
                    partition,
                    offset,
                    key,
                    "event published"
                );
                Ok(())
            },
            Err((err, _)) => {
                tracing::warn!(topic = %self.topic, key, error = %err, "publish failed");
                Err(BrokerError::Publish(err.to_string()))
            },
        }
    }
}

/// A message pulled off a topic, detached from the consumer's lifetime so it
/// can be held across a dedupe lookup and handler execution before commit.
pub struct ConsumedMessage {
    inner: OwnedMessage,
}

impl ConsumedMessage {
    /// The partition key, if present and valid UTF-8 (it always is for
    /// these services: `order_id`).
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.inner.key().and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// The raw message payload (a JSON-encoded envelope).
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.inner.payload()
    }
}

/// A single-topic consumer with manual offset commits (at-least-once).
pub struct EventConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl EventConsumer {
    /// Subscribe to `topic` under `group_id`.
    ///
    /// New offset reset policy is `earliest`: a freshly deployed consumer
    /// group (or one recovering from total offset loss) replays the full
    /// topic rather than silently starting at the tail, which would drop
    /// in-flight sagas.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Connect`] if the client cannot be constructed
    /// or the subscription cannot be registered.
    pub fn new(bootstrap_servers: &str, topic: &str, group_id: &str) -> Result<Self, BrokerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        tracing::info!(topic, group_id, "subscribed");

        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }

    /// Block until the next message is available.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Fetch`] on a transient broker/network error.
    /// Per §4.4, callers should sleep ~500ms and retry on failure rather
    /// than treat this as permanent.
    pub async fn fetch(&self) -> Result<ConsumedMessage, BrokerError> {
        let borrowed = self
            .consumer
            .recv()
            .await
            .map_err(|e| BrokerError::Fetch(e.to_string()))?;
        Ok(ConsumedMessage {
            inner: borrowed.detach(),
        })
    }

    /// Commit the offset of an already-processed message.
    ///
    /// Callers must only commit after the handler's side effects (and, for
    /// Inventory, the `processed_events` insert) have been durably
    /// committed — committing earlier would let a crash lose the message
    /// without ever having applied it.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Commit`] if the commit request fails; the
    /// message will simply be redelivered, which downstream idempotency
    /// absorbs.
    pub fn commit(&self, message: &ConsumedMessage) -> Result<(), BrokerError> {
        self.consumer
            .commit_message(&message.inner, CommitMode::Async)
            .map_err(|e| {
                tracing::warn!(topic = %self.topic, error = %e, "commit failed");
                BrokerError::Commit(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_error_messages_are_human_readable() {
        let err = BrokerError::Publish("boom".to_string());
        assert_eq!(err.to_string(), "publish failed: boom");
    }
}
