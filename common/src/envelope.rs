//! Wire format for events flowing across `orders`, `inventory`, `payments`.
//!
//! Every event is one flat JSON object: the envelope fields
//! (`event_id`, `event_type`, `occurred_at`, `correlation_id`) sit at the
//! same level as the event-specific payload fields. `Envelope<T>` achieves
//! this with `#[serde(flatten)]` rather than a nested `payload` object.
//!
//! Consumers peek the discriminator with [`EnvelopeHeader`] (a schemaless,
//! payload-ignorant parse) before committing to a typed decode — see
//! [`EventType::from_str`] and [`EventKind`] for the decode registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The seven event discriminators carried on `event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A new order was accepted by intake.
    OrderCreated,
    /// Inventory service reserved all requested line items.
    InventoryReserved,
    /// Inventory service could not reserve the requested line items.
    InventoryFailed,
    /// Payment service captured funds for the order.
    PaymentCaptured,
    /// Payment service declined or failed to capture funds.
    PaymentFailed,
    /// Order service confirmed the order (terminal, success).
    OrderConfirmed,
    /// Order service cancelled the order (terminal, compensated).
    OrderCancelled,
}

impl EventType {
    /// The literal string used on the wire for `event_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderCreated => "OrderCreated",
            Self::InventoryReserved => "InventoryReserved",
            Self::InventoryFailed => "InventoryFailed",
            Self::PaymentCaptured => "PaymentCaptured",
            Self::PaymentFailed => "PaymentFailed",
            Self::OrderConfirmed => "OrderConfirmed",
            Self::OrderCancelled => "OrderCancelled",
        }
    }

    /// Parse a wire `event_type` string into a known discriminator.
    ///
    /// Returns `None` for any value this deployment doesn't recognize, which
    /// callers should treat as "commit and skip" per the consumer loop
    /// contract (unknown types must not block the partition).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "OrderCreated" => Some(Self::OrderCreated),
            "InventoryReserved" => Some(Self::InventoryReserved),
            "InventoryFailed" => Some(Self::InventoryFailed),
            "PaymentCaptured" => Some(Self::PaymentCaptured),
            "PaymentFailed" => Some(Self::PaymentFailed),
            "OrderConfirmed" => Some(Self::OrderConfirmed),
            "OrderCancelled" => Some(Self::OrderCancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generic envelope wrapping a typed payload `T`.
///
/// Serializes as one flat JSON object: `event_id`, `event_type`,
/// `occurred_at`, `correlation_id`, then `T`'s fields flattened in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Globally unique identifier for this specific event instance.
    pub event_id: Uuid,
    /// Wire discriminator, e.g. `"OrderCreated"`.
    pub event_type: String,
    /// When the originating service produced this event.
    pub occurred_at: DateTime<Utc>,
    /// Shared across every event of one saga instance.
    pub correlation_id: Uuid,
    /// Event-specific fields, flattened into the same JSON object.
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Build a fresh envelope, stamping a new `event_id` and `occurred_at`.
    pub fn new(event_type: EventType, correlation_id: Uuid, payload: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.as_str().to_string(),
            occurred_at: Utc::now(),
            correlation_id,
            payload,
        }
    }
}

/// The envelope fields alone, with the payload fields ignored.
///
/// Deserializing into this type is the "generic envelope parse" step of the
/// consumer pipeline (§4.4): it never fails on account of payload shape,
/// only on truly malformed JSON or a missing envelope field.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeHeader {
    /// Globally unique identifier for this specific event instance.
    pub event_id: Uuid,
    /// Wire discriminator string, not yet validated against [`EventType`].
    pub event_type: String,
    /// Shared across every event of one saga instance.
    pub correlation_id: Uuid,
}

impl EnvelopeHeader {
    /// Peek the envelope header out of raw message bytes without decoding
    /// the payload.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the bytes are not a JSON object or
    /// are missing one of the envelope fields.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// One SKU/quantity/price line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    /// Stock keeping unit identifier.
    pub sku: String,
    /// Quantity requested, must be `> 0`.
    pub qty: i64,
    /// Unit price in minor currency units (e.g. paise/cents).
    pub unit_price: i64,
}

/// Payload of `OrderCreated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedPayload {
    /// The new order's identifier.
    pub order_id: String,
    /// Customer that placed the order.
    pub user_id: String,
    /// Line items requested.
    pub items: Vec<OrderItem>,
}

/// Payload of `InventoryReserved`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryReservedPayload {
    /// The order whose items were reserved.
    pub order_id: String,
}

/// Payload of `InventoryFailed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryFailedPayload {
    /// The order whose items could not be reserved.
    pub order_id: String,
    /// Human-readable reason, e.g. `"insufficient stock for SKU-RED-2"`.
    pub reason: String,
}

/// Payload of `PaymentCaptured`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCapturedPayload {
    /// The order payment was captured for.
    pub order_id: String,
    /// Amount captured, in minor currency units. See `DESIGN.md` — the mock
    /// payment gateway always reports zero.
    pub amount: i64,
}

/// Payload of `PaymentFailed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentFailedPayload {
    /// The order payment could not be captured for.
    pub order_id: String,
    /// Human-readable reason, e.g. `"mock decline"`.
    pub reason: String,
}

/// Payload of `OrderConfirmed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmedPayload {
    /// The order that reached its terminal success state.
    pub order_id: String,
}

/// Payload of `OrderCancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledPayload {
    /// The order that reached its terminal compensated state.
    pub order_id: String,
    /// Why the saga compensated.
    pub reason: String,
}

/// A fully decoded event of any kind, keyed by the same discriminators as
/// [`EventType`].
///
/// Used by consumers (like `notification-service`) that want one decode call
/// rather than a per-type `Envelope<T>`. This is the "registry" described in
/// the design notes: a `match` on the discriminator, not inheritance.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// See [`OrderCreatedPayload`].
    OrderCreated(Envelope<OrderCreatedPayload>),
    /// See [`InventoryReservedPayload`].
    InventoryReserved(Envelope<InventoryReservedPayload>),
    /// See [`InventoryFailedPayload`].
    InventoryFailed(Envelope<InventoryFailedPayload>),
    /// See [`PaymentCapturedPayload`].
    PaymentCaptured(Envelope<PaymentCapturedPayload>),
    /// See [`PaymentFailedPayload`].
    PaymentFailed(Envelope<PaymentFailedPayload>),
    /// See [`OrderConfirmedPayload`].
    OrderConfirmed(Envelope<OrderConfirmedPayload>),
    /// See [`OrderCancelledPayload`].
    OrderCancelled(Envelope<OrderCancelledPayload>),
}

impl EventKind {
    /// Decode raw message bytes into a typed event, dispatching on the
    /// envelope's `event_type` field.
    ///
    /// # Errors
    ///
    /// Returns `Err(None)` if `event_type` is not one of the seven known
    /// discriminators (caller should commit-and-skip, not retry). Returns
    /// `Err(Some(_))` if `event_type` is known but the payload fields for
    /// that type don't parse (malformed producer, also commit-and-skip).
    pub fn decode(bytes: &[u8]) -> Result<Self, Option<serde_json::Error>> {
        let header = EnvelopeHeader::parse(bytes).map_err(Some)?;
        let kind = EventType::parse(&header.event_type).ok_or(None)?;
        match kind {
            EventType::OrderCreated => serde_json::from_slice(bytes)
                .map(EventKind::OrderCreated)
                .map_err(Some),
            EventType::InventoryReserved => serde_json::from_slice(bytes)
                .map(EventKind::InventoryReserved)
                .map_err(Some),
            EventType::InventoryFailed => serde_json::from_slice(bytes)
                .map(EventKind::InventoryFailed)
                .map_err(Some),
            EventType::PaymentCaptured => serde_json::from_slice(bytes)
                .map(EventKind::PaymentCaptured)
                .map_err(Some),
            EventType::PaymentFailed => serde_json::from_slice(bytes)
                .map(EventKind::PaymentFailed)
                .map_err(Some),
            EventType::OrderConfirmed => serde_json::from_slice(bytes)
                .map(EventKind::OrderConfirmed)
                .map_err(Some),
            EventType::OrderCancelled => serde_json::from_slice(bytes)
                .map(EventKind::OrderCancelled)
                .map_err(Some),
        }
    }

    /// The `order_id` carried by every variant, for logging.
    #[must_use]
    pub fn order_id(&self) -> &str {
        match self {
            Self::OrderCreated(e) => &e.payload.order_id,
            Self::InventoryReserved(e) => &e.payload.order_id,
            Self::InventoryFailed(e) => &e.payload.order_id,
            Self::PaymentCaptured(e) => &e.payload.order_id,
            Self::PaymentFailed(e) => &e.payload.order_id,
            Self::OrderConfirmed(e) => &e.payload.order_id,
            Self::OrderCancelled(e) => &e.payload.order_id,
        }
    }

    /// The discriminator of this decoded event.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        match self {
            Self::OrderCreated(_) => EventType::OrderCreated,
            Self::InventoryReserved(_) => EventType::InventoryReserved,
            Self::InventoryFailed(_) => EventType::InventoryFailed,
            Self::PaymentCaptured(_) => EventType::PaymentCaptured,
            Self::PaymentFailed(_) => EventType::PaymentFailed,
            Self::OrderConfirmed(_) => EventType::OrderConfirmed,
            Self::OrderCancelled(_) => EventType::OrderCancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_as_flat_object() {
        let corr = Uuid::new_v4();
        let env = Envelope::new(
            EventType::OrderCreated,
            corr,
            OrderCreatedPayload {
                order_id: "ord_1".to_string(),
                user_id: "u1".to_string(),
                items: vec![OrderItem {
                    sku: "SKU-RED-1".to_string(),
                    qty: 2,
                    unit_price: 500,
                }],
            },
        );

        let bytes = serde_json::to_vec(&env).expect("serialize");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("parse");
        assert!(value.is_object());
        assert_eq!(value["event_type"], "OrderCreated");
        assert_eq!(value["order_id"], "ord_1");
        assert!(value.get("payload").is_none(), "must be flat, not nested");

        let decoded = EventKind::decode(&bytes).expect("decode");
        match decoded {
            EventKind::OrderCreated(e) => {
                assert_eq!(e.correlation_id, corr);
                assert_eq!(e.payload.order_id, "ord_1");
            },
            other => panic!("expected OrderCreated, got {other:?}"),
        }
    }

    #[test]
    fn header_parse_ignores_payload_shape() {
        let env = Envelope::new(
            EventType::InventoryFailed,
            Uuid::new_v4(),
            InventoryFailedPayload {
                order_id: "ord_2".to_string(),
                reason: "insufficient stock for SKU-RED-2".to_string(),
            },
        );
        let bytes = serde_json::to_vec(&env).expect("serialize");
        let header = EnvelopeHeader::parse(&bytes).expect("header parse");
        assert_eq!(header.event_type, "InventoryFailed");
        assert_eq!(header.event_id, env.event_id);
    }

    #[test]
    fn unknown_event_type_is_reported_distinctly() {
        let raw = serde_json::json!({
            "event_id": Uuid::new_v4(),
            "event_type": "SomethingElse",
            "occurred_at": Utc::now(),
            "correlation_id": Uuid::new_v4(),
        });
        let bytes = serde_json::to_vec(&raw).expect("serialize");
        let err = EventKind::decode(&bytes).expect_err("unknown type must error");
        assert!(err.is_none(), "unknown event_type should be Err(None)");
    }
}
