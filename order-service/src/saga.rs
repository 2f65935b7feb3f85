//! Order saga state machine (§4.2).
//!
//! `next_status` resolves Open Question 1: terminal states (`CONFIRMED`,
//! `CANCELLED`) reject any transition to a different target rather than
//! silently overwriting, which is what
//! `original_source/services/order-service/cmd/server/outbox.go`'s
//! `updateOrderStatus` does (no guard at all). The rest of the allow-list
//! mirrors the order lifecycle's FSM diagram exactly.

use sqlx::PgPool;

/// The authoritative saga state for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Order accepted, awaiting inventory reservation.
    Pending,
    /// Inventory reserved all requested line items.
    InventoryReserved,
    /// Payment captured; about to emit `OrderConfirmed`.
    Paid,
    /// Terminal: saga completed successfully.
    Confirmed,
    /// Terminal: saga compensated.
    Cancelled,
}

impl OrderStatus {
    /// The literal string stored in `orders.status`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InventoryReserved => "INVENTORY_RESERVED",
            Self::Paid => "PAID",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse a stored status string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(Self::Pending),
            "INVENTORY_RESERVED" => Some(Self::InventoryReserved),
            "PAID" => Some(Self::Paid),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal states reject any transition to a different target.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

/// What happened when a status update was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// `current == target`; no mutation, idempotent replay absorbed.
    NoOp,
    /// The transition was applied and an `order_events` row appended.
    Applied,
    /// `current` is terminal and `target` differs; rejected, no mutation.
    RejectedTerminal,
    /// `current -> target` is not one of the allowed edges in the FSM.
    RejectedInvalid,
}

/// Decide what should happen moving from `current` to `target`, without
/// touching the database. Pure so it is trivially unit-testable.
#[must_use]
pub fn next_status(current: OrderStatus, target: OrderStatus) -> TransitionOutcome {
    if current == target {
        return TransitionOutcome::NoOp;
    }
    if current.is_terminal() {
        return TransitionOutcome::RejectedTerminal;
    }
    let allowed = matches!(
        (current, target),
        (OrderStatus::Pending, OrderStatus::InventoryReserved)
            | (OrderStatus::Pending, OrderStatus::Cancelled)
            | (OrderStatus::InventoryReserved, OrderStatus::Paid)
            | (OrderStatus::InventoryReserved, OrderStatus::Cancelled)
            | (OrderStatus::Paid, OrderStatus::Confirmed)
    );
    if allowed {
        TransitionOutcome::Applied
    } else {
        TransitionOutcome::RejectedInvalid
    }
}

/// Apply a status-convergent update to one order (§4.2's
/// `updateOrderStatus`), within its own transaction.
///
/// `payload` is the raw envelope bytes stored verbatim into `order_events`
/// for the audit timeline, matching
/// `original_source`'s `insert into order_events(...) values (...)`.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] on any database failure; the caller should
/// treat this as transient (§7) and retry without committing the consumer
/// offset.
pub async fn update_order_status(
    pool: &PgPool,
    order_id: &str,
    target: OrderStatus,
    event_type: &str,
    payload: &[u8],
) -> Result<TransitionOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row: Option<(String,)> = sqlx::query_as("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some((current_raw,)) = row else {
        tx.rollback().await?;
        return Ok(TransitionOutcome::RejectedInvalid);
    };

    let Some(current) = OrderStatus::parse(&current_raw) else {
        tx.rollback().await?;
        return Ok(TransitionOutcome::RejectedInvalid);
    };

    let outcome = next_status(current, target);

    match outcome {
        TransitionOutcome::NoOp | TransitionOutcome::RejectedTerminal | TransitionOutcome::RejectedInvalid => {
            tx.rollback().await?;
        },
        TransitionOutcome::Applied => {
            sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
                .bind(order_id)
                .bind(target.as_str())
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO order_events(order_id, type, payload, created_at) VALUES ($1, $2, $3, now())",
            )
            .bind(order_id)
            .bind(event_type)
            .bind(payload)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            tracing::info!(order_id, status = target.as_str(), event_type, "order status updated");
            metrics::counter!("order_service.saga.transition_applied", "event_type" => event_type.to_string())
                .increment(1);
        },
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_transition_is_noop() {
        assert_eq!(
            next_status(OrderStatus::InventoryReserved, OrderStatus::InventoryReserved),
            TransitionOutcome::NoOp
        );
    }

    #[test]
    fn happy_path_transitions_are_allowed() {
        assert_eq!(
            next_status(OrderStatus::Pending, OrderStatus::InventoryReserved),
            TransitionOutcome::Applied
        );
        assert_eq!(
            next_status(OrderStatus::InventoryReserved, OrderStatus::Paid),
            TransitionOutcome::Applied
        );
        assert_eq!(next_status(OrderStatus::Paid, OrderStatus::Confirmed), TransitionOutcome::Applied);
    }

    #[test]
    fn terminal_states_reject_out_of_order_updates() {
        assert_eq!(
            next_status(OrderStatus::Cancelled, OrderStatus::InventoryReserved),
            TransitionOutcome::RejectedTerminal
        );
        assert_eq!(
            next_status(OrderStatus::Confirmed, OrderStatus::Cancelled),
            TransitionOutcome::RejectedTerminal
        );
    }

    #[test]
    fn skipping_a_required_step_is_rejected() {
        assert_eq!(next_status(OrderStatus::Pending, OrderStatus::Paid), TransitionOutcome::RejectedInvalid);
        assert_eq!(
            next_status(OrderStatus::Pending, OrderStatus::Confirmed),
            TransitionOutcome::RejectedInvalid
        );
    }
}
