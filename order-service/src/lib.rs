//! Order service library: HTTP intake, transactional outbox, and saga
//! orchestration.
//!
//! Split from `main.rs` so integration tests (`tests/integration_tests.rs`)
//! can drive `handlers`/`saga`/`outbox` directly against a real Postgres
//! container, matching `order-processing`'s lib-plus-bin split in the
//! teacher pack.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod consumers;
pub mod db;
pub mod error;
pub mod handlers;
pub mod outbox;
pub mod saga;
pub mod types;

/// Settlement currency for every order in this deployment (§3's
/// `currency` column is present for future multi-currency support, but
/// multi-currency arithmetic is an explicit non-goal — see §1).
pub const CURRENCY: &str = "INR";

/// Shared application state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Pool shared by the HTTP handlers and the outbox/consumer loops.
    pub pool: sqlx::PgPool,
}
