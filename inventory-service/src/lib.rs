//! Inventory service library: schema, reservation engine, `orders` consumer,
//! stock read endpoint.
//!
//! Split from `main.rs` so integration tests (`tests/integration_tests.rs`)
//! can drive `reservation`/`db` directly against a real Postgres container,
//! matching `order-processing`'s lib-plus-bin split.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod consumers;
pub mod db;
pub mod error;
pub mod handlers;
pub mod reservation;
pub mod types;

use sqlx::PgPool;

/// Shared application state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Pool shared by the HTTP handlers and the `orders` consumer.
    pub pool: PgPool,
}
