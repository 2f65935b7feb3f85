//! Shared types for the Redstone order-fulfillment saga.
//!
//! This crate has no business logic of its own. It holds the pieces every
//! service in the saga needs to agree on: the wire shape of events
//! (`envelope`), how a service reads its environment (`config`), a shared
//! error taxonomy (`error`), and tracing bootstrap (`telemetry`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod telemetry;

pub use envelope::{EventKind, EventType};
pub use error::{ConfigError, ServiceError};
