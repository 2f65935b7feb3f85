//! Shared error taxonomy.
//!
//! Each service additionally defines its own narrow error enum for
//! domain-specific rejections (see `order-service::error`,
//! `inventory-service::error`); this module only carries the handful of
//! failure modes every service's `main.rs` shares at startup and the ones
//! the HTTP layer needs to turn into status codes.

use thiserror::Error;

/// Errors that can abort a service before it starts serving traffic.
///
/// Per §7, these are fatal: the process logs and exits rather than
/// retrying, since there is no sensible degraded mode for a missing
/// `DATABASE_URL` or a broker that refuses every connection attempt.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was unset or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable was set but failed to parse.
    #[error("invalid value for {var}: {reason}")]
    InvalidVar {
        /// Name of the offending environment variable.
        var: &'static str,
        /// Why it failed to parse.
        reason: String,
    },
}

/// Taxonomy shared by handlers that need to describe a domain-level failure
/// without owning their own enum (used directly by `inventory-service`'s
/// reservation engine; `order-service` wraps it in a richer enum — see
/// `order-service::error::OrderError`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A referenced SKU does not exist in the `stock` table.
    #[error("sku not found: {0}")]
    SkuNotFound(String),

    /// Not enough unreserved stock to satisfy a request.
    #[error("insufficient stock for {0}")]
    InsufficientStock(String),

    /// Any database failure not covered by a more specific variant.
    #[error("db error")]
    Database,
}
