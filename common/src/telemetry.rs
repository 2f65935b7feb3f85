//! Tracing bootstrap shared by every service's `main`.
//!
//! Grounded on `order-processing::main`'s `FmtSubscriber` setup and
//! `composable-rust-redpanda`'s use of `tracing::info!`/`warn!`/`error!`
//! with structured fields throughout.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber for this process.
///
/// Honors `RUST_LOG` if set (e.g. `RUST_LOG=inventory_service=debug`),
/// otherwise defaults to `info`. Safe to call once per process; calling it
/// twice is a logic error in the caller, not something this function
/// guards against, since each binary only has one `main`.
pub fn init(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::info!(service = service_name, "telemetry initialized");
}
