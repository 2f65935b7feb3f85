//! Payment service: mock payment decision consumer/producer.
//!
//! Deliberately stateless (§3): no `sqlx::PgPool`, no migrations.
//! Composition root otherwise mirrors `order-service::main`'s shape —
//! config loaded once, producer/consumer handles constructed once and
//! passed down explicitly (§9).

#![forbid(unsafe_code)]

mod config;
mod consumers;
mod handlers;

use axum::Router;
use axum::routing::get;
use redstone_broker::{EventConsumer, EventProducer};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    redstone_common::telemetry::init(&config.service_name);

    let payments_producer =
        EventProducer::new(&config.broker.bootstrap_servers(), config.broker.topics.payments.clone())?;
    let inventory_consumer = EventConsumer::new(
        &config.broker.bootstrap_servers(),
        &config.broker.topics.inventory,
        &config.broker.group_id,
    )?;

    let cancel = CancellationToken::new();

    let inventory_handle =
        tokio::spawn(consumers::consume_inventory_loop(inventory_consumer, payments_producer, cancel.clone()));

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/mock/provider", get(handlers::mock_provider_status))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    tracing::info!(port = config.http_port, "http server starting");

    let shutdown = shutdown_signal(cancel.clone());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    cancel.cancel();
    let _ = inventory_handle.await;

    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
    cancel.cancel();
}
