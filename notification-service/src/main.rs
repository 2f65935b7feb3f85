//! Notification service: log-sink fan-out across all three saga topics.
//!
//! Grounded on
//! `original_source/services/notification-service/cmd/server/main.go`,
//! which subscribes the same logical consumer group three times (once per
//! topic, suffixed `-orders`/`-inventory`/`-payments`) rather than one
//! consumer across three topics, since each topic carries a distinct
//! discriminator set and independent partition count.

#![forbid(unsafe_code)]

mod config;
mod consumers;

use axum::Router;
use axum::routing::get;
use redstone_broker::EventConsumer;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    redstone_common::telemetry::init(&config.service_name);

    let bootstrap = config.broker.bootstrap_servers();
    let orders_consumer =
        EventConsumer::new(&bootstrap, &config.broker.topics.orders, &format!("{}-orders", config.broker.group_id))?;
    let inventory_consumer = EventConsumer::new(
        &bootstrap,
        &config.broker.topics.inventory,
        &format!("{}-inventory", config.broker.group_id),
    )?;
    let payments_consumer = EventConsumer::new(
        &bootstrap,
        &config.broker.topics.payments,
        &format!("{}-payments", config.broker.group_id),
    )?;

    let cancel = CancellationToken::new();

    let orders_handle = tokio::spawn(consumers::consume("orders", orders_consumer, cancel.clone()));
    let inventory_handle = tokio::spawn(consumers::consume("inventory", inventory_consumer, cancel.clone()));
    let payments_handle = tokio::spawn(consumers::consume("payments", payments_consumer, cancel.clone()));

    let app = Router::new().route("/healthz", get(healthz)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    tracing::info!(port = config.http_port, "http server starting");

    let shutdown = shutdown_signal(cancel.clone());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    cancel.cancel();
    let _ = tokio::join!(orders_handle, inventory_handle, payments_handle);

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
    cancel.cancel();
}
