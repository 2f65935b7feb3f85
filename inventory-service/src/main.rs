//! Inventory service: stock read endpoint, reservation engine, `orders`
//! consumer.
//!
//! Composition root mirrors `order-service::main`'s shape: config loaded
//! once, pool/producer/consumer handles constructed once and passed down
//! explicitly, no process-wide singletons (§9).

#![forbid(unsafe_code)]

use axum::Router;
use axum::routing::get;
use inventory_service::config::Config;
use inventory_service::{AppState, consumers, db, handlers};
use redstone_broker::{EventConsumer, EventProducer};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    redstone_common::telemetry::init(&config.service_name);

    let pool = PgPoolOptions::new().connect(&config.database_url).await?;
    db::init_schema(&pool).await?;

    let inventory_producer =
        EventProducer::new(&config.broker.bootstrap_servers(), config.broker.topics.inventory.clone())?;
    let orders_consumer = EventConsumer::new(
        &config.broker.bootstrap_servers(),
        &config.broker.topics.orders,
        &config.broker.group_id,
    )?;

    let cancel = CancellationToken::new();

    let orders_handle = tokio::spawn(consumers::consume_orders_loop(
        pool.clone(),
        orders_consumer,
        inventory_producer,
        cancel.clone(),
    ));

    let state = AppState { pool };
    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/stock/:sku", get(handlers::get_stock))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    tracing::info!(port = config.http_port, "http server starting");

    let shutdown = shutdown_signal(cancel.clone());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    cancel.cancel();
    let _ = orders_handle.await;

    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
    cancel.cancel();
}
