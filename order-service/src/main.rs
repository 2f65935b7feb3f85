//! Order service: HTTP intake, transactional outbox, and saga orchestration.
//!
//! Composition root mirrors `order-processing::main`'s shape: config loaded
//! once, pool/producer/consumer handles constructed once and passed down
//! explicitly, no process-wide singletons (§9).

#![forbid(unsafe_code)]

use axum::Router;
use axum::routing::{get, post};
use order_service::config::Config;
use order_service::{AppState, consumers, db, handlers, outbox};
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

    let orders_producer = EventProducer::new(&config.broker.bootstrap_servers(), config.broker.topics.orders.clone())?;
    let inventory_consumer = EventConsumer::new(
        &config.broker.bootstrap_servers(),
        &config.broker.topics.inventory,
        &config.broker.group_id,
    )?;
    let payments_consumer = EventConsumer::new(
        &config.broker.bootstrap_servers(),
        &config.broker.topics.payments,
        &config.broker.group_id,
    )?;

    let cancel = CancellationToken::new();

    let outbox_handle = tokio::spawn(outbox::outbox_loop(pool.clone(), orders_producer, cancel.clone()));
    let inventory_handle =
        tokio::spawn(consumers::consume_inventory_loop(pool.clone(), inventory_consumer, cancel.clone()));
    let payments_handle =
        tokio::spawn(consumers::consume_payments_loop(pool.clone(), payments_consumer, cancel.clone()));

    let state = AppState { pool };
    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/v1/orders", post(handlers::create_order))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    tracing::info!(port = config.http_port, "http server starting");

    let shutdown = shutdown_signal(cancel.clone());
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    cancel.cancel();
    let _ = tokio::join!(outbox_handle, inventory_handle, payments_handle);

    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
    cancel.cancel();
}
