//! HTTP surface.
//!
//! Grounded on
//! `original_source/services/payment-service/cmd/server/main.go`'s two
//! routes: a health check and a trivial mock-provider status endpoint, kept
//! as an operator smoke-test stub rather than a saga interface.

use axum::Json;
use serde_json::{Value, json};

/// `GET /healthz`.
pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /v1/mock/provider` — always reports healthy; this mock gateway has
/// no real upstream to probe.
pub async fn mock_provider_status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
