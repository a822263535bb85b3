//! Health check endpoints.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct StatsResponse {
    active_cooldowns: usize,
    active_tokens: usize,
}

/// Map sizes, including entries not yet swept
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        active_cooldowns: state.cooldown.len(),
        active_tokens: state.tokens.len(),
    })
}
