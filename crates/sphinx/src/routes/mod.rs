//! HTTP route handlers for Sphinx.

use axum::{
    Router,
    extract::{FromRequestParts, Request},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::convert::Infallible;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use sphinx_common::constants::{headers, paths};
use sphinx_common::{ClientId, SphinxError};

use crate::state::AppState;

mod health;
mod stages;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    let router = Router::new()
        // Stage one
        .route(paths::INDEX, get(stages::index))
        .route(paths::INDEX_HTML, get(stages::index))
        .route(paths::SUBMIT_FIRST, post(stages::submit_first))

        // Stage two
        .route(paths::SECOND_PAGE, get(stages::second_page))
        .route(paths::SUBMIT_SECOND, post(stages::submit_second))

        // Final stage: GET /final/{token}.html, POST /final/{token}
        .route(
            "/final/{segment}",
            get(stages::final_page).post(stages::submit_final),
        )

        .route(paths::ROBOTS, get(stages::robots))

        // Health & Status
        .route(paths::HEALTH, get(health::health_check))
        .route(paths::STATS, get(health::stats))

        // Add shared state
        .with_state(state);

    with_middleware(router, timeout)
}

/// Wrap a router in the shared middleware stack
pub fn with_middleware(router: Router, timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(headers::X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
    )
}

/// Client identity from the reverse proxy's `X-Real-IP` header, trusted verbatim
pub struct RealIp(pub ClientId);

impl<S> FromRequestParts<S> for RealIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client = parts
            .headers
            .get(headers::X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        Ok(Self(ClientId::new(client)))
    }
}

/// 302 redirect
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Handler error, rendered as a bare status page
pub struct AppError(SphinxError);

impl From<SphinxError> for AppError {
    fn from(err: SphinxError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Request failed");

        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, status.canonical_reason().unwrap_or("Error")).into_response()
    }
}
