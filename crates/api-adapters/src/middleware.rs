use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::error::ApiError;
use crate::extract::ClientIp;
use crate::state::AppState;

/// Rejects clients over their fixed-window budget with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        if let Err(retry_after) = limiter.check(ip) {
            warn!(%ip, retry_after_secs = retry_after.as_secs(), "rate limit exceeded");
            return ApiError::RateLimited { retry_after_secs: retry_after.as_secs().max(1) }
                .into_response();
        }
    }
    next.run(request).await
}

/// Counts every response by method and status.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let response = next.run(request).await;
    state.metrics.record_request(method.as_str(), response.status().as_u16());
    response
}

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}
