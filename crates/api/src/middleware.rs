use std::time::Instant;

use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use shareit_core::UserId;

use crate::app::errors::json_error;
use crate::context::CallerContext;

pub const CALLER_HEADER: &str = "X-Sharer-User-Id";

/// Require the caller header and expose it as a `CallerContext` extension.
pub async fn caller_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let user_id = match extract_caller(req.headers()) {
        Ok(id) => id,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, "missing_caller", message),
    };

    req.extensions_mut().insert(CallerContext::new(user_id));
    next.run(req).await
}

fn extract_caller(headers: &HeaderMap) -> Result<UserId, String> {
    let header = headers
        .get(CALLER_HEADER)
        .ok_or_else(|| format!("{CALLER_HEADER} header is required"))?;

    let header = header
        .to_str()
        .map_err(|_| format!("{CALLER_HEADER} header is not valid text"))?;

    header
        .parse::<UserId>()
        .map_err(|_| format!("{CALLER_HEADER} header must be a numeric user id"))
}

/// Wrap each request in a span with a fresh request id and log completion.
pub async fn trace_requests(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}
