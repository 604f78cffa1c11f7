//! Request logging middleware

use axum::{
    extract::Request,
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

/// Wrap each proxied request in a span carrying a generated request id
///
/// Only the response head is timed; a streamed body keeps flowing, and
/// being billed, after the line is logged.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "http_request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let start_time = Instant::now();
        debug!("Forwarding request");

        let response = next.run(request).await;

        let status = response.status();
        let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        let streaming = response
            .headers()
            .get(CONTENT_TYPE)
            .is_some_and(|value| value.as_bytes().starts_with(b"text/event-stream"));

        if status.is_server_error() || status.is_client_error() {
            warn!(status = status.as_u16(), elapsed_ms, "Request failed");
        } else {
            info!(status = status.as_u16(), elapsed_ms, streaming, "Response started");
        }

        response
    }
    .instrument(span)
    .await
}
