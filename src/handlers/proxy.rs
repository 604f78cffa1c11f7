//! Passthrough proxy handler
//! 
//! Forwards any request to the upstream LLM server and streams the response
//! back. The billing filter observes the streamed body from middleware.

use crate::handlers::AppState;
use crate::utils::error::{AppError, AppResult};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Response headers that are recomputed for the client connection
const SKIPPED_RESPONSE_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "transfer-encoding",
    "content-length",
];

/// Forward a request upstream
pub async fn forward_request(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> AppResult<Response> {
    let (parts, body) = request.into_parts();
    
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    
    let body = axum::body::to_bytes(body, state.settings.request.max_request_size)
        .await
        .map_err(|e| {
            warn!("Rejecting request body: {}", e);
            AppError::PayloadTooLarge
        })?;
    
    let upstream_response = state
        .upstream
        .forward(&parts.method, path_and_query, &parts.headers, body)
        .await?;
    
    debug!("Upstream responded with {}", upstream_response.status());
    
    convert_response(upstream_response)
}

/// Convert an upstream response into a streaming axum response
fn convert_response(upstream: reqwest::Response) -> AppResult<Response> {
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| AppError::ExternalApi(format!("Invalid upstream status: {}", e)))?;
    
    let mut builder = Response::builder().status(status);
    
    for (name, value) in upstream.headers() {
        if SKIPPED_RESPONSE_HEADERS
            .iter()
            .any(|skipped| skipped.eq_ignore_ascii_case(name.as_str()))
        {
            continue;
        }
        
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) else {
            continue;
        };
        builder = builder.header(name, value);
    }
    
    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}
