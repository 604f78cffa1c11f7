//! HTTP handlers module
//! 
//! Contains the health endpoints, the passthrough proxy and router setup

pub mod health;
pub mod proxy;

use crate::config::Settings;
use crate::filter::BillingFilter;
use crate::middleware::{billing_filter_middleware, request_logging_middleware};
use crate::services::UpstreamClient;
use anyhow::Result;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub upstream: UpstreamClient,
    pub filter: BillingFilter,
}

impl AppState {
    pub fn new(settings: Settings, filter: BillingFilter) -> Result<Self> {
        let upstream = UpstreamClient::new(&settings.upstream)?;
        
        Ok(Self {
            settings,
            upstream,
            filter,
        })
    }
}

/// Create application router
///
/// Everything outside `/health` is forwarded upstream with the billing
/// filter attached to the response.
pub fn create_router(state: Arc<AppState>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging_middleware));
    
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .fallback(proxy::forward_request)
        .layer(middleware::from_fn_with_state(state.clone(), billing_filter_middleware))
        .with_state(state)
        .layer(middleware_stack)
}
