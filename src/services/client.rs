//! HTTP client service
//! 
//! Forwards proxied requests to the upstream LLM server

use crate::config::settings::UpstreamConfig;
use crate::utils::error::{AppError, AppResult};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// Request headers that are not forwarded upstream
const SKIPPED_REQUEST_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Upstream LLM client
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Create a new client instance
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("ai-billing-plugin/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create upstream HTTP client")?;
        
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
    
    /// Upstream base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
    
    /// Send a request upstream and return the response without reading its body
    pub async fn forward(
        &self,
        method: &Method,
        path_and_query: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> AppResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path_and_query);
        debug!("Forwarding {} {}", method, url);
        
        let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|e| AppError::Internal(format!("Unsupported method {}: {}", method, e)))?;
        
        let mut request = self.client.request(method, &url).body(body);
        
        for (name, value) in headers {
            if is_skipped_header(name.as_str()) {
                continue;
            }
            request = request.header(name.as_str(), value.as_bytes());
        }
        
        request.send().await.map_err(|e| {
            error!("Upstream request to {} failed: {}", url, e);
            AppError::ExternalApi(e.to_string())
        })
    }
}

fn is_skipped_header(name: &str) -> bool {
    SKIPPED_REQUEST_HEADERS
        .iter()
        .any(|skipped| skipped.eq_ignore_ascii_case(name))
}
