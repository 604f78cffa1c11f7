//! Outbound call channel
//!
//! Submission of a call returns a token immediately; completion is observed
//! later through a callback that runs on the async runtime.

use crate::utils::error::DispatchError;
use anyhow::{Context, Result};
use reqwest::header::{HeaderName, HeaderValue, HOST};
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// An outbound call addressed to a named upstream cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCall {
    /// Cluster name, resolved by the host
    pub upstream: String,
    /// Headers including the `:method`, `:path` and `:authority` pseudo-headers
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

impl HttpCall {
    /// First value of header `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What the callback learns about a completed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpCallResponse {
    pub status: u16,
    pub num_headers: usize,
    pub body_size: usize,
}

/// Completion handler. Must only use what it captured at submission time.
pub type HttpCallCallback = Box<dyn FnOnce(HttpCallResponse) + Send + 'static>;

/// Channel for non-blocking outbound calls provided by the host
pub trait HttpCallDispatcher: Send + Sync {
    /// Submit `call` and return its token without waiting for the response.
    ///
    /// `callback` runs once if a response arrives before the call's timeout;
    /// it is dropped otherwise.
    fn dispatch_http_call(
        &self,
        call: HttpCall,
        callback: HttpCallCallback,
    ) -> Result<u32, DispatchError>;
}

/// Dispatcher resolving cluster names through a static table and running
/// each call as a detached tokio task
#[derive(Debug)]
pub struct ClusterDispatcher {
    client: Client,
    clusters: HashMap<String, String>,
    next_token: AtomicU32,
}

impl ClusterDispatcher {
    /// Create a dispatcher over `clusters` (`name -> base URL`)
    pub fn new(clusters: HashMap<String, String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ai-billing-plugin/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create billing HTTP client")?;
        
        Ok(Self {
            client,
            clusters,
            next_token: AtomicU32::new(1),
        })
    }
    
    /// Whether `name` resolves to a cluster
    pub fn has_cluster(&self, name: &str) -> bool {
        self.clusters.contains_key(name)
    }
    
    fn build_request(&self, call: &HttpCall) -> Result<reqwest::RequestBuilder, DispatchError> {
        let base_url = self
            .clusters
            .get(&call.upstream)
            .ok_or_else(|| DispatchError::UnknownUpstream(call.upstream.clone()))?;
        
        let method = call.header(":method").ok_or(DispatchError::MissingHeader(":method"))?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| DispatchError::InvalidHeader(format!(":method = {}", method)))?;
        
        let path = call.header(":path").ok_or(DispatchError::MissingHeader(":path"))?;
        if !path.starts_with('/') {
            return Err(DispatchError::InvalidHeader(format!(":path = {}", path)));
        }
        
        let mut request = self
            .client
            .request(method, format!("{}{}", base_url, path))
            .timeout(call.timeout)
            .body(call.body.clone());
        
        for (name, value) in &call.headers {
            let header_name = match name.as_str() {
                ":authority" => HOST,
                n if n.starts_with(':') => continue,
                n => HeaderName::from_bytes(n.as_bytes())
                    .map_err(|_| DispatchError::InvalidHeader(n.to_string()))?,
            };
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| DispatchError::InvalidHeader(format!("{} = {}", name, value)))?;
            request = request.header(header_name, header_value);
        }
        
        Ok(request)
    }
}

impl HttpCallDispatcher for ClusterDispatcher {
    fn dispatch_http_call(
        &self,
        call: HttpCall,
        callback: HttpCallCallback,
    ) -> Result<u32, DispatchError> {
        let request = self.build_request(&call)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| DispatchError::NoRuntime)?;
        
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let upstream = call.upstream;
        let timeout = call.timeout;
        
        debug!("Dispatching call {} to cluster {}", token, upstream);
        
        runtime.spawn(async move {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    warn!("Call {} to cluster {} timed out after {:?}", token, upstream, timeout);
                    return;
                }
                Err(e) => {
                    warn!("Call {} to cluster {} failed: {}", token, upstream, e);
                    return;
                }
            };
            
            let status = response.status().as_u16();
            let num_headers = response.headers().len();
            
            match response.bytes().await {
                Ok(body) => callback(HttpCallResponse {
                    status,
                    num_headers,
                    body_size: body.len(),
                }),
                Err(e) if e.is_timeout() => {
                    warn!("Call {} to cluster {} timed out after {:?}", token, upstream, timeout);
                }
                Err(e) => {
                    warn!("Call {} to cluster {} failed reading response: {}", token, upstream, e);
                }
            }
        });
        
        Ok(token)
    }
}
