//! Billing filter
//!
//! `BillingFilter` is created once per plugin configuration and hands out one
//! `HttpContext` per proxied request. The context sees every response body
//! slice, reports any usage it finds, and always lets the slice through
//! untouched.

pub mod sse;
pub mod usage;

use crate::config::PluginConfig;
use crate::models::TenantId;
use crate::services::{BillingDispatcher, HttpCallDispatcher};
use std::sync::Arc;
use tracing::debug;

/// Verdict returned to the host for every callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    /// Forward the data unmodified
    Continue,
}

/// Plugin instance shared by all requests
#[derive(Clone)]
pub struct BillingFilter {
    config: Arc<PluginConfig>,
    billing: BillingDispatcher,
}

impl BillingFilter {
    pub fn new(config: PluginConfig, channel: Arc<dyn HttpCallDispatcher>) -> Self {
        let config = Arc::new(config);
        let billing = BillingDispatcher::new(config.clone(), channel);
        Self { config, billing }
    }
    
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }
    
    /// Start processing a request whose tenant header carried `tenant_header`
    pub fn create_http_context(&self, tenant_header: Option<&str>) -> HttpContext {
        HttpContext {
            tenant: TenantId::resolve(tenant_header, &self.config.default_tenant),
            billing: self.billing.clone(),
            reported: 0,
        }
    }
}

/// Per-request filter state
#[derive(Clone)]
pub struct HttpContext {
    tenant: TenantId,
    billing: BillingDispatcher,
    reported: usize,
}

impl HttpContext {
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }
    
    /// Number of billing calls submitted so far for this request
    pub fn reported(&self) -> usize {
        self.reported
    }
    
    pub fn on_response_headers(&mut self, content_type: Option<&str>) -> FilterAction {
        debug!(
            "Response for tenant {} started (content-type: {})",
            self.tenant,
            content_type.unwrap_or("none")
        );
        FilterAction::Continue
    }
    
    /// Inspect one body slice. Lines after a `[DONE]` sentinel in the same
    /// slice are ignored.
    pub fn on_response_body(&mut self, body: &[u8]) -> FilterAction {
        for payload in sse::data_payloads(body) {
            let Some(record) = usage::extract_usage(&payload) else {
                continue;
            };
            
            if self.billing.report(&self.tenant, record).is_some() {
                self.reported += 1;
            }
        }
        
        FilterAction::Continue
    }
}
