//! Billing dispatcher
//!
//! Turns usage records into fire-and-forget calls to the billing service.
//! Nothing here retries, queues or waits for a response.

use super::dispatcher::{HttpCall, HttpCallCallback, HttpCallDispatcher, HttpCallResponse};
use crate::config::PluginConfig;
use crate::models::{BillingEvent, TenantId, UsageRecord};
use crate::utils::error::DispatchError;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Reports usage records for one plugin instance
#[derive(Clone)]
pub struct BillingDispatcher {
    config: Arc<PluginConfig>,
    channel: Arc<dyn HttpCallDispatcher>,
}

impl BillingDispatcher {
    pub fn new(config: Arc<PluginConfig>, channel: Arc<dyn HttpCallDispatcher>) -> Self {
        Self { config, channel }
    }
    
    /// Build the outbound call carrying `event`
    pub fn build_call(&self, event: &BillingEvent) -> Result<HttpCall, DispatchError> {
        let body = serde_json::to_vec(event)?;
        
        Ok(HttpCall {
            upstream: self.config.billing_cluster.clone(),
            headers: vec![
                (":method".to_string(), "POST".to_string()),
                (":path".to_string(), self.config.billing_path.clone()),
                (":authority".to_string(), self.config.billing_authority.clone()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body,
            timeout: self.config.timeout(),
        })
    }
    
    /// Submit one billing call for `usage` and return its call token
    pub fn dispatch(&self, tenant: &TenantId, usage: UsageRecord) -> Result<u32, DispatchError> {
        let event = BillingEvent::new(tenant, usage);
        let call = self.build_call(&event)?;
        
        let tenant_id = event.tenant_id;
        let callback: HttpCallCallback = Box::new(move |response: HttpCallResponse| {
            info!(
                tenant_id = %tenant_id,
                status = response.status,
                "Billing usage reported for tenant {}",
                tenant_id
            );
        });
        
        self.channel.dispatch_http_call(call, callback)
    }
    
    /// Like [`dispatch`](Self::dispatch), but logs a submission failure
    /// instead of returning it
    pub fn report(&self, tenant: &TenantId, usage: UsageRecord) -> Option<u32> {
        match self.dispatch(tenant, usage) {
            Ok(token) => {
                debug!(
                    "Billing call {} submitted for tenant {} (prompt={}, completion={})",
                    token, tenant, usage.prompt_tokens, usage.completion_tokens
                );
                Some(token)
            }
            Err(e) => {
                error!("Failed to dispatch billing call for tenant {}: {}", tenant, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    
    #[derive(Default)]
    struct ImmediateDispatcher {
        calls: Mutex<Vec<HttpCall>>,
    }
    
    impl HttpCallDispatcher for ImmediateDispatcher {
        fn dispatch_http_call(
            &self,
            call: HttpCall,
            callback: HttpCallCallback,
        ) -> Result<u32, DispatchError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            callback(HttpCallResponse {
                status: 200,
                num_headers: 0,
                body_size: 0,
            });
            Ok(calls.len() as u32)
        }
    }
    
    struct RejectingDispatcher;
    
    impl HttpCallDispatcher for RejectingDispatcher {
        fn dispatch_http_call(
            &self,
            _call: HttpCall,
            _callback: HttpCallCallback,
        ) -> Result<u32, DispatchError> {
            Err(DispatchError::Rejected("bad cluster".to_string()))
        }
    }
    
    fn usage() -> UsageRecord {
        UsageRecord {
            prompt_tokens: 10,
            completion_tokens: 5,
        }
    }
    
    #[test]
    fn test_build_call() {
        let dispatcher = BillingDispatcher::new(
            Arc::new(PluginConfig::default()),
            Arc::new(ImmediateDispatcher::default()),
        );
        let tenant = TenantId::resolve(Some("acme"), "default-tenant");
        
        let call = dispatcher.build_call(&BillingEvent::new(&tenant, usage())).unwrap();
        
        assert_eq!(call.upstream, "billing-service-cluster");
        assert_eq!(call.header(":method"), Some("POST"));
        assert_eq!(call.header(":path"), Some("/api/v1/record"));
        assert_eq!(call.header(":authority"), Some("billing.internal"));
        assert_eq!(call.header("content-type"), Some("application/json"));
        assert_eq!(call.timeout.as_millis(), 5000);
        
        let body: serde_json::Value = serde_json::from_slice(&call.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"tenant_id": "acme", "prompt_tokens": 10, "completion_tokens": 5})
        );
    }
    
    #[test]
    fn test_dispatch_submits_one_call() {
        let channel = Arc::new(ImmediateDispatcher::default());
        let dispatcher = BillingDispatcher::new(Arc::new(PluginConfig::default()), channel.clone());
        
        let token = dispatcher.report(&TenantId::default(), usage());
        
        assert_eq!(token, Some(1));
        assert_eq!(channel.calls.lock().unwrap().len(), 1);
    }
    
    #[test]
    fn test_submission_failure_is_absorbed() {
        let dispatcher = BillingDispatcher::new(
            Arc::new(PluginConfig::default()),
            Arc::new(RejectingDispatcher),
        );
        
        assert!(dispatcher.dispatch(&TenantId::default(), usage()).is_err());
        assert_eq!(dispatcher.report(&TenantId::default(), usage()), None);
    }
}
