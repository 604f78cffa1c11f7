//! Billing plugin configuration
//!
//! Every field is optional and defaults to the reference plugin behaviour,
//! so an absent or empty configuration object is always accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Plugin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Upstream cluster the billing call is sent to
    #[serde(rename = "billingCluster")]
    pub billing_cluster: String,
    
    /// Path of the usage recording endpoint
    #[serde(rename = "billingPath")]
    pub billing_path: String,
    
    /// Authority sent with the billing call
    #[serde(rename = "billingAuthority")]
    pub billing_authority: String,
    
    /// Billing call timeout in milliseconds
    #[serde(rename = "timeoutMs")]
    pub timeout_ms: u64,
    
    /// Request header carrying the tenant identity
    #[serde(rename = "tenantHeader")]
    pub tenant_header: String,
    
    /// Tenant used when the header is missing or empty
    #[serde(rename = "defaultTenant")]
    pub default_tenant: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            billing_cluster: "billing-service-cluster".to_string(),
            billing_path: "/api/v1/record".to_string(),
            billing_authority: "billing.internal".to_string(),
            timeout_ms: 5000,
            tenant_header: "X-Tenant-Id".to_string(),
            default_tenant: crate::models::DEFAULT_TENANT.to_string(),
        }
    }
}

impl PluginConfig {
    /// Parse the plugin configuration object
    ///
    /// `null` and `{}` yield the defaults. Only type mismatches on known
    /// fields are rejected.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        
        serde_json::from_value(value.clone())
    }
    
    /// Billing call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
