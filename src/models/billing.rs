//! Billing records
//!
//! `UsageRecord` lives for the duration of one body chunk, `BillingEvent`
//! until it has been serialized into an outbound call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tenant used when the request carries no tenant header
pub const DEFAULT_TENANT: &str = "default-tenant";

/// Token usage extracted from one stream payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageRecord {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Identity of the billed party. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    /// Resolve a tenant from a raw header value, falling back to `default`
    /// when the header is absent or blank. A blank `default` falls back to
    /// [`DEFAULT_TENANT`].
    pub fn resolve(header_value: Option<&str>, default: &str) -> Self {
        let value = header_value.map(str::trim).unwrap_or_default();
        if !value.is_empty() {
            return Self(value.to_string());
        }

        let default = default.trim();
        if default.is_empty() {
            Self(DEFAULT_TENANT.to_string())
        } else {
            Self(default.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self(DEFAULT_TENANT.to_string())
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of the outbound billing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingEvent {
    pub tenant_id: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl BillingEvent {
    pub fn new(tenant: &TenantId, usage: UsageRecord) -> Self {
        Self {
            tenant_id: tenant.as_str().to_string(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        }
    }
}
