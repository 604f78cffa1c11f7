//! Data models module
//!
//! Defines the streaming chunk wire format and the billing records derived from it

pub mod billing;
pub mod chunk;

pub use billing::{BillingEvent, TenantId, UsageRecord, DEFAULT_TENANT};
pub use chunk::{ChatCompletionChunk, ChunkUsage};
