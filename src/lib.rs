//! AI Billing Plugin Library
//! 
//! Observes OpenAI-compatible SSE responses flowing through a gateway,
//! extracts token usage from the stream and reports it per tenant to a
//! billing service without touching the bytes delivered to the client.

pub mod config;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::{GatewayConfig, PluginConfig, Settings};
pub use filter::{BillingFilter, FilterAction, HttpContext};
pub use handlers::{create_router, AppState};
pub use models::{BillingEvent, TenantId, UsageRecord};
pub use services::{BillingDispatcher, ClusterDispatcher, HttpCallDispatcher};
pub use utils::error::{AppError, AppResult, DispatchError};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
