//! Middleware module
//!
//! Billing filter host binding and request logging

pub mod billing;
pub mod logging;

pub use billing::{billing_filter_middleware, BillingBodyStream};
pub use logging::request_logging_middleware;
