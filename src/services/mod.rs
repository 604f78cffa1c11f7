//! Service layer module
//!
//! Contains the billing dispatcher, the outbound call channel and the
//! upstream LLM client

pub mod billing;
pub mod client;
pub mod dispatcher;

pub use billing::BillingDispatcher;
pub use client::UpstreamClient;
pub use dispatcher::{
    ClusterDispatcher, HttpCall, HttpCallCallback, HttpCallDispatcher, HttpCallResponse,
};
