//! Configuration management module
//!
//! Environment settings for the gateway process, the JSON gateway file with
//! the cluster table, and the billing plugin configuration.

pub mod file;
pub mod plugin;
pub mod settings;

pub use file::{ClusterConfig, GatewayConfig};
pub use plugin::PluginConfig;
pub use settings::Settings;
