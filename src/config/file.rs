//! File-based configuration loading
//!
//! Loads the cluster table and plugin configuration from a JSON file

use super::plugin::PluginConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Upstream cluster reachable by outbound host calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Base URL of the cluster (scheme, host and port)
    pub url: String,
}

/// Gateway configuration loaded from JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Named upstream clusters
    #[serde(default)]
    pub clusters: HashMap<String, ClusterConfig>,
    
    /// Raw plugin configuration object, parsed by [`GatewayConfig::plugin_config`]
    #[serde(default)]
    pub plugin: serde_json::Value,
}

impl GatewayConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);
        
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        
        let config: GatewayConfig = serde_json::from_str(&content)
            .with_context(|| "Failed to parse config JSON")?;
        
        config.validate()?;
        
        debug!("Loaded {} clusters", config.clusters.len());
        Ok(config)
    }
    
    /// Load configuration from default locations
    /// Searches in order:
    /// 1. ~/.config/ai-billing/ai-billing.json
    /// 2. ./ai-billing.json
    /// 
    /// Falls back to an empty configuration when no file exists.
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("ai-billing").join("ai-billing.json");
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }
        
        let local_path = Path::new("ai-billing.json");
        if local_path.exists() {
            return Self::load(local_path);
        }
        
        info!("No configuration file found, using defaults");
        Ok(Self::default())
    }
    
    /// Validate configuration
    fn validate(&self) -> Result<()> {
        for (name, cluster) in &self.clusters {
            if name.is_empty() {
                anyhow::bail!("Cluster names cannot be empty");
            }
            
            if !cluster.url.starts_with("http") {
                anyhow::bail!("Invalid URL for cluster '{}': {}", name, cluster.url);
            }
        }
        
        self.plugin_config()?;
        
        Ok(())
    }
    
    /// Parse the plugin section
    pub fn plugin_config(&self) -> Result<PluginConfig> {
        PluginConfig::from_json(&self.plugin).context("Invalid plugin configuration")
    }
    
    /// Register a cluster unless one with the same name is already configured
    pub fn add_cluster(&mut self, name: &str, url: &str) {
        self.clusters
            .entry(name.to_string())
            .or_insert_with(|| ClusterConfig { url: url.to_string() });
    }
    
    /// Cluster table as `name -> base URL`
    pub fn cluster_urls(&self) -> HashMap<String, String> {
        self.clusters
            .iter()
            .map(|(name, cluster)| (name.clone(), cluster.url.trim_end_matches('/').to_string()))
            .collect()
    }
}
