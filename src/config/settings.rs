//! Application configuration settings
//! 
//! Process-level settings loaded from the environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream LLM configuration
    pub upstream: UpstreamConfig,
    /// Request configuration
    pub request: RequestConfig,
    /// Billing service configuration
    pub billing: BillingServiceConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Upstream LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL requests are forwarded to
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
}

/// Request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Maximum request size in bytes
    pub max_request_size: usize,
}

/// Billing service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingServiceConfig {
    /// Base URL registered for the plugin's billing cluster
    pub cluster_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            upstream: UpstreamConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout: 300,
            },
            request: RequestConfig {
                max_request_size: 10 * 1024 * 1024,
            },
            billing: BillingServiceConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl Settings {
    /// Create a new configuration instance
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        
        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "0.0.0.0"),
                port: get_env_or_default("SERVER_PORT", "8080")
                    .parse()
                    .context("Invalid port number")?,
            },
            upstream: UpstreamConfig {
                base_url: get_env_or_default("UPSTREAM_BASE_URL", "http://localhost:8000")
                    .trim_end_matches('/')
                    .to_string(),
                timeout: get_env_or_default("UPSTREAM_TIMEOUT", "300")
                    .parse()
                    .context("Invalid upstream timeout value")?,
            },
            request: RequestConfig {
                max_request_size: get_env_or_default("MAX_REQUEST_SIZE", "10485760")
                    .parse()
                    .context("Invalid maximum request size")?,
            },
            billing: BillingServiceConfig {
                cluster_url: std::env::var("BILLING_CLUSTER_URL")
                    .ok()
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty()),
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };
        
        // Validate configuration
        settings.validate()?;
        
        Ok(settings)
    }
    
    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }
        
        if !self.upstream.base_url.starts_with("http") {
            anyhow::bail!("Invalid upstream base URL format, should start with 'http'");
        }
        
        if self.upstream.timeout == 0 {
            anyhow::bail!("Upstream timeout cannot be 0");
        }
        
        if self.request.max_request_size == 0 {
            anyhow::bail!("Maximum request size cannot be 0");
        }
        
        if let Some(url) = &self.billing.cluster_url {
            if !url.starts_with("http") {
                anyhow::bail!("Invalid billing cluster URL format, should start with 'http'");
            }
        }
        
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }
        
        Ok(())
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
