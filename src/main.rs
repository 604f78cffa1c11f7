//! AI Billing Gateway
//! 
//! Passthrough gateway in front of an OpenAI-compatible LLM server that
//! reports streamed token usage per tenant to a billing service

use ai_billing_plugin::utils::logging::init_logging;
use ai_billing_plugin::{
    create_router, AppState, BillingFilter, ClusterDispatcher, GatewayConfig, Settings,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load settings from environment
    let settings = Settings::new().context("Failed to load server settings")?;
    
    init_logging(&settings.logging)?;
    info!("{}", ai_billing_plugin::version_info());
    
    // Load cluster table and plugin configuration
    let mut gateway_config = GatewayConfig::load_default()
        .context("Failed to load gateway configuration")?;
    let plugin_config = gateway_config.plugin_config()?;
    
    if let Some(url) = &settings.billing.cluster_url {
        gateway_config.add_cluster(&plugin_config.billing_cluster, url);
    }
    
    let dispatcher = ClusterDispatcher::new(gateway_config.cluster_urls())?;
    if !dispatcher.has_cluster(&plugin_config.billing_cluster) {
        warn!(
            "Billing cluster '{}' is not configured; usage will not be reported",
            plugin_config.billing_cluster
        );
    }
    
    let filter = BillingFilter::new(plugin_config, Arc::new(dispatcher));
    let state = Arc::new(AppState::new(settings.clone(), filter)?);
    let app = create_router(state);
    
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    
    info!("🚀 AI billing gateway started on http://{}", addr);
    info!("🔄 Forwarding to {}", settings.upstream.base_url);
    
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;
    
    Ok(())
}
