//! Logging utilities
//!
//! Subscriber setup and shared log formatting helpers

use crate::config::settings::LoggingConfig;
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `format` selects JSON output for production and human readable text
/// otherwise.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log filter: {}", config.level))?;
    
    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = if config.format == "json" {
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .finish())
    } else {
        Box::new(tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish())
    };
    
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    
    Ok(())
}

/// Truncate a string with a note about original length
pub fn truncate_content(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let dropped = s[idx..].chars().count();
            format!("{}... ({} chars truncated)", &s[..idx], dropped)
        }
        None => s.to_string(),
    }
}
