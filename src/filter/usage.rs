//! Usage extraction
//!
//! Most stream payloads are token deltas without usage accounting, so a
//! payload that fails to decode is skipped rather than reported.

use crate::models::{ChatCompletionChunk, UsageRecord};
use crate::utils::logging::truncate_content;
use tracing::trace;

/// Decode `payload` and return its usage record, if any.
pub fn extract_usage(payload: &str) -> Option<UsageRecord> {
    let chunk = match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            trace!("Skipping undecodable payload ({}): {}", e, truncate_content(payload, 80));
            return None;
        }
    };

    chunk.usage.map(|usage| UsageRecord {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
    })
}
