//! Chat completion chunk wire format
//!
//! Only the usage accounting fields are modelled; everything else in a
//! streamed chunk is ignored during decoding.

use serde::{Deserialize, Serialize};

/// One `data:` payload of an OpenAI-compatible chat completion stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Usage statistics, normally present only on the final chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChunkUsage>,
}

/// Usage statistics as they appear on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkUsage {
    /// Prompt token count
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion token count
    #[serde(default)]
    pub completion_tokens: u64,
}
