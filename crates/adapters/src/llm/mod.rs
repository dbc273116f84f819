//! AI completion provider adapters

pub mod gemini;
pub mod openai;
pub mod stub;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;
pub use stub::StubBackend;

use serde::{Deserialize, Serialize};

/// Common provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_output_tokens: 600,
            timeout_secs: 45,
        }
    }
}
