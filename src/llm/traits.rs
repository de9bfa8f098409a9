//! LLM traits and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Generation parameters passed with each invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature; provider default when `None`
    pub temperature: Option<f64>,
}

impl GenerationConfig {
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A text completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
}

/// LLM errors. The gateway recovers from all of them.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("No API key configured for LLM provider {0}")]
    MissingApiKey(String),

    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode LLM response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("LLM response contained no completion")]
    EmptyResponse,
}

/// A loaded chat model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// `provider/model`
    fn id(&self) -> String;

    /// Complete a single user prompt
    async fn invoke(&self, prompt: &str, config: &GenerationConfig) -> Result<Completion, LlmError>;
}

/// Resolves provider and model identifiers to a chat model
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, provider: &str, model: &str) -> Result<Box<dyn ChatModel>, LlmError>;
}
