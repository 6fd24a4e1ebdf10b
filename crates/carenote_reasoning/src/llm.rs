use anyhow::Result;
use async_trait::async_trait;
use carenote_core::ChatMessage;

/// Parameters for a single completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.2,
        }
    }
}

impl CompletionParams {
    pub fn with_temperature(self, temperature: f32) -> Self {
        Self {
            temperature,
            ..self
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a chat transcript. The first message is usually the system prompt.
    async fn complete(&self, messages: &[ChatMessage], params: CompletionParams) -> Result<String>;

    fn provider_name(&self) -> &'static str;
}
