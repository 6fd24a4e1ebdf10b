mod mock;
mod openai;

pub use mock::MockProvider;
pub use openai::{Endpoint, OpenAiClient};

use crate::llm::LlmClient;
use anyhow::Result;
use carenote_core::config::LlmConfig;
use std::sync::Arc;

/// Build the client named by `config.provider`.
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    match config.provider.as_str() {
        "openai" | "azure" => Ok(Arc::new(OpenAiClient::from_config(config)?)),
        "mock" => Ok(Arc::new(MockProvider::new(&config.model))),
        other => anyhow::bail!("Unknown LLM provider '{}'", other),
    }
}
