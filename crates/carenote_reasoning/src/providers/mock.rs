//! Mock LLM provider: deterministic responses for testing without API keys.

use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use async_trait::async_trait;
use carenote_core::ChatMessage;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MockProvider {
    model: String,
    /// Scripted replies, consumed in order. `Err` simulates a provider failure.
    script: Mutex<VecDeque<Result<String, String>>>,
    /// Every transcript received, for assertions.
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    offline: bool,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Default::default()
        }
    }

    /// Replies with the given texts, then falls back to the default echo.
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new("scripted");
        if let Ok(mut script) = provider.script.lock() {
            script.extend(replies.into_iter().map(|r| Ok(r.into())));
        }
        provider
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self {
            offline: true,
            ..Self::new("failing")
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockProvider {
    async fn complete(&self, messages: &[ChatMessage], _params: CompletionParams) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        if self.offline {
            anyhow::bail!("provider offline");
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => anyhow::bail!("{}", e),
            None => Ok(format!("(Mock {} Response) I received your prompt.", self.model)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
