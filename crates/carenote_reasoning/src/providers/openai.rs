use crate::api_types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::llm::{CompletionParams, LlmClient};
use crate::retry::{send_with_retry, RetryPolicy};
use anyhow::{Context, Result};
use async_trait::async_trait;
use carenote_core::config::LlmConfig;
use carenote_core::ChatMessage;
use reqwest::Client;
use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const AZURE_API_VERSION: &str = "2024-02-01";

/// Where completion requests go and how they authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `{base_url}/chat/completions` with a bearer token.
    OpenAi { base_url: String, model: String },
    /// An Azure OpenAI deployment, authenticated with an `api-key` header.
    Azure { endpoint: String, deployment: String },
}

impl Endpoint {
    /// Azure endpoint as a resource root. A copied `.../openai` suffix is
    /// dropped so the path segment is not doubled in `url`.
    pub fn azure(endpoint: &str, deployment: impl Into<String>) -> Self {
        Self::Azure {
            endpoint: endpoint
                .trim_end_matches('/')
                .trim_end_matches("/openai")
                .to_string(),
            deployment: deployment.into(),
        }
    }

    pub fn url(&self) -> String {
        match self {
            Self::OpenAi { base_url, .. } => format!("{}/chat/completions", base_url),
            Self::Azure {
                endpoint,
                deployment,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint, deployment, AZURE_API_VERSION
            ),
        }
    }

    fn model(&self) -> Option<&str> {
        match self {
            Self::OpenAi { model, .. } => Some(model),
            Self::Azure { .. } => None,
        }
    }
}

/// Client for OpenAI-compatible chat completion APIs, including Azure deployments.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: Endpoint,
    retry: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(endpoint: Endpoint, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .context("Failed to build HTTP client")?,
            api_key: api_key.into(),
            endpoint,
            retry: RetryPolicy::default(),
        })
    }

    /// Build from configuration. API keys come only from the environment.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        if config.provider == "azure" {
            let api_key = env::var("AZURE_OPENAI_API_KEY")
                .or_else(|_| env::var("AZURE_OPENAI_KEY"))
                .context("AZURE_OPENAI_API_KEY is not set")?;
            let endpoint = config
                .base_url
                .clone()
                .or_else(|| env::var("AZURE_OPENAI_ENDPOINT").ok())
                .context("No Azure endpoint: set llm.base_url or AZURE_OPENAI_ENDPOINT")?;
            let deployment = env::var("AZURE_OPENAI_DEPLOYMENT").unwrap_or_else(|_| config.model.clone());
            Self::new(Endpoint::azure(&endpoint, deployment), api_key)
        } else {
            let api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            Self::new(
                Endpoint::OpenAi {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    model: config.model.clone(),
                },
                api_key,
            )
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], params: CompletionParams) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.endpoint.model(),
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        let url = self.endpoint.url();

        let response = send_with_retry(&self.retry, self.provider_name(), || async {
            let request = self.client.post(&url).json(&body);
            let request = match &self.endpoint {
                Endpoint::OpenAi { .. } => request.bearer_auth(&self.api_key),
                Endpoint::Azure { .. } => request.header("api-key", &self.api_key),
            };
            request.send().await.context("Failed to send completion request")
        })
        .await?;

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse completion response")?;
        parsed.into_text().context("Completion response had no text")
    }

    fn provider_name(&self) -> &'static str {
        match self.endpoint {
            Endpoint::OpenAi { .. } => "openai",
            Endpoint::Azure { .. } => "azure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_url() {
        let e = Endpoint::OpenAi {
            base_url: "http://localhost:8080/v1".into(),
            model: "m".into(),
        };
        assert_eq!(e.url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(e.model(), Some("m"));
    }

    #[test]
    fn test_azure_url() {
        let e = Endpoint::Azure {
            endpoint: "https://example.openai.azure.com".into(),
            deployment: "care-gpt".into(),
        };
        assert_eq!(
            e.url(),
            "https://example.openai.azure.com/openai/deployments/care-gpt/chat/completions?api-version=2024-02-01"
        );
        assert_eq!(e.model(), None);
    }

    #[test]
    fn test_azure_endpoint_suffix_trimmed() {
        for raw in [
            "https://example.openai.azure.com",
            "https://example.openai.azure.com/",
            "https://example.openai.azure.com/openai",
            "https://example.openai.azure.com/openai/",
        ] {
            let url = Endpoint::azure(raw, "care-gpt").url();
            assert_eq!(
                url,
                "https://example.openai.azure.com/openai/deployments/care-gpt/chat/completions?api-version=2024-02-01",
                "endpoint {raw}"
            );
        }
    }

    #[test]
    fn test_provider_names() {
        let c = OpenAiClient::new(
            Endpoint::Azure {
                endpoint: "https://x".into(),
                deployment: "d".into(),
            },
            "key",
        )
        .unwrap();
        assert_eq!(c.provider_name(), "azure");
    }
}
