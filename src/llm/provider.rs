use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::llm::anthropic::AnthropicAdapter;
use crate::llm::openai::OpenAIAdapter;
use crate::types::{AppError, AppResult, LLMProvider, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Provider name plus credentials and an optional endpoint override
pub struct LLMProviderConfig {
    pub provider: LLMProvider,
    pub api_key: String,
    pub base_url: Option<String>,
}

impl From<&LLMConfig> for LLMProviderConfig {
    fn from(config: &LLMConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider: LLMProvider,
}

impl LLM {
    pub fn new(config: LLMProviderConfig) -> AppResult<Self> {
        // A custom base URL usually points at a local server that needs no key
        if config.api_key.is_empty() && config.base_url.is_none() {
            return Err(AppError::Internal(format!(
                "No API key configured for LLM provider {}",
                config.provider
            )));
        }

        let adapter: Box<dyn LLMAdapter> = match config.provider {
            LLMProvider::Anthropic => Box::new(AnthropicAdapter::new(&config.api_key, config.base_url)),
            ref provider => Box::new(OpenAIAdapter::for_provider(provider, &config.api_key, config.base_url)),
        };

        Ok(Self {
            adapter,
            provider: config.provider,
        })
    }

    /// Wraps an existing adapter
    pub fn with_adapter(provider: LLMProvider, adapter: Box<dyn LLMAdapter>) -> Self {
        Self { adapter, provider }
    }

    pub fn provider(&self) -> &LLMProvider {
        &self.provider
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
