//! Question answering over cached document text
//!
//! The handler layer only sees [`QueryService`]; the LLM-backed implementation
//! wraps the whole stored text and the question into a single chat turn.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::LLMConfig;
use crate::llm::provider::{LLMProviderConfig, LLM};
use crate::types::{AppResult, LLMMessage, LLMRequest};

const SYSTEM_PROMPT: &str = "You answer questions about a document. \
Use only the document text provided by the user. \
If the answer is not in the document, say that it is not there.";

#[async_trait]
pub trait QueryService: Send + Sync {
    async fn answer(&self, context: &str, query: &str) -> AppResult<String>;
}

pub struct LlmQueryService {
    llm: LLM,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl LlmQueryService {
    pub fn new(llm: LLM, model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            llm,
            model: model.into(),
            max_tokens,
            temperature,
        }
    }

    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let llm = LLM::new(LLMProviderConfig::from(config))?;
        Ok(Self::new(llm, config.model.clone(), config.max_tokens, config.temperature))
    }

    pub fn build_request(&self, context: &str, query: &str) -> LLMRequest {
        LLMRequest {
            model: self.model.clone(),
            messages: vec![LLMMessage::user(format!(
                "Document:\n{}\n\nQuestion: {}",
                context, query
            ))],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            system_instruction: Some(SYSTEM_PROMPT.to_string()),
        }
    }
}

#[async_trait]
impl QueryService for LlmQueryService {
    async fn answer(&self, context: &str, query: &str) -> AppResult<String> {
        let request = self.build_request(context, query);
        debug!(
            provider = %self.llm.provider(),
            model = %self.model,
            context_chars = context.len(),
            "Sending query to LLM"
        );

        let response = self.llm.create_chat_completion(&request).await?;
        info!(
            finish_reason = %response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "LLM answered"
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LLMAdapter;
    use crate::types::{AppError, LLMProvider, LLMResponse, TokenUsage};
    use std::sync::{Arc, Mutex};

    /// Records the last request and replies with a fixed answer
    struct RecordingAdapter {
        last: Arc<Mutex<Option<LLMRequest>>>,
        fail: bool,
    }

    #[async_trait]
    impl LLMAdapter for RecordingAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            *self.last.lock().unwrap() = Some(request.clone());
            if self.fail {
                return Err(AppError::LLMApi("upstream down".to_string()));
            }
            Ok(LLMResponse {
                content: "It says hello.".to_string(),
                finish_reason: "stop".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn service(fail: bool) -> (LlmQueryService, Arc<Mutex<Option<LLMRequest>>>) {
        let last = Arc::new(Mutex::new(None));
        let adapter = RecordingAdapter {
            last: last.clone(),
            fail,
        };
        let llm = LLM::with_adapter(LLMProvider::OpenAI, Box::new(adapter));
        (LlmQueryService::new(llm, "gpt-4o-mini", 256, 0.1), last)
    }

    #[tokio::test]
    async fn test_answer_sends_full_context() {
        let (service, last) = service(false);
        let answer = service
            .answer("Hello world\n\nMore text", "What does it say?")
            .await
            .unwrap();

        assert_eq!(answer, "It says hello.");
        let request = last.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.messages.len(), 1);
        assert!(request.messages[0].content.contains("Hello world\n\nMore text"));
        assert!(request.messages[0].content.ends_with("Question: What does it say?"));
        assert!(request.system_instruction.is_some());
    }

    #[tokio::test]
    async fn test_answer_propagates_llm_error() {
        let (service, _) = service(true);
        let err = service.answer("ctx", "q").await.unwrap_err();
        assert!(matches!(err, AppError::LLMApi(_)));
    }
}
