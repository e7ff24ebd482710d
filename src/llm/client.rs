use crate::error::{AgentError, Result};
use crate::llm::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use log::debug;
use reqwest::Client;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Thin client for the chat-completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Requests one completion and returns the first choice's message.
    pub(crate) async fn create_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatMessage> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting completion from model {}", request.model);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AgentError::Completion(format!(
                "completion request failed (status {}): {}",
                status, body
            )));
        }

        let body: ChatCompletionResponse = res
            .json()
            .await
            .map_err(|e| AgentError::Completion(format!("invalid completion response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AgentError::Completion("no choices returned".to_string()))
    }
}
