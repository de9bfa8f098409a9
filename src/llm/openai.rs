//! OpenAI-compatible chat completions client

use super::traits::*;
use crate::network::{HttpClient, HttpRequest};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// A model served behind `POST {base_url}/chat/completions`
pub struct OpenAiCompatibleModel {
    client: HttpClient,
    provider: String,
    model: String,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAiCompatibleModel {
    pub fn new(
        client: HttpClient,
        provider: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            provider: provider.into(),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        }
    }

    fn build_request(&self, prompt: &str, config: &GenerationConfig) -> HttpRequest {
        let mut body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });
        if let Some(temperature) = config.temperature {
            body["temperature"] = json!(temperature);
        }

        let mut request = HttpRequest::post(format!("{}/chat/completions", self.base_url))
            .json(body)
            .timeout(self.timeout);
        if let Some(ref key) = self.api_key {
            request = request.bearer(key);
        }
        request
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    fn id(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }

    async fn invoke(&self, prompt: &str, config: &GenerationConfig) -> Result<Completion, LlmError> {
        let response = self
            .client
            .execute(self.build_request(prompt, config))
            .await
            .map_err(|e| LlmError::Request(format!("{:#}", e)))?;

        if !response.is_success() {
            return Err(LlmError::Status {
                status: response.status,
                body: response.excerpt(),
            });
        }

        let parsed: ChatCompletionResponse = response.json()?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        Ok(Completion { content })
    }
}
