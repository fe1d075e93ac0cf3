//! `OpenAI` GPT provider implementation.
//!
//! Also talks to `OpenAI`-compatible servers (Ollama, vLLM, llama.cpp,
//! LM Studio) when given a custom base URL.

use serde::{Deserialize, Serialize};

use super::{LlmProvider, LlmResponse, MAX_OUTPUT_TOKENS, Message, StopReason, provider_error};
use crate::AiError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the provider at an `OpenAI`-compatible server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

fn build_messages<'a>(system_prompt: &'a str, messages: &'a [Message]) -> Vec<OpenAiMessage<'a>> {
    let mut api_messages = vec![OpenAiMessage {
        role: "system",
        content: system_prompt,
    }];
    api_messages.extend(messages.iter().map(|m| OpenAiMessage {
        role: m.role.as_ref(),
        content: &m.content,
    }));
    api_messages
}

fn into_response(response: OpenAiResponse) -> Result<LlmResponse, AiError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Provider {
            message: "No choices in OpenAI response".to_string(),
        })?;

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    };

    Ok(LlmResponse {
        text: choice.message.content.unwrap_or_default(),
        stop_reason,
    })
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> String {
        format!("openai/{}", self.model)
    }

    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<LlmResponse, AiError> {
        let request = OpenAiRequest {
            model: &self.model,
            messages: build_messages(system_prompt, messages),
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = builder.json(&request).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(provider_error(status, &body));
        }

        let response: OpenAiResponse = serde_json::from_str(&body)?;
        into_response(response)
    }
}
