//! Google Gemini provider implementation.

use serde::{Deserialize, Serialize};

use super::{
    LlmProvider, LlmResponse, MAX_OUTPUT_TOKENS, Message, Role, StopReason, provider_error,
};
use crate::AiError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` API provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{BASE_URL}/models/{}:generateContent", self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

fn build_request<'a>(system_prompt: &'a str, messages: &'a [Message]) -> GeminiRequest<'a> {
    let contents = messages
        .iter()
        .map(|m| GeminiContent {
            role: Some(match m.role {
                Role::User => "user",
                Role::Assistant => "model",
            }),
            parts: vec![GeminiPart { text: &m.content }],
        })
        .collect();

    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: system_prompt,
            }],
        },
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    }
}

fn into_response(response: GeminiResponse) -> Result<LlmResponse, AiError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Provider {
            message: "No candidates in Gemini response".to_string(),
        })?;

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let stop_reason = match candidate.finish_reason.as_deref() {
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    };

    Ok(LlmResponse { text, stop_reason })
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> String {
        format!("gemini/{}", self.model)
    }

    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<LlmResponse, AiError> {
        let request = build_request(system_prompt, messages);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(provider_error(status, &body));
        }

        let response: GeminiResponse = serde_json::from_str(&body)?;
        into_response(response)
    }
}
