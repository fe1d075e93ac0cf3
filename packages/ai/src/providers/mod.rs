//! LLM provider abstraction and implementations.
//!
//! Supports Anthropic Claude, `OpenAI` and Google Gemini via a common trait.
//! Providers are built from an explicit [`ProviderConfig`];
//! [`ProviderConfig::from_env`] exists for the binaries.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::AiError;

/// Who sent a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// The asking user.
    User,
    /// The model.
    Assistant,
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// A user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Response from the LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    /// Concatenated text of the reply.
    pub text: String,
    /// Why generation stopped.
    pub stop_reason: StopReason,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Model finished its response naturally.
    EndTurn,
    /// Maximum tokens reached.
    MaxTokens,
}

/// Maximum tokens requested from every provider.
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider/model name, for logs.
    fn name(&self) -> String;

    /// Send a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails.
    async fn chat(&self, system_prompt: &str, messages: &[Message])
    -> Result<LlmResponse, AiError>;
}

/// Supported provider backends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    /// Anthropic Messages API.
    #[strum(to_string = "anthropic", serialize = "claude")]
    Anthropic,
    /// `OpenAI` chat completions, or a compatible server.
    #[strum(to_string = "openai", serialize = "gpt")]
    OpenAi,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl ProviderKind {
    /// Model used when none is configured.
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAi => "gpt-4o",
            Self::Gemini => "gemini-2.0-flash",
        }
    }

    /// Environment variable holding this provider's API key.
    #[must_use]
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Everything needed to construct a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Backend.
    pub kind: ProviderKind,
    /// API key. May be empty only for an `OpenAI`-compatible server with a
    /// custom `base_url`.
    pub api_key: String,
    /// Model override.
    pub model: Option<String>,
    /// Base URL override (`OpenAI`-compatible servers).
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// A config for `kind` authenticated with `api_key`.
    #[must_use]
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: None,
            base_url: None,
        }
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The configured model, or the provider default.
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.kind.default_model())
    }

    /// Reads a config from the environment.
    ///
    /// If `AI_PROVIDER` is set, uses that provider. Otherwise auto-detects
    /// from available credentials: `ANTHROPIC_API_KEY`, then
    /// `OPENAI_API_KEY`, then `GEMINI_API_KEY`. `AI_MODEL` and
    /// `AI_BASE_URL` override the model and endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] if the provider name is unknown or its
    /// API key is not set.
    pub fn from_env() -> Result<Self, AiError> {
        let kind = match std::env::var("AI_PROVIDER") {
            Ok(name) => name.parse::<ProviderKind>().map_err(|_| AiError::Config {
                message: format!(
                    "Unknown AI provider: {name}. Use 'anthropic', 'openai', or 'gemini'."
                ),
            })?,
            Err(_) => detect_provider(),
        };

        let base_url = std::env::var("AI_BASE_URL").ok().filter(|u| !u.is_empty());
        let api_key = match std::env::var(kind.api_key_var()) {
            Ok(key) => key,
            // Local OpenAI-compatible servers usually run without a key.
            Err(_) if kind == ProviderKind::OpenAi && base_url.is_some() => String::new(),
            Err(_) => {
                return Err(AiError::Config {
                    message: format!("{} environment variable not set", kind.api_key_var()),
                });
            }
        };

        Ok(Self {
            kind,
            api_key,
            model: std::env::var("AI_MODEL").ok().filter(|m| !m.is_empty()),
            base_url,
        })
    }
}

/// Auto-detects which provider to use based on available credentials.
fn detect_provider() -> ProviderKind {
    for kind in [
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
        ProviderKind::Gemini,
    ] {
        if std::env::var(kind.api_key_var()).is_ok() {
            log::info!(
                "Auto-detected AI provider: {kind} ({} found)",
                kind.api_key_var()
            );
            return kind;
        }
    }

    if std::env::var("AI_BASE_URL").is_ok() {
        log::info!("Auto-detected AI provider: openai-compatible (AI_BASE_URL found)");
        return ProviderKind::OpenAi;
    }

    log::warn!(
        "No AI credentials detected. Set one of: ANTHROPIC_API_KEY, OPENAI_API_KEY, \
         GEMINI_API_KEY. You can also set AI_PROVIDER explicitly."
    );

    // Fall back to anthropic; from_env reports the missing key.
    ProviderKind::Anthropic
}

/// Creates the provider described by `config`.
///
/// # Errors
///
/// Returns [`AiError::Config`] if the API key is missing where one is
/// required.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>, AiError> {
    let needs_key = !(config.kind == ProviderKind::OpenAi && config.base_url.is_some());
    if needs_key && config.api_key.trim().is_empty() {
        return Err(AiError::Config {
            message: format!("No API key configured for provider {}", config.kind),
        });
    }

    let model = config.model().to_string();
    let api_key = config.api_key.clone();

    Ok(match config.kind {
        ProviderKind::Anthropic => Box::new(anthropic::AnthropicProvider::new(api_key, model)),
        ProviderKind::OpenAi => {
            let provider = openai::OpenAiProvider::new(api_key, model);
            match &config.base_url {
                Some(url) => Box::new(provider.with_base_url(url.clone())),
                None => Box::new(provider),
            }
        }
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::new(api_key, model)),
    })
}

/// Reads an error message from a provider's JSON error body, falling back to
/// the raw status and body.
pub(crate) fn provider_error(status: reqwest::StatusCode, body: &str) -> AiError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);
    AiError::Provider { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_names_and_aliases() {
        assert_eq!("anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("Claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("OPENAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn model_falls_back_to_provider_default() {
        let config = ProviderConfig::new(ProviderKind::Gemini, "k");
        assert_eq!(config.model(), "gemini-2.0-flash");
        assert_eq!(config.with_model("gemini-1.5-flash").model(), "gemini-1.5-flash");
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = ProviderConfig::new(ProviderKind::Anthropic, "secret-value");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn create_provider_requires_key() {
        let err = create_provider(&ProviderConfig::new(ProviderKind::Anthropic, " ")).err();
        assert!(matches!(err, Some(AiError::Config { .. })));
    }

    #[test]
    fn openai_compatible_server_needs_no_key() {
        let config = ProviderConfig::new(ProviderKind::OpenAi, "")
            .with_base_url("http://localhost:11434/v1")
            .with_model("llama3");
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai/llama3");
    }

    #[test]
    fn provider_error_reads_json_message() {
        let err = provider_error(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"invalid x-api-key"}}"#,
        );
        assert_eq!(err.to_string(), "Provider error: invalid x-api-key");

        let err = provider_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(
            err.to_string(),
            "Provider error: HTTP 502 Bad Gateway: upstream down"
        );
    }
}
