#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Grounded questions over incident datasets.
//!
//! Supports Anthropic Claude, `OpenAI` (and any `OpenAI`-compatible
//! self-hosted server such as Ollama, vLLM or LM Studio via a custom base
//! URL) and Google Gemini. A question is answered in a single completion
//! whose prompt carries a bounded excerpt of the filtered dataset built by
//! `casewatch_context`.

pub mod ask;
pub mod providers;

pub use ask::{AskOutcome, ask};

use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// The question was empty or whitespace.
    #[error("Question must not be empty")]
    EmptyQuestion,

    /// The (filtered) dataset has no records to ground an answer on.
    #[error("No records match the current selection")]
    EmptyDataset,
}
