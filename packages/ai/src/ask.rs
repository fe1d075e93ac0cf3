//! Answering a question about a dataset in one grounded completion.

use casewatch_context::{ContextBudget, assemble_request_text, build_excerpt, build_stats};
use casewatch_dataset_models::Dataset;
use serde::Serialize;

use crate::AiError;
use crate::providers::{LlmProvider, Message, StopReason};

/// System prompt sent with every question. The data itself travels in the
/// user message.
const SYSTEM_PROMPT: &str = "You are a careful data analyst. Answer in the language the \
question is asked in. Cite the numbers you rely on and do not invent records.";

/// The answer to a question and what it was grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskOutcome {
    /// The model's reply.
    pub answer: String,
    /// Provider/model that produced it.
    pub provider: String,
    /// Records included in the excerpt.
    pub rows_included: usize,
    /// Records in the dataset.
    pub rows_available: usize,
    /// Whether the reply was cut off by the output token limit.
    pub truncated: bool,
}

/// Asks `question` about `dataset`.
///
/// The question and dataset are validated before anything is sent, so an
/// invalid request never reaches the network.
///
/// # Errors
///
/// * [`AiError::EmptyQuestion`] if `question` is blank
/// * [`AiError::EmptyDataset`] if `dataset` has no records
/// * any provider error
pub async fn ask(
    provider: &dyn LlmProvider,
    dataset: &Dataset,
    budget: &ContextBudget,
    question: &str,
) -> Result<AskOutcome, AiError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AiError::EmptyQuestion);
    }
    if dataset.is_empty() {
        return Err(AiError::EmptyDataset);
    }

    let stats = build_stats(dataset, budget.top_n);
    let excerpt = build_excerpt(dataset, budget.max_rows, budget.max_chars);
    let request = assemble_request_text(&excerpt, &stats, question);

    log::info!(
        "Asking {} with {} of {} rows ({} chars)",
        provider.name(),
        excerpt.rows_included,
        excerpt.rows_available,
        request.chars().count()
    );

    let response = provider
        .chat(SYSTEM_PROMPT, &[Message::user(request)])
        .await?;

    if response.stop_reason == StopReason::MaxTokens {
        log::warn!("{} reply hit the output token limit", provider.name());
    }

    Ok(AskOutcome {
        answer: response.text,
        provider: provider.name(),
        rows_included: excerpt.rows_included,
        rows_available: excerpt.rows_available,
        truncated: response.stop_reason == StopReason::MaxTokens,
    })
}
