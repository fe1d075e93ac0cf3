//! Request text assembly.

use casewatch_dataset_models::Dataset;

use crate::{ContextBudget, ContextStats, Excerpt, build_excerpt, build_stats};

/// Instructions placed ahead of every request.
pub const PREAMBLE: &str = "You are an analyst answering questions about a dataset of \
reported incidents. Each record has an event date, the year derived from it, a region, \
a subregion, a description of the conduct and a case count. Answer using only the \
statistics and records below. If they do not contain the answer, say so. The records \
are an excerpt; the statistics describe the whole filtered dataset.";

/// Joins the preamble, `stats`, `excerpt` and `question`, in that order.
#[must_use]
pub fn assemble_request_text(excerpt: &Excerpt, stats: &ContextStats, question: &str) -> String {
    format!(
        "{PREAMBLE}\n\n## Statistics\n\n{stats}\n\n## Records ({} of {} rows)\n\n{}\n## Question\n\n{}\n",
        excerpt.rows_included,
        excerpt.rows_available,
        excerpt.text,
        question.trim(),
    )
}

/// Builds the full request text for `question` about `dataset` within
/// `budget`.
#[must_use]
pub fn build_request_text(dataset: &Dataset, budget: &ContextBudget, question: &str) -> String {
    let stats = build_stats(dataset, budget.top_n);
    let excerpt = build_excerpt(dataset, budget.max_rows, budget.max_chars);
    log::debug!(
        "Request context: {} of {} rows, {} excerpt chars",
        excerpt.rows_included,
        excerpt.rows_available,
        excerpt.text.chars().count()
    );
    assemble_request_text(&excerpt, &stats, question)
}
