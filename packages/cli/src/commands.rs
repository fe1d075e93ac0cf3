//! Loading and plain-text rendering shared by the subcommands and the
//! interactive mode.

use std::fmt::Display;

use casewatch_ai::providers::{ProviderConfig, create_provider};
use casewatch_ai::{AiError, AskOutcome};
use casewatch_analytics::metrics;
use casewatch_analytics_models::AggregateRow;
use casewatch_cli_utils::{IndicatifProgress, MultiProgress};
use casewatch_context::ContextBudget;
use casewatch_dataset_models::{Dataset, Record};
use casewatch_source::{SourceDefinition, SourceError};

/// Label of the row that regions beyond `--top` are folded into.
pub const OTHER_LABEL: &str = "OTHER";

/// Loads `source` behind a progress bar and returns its records.
pub async fn load_dataset(
    multi: &MultiProgress,
    source: &SourceDefinition,
) -> Result<Dataset, SourceError> {
    let progress = IndicatifProgress::bytes_bar(multi, &format!("Loading {}", source.name));
    let outcome = casewatch_source::load(source, &progress).await?;
    Ok(outcome.dataset)
}

/// Asks `question` about `dataset` using the provider configured in the
/// environment.
pub async fn ask_question(
    dataset: &Dataset,
    budget: &ContextBudget,
    question: &str,
) -> Result<AskOutcome, AiError> {
    let provider = create_provider(&ProviderConfig::from_env()?)?;
    casewatch_ai::ask(provider.as_ref(), dataset, budget, question).await
}

#[must_use]
pub fn render_sources(sources: &[SourceDefinition]) -> String {
    let mut lines = vec![
        format!("{:<20} {:<40} LOCATION", "ID", "NAME"),
        "-".repeat(80),
    ];
    lines.extend(
        sources
            .iter()
            .map(|s| format!("{:<20} {:<40} {}", s.id, s.name, s.location)),
    );
    finish(lines)
}

#[must_use]
pub fn render_metrics(dataset: &Dataset) -> String {
    let m = metrics(dataset);
    finish(vec![
        format!("Records:             {}", dataset.len()),
        format!("Total count:         {}", m.total_count),
        format!("Distinct regions:    {}", m.distinct_regions),
        format!("Distinct subregions: {}", m.distinct_subregions),
    ])
}

/// Renders aggregate rows as a two-column table headed by `key_header`.
#[must_use]
pub fn render_totals<K: Display>(key_header: &str, rows: &[AggregateRow<K>]) -> String {
    if rows.is_empty() {
        return finish(vec!["(no records)".to_string()]);
    }

    let mut lines = vec![
        format!("{key_header:<30} {:>10}", "TOTAL"),
        "-".repeat(41),
    ];
    lines.extend(
        rows.iter()
            .map(|row| format!("{:<30} {:>10}", row.key.to_string(), row.total)),
    );
    finish(lines)
}

#[must_use]
pub fn render_records(records: &[Record]) -> String {
    if records.is_empty() {
        return finish(vec!["(no records)".to_string()]);
    }

    let mut lines = vec![
        format!(
            "{:<10} {:<20} {:<20} {:<30} {:>6}",
            "DATE", "REGION", "SUBREGION", "DESCRIPTION", "COUNT"
        ),
        "-".repeat(90),
    ];
    lines.extend(records.iter().map(|r| {
        format!(
            "{:<10} {:<20} {:<20} {:<30} {:>6}",
            r.event_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
            label(r.region.as_deref()),
            label(r.subregion.as_deref()),
            label(r.description.as_deref()),
            r.count
        )
    }));
    finish(lines)
}

#[must_use]
pub fn render_answer(outcome: &AskOutcome) -> String {
    let mut lines = vec![
        outcome.answer.trim_end().to_string(),
        String::new(),
        format!(
            "({}; {} of {} records in context)",
            outcome.provider, outcome.rows_included, outcome.rows_available
        ),
    ];
    if outcome.truncated {
        lines.push("(reply was cut off at the output token limit)".to_string());
    }
    finish(lines)
}

fn label(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
