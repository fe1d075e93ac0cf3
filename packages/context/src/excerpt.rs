//! Row excerpt rendered as a pipe table.

use casewatch_dataset_models::{Dataset, Record};
use serde::{Deserialize, Serialize};

const COLUMNS: [&str; 6] = [
    "event_date",
    "year",
    "region",
    "subregion",
    "description",
    "count",
];

/// A rendered excerpt and how much of the dataset it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Excerpt {
    /// Header, separator, then one line per included record.
    pub text: String,
    /// Records rendered into `text`.
    pub rows_included: usize,
    /// Records in the dataset the excerpt was built from.
    pub rows_available: usize,
}

impl Excerpt {
    /// Whether some records were left out.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        self.rows_included < self.rows_available
    }
}

/// Renders the first `max_rows` records of `dataset` in source order.
///
/// Rows are appended whole while the text stays within `max_chars`
/// characters; the first row that would overflow stops rendering. The header
/// and separator are always present, so an empty dataset (or a budget too
/// small for any row) yields a header-only table.
#[must_use]
pub fn build_excerpt(dataset: &Dataset, max_rows: usize, max_chars: usize) -> Excerpt {
    let mut text = header();
    let mut chars = text.chars().count();
    let mut rows_included = 0;

    for record in dataset.iter().take(max_rows) {
        let line = render_row(record);
        let line_chars = line.chars().count();
        if chars + line_chars > max_chars {
            log::debug!(
                "Excerpt character cap {max_chars} reached after {rows_included} row(s)"
            );
            break;
        }
        text.push_str(&line);
        chars += line_chars;
        rows_included += 1;
    }

    Excerpt {
        text,
        rows_included,
        rows_available: dataset.len(),
    }
}

fn header() -> String {
    let mut out = format!("| {} |\n", COLUMNS.join(" | "));
    out.push('|');
    for _ in COLUMNS {
        out.push_str(" --- |");
    }
    out.push('\n');
    out
}

fn render_row(record: &Record) -> String {
    let cells = [
        record
            .event_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        record.year().map(|y| y.to_string()).unwrap_or_default(),
        escape(record.region.as_deref()),
        escape(record.subregion.as_deref()),
        escape(record.description.as_deref()),
        record.count.to_string(),
    ];

    format!("| {} |\n", cells.join(" | "))
}

fn escape(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .replace(['\r', '\n'], " ")
        .replace('|', "\\|")
}
