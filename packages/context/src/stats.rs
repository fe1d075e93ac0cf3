//! Corpus statistics for the request preamble.

use std::collections::HashMap;

use casewatch_dataset_models::{Dataset, Record};
use serde::{Deserialize, Serialize};

/// How many records carry a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    /// The label.
    pub label: String,
    /// Number of records with it.
    pub count: usize,
}

/// Summary of a dataset.
///
/// `min_year`/`max_year` are `None` when no record has a derived year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextStats {
    /// Number of records.
    pub row_count: usize,
    /// Earliest derived year.
    pub min_year: Option<i32>,
    /// Latest derived year.
    pub max_year: Option<i32>,
    /// Most frequent region labels.
    pub top_regions: Vec<LabelCount>,
    /// Most frequent description labels.
    pub top_descriptions: Vec<LabelCount>,
}

/// Computes [`ContextStats`] with top-`top_n` frequency lists.
///
/// Frequencies count records, not summed `count` values. Ties keep the
/// order in which labels first appear in the dataset.
#[must_use]
pub fn build_stats(dataset: &Dataset, top_n: usize) -> ContextStats {
    let min_year = dataset.iter().filter_map(Record::year).min();
    let max_year = dataset.iter().filter_map(Record::year).max();

    ContextStats {
        row_count: dataset.len(),
        min_year,
        max_year,
        top_regions: rank_labels(dataset.iter().filter_map(|r| r.region.as_deref()), top_n),
        top_descriptions: rank_labels(
            dataset.iter().filter_map(|r| r.description.as_deref()),
            top_n,
        ),
    }
}

fn rank_labels<'a>(labels: impl Iterator<Item = &'a str>, top_n: usize) -> Vec<LabelCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for label in labels {
        if let Some(&i) = index.get(label) {
            counts[i].1 += 1;
        } else {
            index.insert(label, counts.len());
            counts.push((label, 1));
        }
    }

    // Stable: equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(top_n)
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

impl std::fmt::Display for ContextStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rows: {}", self.row_count)?;
        match (self.min_year, self.max_year) {
            (Some(min), Some(max)) => writeln!(f, "Years: {min} to {max}")?,
            _ => writeln!(f, "Years: unknown (no record has a valid date)")?,
        }
        writeln!(f, "Top regions: {}", format_counts(&self.top_regions))?;
        write!(
            f,
            "Top descriptions: {}",
            format_counts(&self.top_descriptions)
        )
    }
}

fn format_counts(counts: &[LabelCount]) -> String {
    if counts.is_empty() {
        return "none".to_string();
    }
    counts
        .iter()
        .map(|c| format!("{} ({})", c.label, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::record;

    #[test]
    fn computes_year_range_and_row_count() {
        let d = Dataset::new(vec![
            record(0, Some("2020-02-01"), Some("A"), None, 1),
            record(1, None, Some("A"), None, 1),
            record(2, Some("2016-02-01"), Some("B"), None, 1),
        ]);
        let stats = build_stats(&d, 5);
        assert_eq!(stats.row_count, 3);
        assert_eq!(stats.min_year, Some(2016));
        assert_eq!(stats.max_year, Some(2020));
    }

    #[test]
    fn year_range_absent_without_dates() {
        let d = Dataset::new(vec![record(0, None, Some("A"), None, 1)]);
        let stats = build_stats(&d, 5);
        assert_eq!(stats.min_year, None);
        assert_eq!(stats.max_year, None);
        assert!(stats.to_string().contains("Years: unknown"));
    }

    #[test]
    fn ranks_by_frequency_then_first_seen() {
        let d = Dataset::new(vec![
            record(0, None, Some("C"), Some("X"), 100),
            record(1, None, Some("B"), Some("Y"), 1),
            record(2, None, Some("B"), None, 1),
            record(3, None, Some("A"), Some("Y"), 1),
            record(4, None, Some("A"), None, 1),
            record(5, None, None, Some("Z"), 1),
        ]);
        let stats = build_stats(&d, 2);

        let regions: Vec<(&str, usize)> = stats
            .top_regions
            .iter()
            .map(|c| (c.label.as_str(), c.count))
            .collect();
        assert_eq!(regions, vec![("B", 2), ("A", 2)]);

        let descriptions: Vec<&str> = stats
            .top_descriptions
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Y", "X"]);
    }

    #[test]
    fn empty_dataset_stats() {
        let stats = build_stats(&Dataset::default(), 5);
        assert_eq!(stats.row_count, 0);
        assert!(stats.top_regions.is_empty());
        assert!(stats.to_string().contains("Top regions: none"));
    }

    #[test]
    fn renders_stats_block() {
        let d = Dataset::new(vec![record(0, Some("2019-01-01"), Some("A"), Some("T"), 1)]);
        assert_eq!(
            build_stats(&d, 3).to_string(),
            "Rows: 1\nYears: 2019 to 2019\nTop regions: A (1)\nTop descriptions: T (1)"
        );
    }
}
