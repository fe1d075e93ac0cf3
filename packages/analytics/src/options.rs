//! Filter option lists and table ordering for the dashboard.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use casewatch_dataset_models::Dataset;

/// Distinct derived years, ascending.
#[must_use]
pub fn available_years(dataset: &Dataset) -> Vec<i32> {
    dataset
        .iter()
        .filter_map(casewatch_dataset_models::Record::year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct region labels, ascending.
#[must_use]
pub fn available_regions(dataset: &Dataset) -> Vec<String> {
    dataset
        .iter()
        .filter_map(|r| r.region.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Returns a copy of `dataset` ordered by event date, newest first.
///
/// Records without a date go last. The sort is stable, so records on the
/// same date keep their source order.
#[must_use]
pub fn sort_most_recent_first(dataset: &Dataset) -> Dataset {
    let mut records = dataset.records().to_vec();
    records.sort_by_key(|r| (r.event_date.is_none(), Reverse(r.event_date)));
    Dataset::new(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dataset, record};

    #[test]
    fn lists_years_ascending_without_absent() {
        let d = dataset(vec![
            record(0, Some("2021-01-01"), None, 1),
            record(1, None, None, 1),
            record(2, Some("2019-01-01"), None, 1),
            record(3, Some("2021-09-01"), None, 1),
        ]);
        assert_eq!(available_years(&d), vec![2019, 2021]);
    }

    #[test]
    fn lists_regions_ascending_without_absent() {
        let d = dataset(vec![
            record(0, None, Some("VALLE"), 1),
            record(1, None, None, 1),
            record(2, None, Some("ANTIOQUIA"), 1),
            record(3, None, Some("VALLE"), 1),
        ]);
        assert_eq!(available_regions(&d), vec!["ANTIOQUIA", "VALLE"]);
    }

    #[test]
    fn sorts_newest_first_with_undated_last() {
        let d = dataset(vec![
            record(0, None, None, 1),
            record(1, Some("2019-01-01"), None, 1),
            record(2, Some("2021-01-01"), None, 1),
            record(3, Some("2019-01-01"), None, 1),
        ]);
        let rows: Vec<usize> = sort_most_recent_first(&d).iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 1, 3, 0]);
    }
}
