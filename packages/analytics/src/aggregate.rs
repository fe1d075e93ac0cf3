//! Grouped sums.
//!
//! [`aggregate`] is the generic primitive; the `aggregate_by_*` functions fix
//! the key and the ordering used by the dashboard charts.

use std::collections::BTreeMap;

use casewatch_analytics_models::{AggregateRow, LabelField, RowOrder};
use casewatch_dataset_models::{Dataset, Record};

/// Sums `count` per key. Records whose key is `None` are skipped.
#[must_use]
pub fn group_totals<K, F>(dataset: &Dataset, key_fn: F) -> BTreeMap<K, u64>
where
    K: Ord,
    F: Fn(&Record) -> Option<K>,
{
    let mut totals = BTreeMap::new();
    for record in dataset {
        if let Some(key) = key_fn(record) {
            let total = totals.entry(key).or_insert(0u64);
            *total = total.saturating_add(record.count);
        }
    }
    totals
}

/// Groups `dataset` by `key_fn` and returns one row per key in `order`.
#[must_use]
pub fn aggregate<K, F>(dataset: &Dataset, key_fn: F, order: RowOrder) -> Vec<AggregateRow<K>>
where
    K: Ord,
    F: Fn(&Record) -> Option<K>,
{
    // BTreeMap iteration is already key-ascending.
    let mut rows: Vec<AggregateRow<K>> = group_totals(dataset, key_fn)
        .into_iter()
        .map(|(key, total)| AggregateRow::new(key, total))
        .collect();

    if order == RowOrder::TotalDescending {
        // Stable sort keeps the ascending key order among equal totals.
        rows.sort_by(|a, b| b.total.cmp(&a.total));
    }

    rows
}

/// Totals per derived year, ascending by year. Records without a year are
/// excluded.
#[must_use]
pub fn aggregate_by_year(dataset: &Dataset) -> Vec<AggregateRow<i32>> {
    aggregate(dataset, Record::year, RowOrder::KeyAscending)
}

/// Totals per region, largest first, ties broken by ascending label.
/// Records without a region are excluded.
#[must_use]
pub fn aggregate_by_region(dataset: &Dataset) -> Vec<AggregateRow<String>> {
    aggregate_by_label(dataset, LabelField::Region)
}

/// Totals per label of `field`, largest first, ties broken by ascending
/// label.
#[must_use]
pub fn aggregate_by_label(dataset: &Dataset, field: LabelField) -> Vec<AggregateRow<String>> {
    aggregate(
        dataset,
        |r| field.get(r).map(ToString::to_string),
        RowOrder::TotalDescending,
    )
}

/// Keeps the first `n` rows and folds the rest into one trailing row keyed
/// `other_label` whose total is their sum.
///
/// `rows` is expected to be ranked already (e.g. from
/// [`aggregate_by_region`]). Nothing is appended when no row was folded.
#[must_use]
pub fn top_with_remainder(
    mut rows: Vec<AggregateRow<String>>,
    n: usize,
    other_label: &str,
) -> Vec<AggregateRow<String>> {
    if rows.len() <= n {
        return rows;
    }

    let rest = rows.split_off(n);
    let other = rest
        .iter()
        .fold(0u64, |acc, row| acc.saturating_add(row.total));
    rows.push(AggregateRow::new(other_label.to_string(), other));
    rows
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::test_support::{dataset, record};

    fn keys<K: Clone>(rows: &[AggregateRow<K>]) -> Vec<K> {
        rows.iter().map(|r| r.key.clone()).collect()
    }

    #[test]
    fn by_year_is_ascending_and_skips_absent_years() {
        let d = dataset(vec![
            record(0, Some("2021-01-01"), Some("A"), 1),
            record(1, Some("2019-01-01"), Some("A"), 2),
            record(2, None, Some("A"), 50),
            record(3, Some("2021-05-05"), Some("B"), 4),
        ]);
        assert_eq!(
            aggregate_by_year(&d),
            vec![AggregateRow::new(2019, 2), AggregateRow::new(2021, 5)]
        );
    }

    #[test]
    fn by_year_on_empty_dataset_is_empty() {
        assert!(aggregate_by_year(&Dataset::default()).is_empty());
    }

    #[test]
    fn by_region_breaks_ties_lexically() {
        let d = dataset(vec![
            record(0, None, Some("C"), 5),
            record(1, None, Some("B"), 10),
            record(2, None, Some("A"), 4),
            record(3, None, Some("A"), 6),
        ]);
        let rows = aggregate_by_region(&d);
        assert_eq!(keys(&rows), vec!["A", "B", "C"]);
        assert_eq!(rows[0].total, 10);
        assert_eq!(rows[2].total, 5);
    }

    #[test]
    fn by_region_keeps_records_without_year() {
        let d = dataset(vec![
            record(0, None, Some("A"), 3),
            record(1, Some("2020-01-01"), None, 7),
        ]);
        assert_eq!(aggregate_by_region(&d), vec![AggregateRow::new("A".to_string(), 3)]);
    }

    #[test]
    fn zero_count_groups_still_appear() {
        let d = dataset(vec![record(0, Some("2018-01-01"), Some("Z"), 0)]);
        assert_eq!(aggregate_by_year(&d), vec![AggregateRow::new(2018, 0)]);
    }

    #[test]
    fn by_description_uses_same_ordering() {
        let mut a = record(0, None, None, 2);
        a.description = Some("TRATA EXTERNA".to_string());
        let mut b = record(1, None, None, 9);
        b.description = Some("TRATA INTERNA".to_string());
        let rows = aggregate_by_label(&dataset(vec![a, b]), LabelField::Description);
        assert_eq!(keys(&rows), vec!["TRATA INTERNA", "TRATA EXTERNA"]);
    }

    #[test]
    fn folds_remainder_into_other() {
        let rows = vec![
            AggregateRow::new("A".to_string(), 10),
            AggregateRow::new("B".to_string(), 7),
            AggregateRow::new("C".to_string(), 2),
            AggregateRow::new("D".to_string(), 1),
        ];
        let out = top_with_remainder(rows, 2, "OTHER");
        assert_eq!(keys(&out), vec!["A", "B", "OTHER"]);
        assert_eq!(out[2].total, 3);
    }

    #[test]
    fn no_remainder_when_everything_fits() {
        let rows = vec![AggregateRow::new("A".to_string(), 1)];
        assert_eq!(top_with_remainder(rows.clone(), 5, "OTHER"), rows);
    }

    fn arb_dataset() -> impl Strategy<Value = Dataset> {
        let year = prop::option::of(2015..2023i32);
        let region = prop::option::of(prop::sample::select(vec!["A", "B", "C"]));
        prop::collection::vec((year, region, 0..50u64), 0..40).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (year, region, count))| {
                    let date = year.map(|y| format!("{y}-07-15"));
                    record(i, date.as_deref(), region, count)
                })
                .collect::<Dataset>()
        })
    }

    proptest! {
        #[test]
        fn prop_repeat_calls_are_identical(d in arb_dataset()) {
            prop_assert_eq!(aggregate_by_year(&d), aggregate_by_year(&d));
            prop_assert_eq!(aggregate_by_region(&d), aggregate_by_region(&d));
        }

        #[test]
        fn prop_region_rows_totally_ordered(d in arb_dataset()) {
            let rows = aggregate_by_region(&d);
            for pair in rows.windows(2) {
                prop_assert!(
                    pair[0].total > pair[1].total
                        || (pair[0].total == pair[1].total && pair[0].key < pair[1].key)
                );
            }
        }

        #[test]
        fn prop_year_totals_match_dated_counts(d in arb_dataset()) {
            let expected: u64 = d.iter().filter(|r| r.year().is_some()).map(|r| r.count).sum();
            let actual: u64 = aggregate_by_year(&d).iter().map(|r| r.total).sum();
            prop_assert_eq!(actual, expected);
        }
    }
}
