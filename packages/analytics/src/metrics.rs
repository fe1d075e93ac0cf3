//! Headline metrics.

use std::collections::BTreeSet;

use casewatch_analytics_models::Metrics;
use casewatch_dataset_models::Dataset;

/// Total case count and distinct region/subregion cardinalities.
///
/// Records whose count was substituted with zero during normalization are
/// included; they just add nothing to the total.
#[must_use]
pub fn metrics(dataset: &Dataset) -> Metrics {
    let mut total_count = 0u64;
    let mut regions = BTreeSet::new();
    let mut subregions = BTreeSet::new();

    for record in dataset {
        total_count = total_count.saturating_add(record.count);
        if let Some(region) = &record.region {
            regions.insert(region.as_str());
        }
        if let Some(subregion) = &record.subregion {
            subregions.insert(subregion.as_str());
        }
    }

    Metrics {
        total_count,
        distinct_regions: regions.len(),
        distinct_subregions: subregions.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dataset, record};

    #[test]
    fn totals_include_zero_substituted_records() {
        // Counts as loaded from [5, "x", 3, None].
        let d = dataset(vec![
            record(0, Some("2019-01-01"), Some("A"), 5),
            record(1, Some("2019-01-01"), Some("B"), 0),
            record(2, Some("2020-01-01"), Some("A"), 3),
            record(3, None, Some("C"), 0),
        ]);
        let m = metrics(&d);
        assert_eq!(m.total_count, 8);
        assert_eq!(m.distinct_regions, 3);
    }

    #[test]
    fn records_without_year_still_count() {
        let mut r = record(0, None, Some("A"), 4);
        r.subregion = Some("X".to_string());
        let m = metrics(&dataset(vec![r]));
        assert_eq!(
            m,
            Metrics {
                total_count: 4,
                distinct_regions: 1,
                distinct_subregions: 1,
            }
        );
    }

    #[test]
    fn empty_dataset_has_zero_metrics() {
        assert_eq!(metrics(&Dataset::default()), Metrics::default());
    }

    #[test]
    fn absent_labels_are_not_distinct_values() {
        let d = dataset(vec![record(0, None, None, 1), record(1, None, None, 1)]);
        assert_eq!(metrics(&d).distinct_regions, 0);
    }
}
