#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering, grouping and summary metrics over incident datasets.
//!
//! Every function takes a [`Dataset`](casewatch_dataset_models::Dataset) by
//! reference and returns a fresh value. Nothing here performs I/O or keeps
//! state between calls, so the same dataset can be queried concurrently.
//!
//! Narrowing to zero records is a normal outcome: filters return an empty
//! dataset, aggregates an empty `Vec` and [`metrics`] all zeros.

pub mod aggregate;
pub mod filter;
pub mod metrics;
pub mod options;

pub use aggregate::{
    aggregate, aggregate_by_label, aggregate_by_region, aggregate_by_year, group_totals,
    top_with_remainder,
};
pub use filter::filter;
pub use metrics::metrics;
pub use options::{available_regions, available_years, sort_most_recent_first};

#[cfg(test)]
pub(crate) mod test_support {
    use casewatch_dataset_models::{Dataset, Record};
    use chrono::NaiveDate;

    /// Builds a record from a `YYYY-MM-DD` date, region and count.
    pub fn record(row: usize, date: Option<&str>, region: Option<&str>, count: u64) -> Record {
        Record {
            row,
            event_date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            region: region.map(ToString::to_string),
            subregion: None,
            description: None,
            count,
        }
    }

    pub fn dataset(records: Vec<Record>) -> Dataset {
        Dataset::new(records)
    }
}
