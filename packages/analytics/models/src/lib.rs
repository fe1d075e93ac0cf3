#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result and selection types for the incident dashboard queries.
//!
//! Everything here is a plain value: produced fresh per query and directly
//! serializable for a charting or summary layer.

use std::collections::BTreeSet;

use casewatch_dataset_models::{Record, normalize_label};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A group key and the summed count of the records sharing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow<K> {
    /// Group key (a year or a category label).
    pub key: K,
    /// Sum of `count` over the group.
    pub total: u64,
}

impl<K> AggregateRow<K> {
    /// Creates a row.
    #[must_use]
    pub const fn new(key: K, total: u64) -> Self {
        Self { key, total }
    }
}

/// How aggregate rows are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// Ascending by key.
    KeyAscending,
    /// Descending by total, ties ascending by key.
    TotalDescending,
}

/// Headline numbers for a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Sum of `count` over every record.
    pub total_count: u64,
    /// Number of distinct non-absent region labels.
    pub distinct_regions: usize,
    /// Number of distinct non-absent subregion labels.
    pub distinct_subregions: usize,
}

/// A categorical record field that can be grouped or ranked.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LabelField {
    /// Region label.
    Region,
    /// Subregion label.
    Subregion,
    /// Description label.
    Description,
}

impl LabelField {
    /// Reads this field from `record`.
    #[must_use]
    pub fn get(self, record: &Record) -> Option<&str> {
        match self {
            Self::Region => record.region.as_deref(),
            Self::Subregion => record.subregion.as_deref(),
            Self::Description => record.description.as_deref(),
        }
    }
}

/// Year and region constraints for a filter.
///
/// An empty set leaves that dimension unconstrained. Region labels are
/// stored normalized so they compare equal to normalized record labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Years to keep.
    #[serde(default)]
    pub years: BTreeSet<i32>,
    /// Region labels to keep.
    #[serde(default)]
    pub regions: BTreeSet<String>,
}

impl FilterSelection {
    /// A selection that keeps everything.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            years: BTreeSet::new(),
            regions: BTreeSet::new(),
        }
    }

    /// Builds a selection, normalizing region labels and dropping blank ones.
    #[must_use]
    pub fn new<Y, R, S>(years: Y, regions: R) -> Self
    where
        Y: IntoIterator<Item = i32>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            years: years.into_iter().collect(),
            regions: regions
                .into_iter()
                .map(|r| normalize_label(r.as_ref()))
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Whether neither dimension is constrained.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.years.is_empty() && self.regions.is_empty()
    }

    /// Whether `record` passes this selection.
    ///
    /// Records without a year fail any non-empty year constraint; records
    /// without a region fail any non-empty region constraint.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let year_ok = self.years.is_empty()
            || record.year().is_some_and(|y| self.years.contains(&y));
        let region_ok = self.regions.is_empty()
            || record
                .region
                .as_ref()
                .is_some_and(|r| self.regions.contains(r));
        year_ok && region_ok
    }
}
