#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the dataset and analytics types so the API contract can evolve
//! independently.

use std::collections::BTreeSet;

use casewatch_analytics_models::{FilterSelection, Metrics};
use casewatch_dataset_models::Record;
use serde::{Deserialize, Serialize};

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Year and region filter, as comma-separated query parameters
/// (`?years=2019,2020&regions=ANTIOQUIA,VALLE`).
///
/// Missing or empty parameters leave that dimension unconstrained.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQueryParams {
    /// Comma-separated years.
    pub years: Option<String>,
    /// Comma-separated region labels.
    pub regions: Option<String>,
}

impl FilterQueryParams {
    /// Parses the parameters into a [`FilterSelection`].
    ///
    /// # Errors
    ///
    /// Returns a message naming the first value in `years` that is not an
    /// integer.
    pub fn selection(&self) -> Result<FilterSelection, String> {
        parse_selection(self.years.as_deref(), self.regions.as_deref())
    }
}

/// Query parameters for `GET /api/aggregates/regions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionQueryParams {
    /// Comma-separated years.
    pub years: Option<String>,
    /// Comma-separated region labels.
    pub regions: Option<String>,
    /// Keep this many regions and fold the rest into `OTHER`.
    pub top: Option<usize>,
}

impl RegionQueryParams {
    /// See [`FilterQueryParams::selection`].
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid year.
    pub fn selection(&self) -> Result<FilterSelection, String> {
        parse_selection(self.years.as_deref(), self.regions.as_deref())
    }
}

/// Query parameters for `GET /api/records`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQueryParams {
    /// Comma-separated years.
    pub years: Option<String>,
    /// Comma-separated region labels.
    pub regions: Option<String>,
    /// Page size.
    pub limit: Option<usize>,
    /// Records to skip.
    pub offset: Option<usize>,
}

impl RecordsQueryParams {
    /// See [`FilterQueryParams::selection`].
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid year.
    pub fn selection(&self) -> Result<FilterSelection, String> {
        parse_selection(self.years.as_deref(), self.regions.as_deref())
    }
}

/// Builds a selection from comma-separated years and regions.
///
/// # Errors
///
/// Returns a message naming the first value in `years` that is not an
/// integer.
pub fn parse_selection(
    years: Option<&str>,
    regions: Option<&str>,
) -> Result<FilterSelection, String> {
    let years = split_list(years)
        .map(|y| {
            y.parse::<i32>()
                .map_err(|_| format!("Invalid year: {y:?}"))
        })
        .collect::<Result<BTreeSet<i32>, String>>()?;

    Ok(FilterSelection::new(years, split_list(regions)))
}

fn split_list(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `GET /api/filters` response: the option lists for the filter controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFilters {
    /// Id of the loaded source.
    pub source_id: String,
    /// Name of the loaded source.
    pub source_name: String,
    /// Records in the loaded dataset.
    pub record_count: usize,
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// Distinct regions, ascending.
    pub regions: Vec<String>,
}

/// `GET /api/metrics` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetrics {
    /// Records matching the filter.
    pub record_count: usize,
    /// Headline metrics of the matching records.
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// `GET /api/records` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRecords {
    /// Records matching the filter, before paging.
    pub total: usize,
    /// Offset of the first returned record.
    pub offset: usize,
    /// Page size used.
    pub limit: usize,
    /// The page, most recent first.
    pub records: Vec<Record>,
}

/// `POST /api/ai/ask` request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    /// The question.
    pub question: String,
    /// Filter applied before building the context.
    #[serde(flatten)]
    pub selection: FilterSelection,
}

/// `POST /api/ai/ask` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAnswer {
    /// The model's reply.
    pub answer: String,
    /// Provider/model that produced it.
    pub provider: String,
    /// Records shown to the model.
    pub rows_included: usize,
    /// Records matching the filter.
    pub rows_available: usize,
    /// Whether the reply hit the output token limit.
    pub truncated: bool,
}
