#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record and dataset types.
//!
//! A [`RawTable`] is whatever a loader produced: a header row plus string
//! cells. Normalization turns it into a [`Dataset`] of typed [`Record`]s
//! addressed by [`Field`] rather than by the source's column names.

use std::collections::BTreeMap;

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A logical field of an incident record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    /// Date the incident happened.
    EventDate,
    /// Top-level location label (e.g. a department or state).
    Region,
    /// Finer-grained location label (e.g. a municipality).
    Subregion,
    /// Offense or incident type description.
    Description,
    /// Number of cases attributed to the row.
    Count,
}

impl Field {
    /// All fields, in canonical column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::EventDate,
            Self::Region,
            Self::Subregion,
            Self::Description,
            Self::Count,
        ]
    }

    /// Whether a table without this column cannot be loaded at all.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::EventDate | Self::Region | Self::Count)
    }
}

/// Normalizes a header or category label: trims, collapses internal
/// whitespace runs to a single space and upper-cases.
#[must_use]
pub fn normalize_label(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// A rectangular table as produced by a loader, before any typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Header row, verbatim.
    pub headers: Vec<String>,
    /// Data rows. Rows may be shorter than the header; missing cells read
    /// as empty.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a table from a header row and data rows.
    #[must_use]
    pub const fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Returns the cell at `row`/`column`, or `None` past the end of a
    /// short row.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// Accepted header names for each [`Field`].
///
/// Headers and aliases are compared after [`normalize_label`], so
/// `" fecha  hecho"` matches the alias `"FECHA HECHO"`. Aliases are tried in
/// order and the first matching header wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    aliases: BTreeMap<Field, Vec<String>>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        let mut aliases = BTreeMap::new();
        aliases.insert(
            Field::EventDate,
            vec![
                "EVENT_DATE".to_string(),
                "EVENT DATE".to_string(),
                "DATE".to_string(),
                "FECHA HECHO".to_string(),
                "FECHA".to_string(),
            ],
        );
        aliases.insert(
            Field::Region,
            vec!["REGION".to_string(), "DEPARTAMENTO".to_string()],
        );
        aliases.insert(
            Field::Subregion,
            vec!["SUBREGION".to_string(), "MUNICIPIO".to_string()],
        );
        aliases.insert(
            Field::Description,
            vec![
                "DESCRIPTION".to_string(),
                "DESCRIPCION CONDUCTA".to_string(),
                "DESCRIPCIÓN CONDUCTA".to_string(),
                "DELITO".to_string(),
            ],
        );
        aliases.insert(
            Field::Count,
            vec!["COUNT".to_string(), "CANTIDAD".to_string()],
        );
        Self { aliases }
    }
}

impl ColumnMapping {
    /// Replaces the accepted header names for `field`.
    #[must_use]
    pub fn with_aliases(mut self, field: Field, aliases: Vec<String>) -> Self {
        self.aliases.insert(field, aliases);
        self
    }

    /// Layers `overrides` on top of this mapping, field by field.
    #[must_use]
    pub fn merged(mut self, overrides: &Self) -> Self {
        for (field, aliases) in &overrides.aliases {
            self.aliases.insert(*field, aliases.clone());
        }
        self
    }

    /// Accepted header names for `field`.
    #[must_use]
    pub fn aliases(&self, field: Field) -> &[String] {
        self.aliases.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Resolves each field to a column index in `headers`.
    ///
    /// Fields with no matching header are absent from the result.
    #[must_use]
    pub fn resolve(&self, headers: &[String]) -> BTreeMap<Field, usize> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();

        let mut resolved = BTreeMap::new();
        for field in Field::all() {
            let found = self.aliases(*field).iter().find_map(|alias| {
                let alias = normalize_label(alias);
                normalized.iter().position(|h| *h == alias)
            });
            if let Some(index) = found {
                resolved.insert(*field, index);
            }
        }
        resolved
    }
}

/// How ambiguous slash dates such as `05/02/2015` are read.
///
/// Unambiguous layouts (ISO, RFC 3339) parse the same under every order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum DateOrder {
    /// Chosen once per date column: day-first if any cell only reads that
    /// way, month-first otherwise.
    #[default]
    Auto,
    /// `MM/DD/YYYY`.
    MonthFirst,
    /// `DD/MM/YYYY`.
    DayFirst,
}

/// One normalized incident row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Zero-based index of the data row in the source table.
    pub row: usize,
    /// Parsed event date. `None` when missing or unparseable.
    pub event_date: Option<NaiveDate>,
    /// Normalized region label.
    pub region: Option<String>,
    /// Normalized subregion label.
    pub subregion: Option<String>,
    /// Normalized description label.
    pub description: Option<String>,
    /// Case count. Malformed or missing counts are stored as zero.
    pub count: u64,
}

impl Record {
    /// Calendar year of the event date.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.event_date.map(|d| d.year())
    }
}

/// An ordered, immutable sequence of [`Record`]s.
///
/// Operations that narrow or reorder a dataset return a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Wraps `records`, keeping their order.
    #[must_use]
    pub const fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The records in source order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// The first `n` records (all of them if `n` exceeds the length).
    #[must_use]
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Why a cell could not be taken at face value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WarningKind {
    /// The cell had text that is not a valid value for the field.
    Unparseable,
    /// The count was a number below zero.
    Negative,
    /// The cell was empty where a value gets substituted.
    Missing,
}

/// A non-fatal, per-record problem found while normalizing.
///
/// The record is kept: dates become absent and counts become zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseWarning {
    /// Zero-based data row index.
    pub row: usize,
    /// Field the cell belongs to.
    pub field: Field,
    /// Raw cell text.
    pub value: String,
    /// What was wrong with it.
    pub kind: WarningKind,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}: {} {} value '{}'",
            self.row, self.kind, self.field, self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn normalizes_labels() {
        assert_eq!(normalize_label("  fecha \t hecho "), "FECHA HECHO");
        assert_eq!(normalize_label("Bogotá D.C."), "BOGOTÁ D.C.");
        assert_eq!(normalize_label("   "), "");
    }

    #[test]
    fn resolves_original_headers() {
        let mapping = ColumnMapping::default();
        let resolved = mapping.resolve(&headers(&[
            " fecha hecho",
            "Departamento ",
            "MUNICIPIO",
            "cantidad",
        ]));
        assert_eq!(resolved.get(&Field::EventDate), Some(&0));
        assert_eq!(resolved.get(&Field::Region), Some(&1));
        assert_eq!(resolved.get(&Field::Subregion), Some(&2));
        assert_eq!(resolved.get(&Field::Count), Some(&3));
        assert_eq!(resolved.get(&Field::Description), None);
    }

    #[test]
    fn overrides_replace_aliases() {
        let overrides = ColumnMapping::default()
            .with_aliases(Field::Region, vec!["state".to_string()]);
        let mapping = ColumnMapping::default().merged(&overrides);
        let resolved = mapping.resolve(&headers(&["STATE", "DEPARTAMENTO"]));
        assert_eq!(resolved.get(&Field::Region), Some(&0));
    }

    #[test]
    fn required_fields() {
        let required: Vec<Field> = Field::all()
            .iter()
            .copied()
            .filter(|f| f.is_required())
            .collect();
        assert_eq!(
            required,
            vec![Field::EventDate, Field::Region, Field::Count]
        );
    }

    #[test]
    fn field_names_are_snake_case() {
        assert_eq!(Field::EventDate.to_string(), "event_date");
        assert_eq!("subregion".parse::<Field>().unwrap(), Field::Subregion);
    }

    #[test]
    fn head_clamps_to_length() {
        let dataset: Dataset = (0..3)
            .map(|row| Record {
                row,
                event_date: None,
                region: None,
                subregion: None,
                description: None,
                count: 1,
            })
            .collect();
        assert_eq!(dataset.head(100).len(), 3);
        assert_eq!(dataset.head(2).len(), 2);
    }
}
