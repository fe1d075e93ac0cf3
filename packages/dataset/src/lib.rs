#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalization of raw incident tables into typed datasets.
//!
//! [`normalize`] is the only entry point. It resolves the source's columns
//! to [`Field`]s, parses every row and never drops one: bad dates become
//! absent, bad counts become zero, and each such cell is reported as a
//! [`ParseWarning`]. Only structural problems with the table as a whole
//! fail the load.

pub mod parsing;

use std::collections::BTreeMap;

use casewatch_dataset_models::{
    ColumnMapping, Dataset, DateOrder, Field, ParseWarning, RawTable, Record, WarningKind, normalize_label,
};
use thiserror::Error;

use crate::parsing::{detect_date_order, parse_count, parse_event_date};

/// Structural problems that prevent a table from being loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The table has no header row.
    #[error("Table has no header row")]
    MissingHeader,

    /// The table has a header but no data rows.
    #[error("Table has no data rows")]
    NoRows,

    /// One or more required fields have no matching column.
    #[error("Missing required column(s): {}", format_fields(.columns))]
    MissingColumns {
        /// Every required field that could not be resolved.
        columns: Vec<Field>,
    },
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A successfully normalized table plus the per-cell warnings that were
/// absorbed along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOutcome {
    /// The normalized records, in source order.
    pub dataset: Dataset,
    /// Cells that were substituted (absent date or zero count).
    pub warnings: Vec<ParseWarning>,
}

impl NormalizeOutcome {
    /// Total number of absorbed warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Warning counts per field.
    #[must_use]
    pub fn warnings_by_field(&self) -> BTreeMap<Field, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.warnings {
            *counts.entry(warning.field).or_insert(0) += 1;
        }
        counts
    }
}

/// Normalizes `table` into a [`Dataset`].
///
/// Headers are matched against `mapping` case- and whitespace-insensitively.
/// Region, subregion and description labels are normalized with
/// [`normalize_label`]; empty labels are absent. Optional columns that are
/// missing from the table simply leave their field absent on every record.
/// Slash dates are read in `date_order`; [`DateOrder::Auto`] picks one order
/// for the whole date column with [`detect_date_order`].
///
/// # Errors
///
/// * [`SchemaError::MissingHeader`] if there is no header row
/// * [`SchemaError::NoRows`] if there are no data rows
/// * [`SchemaError::MissingColumns`] naming every unresolved required field
pub fn normalize(
    table: &RawTable,
    mapping: &ColumnMapping,
    date_order: DateOrder,
) -> Result<NormalizeOutcome, SchemaError> {
    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SchemaError::MissingHeader);
    }

    let columns = mapping.resolve(&table.headers);

    let missing: Vec<Field> = Field::all()
        .iter()
        .copied()
        .filter(|f| f.is_required() && !columns.contains_key(f))
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { columns: missing });
    }

    if table.rows.is_empty() {
        return Err(SchemaError::NoRows);
    }

    let date_order = match date_order {
        DateOrder::Auto => {
            let date_col = columns.get(&Field::EventDate).copied();
            let detected = detect_date_order(
                (0..table.rows.len())
                    .filter_map(|row| date_col.and_then(|col| table.cell(row, col))),
            );
            log::debug!("Detected {detected} date order");
            detected
        }
        explicit => explicit,
    };

    let mut records = Vec::with_capacity(table.rows.len());
    let mut warnings = Vec::new();

    for row in 0..table.rows.len() {
        let cell = |field: Field| {
            columns
                .get(&field)
                .and_then(|&col| table.cell(row, col))
                .unwrap_or("")
        };

        let raw_date = cell(Field::EventDate);
        let event_date = parse_event_date(raw_date, date_order).unwrap_or_else(|kind| {
            warnings.push(warning(row, Field::EventDate, raw_date, kind));
            None
        });

        let raw_count = cell(Field::Count);
        let count = parse_count(raw_count).unwrap_or_else(|kind| {
            warnings.push(warning(row, Field::Count, raw_count, kind));
            0
        });

        records.push(Record {
            row,
            event_date,
            region: label(cell(Field::Region)),
            subregion: label(cell(Field::Subregion)),
            description: label(cell(Field::Description)),
            count,
        });
    }

    log::debug!(
        "Normalized {} rows with {} warning(s)",
        records.len(),
        warnings.len()
    );

    Ok(NormalizeOutcome {
        dataset: Dataset::new(records),
        warnings,
    })
}

fn label(raw: &str) -> Option<String> {
    let normalized = normalize_label(raw);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn warning(row: usize, field: Field, value: &str, kind: WarningKind) -> ParseWarning {
    ParseWarning {
        row,
        field,
        value: value.to_string(),
        kind,
    }
}
