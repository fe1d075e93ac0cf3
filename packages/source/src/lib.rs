#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident CSV sources.
//!
//! A [`SourceDefinition`] says where a CSV lives (local file or URL,
//! optionally gzip-compressed), how it is delimited and which headers map
//! to which fields. [`load`] fetches the bytes, parses them into a
//! [`RawTable`](casewatch_dataset_models::RawTable) and normalizes that into
//! a dataset.

pub mod csv_table;
pub mod fetch;
pub mod progress;
pub mod registry;
pub mod source_def;

use std::sync::Arc;

use casewatch_dataset::{NormalizeOutcome, SchemaError, normalize};

use crate::progress::ProgressCallback;
pub use crate::source_def::{SourceDefinition, SourceLocation};

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (file read, decompression).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// A source definition could not be parsed.
    #[error("Source definition error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The table does not have the required shape.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// No source with this id is registered.
    #[error("Unknown source: {id}")]
    UnknownSource {
        /// The requested id.
        id: String,
    },

    /// A source definition is well-formed TOML but not usable.
    #[error("Invalid source definition: {message}")]
    InvalidDefinition {
        /// Description of what went wrong.
        message: String,
    },
}

/// Fetches, parses and normalizes `source`.
///
/// Per-cell problems are absorbed and returned as warnings in the outcome;
/// a summary is logged at `warn` level.
///
/// # Errors
///
/// Returns [`SourceError`] if the data cannot be fetched or parsed, or if
/// the table is structurally unusable.
pub async fn load(
    source: &SourceDefinition,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<NormalizeOutcome, SourceError> {
    log::info!("[{}] Loading {}", source.id, source.location);

    let bytes = fetch::fetch_bytes(&source.location, progress).await?;
    let table = csv_table::parse_csv(&bytes, source.delimiter_byte()?)?;
    let outcome = normalize(&table, &source.column_mapping(), source.date_order)?;

    log::info!(
        "[{}] Loaded {} records",
        source.id,
        outcome.dataset.len()
    );

    if outcome.warning_count() > 0 {
        let per_field = outcome
            .warnings_by_field()
            .into_iter()
            .map(|(field, count)| format!("{field}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        log::warn!(
            "[{}] {} cell(s) substituted during normalization ({per_field})",
            source.id,
            outcome.warning_count()
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::path::PathBuf;

    use casewatch_dataset_models::WarningKind;

    use super::*;
    use crate::progress::null_progress;

    fn temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "casewatch_source_{}_{name}",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_local_csv_end_to_end() {
        let path = temp_csv(
            "load.csv",
            "FECHA HECHO,DEPARTAMENTO,MUNICIPIO,DESCRIPCION CONDUCTA,CANTIDAD\n\
             01/15/2019,antioquia,medellín,TRATA DE PERSONAS,2\n\
             not a date,valle,cali,TRATA DE PERSONAS,x\n",
        );
        let source = SourceDefinition::from_path(&path);

        let outcome = load(&source, &null_progress()).await.unwrap();
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.warning_count(), 2);
        assert_eq!(outcome.dataset.records()[0].year(), Some(2019));
        assert_eq!(outcome.dataset.records()[1].count, 0);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn loads_bundled_sample() {
        let mut source = registry::find_source("sample").unwrap();
        source.location = SourceLocation::File {
            path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../../data/sample_incidents.csv"),
            gzip: false,
        };

        let outcome = load(&source, &null_progress()).await.unwrap();
        assert_eq!(outcome.dataset.len(), 15);
        // Only the "NO REPORTA" count; an empty date is absent, not a warning.
        assert_eq!(outcome.warning_count(), 1);
        assert!(outcome.dataset.iter().any(|r| r.event_date.is_none()));
    }

    #[tokio::test]
    async fn reads_bundled_sample_dates_day_first() {
        let mut source = registry::find_source("sample").unwrap();
        source.location = SourceLocation::File {
            path: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../../data/sample_incidents.csv"),
            gzip: false,
        };

        let outcome = load(&source, &null_progress()).await.unwrap();
        let date = |row: usize| {
            outcome.dataset.records()[row]
                .event_date
                .map(|d| d.to_string())
        };
        assert_eq!(date(0).as_deref(), Some("2015-03-01"));
        assert_eq!(date(3).as_deref(), Some("2015-02-05"));
    }

    #[tokio::test]
    async fn ad_hoc_file_detects_day_first_dates() {
        let path = temp_csv(
            "day_first.csv",
            "FECHA HECHO,DEPARTAMENTO,CANTIDAD\n05/02/2015,VALLE,1\n22/11/2017,CAUCA,2\n",
        );
        let source = SourceDefinition::from_path(&path);

        let outcome = load(&source, &null_progress()).await.unwrap();
        let first = outcome.dataset.records()[0].event_date.map(|d| d.to_string());
        assert_eq!(first.as_deref(), Some("2015-02-05"));
        assert_eq!(outcome.warning_count(), 0);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn rows_of_empty_cells_are_reported() {
        let path = temp_csv(
            "blank_row.csv",
            "DATE,REGION,COUNT\n2019-01-01,A,1\n,,\n2020-01-01,B,2\n",
        );
        let source = SourceDefinition::from_path(&path);

        let outcome = load(&source, &null_progress()).await.unwrap();
        assert_eq!(outcome.dataset.len(), 3);
        assert_eq!(outcome.warning_count(), 1);
        assert_eq!(outcome.warnings[0].row, 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::Missing);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn surfaces_schema_errors() {
        let path = temp_csv("schema.csv", "A,B\n1,2\n");
        let source = SourceDefinition::from_path(&path);

        let err = load(&source, &null_progress()).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Schema(SchemaError::MissingColumns { .. })
        ));

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let source = SourceDefinition::from_path("/nonexistent/casewatch.csv");
        let err = load(&source, &null_progress()).await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
