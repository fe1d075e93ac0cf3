//! Config-driven source definition.
//!
//! A [`SourceDefinition`] captures everything needed to load one incident
//! CSV. Definitions ship as TOML files embedded in the binary (see
//! [`registry`](crate::registry)) or are built ad hoc from a path.

use std::path::{Path, PathBuf};

use casewatch_dataset_models::{ColumnMapping, DateOrder};
use serde::{Deserialize, Serialize};

use crate::SourceError;

/// A loadable incident CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"trata_de_personas"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// What the data covers and where it comes from.
    #[serde(default)]
    pub description: Option<String>,
    /// Single-byte field delimiter. Defaults to a comma.
    #[serde(default)]
    pub delimiter: Option<String>,
    /// How slash dates are read. Detected from the data when unset.
    #[serde(default)]
    pub date_order: DateOrder,
    /// Where the bytes live.
    pub location: SourceLocation,
    /// Header aliases layered over the defaults, per field.
    #[serde(default)]
    pub columns: Option<ColumnMapping>,
}

/// Where a source's bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceLocation {
    /// A local file, relative to the working directory unless absolute.
    File {
        /// Path to the CSV.
        path: PathBuf,
        /// Whether the file is gzip-compressed.
        #[serde(default)]
        gzip: bool,
    },
    /// An HTTP(S) download.
    Url {
        /// URL of the CSV.
        url: String,
        /// Whether the response body is gzip-compressed.
        #[serde(default)]
        gzip: bool,
    },
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (target, gzip) = match self {
            Self::File { path, gzip } => (path.display().to_string(), *gzip),
            Self::Url { url, gzip } => (url.clone(), *gzip),
        };
        write!(f, "{target}")?;
        if gzip {
            write!(f, " (gzip)")?;
        }
        Ok(())
    }
}

impl SourceDefinition {
    /// Builds an ad hoc definition for a local file.
    ///
    /// `.gz` files are read as gzip and `.tsv` files (before any `.gz`) as
    /// tab-delimited.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let lower = file_name.to_ascii_lowercase();
        let gzip = lower.ends_with(".gz");
        let tsv = lower.trim_end_matches(".gz").ends_with(".tsv");

        Self {
            id: "file".to_string(),
            name: file_name,
            description: None,
            delimiter: tsv.then(|| "\t".to_string()),
            date_order: DateOrder::Auto,
            location: SourceLocation::File {
                path: path.to_path_buf(),
                gzip,
            },
            columns: None,
        }
    }

    /// The delimiter as a byte.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidDefinition`] if the configured
    /// delimiter is not exactly one ASCII character.
    pub fn delimiter_byte(&self) -> Result<u8, SourceError> {
        match self.delimiter.as_deref() {
            None => Ok(b','),
            Some(d) if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            Some(d) => Err(SourceError::InvalidDefinition {
                message: format!(
                    "{}: delimiter must be a single ASCII character, got {d:?}",
                    self.id
                ),
            }),
        }
    }

    /// The default header aliases with this source's overrides applied.
    #[must_use]
    pub fn column_mapping(&self) -> ColumnMapping {
        let defaults = ColumnMapping::default();
        match &self.columns {
            Some(overrides) => defaults.merged(overrides),
            None => defaults,
        }
    }
}

/// Parses a source definition from TOML.
///
/// # Errors
///
/// Returns [`SourceError::Toml`] if the TOML is malformed or does not match
/// the definition schema.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}

#[cfg(test)]
mod tests {
    use casewatch_dataset_models::Field;

    use super::*;

    #[test]
    fn parses_url_source_with_column_overrides() {
        let def = parse_source_toml(
            r#"
            id = "example"
            name = "Example"
            delimiter = ";"
            date_order = "day_first"

            [location]
            type = "url"
            url = "https://example.org/incidents.csv.gz"
            gzip = true

            [columns]
            count = ["TOTAL"]
            "#,
        )
        .unwrap();

        assert_eq!(def.delimiter_byte().unwrap(), b';');
        assert_eq!(def.date_order, DateOrder::DayFirst);
        assert_eq!(
            def.location,
            SourceLocation::Url {
                url: "https://example.org/incidents.csv.gz".to_string(),
                gzip: true,
            }
        );

        let mapping = def.column_mapping();
        assert_eq!(mapping.aliases(Field::Count), ["TOTAL".to_string()]);
        assert!(!mapping.aliases(Field::Region).is_empty());
    }

    #[test]
    fn defaults_to_comma_and_no_overrides() {
        let def = parse_source_toml(
            r#"
            id = "local"
            name = "Local"

            [location]
            type = "file"
            path = "data/local.csv"
            "#,
        )
        .unwrap();

        assert_eq!(def.delimiter_byte().unwrap(), b',');
        assert_eq!(def.date_order, DateOrder::Auto);
        assert_eq!(def.column_mapping(), ColumnMapping::default());
        assert_eq!(def.location.to_string(), "data/local.csv");
    }

    #[test]
    fn rejects_multi_character_delimiter() {
        let mut def = SourceDefinition::from_path("a.csv");
        def.delimiter = Some("||".to_string());
        assert!(matches!(
            def.delimiter_byte(),
            Err(SourceError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn rejects_unknown_location_type() {
        let err = parse_source_toml(
            r#"
            id = "x"
            name = "X"
            [location]
            type = "ftp"
            url = "ftp://example.org"
            "#,
        );
        assert!(matches!(err, Err(SourceError::Toml(_))));
    }

    #[test]
    fn infers_gzip_and_tab_from_file_name() {
        let def = SourceDefinition::from_path("/tmp/export.TSV.gz");
        assert_eq!(def.name, "export.TSV.gz");
        assert_eq!(def.delimiter_byte().unwrap(), b'\t');
        assert!(matches!(def.location, SourceLocation::File { gzip: true, .. }));
    }
}
