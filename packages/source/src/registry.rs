//! Source registry: definitions embedded from `packages/source/sources/`.
//!
//! Each `.toml` file there is baked into the binary at compile time via
//! [`include_str!`]. Adding a source means adding a file and a line below.

use crate::SourceError;
use crate::source_def::{SourceDefinition, parse_source_toml};

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[
    (
        "trata_de_personas",
        include_str!("../sources/trata_de_personas.toml"),
    ),
    ("sample", include_str!("../sources/sample.toml")),
];

/// Id of the source used when none is chosen.
pub const DEFAULT_SOURCE_ID: &str = "trata_de_personas";

/// Returns all configured source definitions, parsed from embedded TOML.
///
/// # Errors
///
/// Returns [`SourceError::Toml`] if an embedded config is malformed.
pub fn all_sources() -> Result<Vec<SourceDefinition>, SourceError> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).inspect_err(|e| log::error!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a configured source by id.
///
/// # Errors
///
/// Returns [`SourceError::UnknownSource`] if no source has this id.
pub fn find_source(id: &str) -> Result<SourceDefinition, SourceError> {
    all_sources()?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SourceError::UnknownSource { id: id.to_string() })
}
