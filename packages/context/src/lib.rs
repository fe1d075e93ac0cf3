#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bounded dataset context for text-generation requests.
//!
//! A request is assembled from four parts, always in this order:
//!
//! 1. a fixed instructional preamble ([`PREAMBLE`])
//! 2. corpus statistics ([`build_stats`])
//! 3. a row excerpt capped by row count and characters ([`build_excerpt`])
//! 4. the user's question, verbatim
//!
//! Only the question is unbounded; the rest of the text has a ceiling set
//! by [`ContextBudget`] no matter how large the dataset is.

pub mod excerpt;
pub mod request;
pub mod stats;

use serde::{Deserialize, Serialize};

pub use excerpt::{Excerpt, build_excerpt};
pub use request::{PREAMBLE, assemble_request_text, build_request_text};
pub use stats::{ContextStats, LabelCount, build_stats};

/// Size limits for the context attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBudget {
    /// Maximum number of records rendered into the excerpt.
    pub max_rows: usize,
    /// Maximum number of characters of the rendered excerpt.
    pub max_chars: usize,
    /// Number of entries in each top-N frequency list.
    pub top_n: usize,
}

impl ContextBudget {
    /// Default maximum excerpt rows.
    pub const DEFAULT_MAX_ROWS: usize = 100;
    /// Default maximum excerpt characters.
    pub const DEFAULT_MAX_CHARS: usize = 12_000;
    /// Default top-N list length.
    pub const DEFAULT_TOP_N: usize = 5;
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            max_rows: Self::DEFAULT_MAX_ROWS,
            max_chars: Self::DEFAULT_MAX_CHARS,
            top_n: Self::DEFAULT_TOP_N,
        }
    }
}
