#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared terminal utilities for the casewatch binaries.
//!
//! Provides an `indicatif`-backed progress bar behind the
//! [`ProgressCallback`] trait, [`init_logger`] which sets up
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while progress bars redraw, and a few `dialoguer` prompt helpers used by
//! the interactive modes.

use std::sync::Arc;
use std::time::Duration;

use casewatch_source::progress::ProgressCallback;
use dialoguer::{Input, MultiSelect};
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style to switch to once `set_total()` provides a known length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Creates a progress bar for reading or downloading a source.
    ///
    /// Starts as a spinner (a download may not announce its size) and
    /// transitions to a byte bar with ETA once
    /// [`ProgressCallback::set_total()`] is called.
    #[must_use]
    pub fn bytes_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {bytes}/{total_bytes} {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        // Switch from spinner to bar style now that we know the total.
        self.bar.set_style(self.bar_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}

/// Multi-select over `labels` with everything pre-selected.
///
/// Returns the selected labels. Deselecting everything returns an empty
/// list, which callers treat as "no constraint".
///
/// # Errors
///
/// Returns [`dialoguer::Error`] if the terminal interaction fails.
pub fn select_all_by_default(
    prompt: &str,
    labels: &[String],
) -> Result<Vec<String>, dialoguer::Error> {
    if labels.is_empty() {
        return Ok(Vec::new());
    }

    let defaults = vec![true; labels.len()];
    let selected = MultiSelect::new()
        .with_prompt(format!("{prompt} (space=toggle, a=all, enter=confirm)"))
        .items(labels)
        .defaults(&defaults)
        .max_length(20)
        .interact()?;

    Ok(selected.into_iter().map(|i| labels[i].clone()).collect())
}

/// Prompts for an optional positive number. Empty input means `None`.
///
/// # Errors
///
/// Returns [`dialoguer::Error`] if the terminal interaction fails.
pub fn prompt_optional_usize(prompt: &str) -> Result<Option<usize>, dialoguer::Error> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|s: &String| -> Result<(), &str> {
            if s.trim().is_empty() || s.trim().parse::<usize>().is_ok() {
                Ok(())
            } else {
                Err("Enter a whole number or leave empty")
            }
        })
        .interact_text()?;

    Ok(input.trim().parse().ok())
}
