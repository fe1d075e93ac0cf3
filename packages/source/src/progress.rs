//! Progress reporting for source loading.
//!
//! Loading reports bytes read (file) or downloaded (URL). The
//! [`ProgressCallback`] trait keeps this crate free of any terminal
//! rendering; the CLI plugs in `indicatif` bars and the server passes
//! [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a running load.
///
/// Implementations must be `Send + Sync` so one callback can be shared via
/// `Arc` between the caller and an in-flight download.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance for convenient use.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
