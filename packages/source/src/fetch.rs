//! Reading source bytes from disk or over HTTP.

use std::io::Read as _;
use std::path::Path;
use std::sync::Arc;

use crate::progress::ProgressCallback;
use crate::{SourceError, SourceLocation};

/// Reads the raw (decompressed) bytes behind `location`.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read or the gzip
/// stream is corrupt, and [`SourceError::Http`] if the download fails or
/// returns a non-success status.
pub async fn fetch_bytes(
    location: &SourceLocation,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<u8>, SourceError> {
    let (bytes, gzip) = match location {
        SourceLocation::File { path, gzip } => (read_file(path, progress).await?, *gzip),
        SourceLocation::Url { url, gzip } => (download(url, progress).await?, *gzip),
    };

    if gzip {
        gunzip(&bytes)
    } else {
        Ok(bytes)
    }
}

async fn read_file(
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<u8>, SourceError> {
    progress.set_message(format!("Reading {}", path.display()));
    let bytes = tokio::fs::read(path).await?;
    progress.set_total(bytes.len() as u64);
    progress.inc(bytes.len() as u64);
    progress.finish(format!("Read {} bytes", bytes.len()));
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

async fn download(
    url: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<u8>, SourceError> {
    progress.set_message(format!("Downloading {url}"));
    let mut response = reqwest::get(url).await?.error_for_status()?;

    if let Some(len) = response.content_length() {
        progress.set_total(len);
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        progress.inc(chunk.len() as u64);
        bytes.extend_from_slice(&chunk);
    }

    progress.finish(format!("Downloaded {} bytes", bytes.len()));
    log::debug!("Downloaded {} bytes from {url}", bytes.len());
    Ok(bytes)
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, SourceError> {
    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    log::debug!(
        "Decompressed {} bytes to {}",
        bytes.len(),
        decompressed.len()
    );
    Ok(decompressed)
}
