//! Remote video fetching.
//!
//! Bodies are streamed to disk chunk by chunk so large videos never sit in
//! memory, and suspiciously small results are rejected so an error page or
//! empty body is never mistaken for video content.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::{MediaError, MediaResult};

/// Per-download request timeout.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Minimum plausible size for downloaded video content (bytes).
pub const MIN_DOWNLOAD_BYTES: u64 = 1000;

/// Build the HTTP client used for downloads.
pub fn download_client() -> MediaResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| MediaError::download_failed(format!("Failed to build HTTP client: {e}")))
}

/// Stream a remote video to a local file.
///
/// Fails on non-success HTTP status and on implausibly small bodies; the
/// partial file is removed before the error is returned.
pub async fn fetch_to_file(
    client: &reqwest::Client,
    url: &str,
    path: impl AsRef<Path>,
) -> MediaResult<()> {
    let path = path.as_ref();
    info!(url, path = %path.display(), "Downloading source video");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| MediaError::download_failed(format!("Request to {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MediaError::download_failed(format!(
            "{url} returned HTTP {status}"
        )));
    }

    // Any failure past this point leaves a partial file on disk; callers
    // like the staging area treat existing files as complete, so every
    // error exit removes it.
    let written = match write_body(response, path, url).await {
        Ok(written) => written,
        Err(e) => {
            remove_partial(path).await;
            return Err(e);
        }
    };

    if written < MIN_DOWNLOAD_BYTES {
        // Likely an error page or truncated body saved as "video"
        remove_partial(path).await;
        return Err(MediaError::download_failed(format!(
            "{url} produced only {written} bytes"
        )));
    }

    info!(url, bytes = written, "Download complete");
    Ok(())
}

async fn write_body(response: reqwest::Response, path: &Path, url: &str) -> MediaResult<u64> {
    let mut file = File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            MediaError::download_failed(format!("Stream from {url} interrupted: {e}"))
        })?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove partial download");
        }
    }
}
