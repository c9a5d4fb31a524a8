//! HTTP download of the client library archive.
//!
//! The body is streamed into `<dest>.tmp` and renamed into place once the
//! last chunk is written, so `dest` only ever holds a complete download. The
//! status line is checked before any file is created. There are no retries:
//! a failed download fails the run.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use futures_util::StreamExt;
use reqwest::StatusCode;
use tokio::io::AsyncWriteExt;

use crate::errors::ProvisionError;

/// Minimum interval between progress redraws in milliseconds.
const PROGRESS_INTERVAL_MS: u128 = 250;

/// Downloads `url` to `dest` and returns the number of bytes written.
///
/// Only `200 OK` counts as success; any other status fails before anything is
/// written to disk.
///
/// # Errors
///
/// Returns an error if:
/// - The connection cannot be established
/// - The server answers with a status other than 200
/// - Reading the body or writing the file fails
pub async fn download_file(url: &str, dest: &Path) -> Result<u64, ProvisionError> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| ProvisionError::download_with_source("failed to create HTTP client", e))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProvisionError::download_with_source(format!("failed to connect to {url}"), e))?;

    let status = response.status();
    tracing::debug!(%url, %status, "received response");
    if status != StatusCode::OK {
        return Err(ProvisionError::download(format!(
            "failed to download file from {url}: HTTP {status}"
        )));
    }

    let temp_path = dest.with_extension("tmp");
    let downloaded = match write_body(response, url, &temp_path).await {
        Ok(downloaded) => downloaded,
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&temp_path, dest).await.map_err(|e| {
        ProvisionError::io(
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                dest.display()
            ),
            e,
        )
    })?;

    tracing::debug!(dest = %dest.display(), bytes = downloaded, "download complete");
    Ok(downloaded)
}

/// Streams the response body into `path`, drawing progress on stdout.
async fn write_body(
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, ProvisionError> {
    let mut progress = Progress::new(response.content_length());

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| ProvisionError::io(format!("failed to create {}", path.display()), e))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            ProvisionError::download_with_source(format!("failed to read body from {url}"), e)
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| ProvisionError::io(format!("failed to write {}", path.display()), e))?;
        progress.advance(chunk.len() as u64);
    }

    file.flush()
        .await
        .map_err(|e| ProvisionError::io(format!("failed to flush {}", path.display()), e))?;

    progress.finish();
    Ok(progress.downloaded)
}

/// Single-line text progress display.
struct Progress {
    total: Option<u64>,
    downloaded: u64,
    started: Instant,
    last_draw: Instant,
}

impl Progress {
    fn new(total: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            total,
            downloaded: 0,
            started: now,
            last_draw: now,
        }
    }

    fn advance(&mut self, bytes: u64) {
        self.downloaded += bytes;
        let now = Instant::now();
        if now.duration_since(self.last_draw).as_millis() >= PROGRESS_INTERVAL_MS {
            self.draw();
            self.last_draw = now;
        }
    }

    fn finish(&self) {
        self.draw();
        println!();
    }

    fn draw(&self) {
        let line = format_progress(
            self.downloaded,
            self.total,
            self.started.elapsed().as_secs_f64(),
        );
        print!("\r{line}     ");
        let _ = std::io::stdout().flush();
    }
}

/// Formats one progress line, e.g. `1.50 MB/3.00 MB (50%) 512.00 KB/s`.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn format_progress(downloaded: u64, total: Option<u64>, elapsed_secs: f64) -> String {
    let speed = if elapsed_secs > 0.0 {
        downloaded as f64 / elapsed_secs
    } else {
        0.0
    };
    let speed_str = format_speed(speed);
    let downloaded_str = format_bytes(downloaded);

    match total {
        Some(total) if total > 0 => {
            let percent = (downloaded as f64 / total as f64 * 100.0).min(100.0) as u8;
            let total_str = format_bytes(total);
            format!("{downloaded_str}/{total_str} ({percent}%) {speed_str}")
        }
        _ => format!("{downloaded_str} {speed_str}"),
    }
}

/// Formats bytes into a human-readable string (KB, MB, GB).
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Formats speed (bytes/sec) into a human-readable string.
fn format_speed(speed: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    if speed >= MB {
        format!("{:.2} MB/s", speed / MB)
    } else if speed >= KB {
        format!("{:.2} KB/s", speed / KB)
    } else {
        format!("{speed:.0} B/s")
    }
}
