//! Resumable HTTP artifact fetcher.
//!
//! Partial downloads live at the final target path; a session starts by
//! measuring what is already there and asking the server for the rest with
//! a byte-range request. Servers that ignore the range get a truncate-and-
//! restart instead, so the file can never end up stitched together from
//! mismatched responses.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::header;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use facelift_core::{
    ArtifactFetcher, CoreError, CoreResult, EventSender, ModelSpec, ProgressEvent,
    ensure_directory, format_speed,
};

use crate::meter::ProgressMeter;
use crate::retry::RetryPolicy;

/// `ArtifactFetcher` implementation backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
    /// Budget for each body-chunk read; a stall counts as a network error
    /// and therefore against the retry budget.
    chunk_timeout: Duration,
}

impl HttpFetcher {
    /// Fetcher with the default retry policy (5 attempts, 1s backoff
    /// factor) and a 10s connect timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    /// Fetcher with a custom retry policy.
    #[must_use]
    pub fn with_policy(policy: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            policy,
            chunk_timeout: Duration::from_secs(20),
        }
    }

    async fn download(&self, spec: &ModelSpec, events: &EventSender) -> CoreResult<()> {
        let target = spec.target_path();
        let mut last_error: Option<CoreError> = None;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                let delay = self.policy.backoff(attempt);
                tracing::warn!(
                    model = %spec.name,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "retrying download"
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(spec, &target, events).await {
                Ok(()) => return Ok(()),
                Err(err) if is_transient(&err) && attempt < self.policy.max_attempts => {
                    tracing::warn!(model = %spec.name, error = %err, "transient download failure");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::network("download failed")))
    }

    async fn attempt(
        &self,
        spec: &ModelSpec,
        target: &Path,
        events: &EventSender,
    ) -> CoreResult<()> {
        // Resume offset = whatever a previous session left behind.
        let mut offset = existing_len(target).await?;

        let mut request = self.client.get(&spec.source_url);
        if offset > 0 {
            tracing::info!(model = %spec.name, offset, "resuming partial download");
            request = request.header(header::RANGE, format!("bytes={offset}-"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| CoreError::network(e.to_string()))?;
        let status = response.status();

        if offset > 0 && status == StatusCode::RANGE_NOT_SATISFIABLE {
            // The partial file already spans the whole artifact.
            tracing::info!(model = %spec.name, "requested range past the end; nothing left to fetch");
            return Ok(());
        }
        if !status.is_success() {
            return Err(CoreError::network_with_status(
                format!("unexpected status {status} from {}", spec.source_url),
                status.as_u16(),
            ));
        }

        // Anything but 206 means the server sent the file from the start,
        // so the partial prefix must not be kept.
        let resumed = offset > 0 && status == StatusCode::PARTIAL_CONTENT;
        if offset > 0 && !resumed {
            tracing::warn!(model = %spec.name, "server ignored range request; restarting from zero");
            offset = 0;
        }
        let total = response.content_length().map(|remaining| offset + remaining);

        let mut file = if resumed {
            OpenOptions::new().append(true).open(target).await
        } else {
            fs::File::create(target).await
        }
        .map_err(|e| CoreError::filesystem(target, e))?;

        let mut meter = ProgressMeter::default_interval();
        let mut downloaded = offset;
        let mut stream = response.bytes_stream();

        loop {
            let chunk = match tokio::time::timeout(self.chunk_timeout, stream.next()).await {
                Err(_) => return Err(CoreError::network("read timed out")),
                Ok(None) => break,
                Ok(Some(Err(err))) => return Err(CoreError::network(err.to_string())),
                Ok(Some(Ok(chunk))) => chunk,
            };

            file.write_all(&chunk)
                .await
                .map_err(|e| CoreError::filesystem(target, e))?;
            downloaded += chunk.len() as u64;

            if let Some(tick) = meter.record(chunk.len() as u64) {
                let _ = events
                    .send(ProgressEvent::downloading(
                        &spec.name,
                        downloaded,
                        total,
                        format_speed(tick.speed_bps),
                    ))
                    .await;
            }
        }

        file.flush()
            .await
            .map_err(|e| CoreError::filesystem(target, e))?;

        if let Some(total) = total {
            if downloaded != total {
                return Err(CoreError::network(format!(
                    "connection closed early: got {downloaded} of {total} bytes"
                )));
            }
        }
        Ok(())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, spec: &ModelSpec, events: &EventSender) -> CoreResult<()> {
        ensure_directory(&spec.dest_dir)?;

        let result = self.download(spec, events).await;
        match &result {
            Ok(()) => {
                tracing::info!(model = %spec.name, "download complete");
                let _ = events.send(ProgressEvent::completed(&spec.name)).await;
            }
            Err(err) => {
                // The partial file stays behind for a future resume.
                tracing::error!(model = %spec.name, error = %err, "download failed");
                let _ = events
                    .send(ProgressEvent::error(&spec.name, err.to_string()))
                    .await;
            }
        }
        result
    }
}

/// Size of any partial file at the target path, 0 when absent.
async fn existing_len(target: &Path) -> CoreResult<u64> {
    match fs::metadata(target).await {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
        Err(e) => Err(CoreError::filesystem(target, e)),
    }
}

/// Whether another attempt may succeed: connection/read errors always,
/// HTTP failures only for the transient status set.
fn is_transient(err: &CoreError) -> bool {
    match err {
        CoreError::Network {
            status_code: Some(code),
            ..
        } => RetryPolicy::is_retryable_status(*code),
        CoreError::Network {
            status_code: None, ..
        } => true,
        _ => false,
    }
}
