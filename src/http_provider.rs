//! HTTP range provider
//!
//! Discovers the object size with a HEAD request and fetches each missing
//! gap with a ranged GET. Runs on the blocking reqwest client: a cache miss
//! blocks the reading thread until the bytes arrive.

use crate::config::LazyConfig;
use crate::error::{LazyError, Result};
use crate::models::{ByteRange, FileMetadata};
use crate::provider::RangeProvider;
use bytes::Bytes;
use http::header::{
    ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED, RANGE,
};
use http::{HeaderMap, StatusCode};
use reqwest::blocking::Client;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retry policy for failed fetches
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries
    pub max_retries: usize,
    /// Backoff durations in milliseconds for each retry attempt
    pub backoff_ms: Vec<u64>,
}

impl RetryPolicy {
    /// Create a new retry policy with exponential backoff from 100ms
    pub fn new(max_retries: usize) -> Self {
        Self::with_base(max_retries, 100)
    }

    /// Exponential backoff starting at `base_ms`: base, 2*base, 4*base, ...
    pub fn with_base(max_retries: usize, base_ms: u64) -> Self {
        let backoff_ms = (0..max_retries)
            .map(|i| base_ms.saturating_mul(2u64.saturating_pow(i as u32)))
            .collect();

        RetryPolicy {
            max_retries,
            backoff_ms,
        }
    }

    /// Whether the retry budget allows another attempt after `attempt`
    ///
    /// Only the budget is checked here; whether an error is worth retrying
    /// at all is [`LazyError::should_retry`].
    pub fn has_attempts_left(&self, attempt: usize) -> bool {
        attempt < self.max_retries
    }

    /// Get the backoff duration for a given attempt
    pub fn backoff_duration(&self, attempt: usize) -> Duration {
        let ms = self
            .backoff_ms
            .get(attempt)
            .copied()
            .unwrap_or_else(|| *self.backoff_ms.last().unwrap_or(&1000));
        Duration::from_millis(ms)
    }
}

/// [`RangeProvider`] backed by an HTTP server that honours Range requests
pub struct HttpRangeProvider {
    client: Client,
    url: String,
    retry_policy: RetryPolicy,
    require_accept_ranges: bool,
    metadata: Option<FileMetadata>,
}

impl HttpRangeProvider {
    /// Create a provider for `url` with default settings
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_config(url, &LazyConfig::default())
    }

    /// Create a provider for `url` using `config` for the client and retries
    pub fn with_config(url: impl Into<String>, config: &LazyConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LazyError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpRangeProvider {
            client,
            url: url.into(),
            retry_policy: RetryPolicy::with_base(config.max_retries, config.retry_base_backoff_ms),
            require_accept_ranges: config.require_accept_ranges,
            metadata: None,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Metadata from the last successful size discovery
    pub fn metadata(&self) -> Option<&FileMetadata> {
        self.metadata.as_ref()
    }

    /// Send one HEAD request and parse the object metadata
    ///
    /// Extracts Content-Length (required), Accept-Ranges, Content-Type,
    /// ETag and Last-Modified.
    pub fn fetch_metadata(&self) -> Result<FileMetadata> {
        debug!("Fetching metadata for url={}", self.url);

        let response = self.client.head(&self.url).send().map_err(|e| {
            warn!("HEAD request failed for url={}: {}", self.url, e);
            LazyError::from(e)
        })?;

        let status = response.status();
        debug!("Received HEAD response for url={}, status={}", self.url, status);
        check_status(status, &self.url)?;

        if !status.is_success() {
            return Err(LazyError::HttpError(format!(
                "Unexpected status code: {}",
                status
            )));
        }

        let headers = response.headers();

        let content_length = header_str(headers, CONTENT_LENGTH)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| {
                warn!("Content-Length header missing or invalid for url={}", self.url);
                LazyError::MetadataFetchError(
                    "Content-Length header missing or invalid".to_string(),
                )
            })?;

        let supports_range = header_str(headers, ACCEPT_RANGES)
            .map(|v| v.eq_ignore_ascii_case("bytes"))
            .unwrap_or(false);

        Ok(FileMetadata {
            content_length,
            supports_range,
            content_type: header_str(headers, CONTENT_TYPE).map(str::to_string),
            etag: header_str(headers, ETAG).map(str::to_string),
            last_modified: header_str(headers, LAST_MODIFIED).map(str::to_string),
        })
    }

    /// Single ranged GET, no retry
    fn try_fetch_range(&self, range: &ByteRange) -> Result<Bytes> {
        let response = self
            .client
            .get(&self.url)
            .header(RANGE, range.to_header())
            .send()?;

        let status = response.status();
        check_status(status, &self.url)?;

        if status == StatusCode::OK {
            warn!(
                "Origin ignored Range {} for url={} and sent the full body",
                range.to_header(),
                self.url
            );
            return Err(LazyError::RangeNotSupported);
        }

        if status != StatusCode::PARTIAL_CONTENT {
            return Err(LazyError::HttpError(format!(
                "Expected status 206, got {}",
                status
            )));
        }

        match header_str(response.headers(), CONTENT_RANGE) {
            Some(content_range) => self.validate_content_range(content_range, range)?,
            None => debug!("No Content-Range in 206 response for url={}", self.url),
        }

        Ok(response.bytes()?)
    }

    /// Check a Content-Range header against the requested range and the
    /// length discovered at HEAD time
    fn validate_content_range(&self, content_range: &str, expected: &ByteRange) -> Result<()> {
        let (actual, total) = ByteRange::from_content_range(content_range)?;

        let length_changed = match (total, &self.metadata) {
            (Some(total), Some(metadata)) => total != metadata.content_length,
            _ => false,
        };

        if actual != *expected || length_changed {
            return Err(LazyError::ContentRangeMismatch {
                expected: format!("{}-{}", expected.start, expected.end),
                actual: content_range.to_string(),
            });
        }
        Ok(())
    }

    /// Fetch a range, retrying transient failures with backoff
    ///
    /// Permanent errors are returned as-is; once retries run out the result
    /// is [`LazyError::FetchFailed`].
    pub fn fetch_range(&self, range: &ByteRange) -> Result<Bytes> {
        let mut attempt = 0;

        loop {
            match self.try_fetch_range(range) {
                Ok(data) => {
                    debug!(
                        "Fetched {} ({} bytes) from url={}",
                        range.to_header(),
                        data.len(),
                        self.url
                    );
                    return Ok(data);
                }
                Err(e) if !e.should_retry() => return Err(e),
                Err(e) => {
                    if !self.retry_policy.has_attempts_left(attempt) {
                        warn!(
                            "Giving up on {} for url={} after {} attempts: {}",
                            range.to_header(),
                            self.url,
                            attempt + 1,
                            e
                        );
                        let span = range.to_half_open();
                        return Err(LazyError::FetchFailed {
                            lo: span.start,
                            hi: span.end,
                            attempts: attempt + 1,
                        });
                    }

                    let backoff = self.retry_policy.backoff_duration(attempt);
                    warn!(
                        "Fetch of {} failed (attempt {}), retrying after {:?}: {}",
                        range.to_header(),
                        attempt + 1,
                        backoff,
                        e
                    );
                    sleep(backoff);

                    attempt += 1;
                }
            }
        }
    }
}

impl RangeProvider for HttpRangeProvider {
    fn size(&mut self) -> Result<u64> {
        let metadata = self.fetch_metadata()?;

        if !metadata.supports_range {
            if self.require_accept_ranges {
                return Err(LazyError::RangeNotSupported);
            }
            warn!(
                "Origin does not advertise Accept-Ranges: bytes for url={}",
                self.url
            );
        }

        info!(
            "Fetched metadata for url={}: size={}, supports_range={}, content_type={:?}",
            self.url, metadata.content_length, metadata.supports_range, metadata.content_type
        );

        let size = metadata.content_length;
        self.metadata = Some(metadata);
        Ok(size)
    }

    fn fetch(&mut self, lo: u64, hi: u64) -> Result<Bytes> {
        let range = ByteRange::from_half_open(lo, hi)?;
        self.fetch_range(&range)
    }
}

/// Map 4xx and 5xx statuses to origin errors
fn check_status(status: StatusCode, url: &str) -> Result<()> {
    if status.is_client_error() || status.is_server_error() {
        warn!("Origin returned error for url={}: status={}", url, status);
        return Err(LazyError::from_http_status(
            status.as_u16(),
            format!("Origin server returned {}", status),
        ));
    }
    Ok(())
}

fn header_str(headers: &HeaderMap, name: http::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
