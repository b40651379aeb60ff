//! Core data models shared by the cache and the HTTP provider

use crate::error::{LazyError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Represents a byte range for HTTP Range requests
///
/// The cache addresses bytes with closed-open ranges `[lo, hi)`; HTTP uses
/// inclusive ranges. This type is the inclusive form and converts between
/// the two at the provider boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    /// Starting byte position (inclusive)
    pub start: u64,
    /// Ending byte position (inclusive)
    pub end: u64,
}

impl ByteRange {
    /// Create a new ByteRange
    ///
    /// # Arguments
    /// * `start` - Starting byte position (inclusive)
    /// * `end` - Ending byte position (inclusive)
    ///
    /// # Returns
    /// * `Ok(ByteRange)` if the range is valid
    /// * `Err(LazyError)` if start > end
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start > end {
            return Err(LazyError::InvalidRange(format!(
                "start ({}) must be <= end ({})",
                start, end
            )));
        }
        Ok(ByteRange { start, end })
    }

    /// Build the inclusive range covering the closed-open span `[lo, hi)`
    ///
    /// Fails for empty spans, which have no inclusive form.
    pub fn from_half_open(lo: u64, hi: u64) -> Result<Self> {
        if lo >= hi {
            return Err(LazyError::InvalidRange(format!(
                "empty span {}..{} has no inclusive byte range",
                lo, hi
            )));
        }
        ByteRange::new(lo, hi - 1)
    }

    /// The closed-open span `[start, end + 1)` covered by this range
    pub fn to_half_open(&self) -> Range<u64> {
        self.start..self.end + 1
    }

    /// Get the size of this byte range in bytes
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Convert this ByteRange to an HTTP Range header value
    ///
    /// # Returns
    /// A string in the format "bytes=start-end"
    pub fn to_header(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// Parse the range part of a Content-Range response header
    ///
    /// Accepts "bytes start-end/total" and "bytes start-end/*"; returns the
    /// range and the total length when the origin reported one.
    pub fn from_content_range(header: &str) -> Result<(Self, Option<u64>)> {
        let header = header.trim();

        let range_part = header.strip_prefix("bytes ").ok_or_else(|| {
            LazyError::ParseError(format!(
                "Content-Range must start with 'bytes ', got: {}",
                header
            ))
        })?;

        let (span, total) = range_part.split_once('/').ok_or_else(|| {
            LazyError::ParseError(format!(
                "Invalid Content-Range format, expected 'start-end/total', got: {}",
                range_part
            ))
        })?;

        let total = match total.trim() {
            "*" => None,
            value => Some(value.parse::<u64>().map_err(|e| {
                LazyError::ParseError(format!("Invalid total length: {}", e))
            })?),
        };

        let (start, end) = parse_span(span)?;
        Ok((ByteRange::new(start, end)?, total))
    }
}

fn parse_span(span: &str) -> Result<(u64, u64)> {
    let (start, end) = span.split_once('-').ok_or_else(|| {
        LazyError::ParseError(format!(
            "Invalid range format, expected 'start-end', got: {}",
            span
        ))
    })?;

    let start = start
        .trim()
        .parse::<u64>()
        .map_err(|e| LazyError::ParseError(format!("Invalid start value: {}", e)))?;

    let end = end
        .trim()
        .parse::<u64>()
        .map_err(|e| LazyError::ParseError(format!("Invalid end value: {}", e)))?;

    Ok((start, end))
}

/// Metadata about a remote object, taken from a HEAD response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Total size of the object in bytes
    pub content_length: u64,
    /// Whether the origin advertised `Accept-Ranges: bytes`
    pub supports_range: bool,
    /// Content type of the object
    pub content_type: Option<String>,
    /// ETag for cache validation
    pub etag: Option<String>,
    /// Last modified timestamp
    pub last_modified: Option<String>,
}

impl FileMetadata {
    /// Create a new FileMetadata
    pub fn new(content_length: u64, supports_range: bool) -> Self {
        FileMetadata {
            content_length,
            supports_range,
            content_type: None,
            etag: None,
            last_modified: None,
        }
    }
}
