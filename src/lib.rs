//! lazyfile
//!
//! Random-access reading of a fixed-length byte sequence that is expensive or
//! remote to fetch, such as an object behind HTTP range requests. Only the
//! ranges actually read are fetched, and no byte is fetched twice by one
//! instance.
//!
//! # Overview
//!
//! A [`SparseByteCache`] tracks which sub-ranges of the sequence are already
//! held. For every read it computes the missing gaps, asks its
//! [`RangeProvider`] for exactly those, and merges adjacent blocks so the
//! bookkeeping stays proportional to fragmentation rather than to the number
//! of reads. [`LazyFile`] puts a read/seek/tell cursor on top and implements
//! [`std::io::Read`] and [`std::io::Seek`], so it can be handed to anything
//! that expects a seekable file, like an archive reader.
//!
//! # Quick Start
//!
//! ```rust
//! use lazyfile::{LazyFile, MemoryProvider};
//! use std::io::SeekFrom;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = LazyFile::new(MemoryProvider::new(&b"Hello, world!"[..]))?;
//!
//! assert_eq!(file.seek_clamped(SeekFrom::End(0)), 13);
//! file.seek_clamped(SeekFrom::Start(5));
//! assert_eq!(file.read_bytes(2)?.as_ref(), b", ");
//! assert_eq!(file.tell(), 7);
//!
//! // Only bytes 5..7 have been fetched so far
//! assert_eq!(file.cache().block_ranges(), vec![5..7]);
//! # Ok(())
//! # }
//! ```
//!
//! # Remote objects
//!
//! ```rust,no_run
//! use lazyfile::{HttpRangeProvider, LazyConfig, LazyFile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LazyConfig::from_file("lazyfile.yaml")?;
//! let provider = HttpRangeProvider::with_config("https://example.com/pkg.whl", &config)?;
//! let file = LazyFile::new(provider)?;
//! let archive = zip::ZipArchive::new(file)?;
//! println!("{} members", archive.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`RangeProvider`]: size discovery and range fetching, injected at construction
//! - [`SparseByteCache`]: gap computation, fetching and block coalescing
//! - [`LazyFile`]: cursor, clamped seeks and truncating reads
//! - [`HttpRangeProvider`]: HEAD for the size, ranged GET per gap, with retries
//! - [`FetchMetrics`]: per-cache counters of fetches and bytes
//!
//! # Error Handling
//!
//! Every fault is a [`LazyError`] variant returned to the caller of the read
//! that triggered it; nothing is retried inside the cache. Seeks never fail.
//!
//! ```rust
//! use lazyfile::{LazyError, MemoryProvider, SparseByteCache};
//!
//! # fn main() -> Result<(), LazyError> {
//! let mut cache = SparseByteCache::new(MemoryProvider::new(&b"Hello, world!"[..]))?;
//! assert_eq!(cache.read_one(-1)?, b'!');
//! match cache.read_one(13) {
//!     Err(LazyError::IndexOutOfRange { index, size }) => assert_eq!((index, size), (13, 13)),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http_provider;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod ranges;
pub mod sparse;
pub mod stream;

// Re-export commonly used types
pub use config::LazyConfig;
pub use error::{LazyError, Result};
pub use http_provider::{HttpRangeProvider, RetryPolicy};
pub use metrics::{FetchMetrics, MetricsSnapshot};
pub use models::{ByteRange, FileMetadata};
pub use provider::{FnProvider, MemoryProvider, RangeProvider};
pub use sparse::SparseByteCache;
pub use stream::LazyFile;
