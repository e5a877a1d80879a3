//! Common types used throughout the pipeline
//!
//! Policy enums shared between configuration, transforms and output.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// ============================================================================
// Deduplication
// ============================================================================

/// How dimension rows are collapsed
///
/// Source order is the order the reader produced records in: files sorted
/// by path, lines in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Rows collapse only when every projected column is equal
    #[default]
    WholeRow,
    /// One row per primary key, earliest in source order wins
    FirstByKey,
    /// One row per primary key, latest in source order wins
    LastByKey,
}

// ============================================================================
// Join
// ============================================================================

/// Predicate used to match a log's artist name to the artists table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ArtistMatch {
    /// Byte-for-byte string equality
    #[default]
    Exact,
    /// Trimmed, whitespace-collapsed, case-folded equality
    Normalized,
}

// ============================================================================
// Output
// ============================================================================

/// What to do when a table already exists at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SaveMode {
    /// Remove every object under the table prefix, then write
    #[default]
    Overwrite,
    /// Fail with a partition conflict if the table prefix is not empty
    ErrorIfExists,
}

/// Parquet compression codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Uncompressed,
}

impl From<CompressionCodec> for parquet::basic::Compression {
    fn from(codec: CompressionCodec) -> Self {
        use parquet::basic::{Compression, GzipLevel, ZstdLevel};
        match codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}
