//! Pipeline configuration
//!
//! Loaded once at startup from YAML (all fields optional) and then
//! overridden by command-line flags.
//!
//! ```yaml
//! input: s3a://udacity-dend/
//! output: s3://millionsong-project/analytics/
//! concurrency: 16
//! dedup: whole_row
//! artist_match: exact
//! parquet:
//!   compression: snappy
//!   max_rows_per_file: 500000
//! aws:
//!   region: us-west-2
//! ```

use crate::error::{Error, Result};
use crate::types::{ArtistMatch, CompressionCodec, DedupPolicy, SaveMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default glob for song metadata files, relative to the input root
pub const DEFAULT_SONG_PATTERN: &str = "song_data/*/*/*/*.json";

/// Default glob for activity log files, relative to the input root
pub const DEFAULT_LOG_PATTERN: &str = "log_data/*/*/*.json";

// ============================================================================
// Top-Level Pipeline Config
// ============================================================================

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root URL holding `song_data/` and `log_data/`
    #[serde(default)]
    pub input: String,

    /// Root URL receiving the five output tables
    #[serde(default)]
    pub output: String,

    /// Glob for song metadata files
    #[serde(default = "default_song_pattern")]
    pub song_pattern: String,

    /// Glob for activity log files
    #[serde(default = "default_log_pattern")]
    pub log_pattern: String,

    /// Maximum concurrent object reads/writes
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Dimension deduplication rule
    #[serde(default)]
    pub dedup: DedupPolicy,

    /// Artist-name join predicate
    #[serde(default)]
    pub artist_match: ArtistMatch,

    /// Behavior when a table already exists
    #[serde(default)]
    pub save_mode: SaveMode,

    /// Keep partition columns inside data files too
    #[serde(default)]
    pub keep_partition_columns: bool,

    /// Parquet writer settings
    #[serde(default)]
    pub parquet: ParquetSettings,

    /// S3 credentials, region and endpoint
    #[serde(default)]
    pub aws: AwsCredentials,
}

fn default_song_pattern() -> String {
    DEFAULT_SONG_PATTERN.to_string()
}

fn default_log_pattern() -> String {
    DEFAULT_LOG_PATTERN.to_string()
}

fn default_concurrency() -> usize {
    8
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            output: String::new(),
            song_pattern: default_song_pattern(),
            log_pattern: default_log_pattern(),
            concurrency: default_concurrency(),
            dedup: DedupPolicy::default(),
            artist_match: ArtistMatch::default(),
            save_mode: SaveMode::default(),
            keep_partition_columns: false,
            parquet: ParquetSettings::default(),
            aws: AwsCredentials::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config for the given input and output roots
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    /// Parse a config from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    /// Override the input root
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Override the output root
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(Error::config("input root is not set"));
        }
        if self.output.trim().is_empty() {
            return Err(Error::config("output root is not set"));
        }
        self.validate_settings()
    }

    /// Check every setting except the input and output roots
    pub fn validate_settings(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        if self.parquet.max_rows_per_file == 0 {
            return Err(Error::config("parquet.max_rows_per_file must be at least 1"));
        }
        if self.parquet.row_group_size == 0 {
            return Err(Error::config("parquet.row_group_size must be at least 1"));
        }
        for pattern in [&self.song_pattern, &self.log_pattern] {
            crate::storage::GlobPattern::new(pattern)?;
        }
        Ok(())
    }
}

// ============================================================================
// Parquet
// ============================================================================

/// Parquet file layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParquetSettings {
    #[serde(default)]
    pub compression: CompressionCodec,

    #[serde(default = "default_row_group_size")]
    pub row_group_size: usize,

    /// Rows per data file inside one partition
    #[serde(default = "default_max_rows_per_file")]
    pub max_rows_per_file: usize,

    #[serde(default = "default_true")]
    pub dictionary: bool,

    #[serde(default = "default_true")]
    pub statistics: bool,
}

fn default_row_group_size() -> usize {
    1024 * 1024
}

fn default_max_rows_per_file() -> usize {
    1_000_000
}

fn default_true() -> bool {
    true
}

impl Default for ParquetSettings {
    fn default() -> Self {
        Self {
            compression: CompressionCodec::default(),
            row_group_size: default_row_group_size(),
            max_rows_per_file: default_max_rows_per_file(),
            dictionary: true,
            statistics: true,
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// S3 (and S3-compatible) credentials
///
/// Unset fields fall back to the `AWS_*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AwsCredentials {
    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint (R2, MinIO, ...)
    #[serde(default)]
    pub endpoint: Option<String>,
}
