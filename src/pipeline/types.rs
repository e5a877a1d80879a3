//! Pipeline types
//!
//! Execution context passed to every stage, and run statistics.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::output::{TableWriteStats, WriterConfig};
use crate::storage::{GlobPattern, Storage};
use crate::types::{ArtistMatch, DedupPolicy};
use serde::Serialize;

/// Everything a run needs: storage roots, patterns, policies, writer settings
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Root holding the raw datasets
    pub input: Storage,
    /// Root receiving the output tables
    pub output: Storage,
    pub song_pattern: GlobPattern,
    pub log_pattern: GlobPattern,
    pub dedup: DedupPolicy,
    pub artist_match: ArtistMatch,
    pub writer: WriterConfig,
    /// Maximum concurrent object reads
    pub concurrency: usize,
}

impl ExecutionContext {
    /// Open the configured input and output roots
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let input = Storage::open(&config.input, &config.aws)?;
        let output = Storage::create(&config.output, &config.aws)?;
        Self::new(input, output, config)
    }

    /// Build a context over already-open storage roots
    ///
    /// The config's `input` and `output` URLs are ignored.
    pub fn new(input: Storage, output: Storage, config: &PipelineConfig) -> Result<Self> {
        config.validate_settings()?;
        Ok(Self {
            input,
            output,
            song_pattern: GlobPattern::new(&config.song_pattern)?,
            log_pattern: GlobPattern::new(&config.log_pattern)?,
            dedup: config.dedup,
            artist_match: config.artist_match,
            writer: WriterConfig::from(config),
            concurrency: config.concurrency,
        })
    }
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Raw song metadata records read
    pub song_records: usize,
    /// Raw log events read
    pub log_events: usize,
    /// Log events that are song plays
    pub song_play_events: usize,
    /// Per-table write results, in write order
    pub tables: Vec<TableWriteStats>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Write result for a table
    pub fn table(&self, name: &str) -> Option<&TableWriteStats> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Total rows written across all tables
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}
