//! CLI commands and argument parsing

use crate::types::{ArtistMatch, DedupPolicy, SaveMode};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Songplays star-schema ETL
#[derive(Parser, Debug)]
#[command(name = "songplays-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for run statistics and summaries
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build all five tables from the raw datasets
    Run {
        /// Input root holding song_data/ and log_data/
        /// Supports: /path, file:///path, s3://bucket/path, s3a://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
        #[arg(short, long)]
        input: Option<String>,

        /// Output root receiving the tables
        #[arg(short, long)]
        output: Option<String>,

        /// Maximum concurrent object reads/writes
        #[arg(long)]
        concurrency: Option<usize>,

        /// Dimension deduplication rule
        #[arg(long, value_enum)]
        dedup: Option<DedupPolicy>,

        /// Artist-name join predicate
        #[arg(long, value_enum)]
        artist_match: Option<ArtistMatch>,

        /// Behavior when a table already exists
        #[arg(long, value_enum)]
        save_mode: Option<SaveMode>,
    },

    /// Summarize tables already written to an output root
    Inspect {
        /// Output root to inspect
        #[arg(short, long)]
        output: Option<String>,

        /// Only this table (default: all five)
        #[arg(short, long)]
        table: Option<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
