//! Pipeline module
//!
//! Orchestrates a full run as two waves.
//!
//! # Overview
//!
//! 1. Dimension wave, two independent stages run concurrently:
//!    - songs: read song metadata, write `songs` and `artists`
//!    - logs: read events, keep song plays, write `users` and `time`
//! 2. Fact wave, after both stages finished (barrier): re-read `songs` and
//!    `artists` from the output root, join, write `songplays`

mod types;

pub use types::{ExecutionContext, RunStats};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingest::{LogRecord, RecordReader, SongRecord};
use crate::model::{ArtistRow, SongRow};
use crate::output::{PartitionedWriter, TableReader, TableWriteStats};
use crate::transform::{
    extract_artists, extract_songs, extract_time, extract_users, matcher_for, song_plays,
    SongplayBuilder,
};
use std::time::Instant;
use tracing::info;

/// Output of the songs stage
struct SongStage {
    records: usize,
    songs: TableWriteStats,
    artists: TableWriteStats,
}

/// Output of the logs stage
struct LogStage {
    records: usize,
    events: Vec<LogRecord>,
    users: TableWriteStats,
    time: TableWriteStats,
}

/// Star-schema ETL pipeline
pub struct Pipeline {
    ctx: ExecutionContext,
}

impl Pipeline {
    /// Create a pipeline over a prepared context
    pub fn new(ctx: ExecutionContext) -> Self {
        Self { ctx }
    }

    /// Open storage and build a pipeline from configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(ExecutionContext::from_config(config)?))
    }

    /// Get the execution context
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Run both waves
    ///
    /// The first error aborts the run. Tables already written stay in place.
    pub async fn run(&self) -> Result<RunStats> {
        let start = Instant::now();
        info!(
            input = %self.ctx.input.url(""),
            input_scheme = self.ctx.input.scheme(),
            output = %self.ctx.output.url(""),
            output_scheme = self.ctx.output.scheme(),
            dedup = ?self.ctx.dedup,
            "Starting run"
        );

        let (songs, logs) = tokio::try_join!(self.song_stage(), self.log_stage())?;
        let songplays = self.songplay_stage(&logs.events).await?;

        let stats = RunStats {
            song_records: songs.records,
            log_events: logs.records,
            song_play_events: logs.events.len(),
            tables: vec![songs.songs, songs.artists, logs.users, logs.time, songplays],
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            tables = stats.tables.len(),
            rows = stats.total_rows(),
            duration_ms = stats.duration_ms,
            "Run complete"
        );
        Ok(stats)
    }

    fn reader(&self) -> RecordReader {
        RecordReader::new(self.ctx.input.clone()).with_concurrency(self.ctx.concurrency)
    }

    fn writer(&self) -> PartitionedWriter {
        PartitionedWriter::new(self.ctx.output.clone(), self.ctx.writer.clone())
    }

    async fn song_stage(&self) -> Result<SongStage> {
        let set = self.reader().read::<SongRecord>(&self.ctx.song_pattern).await?;

        let song_rows = extract_songs(&set.records, self.ctx.dedup);
        let artist_rows = extract_artists(&set.records, self.ctx.dedup);

        let writer = self.writer();
        let (songs, artists) = tokio::try_join!(
            writer.write_rows(&song_rows),
            writer.write_rows(&artist_rows)
        )?;

        Ok(SongStage {
            records: set.len(),
            songs,
            artists,
        })
    }

    async fn log_stage(&self) -> Result<LogStage> {
        let set = self.reader().read::<LogRecord>(&self.ctx.log_pattern).await?;
        let records = set.len();
        let events = song_plays(set.records);
        info!(events = records, song_plays = events.len(), "Filtered song plays");

        let user_rows = extract_users(&events, self.ctx.dedup);
        let time_rows = extract_time(&events);

        let writer = self.writer();
        let (users, time) = tokio::try_join!(
            writer.write_rows(&user_rows),
            writer.write_rows(&time_rows)
        )?;

        Ok(LogStage {
            records,
            events,
            users,
            time,
        })
    }

    async fn songplay_stage(&self, events: &[LogRecord]) -> Result<TableWriteStats> {
        let reader =
            TableReader::new(self.ctx.output.clone()).with_concurrency(self.ctx.concurrency);
        let (songs, artists) = tokio::try_join!(
            reader.read_rows::<SongRow>(),
            reader.read_rows::<ArtistRow>()
        )?;

        let matcher = matcher_for(self.ctx.artist_match);
        let builder = SongplayBuilder::new(matcher.as_ref(), &artists, &songs);
        let rows = builder.build(events);
        info!(
            matcher = matcher.name(),
            artist_keys = builder.artist_keys(),
            events = events.len(),
            rows = rows.len(),
            "Joined song plays"
        );

        self.writer().write_rows(&rows).await
    }
}
