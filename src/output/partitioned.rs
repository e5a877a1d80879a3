//! Partitioned table writer

use super::partition::{drop_columns, split_by_partition};
use super::writer::{encode_batch, ParquetWriterConfig};
use super::SUCCESS_MARKER;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::model::Row;
use crate::storage::Storage;
use crate::types::SaveMode;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info};

/// Settings for writing tables
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub parquet: ParquetWriterConfig,
    pub save_mode: SaveMode,
    /// Keep partition columns inside data files too
    pub keep_partition_columns: bool,
    /// Rows per data file inside one partition
    pub max_rows_per_file: usize,
    /// Maximum concurrent uploads
    pub concurrency: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            parquet: ParquetWriterConfig::default(),
            save_mode: SaveMode::default(),
            keep_partition_columns: false,
            max_rows_per_file: 1_000_000,
            concurrency: 8,
        }
    }
}

impl From<&PipelineConfig> for WriterConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            parquet: ParquetWriterConfig::from(&config.parquet),
            save_mode: config.save_mode,
            keep_partition_columns: config.keep_partition_columns,
            max_rows_per_file: config.parquet.max_rows_per_file,
            concurrency: config.concurrency,
        }
    }
}

/// Outcome of writing one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableWriteStats {
    pub table: String,
    pub rows: usize,
    pub partitions: usize,
    pub files: usize,
}

/// Writes tables as Hive-partitioned Parquet under an output root
///
/// Layout: `<table>/<col>=<value>/.../part-NNNNN.parquet`, plus an empty
/// `<table>/_SUCCESS` once every data file is in place.
#[derive(Debug, Clone)]
pub struct PartitionedWriter {
    storage: Storage,
    config: WriterConfig,
}

impl PartitionedWriter {
    pub fn new(storage: Storage, config: WriterConfig) -> Self {
        Self { storage, config }
    }

    /// Write typed rows to their table
    pub async fn write_rows<R: Row>(&self, rows: &[R]) -> Result<TableWriteStats> {
        let batch = R::to_batch(rows)?;
        self.write_table(R::TABLE, &batch, R::PARTITION_BY).await
    }

    /// Write a batch as `table`, partitioned by `partition_by`
    ///
    /// An empty batch produces no data files, only the marker.
    pub async fn write_table(
        &self,
        table: &str,
        batch: &RecordBatch,
        partition_by: &[&str],
    ) -> Result<TableWriteStats> {
        self.check_partition_columns(table, batch, partition_by)?;
        self.prepare_destination(table).await?;

        let partitions = split_by_partition(batch, partition_by)
            .map_err(|e| Error::write(table, e.to_string()))?;

        let mut files: Vec<(String, Bytes)> = Vec::new();
        let mut written_partitions = 0;
        for (partition, part) in partitions {
            if part.num_rows() == 0 {
                continue;
            }
            written_partitions += 1;

            let data = if self.config.keep_partition_columns {
                part
            } else {
                drop_columns(&part, partition_by)?
            };

            let chunk_rows = self.config.max_rows_per_file.max(1);
            let mut offset = 0;
            let mut index = 0;
            while offset < data.num_rows() {
                let len = chunk_rows.min(data.num_rows() - offset);
                let chunk = data.slice(offset, len);
                let bytes = encode_batch(&chunk, &self.config.parquet)
                    .map_err(|e| Error::write(table, format!("failed to encode: {e}")))?;
                files.push((data_file_path(table, &partition, index), bytes));
                offset += len;
                index += 1;
            }
        }

        let file_count = files.len();
        stream::iter(files)
            .map(|(path, bytes)| async move {
                let size = bytes.len();
                let url = self
                    .storage
                    .put(&path, bytes)
                    .await
                    .map_err(|e| Error::write(table, format!("failed to write {path}: {e}")))?;
                debug!(table, path = %url, bytes = size, "Wrote data file");
                Ok::<_, Error>(())
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await?;

        let marker = format!("{table}/{SUCCESS_MARKER}");
        self.storage
            .put(&marker, Bytes::new())
            .await
            .map_err(|e| Error::write(table, format!("failed to write {marker}: {e}")))?;

        let stats = TableWriteStats {
            table: table.to_string(),
            rows: batch.num_rows(),
            partitions: written_partitions,
            files: file_count,
        };
        info!(
            table,
            rows = stats.rows,
            partitions = stats.partitions,
            files = stats.files,
            path = %self.storage.url(table),
            "Wrote table"
        );
        Ok(stats)
    }

    fn check_partition_columns(
        &self,
        table: &str,
        batch: &RecordBatch,
        partition_by: &[&str],
    ) -> Result<()> {
        let schema = batch.schema();
        for column in partition_by {
            if schema.column_with_name(column).is_none() {
                return Err(Error::write(
                    table,
                    format!("partition column '{column}' not in schema"),
                ));
            }
        }
        if !self.config.keep_partition_columns && partition_by.len() >= schema.fields().len() {
            return Err(Error::write(
                table,
                "every column is a partition column, nothing left to store",
            ));
        }
        Ok(())
    }

    /// Apply the save mode to whatever already exists under the table prefix
    async fn prepare_destination(&self, table: &str) -> Result<()> {
        let existing = self
            .storage
            .list(table)
            .await
            .map_err(|e| Error::write(table, format!("failed to list destination: {e}")))?;
        if existing.is_empty() {
            return Ok(());
        }

        match self.config.save_mode {
            SaveMode::ErrorIfExists => Err(Error::write(
                table,
                format!(
                    "partition conflict: {} already holds {} objects",
                    self.storage.url(table),
                    existing.len()
                ),
            )),
            SaveMode::Overwrite => {
                let deleted = self
                    .storage
                    .delete_dir(table, self.config.concurrency)
                    .await
                    .map_err(|e| Error::write(table, format!("failed to clear destination: {e}")))?;
                debug!(table, deleted, "Cleared previous output");
                Ok(())
            }
        }
    }
}

fn data_file_path(table: &str, partition: &str, index: usize) -> String {
    if partition.is_empty() {
        format!("{table}/part-{index:05}.parquet")
    } else {
        format!("{table}/{partition}/part-{index:05}.parquet")
    }
}
