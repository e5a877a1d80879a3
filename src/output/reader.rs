//! Reading materialized tables back

use super::partition::{parse_partition_values, restore_columns};
use super::SUCCESS_MARKER;
use crate::error::{Error, Result};
use crate::model::FromBatch;
use crate::storage::Storage;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use futures::stream::{self, StreamExt, TryStreamExt};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::async_reader::AsyncFileReader;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Shape of a table on storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub table: String,
    /// Whether the `_SUCCESS` marker is present
    pub materialized: bool,
    pub rows: usize,
    pub partitions: usize,
    pub files: usize,
}

/// Reads tables written by `PartitionedWriter`
#[derive(Debug, Clone)]
pub struct TableReader {
    storage: Storage,
    concurrency: usize,
}

impl TableReader {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            concurrency: 8,
        }
    }

    /// Set maximum concurrent file reads
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Read every batch of a table
    ///
    /// Partition columns found in the file paths but not in the data are
    /// appended, typed after `target` when given.
    pub async fn read_table(
        &self,
        table: &str,
        target: Option<&Schema>,
    ) -> Result<Vec<RecordBatch>> {
        let files = self.data_files(table).await?;
        debug!(table, files = files.len(), "Reading table");

        let per_file: Vec<Vec<RecordBatch>> = stream::iter(files)
            .map(|path| async move {
                let bytes = self.storage.get(&path).await?;
                let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
                    .and_then(|builder| builder.build())
                    .map_err(|e| Error::join(table, format!("unreadable file {path}: {e}")))?;

                let relative = path
                    .strip_prefix(table)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .unwrap_or(&path);
                let values = parse_partition_values(relative);

                reader
                    .map(|batch| {
                        let batch = batch
                            .map_err(|e| Error::join(table, format!("unreadable file {path}: {e}")))?;
                        restore_columns(&batch, &values, target)
                            .map_err(|e| Error::join(table, format!("{path}: {e}")))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(per_file.into_iter().flatten().collect())
    }

    /// Read and decode every row of a table
    pub async fn read_rows<R: FromBatch>(&self) -> Result<Vec<R>> {
        let schema = R::schema();
        let batches = self.read_table(R::TABLE, Some(schema.as_ref())).await?;

        let mut rows = Vec::new();
        for batch in &batches {
            rows.extend(R::from_batch(batch)?);
        }
        info!(table = R::TABLE, rows = rows.len(), "Read table");
        Ok(rows)
    }

    /// Row, partition and file counts of a table
    ///
    /// Row counts come from Parquet footers, fetched with ranged reads so no
    /// data pages are downloaded. A table without its marker is reported as
    /// not materialized rather than failing.
    pub async fn summarize(&self, table: &str) -> Result<TableSummary> {
        if !self.storage.exists(&marker_path(table)).await? {
            return Ok(TableSummary {
                table: table.to_string(),
                ..TableSummary::default()
            });
        }

        let files = self.parquet_files(table).await?;
        let partitions: BTreeSet<&str> = files
            .iter()
            .map(|path| path.rsplit_once('/').map_or("", |(dir, _)| dir))
            .collect();

        let counts: Vec<usize> = stream::iter(files.iter())
            .map(|path| async move {
                let mut reader = self.storage.parquet_reader(path).await?;
                let metadata = reader
                    .get_metadata()
                    .await
                    .map_err(|e| Error::join(table, format!("unreadable footer {path}: {e}")))?;
                let rows = metadata.file_metadata().num_rows();
                Ok::<_, Error>(usize::try_from(rows).unwrap_or_default())
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(TableSummary {
            table: table.to_string(),
            materialized: true,
            rows: counts.iter().sum(),
            partitions: partitions.len(),
            files: files.len(),
        })
    }

    /// Data files of a materialized table, sorted by path
    async fn data_files(&self, table: &str) -> Result<Vec<String>> {
        if !self.storage.exists(&marker_path(table)).await? {
            return Err(Error::join(
                table,
                format!(
                    "table not materialized: no {SUCCESS_MARKER} at {}",
                    self.storage.url(table)
                ),
            ));
        }
        self.parquet_files(table).await
    }

    async fn parquet_files(&self, table: &str) -> Result<Vec<String>> {
        let mut files = self.storage.list(table).await?;
        files.retain(|path| path.ends_with(".parquet"));
        Ok(files)
    }
}

fn marker_path(table: &str) -> String {
    format!("{table}/{SUCCESS_MARKER}")
}
