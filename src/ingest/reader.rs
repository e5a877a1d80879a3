//! Record reader: glob → typed record set

use super::decoder::JsonlDecoder;
use super::records::SourceRecord;
use super::schema::SchemaObserver;
use crate::error::{Error, Result};
use crate::storage::{GlobPattern, Storage};
use arrow::datatypes::Schema;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

/// Every record of one dataset, in source order
#[derive(Debug, Clone)]
pub struct RecordSet<T> {
    /// Records ordered by file path, then line
    pub records: Vec<T>,
    /// Union schema of the raw JSON
    pub schema: Schema,
    /// Files read, sorted
    pub files: Vec<String>,
}

impl<T> RecordSet<T> {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-file decode result
struct FileRecords<T> {
    records: Vec<T>,
    observer: SchemaObserver,
}

/// Reads NDJSON datasets from a storage root
#[derive(Debug, Clone)]
pub struct RecordReader {
    storage: Storage,
    concurrency: usize,
    decoder: JsonlDecoder,
}

impl RecordReader {
    /// Create a reader over a storage root
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            concurrency: 8,
            decoder: JsonlDecoder::new(),
        }
    }

    /// Set the number of files fetched concurrently
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Read every file matching `pattern` into typed records
    ///
    /// Fails if nothing matches, if any line is not JSON, if a record does
    /// not fit `T`, or if a field `T` requires never appears.
    pub async fn read<T: SourceRecord>(&self, pattern: &GlobPattern) -> Result<RecordSet<T>> {
        let files = self
            .storage
            .glob(pattern)
            .await
            .map_err(|e| Error::ingest(self.storage.url(pattern.as_str()), e.to_string()))?;

        if files.is_empty() {
            return Err(Error::ingest(
                self.storage.url(pattern.as_str()),
                "no files matched",
            ));
        }

        debug!(dataset = T::DATASET, files = files.len(), "reading dataset");

        // `buffered` keeps file order, so record order is deterministic
        let per_file: Vec<FileRecords<T>> = stream::iter(files.iter())
            .map(|path| self.read_file::<T>(path))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut observer = SchemaObserver::new();
        let mut records = Vec::new();
        for file in per_file {
            observer.merge(file.observer);
            records.extend(file.records);
        }

        if let Some(missing) = T::REQUIRED_FIELDS.iter().find(|f| !observer.contains(f)) {
            return Err(Error::ingest(
                self.storage.url(pattern.as_str()),
                format!("field '{missing}' does not appear in any record"),
            ));
        }

        let schema = observer.finish();
        info!(
            dataset = T::DATASET,
            files = files.len(),
            records = records.len(),
            fields = schema.fields().len(),
            "dataset loaded"
        );

        Ok(RecordSet {
            records,
            schema,
            files,
        })
    }

    async fn read_file<T: SourceRecord>(&self, path: &str) -> Result<FileRecords<T>> {
        let url = self.storage.url(path);
        let body = self
            .storage
            .get(path)
            .await
            .map_err(|e| Error::ingest(&url, e.to_string()))?;

        let lines = self.decoder.decode(&url, &body)?;
        let mut observer = SchemaObserver::new();
        let mut records = Vec::with_capacity(lines.len());

        for (line, value) in lines {
            observer.observe(&value);
            let record = serde_json::from_value::<T>(value)
                .map_err(|e| Error::ingest(&url, format!("line {line}: {e}")))?;
            records.push(record);
        }

        debug!(path = %url, records = records.len(), "file decoded");
        Ok(FileRecords { records, observer })
    }
}
