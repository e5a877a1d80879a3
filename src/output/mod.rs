//! Output module
//!
//! Writes and re-reads the star-schema tables as Hive-partitioned Parquet.
//!
//! # Overview
//!
//! - `ParquetWriterConfig` / `encode_batch` - Parquet encoding to bytes
//! - `partition` helpers - `col=value` paths, splitting, column restore
//! - `PartitionedWriter` - save modes, file chunking, `_SUCCESS` marker
//! - `TableReader` - marker-checked reads and table summaries

mod partition;
mod partitioned;
mod reader;
mod writer;

pub use partition::{
    drop_columns, escape_value, parse_partition_values, partition_path, restore_columns,
    split_by_partition, unescape_value, HIVE_DEFAULT_PARTITION,
};
pub use partitioned::{PartitionedWriter, TableWriteStats, WriterConfig};
pub use reader::{TableReader, TableSummary};
pub use writer::{encode_batch, ParquetWriter, ParquetWriterConfig};

/// Marker object written once a table is complete
pub const SUCCESS_MARKER: &str = "_SUCCESS";

#[cfg(test)]
mod tests;
