//! Ingest module
//!
//! Reads the raw song and log datasets.
//!
//! # Overview
//!
//! - `RecordReader` lists files by glob, fetches them concurrently and
//!   decodes JSON Lines into typed records
//! - `SchemaObserver` tracks the union of fields seen across all files
//! - `SongRecord` / `LogRecord` are the typed raw shapes

mod decoder;
mod reader;
mod records;
mod schema;

pub use decoder::JsonlDecoder;
pub use reader::{RecordReader, RecordSet};
pub use records::{LogRecord, SongRecord, SourceRecord};
pub use schema::SchemaObserver;
