//! Error types for the songplays ETL
//!
//! Every stage returns `Result<T, Error>`. There is no local recovery:
//! the first error aborts the run.

use thiserror::Error;

/// The main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    /// Malformed or missing input
    #[error("Ingest error ({path}): {message}")]
    Ingest { path: String, message: String },

    /// Schema mismatch preventing the songplays join
    #[error("Join error on table '{table}': {message}")]
    Join { table: String, message: String },

    /// Destination unwritable or partition conflict
    #[error("Write error on table '{table}': {message}")]
    Write { table: String, message: String },

    /// Missing or invalid paths, credentials or settings
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ============================================================================
    // Library Errors
    // ============================================================================
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create an ingest error
    pub fn ingest(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ingest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a join error
    pub fn join(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Join {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short name of the error class, used in the final log line
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Ingest { .. } | Error::JsonParse(_) => "IngestError",
            Error::Join { .. } => "JoinError",
            Error::Write { .. } => "WriteError",
            Error::Config { .. } | Error::YamlParse(_) => "ConfigError",
            _ => "Error",
        }
    }
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
