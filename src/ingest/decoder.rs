//! JSON Lines decoding

use crate::error::{Error, Result};
use serde_json::Value;

/// JSON Lines decoder (one JSON object per line)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a file body into `(line number, value)` pairs
    ///
    /// Blank lines are skipped. `path` is only used in error messages.
    pub fn decode(&self, path: &str, body: &[u8]) -> Result<Vec<(usize, Value)>> {
        let text = std::str::from_utf8(body)
            .map_err(|e| Error::ingest(path, format!("file is not valid UTF-8: {e}")))?;

        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line).map_err(|e| {
                Error::ingest(path, format!("invalid JSON at line {}: {e}", idx + 1))
            })?;
            records.push((idx + 1, value));
        }

        Ok(records)
    }
}
