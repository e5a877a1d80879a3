//! Star schema model
//!
//! Row types for the five output tables and their Arrow mapping.
//!
//! # Tables
//!
//! | Table       | Key          | Partitioned by      |
//! |-------------|--------------|---------------------|
//! | `songs`     | `song_id`    | `year`, `artist_id` |
//! | `artists`   | `artist_id`  | -                   |
//! | `users`     | `user_id`    | -                   |
//! | `time`      | `start_time` | `year`, `month`     |
//! | `songplays` | -            | `year`, `month`     |

mod artists;
mod columns;
mod songplays;
mod songs;
mod time;
mod users;

pub use artists::ArtistRow;
pub use songplays::SongplayRow;
pub use songs::SongRow;
pub use time::TimeRow;
pub use users::UserRow;

use crate::error::Result;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use std::hash::{Hash, Hasher};

/// Every output table, in write order
pub const TABLES: &[&str] = &[
    SongRow::TABLE,
    ArtistRow::TABLE,
    UserRow::TABLE,
    TimeRow::TABLE,
    SongplayRow::TABLE,
];

/// A row of an output table
pub trait Row: Clone + Send + Sync + 'static {
    /// Table name, also its directory under the output root
    const TABLE: &'static str;

    /// Partition columns, outermost first
    const PARTITION_BY: &'static [&'static str];

    /// Arrow schema of the table
    fn schema() -> SchemaRef;

    /// Build one batch holding `rows`
    fn to_batch(rows: &[Self]) -> Result<RecordBatch>;
}

/// A dimension row with a primary key
///
/// `Eq`/`Hash` compare every column and drive whole-row distinct.
pub trait Dimension: Row + Eq + Hash {
    /// Primary key type
    type Key: Eq + Hash + Clone;

    /// Primary key of this row
    fn key(&self) -> Self::Key;
}

/// Rows that can be decoded back from a persisted table
pub trait FromBatch: Row + Sized {
    /// Decode every row of a batch
    ///
    /// Missing or mistyped columns are join errors.
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>>;
}

/// Hash an optional float so that `0.0` and `-0.0` agree with `==`
pub(crate) fn hash_f64<H: Hasher>(value: Option<f64>, state: &mut H) {
    value
        .map(|v| if v == 0.0 { 0 } else { v.to_bits() })
        .hash(state);
}
