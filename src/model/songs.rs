use super::columns::{column, opt_f64, opt_i32, opt_str, required_str};
use super::{hash_f64, Dimension, FromBatch, Row};
use crate::error::Result;
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// `songs` dimension row
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: Option<String>,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

impl Eq for SongRow {}

impl Hash for SongRow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.song_id.hash(state);
        self.title.hash(state);
        self.artist_id.hash(state);
        self.year.hash(state);
        hash_f64(self.duration, state);
    }
}

impl Row for SongRow {
    const TABLE: &'static str = "songs";
    const PARTITION_BY: &'static [&'static str] = &["year", "artist_id"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("year", DataType::Int32, true),
            Field::new("duration", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(
                rows.iter()
                    .map(|r| Some(r.song_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(rows.iter().map(|r| r.title.as_deref()).collect::<StringArray>()),
            Arc::new(
                rows.iter()
                    .map(|r| Some(r.artist_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(rows.iter().map(|r| r.year).collect::<Int32Array>()),
            Arc::new(rows.iter().map(|r| r.duration).collect::<Float64Array>()),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl Dimension for SongRow {
    type Key = String;

    fn key(&self) -> String {
        self.song_id.clone()
    }
}

impl FromBatch for SongRow {
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let table = Self::TABLE;
        let song_id = column::<StringArray>(table, batch, "song_id")?;
        let title = column::<StringArray>(table, batch, "title")?;
        let artist_id = column::<StringArray>(table, batch, "artist_id")?;
        let year = column::<Int32Array>(table, batch, "year")?;
        let duration = column::<Float64Array>(table, batch, "duration")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    song_id: required_str(table, song_id, "song_id", i)?,
                    title: opt_str(title, i),
                    artist_id: required_str(table, artist_id, "artist_id", i)?,
                    year: opt_i32(year, i),
                    duration: opt_f64(duration, i),
                })
            })
            .collect()
    }
}
