use super::columns::timestamp_type;
use super::Row;
use crate::error::Result;
use arrow::array::{ArrayRef, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// `songplays` fact row: one matched (event, song, artist) triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongplayRow {
    pub start_time: DateTime<Utc>,
    pub user_id: Option<i32>,
    pub level: Option<String>,
    pub song_id: String,
    pub artist_id: String,
    pub session_id: Option<i64>,
    /// Artist location, denormalized from `artists`
    pub location: Option<String>,
    pub user_agent: Option<String>,
    pub year: i32,
    pub month: i32,
}

impl Row for SongplayRow {
    const TABLE: &'static str = "songplays";
    const PARTITION_BY: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("start_time", timestamp_type(), false),
            Field::new("user_id", DataType::Int32, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let start_time = TimestampMicrosecondArray::from_iter_values(
            rows.iter().map(|r| r.start_time.timestamp_micros()),
        )
        .with_timezone("UTC");

        let columns: Vec<ArrayRef> = vec![
            Arc::new(start_time),
            Arc::new(rows.iter().map(|r| r.user_id).collect::<Int32Array>()),
            Arc::new(rows.iter().map(|r| r.level.as_deref()).collect::<StringArray>()),
            Arc::new(
                rows.iter()
                    .map(|r| Some(r.song_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(
                rows.iter()
                    .map(|r| Some(r.artist_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(rows.iter().map(|r| r.session_id).collect::<Int64Array>()),
            Arc::new(
                rows.iter()
                    .map(|r| r.location.as_deref())
                    .collect::<StringArray>(),
            ),
            Arc::new(
                rows.iter()
                    .map(|r| r.user_agent.as_deref())
                    .collect::<StringArray>(),
            ),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.month))),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}
