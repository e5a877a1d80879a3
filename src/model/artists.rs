use super::columns::{column, opt_f64, opt_str, required_str};
use super::{hash_f64, Dimension, FromBatch, Row};
use crate::error::Result;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// `artists` dimension row
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Eq for ArtistRow {}

impl Hash for ArtistRow {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.artist_id.hash(state);
        self.name.hash(state);
        self.location.hash(state);
        hash_f64(self.latitude, state);
        hash_f64(self.longitude, state);
    }
}

impl Row for ArtistRow {
    const TABLE: &'static str = "artists";
    const PARTITION_BY: &'static [&'static str] = &[];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(
                rows.iter()
                    .map(|r| Some(r.artist_id.as_str()))
                    .collect::<StringArray>(),
            ),
            Arc::new(rows.iter().map(|r| r.name.as_deref()).collect::<StringArray>()),
            Arc::new(
                rows.iter()
                    .map(|r| r.location.as_deref())
                    .collect::<StringArray>(),
            ),
            Arc::new(rows.iter().map(|r| r.latitude).collect::<Float64Array>()),
            Arc::new(rows.iter().map(|r| r.longitude).collect::<Float64Array>()),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

impl Dimension for ArtistRow {
    type Key = String;

    fn key(&self) -> String {
        self.artist_id.clone()
    }
}

impl FromBatch for ArtistRow {
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let table = Self::TABLE;
        let artist_id = column::<StringArray>(table, batch, "artist_id")?;
        let name = column::<StringArray>(table, batch, "name")?;
        let location = column::<StringArray>(table, batch, "location")?;
        let latitude = column::<Float64Array>(table, batch, "latitude")?;
        let longitude = column::<Float64Array>(table, batch, "longitude")?;

        (0..batch.num_rows())
            .map(|i| {
                Ok(Self {
                    artist_id: required_str(table, artist_id, "artist_id", i)?,
                    name: opt_str(name, i),
                    location: opt_str(location, i),
                    latitude: opt_f64(latitude, i),
                    longitude: opt_f64(longitude, i),
                })
            })
            .collect()
    }
}
