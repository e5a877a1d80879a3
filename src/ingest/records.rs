//! Typed raw input records

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Trait for raw record types the reader can produce
pub trait SourceRecord: serde::de::DeserializeOwned + Send + 'static {
    /// Dataset name for logs and errors
    const DATASET: &'static str;

    /// Fields the extractors project from this dataset
    ///
    /// Each must appear in at least one record, or the read fails.
    const REQUIRED_FIELDS: &'static [&'static str];
}

/// One song metadata record (`song_data/`)
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SongRecord {
    #[serde(default)]
    pub song_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub num_songs: Option<i64>,
}

impl SourceRecord for SongRecord {
    const DATASET: &'static str = "song_data";
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "song_id",
        "title",
        "artist_id",
        "year",
        "duration",
        "artist_name",
        "artist_location",
        "artist_latitude",
        "artist_longitude",
    ];
}

/// One user activity event (`log_data/`)
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Epoch milliseconds
    #[serde(default)]
    pub ts: Option<i64>,
    /// Raw user id; a string in the source data, sometimes empty
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub item_in_session: Option<i64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub registration: Option<f64>,
}

impl SourceRecord for LogRecord {
    const DATASET: &'static str = "log_data";
    const REQUIRED_FIELDS: &'static [&'static str] = &[
        "ts",
        "userId",
        "firstName",
        "lastName",
        "gender",
        "level",
        "page",
        "artist",
        "sessionId",
        "userAgent",
    ];
}

impl LogRecord {
    /// Page name of listening events
    pub const NEXT_SONG: &'static str = "NextSong";

    /// Check whether this event is a song play
    pub fn is_song_play(&self) -> bool {
        self.page.as_deref() == Some(Self::NEXT_SONG)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
