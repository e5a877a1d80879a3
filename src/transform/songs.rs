//! Songs and artists dimensions

use super::dedup::deduplicate;
use crate::ingest::SongRecord;
use crate::model::{ArtistRow, SongRow};
use crate::types::DedupPolicy;

/// Project song records into `songs`
///
/// Records without a song id or artist id are dropped.
pub fn extract_songs(records: &[SongRecord], policy: DedupPolicy) -> Vec<SongRow> {
    let rows = records
        .iter()
        .filter_map(|r| {
            Some(SongRow {
                song_id: r.song_id.clone()?,
                title: r.title.clone(),
                artist_id: r.artist_id.clone()?,
                year: r.year,
                duration: r.duration,
            })
        })
        .collect();
    deduplicate(rows, policy)
}

/// Project song records into `artists`
///
/// Records without an artist id are dropped.
pub fn extract_artists(records: &[SongRecord], policy: DedupPolicy) -> Vec<ArtistRow> {
    let rows = records
        .iter()
        .filter_map(|r| {
            Some(ArtistRow {
                artist_id: r.artist_id.clone()?,
                name: r.artist_name.clone(),
                location: r.artist_location.clone(),
                latitude: r.artist_latitude,
                longitude: r.artist_longitude,
            })
        })
        .collect();
    deduplicate(rows, policy)
}
