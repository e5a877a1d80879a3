//! Songplays fact table

use super::events::{cast_user_id, start_time};
use super::matcher::ArtistMatcher;
use crate::ingest::LogRecord;
use crate::model::{ArtistRow, SongRow, SongplayRow};
use chrono::Datelike;
use std::collections::HashMap;

/// Joins listening events against the songs and artists dimensions
///
/// An event matches every artist whose name matches the event's artist,
/// and through each such artist every song with that `artist_id`. Events
/// without a match produce no row; several matches fan out.
pub struct SongplayBuilder<'a> {
    matcher: &'a dyn ArtistMatcher,
    artists_by_name: HashMap<String, Vec<&'a ArtistRow>>,
    songs_by_artist: HashMap<&'a str, Vec<&'a SongRow>>,
}

impl<'a> SongplayBuilder<'a> {
    /// Index both dimensions once
    pub fn new(
        matcher: &'a dyn ArtistMatcher,
        artists: &'a [ArtistRow],
        songs: &'a [SongRow],
    ) -> Self {
        let mut artists_by_name: HashMap<String, Vec<&ArtistRow>> = HashMap::new();
        for artist in artists {
            if let Some(key) = artist.name.as_deref().and_then(|n| matcher.key(n)) {
                artists_by_name.entry(key).or_default().push(artist);
            }
        }

        let mut songs_by_artist: HashMap<&str, Vec<&SongRow>> = HashMap::new();
        for song in songs {
            songs_by_artist
                .entry(song.artist_id.as_str())
                .or_default()
                .push(song);
        }

        Self {
            matcher,
            artists_by_name,
            songs_by_artist,
        }
    }

    /// Number of distinct artist join keys
    pub fn artist_keys(&self) -> usize {
        self.artists_by_name.len()
    }

    /// Build fact rows for every matched listening event
    pub fn build(&self, events: &[LogRecord]) -> Vec<SongplayRow> {
        let mut rows = Vec::new();

        for event in events.iter().filter(|e| e.is_song_play()) {
            let Some(start) = event.ts.and_then(start_time) else {
                continue;
            };
            let Some(artists) = event
                .artist
                .as_deref()
                .and_then(|name| self.matcher.key(name))
                .and_then(|key| self.artists_by_name.get(&key))
            else {
                continue;
            };

            for artist in artists {
                let Some(songs) = self.songs_by_artist.get(artist.artist_id.as_str()) else {
                    continue;
                };
                for song in songs {
                    rows.push(SongplayRow {
                        start_time: start,
                        user_id: event.user_id.as_deref().and_then(cast_user_id),
                        level: event.level.clone(),
                        song_id: song.song_id.clone(),
                        artist_id: artist.artist_id.clone(),
                        session_id: event.session_id,
                        location: artist.location.clone(),
                        user_agent: event.user_agent.clone(),
                        year: start.year(),
                        month: start.month() as i32,
                    });
                }
            }
        }

        rows
    }
}
