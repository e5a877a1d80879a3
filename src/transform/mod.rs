//! Transform module
//!
//! Pure, in-memory record-shape conversions. Nothing here touches storage.
//!
//! # Overview
//!
//! - `extract_songs` / `extract_artists` - dimensions from song metadata
//! - `song_plays`, `extract_users`, `extract_time` - dimensions from logs
//! - `SongplayBuilder` - the fact table join
//! - `deduplicate` - whole-row or key-based distinct
//! - `ArtistMatcher` - the artist-name join predicate

mod dedup;
mod events;
mod matcher;
mod songplays;
mod songs;

pub use dedup::deduplicate;
pub use events::{cast_user_id, extract_time, extract_users, song_plays, start_time};
pub use matcher::{matcher_for, ArtistMatcher, ExactName, NormalizedName};
pub use songplays::SongplayBuilder;
pub use songs::{extract_artists, extract_songs};
