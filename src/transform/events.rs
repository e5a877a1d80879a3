//! Users and time dimensions from activity logs

use super::dedup::deduplicate;
use crate::ingest::LogRecord;
use crate::model::{TimeRow, UserRow};
use crate::types::DedupPolicy;
use chrono::{DateTime, Utc};

/// Keep only listening events (`page == "NextSong"`)
pub fn song_plays(records: Vec<LogRecord>) -> Vec<LogRecord> {
    records.into_iter().filter(LogRecord::is_song_play).collect()
}

/// Integer cast of a raw user id
///
/// Surrounding whitespace is ignored and plain decimals (`12.7`) truncate.
/// Empty, non-numeric, exponent-form, negative or out-of-range values
/// yield `None`.
pub fn cast_user_id(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i32>() {
        return (id >= 0).then_some(id);
    }
    if !is_plain_decimal(raw) {
        return None;
    }
    let value = raw.parse::<f64>().ok()?.trunc();
    (0.0..=f64::from(i32::MAX)).contains(&value).then(|| value as i32)
}

/// `[+-]digits[.digits]`
fn is_plain_decimal(raw: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let unsigned = raw.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(raw);
    match unsigned.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(unsigned),
    }
}

/// Event start time: epoch milliseconds floored to whole seconds, UTC
pub fn start_time(ts_millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts_millis.div_euclid(1000), 0)
}

/// Project listening events into `users`
pub fn extract_users(events: &[LogRecord], policy: DedupPolicy) -> Vec<UserRow> {
    let rows = events
        .iter()
        .filter(|e| e.is_song_play())
        .filter_map(|e| {
            Some(UserRow {
                user_id: e.user_id.as_deref().and_then(cast_user_id)?,
                first_name: e.first_name.clone(),
                last_name: e.last_name.clone(),
                gender: e.gender.clone(),
                level: e.level.clone(),
            })
        })
        .collect();
    deduplicate(rows, policy)
}

/// Decompose every distinct event start time into `time`
pub fn extract_time(events: &[LogRecord]) -> Vec<TimeRow> {
    let rows = events
        .iter()
        .filter(|e| e.is_song_play())
        .filter_map(|e| e.ts.and_then(start_time))
        .map(TimeRow::new)
        .collect();
    deduplicate(rows, DedupPolicy::WholeRow)
}
