//! Dimension deduplication

use crate::model::Dimension;
use crate::types::DedupPolicy;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Collapse duplicate dimension rows
///
/// Surviving rows keep the position of the first row with the same
/// identity, so the output order only depends on the input order.
pub fn deduplicate<R: Dimension>(rows: Vec<R>, policy: DedupPolicy) -> Vec<R> {
    match policy {
        DedupPolicy::WholeRow => {
            let mut seen = HashSet::with_capacity(rows.len());
            rows.into_iter()
                .filter(|row| seen.insert(row.clone()))
                .collect()
        }
        DedupPolicy::FirstByKey => {
            let mut seen = HashSet::with_capacity(rows.len());
            rows.into_iter().filter(|row| seen.insert(row.key())).collect()
        }
        DedupPolicy::LastByKey => {
            let mut slots: Vec<R> = Vec::new();
            let mut index: HashMap<R::Key, usize> = HashMap::with_capacity(rows.len());
            for row in rows {
                match index.entry(row.key()) {
                    Entry::Occupied(slot) => slots[*slot.get()] = row,
                    Entry::Vacant(slot) => {
                        slot.insert(slots.len());
                        slots.push(row);
                    }
                }
            }
            slots
        }
    }
}
