//! Artist-name join predicates

use crate::types::ArtistMatch;

/// Maps an artist name to the key both join sides are compared on
///
/// Two names match when they map to the same key. `None` never matches.
pub trait ArtistMatcher: Send + Sync {
    /// Join key for a name
    fn key(&self, name: &str) -> Option<String>;

    /// Predicate name for logs
    fn name(&self) -> &'static str;
}

/// Byte-for-byte equality
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactName;

impl ArtistMatcher for ExactName {
    fn key(&self, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

/// Equality after trimming, collapsing whitespace runs and case folding
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedName;

impl ArtistMatcher for NormalizedName {
    fn key(&self, name: &str) -> Option<String> {
        let key = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        (!key.is_empty()).then_some(key)
    }

    fn name(&self) -> &'static str {
        "normalized"
    }
}

/// Matcher for a configured policy
pub fn matcher_for(policy: ArtistMatch) -> Box<dyn ArtistMatcher> {
    match policy {
        ArtistMatch::Exact => Box::new(ExactName),
        ArtistMatch::Normalized => Box::new(NormalizedName),
    }
}
