use strsim::normalized_levenshtein;

use super::{Candidate, CatalogSearch, ResolvedTrack, SearchHit};
use crate::{info, success, warning};

/// Ratio a field must exceed to pass the gate without a substring relation.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// Search hits must pass the similarity gate.
    Strict,
    /// The first search hit is accepted as is.
    Off,
}

impl GateMode {
    pub fn from_guardrail(enabled: bool) -> Self {
        if enabled { GateMode::Strict } else { GateMode::Off }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedTrack),
    /// The search returned a track the gate did not accept.
    Rejected(SearchHit),
    NotFound,
    /// Artist or title missing; no search was issued.
    Skipped,
}

/// Case-insensitive similarity ratio in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.trim().to_lowercase(), &b.trim().to_lowercase())
}

/// A field passes if it is similar enough or one side contains the other.
pub fn field_matches(requested: &str, found: &str) -> bool {
    let requested = requested.trim().to_lowercase();
    let found = found.trim().to_lowercase();

    if similarity(&requested, &found) > SIMILARITY_THRESHOLD {
        return true;
    }
    !requested.is_empty()
        && !found.is_empty()
        && (requested.contains(&found) || found.contains(&requested))
}

/// Both artist and title must match independently.
pub fn passes_gate(artist: &str, title: &str, hit: &SearchHit) -> bool {
    field_matches(artist, &hit.artist) && field_matches(title, &hit.title)
}

/// Field query first, bag-of-words fallback second.
pub fn search_queries(artist: &str, title: &str) -> [String; 2] {
    [
        format!("track:{} artist:{}", title, artist),
        format!("{} {}", title, artist),
    ]
}

pub struct Resolver<'a, S> {
    search: &'a S,
    mode: GateMode,
}

impl<'a, S: CatalogSearch> Resolver<'a, S> {
    pub fn new(search: &'a S, mode: GateMode) -> Self {
        Self { search, mode }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    /// Resolves one candidate against the catalog.
    ///
    /// A query that fails or finds nothing falls through to the next one. The
    /// first hit found is final: accepted or rejected by the gate, no further
    /// query is tried.
    pub async fn resolve(&self, candidate: &Candidate) -> Resolution {
        let Some((artist, title)) = candidate.fields() else {
            warning!("[skip] incomplete candidate: {}", candidate.label());
            return Resolution::Skipped;
        };

        for query in search_queries(artist, title) {
            let hit = match self.search.search_track(&query).await {
                Ok(Some(hit)) => hit,
                Ok(None) => continue,
                Err(e) => {
                    warning!("Search failed for '{}': {}", query, e);
                    continue;
                }
            };

            if self.mode == GateMode::Strict && !passes_gate(artist, title, &hit) {
                warning!(
                    "[--] {} - {} (found {} - {})",
                    artist,
                    title,
                    hit.artist,
                    hit.title
                );
                return Resolution::Rejected(hit);
            }

            success!("[OK] {} - {}", artist, title);
            return Resolution::Resolved(hit.into());
        }

        info!("[??] {} - {} not found", artist, title);
        Resolution::NotFound
    }
}
