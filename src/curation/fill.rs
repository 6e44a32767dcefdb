use std::{collections::HashSet, time::Duration};

use tokio::time::sleep;

use super::{
    Candidate, CatalogSearch, CurationRequest, Curator, GateMode, Resolution, ResolvedTrack,
    Resolver,
};
use crate::{
    config::{CurationSettings, MAX_HISTORY_WINDOW},
    info,
    management::History,
    warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillState {
    Requesting,
    Resolving,
    Accumulating,
    /// Target count reached.
    Done,
    /// Retry budget used up before reaching the target.
    Exhausted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillStats {
    pub failed_rounds: u32,
    pub proposed: usize,
    pub resolved: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub not_found: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct FillReport {
    pub tracks: Vec<ResolvedTrack>,
    pub attempts: u32,
    pub history: Vec<String>,
    pub stats: FillStats,
    pub state: FillState,
}

impl FillReport {
    pub fn uris(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.uri.clone()).collect()
    }
}

/// Unique, capacity-bounded list of resolved tracks.
struct Accumulator {
    tracks: Vec<ResolvedTrack>,
    seen: HashSet<String>,
    capacity: usize,
}

impl Accumulator {
    fn new(capacity: usize) -> Self {
        Self {
            tracks: Vec::new(),
            seen: HashSet::new(),
            capacity,
        }
    }

    fn is_full(&self) -> bool {
        self.tracks.len() >= self.capacity
    }

    /// Returns `false` for a uri already held.
    fn push(&mut self, track: ResolvedTrack) -> bool {
        if !self.seen.insert(track.uri.clone()) {
            return false;
        }
        self.tracks.push(track);
        true
    }
}

/// Requests candidates round after round until the target count of unique
/// tracks is reached or the retry budget runs out.
pub struct FillLoop<'a, C, S> {
    curator: &'a C,
    resolver: Resolver<'a, S>,
    target: usize,
    max_retries: u32,
    pause: Duration,
    history_window: usize,
}

impl<'a, C: Curator, S: CatalogSearch> FillLoop<'a, C, S> {
    pub fn new(curator: &'a C, search: &'a S, settings: &CurationSettings) -> Self {
        Self {
            curator,
            resolver: Resolver::new(search, GateMode::from_guardrail(settings.guardrail)),
            target: settings.target_tracks,
            max_retries: settings.max_retries,
            pause: settings.round_pause,
            history_window: settings.history_window.min(MAX_HISTORY_WINDOW),
        }
    }

    pub async fn run(&self, request: &CurationRequest) -> FillReport {
        let mut accumulator = Accumulator::new(self.target);
        let mut history = History::new(self.history_window);
        let mut stats = FillStats::default();
        let mut attempts: u32 = 0;
        let mut proposals: Vec<Candidate> = Vec::new();
        let mut state = FillState::Requesting;

        loop {
            state = match state {
                FillState::Requesting => {
                    if attempts >= self.max_retries {
                        FillState::Exhausted
                    } else {
                        if attempts > 0 {
                            info!(
                                "...fetching more tracks ({}/{})...",
                                accumulator.tracks.len(),
                                self.target
                            );
                            sleep(self.pause).await;
                        }

                        let result = self.curator.propose(request, history.recent()).await;
                        attempts += 1;

                        match result {
                            Ok(candidates) => {
                                // recorded whether or not they resolve
                                for candidate in &candidates {
                                    history.add(candidate.label());
                                }
                                stats.proposed += candidates.len();
                                proposals = candidates;
                                FillState::Resolving
                            }
                            Err(e) => {
                                warning!("Round {}/{} failed: {}", attempts, self.max_retries, e);
                                stats.failed_rounds += 1;
                                FillState::Requesting
                            }
                        }
                    }
                }
                FillState::Resolving => {
                    info!("Verifying {} tracks on Spotify...", proposals.len());
                    for candidate in proposals.drain(..) {
                        if accumulator.is_full() {
                            break;
                        }
                        match self.resolver.resolve(&candidate).await {
                            Resolution::Resolved(track) => {
                                if accumulator.push(track) {
                                    stats.resolved += 1;
                                } else {
                                    stats.duplicates += 1;
                                }
                            }
                            Resolution::Rejected(_) => stats.rejected += 1,
                            Resolution::NotFound => stats.not_found += 1,
                            Resolution::Skipped => stats.skipped += 1,
                        }
                    }
                    FillState::Accumulating
                }
                FillState::Accumulating => {
                    if accumulator.is_full() {
                        FillState::Done
                    } else {
                        FillState::Requesting
                    }
                }
                FillState::Done | FillState::Exhausted => break,
            };
        }

        FillReport {
            tracks: accumulator.tracks,
            attempts,
            history: history.into_entries(),
            stats,
            state,
        }
    }
}
