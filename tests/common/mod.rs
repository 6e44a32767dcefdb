#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet, VecDeque},
    time::Duration,
};

use playlist_curator::{
    config::CurationSettings,
    curation::{
        Candidate, CatalogSearch, CreatedPlaylist, CurationError, CurationRequest, Curator,
        PlaylistEntry, PlaylistPage, PlaylistStore, SearchHit,
    },
    spotify::SpotifyError,
};

pub fn hit(artist: &str, title: &str, uri: &str) -> SearchHit {
    SearchHit {
        uri: uri.to_string(),
        artist: artist.to_string(),
        title: title.to_string(),
    }
}

pub fn request(query: &str) -> CurationRequest {
    CurationRequest {
        query: query.to_string(),
        energy: "neutral".to_string(),
        reference: Vec::new(),
        proposal_size: 35,
        max_per_artist: 2,
    }
}

pub fn settings(target: usize, retries: u32) -> CurationSettings {
    CurationSettings {
        target_tracks: target,
        max_retries: retries,
        round_pause: Duration::ZERO,
        ..CurationSettings::default()
    }
}

fn api_error() -> SpotifyError {
    SpotifyError::Api {
        status: 500,
        message: "boom".to_string(),
    }
}

/// Curator replaying a fixed script of rounds. Once the script is used up
/// every further round fails with `Exhausted`.
pub struct FakeCurator {
    rounds: RefCell<VecDeque<Result<Vec<Candidate>, CurationError>>>,
    /// Length of the history passed to each call.
    pub history_lengths: RefCell<Vec<usize>>,
    pub calls: Cell<u32>,
}

impl FakeCurator {
    pub fn new(rounds: Vec<Result<Vec<Candidate>, CurationError>>) -> Self {
        Self {
            rounds: RefCell::new(rounds.into()),
            history_lengths: RefCell::new(Vec::new()),
            calls: Cell::new(0),
        }
    }

    /// Always proposes the same list.
    pub fn repeating(candidates: Vec<Candidate>, rounds: usize) -> Self {
        Self::new((0..rounds).map(|_| Ok(candidates.clone())).collect())
    }
}

impl Curator for FakeCurator {
    async fn propose(
        &self,
        _request: &CurationRequest,
        history: &[String],
    ) -> Result<Vec<Candidate>, CurationError> {
        self.calls.set(self.calls.get() + 1);
        self.history_lengths.borrow_mut().push(history.len());
        self.rounds
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(CurationError::Exhausted))
    }
}

/// Catalog keyed by the exact query string.
#[derive(Default)]
pub struct FakeSearch {
    hits: HashMap<String, SearchHit>,
    failing: HashSet<String>,
    pub queries: RefCell<Vec<String>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hit(mut self, query: &str, hit: SearchHit) -> Self {
        self.hits.insert(query.to_string(), hit);
        self
    }

    /// Makes `query` fail as if the request itself had failed.
    pub fn with_failure(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// Registers a hit under the field query of `artist` / `title`.
    pub fn with_track(self, artist: &str, title: &str, uri: &str) -> Self {
        let query = format!("track:{} artist:{}", title, artist);
        self.with_hit(&query, hit(artist, title, uri))
    }

    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl CatalogSearch for FakeSearch {
    async fn search_track(&self, query: &str) -> Result<Option<SearchHit>, SpotifyError> {
        self.queries.borrow_mut().push(query.to_string());
        if self.failing.contains(query) {
            return Err(api_error());
        }
        Ok(self.hits.get(query).cloned())
    }
}

/// In-memory playlist service holding one existing playlist.
pub struct FakeStore {
    existing: Vec<String>,
    pub page_offsets: RefCell<Vec<usize>>,
    pub created: RefCell<Vec<String>>,
    pub adds: RefCell<Vec<Vec<String>>>,
}

impl FakeStore {
    pub fn new(existing: &[&str]) -> Self {
        Self {
            existing: existing.iter().map(|uri| uri.to_string()).collect(),
            page_offsets: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
            adds: RefCell::new(Vec::new()),
        }
    }

    pub fn with_existing(existing: Vec<String>) -> Self {
        Self {
            existing,
            page_offsets: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
            adds: RefCell::new(Vec::new()),
        }
    }

    pub fn added(&self) -> Vec<String> {
        self.adds.borrow().iter().flatten().cloned().collect()
    }

    pub fn add_sizes(&self) -> Vec<usize> {
        self.adds.borrow().iter().map(Vec::len).collect()
    }
}

impl PlaylistStore for FakeStore {
    async fn current_user_id(&self) -> Result<String, SpotifyError> {
        Ok("user-1".to_string())
    }

    async fn create_playlist(
        &self,
        _user_id: &str,
        name: &str,
        _description: &str,
    ) -> Result<CreatedPlaylist, SpotifyError> {
        self.created.borrow_mut().push(name.to_string());
        Ok(CreatedPlaylist {
            id: "new-playlist".to_string(),
            url: Some("https://open.spotify.com/playlist/new-playlist".to_string()),
        })
    }

    async fn playlist_page(
        &self,
        _playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage, SpotifyError> {
        self.page_offsets.borrow_mut().push(offset);
        let entries = self
            .existing
            .iter()
            .skip(offset)
            .take(limit)
            .map(|uri| PlaylistEntry {
                uri: uri.clone(),
                artist: "Artist".to_string(),
                title: uri.clone(),
            })
            .collect();
        Ok(PlaylistPage {
            entries,
            has_next: offset + limit < self.existing.len(),
        })
    }

    async fn add_items(&self, _playlist_id: &str, uris: &[String]) -> Result<(), SpotifyError> {
        assert!(uris.len() <= 100, "add request with {} items", uris.len());
        self.adds.borrow_mut().push(uris.to_vec());
        Ok(())
    }
}
