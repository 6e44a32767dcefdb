//! # Curation Module
//!
//! The pipeline that turns model proposals into playlist tracks:
//!
//! ```text
//! Curator (Gemini / pasted list)
//!     ↓  Vec<Candidate>
//! Resolver (staged search + similarity gate)
//!     ↓  Resolution
//! FillLoop (history, accumulator, retry budget)
//!     ↓  Vec<ResolvedTrack>
//! PlaylistWriter (local + remote dedup, chunked inserts)
//! ```
//!
//! The external services sit behind three traits, [`Curator`],
//! [`CatalogSearch`] and [`PlaylistStore`], so the pipeline can be driven by
//! the real clients or by in-memory fakes.

use std::{cell::Cell, fmt};

use crate::spotify::SpotifyError;

pub mod fill;
pub mod parse;
pub mod prompt;
pub mod resolver;
pub mod writer;

pub use fill::{FillLoop, FillReport, FillState, FillStats};
pub use parse::parse_candidates;
pub use prompt::build_prompt;
pub use resolver::{GateMode, Resolution, Resolver};
pub use writer::{PlaylistTarget, PlaylistWriter, WriteReport, fetch_all_entries};

/// An (artist, title) pair proposed by the model. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub artist: Option<String>,
    pub title: Option<String>,
}

impl Candidate {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            title: Some(title.into()),
        }
    }

    /// Returns the trimmed artist and title when both are present and non-blank.
    pub fn fields(&self) -> Option<(&str, &str)> {
        let artist = self.artist.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
        let title = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some((artist, title))
    }

    /// `artist - title`, the form recorded in the session history.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.artist.as_deref().map(str::trim).unwrap_or("?"),
            self.title.as_deref().map(str::trim).unwrap_or("?")
        )
    }
}

/// A candidate confirmed to exist in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub uri: String,
    pub artist: String,
    pub title: String,
}

/// First result of a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub uri: String,
    pub artist: String,
    pub title: String,
}

impl From<SearchHit> for ResolvedTrack {
    fn from(hit: SearchHit) -> Self {
        ResolvedTrack {
            uri: hit.uri,
            artist: hit.artist,
            title: hit.title,
        }
    }
}

/// What the model is asked for in one session.
#[derive(Debug, Clone)]
pub struct CurationRequest {
    pub query: String,
    pub energy: String,
    /// `artist - title` sample of the playlist being expanded.
    pub reference: Vec<String>,
    pub proposal_size: usize,
    pub max_per_artist: usize,
}

#[derive(Debug)]
pub enum CurationError {
    Transport(String),
    Blocked(String),
    EmptyResponse,
    Unparsable(String),
    Malformed(String),
    NoCandidates,
    Exhausted,
}

impl fmt::Display for CurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurationError::Transport(e) => write!(f, "request to the model failed: {}", e),
            CurationError::Blocked(reason) => {
                write!(f, "response blocked by the model: {}", reason)
            }
            CurationError::EmptyResponse => write!(f, "the model returned no text"),
            CurationError::Unparsable(e) => {
                write!(f, "the model returned text that is not JSON: {}", e)
            }
            CurationError::Malformed(e) => write!(f, "the model returned unexpected JSON: {}", e),
            CurationError::NoCandidates => write!(f, "the model returned an empty track list"),
            CurationError::Exhausted => write!(f, "no more candidates to propose"),
        }
    }
}

impl std::error::Error for CurationError {}

impl From<reqwest::Error> for CurationError {
    fn from(err: reqwest::Error) -> Self {
        CurationError::Transport(err.to_string())
    }
}

/// Source of track proposals.
#[allow(async_fn_in_trait)]
pub trait Curator {
    async fn propose(
        &self,
        request: &CurationRequest,
        history: &[String],
    ) -> Result<Vec<Candidate>, CurationError>;
}

/// Catalog search returning at most one hit.
#[allow(async_fn_in_trait)]
pub trait CatalogSearch {
    async fn search_track(&self, query: &str) -> Result<Option<SearchHit>, SpotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub uri: String,
    pub artist: String,
    pub title: String,
}

impl PlaylistEntry {
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// One page of playlist items.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub entries: Vec<PlaylistEntry>,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct CreatedPlaylist {
    pub id: String,
    pub url: Option<String>,
}

/// Playlist operations used by the writer.
#[allow(async_fn_in_trait)]
pub trait PlaylistStore {
    async fn current_user_id(&self) -> Result<String, SpotifyError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist, SpotifyError>;

    async fn playlist_page(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage, SpotifyError>;

    /// Appends at most 100 items.
    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyError>;
}

/// Hands out a fixed candidate list once, e.g. one pasted by the user.
pub struct PastedCurator {
    candidates: Cell<Option<Vec<Candidate>>>,
}

impl PastedCurator {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: Cell::new(Some(candidates)),
        }
    }
}

impl Curator for PastedCurator {
    async fn propose(
        &self,
        _request: &CurationRequest,
        _history: &[String],
    ) -> Result<Vec<Candidate>, CurationError> {
        match self.candidates.take() {
            Some(candidates) if candidates.is_empty() => Err(CurationError::NoCandidates),
            Some(candidates) => Ok(candidates),
            None => Err(CurationError::Exhausted),
        }
    }
}
