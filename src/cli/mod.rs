//! # CLI Module
//!
//! User-facing commands of the playlist curator. Each command receives the
//! [`Settings`](crate::config::Settings) built at startup and constructs the
//! service clients it needs.
//!
//! ## Commands
//!
//! - [`auth`] - Spotify authorization (PKCE flow with a local callback server)
//! - [`curate`] - Interactive or one-shot playlist sessions
//! - [`models`] - Lists the Gemini models available to the API key
//!
//! ## Session Flow
//!
//! ```text
//! prompts / flags
//!     ↓
//! reference sample (optional, existing playlist)
//!     ↓
//! FillLoop: Gemini rounds → Resolver → accumulator
//!     ↓
//! PlaylistWriter: new playlist or extend with remote dedup
//! ```
//!
//! Failures inside a session are printed and the next query is prompted.
//! Only missing configuration and a failed authorization end the process.
//!
//! ## Usage Patterns
//!
//! ```bash
//! playlist-curator auth
//! playlist-curator curate
//! playlist-curator curate --query "Acid Jazz" --energy high
//! playlist-curator curate --query "more of this" --extend https://open.spotify.com/playlist/...
//! playlist-curator curate --query "Italo Disco" --candidates tracks.json
//! playlist-curator models
//! ```

mod auth;
mod curate;
mod models;

pub use auth::auth;
pub use curate::{
    Prompted, SessionInput, SessionOptions, Source, SourceInput, curate, normalize_energy,
    parse_source, session_loop,
};
pub use models::models;
