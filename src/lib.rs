//! Playlist Curator Library
//!
//! This library builds Spotify playlists from track proposals made by a Gemini
//! model. Proposals are untrusted free text, so every (artist, title) pair is
//! resolved against the Spotify catalog and checked by a similarity gate before
//! it reaches a playlist.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Settings loaded from the environment and `.env` files
//! - `curation` - Candidate parsing, resolution, the fill loop and the playlist writer
//! - `gemini` - Gemini REST client (track proposals, model listing)
//! - `management` - Token cache and session history
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Wire types for both services and table rows
//! - `utils` - Small helpers (PKCE, playlist references, naming)
//!
//! # Example
//!
//! ```
//! use playlist_curator::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> playlist_curator::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env()?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod curation;
pub mod gemini;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the CLI boundary where errors from different layers meet. The
/// layers themselves return their own error enums.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Verifying {} tracks on Spotify...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Added {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for conditions the session cannot recover from, such as missing
/// credentials at startup.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable failures: a skipped candidate, a failed model round,
/// a playlist call that was rejected.
///
/// # Example
///
/// ```
/// warning!("Gemini round failed: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
