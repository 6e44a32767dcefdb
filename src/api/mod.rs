//! # API Module
//!
//! HTTP endpoints served by the temporary local server that runs during the
//! Spotify authorization flow.
//!
//! ## Endpoints
//!
//! - [`callback`] - Receives the authorization code from Spotify's redirect,
//!   exchanges it together with the PKCE verifier for a token and stores the
//!   token in the shared state the flow is polling.
//! - [`health`] - Returns status and version, handy to check that the
//!   redirect URI points at the running server.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use playlist_curator::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
