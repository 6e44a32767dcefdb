//! Configuration management for the playlist curator.
//!
//! This module loads `.env` files and turns the process environment into a
//! [`Settings`] value that is built once at startup and handed to every
//! service object. Nothing else in the crate reads environment variables.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`playlist-curator/.env`)
//! 4. Application defaults (for everything except the four credentials)

use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use reqwest::Url;

/// Directory name used below the platform data directory.
pub const APP_DIR: &str = "playlist-curator";

pub const SPOTIFY_CLIENT_ID_VAR: &str = "SPOTIFY_API_AUTH_CLIENT_ID";
pub const SPOTIFY_CLIENT_SECRET_VAR: &str = "SPOTIFY_API_AUTH_CLIENT_SECRET";
pub const SPOTIFY_REDIRECT_URI_VAR: &str = "SPOTIFY_API_REDIRECT_URI";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Credentials without which the process refuses to start.
pub const REQUIRED_VARS: [&str; 4] = [
    SPOTIFY_CLIENT_ID_VAR,
    SPOTIFY_CLIENT_SECRET_VAR,
    SPOTIFY_REDIRECT_URI_VAR,
    GEMINI_API_KEY_VAR,
];

const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private playlist-read-private";
const DEFAULT_MARKET: &str = "IT";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Upper bound of the history window sent with each prompt.
pub const MAX_HISTORY_WINDOW: usize = 50;

#[derive(Debug)]
pub enum ConfigError {
    Missing(Vec<&'static str>),
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(vars) => write!(
                f,
                "missing credentials: {}. Set them in the environment or in a .env file",
                vars.join(", ")
            ),
            ConfigError::Invalid { var, value, reason } => {
                write!(f, "invalid value '{}' for {}: {}", value, var, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Spotify OAuth settings used by the authorization flow and token refresh.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
    /// Address the local callback server binds to, e.g. `127.0.0.1:8888`.
    pub server_addr: String,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

/// Knobs of the fill loop and the prompt.
#[derive(Debug, Clone)]
pub struct CurationSettings {
    /// Number of verified tracks a session aims for.
    pub target_tracks: usize,
    /// Maximum number of model rounds per session.
    pub max_retries: u32,
    /// Pause between two rounds.
    pub round_pause: Duration,
    /// Number of tracks requested from the model per round.
    pub proposal_size: usize,
    /// Diversity constraint written into the prompt.
    pub max_per_artist: usize,
    /// Number of most recent history entries included in a prompt.
    pub history_window: usize,
    /// Number of reference tracks sampled from an existing playlist.
    pub reference_sample: usize,
    /// Whether search hits must pass the similarity gate.
    pub guardrail: bool,
}

impl Default for CurationSettings {
    fn default() -> Self {
        Self {
            target_tracks: 30,
            max_retries: 3,
            round_pause: Duration::from_millis(1000),
            proposal_size: 35,
            max_per_artist: 2,
            history_window: MAX_HISTORY_WINDOW,
            reference_sample: 10,
            guardrail: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub oauth: OAuthSettings,
    pub spotify_api_url: String,
    /// ISO 3166-1 alpha-2 market passed to catalog searches.
    pub market: String,
    pub gemini: GeminiSettings,
    pub curation: CurationSettings,
}

impl Settings {
    /// Builds settings from the process environment.
    ///
    /// Fails with [`ConfigError::Missing`] naming every absent credential, so
    /// the user can fix them all at once.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// Blank values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&'static str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |key: &'static str| value(key).unwrap_or_default();
        let or_default =
            |key: &str, default: &str| value(key).unwrap_or_else(|| default.to_string());

        let redirect_uri = required(SPOTIFY_REDIRECT_URI_VAR);
        let server_addr = match value("SERVER_ADDRESS") {
            Some(addr) => addr,
            None => server_addr_from_redirect(&redirect_uri)?,
        };

        let defaults = CurationSettings::default();
        let number = |key: &'static str| (key, value(key));
        let curation = CurationSettings {
            target_tracks: positive(number("CURATOR_TARGET_TRACKS"), defaults.target_tracks)?,
            max_retries: positive(number("CURATOR_MAX_RETRIES"), defaults.max_retries)?,
            round_pause: Duration::from_millis(parsed(
                number("CURATOR_ROUND_PAUSE_MS"),
                defaults.round_pause.as_millis() as u64,
            )?),
            proposal_size: positive(number("CURATOR_PROPOSAL_SIZE"), defaults.proposal_size)?,
            max_per_artist: positive(number("CURATOR_MAX_PER_ARTIST"), defaults.max_per_artist)?,
            history_window: history_window(number("CURATOR_HISTORY_WINDOW"))?,
            reference_sample: parsed(
                number("CURATOR_REFERENCE_SAMPLE"),
                defaults.reference_sample,
            )?,
            guardrail: defaults.guardrail,
        };

        Ok(Settings {
            oauth: OAuthSettings {
                client_id: required(SPOTIFY_CLIENT_ID_VAR),
                client_secret: required(SPOTIFY_CLIENT_SECRET_VAR),
                redirect_uri,
                auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
                token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
                scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
                server_addr,
            },
            spotify_api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            market: or_default("SPOTIFY_MARKET", DEFAULT_MARKET).to_uppercase(),
            gemini: GeminiSettings {
                api_key: required(GEMINI_API_KEY_VAR),
                api_url: or_default("GEMINI_API_URL", DEFAULT_GEMINI_URL)
                    .trim_end_matches('/')
                    .to_string(),
                model: or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            },
            curation,
        })
    }
}

/// Loads `.env` files from the working directory and the local data directory.
///
/// Missing files are fine; the credentials may come from the real
/// environment. Variables that are already set are never overridden.
///
/// # Directory Structure
///
/// The second `.env` file is looked up in:
/// - Linux: `~/.local/share/playlist-curator/.env`
/// - macOS: `~/Library/Application Support/playlist-curator/.env`
/// - Windows: `%LOCALAPPDATA%/playlist-curator/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    dotenv::dotenv().ok();

    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns `<data_local_dir>/playlist-curator`.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn server_addr_from_redirect(redirect_uri: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: SPOTIFY_REDIRECT_URI_VAR,
        value: redirect_uri.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(redirect_uri).map_err(|e| invalid(&e.to_string()))?;
    let host = match url.host_str() {
        Some("localhost") => "127.0.0.1",
        Some(host) => host,
        None => return Err(invalid("redirect URI has no host")),
    };
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid("redirect URI has no port"))?;

    Ok(format!("{}:{}", host, port))
}

type RawVar = (&'static str, Option<String>);

fn parsed<T: FromStr>((var, value): RawVar, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::Invalid {
            var,
            value: raw,
            reason: "not a valid number".to_string(),
        }),
        None => Ok(default),
    }
}

fn positive<T>((var, value): RawVar, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let raw = value.clone().unwrap_or_default();
    let number = parsed((var, value), default)?;
    if number <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(number)
}

fn history_window((var, value): RawVar) -> Result<usize, ConfigError> {
    let raw = value.clone().unwrap_or_default();
    let window = parsed((var, value), MAX_HISTORY_WINDOW)?;
    if window > MAX_HISTORY_WINDOW {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: format!("at most {} entries are sent to the model", MAX_HISTORY_WINDOW),
        });
    }
    Ok(window)
}
