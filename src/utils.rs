use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric, seq::IndexedRandom};
use reqwest::Url;
use sha2::{Digest, Sha256};

/// Longest query prefix kept in a generated playlist name.
pub const PLAYLIST_NAME_MAX_CHARS: usize = 60;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Builds the name of a freshly created playlist: `AI ` plus the query,
/// truncated to 60 characters with a trailing `...`.
pub fn playlist_name(query: &str) -> String {
    let query = query.trim();
    let safe_name = if query.chars().count() > PLAYLIST_NAME_MAX_CHARS {
        let head: String = query.chars().take(PLAYLIST_NAME_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        query.to_string()
    };
    format!("AI {}", safe_name)
}

/// Extracts a playlist id from an `open.spotify.com` URL, a
/// `spotify:playlist:` URI or a bare id.
pub fn parse_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(id) = input.strip_prefix("spotify:playlist:") {
        return valid_id(id);
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let url = Url::parse(input).ok()?;
        if !url.host_str()?.ends_with("spotify.com") {
            return None;
        }
        let mut segments = url.path_segments()?;
        // locale prefixed links look like /intl-it/playlist/{id}
        while let Some(segment) = segments.next() {
            if segment == "playlist" {
                return segments.next().and_then(valid_id);
            }
        }
        return None;
    }

    valid_id(input)
}

fn valid_id(id: &str) -> Option<String> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// Picks up to `amount` labels at random, without repetition.
pub fn sample_labels(labels: &[String], amount: usize) -> Vec<String> {
    labels
        .choose_multiple(&mut rand::rng(), amount)
        .cloned()
        .collect()
}
