use serde_json::{Map, Value};

use super::{Candidate, CurationError};

const ARTIST_KEYS: [&str; 5] = ["artist", "Artist", "ARTIST", "artist_name", "artistName"];
const TITLE_KEYS: [&str; 10] = [
    "track", "Track", "TRACK", "title", "Title", "TITLE", "song", "Song", "name", "Name",
];

/// Removes a surrounding markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // drop the language tag
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a model response into candidates.
///
/// Accepts a JSON array of objects, optionally fenced, or an object wrapping
/// such an array. Entries that are not objects are dropped; objects missing
/// a field are kept so the resolver can skip them.
pub fn parse_candidates(text: &str) -> Result<Vec<Candidate>, CurationError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(CurationError::EmptyResponse);
    }

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(e) => embedded_array(body).ok_or_else(|| CurationError::Unparsable(e.to_string()))?,
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.into_iter().find_map(|(_, v)| match v {
            Value::Array(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items,
            None => return Err(CurationError::Malformed("object without a track list".to_string())),
        },
        other => {
            return Err(CurationError::Malformed(format!(
                "expected a list of tracks, got {}",
                kind(&other)
            )));
        }
    };

    let candidates: Vec<Candidate> = items
        .iter()
        .filter_map(Value::as_object)
        .map(candidate_from_object)
        .collect();

    if candidates.is_empty() {
        return Err(CurationError::NoCandidates);
    }
    Ok(candidates)
}

fn candidate_from_object(object: &Map<String, Value>) -> Candidate {
    Candidate {
        artist: first_string(object, &ARTIST_KEYS),
        title: first_string(object, &TITLE_KEYS),
    }
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

// Models sometimes wrap the array in prose despite the JSON mime type.
fn embedded_array(text: &str) -> Option<Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
