use std::{collections::HashMap, time::Duration};

use playlist_curator::config::{ConfigError, MAX_HISTORY_WINDOW, Settings};

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn credentials() -> Vec<(&'static str, &'static str)> {
    vec![
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client-id"),
        ("SPOTIFY_API_AUTH_CLIENT_SECRET", "client-secret"),
        ("SPOTIFY_API_REDIRECT_URI", "http://localhost:8888/callback"),
        ("GEMINI_API_KEY", "gemini-key"),
    ]
}

#[test]
fn test_missing_credentials_are_all_listed() {
    let result = Settings::from_lookup(lookup(&[
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client-id"),
        ("GEMINI_API_KEY", "   "),
    ]));

    match result {
        Err(ConfigError::Missing(vars)) => assert_eq!(
            vars,
            vec![
                "SPOTIFY_API_AUTH_CLIENT_SECRET",
                "SPOTIFY_API_REDIRECT_URI",
                "GEMINI_API_KEY"
            ]
        ),
        other => panic!("expected missing credentials, got {:?}", other),
    }
}

#[test]
fn test_defaults() {
    let settings = Settings::from_lookup(lookup(&credentials())).unwrap();

    assert_eq!(settings.market, "IT");
    assert_eq!(settings.spotify_api_url, "https://api.spotify.com/v1");
    assert_eq!(settings.gemini.model, "gemini-3-flash-preview");
    assert_eq!(settings.oauth.server_addr, "127.0.0.1:8888");

    let curation = settings.curation;
    assert_eq!(curation.target_tracks, 30);
    assert_eq!(curation.max_retries, 3);
    assert_eq!(curation.round_pause, Duration::from_millis(1000));
    assert_eq!(curation.history_window, 50);
    assert!(curation.guardrail);
}

#[test]
fn test_overrides() {
    let mut pairs = credentials();
    pairs.extend([
        ("SPOTIFY_MARKET", "us"),
        ("SPOTIFY_API_URL", "http://127.0.0.1:9000/v1/"),
        ("SERVER_ADDRESS", "0.0.0.0:9999"),
        ("CURATOR_TARGET_TRACKS", "12"),
        ("CURATOR_ROUND_PAUSE_MS", "0"),
    ]);

    let settings = Settings::from_lookup(lookup(&pairs)).unwrap();

    assert_eq!(settings.market, "US");
    assert_eq!(settings.spotify_api_url, "http://127.0.0.1:9000/v1");
    assert_eq!(settings.oauth.server_addr, "0.0.0.0:9999");
    assert_eq!(settings.curation.target_tracks, 12);
    assert_eq!(settings.curation.round_pause, Duration::ZERO);
}

#[test]
fn test_invalid_numbers_are_rejected() {
    let mut pairs = credentials();
    pairs.push(("CURATOR_MAX_RETRIES", "0"));
    assert!(matches!(
        Settings::from_lookup(lookup(&pairs)),
        Err(ConfigError::Invalid {
            var: "CURATOR_MAX_RETRIES",
            ..
        })
    ));

    let mut pairs = credentials();
    pairs.push(("CURATOR_TARGET_TRACKS", "thirty"));
    assert!(matches!(
        Settings::from_lookup(lookup(&pairs)),
        Err(ConfigError::Invalid {
            var: "CURATOR_TARGET_TRACKS",
            ..
        })
    ));
}

#[test]
fn test_invalid_redirect_uri() {
    let mut pairs = credentials();
    pairs.retain(|(k, _)| *k != "SPOTIFY_API_REDIRECT_URI");
    pairs.push(("SPOTIFY_API_REDIRECT_URI", "not a url"));

    assert!(matches!(
        Settings::from_lookup(lookup(&pairs)),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn test_history_window_is_bounded() {
    let mut pairs = credentials();
    pairs.push(("CURATOR_HISTORY_WINDOW", "500"));
    assert!(matches!(
        Settings::from_lookup(lookup(&pairs)),
        Err(ConfigError::Invalid {
            var: "CURATOR_HISTORY_WINDOW",
            ..
        })
    ));

    let mut pairs = credentials();
    pairs.push(("CURATOR_HISTORY_WINDOW", "20"));
    let settings = Settings::from_lookup(lookup(&pairs)).unwrap();
    assert_eq!(settings.curation.history_window, 20);

    let settings = Settings::from_lookup(lookup(&credentials())).unwrap();
    assert_eq!(settings.curation.history_window, MAX_HISTORY_WINDOW);
}
