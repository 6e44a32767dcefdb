mod common;

use common::{FakeSearch, hit};
use playlist_curator::curation::{
    Candidate, GateMode, Resolution, ResolvedTrack, Resolver,
    resolver::{field_matches, passes_gate, search_queries, similarity},
};

#[test]
fn test_similarity_is_case_insensitive() {
    assert_eq!(similarity("Radiohead", "RADIOHEAD"), 1.0);
    assert!(similarity("Daft Punk", "Daft Funk") > 0.6);
    assert!(similarity("Radiohead", "Coldplay") < 0.6);
}

#[test]
fn test_field_matches_substring() {
    // Neither string is similar enough, but one contains the other
    assert!(field_matches("Beatles", "The Beatles - Remastered 2009 Edition"));
    assert!(field_matches("Creep (Acoustic Live Version)", "Creep"));
    // Empty strings never match by containment
    assert!(!field_matches("", "Creep"));
}

#[test]
fn test_gate_requires_both_fields() {
    let found = hit("Daft Punk", "Around the World", "spotify:track:1");

    // Artist is one letter off, title is contained in the requested one
    assert!(passes_gate("Daft Funk", "Around the World (Radio Edit)", &found));

    // Title is identical but the artist is unrelated
    assert!(!passes_gate("Coldplay", "Around the World", &found));
}

#[test]
fn test_search_queries_order() {
    let queries = search_queries("Radiohead", "Creep");
    assert_eq!(queries[0], "track:Creep artist:Radiohead");
    assert_eq!(queries[1], "Creep Radiohead");
}

#[tokio::test]
async fn test_incomplete_candidate_is_skipped_without_search() {
    let search = FakeSearch::new();
    let resolver = Resolver::new(&search, GateMode::Strict);

    let missing_title = Candidate {
        artist: Some("Radiohead".to_string()),
        title: None,
    };
    let blank_artist = Candidate::new("   ", "Creep");

    assert_eq!(resolver.resolve(&missing_title).await, Resolution::Skipped);
    assert_eq!(resolver.resolve(&blank_artist).await, Resolution::Skipped);
    assert_eq!(search.calls(), 0);
}

#[tokio::test]
async fn test_matching_hit_is_resolved() {
    let search = FakeSearch::new().with_hit(
        "track:Creep artist:Radiohead",
        hit("Radiohead", "Creep", "spotify:track:creep"),
    );
    let resolver = Resolver::new(&search, GateMode::Strict);

    let resolution = resolver.resolve(&Candidate::new("Radiohead", "Creep")).await;

    assert_eq!(
        resolution,
        Resolution::Resolved(ResolvedTrack {
            uri: "spotify:track:creep".to_string(),
            artist: "Radiohead".to_string(),
            title: "Creep".to_string(),
        })
    );
    assert_eq!(search.calls(), 1);
}

#[tokio::test]
async fn test_dissimilar_artist_is_rejected() {
    let search = FakeSearch::new().with_hit(
        "track:Creep artist:Radiohead",
        hit("Stone Temple Pilots", "Creep", "spotify:track:stp"),
    );
    let resolver = Resolver::new(&search, GateMode::Strict);

    let resolution = resolver.resolve(&Candidate::new("Radiohead", "Creep")).await;

    assert!(matches!(resolution, Resolution::Rejected(_)));
}

#[tokio::test]
async fn test_fallback_query_used_when_field_query_finds_nothing() {
    let search = FakeSearch::new().with_hit(
        "Creep Radiohead",
        hit("Radiohead", "Creep - Remastered", "spotify:track:creep"),
    );
    let resolver = Resolver::new(&search, GateMode::Strict);

    let resolution = resolver.resolve(&Candidate::new("Radiohead", "Creep")).await;

    assert!(matches!(resolution, Resolution::Resolved(_)));
    assert_eq!(
        *search.queries.borrow(),
        vec![
            "track:Creep artist:Radiohead".to_string(),
            "Creep Radiohead".to_string()
        ]
    );
}

#[tokio::test]
async fn test_fallback_query_used_after_search_error() {
    let search = FakeSearch::new()
        .with_failure("track:Creep artist:Radiohead")
        .with_hit("Creep Radiohead", hit("Radiohead", "Creep", "spotify:track:creep"));
    let resolver = Resolver::new(&search, GateMode::Strict);

    let resolution = resolver.resolve(&Candidate::new("Radiohead", "Creep")).await;

    assert!(matches!(resolution, Resolution::Resolved(_)));
    assert_eq!(search.calls(), 2);
}

#[tokio::test]
async fn test_no_fallback_after_rejection() {
    let search = FakeSearch::new()
        .with_hit(
            "track:Creep artist:Radiohead",
            hit("Some Cover Band", "Sleep", "spotify:track:cover"),
        )
        .with_hit("Creep Radiohead", hit("Radiohead", "Creep", "spotify:track:creep"));
    let resolver = Resolver::new(&search, GateMode::Strict);

    let resolution = resolver.resolve(&Candidate::new("Radiohead", "Creep")).await;

    assert!(matches!(resolution, Resolution::Rejected(_)));
    assert_eq!(search.calls(), 1);
}

#[tokio::test]
async fn test_not_found_after_both_queries() {
    let search = FakeSearch::new();
    let resolver = Resolver::new(&search, GateMode::Strict);

    let resolution = resolver.resolve(&Candidate::new("Nobody", "Nothing")).await;

    assert_eq!(resolution, Resolution::NotFound);
    assert_eq!(search.calls(), 2);
}

#[tokio::test]
async fn test_gate_off_accepts_first_hit() {
    let search = FakeSearch::new().with_hit(
        "track:Creep artist:Radiohead",
        hit("Stone Temple Pilots", "Creep", "spotify:track:stp"),
    );
    let resolver = Resolver::new(&search, GateMode::from_guardrail(false));

    assert_eq!(resolver.mode(), GateMode::Off);
    let resolution = resolver.resolve(&Candidate::new("Radiohead", "Creep")).await;

    match resolution {
        Resolution::Resolved(track) => assert_eq!(track.uri, "spotify:track:stp"),
        other => panic!("expected a resolved track, got {:?}", other),
    }
}

#[test]
fn test_gate_known_pairs() {
    let paranoid = hit("Radiohead", "Paranoid Android", "spotify:track:pa");
    assert!(passes_gate("Radiohead", "Paranoid Android", &paranoid));

    // Close artist, unrelated title
    let wrong = hit("Daft Funk", "Around the World", "spotify:track:df");
    assert!(!passes_gate("Daft Punk", "One More Time", &wrong));
}
