mod common;

use common::FakeStore;
use playlist_curator::curation::{
    PlaylistTarget, PlaylistWriter, fetch_all_entries,
    writer::{MAX_ITEMS_PER_REQUEST, PAGE_SIZE},
};

fn uris(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn new_playlist() -> PlaylistTarget {
    PlaylistTarget::New {
        name: "AI Acid Jazz".to_string(),
        description: "Curated by AI from: Acid Jazz".to_string(),
    }
}

#[tokio::test]
async fn test_extend_skips_remote_and_local_duplicates() {
    let store = FakeStore::new(&["A", "B"]);

    let report = PlaylistWriter::new(&store)
        .write(&uris(&["A", "C", "C"]), PlaylistTarget::Existing("pl".to_string()))
        .await
        .unwrap();

    assert_eq!(store.added(), uris(&["C"]));
    assert_eq!(report.added, 1);
    assert_eq!(report.skipped_local, 1);
    assert_eq!(report.skipped_remote, 1);
    assert!(store.created.borrow().is_empty());
}

#[tokio::test]
async fn test_inserts_are_chunked() {
    let store = FakeStore::new(&[]);
    let batch: Vec<String> = (0..250).map(|i| format!("spotify:track:{}", i)).collect();

    let report = PlaylistWriter::new(&store)
        .write(&batch, new_playlist())
        .await
        .unwrap();

    assert_eq!(MAX_ITEMS_PER_REQUEST, 100);
    assert_eq!(store.add_sizes(), vec![100, 100, 50]);
    assert_eq!(store.added(), batch);
    assert_eq!(report.added, 250);
    assert_eq!(report.playlist_id.as_deref(), Some("new-playlist"));
    assert!(report.url.is_some());
}

#[tokio::test]
async fn test_remote_dedup_reads_every_page() {
    // The duplicate sits on the third page
    let existing: Vec<String> = (0..230).map(|i| format!("spotify:track:{}", i)).collect();
    let store = FakeStore::with_existing(existing);

    let report = PlaylistWriter::new(&store)
        .write(
            &uris(&["spotify:track:225", "spotify:track:new"]),
            PlaylistTarget::Existing("pl".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(*store.page_offsets.borrow(), vec![0, PAGE_SIZE, 2 * PAGE_SIZE]);
    assert_eq!(store.added(), uris(&["spotify:track:new"]));
    assert_eq!(report.skipped_remote, 1);
}

#[tokio::test]
async fn test_empty_batch_creates_nothing() {
    let store = FakeStore::new(&[]);

    let report = PlaylistWriter::new(&store)
        .write(&[], new_playlist())
        .await
        .unwrap();

    assert!(store.created.borrow().is_empty());
    assert!(store.adds.borrow().is_empty());
    assert_eq!(report.playlist_id, None);
    assert_eq!(report.added, 0);
}

#[tokio::test]
async fn test_extend_with_nothing_new_sends_no_insert() {
    let store = FakeStore::new(&["A", "B"]);

    let report = PlaylistWriter::new(&store)
        .write(&uris(&["B", "A"]), PlaylistTarget::Existing("pl".to_string()))
        .await
        .unwrap();

    assert!(store.adds.borrow().is_empty());
    assert_eq!(report.added, 0);
    assert_eq!(report.skipped_remote, 2);
}

#[tokio::test]
async fn test_new_playlist_keeps_first_occurrence_order() {
    let store = FakeStore::new(&[]);

    PlaylistWriter::new(&store)
        .write(&uris(&["C", "A", "C", "B", "A"]), new_playlist())
        .await
        .unwrap();

    assert_eq!(*store.created.borrow(), vec!["AI Acid Jazz".to_string()]);
    assert_eq!(store.added(), uris(&["C", "A", "B"]));
}

#[tokio::test]
async fn test_fetch_all_entries_single_page() {
    let store = FakeStore::new(&["A", "B", "C"]);

    let entries = fetch_all_entries(&store, "pl").await.unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(*store.page_offsets.borrow(), vec![0]);
    assert_eq!(entries[0].label(), "Artist - A");
}

#[tokio::test]
async fn test_extend_with_empty_batch_reads_nothing() {
    let store = FakeStore::new(&["A", "B"]);

    let report = PlaylistWriter::new(&store)
        .write(&[], PlaylistTarget::Existing("pl".to_string()))
        .await
        .unwrap();

    assert!(store.page_offsets.borrow().is_empty());
    assert!(store.adds.borrow().is_empty());
    assert_eq!(report.added, 0);
    assert_eq!(report.skipped_remote, 0);
}
