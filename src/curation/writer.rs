use std::collections::HashSet;

use super::{PlaylistEntry, PlaylistStore};
use crate::{info, spotify::SpotifyError, success};

/// Maximum number of items per add request accepted by the Web API.
pub const MAX_ITEMS_PER_REQUEST: usize = 100;
/// Page size used when walking an existing playlist.
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub enum PlaylistTarget {
    New { name: String, description: String },
    Existing(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub playlist_id: Option<String>,
    pub url: Option<String>,
    pub added: usize,
    pub skipped_local: usize,
    pub skipped_remote: usize,
}

/// Fetches every item of a playlist, page by page.
pub async fn fetch_all_entries<S: PlaylistStore>(
    store: &S,
    playlist_id: &str,
) -> Result<Vec<PlaylistEntry>, SpotifyError> {
    let mut entries = Vec::new();
    let mut offset = 0;

    loop {
        let page = store.playlist_page(playlist_id, offset, PAGE_SIZE).await?;
        entries.extend(page.entries);
        if !page.has_next {
            break;
        }
        offset += PAGE_SIZE;
    }

    Ok(entries)
}

pub struct PlaylistWriter<'a, S> {
    store: &'a S,
}

impl<'a, S: PlaylistStore> PlaylistWriter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Persists `uris` into a new or an existing playlist.
    ///
    /// The batch is deduplicated first. When extending, tracks already in the
    /// playlist (across all of its pages) are dropped as well. Nothing is
    /// created or sent when no new track remains.
    pub async fn write(
        &self,
        uris: &[String],
        target: PlaylistTarget,
    ) -> Result<WriteReport, SpotifyError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut unique: Vec<String> = Vec::new();
        for uri in uris {
            if seen.insert(uri.as_str()) {
                unique.push(uri.clone());
            }
        }

        let mut report = WriteReport {
            skipped_local: uris.len() - unique.len(),
            ..WriteReport::default()
        };

        if unique.is_empty() {
            info!("No valid tracks found, playlist left untouched.");
            return Ok(report);
        }

        match target {
            PlaylistTarget::New { name, description } => {
                let user_id = self.store.current_user_id().await?;
                let playlist = self
                    .store
                    .create_playlist(&user_id, &name, &description)
                    .await?;
                success!("Playlist '{}' created.", name);

                self.add_in_chunks(&playlist.id, &unique).await?;
                report.playlist_id = Some(playlist.id);
                report.url = playlist.url;
                report.added = unique.len();
            }
            PlaylistTarget::Existing(playlist_id) => {
                let remote: HashSet<String> = fetch_all_entries(self.store, &playlist_id)
                    .await?
                    .into_iter()
                    .map(|entry| entry.uri)
                    .collect();

                let fresh: Vec<String> = unique
                    .into_iter()
                    .filter(|uri| !remote.contains(uri))
                    .collect();
                report.skipped_remote = uris.len() - report.skipped_local - fresh.len();
                report.playlist_id = Some(playlist_id.clone());

                if fresh.is_empty() {
                    info!("All tracks are already in the playlist, nothing to add.");
                    return Ok(report);
                }

                self.add_in_chunks(&playlist_id, &fresh).await?;
                report.added = fresh.len();
            }
        }

        Ok(report)
    }

    async fn add_in_chunks(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyError> {
        for chunk in uris.chunks(MAX_ITEMS_PER_REQUEST) {
            self.store.add_items(playlist_id, chunk).await?;
        }
        Ok(())
    }
}
