use crate::{
    curation::{CatalogSearch, SearchHit},
    types::{SearchResponse, Track},
};

use super::{SpotifyClient, SpotifyError};

impl SpotifyClient {
    /// Searches the catalog for tracks in the configured market.
    ///
    /// `query` may use field filters such as `track:` and `artist:`.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, SpotifyError> {
        let url = self.url("/search");
        let limit = limit.to_string();
        let response = self
            .send(|http| {
                http.get(&url).query(&[
                    ("q", query),
                    ("type", "track"),
                    ("limit", limit.as_str()),
                    ("market", self.market()),
                ])
            })
            .await?;

        let body = response.json::<SearchResponse>().await?;
        Ok(body.tracks.map(|page| page.items).unwrap_or_default())
    }
}

impl CatalogSearch for SpotifyClient {
    async fn search_track(&self, query: &str) -> Result<Option<SearchHit>, SpotifyError> {
        let tracks = self.search_tracks(query, 1).await?;
        Ok(tracks.into_iter().find_map(hit_from_track))
    }
}

/// Tracks without a uri (local files) cannot be added to a playlist.
pub fn hit_from_track(track: Track) -> Option<SearchHit> {
    let artist = track
        .artists
        .first()
        .map(|artist| artist.name.clone())
        .unwrap_or_default();

    Some(SearchHit {
        uri: track.uri?,
        artist,
        title: track.name,
    })
}
