use crate::{
    curation::{CreatedPlaylist, PlaylistEntry, PlaylistPage, PlaylistStore},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, Paging, PlaylistItem,
    },
};

use super::{SpotifyClient, SpotifyError};

const ITEM_FIELDS: &str = "items(track(name,uri,artists(name))),next";

impl SpotifyClient {
    /// Creates a public, non-collaborative playlist owned by `user_id`.
    pub async fn create(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        let url = self.url(&format!("/users/{}/playlists", user_id));
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: true,
            collaborative: false,
        };

        let response = self.send(|http| http.post(&url).json(&body)).await?;
        Ok(response.json::<CreatePlaylistResponse>().await?)
    }

    pub async fn items(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Paging<PlaylistItem>, SpotifyError> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        let offset = offset.to_string();
        let limit = limit.to_string();
        let response = self
            .send(|http| {
                http.get(&url).query(&[
                    ("fields", ITEM_FIELDS),
                    ("limit", limit.as_str()),
                    ("offset", offset.as_str()),
                    ("market", self.market()),
                ])
            })
            .await?;

        Ok(response.json::<Paging<PlaylistItem>>().await?)
    }

    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: Vec<String>,
    ) -> Result<AddTrackToPlaylistResponse, SpotifyError> {
        let url = self.url(&format!("/playlists/{}/tracks", playlist_id));
        let body = AddTrackToPlaylistRequest { uris };

        let response = self.send(|http| http.post(&url).json(&body)).await?;
        Ok(response.json::<AddTrackToPlaylistResponse>().await?)
    }
}

impl PlaylistStore for SpotifyClient {
    async fn current_user_id(&self) -> Result<String, SpotifyError> {
        Ok(self.current_user().await?.id)
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreatedPlaylist, SpotifyError> {
        let playlist = self.create(user_id, name, description).await?;
        Ok(CreatedPlaylist {
            id: playlist.id,
            url: playlist.external_urls.spotify,
        })
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage, SpotifyError> {
        let page = self.items(playlist_id, offset, limit).await?;
        let entries = page
            .items
            .into_iter()
            .filter_map(|item| item.track)
            .filter_map(|track| {
                Some(PlaylistEntry {
                    artist: track
                        .artists
                        .first()
                        .map(|artist| artist.name.clone())
                        .unwrap_or_default(),
                    uri: track.uri?,
                    title: track.name,
                })
            })
            .collect();

        Ok(PlaylistPage {
            entries,
            has_next: page.next.is_some(),
        })
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<(), SpotifyError> {
        self.add_tracks(playlist_id, uris.to_vec()).await?;
        Ok(())
    }
}
