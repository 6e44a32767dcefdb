use crate::types::CurrentUser;

use super::{SpotifyClient, SpotifyError};

impl SpotifyClient {
    /// Profile of the user the token belongs to.
    pub async fn current_user(&self) -> Result<CurrentUser, SpotifyError> {
        let url = self.url("/me");
        let response = self.send(|http| http.get(&url)).await?;
        Ok(response.json::<CurrentUser>().await?)
    }
}
