use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Error object Spotify embeds in a response body instead of the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyErrorObject {
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

impl From<SpotifyErrorObject> for ApiError {
    fn from(error: SpotifyErrorObject) -> Self {
        ApiError::Api {
            status: error.status,
            message: error.message,
        }
    }
}

/// Response of `GET /search?type=track`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub error: Option<SpotifyErrorObject>,
    #[serde(default)]
    pub tracks: Option<SearchTrackPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrackPage {
    /// Spotify sends `null` for tracks it can't describe
    #[serde(default)]
    pub items: Vec<Option<SearchTrackItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrackItem {
    pub uri: String,
}

/// Body of `POST /users/{user_id}/playlists`
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub public: bool,
}

/// Response of `POST /users/{user_id}/playlists`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    #[serde(default)]
    pub error: Option<SpotifyErrorObject>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Picks the URI of the first track in a search response, ignoring `null`
/// items.
///
/// An embedded error object is returned as [`ApiError::Api`]; a body with
/// neither an error nor a track page is an unexpected response.
pub fn extract_track_uri(response: SearchResponse) -> Result<Option<String>, ApiError> {
    if let Some(error) = response.error {
        return Err(error.into());
    }

    let page = response.tracks.ok_or_else(|| {
        ApiError::UnexpectedResponse("search response has no tracks".to_string())
    })?;

    Ok(page.items.into_iter().flatten().next().map(|item| item.uri))
}

pub fn extract_playlist_id(response: CreatePlaylistResponse) -> Result<String, ApiError> {
    if let Some(error) = response.error {
        return Err(error.into());
    }

    match response.id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::UnexpectedResponse(
            "no playlist id found in create playlist response".to_string(),
        )),
    }
}
