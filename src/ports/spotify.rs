use crate::error::ApiError;

/// Port trait wrapping the Spotify Web API calls the import needs.
///
/// Implementations live in `spotify_rs::client` (production) or test mocks.
/// None of the methods retry; that is the job of `ReliableCaller`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyClient: Send + Sync {
    /// Runs a track search and returns the URI of the first hit, if any.
    async fn search_track(&self, query: &str) -> Result<Option<String>, ApiError>;

    /// Creates a playlist for the configured user and returns its id.
    async fn create_playlist(&self, name: &str, public: bool) -> Result<String, ApiError>;

    /// Appends a single track to the end of a playlist.
    async fn add_track(&self, playlist_id: &str, track_uri: &str) -> Result<(), ApiError>;
}
