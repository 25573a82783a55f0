use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use reqwest::{Response, StatusCode};
use url::Url;

use crate::error::ApiError;
use crate::ports::spotify::SpotifyClient;
use crate::spotify_rs::types::{
    CreatePlaylistRequest, CreatePlaylistResponse, SearchResponse, extract_playlist_id,
    extract_track_uri,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Spotify Web API client authenticated with a fixed bearer token.
pub struct SpotifyWebClient {
    client: reqwest::Client,
    api_base: Url,
    user_id: String,
    access_token: String,
}

impl SpotifyWebClient {
    pub fn new(
        api_base: &str,
        user_id: String,
        access_token: String,
        request_timeout: Duration,
    ) -> Result<Self> {
        let api_base =
            Url::parse(api_base).wrap_err(format!("Invalid Spotify API URL: {}", api_base))?;
        if api_base.cannot_be_a_base() {
            return Err(eyre!("Invalid Spotify API URL: {}", api_base));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base,
            user_id,
            access_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Server side failures are HTTP level failures and may be retried; any
/// other status carries a body worth looking at.
fn reject_server_error(response: Response) -> Result<Response, ApiError> {
    if response.status().is_server_error() {
        response.error_for_status().map_err(ApiError::from)
    } else {
        Ok(response)
    }
}

#[async_trait::async_trait]
impl SpotifyClient for SpotifyWebClient {
    async fn search_track(&self, query: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&["search"]))
            .bearer_auth(&self.access_token)
            .query(&[("type", "track"), ("q", query)])
            .send()
            .await?;

        let payload: SearchResponse = reject_server_error(response)?.json().await?;
        extract_track_uri(payload)
    }

    async fn create_playlist(&self, name: &str, public: bool) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&["users", self.user_id.as_str(), "playlists"]))
            .bearer_auth(&self.access_token)
            .json(&CreatePlaylistRequest { name, public })
            .send()
            .await?;

        let payload: CreatePlaylistResponse = reject_server_error(response)?.json().await?;
        extract_playlist_id(payload)
    }

    async fn add_track(&self, playlist_id: &str, track_uri: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint(&[
                "users",
                self.user_id.as_str(),
                "playlists",
                playlist_id,
                "tracks",
            ]))
            .bearer_auth(&self.access_token)
            .query(&[("uris", track_uri)])
            .send()
            .await?;

        let response = reject_server_error(response)?;
        match response.status() {
            StatusCode::CREATED => Ok(()),
            status => Err(ApiError::UnexpectedStatus(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SpotifyWebClient {
        SpotifyWebClient::new(
            &format!("{}/v1", server.uri()),
            "wizzler".to_string(),
            "test-token".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_base_url() {
        let result = SpotifyWebClient::new(
            "not a url",
            "wizzler".into(),
            "token".into(),
            Duration::from_secs(5),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let client = SpotifyWebClient::new(
            "https://api.spotify.com/v1/",
            "wizzler".into(),
            "token".into(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.endpoint(&["search"]).as_str(),
            "https://api.spotify.com/v1/search"
        );
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let client = SpotifyWebClient::new(
            DEFAULT_API_BASE_URL,
            "some user".into(),
            "token".into(),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            client.endpoint(&["users", "some user", "playlists"]).as_str(),
            "https://api.spotify.com/v1/users/some%20user/playlists"
        );
    }

    #[tokio::test]
    async fn test_search_track_returns_first_uri() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("type", "track"))
            .and(query_param("q", "artist:\"Queen\" track:\"Under Pressure\""))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tracks": {"items": [
                    {"uri": "spotify:track:2fuCquhmrzHpu5xcA1ci9x"},
                    {"uri": "spotify:track:other"}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uri = client_for(&server)
            .search_track("artist:\"Queen\" track:\"Under Pressure\"")
            .await
            .unwrap();

        assert_eq!(uri.as_deref(), Some("spotify:track:2fuCquhmrzHpu5xcA1ci9x"));
    }

    #[tokio::test]
    async fn test_search_track_with_null_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tracks": {"items": [{"uri": "spotify:track:first"}, null]}
            })))
            .mount(&server)
            .await;

        let uri = client_for(&server).search_track("track:\"x\"").await.unwrap();
        assert_eq!(uri.as_deref(), Some("spotify:track:first"));
    }

    #[tokio::test]
    async fn test_search_track_redirect_loop_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/v1/search", server.uri()).as_str()),
            )
            .mount(&server)
            .await;

        let error = client_for(&server)
            .search_track("track:\"x\"")
            .await
            .unwrap_err();

        assert!(matches!(&error, ApiError::Http(e) if e.is_redirect()));
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_search_track_no_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"tracks": {"items": []}})),
            )
            .mount(&server)
            .await;

        let uri = client_for(&server).search_track("track:\"Nope\"").await.unwrap();
        assert!(uri.is_none());
    }

    #[tokio::test]
    async fn test_search_track_error_object_is_not_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"status": 401, "message": "Invalid access token"}
            })))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .search_track("track:\"x\"")
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Api { status: 401, .. }));
        assert!(!error.is_transient());
    }

    #[tokio::test]
    async fn test_search_track_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .search_track("track:\"x\"")
            .await
            .unwrap_err();

        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn test_search_track_garbage_body_is_not_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .search_track("track:\"x\"")
            .await
            .unwrap_err();

        assert!(!error.is_transient());
    }

    #[tokio::test]
    async fn test_create_playlist() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/users/wizzler/playlists"))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(serde_json::json!({"name": "Road Trip", "public": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "7d2D2S200NyUE5KYs80PwO",
                "name": "Road Trip"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server)
            .create_playlist("Road Trip", false)
            .await
            .unwrap();

        assert_eq!(id, "7d2D2S200NyUE5KYs80PwO");
    }

    #[tokio::test]
    async fn test_create_playlist_error_object() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/users/wizzler/playlists"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {"status": 403, "message": "Insufficient client scope"}
            })))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .create_playlist("Road Trip", false)
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_add_track_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/users/wizzler/playlists/pl1/tracks"))
            .and(query_param("uris", "spotify:track:1"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"snapshot_id": "abc"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .add_track("pl1", "spotify:track:1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_track_other_status_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/users/wizzler/playlists/pl1/tracks"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let error = client_for(&server)
            .add_track("pl1", "spotify:track:1")
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::UnexpectedStatus(StatusCode::OK)));
        assert!(!error.is_transient());
    }
}
