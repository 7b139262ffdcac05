//! Authenticated Spotify Web API client
//!
//! Every request reads the access token from the shared `TokenStore`
//! first and fails with `NoAccessToken` before touching the network when
//! none is set. Non-success responses are classified into typed errors; the
//! client never retries.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use serde::de::DeserializeOwned;
use spotify_auth::{API_BASE_URL, TokenStore};
use tracing::{debug, warn};

use crate::classify::classify_response;
use crate::error::{Error, Result};
use crate::metrics;
use crate::models::{Playlist, PlaylistPage, PlaylistTrack, PlaylistTrackPage, UserProfile};
use crate::pagination::collect_all_pages;

/// Page size for a single `get_user_playlists` call when the caller has
/// no preference.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Page size used when walking a whole collection (Spotify's maximum for
/// `/me/playlists`).
pub const ALL_PAGES_LIMIT: u32 = 50;

/// Pause between consecutive page requests of a full walk.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Web API base, e.g. `https://api.spotify.com/v1`
    pub base_url: String,
    pub page_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

/// Per-request knobs for `ApiClient::request`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// `tokens` must be the store the auth session writes to.
    pub fn new(http: reqwest::Client, config: ApiConfig, tokens: Arc<TokenStore>) -> Self {
        Self {
            http,
            config,
            tokens,
        }
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Issue one authenticated request against `endpoint` (path under the
    /// base URL, e.g. `/me`) and decode the JSON response as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let token = self.tokens.access_token().ok_or(Error::NoAccessToken)?;
        let url = format!("{}{endpoint}", self.config.base_url.trim_end_matches('/'));
        debug!(method = %options.method, endpoint, "spotify api request");

        let mut builder = self
            .http
            .request(options.method, &url)
            .header(AUTHORIZATION, token.bearer())
            .header(CONTENT_TYPE, "application/json");
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }

        let response = builder.send().await.map_err(|e| {
            metrics::record_network_error();
            warn!(endpoint, error = %e, "spotify api request failed");
            Error::Network(e.to_string())
        })?;

        let status = response.status();
        metrics::record_request(status.as_u16());
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = response.text().await.unwrap_or_default();
            let err = classify_response(status, retry_after.as_deref(), &body);
            warn!(endpoint, status = status.as_u16(), error = %err, "spotify api error");
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("{endpoint}: {e}")))
    }

    /// `GET /me`
    pub async fn get_current_user(&self) -> Result<UserProfile> {
        self.request("/me", RequestOptions::get()).await
    }

    /// `GET /me/playlists` for one page. Use `DEFAULT_PAGE_LIMIT` and 0
    /// for the first page.
    pub async fn get_user_playlists(&self, limit: u32, offset: u32) -> Result<PlaylistPage> {
        self.request(
            "/me/playlists",
            RequestOptions::get()
                .query("limit", limit)
                .query("offset", offset),
        )
        .await
    }

    /// Every playlist of the current user, in API order.
    ///
    /// All-or-nothing: a failure on any page (including `RateLimited`)
    /// is returned and nothing gathered so far is kept.
    pub async fn get_all_user_playlists(&self) -> Result<Vec<Playlist>> {
        let playlists = collect_all_pages(
            ALL_PAGES_LIMIT,
            move |limit, offset| self.get_user_playlists(limit, offset),
            move || self.pause(),
        )
        .await?;
        debug!(count = playlists.len(), "fetched all playlists");
        Ok(playlists)
    }

    /// `GET /playlists/{id}/tracks` for one page.
    pub async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<PlaylistTrackPage> {
        self.request(
            &format!("/playlists/{playlist_id}/tracks"),
            RequestOptions::get()
                .query("limit", limit)
                .query("offset", offset),
        )
        .await
    }

    /// Every entry of a playlist, with the same paging rules as
    /// `get_all_user_playlists`.
    pub async fn get_all_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<PlaylistTrack>> {
        collect_all_pages(
            ALL_PAGES_LIMIT,
            move |limit, offset| self.get_playlist_tracks(playlist_id, limit, offset),
            move || self.pause(),
        )
        .await
    }

    async fn pause(&self) {
        if !self.config.page_delay.is_zero() {
            tokio::time::sleep(self.config.page_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn playlist_json(n: usize) -> serde_json::Value {
        serde_json::json!({
            "id": format!("pl{n}"),
            "name": format!("Playlist {n}"),
            "description": null,
            "images": [],
            "owner": {"id": "alice", "display_name": "Alice"},
            "public": true,
            "collaborative": false,
            "tracks": {"href": "", "total": n},
            "external_urls": {"spotify": format!("https://open.spotify.com/playlist/pl{n}")}
        })
    }

    fn page_json(start: usize, count: usize, offset: u32, total: u32, more: bool) -> serde_json::Value {
        let items: Vec<_> = (start..start + count).map(playlist_json).collect();
        serde_json::json!({
            "items": items,
            "limit": 50,
            "offset": offset,
            "total": total,
            "next": if more { serde_json::json!(format!("https://api.spotify.com/v1/me/playlists?offset={}&limit=50", offset + 50)) } else { serde_json::Value::Null },
            "previous": null
        })
    }

    fn client_for(server: &MockServer, token: Option<&str>) -> ApiClient {
        let tokens = Arc::new(TokenStore::new());
        if let Some(t) = token {
            tokens.set(t);
        }
        let config = ApiConfig {
            base_url: server.uri(),
            page_delay: Duration::from_millis(20),
        };
        ApiClient::new(reqwest::Client::new(), config, tokens)
    }

    async fn mount_page(server: &MockServer, offset: u32, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("limit", "50"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(template)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn request_without_token_never_hits_network() {
        let server = MockServer::start().await;
        let client = client_for(&server, None);

        let err = client.get_current_user().await.unwrap_err();

        assert!(matches!(err, Error::NoAccessToken));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_sends_bearer_and_json_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer BQ-token"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "alice",
                "display_name": "Alice",
                "followers": {"href": null, "total": 12},
                "images": [{"url": "https://i.scdn.co/a", "height": 300, "width": 300}],
                "email": "alice@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client_for(&server, Some("BQ-token"))
            .get_current_user()
            .await
            .unwrap();

        assert_eq!(user.id, "alice");
        assert_eq!(user.follower_count(), 12);
        assert_eq!(user.images.len(), 1);
    }

    #[tokio::test]
    async fn get_user_playlists_passes_limit_and_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page_json(0, 2, 0, 2, false)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server, Some("BQ"))
            .get_user_playlists(DEFAULT_PAGE_LIMIT, 0)
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(!page.has_next());
    }

    #[tokio::test]
    async fn structured_error_body_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"status": 404, "message": "Not found"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("BQ"))
            .get_current_user()
            .await
            .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn too_many_requests_carries_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "4"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server, Some("BQ"))
            .get_current_user()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_secs: Some(4)
            }
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let tokens = Arc::new(TokenStore::new());
        tokens.set("BQ");
        let client = ApiClient::new(
            reqwest::Client::new(),
            ApiConfig {
                base_url: "http://127.0.0.1:1".into(),
                page_delay: Duration::ZERO,
            },
            tokens,
        );

        let err = client.get_current_user().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("BQ"))
            .get_current_user()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn all_playlists_walks_three_pages_in_order() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            0,
            ResponseTemplate::new(200).set_body_json(page_json(0, 50, 0, 107, true)),
        )
        .await;
        mount_page(
            &server,
            50,
            ResponseTemplate::new(200).set_body_json(page_json(50, 50, 50, 107, true)),
        )
        .await;
        mount_page(
            &server,
            100,
            ResponseTemplate::new(200).set_body_json(page_json(100, 7, 100, 107, false)),
        )
        .await;

        let client = client_for(&server, Some("BQ"));
        let started = Instant::now();
        let playlists = client.get_all_user_playlists().await.unwrap();

        assert_eq!(playlists.len(), 107);
        for (i, playlist) in playlists.iter().enumerate() {
            assert_eq!(playlist.id, format!("pl{i}"));
        }
        // Two 20ms pauses between three pages
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn rate_limit_on_second_page_aborts_walk() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            0,
            ResponseTemplate::new(200).set_body_json(page_json(0, 50, 0, 107, true)),
        )
        .await;
        mount_page(
            &server,
            50,
            ResponseTemplate::new(429).insert_header("Retry-After", "9"),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("offset", "100"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, Some("BQ"))
            .get_all_user_playlists()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_secs: Some(9)
            }
        ));
    }

    #[tokio::test]
    async fn all_playlist_tracks_uses_tracks_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/pl1/tracks"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"added_at": "2024-03-01T10:00:00Z", "track": {
                        "id": "t1", "name": "Intro",
                        "artists": [{"id": "a1", "name": "Band"}],
                        "duration_ms": 180000, "explicit": false
                    }},
                    {"added_at": "2024-03-02T10:00:00Z", "track": null}
                ],
                "limit": 50, "offset": 0, "total": 2, "next": null, "previous": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tracks = client_for(&server, Some("BQ"))
            .get_all_playlist_tracks("pl1")
            .await
            .unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].track.as_ref().unwrap().name, "Intro");
        assert!(tracks[1].track.is_none());
    }
}
