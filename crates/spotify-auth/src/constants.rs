//! Spotify OAuth and Web API constants
//!
//! The client ID identifies a public PKCE client; there is no client secret.
//! Both redirect URI forms must be registered in the Spotify developer
//! dashboard for this client.

/// Public client ID registered for the playlist app
pub const SPOTIFY_CLIENT_ID: &str = "5c36f777789f425dafd7e5dff4e09fb0";

/// Accounts service hosting `/authorize` and `/api/token`
pub const AUTH_BASE_URL: &str = "https://accounts.spotify.com";

/// Web API base for `/me`, `/me/playlists`, `/playlists/{id}/tracks`
pub const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Path of the browser-facing authorization endpoint under `AUTH_BASE_URL`
pub const AUTHORIZE_PATH: &str = "/authorize";

/// Path of the token endpoint (code exchange and refresh) under `AUTH_BASE_URL`
pub const TOKEN_PATH: &str = "/api/token";

/// Read access to private and collaborative playlists plus the profile.
pub const SCOPES: [&str; 4] = [
    "playlist-read-private",
    "playlist-read-collaborative",
    "user-read-private",
    "user-read-email",
];

/// Custom URL scheme registered by production builds
pub const APP_SCHEME: &str = "playgroundapp";

/// Path component of the production redirect (`playgroundapp://spotify-auth`)
pub const APP_REDIRECT_PATH: &str = "spotify-auth";

/// Path the development loopback listener serves the redirect on
pub const LOOPBACK_CALLBACK_PATH: &str = "/callback";
