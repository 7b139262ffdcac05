//! Authenticated Spotify Web API client
//!
//! `ApiClient` reads bearer tokens from the `spotify_auth::TokenStore` it
//! shares with the auth session. Collections are fetched one page at a time
//! (`get_user_playlists`) or walked in full (`get_all_user_playlists`), with
//! a fixed pause between pages.

pub mod classify;
pub mod client;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pagination;

pub use client::{
    ALL_PAGES_LIMIT, ApiClient, ApiConfig, DEFAULT_PAGE_DELAY, DEFAULT_PAGE_LIMIT, RequestOptions,
};
pub use error::{Error, Result};
pub use models::{
    Album, Artist, ExternalUrls, Followers, Image, Page, Playlist, PlaylistOwner, PlaylistPage,
    PlaylistTrack, PlaylistTrackPage, Track, TracksRef, UserProfile,
};
