//! Web API response types
//!
//! Field names follow Spotify's JSON. Fields that Spotify documents as
//! nullable or omits on simplified objects are `Option` or defaulted, so a
//! sparse object never fails the whole page.

use serde::{Deserialize, Deserializer, Serialize};

/// Spotify sends `"images": null` for playlists without artwork.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

/// `GET /me`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    /// Present only with the `user-read-email` scope
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

impl UserProfile {
    pub fn follower_count(&self) -> u64 {
        self.followers.total
    }

    /// Display name, falling back to the user ID.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Owner as embedded in a playlist (no follower count).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaylistOwner {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TracksRef {
    #[serde(default)]
    pub href: String,
    pub total: u32,
}

/// Playlist snapshot as returned in `GET /me/playlists` pages.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    pub owner: PlaylistOwner,
    /// `null` when the visibility is not known to the API
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub tracks: TracksRef,
    /// Only present on full playlist objects
    #[serde(default)]
    pub followers: Option<Followers>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub snapshot_id: Option<String>,
}

impl Playlist {
    pub fn track_count(&self) -> u32 {
        self.tracks.total
    }

    pub fn follower_count(&self) -> u64 {
        self.followers.as_ref().map_or(0, |f| f.total)
    }

    pub fn is_public(&self) -> bool {
        self.public.unwrap_or(false)
    }

    pub fn external_url(&self) -> Option<&str> {
        self.external_urls.spotify.as_deref()
    }

    /// Description, or `None` when Spotify returns an empty string.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

/// One page of an offset-paginated collection.
///
/// `next` is an opaque URL present exactly when more items follow.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: u32,
    pub offset: u32,
    pub total: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

pub type PlaylistPage = Page<Playlist>;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
}

/// Local files have no `id`; podcast episodes share the shape loosely.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl Track {
    /// Comma-joined artist names.
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Entry of `GET /playlists/{id}/tracks`. `track` is null for items that
/// were removed from the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaylistTrack {
    #[serde(default)]
    pub added_at: Option<String>,
    pub track: Option<Track>,
}

pub type PlaylistTrackPage = Page<PlaylistTrack>;

/// Structured error body: `{"error":{"status":404,"message":"Not found"}}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub status: u16,
    pub message: String,
}
