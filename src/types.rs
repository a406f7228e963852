use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

use crate::management::short;

/// Seconds before the real expiry at which an access token counts as stale.
pub const REFRESH_LEEWAY_SECS: i64 = 60;

/// Token record persisted per browser session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    pub session_key: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// True once `now` is at or past the expiry minus [`REFRESH_LEEWAY_SECS`].
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - Duration::seconds(REFRESH_LEEWAY_SECS)
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }

    pub fn view(&self) -> TokenView {
        TokenView {
            session_key: short(&self.session_key).to_string(),
            token_type: self.token_type.clone(),
            expires_at: self.expires_at,
            created_at: self.created_at,
            expired: self.needs_refresh(),
        }
    }
}

/// Public projection of a [`SessionToken`] without the secrets.
///
/// `session_key` only carries the short prefix of the real key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenView {
    pub session_key: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub expired: bool,
}

#[derive(Tabled)]
pub struct TokenTableRow {
    pub session: String,
    pub token_type: String,
    pub created_at: String,
    pub expires_at: String,
    pub status: String,
}

/// Successful answer of the accounts token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    /// Usually missing on refresh; the stored one stays valid then.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Error body of the Web API: `{"error": {"status": 401, "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

// Spotify Web API objects. Only the fields that get reshaped are modelled and
// all of them tolerate being absent or null.

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimplifiedArtist {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimplifiedAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: SimplifiedAlbum,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers: Followers,
    #[serde(default)]
    pub popularity: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub followers: Followers,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub item: Option<Track>,
    #[serde(default)]
    pub is_playing: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayHistory {
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedTrack {
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistTracks {
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks: PlaylistTracks,
    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner: PlaylistOwner,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
}

/// Offset based page (`/me/playlists`, `/me/tracks`, `/me/top/*`, ...).
///
/// Items may be `null` in the wild, hence `Option<T>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<Option<T>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> Paging<T> {
    /// Non-null items of the page.
    pub fn into_items(self) -> Vec<T> {
        self.items.into_iter().flatten().collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowedArtistsResponse {
    pub artists: CursorPaging<Artist>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct CursorPaging<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<Option<T>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub after: Option<String>,
}

// Payloads served to the frontend.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistCredit {
    pub name: String,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackInfo {
    pub name: String,
    pub artists: Vec<ArtistCredit>,
    pub album: Option<String>,
    pub thumbnail: Option<String>,
    pub song_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSong {
    #[serde(flatten)]
    pub track: TrackInfo,
    pub is_playing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedSong {
    pub name: String,
    pub added_at: Option<String>,
    pub artists: Vec<ArtistCredit>,
    pub song_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopArtist {
    pub name: String,
    pub artist_url: Option<String>,
    pub genres: Vec<String>,
    pub thumbnail: Option<String>,
    pub followers: u64,
    pub popularity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    pub username: Option<String>,
    pub profile_url: Option<String>,
    pub thumbnail: Option<String>,
    pub followers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistInfo {
    pub name: String,
    pub total_songs: u64,
    pub playlist_url: Option<String>,
    pub owner: Option<String>,
    pub owner_url: Option<String>,
    pub is_public: Option<bool>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowedArtist {
    pub name: String,
    pub artist_url: Option<String>,
    pub followers: u64,
    pub rank: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}
