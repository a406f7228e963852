//! # API Module
//!
//! HTTP handlers of the Spotiview server.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`get_auth_url`] - Spotify authorize URL for the current browser session
//! - [`spotify_callback`] - OAuth redirect target, exchanges the code and links
//!   the tokens to the session
//! - [`is_authenticated`] - whether the session has a usable Spotify link
//! - [`list_all_tokens`] - every stored session record, without secrets
//!
//! ### Listening data
//!
//! [`user_info`], [`current_song`], [`songs_history`], [`top_artists`],
//! [`top_tracks`], [`last_saved_songs`], [`user_playlists`] and
//! [`followed_artists`] fetch from the Spotify Web API with the session's
//! access token (refreshed first when stale) and return a reshaped JSON
//! payload wrapped in a single top-level key.
//!
//! ### Monitoring
//!
//! - [`health`] - status and version
//!
//! All handlers fail with [`crate::error::ApiError`], which renders a JSON
//! error body with a matching status code.

mod auth;
mod callback;
mod health;
mod stats;

pub use auth::{get_auth_url, is_authenticated, list_all_tokens};
pub use callback::{CallbackParams, spotify_callback};
pub use health::health;
pub use stats::{
    current_song, followed_artists, last_saved_songs, songs_history, top_artists, top_tracks,
    user_info, user_playlists,
};
