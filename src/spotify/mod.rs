//! # Spotify Integration Module
//!
//! This module is the integration layer between spotiview and Spotify's two
//! services: the accounts service, which hands out and refreshes OAuth tokens,
//! and the Web API, which serves the listening data. It owns all outbound HTTP
//! communication; handlers above it never build a Spotify URL themselves.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers (api)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (authorization code flow)
//!     ├── Web API client (GET, retries, error mapping)
//!     ├── Player (currently playing, recently played)
//!     ├── Top items (artists, tracks)
//!     ├── Library (saved tracks, playlists, followed artists)
//!     └── Profile (current user)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication
//!
//! [`auth`] - [`SpotifyAuth`] builds the authorize URL and talks to the token
//! endpoint. Token error bodies (`invalid_grant`, `invalid_client`, ...) are
//! turned into errors and never reach the token store.
//!
//! ### Web API client
//!
//! [`client`] - [`SpotifyClient::get`] sends an authenticated `GET` to
//! `/me{path}`, retries `429` (honouring `Retry-After`) and `502`, and maps
//! every other failure to a typed [`crate::error::ApiError`].
//!
//! ### Data endpoints
//!
//! [`player`], [`top`], [`library`] and [`profile`] each wrap one Spotify
//! endpoint and return the decoded objects from [`crate::types`]. The library
//! module also walks the paginated collections:
//! - **Offset pagination** for playlists (`limit` + `offset`)
//! - **Cursor pagination** for followed artists (`after`)
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user profile
//! - `GET /me/player/currently-playing` - Track playing right now
//! - `GET /me/player/recently-played` - Listening history
//! - `GET /me/top/artists`, `GET /me/top/tracks` - Top items
//! - `GET /me/tracks` - Saved tracks
//! - `GET /me/playlists` - Owned and followed playlists
//! - `GET /me/following?type=artist` - Followed artists
//! - `POST /api/token` - Code exchange and token refresh
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = SpotifyClient::new(reqwest::Client::new(), &config.api_url);
//! let artists = spotify::top::get_top_artists(&client, &access_token).await?;
//! ```

pub mod auth;
pub mod client;
pub mod library;
pub mod player;
pub mod profile;
pub mod top;

pub use auth::SpotifyAuth;
pub use client::SpotifyClient;
