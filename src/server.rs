use axum::{Router, routing::get};
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::{
    Res, api,
    config::Config,
    management::{TokenManager, TokenStore},
    spotify::{SpotifyAuth, SpotifyClient},
};

/// Name of the session cookie handed to the browser.
pub const SESSION_COOKIE_NAME: &str = "sessionid";
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// State shared by all handlers.
pub struct AppState {
    pub config: Config,
    pub spotify: SpotifyClient,
    pub tokens: TokenManager,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config, store: TokenStore) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(OUTBOUND_TIMEOUT)
            .build()?;

        Ok(AppState {
            spotify: SpotifyClient::new(http.clone(), &config.api_url),
            tokens: TokenManager::new(store, SpotifyAuth::new(&config, http)),
            config,
        })
    }
}

/// Builds the application router with session handling and request tracing.
pub fn router(state: SharedState) -> Router {
    // Lax, not Strict: the OAuth redirect back from Spotify is a cross-site
    // navigation and has to carry the cookie.
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_same_site(SameSite::Lax)
        .with_secure(state.config.session_cookie_secure);

    Router::new()
        .route("/health", get(api::health))
        .route("/get-auth-url", get(api::get_auth_url))
        .route("/redirect", get(api::spotify_callback))
        .route("/is-authenticated", get(api::is_authenticated))
        .route("/get-all-tokens", get(api::list_all_tokens))
        .route("/current-user-info", get(api::user_info))
        .route("/get-current-song", get(api::current_song))
        .route("/get-songs-history", get(api::songs_history))
        .route("/top-artists", get(api::top_artists))
        .route("/top-tracks", get(api::top_tracks))
        .route("/last-saved-songs", get(api::last_saved_songs))
        .route("/user-playlists", get(api::user_playlists))
        .route("/followed-artists", get(api::followed_artists))
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Opens the token store and serves the API until the process is stopped.
pub async fn start_api_server(config: Config) -> Res<()> {
    let store = match &config.token_store_path {
        Some(path) => TokenStore::open(path.clone()).await?,
        None => TokenStore::in_memory(),
    };
    tracing::info!(sessions = store.len().await, "token store opened");

    let addr = config.server_address.clone();
    let state: SharedState = Arc::new(AppState::new(config, store)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
