use axum::{Json, extract::State};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::{
    api::auth::session_key,
    error::ApiError,
    server::SharedState,
    spotify::{library, player, profile, top},
    utils,
};

/// Resolves the session to an access token that is valid right now.
async fn access_token(state: &SharedState, session: &Session) -> Result<String, ApiError> {
    let key = session_key(session)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    state.tokens.valid_access_token(&key).await
}

pub async fn user_info(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let profile = profile::get_current_user(&state.spotify, &token).await?;

    Ok(Json(json!({ "user_info": utils::user_info(&profile) })))
}

/// `current_song` is `null` when nothing is playing.
pub async fn current_song(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let playing = player::get_currently_playing(&state.spotify, &token).await?;
    let song = playing.as_ref().and_then(utils::current_song);

    Ok(Json(json!({ "current_song": song })))
}

pub async fn songs_history(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let history = player::get_recently_played(&state.spotify, &token).await?;

    Ok(Json(json!({ "last_played_songs": utils::songs_history(&history) })))
}

pub async fn top_artists(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let artists = top::get_top_artists(&state.spotify, &token).await?;

    Ok(Json(json!({
        "top_artists": utils::top_artists(&artists),
        "top_genres": utils::top_genres(&artists)
    })))
}

pub async fn top_tracks(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let tracks = top::get_top_tracks(&state.spotify, &token).await?;

    Ok(Json(json!({ "top_tracks": utils::top_tracks(&tracks) })))
}

pub async fn last_saved_songs(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let saved =
        library::get_saved_tracks(&state.spotify, &token, library::SAVED_TRACKS_LIMIT).await?;

    Ok(Json(json!({ "saved_songs": utils::saved_songs(&saved) })))
}

/// Every playlist of the user, unnamed ones dropped, biggest first.
pub async fn user_playlists(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let playlists = library::get_playlists(&state.spotify, &token).await?;

    let mut list = utils::get_playlist_list(&playlists);
    utils::sort_playlists(&mut list);

    Ok(Json(json!({ "user_playlists": list })))
}

pub async fn followed_artists(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let token = access_token(&state, &session).await?;
    let artists = library::get_followed_artists(&state.spotify, &token).await?;

    let mut followed = utils::get_followed_artists(&artists);
    utils::sort_followed_artists(&mut followed);

    Ok(Json(json!({ "followed_artists": followed })))
}
