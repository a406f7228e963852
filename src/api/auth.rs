use axum::{Json, extract::State};
use serde_json::{Value, json};
use tower_sessions::Session;

use crate::{error::ApiError, server::SharedState, types::TokenView, utils};

/// Session key under which the pending OAuth `state` is kept.
pub(crate) const OAUTH_STATE_KEY: &str = "spotify.oauth_state";

/// Session key under which the token store key of the linked account is kept.
pub(crate) const ACCOUNT_KEY: &str = "spotify.account";

/// Token store key of the account linked to `session`, if any.
///
/// The key lives in server-side session data; the cookie only carries the
/// session id, which is never used to look up tokens.
pub(crate) async fn session_key(session: &Session) -> Result<Option<String>, ApiError> {
    Ok(session.get::<String>(ACCOUNT_KEY).await?)
}

/// Hands out the Spotify authorize URL and remembers its `state` in the session.
pub async fn get_auth_url(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let oauth_state = utils::generate_state();
    session.insert(OAUTH_STATE_KEY, &oauth_state).await?;

    let url = state.tokens.auth().authorize_url(&oauth_state)?;

    Ok(Json(json!({
        "url": url,
        "status": 200
    })))
}

pub async fn is_authenticated(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Value>, ApiError> {
    let key = session_key(&session).await?;
    let token = state.tokens.is_authenticated(key.as_deref()).await?;

    Ok(Json(json!({
        "status": token.is_some(),
        "tokens": token.map(|t| t.view())
    })))
}

/// Lists every stored session record, secrets left out.
pub async fn list_all_tokens(State(state): State<SharedState>) -> Json<Vec<TokenView>> {
    let tokens = state.tokens.store().all().await;
    Json(tokens.iter().map(|t| t.view()).collect())
}
