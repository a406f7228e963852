use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    api::auth::{ACCOUNT_KEY, OAUTH_STATE_KEY, session_key},
    error::ApiError,
    server::SharedState,
    utils,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Landing point of the Spotify redirect.
///
/// Checks the `state` against the one stored by `/get-auth-url`, exchanges
/// the code, links the tokens to the session and sends the browser on to
/// the frontend. The stored `state` is single use. A re-login from the same
/// session updates the account already linked to it.
pub async fn spotify_callback(
    State(state): State<SharedState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let expected: Option<String> = session.remove(OAUTH_STATE_KEY).await?;

    if let Some(error) = params.error {
        return Err(ApiError::AuthorizationDenied(error));
    }

    match (expected, params.state) {
        (Some(expected), Some(given)) if expected == given => {}
        _ => return Err(ApiError::InvalidState),
    }

    let code = params.code.ok_or(ApiError::MissingCode)?;
    let response = state.tokens.auth().exchange_code(&code).await?;

    let key = match session_key(&session).await? {
        Some(key) => key,
        None => utils::generate_account_key(),
    };
    state.tokens.register(&key, response).await?;

    session.insert(ACCOUNT_KEY, &key).await?;
    // new cookie value once the session carries an account
    session.cycle_id().await?;

    Ok(Redirect::to(&state.config.frontend_url))
}
