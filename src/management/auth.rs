use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::{
    error::ApiError,
    management::TokenStore,
    spotify::SpotifyAuth,
    types::{SessionToken, TokenResponse},
};

/// Outcome of [`TokenManager::refresh_expired`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
}

/// Token lifecycle per session: obtain, store, refresh on expiry, reuse.
pub struct TokenManager {
    store: TokenStore,
    auth: SpotifyAuth,
    /// One lock per session key, held while that record is refreshed.
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TokenManager {
    pub fn new(store: TokenStore, auth: SpotifyAuth) -> Self {
        TokenManager {
            store,
            auth,
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn auth(&self) -> &SpotifyAuth {
        &self.auth
    }

    /// Creates or updates the record of `session_key` from a code exchange.
    ///
    /// A re-login keeps the original `created_at`. When the response carries
    /// no refresh token the stored one is kept; without a stored one the
    /// response is rejected, since the session could never be refreshed.
    pub async fn register(
        &self,
        session_key: &str,
        response: TokenResponse,
    ) -> Result<SessionToken, ApiError> {
        let now = Utc::now();
        let existing = self.store.get(session_key).await;

        let refresh_token = match (response.refresh_token, &existing) {
            (Some(token), _) => token,
            (None, Some(existing)) => existing.refresh_token.clone(),
            (None, None) => {
                return Err(ApiError::Provider(
                    "token response without refresh_token".to_string(),
                ));
            }
        };

        let token = SessionToken {
            session_key: session_key.to_string(),
            access_token: response.access_token,
            refresh_token,
            token_type: response.token_type,
            expires_at: now + Duration::seconds(response.expires_in),
            created_at: existing.map(|t| t.created_at).unwrap_or(now),
        };

        self.store.upsert(token.clone()).await?;
        tracing::info!(session = %short(session_key), "spotify account linked");
        Ok(token)
    }

    /// Returns an access token for `session_key` that is good for the next
    /// request, refreshing it first when it is near or past its expiry.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthenticated`] when the session has no record
    /// - [`ApiError::Provider`] / [`ApiError::Http`] when the refresh fails
    /// - [`ApiError::Store`] when the refreshed record cannot be saved
    pub async fn valid_access_token(&self, session_key: &str) -> Result<String, ApiError> {
        let token = self
            .store
            .get(session_key)
            .await
            .ok_or(ApiError::Unauthenticated)?;

        Ok(self.refresh_if_needed(token).await?.access_token)
    }

    /// Reports whether the session has a usable Spotify link.
    ///
    /// Refreshes a stale token on the way. A refresh the provider refuses
    /// (revoked access, rotated credentials) counts as not authenticated.
    pub async fn is_authenticated(
        &self,
        session_key: Option<&str>,
    ) -> Result<Option<SessionToken>, ApiError> {
        let Some(session_key) = session_key else {
            return Ok(None);
        };
        let Some(token) = self.store.get(session_key).await else {
            return Ok(None);
        };

        match self.refresh_if_needed(token).await {
            Ok(token) => Ok(Some(token)),
            Err(e @ ApiError::Store(_)) => Err(e),
            Err(e) => {
                tracing::warn!(session = %short(session_key), "token refresh failed: {e}");
                Ok(None)
            }
        }
    }

    /// Refreshes `token` when it needs it and persists the result.
    ///
    /// Concurrent calls for the same session refresh once; the others wait
    /// and pick up the stored result. Spotify may rotate the refresh token,
    /// so a second refresh with the old one would be refused.
    pub async fn refresh_if_needed(&self, token: SessionToken) -> Result<SessionToken, ApiError> {
        if !token.needs_refresh() {
            return Ok(token);
        }

        let lock = self.refresh_lock(&token.session_key).await;
        let _guard = lock.lock().await;

        let token = match self.store.get(&token.session_key).await {
            Some(current) if !current.needs_refresh() => return Ok(current),
            Some(current) => current,
            None => token,
        };

        let response = self.auth.refresh(&token.refresh_token).await?;
        let refreshed = SessionToken {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
            refresh_token: response.refresh_token.unwrap_or(token.refresh_token),
            ..token
        };

        self.store.upsert(refreshed.clone()).await?;
        tracing::info!(session = %short(&refreshed.session_key), "access token refreshed");
        Ok(refreshed)
    }

    async fn refresh_lock(&self, session_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        locks
            .entry(session_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Refreshes every stored record that is near or past expiry.
    pub async fn refresh_expired(&self) -> RefreshSummary {
        let mut summary = RefreshSummary::default();

        for token in self.store.all().await {
            if !token.needs_refresh() {
                continue;
            }

            let session_key = token.session_key.clone();
            match self.refresh_if_needed(token).await {
                Ok(_) => summary.refreshed += 1,
                Err(e) => {
                    tracing::warn!(session = %short(&session_key), "token refresh failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

/// First characters of a session key, enough to tell sessions apart in logs.
pub fn short(session_key: &str) -> &str {
    match session_key.char_indices().nth(8) {
        Some((idx, _)) => &session_key[..idx],
        None => session_key,
    }
}
