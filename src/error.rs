use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::management::StoreError;

/// Error type of the HTTP layer and of everything it calls into.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // ── Session ─────────────────────────────────────────────────────────
    #[error("No Spotify account is linked to this session")]
    Unauthenticated,

    #[error("Spotify rejected the access token: {0}")]
    SpotifyUnauthorized(String),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    // ── OAuth callback ──────────────────────────────────────────────────
    #[error("Authorization was denied: {0}")]
    AuthorizationDenied(String),

    #[error("Invalid state parameter")]
    InvalidState,

    #[error("Missing authorization code")]
    MissingCode,

    // ── Upstream ────────────────────────────────────────────────────────
    #[error("Spotify accounts error: {0}")]
    Provider(String),

    #[error("Spotify API error ({status}): {message}")]
    Spotify { status: u16, message: String },

    #[error("Spotify rate limit exceeded, retry after {0}s")]
    RateLimited(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Token store error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::SpotifyUnauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::AuthorizationDenied(_) | ApiError::InvalidState | ApiError::MissingCode => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Provider(_) | ApiError::Spotify { .. } | ApiError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::RateLimited(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Session(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::SpotifyUnauthorized(_) => "spotify_unauthorized",
            ApiError::Session(_) => "session_error",
            ApiError::AuthorizationDenied(_) => "authorization_denied",
            ApiError::InvalidState => "invalid_state",
            ApiError::MissingCode => "missing_code",
            ApiError::Provider(_) => "provider_error",
            ApiError::Spotify { .. } => "spotify_error",
            ApiError::RateLimited(_) => "rate_limited",
            ApiError::Http(_) => "http_error",
            ApiError::Store(_) => "store_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{self}");
        } else {
            tracing::debug!(code = self.code(), "{self}");
        }

        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
