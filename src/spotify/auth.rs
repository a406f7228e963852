use reqwest::{Client, Url};

use crate::{
    config::Config,
    error::ApiError,
    types::{TokenErrorResponse, TokenResponse},
};

/// Client of the Spotify accounts service (authorize + token endpoints).
///
/// Uses the confidential-client variant of the authorization-code flow: the
/// client secret is sent along with every token request.
#[derive(Debug, Clone)]
pub struct SpotifyAuth {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_url: String,
    token_url: String,
}

impl SpotifyAuth {
    pub fn new(config: &Config, http: Client) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scope: config.scope.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
        }
    }

    /// Builds the URL the browser has to visit to grant access.
    ///
    /// # Arguments
    ///
    /// * `state` - Opaque value echoed back on the redirect; checked by the
    ///   callback handler against the value stored in the session.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let url = auth.authorize_url("k2J8aZ...")?;
    /// // https://accounts.spotify.com/authorize?scope=...&response_type=code&...
    /// ```
    pub fn authorize_url(&self, state: &str) -> Result<String, ApiError> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("scope", self.scope.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| ApiError::Provider(format!("invalid authorize url {}: {}", self.auth_url, e)))?;

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for an access and refresh token.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Provider`] when Spotify answers with an error body
    ///   (`invalid_grant` for a used or expired code, `invalid_client` for bad
    ///   credentials) or with a body that is not a token response
    /// - [`ApiError::Http`] on network failures
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ApiError> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ])
        .await
    }

    /// Trades a refresh token for a new access token.
    ///
    /// Spotify may or may not rotate the refresh token; when the response
    /// carries none the caller keeps using the old one.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ])
        .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, ApiError> {
        let res = self.http.post(&self.token_url).form(form).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if let Ok(err) = serde_json::from_str::<TokenErrorResponse>(&body) {
            return Err(ApiError::Provider(match err.error_description {
                Some(description) => format!("{}: {}", err.error, description),
                None => err.error,
            }));
        }

        if !status.is_success() {
            return Err(ApiError::Provider(format!(
                "token endpoint answered {}",
                status
            )));
        }

        serde_json::from_str::<TokenResponse>(&body)
            .map_err(|e| ApiError::Provider(format!("malformed token response: {}", e)))
    }
}
