use std::time::Duration;

use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{error::ApiError, types::ApiErrorResponse};

/// Tries per request, including the first one.
const MAX_ATTEMPTS: u32 = 3;
/// Longest `Retry-After` we are willing to sit out inside a request.
const MAX_RETRY_AFTER_SECS: u64 = 120;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(10);

/// Thin client for the `/me` part of the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    bad_gateway_delay: Duration,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            bad_gateway_delay: BAD_GATEWAY_DELAY,
        }
    }

    /// Overrides the pause before retrying a `502 Bad Gateway`.
    pub fn with_bad_gateway_delay(mut self, delay: Duration) -> Self {
        self.bad_gateway_delay = delay;
        self
    }

    /// Issues `GET {api_url}/me{path}` and decodes the JSON answer.
    ///
    /// Returns `Ok(None)` on `204 No Content`, which Spotify uses e.g. when
    /// nothing is playing.
    ///
    /// # Retry Logic
    ///
    /// - `429 Too Many Requests` is retried after the `Retry-After` delay when
    ///   that is at most two minutes, otherwise [`ApiError::RateLimited`]
    /// - `502 Bad Gateway` is retried after a short pause
    /// - at most three attempts in total
    ///
    /// # Errors
    ///
    /// - [`ApiError::SpotifyUnauthorized`] for `401` (expired or revoked token)
    /// - [`ApiError::Spotify`] for any other non-success status
    /// - [`ApiError::Http`] for network failures and undecodable bodies
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        access_token: &str,
    ) -> Result<Option<T>, ApiError> {
        let url = format!("{}/me{}", self.api_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self
                .http
                .get(&url)
                .query(query)
                .bearer_auth(access_token)
                .send()
                .await?;

            let status = response.status();
            tracing::debug!(%url, %status, attempt, "spotify request");

            if status == StatusCode::NO_CONTENT {
                return Ok(None);
            }

            if status.is_success() {
                return Ok(Some(response.json::<T>().await?));
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(1);

                if retry_after > MAX_RETRY_AFTER_SECS || attempt >= MAX_ATTEMPTS {
                    return Err(ApiError::RateLimited(retry_after));
                }

                tracing::warn!(retry_after, "rate limited by Spotify, waiting");
                sleep(Duration::from_secs(retry_after)).await;
                continue;
            }

            if status == StatusCode::BAD_GATEWAY && attempt < MAX_ATTEMPTS {
                tracing::warn!(%url, "bad gateway from Spotify, retrying");
                sleep(self.bad_gateway_delay).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.to_string());

            if status == StatusCode::UNAUTHORIZED {
                return Err(ApiError::SpotifyUnauthorized(message));
            }

            return Err(ApiError::Spotify {
                status: status.as_u16(),
                message,
            });
        }
    }
}
