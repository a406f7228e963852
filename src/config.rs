//! Configuration management for spotiview.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Everything the server needs at runtime is collected
//! into a single [`Config`] value at startup so handlers never touch the process
//! environment directly.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf};

/// Spotify accounts authorization endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
/// Spotify accounts token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Spotify Web API base URL.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8000";

/// Read-only permissions needed by the data endpoints.
pub const DEFAULT_SCOPE: &[&str] = &[
    "playlist-read-collaborative",
    "playlist-read-private",
    "user-follow-read",
    "user-library-read",
    "user-read-currently-playing",
    "user-read-playback-state",
    "user-read-recently-played",
    "user-top-read",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration of the server and the Spotify client.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Space separated list of OAuth scopes.
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_address: String,
    /// Where the browser lands after a finished login.
    pub frontend_url: String,
    pub session_cookie_secure: bool,
    /// `None` keeps tokens in memory only.
    pub token_store_path: Option<PathBuf>,
}

impl Config {
    /// Configuration with the given client credentials and defaults for
    /// everything else.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Config {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.join(" "),
            auth_url: DEFAULT_AUTH_URL.into(),
            token_url: DEFAULT_TOKEN_URL.into(),
            api_url: DEFAULT_API_URL.into(),
            server_address: DEFAULT_SERVER_ADDRESS.into(),
            frontend_url: "/".into(),
            session_cookie_secure: false,
            token_store_path: None,
        }
    }

    /// Points the accounts and Web API endpoints at one host, laid out like
    /// Spotify's (`/authorize`, `/api/token`, `/v1`).
    pub fn with_spotify_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.auth_url = format!("{base_url}/authorize");
        self.token_url = format!("{base_url}/api/token");
        self.api_url = format!("{base_url}/v1");
        self
    }

    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when one of the Spotify credentials
    /// (`SPOTIFY_API_AUTH_CLIENT_ID`, `SPOTIFY_API_AUTH_CLIENT_SECRET`,
    /// `SPOTIFY_API_REDIRECT_URI`) is not set, and [`ConfigError::Invalid`]
    /// when `SESSION_COOKIE_SECURE` is not a boolean.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::new(
            required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            required("SPOTIFY_API_REDIRECT_URI")?,
        );

        if let Some(scope) = optional("SPOTIFY_API_AUTH_SCOPE") {
            config.scope = scope;
        }
        if let Some(url) = optional("SPOTIFY_API_AUTH_URL") {
            config.auth_url = url;
        }
        if let Some(url) = optional("SPOTIFY_API_TOKEN_URL") {
            config.token_url = url;
        }
        if let Some(url) = optional("SPOTIFY_API_URL") {
            config.api_url = url;
        }
        if let Some(addr) = optional("SERVER_ADDRESS") {
            config.server_address = addr;
        }
        if let Some(url) = optional("FRONTEND_URL") {
            config.frontend_url = url;
        }
        if let Some(value) = optional("SESSION_COOKIE_SECURE") {
            config.session_cookie_secure = parse_bool("SESSION_COOKIE_SECURE", &value)?;
        }
        config.token_store_path = Some(
            optional("TOKEN_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_token_store_path),
        );

        Ok(config)
    }
}

/// Loads environment variables from `.env` files.
///
/// Looks for `spotiview/.env` in the platform-specific local data directory
/// first and then for a `.env` in the working directory. Missing files are not
/// an error; variables that are already set in the environment win.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotiview/.env`
/// - macOS: `~/Library/Application Support/spotiview/.env`
/// - Windows: `%LOCALAPPDATA%/spotiview/.env`
///
/// # Errors
///
/// Fails when the data directory cannot be created or when an existing `.env`
/// file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let mut path = data_dir();
    async_fs::create_dir_all(&path)
        .await
        .map_err(|e| e.to_string())?;
    path.push(".env");

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }

    // a local .env is optional
    dotenv::dotenv().ok();
    Ok(())
}

/// Root of everything spotiview keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotiview");
    path
}

pub fn default_token_store_path() -> PathBuf {
    let mut path = data_dir();
    path.push("tokens.json");
    path
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
