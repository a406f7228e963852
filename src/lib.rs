//! Spotify listening stats backend.
//!
//! This library authenticates browser sessions against the Spotify Web API
//! using the OAuth 2.0 authorization-code flow, keeps one token record per
//! session, refreshes access tokens when they run out and serves a small JSON
//! API that reshapes Spotify responses for a frontend.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for authentication and listening data
//! - `cli` - Implementations of the `spotiview` commands
//! - `config` - Configuration management and environment variables
//! - `error` - Error type shared by the HTTP handlers
//! - `management` - Token persistence and token lifecycle
//! - `server` - Router assembly and the HTTP server loop
//! - `spotify` - Spotify accounts and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Reshaping of Spotify responses into API payloads
//!
//! # Example
//!
//! ```no_run
//! use spotiview::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> spotiview::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     server::start_api_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the binary and CLI level where errors from several layers
/// (configuration, storage, HTTP) meet. Library code returns the typed
/// errors from [`error`], [`management`] and [`config`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Used by the command-line commands for progress and status lines. Server
/// side logging goes through `tracing` instead.
///
/// # Example
///
/// ```ignore
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```ignore
/// success!("Refreshed {} session tokens", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates with exit code 1 right after printing, so it is only meant for
/// fatal errors at the command-line level (bad configuration, unreadable
/// token store). Never use it inside request handlers.
///
/// # Example
///
/// ```ignore
/// error!("Cannot open token store: {}", e);
/// // unreachable
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```ignore
/// warning!("Token store is empty, nothing to refresh");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
