//! # CLI Module
//!
//! Command implementations behind the `spotiview` binary.
//!
//! - [`serve`] - runs the HTTP server until it is stopped
//! - [`tokens`] - prints the stored session records as a table
//! - [`refresh`] - refreshes every record that is near or past expiry
//!
//! Commands report to the console with the crate's colored status macros
//! and exit the process through [`crate::error!`] on fatal failures.
//!
//! ```bash
//! spotiview serve --address 0.0.0.0:8000
//! spotiview tokens
//! spotiview refresh
//! ```

mod serve;
mod tokens;

pub use serve::serve;
pub use tokens::refresh;
pub use tokens::tokens;
