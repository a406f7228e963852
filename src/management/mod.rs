mod auth;
mod store;

pub use auth::RefreshSummary;
pub use auth::TokenManager;
pub use auth::short;
pub use store::StoreError;
pub use store::TokenStore;
