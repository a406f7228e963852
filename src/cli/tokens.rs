use std::time::Duration;

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tabled::Table;

use crate::{
    config::Config,
    error,
    management::{TokenManager, TokenStore, short},
    spotify::SpotifyAuth,
    success,
    types::TokenTableRow,
    warning,
};

async fn open_store(config: &Config) -> TokenStore {
    let result = match &config.token_store_path {
        Some(path) => TokenStore::open(path.clone()).await,
        None => Ok(TokenStore::in_memory()),
    };

    match result {
        Ok(store) => store,
        Err(e) => error!("Cannot open token store. Err: {}", e),
    }
}

pub async fn tokens(config: Config) {
    let store = open_store(&config).await;
    let tokens = store.all().await;

    if tokens.is_empty() {
        warning!("No sessions stored yet.");
        return;
    }

    let now = Utc::now();
    let rows: Vec<TokenTableRow> = tokens
        .iter()
        .map(|t| TokenTableRow {
            session: short(&t.session_key).to_string(),
            token_type: t.token_type.clone(),
            created_at: t.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            expires_at: t.expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: if t.needs_refresh_at(now) {
                "expired".to_string()
            } else {
                "valid".to_string()
            },
        })
        .collect();

    let table = Table::new(rows);
    println!("{}", table);
}

pub async fn refresh(config: Config) {
    let store = open_store(&config).await;
    let http = match Client::builder().timeout(Duration::from_secs(30)).build() {
        Ok(c) => c,
        Err(e) => error!("Cannot build HTTP client. Err: {}", e),
    };
    let manager = TokenManager::new(store, SpotifyAuth::new(&config, http));

    let pb = ProgressBar::new_spinner();
    pb.set_message("Refreshing expired tokens...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let summary = manager.refresh_expired().await;
    pb.finish_and_clear();

    if summary.refreshed == 0 && summary.failed == 0 {
        success!("Nothing to refresh here.");
        return;
    }
    if summary.refreshed > 0 {
        success!("Refreshed {} session(s).", summary.refreshed);
    }
    if summary.failed > 0 {
        warning!("{} session(s) could not be refreshed.", summary.failed);
    }
}
