use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::server::SharedState;

/// Status and version, plus the number of stored account records.
pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "linked_sessions": state.tokens.store().len().await
    }))
}
