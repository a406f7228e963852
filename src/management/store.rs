use std::{collections::HashMap, io::Error, path::PathBuf};

use tokio::sync::Mutex;

use crate::types::SessionToken;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Session token records keyed by session key.
///
/// Every write is flushed to a JSON file when the store was opened with a
/// path. The file holds a plain array of [`SessionToken`].
pub struct TokenStore {
    path: Option<PathBuf>,
    tokens: Mutex<HashMap<String, SessionToken>>,
}

impl TokenStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Opens the store backed by `path`. A missing file is an empty store.
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let tokens = match async_fs::read_to_string(&path).await {
            Ok(content) => {
                let records: Vec<SessionToken> = serde_json::from_str(&content)?;
                records
                    .into_iter()
                    .map(|t| (t.session_key.clone(), t))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::IoError(e)),
        };

        Ok(Self {
            path: Some(path),
            tokens: Mutex::new(tokens),
        })
    }

    pub async fn get(&self, session_key: &str) -> Option<SessionToken> {
        self.tokens.lock().await.get(session_key).cloned()
    }

    /// Inserts or replaces the record of `token.session_key`.
    ///
    /// Memory is only updated once the file write succeeded, so a failed
    /// write leaves the store as it was.
    pub async fn upsert(&self, token: SessionToken) -> Result<(), StoreError> {
        let mut tokens = self.tokens.lock().await;
        let mut updated = tokens.clone();
        updated.insert(token.session_key.clone(), token);

        self.persist(&updated).await?;
        *tokens = updated;
        Ok(())
    }

    /// All records, oldest first.
    pub async fn all(&self) -> Vec<SessionToken> {
        let mut all: Vec<SessionToken> = self.tokens.lock().await.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        all
    }

    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn persist(&self, tokens: &HashMap<String, SessionToken>) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let mut records: Vec<&SessionToken> = tokens.values().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let json = serde_json::to_string_pretty(&records)?;
        async_fs::write(path, json).await?;
        Ok(())
    }
}
