//! Generation record store
//!
//! Deduplicates repeat submissions by player name. The durable key-value
//! backend is an external collaborator; [`MemoryStore`] is the in-process
//! default.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::SaveError;

/// One generation event, keyed by player name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenRecord {
    /// Millisecond timestamp of the first generation.
    pub gen_time: i64,
    /// The artifact handed back on every repeat submission.
    pub last_generated: String,
    /// Millisecond timestamp of the most recent submission.
    pub last_seen: i64,
    #[serde(default)]
    pub ip: Option<String>,
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
pub trait SaveStore: Send + Sync {
    async fn get(&self, player_name: &str) -> Result<Option<GenRecord>, SaveError>;
    async fn put(&self, player_name: &str, record: GenRecord) -> Result<(), SaveError>;
}

#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, GenRecord>>,
}

#[async_trait]
impl SaveStore for MemoryStore {
    async fn get(&self, player_name: &str) -> Result<Option<GenRecord>, SaveError> {
        Ok(self.records.read().await.get(player_name).cloned())
    }

    async fn put(&self, player_name: &str, record: GenRecord) -> Result<(), SaveError> {
        self.records
            .write()
            .await
            .insert(player_name.to_string(), record);
        Ok(())
    }
}
