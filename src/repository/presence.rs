//! Presence repository (realtime database seam)

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{error::AppResult, models::presence::Presence};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Write the presence entry for `presence.user_id`
    async fn set(&self, presence: Presence) -> AppResult<()>;

    async fn get(&self, user_id: &str) -> AppResult<Option<Presence>>;

    async fn list(&self) -> AppResult<Vec<Presence>>;
}

#[derive(Default)]
pub struct MemoryPresenceStore {
    entries: RwLock<HashMap<String, Presence>>,
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn set(&self, presence: Presence) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(presence.user_id.clone(), presence);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> AppResult<Option<Presence>> {
        Ok(self.entries.read().await.get(user_id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Presence>> {
        let mut entries: Vec<Presence> = self.entries.read().await.values().cloned().collect();
        entries.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(entries)
    }
}
