//! In-process fallback store, maintained in parallel with the network
//! store so a store outage does not lose the immediate next turn
//! (spec §4.7 "Persistence").

use async_trait::async_trait;
use chat_domain::{DisambiguationState, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::store::DisambiguationStore;

struct Entry {
    state: DisambiguationState,
    expires_at: DateTime<Utc>,
}

pub struct LocalFallbackStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for LocalFallbackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalFallbackStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drops every entry whose TTL has already elapsed. `get` already
    /// evicts lazily on access, but a conversation key that never sends
    /// a follow-up turn would otherwise linger in the map forever; a
    /// periodic sweep bounds that.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl DisambiguationStore for LocalFallbackStore {
    async fn get(&self, conversation_key: &str) -> Result<Option<DisambiguationState>> {
        let mut entries = self.entries.lock();
        match entries.get(conversation_key) {
            Some(e) if e.expires_at > Utc::now() => Ok(Some(e.state.clone())),
            Some(_) => {
                entries.remove(conversation_key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        conversation_key: &str,
        state: DisambiguationState,
        ttl_seconds: u64,
    ) -> Result<()> {
        self.entries.lock().insert(
            conversation_key.to_owned(),
            Entry {
                state,
                expires_at: Utc::now() + chrono::Duration::seconds(ttl_seconds as i64),
            },
        );
        Ok(())
    }

    async fn delete(&self, conversation_key: &str) -> Result<()> {
        self.entries.lock().remove(conversation_key);
        Ok(())
    }
}
