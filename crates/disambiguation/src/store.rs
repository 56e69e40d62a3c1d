//! The `DisambiguationStore` trait abstracts over the persistent
//! network key-value store that backs `AWAITING_SELECTION` state
//! (spec §4.7 "Persistence").

use async_trait::async_trait;
use chat_domain::{DisambiguationState, Result};

#[async_trait]
pub trait DisambiguationStore: Send + Sync {
    async fn get(&self, conversation_key: &str) -> Result<Option<DisambiguationState>>;

    /// Writing a new state overwrites any prior state for this key
    /// (spec §3 invariant: at most one state per conversation key).
    async fn put(
        &self,
        conversation_key: &str,
        state: DisambiguationState,
        ttl_seconds: u64,
    ) -> Result<()>;

    async fn delete(&self, conversation_key: &str) -> Result<()>;
}
