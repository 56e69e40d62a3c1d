//! Combines the durable [`SessionStore`] with the bounded in-memory
//! fallback so a store outage never loses the current turn (spec §7,
//! `PersistenceDegraded`) — mirrors the primary+local-fallback shape
//! `chat-disambiguation::DisambiguationMachine` uses for its own store.

use std::sync::Arc;

use chat_domain::{Result, TurnRecord};

use crate::memory_store::InMemorySessionStore;
use crate::store::SessionStore;

/// Session Memory (spec §2 component 6): appends to the durable store
/// when one is configured, falling back to the bounded in-memory store
/// on failure. Reads prefer the durable store too, falling back on
/// error so a degraded turn still sees its own fallback-recorded
/// history.
pub struct SessionMemory {
    primary: Option<Arc<dyn SessionStore>>,
    fallback: Arc<InMemorySessionStore>,
}

impl SessionMemory {
    pub fn new(primary: Option<Arc<dyn SessionStore>>, fallback_capacity: usize) -> Self {
        Self {
            primary,
            fallback: Arc::new(InMemorySessionStore::new(fallback_capacity)),
        }
    }

    /// `true` when the last append/recent call had to use the fallback
    /// because the durable store errored (spec §7 `PersistenceDegraded`).
    pub async fn append(&self, session_id: &str, record: TurnRecord) -> (Result<()>, bool) {
        if let Some(primary) = &self.primary {
            match primary.append(session_id, record.clone()).await {
                Ok(()) => {
                    let _ = self.fallback.append(session_id, record).await;
                    return (Ok(()), false);
                }
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "session store append failed, using in-memory fallback");
                    let res = self.fallback.append(session_id, record).await;
                    return (res, true);
                }
            }
        }
        (self.fallback.append(session_id, record).await, true)
    }

    pub async fn recent(&self, session_id: &str, limit: usize) -> (Result<Vec<TurnRecord>>, bool) {
        if let Some(primary) = &self.primary {
            match primary.recent(session_id, limit).await {
                Ok(records) => return (Ok(records), false),
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "session store read failed, using in-memory fallback");
                    let res = self.fallback.recent(session_id, limit).await;
                    return (res, true);
                }
            }
        }
        (self.fallback.recent(session_id, limit).await, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_domain::{Error, TurnRole};
    use chrono::Utc;

    fn turn(content: &str) -> TurnRecord {
        TurnRecord {
            session_id: "s1".into(),
            role: TurnRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn append(&self, _session_id: &str, _record: TurnRecord) -> Result<()> {
            Err(Error::PersistenceDegraded("connection refused".into()))
        }
        async fn recent(&self, _session_id: &str, _limit: usize) -> Result<Vec<TurnRecord>> {
            Err(Error::PersistenceDegraded("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn no_primary_always_uses_fallback() {
        let memory = SessionMemory::new(None, 10);
        let (res, degraded) = memory.append("s1", turn("hi")).await;
        assert!(res.is_ok());
        assert!(degraded);
    }

    #[tokio::test]
    async fn primary_failure_falls_back_and_reports_degraded() {
        let memory = SessionMemory::new(Some(Arc::new(FailingStore)), 10);
        let (res, degraded) = memory.append("s1", turn("hi")).await;
        assert!(res.is_ok());
        assert!(degraded);

        let (recent, degraded) = memory.recent("s1", 10).await;
        assert_eq!(recent.unwrap().len(), 1);
        assert!(degraded);
    }
}
