//! Bounded in-memory fallback `SessionStore` (spec §7 error class 6,
//! `PersistenceDegraded`): used when the durable store is unavailable so
//! the current turn still has a transcript to append to and read from.
//! State is process-local and lost on restart by design.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chat_domain::{Result, TurnRecord};
use parking_lot::Mutex;

use crate::store::SessionStore;

pub struct InMemorySessionStore {
    capacity: usize,
    sessions: Mutex<HashMap<String, VecDeque<TurnRecord>>>,
}

impl InMemorySessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn append(&self, session_id: &str, record: TurnRecord) -> Result<()> {
        let mut sessions = self.sessions.lock();
        let turns = sessions.entry(session_id.to_owned()).or_default();
        turns.push_back(record);
        while turns.len() > self.capacity {
            turns.pop_front();
        }
        Ok(())
    }

    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<TurnRecord>> {
        let sessions = self.sessions.lock();
        let turns = match sessions.get(session_id) {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };
        let start = turns.len().saturating_sub(limit);
        Ok(turns.iter().skip(start).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_domain::TurnRole;
    use chrono::Utc;

    fn turn(content: &str) -> TurnRecord {
        TurnRecord {
            session_id: "s1".to_owned(),
            role: TurnRole::User,
            content: content.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_then_recent_round_trips() {
        let store = InMemorySessionStore::new(10);
        store.append("s1", turn("hi")).await.unwrap();
        let recent = store.recent("s1", 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "hi");
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let store = InMemorySessionStore::new(2);
        for i in 0..5 {
            store.append("s1", turn(&format!("turn-{i}"))).await.unwrap();
        }
        let recent = store.recent("s1", 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "turn-3");
        assert_eq!(recent[1].content, "turn-4");
    }

    #[tokio::test]
    async fn unknown_session_is_empty_not_error() {
        let store = InMemorySessionStore::new(10);
        let recent = store.recent("absent", 10).await.unwrap();
        assert!(recent.is_empty());
    }
}
