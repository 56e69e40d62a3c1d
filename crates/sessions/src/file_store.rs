//! JSONL-backed `SessionStore`, the durable implementation of Session
//! Memory (spec §2.6). Each session gets a `<session_id>.jsonl` file;
//! every turn is appended as one JSON line — grounded on the append-only
//! transcript pattern (one line per message, opened in append mode on
//! every write).

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chat_domain::{Error, Result, TurnRecord};

use crate::store::SessionStore;

pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir).map_err(Error::Io)?;
        Ok(Self { base_dir })
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.jsonl"))
    }

    fn read_lines(path: &Path) -> Result<Vec<TurnRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut records = Vec::new();
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TurnRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping malformed transcript line");
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn append(&self, session_id: &str, record: TurnRecord) -> Result<()> {
        let path = self.path_for(session_id);
        let json = serde_json::to_string(&record)?;

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(Error::Io)?;
            writeln!(file, "{json}").map_err(Error::Io)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::PersistenceDegraded(e.to_string()))??;

        Ok(())
    }

    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<TurnRecord>> {
        let path = self.path_for(session_id);
        let mut records = tokio::task::spawn_blocking(move || Self::read_lines(&path))
            .await
            .map_err(|e| Error::PersistenceDegraded(e.to_string()))??;

        if records.len() > limit {
            let start = records.len() - limit;
            records.drain(..start);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_domain::TurnRole;
    use chrono::Utc;

    fn turn(role: TurnRole, content: &str) -> TurnRecord {
        TurnRecord {
            session_id: "s1".to_owned(),
            role,
            content: content.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_then_recent_round_trips() {
        let dir = tempdir();
        let store = FileSessionStore::new(&dir).unwrap();

        store.append("s1", turn(TurnRole::User, "hi")).await.unwrap();
        store
            .append("s1", turn(TurnRole::Assistant, "hello"))
            .await
            .unwrap();

        let recent = store.recent("s1", 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "hi");
        assert_eq!(recent[1].content, "hello");
    }

    #[tokio::test]
    async fn recent_respects_limit_keeping_the_tail() {
        let dir = tempdir();
        let store = FileSessionStore::new(&dir).unwrap();

        for i in 0..5 {
            store
                .append("s1", turn(TurnRole::User, &format!("turn-{i}")))
                .await
                .unwrap();
        }

        let recent = store.recent("s1", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "turn-3");
        assert_eq!(recent[1].content, "turn-4");
    }

    #[tokio::test]
    async fn missing_session_returns_empty() {
        let dir = tempdir();
        let store = FileSessionStore::new(&dir).unwrap();
        let recent = store.recent("never-seen", 10).await.unwrap();
        assert!(recent.is_empty());
    }

    fn tempdir() -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("chat-sessions-test-{}", uuid::Uuid::new_v4()));
        dir
    }
}
