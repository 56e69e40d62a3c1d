//! The `SessionStore` trait abstracts over whatever durably holds each
//! session's transcript (spec §2.6) — a file-backed store in this
//! deployment, a pooled network store in others.

use async_trait::async_trait;
use chat_domain::{Result, TurnRecord};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Appends one turn record. Per spec, append is a suspension point —
    /// this is the request/response I/O leg of the store's connection
    /// pool, not an in-process operation.
    async fn append(&self, session_id: &str, record: TurnRecord) -> Result<()>;

    /// Returns the most recent `limit` records for a session,
    /// oldest-first, suitable for direct use as the Generative Client's
    /// transcript window.
    async fn recent(&self, session_id: &str, limit: usize) -> Result<Vec<TurnRecord>>;
}
