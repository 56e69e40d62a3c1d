//! `chat-sessions` — Session Memory (spec §2.6, §4.8 "Persistence").
//!
//! A `SessionStore` holds each session's turn history. The durable
//! implementation is [`FileSessionStore`]; [`InMemorySessionStore`] is the
//! bounded fallback used while the durable store is degraded (spec §7,
//! `PersistenceDegraded`).

pub mod file_store;
pub mod memory;
pub mod memory_store;
pub mod session_key;
pub mod store;

pub use file_store::FileSessionStore;
pub use memory::SessionMemory;
pub use memory_store::InMemorySessionStore;
pub use session_key::resolve_session;
pub use store::SessionStore;
