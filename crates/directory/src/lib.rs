//! `chat-directory` — the Directory Query Engine (spec §4.2).

pub mod engine;
pub mod rest;
pub mod store;

pub use engine::DirectoryEngine;
pub use rest::{RestDirectoryStore, StaticDirectoryStore};
pub use store::DirectoryStore;
