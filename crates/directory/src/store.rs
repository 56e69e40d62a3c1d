//! The `DirectoryStore` trait abstracts over the employee record store.
//! The engine is stateless over rows; ownership stays with the store
//! (spec §3 "Ownership and lifecycle").

use async_trait::async_trait;
use chat_domain::{Employee, Result};

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// All employee rows. A store-level failure (connection refused,
    /// query timeout, ...) must surface as `Err` — the engine interprets
    /// this as "directory lookup failed", never as an empty result
    /// (spec §4.2 "Failure semantics").
    async fn all_employees(&self) -> Result<Vec<Employee>>;
}
