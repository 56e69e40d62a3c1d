use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "d_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Upper bound on the number of entries held by the in-process cache.
    #[serde(default = "d_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: d_ttl_seconds(),
            max_entries: d_max_entries(),
        }
    }
}

fn d_ttl_seconds() -> u64 {
    3600
}
fn d_max_entries() -> usize {
    10_000
}
