use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationConfig {
    #[serde(default = "d_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Connection string for the network key-value store. When empty,
    /// only the in-process fallback is used.
    #[serde(default)]
    pub store_url: String,
}

impl Default for DisambiguationConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: d_ttl_seconds(),
            store_url: String::new(),
        }
    }
}

fn d_ttl_seconds() -> u64 {
    600
}
