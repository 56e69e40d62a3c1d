use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default)]
    pub url: String,
    /// Env var holding the retrieval service API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_default_kb")]
    pub default_kb: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum concurrent in-flight retrieval calls before callers wait.
    #[serde(default = "d_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key_env: d_api_key_env(),
            default_kb: d_default_kb(),
            timeout_ms: d_timeout_ms(),
            max_concurrency: d_max_concurrency(),
        }
    }
}

fn d_api_key_env() -> String {
    "RETRIEVAL_API_KEY".into()
}
fn d_default_kb() -> String {
    "general".into()
}
fn d_timeout_ms() -> u64 {
    8000
}
fn d_max_concurrency() -> usize {
    16
}
