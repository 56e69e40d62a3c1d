use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key_env: d_api_key_env(),
            timeout_ms: d_timeout_ms(),
        }
    }
}

fn d_api_key_env() -> String {
    "FEE_SERVICE_API_KEY".into()
}
fn d_timeout_ms() -> u64 {
    5000
}
