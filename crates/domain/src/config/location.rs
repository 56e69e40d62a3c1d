use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Bank display name used in count-sentence rendering, e.g. "EBL".
    #[serde(default = "d_bank_name")]
    pub bank_name: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key_env: d_api_key_env(),
            timeout_ms: d_timeout_ms(),
            bank_name: d_bank_name(),
        }
    }
}

fn d_api_key_env() -> String {
    "LOCATION_SERVICE_API_KEY".into()
}
fn d_timeout_ms() -> u64 {
    5000
}
fn d_bank_name() -> String {
    "the bank".into()
}
