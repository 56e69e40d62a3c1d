use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_model")]
    pub model: String,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    #[serde(default = "d_stream")]
    pub stream: bool,
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key_env: d_api_key_env(),
            model: d_model(),
            temperature: d_temperature(),
            stream: d_stream(),
            max_tokens: d_max_tokens(),
        }
    }
}

fn d_api_key_env() -> String {
    "GENERATIVE_API_KEY".into()
}
fn d_model() -> String {
    "gpt-4o-mini".into()
}
fn d_temperature() -> f64 {
    0.2
}
fn d_stream() -> bool {
    true
}
fn d_max_tokens() -> u32 {
    1024
}
