use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "d_max_history_turns")]
    pub max_history_turns: usize,
    #[serde(default = "d_per_call_timeout_ms")]
    pub per_call_timeout_ms: u64,
    #[serde(default = "d_retry_count")]
    pub retry_count: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_history_turns: d_max_history_turns(),
            per_call_timeout_ms: d_per_call_timeout_ms(),
            retry_count: d_retry_count(),
        }
    }
}

fn d_max_history_turns() -> usize {
    20
}
fn d_per_call_timeout_ms() -> u64 {
    6000
}
fn d_retry_count() -> u32 {
    1
}
