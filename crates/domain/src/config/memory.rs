use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub connection_string: String,
    #[serde(default = "d_fallback_capacity")]
    pub fallback_capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            fallback_capacity: d_fallback_capacity(),
        }
    }
}

fn d_fallback_capacity() -> usize {
    500
}
