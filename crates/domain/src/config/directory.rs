use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub connection_string: String,
    #[serde(default = "d_limit")]
    pub limit: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            limit: d_limit(),
        }
    }
}

fn d_limit() -> usize {
    5
}
