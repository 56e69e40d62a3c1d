pub mod config;
pub mod error;
pub mod stream;
pub mod trace;
pub mod types;

pub use config::{Config, ConfigError, ConfigSeverity};
pub use error::{Error, Result};
pub use stream::{BoxStream, StreamEvent};
pub use trace::TraceEvent;
pub use types::{
    CacheEntry, Classification, DisambiguationKind, DisambiguationOption, DisambiguationState,
    Employee, RenderedAnswer, TurnRecord, TurnRole, Utterance,
};

/// Derives the correlation identifier used to join a single turn's trace
/// events, per spec §7 "Propagation": `session_id` and `conversation_key`
/// joined, truncated for log-line readability.
pub fn correlation_id(session_id: &str, conversation_key: &str) -> String {
    format!("{session_id}:{conversation_key}")
}
