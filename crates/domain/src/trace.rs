use serde::Serialize;

/// Structured trace events emitted across the chat-orchestrator crates.
///
/// Each event is logged through `tracing::info!` as a single JSON-tagged
/// line so a turn's events can be joined on `correlation_id`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ClassificationDone {
        correlation_id: String,
        tags: Vec<String>,
        search_term: Option<String>,
    },
    DirectoryLookup {
        correlation_id: String,
        search_term: String,
        hits: usize,
    },
    FeeCall {
        correlation_id: String,
        charge_type: String,
        status: String,
        duration_ms: u64,
    },
    LocationCall {
        correlation_id: String,
        location_type: String,
        duration_ms: u64,
    },
    RetrievalCall {
        correlation_id: String,
        knowledge_base: String,
        cache_hit: bool,
        duration_ms: u64,
    },
    CacheHit {
        correlation_id: String,
        fingerprint: String,
    },
    CacheMiss {
        correlation_id: String,
        fingerprint: String,
    },
    DisambiguationResolved {
        correlation_id: String,
        conversation_key: String,
        option_index: usize,
    },
    DisambiguationReprompted {
        correlation_id: String,
        conversation_key: String,
    },
    DisambiguationExpired {
        correlation_id: String,
        conversation_key: String,
    },
    GenerativeStreamStarted {
        correlation_id: String,
        model: String,
    },
    TurnCompleted {
        correlation_id: String,
        session_id: String,
        authoritative: bool,
        duration_ms: u64,
    },
    TurnDegraded {
        correlation_id: String,
        reason: String,
    },
    TurnCancelled {
        correlation_id: String,
        session_id: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "turn_event");
    }
}
