use serde::{Deserialize, Serialize};

/// Identifies where a composed context block's content came from —
/// carried in the block's own header (spec §4.8 "Context block carries
/// a header that identifies the source").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Small-talk turn: no retrieval was performed.
    Empty,
    /// Retrieval-backed turn, tagged with the knowledge base queried.
    Retrieval,
}

/// Machine-inspectable summary of one composed prompt, suitable for
/// structured logging alongside the turn's `TraceEvent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptReport {
    pub source: ContextSource,
    pub context_raw_chars: usize,
    pub context_injected_chars: usize,
    pub context_truncated: bool,
    pub history_turns_total: usize,
    pub history_turns_included: usize,
}
