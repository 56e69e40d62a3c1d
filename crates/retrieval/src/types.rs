//! Wire types for the knowledge retrieval service (spec §4.3).

use serde::{Deserialize, Serialize};

/// Hybrid-mode retrieval parameters. Every field is fixed per spec §4.3;
/// the orchestrator never tunes these per turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalParams {
    pub mode: &'static str,
    pub top_k_entities: u32,
    pub top_k_chunks: u32,
    pub max_entity_tokens: u32,
    pub max_relation_tokens: u32,
    pub max_total_tokens: u32,
    pub rerank: bool,
    pub return_full_response: bool,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            mode: "hybrid",
            top_k_entities: 8,
            top_k_chunks: 5,
            max_entity_tokens: 2500,
            max_relation_tokens: 3500,
            max_total_tokens: 12000,
            rerank: true,
            return_full_response: true,
        }
    }
}

/// POST query body sent to the retrieval service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalRequest {
    pub knowledge_base: String,
    pub query: String,
    #[serde(flatten)]
    pub params: RetrievalParams,
}

/// One retrieved entity (node in the knowledge graph).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedEntity {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One retrieved relationship edge between two entities.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedRelationship {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One retrieved text chunk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Raw response from the retrieval service.
///
/// When `response` is present and is not a template placeholder, it is
/// the canonical context (spec §4.3). Otherwise the client stitches
/// `entities`, `relationships`, and `chunks`, in that order — entities
/// are scanned before chunks because later instructions may reference
/// entities introduced earlier in the context block.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalServiceResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub entities: Vec<RetrievedEntity>,
    #[serde(default)]
    pub relationships: Vec<RetrievedRelationship>,
    #[serde(default)]
    pub chunks: Vec<RetrievedChunk>,
    #[serde(default)]
    pub references: Vec<String>,
}

/// A small set of known template placeholders the retrieval service emits
/// when it has nothing substantive to say — these must not be treated as
/// a canonical answer.
const TEMPLATE_RESPONSES: &[&str] = &[
    "",
    "no relevant information found",
    "i don't have information about that",
    "n/a",
];

impl RetrievalServiceResponse {
    /// `true` when `response` is present and is not one of the service's
    /// template placeholders.
    pub fn has_canonical_response(&self) -> bool {
        match &self.response {
            Some(s) => {
                let trimmed = s.trim();
                !TEMPLATE_RESPONSES
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(trimmed))
            }
            None => false,
        }
    }
}

/// The client's formatted output, ready to be passed to the Generative
/// Client as the context block.
#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub context: String,
    pub references: Vec<String>,
    pub cache_hit: bool,
}
