use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The raw user message plus the identifiers the rest of the pipeline
/// keys off of. Created by the HTTP boundary; immutable after creation.
///
/// `conversation_key` is a stable derivative (session id joined with a
/// channel/remote identifier) used only for disambiguation state;
/// `session_id` is used for memory. The two are distinct because a
/// conversation key may exist when no session has been established yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub session_id: String,
    pub conversation_key: String,
    pub knowledge_base_hint: Option<String>,
}

/// Routing tags plus an extracted, normalized search term.
///
/// At most one tag in the authoritative-routing subset
/// (`directory_lookup`, `fee_query`, `location_query`) is dominant; when
/// more than one fires, `directory_lookup` > `fee_query` > `location_query`
/// during *classification* (§4.1). The orchestrator's *dispatch* order is
/// different — see `chat_gateway::runtime::turn`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    pub small_talk: bool,
    pub directory_lookup: bool,
    pub fee_query: bool,
    pub location_query: bool,
    pub management: bool,
    pub policy: bool,
    pub financial_report: bool,
    pub milestone: bool,
    pub user_document: bool,
    pub generic: bool,
    /// Normalized search term for directory queries. `None` when the
    /// residual was empty or the tag set has no directory component.
    pub search_term: Option<String>,
}

impl Classification {
    /// Any tag in the authoritative-routing subset is set.
    pub fn is_authoritative(&self) -> bool {
        self.directory_lookup || self.fee_query || self.location_query
    }

    /// First matching knowledge-base selector in declaration order, or
    /// `None` if no KB tag fired (the orchestrator then uses the
    /// deployment default).
    pub fn knowledge_base_tag(&self) -> Option<&'static str> {
        if self.management {
            Some("management")
        } else if self.policy {
            Some("policy")
        } else if self.financial_report {
            Some("financial_report")
        } else if self.milestone {
            Some("milestone")
        } else if self.user_document {
            Some("user_document")
        } else {
            None
        }
    }

    /// All set tags, for trace logging.
    pub fn tag_names(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if self.small_talk {
            tags.push("small_talk".into());
        }
        if self.directory_lookup {
            tags.push("directory_lookup".into());
        }
        if self.fee_query {
            tags.push("fee_query".into());
        }
        if self.location_query {
            tags.push("location_query".into());
        }
        if self.management {
            tags.push("management".into());
        }
        if self.policy {
            tags.push("policy".into());
        }
        if self.financial_report {
            tags.push("financial_report".into());
        }
        if self.milestone {
            tags.push("milestone".into());
        }
        if self.user_document {
            tags.push("user_document".into());
        }
        if self.generic {
            tags.push("generic".into());
        }
        tags
    }
}

/// One selectable item within an `AWAITING_SELECTION` disambiguation
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationOption {
    /// 1-based, presented to the user ("1. Classic", "2. Gold", ...).
    pub index: usize,
    pub display_name: String,
    pub canonical_id: String,
    /// Normalized tokens eligible for substring matching during
    /// resolution. Deliberately does NOT include tokens from
    /// `answer_text` — that text is prose, not a keyed identifier.
    pub match_keys: BTreeSet<String>,
    /// Precomputed verbatim answer to stream if this option is selected,
    /// when the caller (typically the Fee Client) can precompute it.
    pub answer_text: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DisambiguationKind {
    RetailAsset,
    CardProduct,
}

/// Persistent per-conversation-key disambiguation state. At most one
/// instance exists per conversation key at any time; a new write
/// overwrites any prior state; it expires after a bounded wall-clock
/// interval regardless of whether it was explicitly consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationState {
    pub kind: DisambiguationKind,
    pub options: Vec<DisambiguationOption>,
    /// Opaque carry-over the disambiguation-raising collaborator needs to
    /// resume the original query once an option is selected.
    pub context: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// A persisted conversation turn. Sequence within a `session_id` is total
/// and monotone by `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub session_id: String,
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// A cached retrieval-service response, keyed by content fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub payload: String,
    pub expires_at: DateTime<Utc>,
}

/// A directory (phonebook) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub full_name: String,
    pub designation: String,
    pub department: String,
    pub division: String,
    pub email: String,
    pub mobile: String,
    pub ip_phone: String,
}

impl Employee {
    /// Full-text search vector: name weighted highest, designation and
    /// department medium, division and email lowest. Weighting is
    /// expressed by repetition so a simple substring/term-count scorer
    /// over this string reproduces the intended field weights.
    pub fn search_vector(&self) -> String {
        format!(
            "{name} {name} {name} {designation} {department} {division} {email}",
            name = self.full_name.to_lowercase(),
            designation = self.designation.to_lowercase(),
            department = self.department.to_lowercase(),
            division = self.division.to_lowercase(),
            email = self.email.to_lowercase(),
        )
    }
}

/// The orchestrator's unit of output: text, whether it is authoritative,
/// and whether retrieval fallback must be suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedAnswer {
    pub text: String,
    pub source_tag: String,
    pub is_authoritative: bool,
    /// When true the orchestrator MUST NOT fall through to retrieval
    /// regardless of `is_authoritative` (e.g. directory miss, location
    /// error) — see spec.md §9 "Never fall through to retrieval".
    pub suppress_generation: bool,
}

impl RenderedAnswer {
    pub fn authoritative(text: impl Into<String>, source_tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_tag: source_tag.into(),
            is_authoritative: true,
            suppress_generation: true,
        }
    }
}
