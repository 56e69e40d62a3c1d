use std::sync::Arc;

use chat_collaborators::{FeeClient, LocationClient};
use chat_directory::DirectoryEngine;
use chat_disambiguation::DisambiguationMachine;
use chat_domain::Config;
use chat_generative::GenerativeClient;
use chat_promptctx::PromptComposer;
use chat_retrieval::RetrievalClient;
use chat_sessions::SessionMemory;

use crate::runtime::cancel::CancelMap;
use crate::runtime::conversation_lock::ConversationLockMap;

/// Shared application state passed to every API handler.
///
/// Fields are grouped by concern:
/// - **Core** — config, bank display name, system prompt
/// - **Collaborators** — the authoritative sources and the two
///   knowledge-side adapters the Turn Orchestrator dispatches to
/// - **Conversation** — session memory, disambiguation, prompt composition
/// - **Concurrency** — per-conversation-key ordering lock
/// - **Security** — the bearer-token hash computed once at startup
#[derive(Clone)]
pub struct AppState {
    // ── Core ─────────────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub system_prompt: Arc<String>,

    // ── Collaborators ────────────────────────────────────────────────
    pub directory: Arc<DirectoryEngine>,
    pub fee: Arc<FeeClient>,
    pub location: Arc<LocationClient>,
    pub retrieval: Arc<RetrievalClient>,
    pub generative: Arc<dyn GenerativeClient>,

    // ── Conversation ─────────────────────────────────────────────────
    pub sessions: Arc<SessionMemory>,
    pub disambiguation: Arc<DisambiguationMachine>,
    pub composer: Arc<PromptComposer>,

    // ── Concurrency ──────────────────────────────────────────────────
    pub conversation_locks: Arc<ConversationLockMap>,
    /// Per-session cancel tokens, checked by the orchestrator between
    /// streamed chunks so a client disconnect stops in-flight work even
    /// faster than the channel-closed signal alone (spec §5).
    pub cancel_tokens: Arc<CancelMap>,

    // ── Security (startup-computed) ──────────────────────────────────
    /// SHA-256 hash of the API bearer token (read once at startup).
    /// `None` = dev mode (no auth enforced).
    pub api_token_hash: Option<Vec<u8>>,
}
