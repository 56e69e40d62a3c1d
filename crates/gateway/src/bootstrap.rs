//! Wires a [`Config`] into a running [`AppState`]: constructs every
//! collaborator, falling back to a local null implementation when its
//! section of config is left at its empty default, so a development
//! deployment with no external services configured still boots and
//! exercises the same error-handling paths as a misconfigured one in
//! production.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chat_collaborators::location::service::LocationSource;
use chat_collaborators::location::types::{LocationQuery, LocationServiceResponse};
use chat_collaborators::{fee::service::FeeRuleSource, FeeClient, LocationClient};
use chat_directory::{DirectoryEngine, DirectoryStore, RestDirectoryStore, StaticDirectoryStore};
use chat_disambiguation::{DisambiguationMachine, DisambiguationStore, RestDisambiguationStore};
use chat_domain::{Config, ConfigSeverity, Employee, Error, Result as ChatResult};
use chat_generative::OpenAiCompatClient;
use chat_promptctx::{system_prompt, PromptComposer};
use chat_retrieval::{InMemoryRetrievalCache, RestRetrievalClient, RetrievalClient, RetrievalProvider};
use chat_sessions::{FileSessionStore, SessionMemory, SessionStore};

use crate::runtime::{CancelMap, ConversationLockMap};
use crate::state::AppState;

/// Retrieval context is capped at roughly this many characters before
/// it's handed to the Generative Client — large enough for several
/// retrieved chunks, small enough to bound a single provider request.
const MAX_CONTEXT_CHARS: usize = 8_000;

pub fn validate_and_log(config: &Config) -> Result<()> {
    let issues = config.validate();
    let mut has_error = false;
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Error => {
                has_error = true;
                tracing::error!(field = %issue.field, message = %issue.message, "config error");
            }
            ConfigSeverity::Warning => {
                tracing::warn!(field = %issue.field, message = %issue.message, "config warning");
            }
        }
    }
    if has_error {
        bail!("refusing to start with invalid configuration, see logged config errors above");
    }
    Ok(())
}

pub fn build_state(config: Config) -> Result<AppState> {
    let config = Arc::new(config);

    let directory_store: Arc<dyn DirectoryStore> = if config.directory.connection_string.is_empty() {
        Arc::new(StaticDirectoryStore::new(Vec::<Employee>::new()))
    } else {
        Arc::new(RestDirectoryStore::new(&config.directory).context("building directory store")?)
    };
    let directory = Arc::new(DirectoryEngine::new(directory_store, config.directory.limit));

    let retrieval_provider: Arc<dyn RetrievalProvider> = if config.retrieval.url.is_empty() {
        Arc::new(NullRetrievalProvider)
    } else {
        Arc::new(RestRetrievalClient::new(&config.retrieval).context("building retrieval provider")?)
    };
    let retrieval_cache = Arc::new(InMemoryRetrievalCache::new(config.cache.max_entries));
    let retrieval = Arc::new(RetrievalClient::new(
        retrieval_provider,
        retrieval_cache,
        &config.retrieval,
        &config.cache,
    ));

    let fee_source: Arc<dyn FeeRuleSource> = if config.fee.url.is_empty() {
        Arc::new(NullFeeSource)
    } else {
        Arc::new(chat_collaborators::fee::service::RestFeeService::new(&config.fee).context("building fee service")?)
    };
    let fee = Arc::new(FeeClient::new(fee_source));

    let location_source: Arc<dyn LocationSource> = if config.location.url.is_empty() {
        Arc::new(NullLocationSource)
    } else {
        Arc::new(
            chat_collaborators::location::service::RestLocationService::new(&config.location)
                .context("building location service")?,
        )
    };
    let location = Arc::new(LocationClient::new(location_source, config.location.bank_name.clone()));

    let generative = Arc::new(OpenAiCompatClient::new(&config.generative).context("building generative client")?);

    let session_store: Option<Arc<dyn SessionStore>> = if config.memory.connection_string.is_empty() {
        None
    } else {
        Some(Arc::new(
            FileSessionStore::new(config.memory.connection_string.clone()).context("building session store")?,
        ))
    };
    let sessions = Arc::new(SessionMemory::new(session_store, config.memory.fallback_capacity));

    let disambiguation_store: Option<Arc<dyn DisambiguationStore>> = if config.disambiguation.store_url.is_empty() {
        None
    } else {
        Some(Arc::new(
            RestDisambiguationStore::new(&config.disambiguation).context("building disambiguation store")?,
        ))
    };
    let disambiguation = Arc::new(DisambiguationMachine::new(
        disambiguation_store,
        config.disambiguation.ttl_seconds,
    ));

    let composer = Arc::new(PromptComposer::new(config.orchestrator.max_history_turns, MAX_CONTEXT_CHARS));
    let system_prompt = Arc::new(system_prompt(&config.location.bank_name));

    let api_token_hash = std::env::var(&config.server.api_token_env)
        .ok()
        .filter(|t| !t.is_empty())
        .map(|token| {
            use sha2::{Digest, Sha256};
            Sha256::digest(token.as_bytes()).to_vec()
        });
    if api_token_hash.is_none() {
        tracing::warn!(
            env_var = %config.server.api_token_env,
            "no API token configured, /chat and /chat/sync are unauthenticated"
        );
    }

    Ok(AppState {
        config,
        system_prompt,
        directory,
        fee,
        location,
        retrieval,
        generative,
        sessions,
        disambiguation,
        composer,
        conversation_locks: Arc::new(ConversationLockMap::new()),
        cancel_tokens: Arc::new(CancelMap::new()),
        api_token_hash,
    })
}

/// Returned when the deployment leaves `retrieval.url` empty — every
/// generic/knowledge-base query then degrades straight to a notice and
/// a general-knowledge answer, exercising the same path a live outage
/// would take.
struct NullRetrievalProvider;

#[async_trait]
impl RetrievalProvider for NullRetrievalProvider {
    async fn query(
        &self,
        _req: &chat_retrieval::RetrievalRequest,
    ) -> ChatResult<chat_retrieval::RetrievalServiceResponse> {
        Err(Error::Retrieval("retrieval service is not configured".into()))
    }
}

struct NullFeeSource;

#[async_trait]
impl FeeRuleSource for NullFeeSource {
    async fn rules_for(&self, _charge_type: &str) -> ChatResult<Vec<chat_collaborators::fee::types::FeeRule>> {
        Err(Error::AuthoritativeError {
            source_name: "fee".into(),
            message: "fee service is not configured".into(),
        })
    }
}

struct NullLocationSource;

#[async_trait]
impl LocationSource for NullLocationSource {
    async fn query(&self, _query: &LocationQuery) -> ChatResult<LocationServiceResponse> {
        Err(Error::AuthoritativeError {
            source_name: "location".into(),
            message: "location service is not configured".into(),
        })
    }
}
