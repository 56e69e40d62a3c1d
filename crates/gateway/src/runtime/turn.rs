//! Turn Orchestrator (spec §4.8): the single place that decides, for
//! one utterance, whether the answer comes from a disambiguation
//! resume, an authoritative collaborator, small talk, or retrieval plus
//! generation — and persists exactly one user/assistant turn pair
//! regardless of which path was taken.
//!
//! Orchestration runs inside a spawned task so a dropped HTTP response
//! (client disconnect) never truncates persistence: whatever text was
//! produced before the disconnect is still appended to session memory.
//! This mirrors the teacher's `run_turn(state, input) -> (run_id, rx)`
//! shape in `crates/gateway/src/api/chat.rs`.

use std::time::Instant;

use chat_collaborators::{fee::extract as fee_extract, location::extract as location_extract, FeeOutcome};
use chat_disambiguation::ResolveOutcome;
use chat_domain::{correlation_id, Error, RenderedAnswer, StreamEvent, TraceEvent, TurnRecord, TurnRole};
use chrono::Utc;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::runtime::cancel::CancelToken;
use crate::runtime::render;
use crate::state::AppState;

pub struct ChatInput {
    pub query: String,
    pub session_id: Option<String>,
    pub knowledge_base: Option<String>,
}

/// Starts a turn in the background and returns the resolved session id,
/// whether it was freshly generated, and the channel of `StreamEvent`s
/// the HTTP layer forwards to the client.
pub fn run_turn(state: AppState, input: ChatInput) -> (String, bool, mpsc::Receiver<StreamEvent>) {
    let (session_id, generated) = chat_sessions::resolve_session(input.session_id.as_deref());
    let conversation_key = session_id.clone();
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        let _permit = state.conversation_locks.acquire(&conversation_key).await;
        let cancel = state.cancel_tokens.register(&session_id);
        handle_turn(
            &state,
            &session_id,
            &conversation_key,
            &input.query,
            input.knowledge_base.as_deref(),
            tx,
            &cancel,
        )
        .await;
        state.cancel_tokens.remove(&session_id);
    });

    (session_id, generated, rx)
}

async fn handle_turn(
    state: &AppState,
    session_id: &str,
    conversation_key: &str,
    query: &str,
    knowledge_base_hint: Option<&str>,
    tx: mpsc::Sender<StreamEvent>,
    cancel: &CancelToken,
) {
    let corr_id = correlation_id(session_id, conversation_key);
    let start = Instant::now();

    if let Some(awaiting) = state.disambiguation.active(conversation_key).await {
        match chat_disambiguation::resolve(query, &awaiting.options) {
            ResolveOutcome::Resolved(index) => {
                let answer = match awaiting.options.iter().find(|o| o.index == index) {
                    Some(option) => match &option.answer_text {
                        Some(text) => RenderedAnswer::authoritative(text.clone(), "disambiguation"),
                        None => match state.fee.resume(&awaiting.context, &option.canonical_id).await {
                            Ok(answer) => answer,
                            Err(e) => collaborator_error_answer("fee", &e),
                        },
                    },
                    None => RenderedAnswer::authoritative(render::FEE_NOT_FOUND.to_owned(), "disambiguation"),
                };
                state.disambiguation.clear(conversation_key).await;
                TraceEvent::DisambiguationResolved {
                    correlation_id: corr_id.clone(),
                    conversation_key: conversation_key.to_owned(),
                    option_index: index,
                }
                .emit();
                finish_authoritative(state, session_id, query, answer, tx, start, &corr_id).await;
            }
            ResolveOutcome::Ambiguous => {
                TraceEvent::DisambiguationReprompted {
                    correlation_id: corr_id.clone(),
                    conversation_key: conversation_key.to_owned(),
                }
                .emit();
                let answer = RenderedAnswer::authoritative(render::disambiguation_prompt(&awaiting.options), "disambiguation");
                finish_authoritative(state, session_id, query, answer, tx, start, &corr_id).await;
            }
        }
        return;
    }

    let classification = chat_classifier::classify(query);
    TraceEvent::ClassificationDone {
        correlation_id: corr_id.clone(),
        tags: classification.tag_names(),
        search_term: classification.search_term.clone(),
    }
    .emit();

    // Dispatch precedence for authoritative intents (spec §4.8): this
    // order is fee_query -> location_query -> directory_lookup, which
    // differs from the classifier's own tag-resolution precedence.
    if classification.fee_query {
        handle_fee(state, session_id, query, tx, start, &corr_id).await;
        return;
    }
    if classification.location_query {
        handle_location(state, session_id, query, tx, start, &corr_id).await;
        return;
    }
    if classification.directory_lookup {
        let term = classification.search_term.as_deref().unwrap_or(query);
        handle_directory(state, session_id, query, term, tx, start, &corr_id).await;
        return;
    }

    if classification.small_talk {
        handle_generative(state, session_id, query, None, false, String::new(), tx, start, &corr_id, cancel).await;
        return;
    }

    let knowledge_base = classification
        .knowledge_base_tag()
        .map(str::to_owned)
        .or_else(|| knowledge_base_hint.map(str::to_owned))
        .unwrap_or_else(|| state.config.retrieval.default_kb.clone());
    handle_retrieval(state, session_id, query, &knowledge_base, tx, start, &corr_id, cancel).await;
}

async fn handle_fee(
    state: &AppState,
    session_id: &str,
    query: &str,
    tx: mpsc::Sender<StreamEvent>,
    start: Instant,
    corr_id: &str,
) {
    let charge_type = fee_extract::extract(query).map(|q| q.charge_type).unwrap_or_else(|_| "n/a".to_owned());
    let call_start = Instant::now();
    let outcome = state.fee.handle(query).await;
    TraceEvent::FeeCall {
        correlation_id: corr_id.to_owned(),
        charge_type,
        status: match &outcome {
            Ok(FeeOutcome::Answer(_)) => "answered",
            Ok(FeeOutcome::Disambiguation(_)) => "disambiguation",
            Err(_) => "error",
        }
        .to_owned(),
        duration_ms: call_start.elapsed().as_millis() as u64,
    }
    .emit();

    match outcome {
        Ok(FeeOutcome::Answer(answer)) => finish_authoritative(state, session_id, query, answer, tx, start, corr_id).await,
        Ok(FeeOutcome::Disambiguation(disambiguation_state)) => {
            let prompt = render::disambiguation_prompt(&disambiguation_state.options);
            state.disambiguation.set(session_id, disambiguation_state).await;
            let answer = RenderedAnswer::authoritative(prompt, "disambiguation");
            finish_authoritative(state, session_id, query, answer, tx, start, corr_id).await;
        }
        Err(e) => {
            let answer = collaborator_error_answer("fee", &e);
            finish_authoritative(state, session_id, query, answer, tx, start, corr_id).await;
        }
    }
}

async fn handle_location(
    state: &AppState,
    session_id: &str,
    query: &str,
    tx: mpsc::Sender<StreamEvent>,
    start: Instant,
    corr_id: &str,
) {
    let location_type = location_extract::extract(query)
        .location_type
        .map(|t| t.as_str().to_owned())
        .unwrap_or_else(|| "location".to_owned());
    let call_start = Instant::now();
    let result = state.location.handle(query).await;
    TraceEvent::LocationCall {
        correlation_id: corr_id.to_owned(),
        location_type,
        duration_ms: call_start.elapsed().as_millis() as u64,
    }
    .emit();

    let answer = match result {
        Ok(answer) => answer,
        Err(e) => collaborator_error_answer("location", &e),
    };
    finish_authoritative(state, session_id, query, answer, tx, start, corr_id).await;
}

async fn handle_directory(
    state: &AppState,
    session_id: &str,
    query: &str,
    term: &str,
    tx: mpsc::Sender<StreamEvent>,
    start: Instant,
    corr_id: &str,
) {
    let answer = match state.directory.search(term).await {
        Ok(rows) => {
            TraceEvent::DirectoryLookup {
                correlation_id: corr_id.to_owned(),
                search_term: term.to_owned(),
                hits: rows.len(),
            }
            .emit();
            if rows.is_empty() {
                RenderedAnswer::authoritative(render::DIRECTORY_NOT_FOUND.to_owned(), "directory")
            } else {
                RenderedAnswer::authoritative(render::directory_listing(&rows), "directory")
            }
        }
        Err(e) => collaborator_error_answer("directory", &e),
    };
    finish_authoritative(state, session_id, query, answer, tx, start, corr_id).await;
}

async fn handle_retrieval(
    state: &AppState,
    session_id: &str,
    query: &str,
    knowledge_base: &str,
    tx: mpsc::Sender<StreamEvent>,
    start: Instant,
    corr_id: &str,
    cancel: &CancelToken,
) {
    let call_start = Instant::now();
    match state.retrieval.retrieve(query, knowledge_base).await {
        Ok(result) => {
            TraceEvent::RetrievalCall {
                correlation_id: corr_id.to_owned(),
                knowledge_base: knowledge_base.to_owned(),
                cache_hit: result.cache_hit,
                duration_ms: call_start.elapsed().as_millis() as u64,
            }
            .emit();
            let references = result.references.clone();
            handle_generative(
                state,
                session_id,
                query,
                Some((knowledge_base.to_owned(), result.context)),
                false,
                if references.is_empty() { String::new() } else { render::sources_block(&references) },
                tx,
                start,
                corr_id,
                cancel,
            )
            .await;
        }
        Err(e) => {
            tracing::warn!(correlation_id = %corr_id, error = %e, "retrieval failed, falling back to an empty context");
            TraceEvent::TurnDegraded {
                correlation_id: corr_id.to_owned(),
                reason: "retrieval service unavailable, answered from general knowledge".to_owned(),
            }
            .emit();
            handle_generative(state, session_id, query, None, true, String::new(), tx, start, corr_id, cancel).await;
        }
    }
}

/// Runs the Generative Client and streams its output. `retrieved` is
/// `Some((knowledge_base, context))` on the retrieval-grounded path and
/// `None` for small talk or a degraded-retrieval fallback. `degraded`
/// prepends a notice so the user knows the answer isn't grounded;
/// `trailer` is appended verbatim after the model's own `Done` — used
/// for the `__SOURCES__` sentinel.
async fn handle_generative(
    state: &AppState,
    session_id: &str,
    query: &str,
    retrieved: Option<(String, String)>,
    degraded: bool,
    trailer: String,
    tx: mpsc::Sender<StreamEvent>,
    start: Instant,
    corr_id: &str,
    cancel: &CancelToken,
) {
    let (history, _degraded) = state
        .sessions
        .recent(session_id, state.config.orchestrator.max_history_turns)
        .await;
    let history = history.unwrap_or_default();
    let transcript = state.composer.transcript_window(&history).to_vec();

    let (context_block, _report) = match &retrieved {
        Some((kb, ctx)) => state.composer.retrieval_context_block(kb, ctx),
        None => state.composer.empty_context_block(),
    };

    let mut assistant_text = String::new();
    if degraded {
        assistant_text.push_str(render::RETRIEVAL_DEGRADED_NOTICE);
        let _ = tx
            .send(StreamEvent::Token {
                text: render::RETRIEVAL_DEGRADED_NOTICE.to_owned(),
            })
            .await;
    }

    TraceEvent::GenerativeStreamStarted {
        correlation_id: corr_id.to_owned(),
        model: state.config.generative.model.clone(),
    }
    .emit();

    let mut stream = match state
        .generative
        .stream(&state.system_prompt, &transcript, &context_block, query)
        .await
    {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(correlation_id = %corr_id, error = %e, "generative request failed");
            let answer = RenderedAnswer {
                text: render::GENERATIVE_APOLOGY.to_owned(),
                source_tag: "generative".to_owned(),
                is_authoritative: false,
                suppress_generation: false,
            };
            finish_authoritative(state, session_id, query, answer, tx, start, corr_id).await;
            return;
        }
    };

    let mut had_error = false;
    let mut cancelled = false;
    while let Some(event) = stream.next().await {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        match event {
            Ok(StreamEvent::Token { text }) => {
                assistant_text.push_str(&text);
                if tx.send(StreamEvent::Token { text }).await.is_err() {
                    break;
                }
            }
            Ok(StreamEvent::Done { finish_reason }) => {
                let _ = tx.send(StreamEvent::Done { finish_reason }).await;
                break;
            }
            Ok(StreamEvent::Error { message }) | Err(Error::Generative(message)) => {
                tracing::warn!(correlation_id = %corr_id, error = %message, "generative stream errored mid-flight");
                had_error = true;
                break;
            }
            Err(e) => {
                tracing::warn!(correlation_id = %corr_id, error = %e, "generative stream errored mid-flight");
                had_error = true;
                break;
            }
        }
    }

    if cancelled {
        TraceEvent::TurnCancelled {
            correlation_id: corr_id.to_owned(),
            session_id: session_id.to_owned(),
        }
        .emit();
    } else if had_error {
        assistant_text.push_str(render::GENERATIVE_APOLOGY);
        let _ = tx
            .send(StreamEvent::Token {
                text: render::GENERATIVE_APOLOGY.to_owned(),
            })
            .await;
        let _ = tx.send(StreamEvent::Done { finish_reason: Some("error".into()) }).await;
    } else if !trailer.is_empty() {
        let _ = tx.send(StreamEvent::Token { text: trailer.clone() }).await;
        assistant_text.push_str(&trailer);
    }

    // A cancelled turn still persists whatever partial answer was produced
    // before the client disconnected, same as a completed one.
    persist_turns(state, session_id, query, &assistant_text, corr_id).await;
    TraceEvent::TurnCompleted {
        correlation_id: corr_id.to_owned(),
        session_id: session_id.to_owned(),
        authoritative: false,
        duration_ms: start.elapsed().as_millis() as u64,
    }
    .emit();
}

async fn finish_authoritative(
    state: &AppState,
    session_id: &str,
    query: &str,
    answer: RenderedAnswer,
    tx: mpsc::Sender<StreamEvent>,
    start: Instant,
    corr_id: &str,
) {
    let _ = tx
        .send(StreamEvent::Token {
            text: answer.text.clone(),
        })
        .await;
    let _ = tx.send(StreamEvent::Done { finish_reason: Some("stop".into()) }).await;

    persist_turns(state, session_id, query, &answer.text, corr_id).await;
    TraceEvent::TurnCompleted {
        correlation_id: corr_id.to_owned(),
        session_id: session_id.to_owned(),
        authoritative: answer.is_authoritative,
        duration_ms: start.elapsed().as_millis() as u64,
    }
    .emit();
}

async fn persist_turns(state: &AppState, session_id: &str, user_text: &str, assistant_text: &str, corr_id: &str) {
    if assistant_text.is_empty() && user_text.is_empty() {
        return;
    }
    let now = Utc::now();
    let (_, degraded_user) = state
        .sessions
        .append(
            session_id,
            TurnRecord {
                session_id: session_id.to_owned(),
                role: TurnRole::User,
                content: user_text.to_owned(),
                created_at: now,
            },
        )
        .await;
    let (_, degraded_assistant) = state
        .sessions
        .append(
            session_id,
            TurnRecord {
                session_id: session_id.to_owned(),
                role: TurnRole::Assistant,
                content: assistant_text.to_owned(),
                created_at: Utc::now(),
            },
        )
        .await;

    if degraded_user || degraded_assistant {
        TraceEvent::TurnDegraded {
            correlation_id: corr_id.to_owned(),
            reason: "session memory store degraded, used the in-memory fallback".to_owned(),
        }
        .emit();
    }
}

fn collaborator_error_answer(source: &str, e: &Error) -> RenderedAnswer {
    let text = match e {
        Error::AuthoritativeNotFound(_) if source == "fee" => render::FEE_NOT_FOUND.to_owned(),
        Error::AuthoritativeNotFound(_) if source == "directory" => render::DIRECTORY_NOT_FOUND.to_owned(),
        Error::AuthoritativeNotFound(_) => format!("I couldn't find a matching {source} record."),
        _ => render::authoritative_unreachable(source),
    };
    RenderedAnswer::authoritative(text, source)
}
