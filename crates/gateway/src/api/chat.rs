//! Chat API endpoints (spec §6):
//!
//! - `POST /chat`      — raw streaming UTF-8 text body
//! - `POST /chat/sync` — aggregated, non-streaming JSON

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chat_domain::StreamEvent;
use serde::Deserialize;

use crate::runtime::{run_turn, ChatInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub knowledge_base: Option<String>,
}

const SESSION_ID_HEADER: &str = "x-session-id";

/// `POST /chat` — the stream is whatever text chunks the turn produces,
/// terminated by the connection's own EOF; a trailing `__SOURCES__...__SOURCES__`
/// block may appear at the end (see `runtime::render::sources_block`).
pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> impl IntoResponse {
    let input = ChatInput {
        query: body.query,
        session_id: body.session_id,
        knowledge_base: body.knowledge_base,
    };

    let (session_id, generated, rx) = run_turn(state, input);

    let stream = async_stream::stream! {
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Token { text } => yield Ok::<_, std::convert::Infallible>(text.into_bytes()),
                StreamEvent::Done { .. } => break,
                StreamEvent::Error { .. } => break,
            }
        }
    };

    let mut response = Response::new(Body::from_stream(stream));
    response
        .headers_mut()
        .insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    if generated {
        if let Ok(value) = HeaderValue::from_str(&session_id) {
            response.headers_mut().insert(HeaderName::from_static(SESSION_ID_HEADER), value);
        }
    }
    response
}

/// `POST /chat/sync` — drains the same orchestrator channel `chat` streams
/// from, aggregating every `Token` into one response string.
pub async fn chat_sync(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> impl IntoResponse {
    let input = ChatInput {
        query: body.query,
        session_id: body.session_id,
        knowledge_base: body.knowledge_base,
    };

    let (session_id, _generated, mut rx) = run_turn(state, input);

    let mut response_text = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Token { text } => response_text.push_str(&text),
            StreamEvent::Done { .. } | StreamEvent::Error { .. } => break,
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "response": response_text,
            "session_id": session_id,
        })),
    )
}
