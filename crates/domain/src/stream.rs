use serde::Serialize;
use std::pin::Pin;

/// A boxed async stream, used for generative client streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// Events emitted while streaming a generative reply.
///
/// The generative client never returns a final aggregated result
/// separately — the orchestrator aggregates `Token` chunks itself for
/// memory persistence.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// A UTF-8 text chunk.
    #[serde(rename = "token")]
    Token { text: String },

    /// Stream is finished.
    #[serde(rename = "done")]
    Done { finish_reason: Option<String> },

    /// A distinct marker surfaced on mid-stream service error. The
    /// orchestrator stops the stream, persists whatever partial text was
    /// produced, and emits a user-visible apology.
    #[serde(rename = "error")]
    Error { message: String },
}
