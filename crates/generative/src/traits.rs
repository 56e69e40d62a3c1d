//! The Generative Client's narrow contract (spec §4.6): given a system
//! prompt, the prior transcript, a context block, and the current
//! utterance, produce a stream of text chunks. The client never
//! aggregates — the orchestrator does that for memory persistence.

use chat_domain::{BoxStream, Result, StreamEvent, TurnRecord};

#[async_trait::async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn stream(
        &self,
        system_prompt: &str,
        transcript: &[TurnRecord],
        context_block: &str,
        user_utterance: &str,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>>;
}
