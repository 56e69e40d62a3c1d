use chat_domain::TurnRecord;

use crate::report::{ContextSource, PromptReport};
use crate::truncation;

/// Assembles the four inputs the Generative Client expects (spec
/// §4.8 "Prompt composition"): a windowed transcript and a capped,
/// source-tagged context block. The system prompt and user utterance
/// pass through unchanged — this type only trims what can grow
/// unboundedly across a long conversation or a large retrieval result.
pub struct PromptComposer {
    /// Per spec `orchestrator.max_history_turns`.
    pub max_history_turns: usize,
    /// Character cap applied to the retrieval context before it is
    /// wrapped with its source header.
    pub max_context_chars: usize,
}

impl PromptComposer {
    pub fn new(max_history_turns: usize, max_context_chars: usize) -> Self {
        Self {
            max_history_turns,
            max_context_chars,
        }
    }

    /// Returns the most recent `max_history_turns` records from
    /// `history`, oldest-first (the order the wire format expects;
    /// spec §4.6 describes the *selection* as "most-recent-first
    /// truncated to a bounded window", which this implements by
    /// windowing from the tail and then preserving chronological order
    /// for presentation).
    pub fn transcript_window<'a>(&self, history: &'a [TurnRecord]) -> &'a [TurnRecord] {
        let start = history.len().saturating_sub(self.max_history_turns);
        &history[start..]
    }

    /// Builds the empty context block for a small-talk turn.
    pub fn empty_context_block(&self) -> (String, PromptReport) {
        (
            String::new(),
            PromptReport {
                source: ContextSource::Empty,
                context_raw_chars: 0,
                context_injected_chars: 0,
                context_truncated: false,
                history_turns_total: 0,
                history_turns_included: 0,
            },
        )
    }

    /// Builds the retrieval-backed context block, capped to
    /// `max_context_chars` and headed with the knowledge base name so
    /// the model (and any downstream trace) can tell it apart from an
    /// empty block.
    pub fn retrieval_context_block(&self, knowledge_base: &str, context: &str) -> (String, PromptReport) {
        let raw_chars = context.len();
        if context.is_empty() {
            return self.empty_context_block();
        }

        let (body, truncated) = truncation::truncate_per_file(context, self.max_context_chars);
        let block = format!("=== RETRIEVED_CONTEXT (knowledge_base: {knowledge_base}) ===\n{body}\n=== END_RETRIEVED_CONTEXT ===");

        (
            block,
            PromptReport {
                source: ContextSource::Retrieval,
                context_raw_chars: raw_chars,
                context_injected_chars: body.len(),
                context_truncated: truncated,
                history_turns_total: 0,
                history_turns_included: 0,
            },
        )
    }

    /// Combines [`Self::transcript_window`] with a context block builder,
    /// producing the final report used for structured logging.
    pub fn compose<'a>(
        &self,
        history: &'a [TurnRecord],
        knowledge_base: Option<&str>,
        retrieved_context: Option<&str>,
    ) -> (&'a [TurnRecord], String, PromptReport) {
        let window = self.transcript_window(history);

        let (block, mut report) = match (knowledge_base, retrieved_context) {
            (Some(kb), Some(ctx)) => self.retrieval_context_block(kb, ctx),
            _ => self.empty_context_block(),
        };

        report.history_turns_total = history.len();
        report.history_turns_included = window.len();

        (window, block, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chat_domain::TurnRole;

    fn turn(content: &str) -> TurnRecord {
        TurnRecord {
            session_id: "s1".to_owned(),
            role: TurnRole::User,
            content: content.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn window_keeps_only_the_tail() {
        let composer = PromptComposer::new(2, 1000);
        let history = vec![turn("a"), turn("b"), turn("c")];
        let window = composer.transcript_window(&history);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "b");
        assert_eq!(window[1].content, "c");
    }

    #[test]
    fn window_is_a_no_op_when_history_is_short() {
        let composer = PromptComposer::new(10, 1000);
        let history = vec![turn("a")];
        assert_eq!(composer.transcript_window(&history).len(), 1);
    }

    #[test]
    fn empty_context_has_no_header() {
        let composer = PromptComposer::new(10, 1000);
        let (block, report) = composer.empty_context_block();
        assert!(block.is_empty());
        assert_eq!(report.source, ContextSource::Empty);
    }

    #[test]
    fn retrieval_context_is_headed_with_knowledge_base() {
        let composer = PromptComposer::new(10, 1000);
        let (block, report) = composer.retrieval_context_block("policy", "some facts");
        assert!(block.contains("policy"));
        assert!(block.contains("some facts"));
        assert_eq!(report.source, ContextSource::Retrieval);
        assert!(!report.context_truncated);
    }

    #[test]
    fn retrieval_context_is_capped() {
        let composer = PromptComposer::new(10, 4);
        let (block, report) = composer.retrieval_context_block("policy", "abcdefgh");
        assert!(report.context_truncated);
        assert!(block.contains("[TRUNCATED]"));
    }

    #[test]
    fn empty_retrieved_text_degrades_to_empty_block() {
        let composer = PromptComposer::new(10, 1000);
        let (block, report) = composer.retrieval_context_block("policy", "");
        assert!(block.is_empty());
        assert_eq!(report.source, ContextSource::Empty);
    }

    #[test]
    fn compose_fills_in_history_counts() {
        let composer = PromptComposer::new(1, 1000);
        let history = vec![turn("a"), turn("b")];
        let (window, block, report) = composer.compose(&history, Some("policy"), Some("ctx"));
        assert_eq!(window.len(), 1);
        assert!(block.contains("ctx"));
        assert_eq!(report.history_turns_total, 2);
        assert_eq!(report.history_turns_included, 1);
    }
}
