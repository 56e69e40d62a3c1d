//! Disambiguation State Machine (spec §4.7): holds `AWAITING_SELECTION`
//! state per conversation key and resolves the next utterance against it.

use std::sync::Arc;

use chat_domain::{DisambiguationOption, DisambiguationState};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::local::LocalFallbackStore;
use crate::store::DisambiguationStore;
use crate::vocab::STOPWORDS;

/// Outcome of resolving an utterance against a pending
/// `AWAITING_SELECTION` state.
pub enum ResolveOutcome {
    Resolved(usize),
    Ambiguous,
}

/// Combines the durable network store with the in-process fallback so a
/// store outage never loses the immediate next turn. Reads and writes
/// always go to the local fallback; the primary is attempted first and
/// its failure is logged and otherwise swallowed (spec §7
/// `DisambiguationStoreError`).
pub struct DisambiguationMachine {
    primary: Option<Arc<dyn DisambiguationStore>>,
    local: Arc<LocalFallbackStore>,
    ttl_seconds: u64,
}

impl DisambiguationMachine {
    pub fn new(primary: Option<Arc<dyn DisambiguationStore>>, ttl_seconds: u64) -> Self {
        Self {
            primary,
            local: Arc::new(LocalFallbackStore::new()),
            ttl_seconds,
        }
    }

    /// The active `AWAITING_SELECTION` state for this conversation key,
    /// or `None` if idle or expired.
    ///
    /// Both the primary store and the local fallback are consulted —
    /// not just the local one when `primary.get()` itself errors. A
    /// state written to `local` can exist without ever having landed in
    /// `primary` (the write to `primary` may have failed while the
    /// write to `local` succeeded, see `set`), in which case `primary`
    /// answers `Ok(None)` even though a pending selection is genuinely
    /// outstanding. Picking whichever side has the newer `created_at`
    /// (a fresh state always overwrites any prior one, so "newer wins"
    /// is the same rule `set` itself follows) keeps that state visible
    /// until it is consumed or expires, satisfying spec §7 item 7: "the
    /// in-process fallback answers the immediate next turn."
    pub async fn active(&self, conversation_key: &str) -> Option<DisambiguationState> {
        let local_state = self.local.get(conversation_key).await.unwrap_or(None);

        let primary_state = match &self.primary {
            Some(primary) => match primary.get(conversation_key).await {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(conversation_key, error = %e, "disambiguation store read failed, using local fallback");
                    None
                }
            },
            None => None,
        };

        match (primary_state, local_state) {
            (Some(p), Some(l)) => Some(if l.created_at > p.created_at { l } else { p }),
            (Some(p), None) => Some(p),
            (None, Some(l)) => Some(l),
            (None, None) => None,
        }
    }

    /// Enter `AWAITING_SELECTION`, overwriting any prior state for this
    /// conversation key.
    pub async fn set(&self, conversation_key: &str, state: DisambiguationState) {
        if let Some(primary) = &self.primary {
            if let Err(e) = primary
                .put(conversation_key, state.clone(), self.ttl_seconds)
                .await
            {
                tracing::warn!(conversation_key, error = %e, "disambiguation store write failed, relying on local fallback");
            }
        }
        let _ = self.local.put(conversation_key, state, self.ttl_seconds).await;
    }

    /// Return to `IDLE`.
    pub async fn clear(&self, conversation_key: &str) {
        if let Some(primary) = &self.primary {
            let _ = primary.delete(conversation_key).await;
        }
        let _ = self.local.delete(conversation_key).await;
    }

    /// Forwards to the local fallback's periodic expiry sweep, for a
    /// background maintenance task to call on an interval.
    pub fn sweep_local_expired(&self) -> usize {
        self.local.sweep_expired()
    }
}

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Resolution algorithm (spec §4.7):
///
/// 1. A bare number `n` with `1 <= n <= options.len()` selects option `n`.
/// 2. Otherwise, tokenize; drop tokens shorter than 3 chars or in the
///    stopword list; score each option by how many remaining tokens are
///    a substring of any of its `match_keys`. A unique strict-maximum
///    scorer wins; otherwise the resolution is ambiguous.
pub fn resolve(utterance: &str, options: &[DisambiguationOption]) -> ResolveOutcome {
    if let Some(m) = DECIMAL_RE.find(utterance) {
        if let Ok(n) = m.as_str().parse::<usize>() {
            if n >= 1 && n <= options.len() {
                return ResolveOutcome::Resolved(n);
            }
        }
    }

    let tokens: Vec<String> = utterance
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
        .map(str::to_owned)
        .collect();

    if tokens.is_empty() {
        return ResolveOutcome::Ambiguous;
    }

    let scores: Vec<usize> = options
        .iter()
        .map(|opt| {
            tokens
                .iter()
                .filter(|t| opt.match_keys.iter().any(|k| k.contains(t.as_str())))
                .count()
        })
        .collect();

    let max_score = *scores.iter().max().unwrap_or(&0);
    if max_score == 0 {
        return ResolveOutcome::Ambiguous;
    }
    let winners: Vec<usize> = scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s == max_score)
        .map(|(i, _)| i)
        .collect();

    if winners.len() == 1 {
        ResolveOutcome::Resolved(options[winners[0]].index)
    } else {
        ResolveOutcome::Ambiguous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_domain::DisambiguationKind;
    use std::collections::BTreeSet;

    /// A primary store whose `put` always fails and whose `get` always
    /// answers `Ok(None)` — simulating an outage that the write-side
    /// already logged and swallowed, never a `get`-side error.
    struct WriteFailingStore;

    #[async_trait::async_trait]
    impl DisambiguationStore for WriteFailingStore {
        async fn get(&self, _conversation_key: &str) -> chat_domain::Result<Option<DisambiguationState>> {
            Ok(None)
        }
        async fn put(&self, _conversation_key: &str, _state: DisambiguationState, _ttl_seconds: u64) -> chat_domain::Result<()> {
            Err(chat_domain::Error::DisambiguationStore("write failed".to_owned()))
        }
        async fn delete(&self, _conversation_key: &str) -> chat_domain::Result<()> {
            Ok(())
        }
    }

    fn sample_state() -> DisambiguationState {
        let mut match_keys = BTreeSet::new();
        match_keys.insert("gold".to_owned());
        DisambiguationState {
            kind: DisambiguationKind::CardProduct,
            options: vec![DisambiguationOption {
                index: 1,
                display_name: "Gold".into(),
                canonical_id: "gold".into(),
                match_keys,
                answer_text: None,
            }],
            context: serde_json::Value::Null,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn local_fallback_answers_when_primarys_write_failed() {
        let machine = DisambiguationMachine::new(Some(Arc::new(WriteFailingStore)), 600);
        machine.set("conv-1", sample_state()).await;

        // `primary.get()` succeeds and returns `Ok(None)` (its write
        // never landed), but the state written to `local` must still
        // be visible on the very next turn.
        let active = machine.active("conv-1").await;
        assert!(active.is_some());
        assert_eq!(active.unwrap().options[0].canonical_id, "gold");
    }

    fn option(index: usize, name: &str, keys: &[&str]) -> DisambiguationOption {
        DisambiguationOption {
            index,
            display_name: name.into(),
            canonical_id: name.to_lowercase(),
            match_keys: keys.iter().map(|k| k.to_string()).collect::<BTreeSet<_>>(),
            answer_text: None,
        }
    }

    fn options() -> Vec<DisambiguationOption> {
        vec![
            option(1, "Classic", &["classic"]),
            option(2, "Gold", &["gold"]),
            option(3, "Platinum", &["platinum"]),
        ]
    }

    #[test]
    fn numeric_selection_takes_precedence() {
        match resolve("2", &options()) {
            ResolveOutcome::Resolved(n) => assert_eq!(n, 2),
            ResolveOutcome::Ambiguous => panic!("expected resolved"),
        }
    }

    #[test]
    fn numeric_out_of_range_falls_through_to_token_match() {
        match resolve("99 gold please", &options()) {
            ResolveOutcome::Resolved(n) => assert_eq!(n, 2),
            ResolveOutcome::Ambiguous => panic!("expected resolved"),
        }
    }

    #[test]
    fn token_match_selects_unique_winner() {
        match resolve("the platinum one", &options()) {
            ResolveOutcome::Resolved(n) => assert_eq!(n, 3),
            ResolveOutcome::Ambiguous => panic!("expected resolved"),
        }
    }

    #[test]
    fn stopword_only_utterance_is_ambiguous() {
        match resolve("per", &options()) {
            ResolveOutcome::Ambiguous => {}
            ResolveOutcome::Resolved(_) => panic!("expected ambiguous"),
        }
    }

    #[test]
    fn no_matching_tokens_is_ambiguous() {
        match resolve("what about the blue one", &options()) {
            ResolveOutcome::Ambiguous => {}
            ResolveOutcome::Resolved(_) => panic!("expected ambiguous"),
        }
    }
}
