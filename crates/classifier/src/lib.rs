//! Pure, total query classification: `classify(text) -> Classification`.
//!
//! Deterministic and case-insensitive over Unicode-lowercased tokens.
//! Never fails — an utterance that matches nothing comes back tagged
//! `generic`.

use chat_domain::types::Classification;
use once_cell::sync::Lazy;
use regex::Regex;

mod vocab;
use vocab::*;

/// Classify a non-empty utterance into its routing tags plus, for
/// directory-shaped queries, a normalized search term.
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();
    let tokens = tokenize(&lower);

    let mut c = Classification::default();

    let has_authoritative_vocab = contains_any(&lower, DIRECTORY_CUES)
        || contains_any(&lower, FEE_VOCAB)
        || contains_any(&lower, LOCATION_VOCAB);

    c.small_talk = is_small_talk(&lower) && !has_authoritative_vocab;

    c.directory_lookup = contains_any(&lower, DIRECTORY_CUES) || is_who_is_role_form(&lower);
    c.fee_query = contains_any(&lower, FEE_VOCAB);
    c.location_query = contains_any(&lower, LOCATION_VOCAB) || is_location_count_form(&lower);

    // Knowledge-base selectors are disjoint; only the first in
    // declaration order is carried forward.
    if contains_any(&lower, MANAGEMENT_VOCAB) {
        c.management = true;
    } else if contains_any(&lower, POLICY_VOCAB) {
        c.policy = true;
    } else if contains_any(&lower, FINANCIAL_REPORT_VOCAB) {
        c.financial_report = true;
    } else if contains_any(&lower, MILESTONE_VOCAB) {
        c.milestone = true;
    } else if contains_any(&lower, USER_DOCUMENT_VOCAB) {
        c.user_document = true;
    }

    // Tie-break (classification-time precedence, §4.1): directory_lookup
    // dominates a KB tag; fee_query dominates a KB tag.
    if c.directory_lookup || c.fee_query {
        c.management = false;
        c.policy = false;
        c.financial_report = false;
        c.milestone = false;
        c.user_document = false;
    }

    c.generic = !c.small_talk
        && !c.directory_lookup
        && !c.fee_query
        && !c.location_query
        && !c.management
        && !c.policy
        && !c.financial_report
        && !c.milestone
        && !c.user_document;

    if c.small_talk && c.is_authoritative() {
        // Invariant: small_talk and any authoritative tag are mutually
        // exclusive after resolution.
        c.small_talk = false;
    }

    if c.directory_lookup {
        c.search_term = extract_search_term(&lower);
        if c.search_term.is_none() {
            c.directory_lookup = false;
            c.generic = !c.small_talk && !c.fee_query && !c.location_query;
        }
    }

    let _ = tokens;
    c
}

fn tokenize(lower: &str) -> Vec<String> {
    lower
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_any(lower: &str, vocab: &[&str]) -> bool {
    vocab.iter().any(|term| lower.contains(term))
}

static GREETING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(hi|hello|hey|good (morning|afternoon|evening)|thanks|thank you|how are you|what's up)\b").unwrap()
});

fn is_small_talk(lower: &str) -> bool {
    GREETING_RE.is_match(lower)
}

static WHO_IS_ROLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*who\s+is\b.*\b(head|manager|director|chief|ceo|cfo|coo|chairman|lead)\b").unwrap()
});

fn is_who_is_role_form(lower: &str) -> bool {
    WHO_IS_ROLE_RE.is_match(lower)
        && (contains_any(lower, DIVISION_DEPARTMENT_NOUNS) || contains_any(lower, &["division of", "department of"]))
}

static LOCATION_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(how many|count|where|address( of| is)?)\b").unwrap()
});

fn is_location_count_form(lower: &str) -> bool {
    LOCATION_COUNT_RE.is_match(lower) && contains_any(lower, LOCATION_VOCAB)
}

/// Lowercase; strip leading interrogatives, courtesy words, directory
/// cues, and trailing organization suffixes ("of <bank>", "at <bank>").
/// If the residual contains a division/department noun without a role
/// noun, append a synthetic "head" token. Returns `None` when the
/// residual is empty (directory strategy is then disabled).
fn extract_search_term(lower: &str) -> Option<String> {
    let mut s = lower.to_string();

    static LEADING_INTERROGATIVE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^\s*(who|what|where|when|why|how)\s+(is|are|was|were)?\s*").unwrap());
    s = LEADING_INTERROGATIVE_RE.replace(&s, "").to_string();

    static COURTESY_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\b(please|kindly|could you|can you|tell me)\b").unwrap());
    s = COURTESY_RE.replace_all(&s, " ").to_string();

    for cue in DIRECTORY_CUES {
        s = s.replace(cue, " ");
    }

    // Structural organizational-unit connector words are dropped; the
    // role noun (if present) and the unit's proper name carry the
    // meaning, e.g. "X Division head" -> "X head".
    for noun in DIVISION_DEPARTMENT_NOUNS {
        s = s.replace(noun, " ");
    }

    static TRAILING_ORG_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\s+(of|at)\s+(the\s+)?(bank|ebl)\b.*$").unwrap());
    s = TRAILING_ORG_RE.replace(&s, "").to_string();

    s = s
        .chars()
        .map(|c| if c == '?' || c == '.' || c == ',' { ' ' } else { c })
        .collect();
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let collapsed = collapsed.trim();

    if collapsed.is_empty() {
        return None;
    }

    let has_role_noun = contains_any(collapsed, ROLE_NOUNS);
    let needs_synthetic_head =
        contains_any(lower, DIVISION_DEPARTMENT_NOUNS) && !has_role_noun;

    let out = if needs_synthetic_head {
        format!("{collapsed} head")
    } else {
        collapsed.to_string()
    };

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_talk_is_exclusive_of_authoritative() {
        let c = classify("hello, what's my phone number");
        assert!(!c.small_talk);
        assert!(c.directory_lookup);
    }

    #[test]
    fn bare_greeting_is_small_talk() {
        let c = classify("hello there");
        assert!(c.small_talk);
        assert!(!c.is_authoritative());
    }

    #[test]
    fn directory_cue_phone() {
        let c = classify("what is the phone number of zahid");
        assert!(c.directory_lookup);
        assert_eq!(c.search_term.as_deref(), Some("zahid"));
    }

    #[test]
    fn directory_unknown_name_still_classifies() {
        let c = classify("phone number of unknown-name");
        assert!(c.directory_lookup);
        assert!(c.search_term.is_some());
    }

    #[test]
    fn division_head_rewrite() {
        let c = classify("Who is Retail & SME Banking Division head of EBL?");
        assert!(c.directory_lookup);
        assert_eq!(c.search_term.as_deref(), Some("retail & sme banking head"));
    }

    #[test]
    fn fee_query_detects_supplementary_card() {
        let c = classify("what is the annual fee for a supplementary card");
        assert!(c.fee_query);
    }

    #[test]
    fn location_count_form() {
        let c = classify("how many priority centers does the bank have");
        assert!(c.location_query);
    }

    #[test]
    fn directory_dominates_over_kb_tag() {
        let c = classify("phone number of the policy document owner");
        assert!(c.directory_lookup);
        assert!(!c.policy);
    }

    #[test]
    fn fee_dominates_over_kb_tag() {
        let c = classify("late payment fee policy document");
        assert!(c.fee_query);
        assert!(!c.policy);
    }

    #[test]
    fn generic_when_nothing_matches() {
        let c = classify("tell me something interesting about banking trends");
        assert!(c.generic);
        assert!(!c.is_authoritative());
    }

    #[test]
    fn classify_is_idempotent_on_same_input() {
        let a = classify("phone number of zahid");
        let b = classify("phone number of zahid");
        assert_eq!(a, b);
    }
}
