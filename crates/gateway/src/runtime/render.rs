//! Scripted, non-authoritative text the orchestrator stitches in around
//! collaborator answers — disambiguation prompts, apologies, and the
//! directory listing format. Grounded on the rendering style used by
//! `chat_collaborators::location::render` (a plain function building a
//! `Vec<String>` of lines and joining with `\n`).

use chat_domain::{DisambiguationOption, Employee};

pub fn directory_listing(rows: &[Employee]) -> String {
    let mut lines = Vec::with_capacity(rows.len() * 5);
    for row in rows {
        lines.push(format!("- Name: {}", row.full_name));
        lines.push(format!("  Designation: {}", row.designation));
        lines.push(format!("  Email: {}", row.email));
        lines.push(format!("  Mobile: {}", row.mobile));
        lines.push(format!("  IP Phone: {}", row.ip_phone));
    }
    lines.join("\n")
}

pub const DIRECTORY_NOT_FOUND: &str = "I couldn't find anyone matching that in the staff directory.";

pub fn authoritative_unreachable(source: &str) -> String {
    format!("I'm sorry, I'm having trouble reaching our {source} service right now. Please try again in a moment.")
}

pub const FEE_NOT_FOUND: &str = "I couldn't find a fee rule that matches your question. Could you rephrase it?";

pub const GENERATIVE_APOLOGY: &str =
    "I'm sorry, something went wrong while generating a response. Please try again.";

pub const RETRIEVAL_DEGRADED_NOTICE: &str =
    "Our knowledge sources are temporarily unavailable right now, so here's my best general answer:\n\n";

/// Builds the "please choose one of ..." reprompt shown both when a
/// disambiguation is first raised and when a follow-up utterance fails
/// to resolve it.
pub fn disambiguation_prompt(options: &[DisambiguationOption]) -> String {
    let mut lines = vec!["Could you clarify which one you mean?".to_owned()];
    for opt in options {
        lines.push(format!("{}. {}", opt.index, opt.display_name));
    }
    lines.join("\n")
}

pub const SOURCES_SENTINEL: &str = "__SOURCES__";

pub fn sources_block(references: &[String]) -> String {
    let payload = serde_json::json!({ "sources": references });
    format!("{SOURCES_SENTINEL}{payload}{SOURCES_SENTINEL}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn directory_listing_includes_all_fields() {
        let row = Employee {
            employee_id: "E1".into(),
            full_name: "Jane Doe".into(),
            designation: "Manager".into(),
            department: "Retail".into(),
            division: "Consumer".into(),
            email: "jane@example.com".into(),
            mobile: "0170000000".into(),
            ip_phone: "1234".into(),
        };
        let text = directory_listing(&[row]);
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Manager"));
        assert!(text.contains("jane@example.com"));
        assert!(text.contains("0170000000"));
        assert!(text.contains("1234"));
    }

    #[test]
    fn disambiguation_prompt_lists_every_option() {
        let options = vec![
            DisambiguationOption {
                index: 1,
                display_name: "Classic".into(),
                canonical_id: "classic".into(),
                match_keys: BTreeSet::new(),
                answer_text: None,
            },
            DisambiguationOption {
                index: 2,
                display_name: "Gold".into(),
                canonical_id: "gold".into(),
                match_keys: BTreeSet::new(),
                answer_text: None,
            },
        ];
        let text = disambiguation_prompt(&options);
        assert!(text.contains("1. Classic"));
        assert!(text.contains("2. Gold"));
    }

    #[test]
    fn sources_block_is_wrapped_in_sentinels() {
        let text = sources_block(&["doc-1".to_owned()]);
        assert!(text.starts_with(SOURCES_SENTINEL));
        assert!(text.ends_with(SOURCES_SENTINEL));
        assert!(text.contains("doc-1"));
    }
}
