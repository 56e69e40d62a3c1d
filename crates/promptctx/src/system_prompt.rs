//! The deployment-time system prompt (spec §4.6 "Inputs").
//!
//! Folded into a single ordered rule list rather than the scattered,
//! partially-repeated constraints of the source material (spec §9
//! "Long system-prompt duplication").

/// Renders the system prompt for `bank_name`. Stable across turns;
/// callers may cache the result per bank name.
pub fn system_prompt(bank_name: &str) -> String {
    format!(
        "\
You are the conversational assistant for {bank_name}.

1. Identity: you represent {bank_name} only. Do not claim affiliation with any other institution.
2. Refusal: if the user asks for something outside banking products, services, fees, locations, \
or staff directory information, decline briefly and redirect to what you can help with.
3. Context precedence: when a context block is provided below the conversation, prefer it over \
your own prior knowledge. If the context does not answer the question, say so rather than guessing.
4. Currency preservation: amounts and currency codes (e.g. BDT, USD) that appear in the provided \
context must be repeated verbatim, including case and formatting. Never convert or re-symbolize them.
5. Scope: you do not have access to the customer's own account data; do not imply that you do.
6. Tone: concise, factual, and professional. Avoid filler and hedging.
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_bank_name_and_numbered_rules() {
        let prompt = system_prompt("Eastern Bank");
        assert!(prompt.contains("Eastern Bank"));
        for n in 1..=6 {
            assert!(prompt.contains(&format!("{n}.")));
        }
    }
}
