//! Query extraction from a fee-intent utterance (spec §4.4).

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{CardCategory, FeeQuery};
use super::vocab::{
    CHARGE_TYPE_KEYWORDS, COMPOUND_PRODUCT_ALIASES, LOAN_PRODUCT_ALIASES, NETWORK_ALIASES,
    PRODUCT_ALIASES,
};

/// Extraction failed because network or category is ambiguous and the
/// client must not guess (spec §4.4).
#[derive(Debug, Clone)]
pub enum ExtractError {
    AmbiguousCategory(Vec<CardCategory>),
    AmbiguousNetwork(Vec<String>),
}

static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:,\d{3})*(?:\.\d+)?)").unwrap());
static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(BDT|USD|EUR|GBP)\b").unwrap());
static USAGE_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)(?:st|nd|rd|th)\s+(card|withdrawal|transaction)\b").unwrap());

pub fn extract(text: &str) -> Result<FeeQuery, ExtractError> {
    let lower = text.to_lowercase();

    let category = extract_category(&lower)?;
    let network = extract_network(&lower)?;
    let product = extract_product(&lower);
    let loan_product = extract_loan_product(&lower);
    let charge_type = extract_charge_type(&lower).unwrap_or_else(|| "PROCESSING_FEE".to_owned());

    let amount = AMOUNT_RE
        .find(&lower)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok());
    let currency = CURRENCY_RE.find(text).map(|m| m.as_str().to_uppercase());
    let usage_index = USAGE_INDEX_RE
        .captures(&lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    Ok(FeeQuery {
        charge_type,
        category,
        network,
        product,
        product_line: None,
        loan_product,
        amount,
        currency,
        usage_index,
    })
}

fn extract_loan_product(lower: &str) -> Option<String> {
    LOAN_PRODUCT_ALIASES
        .iter()
        .find(|(alias, _)| lower.contains(alias))
        .map(|(_, canonical)| (*canonical).to_owned())
}

/// Re-extracts a query with one dimension pinned to an already-resolved
/// value, used by [`super::FeeClient::resume`] once the user has picked
/// a disambiguation option for a network or category that was
/// ambiguous on the first pass. The other dimension is re-derived from
/// the original text as normal; it cannot itself be ambiguous, since
/// `extract` only ever raises one `ExtractError` at a time and this
/// path is only reached after that error was the network/category one.
pub fn extract_with_overrides(
    text: &str,
    network_override: Option<&str>,
    category_override: Option<CardCategory>,
) -> FeeQuery {
    let lower = text.to_lowercase();

    let category = category_override.or_else(|| extract_category(&lower).ok().flatten());
    let network = network_override
        .map(|n| n.to_owned())
        .or_else(|| extract_network(&lower).ok().flatten());
    let product = extract_product(&lower);
    let loan_product = extract_loan_product(&lower);
    let charge_type = extract_charge_type(&lower).unwrap_or_else(|| "PROCESSING_FEE".to_owned());

    let amount = AMOUNT_RE
        .find(&lower)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok());
    let currency = CURRENCY_RE.find(text).map(|m| m.as_str().to_uppercase());
    let usage_index = USAGE_INDEX_RE
        .captures(&lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    FeeQuery {
        charge_type,
        category,
        network,
        product,
        product_line: None,
        loan_product,
        amount,
        currency,
        usage_index,
    }
}

fn extract_category(lower: &str) -> Result<Option<CardCategory>, ExtractError> {
    let mut found = Vec::new();
    if lower.contains("credit card") || lower.contains("credit-card") {
        found.push(CardCategory::Credit);
    }
    if lower.contains("debit card") || lower.contains("debit-card") {
        found.push(CardCategory::Debit);
    }
    if lower.contains("prepaid card") || lower.contains("prepaid-card") {
        found.push(CardCategory::Prepaid);
    }
    found.dedup();
    match found.len() {
        0 => Ok(None),
        1 => Ok(Some(found[0])),
        _ => Err(ExtractError::AmbiguousCategory(found)),
    }
}

fn extract_network(lower: &str) -> Result<Option<String>, ExtractError> {
    let mut found: Vec<String> = Vec::new();
    for (alias, canonical) in NETWORK_ALIASES {
        if lower.contains(alias) && !found.iter().any(|c| c == canonical) {
            found.push((*canonical).to_owned());
        }
    }
    match found.len() {
        0 => Ok(None),
        1 => Ok(Some(found.remove(0))),
        _ => Err(ExtractError::AmbiguousNetwork(found)),
    }
}

/// Compound names ("UnionPay Classic") are checked before bare words
/// ("Classic") so a compound match is preferred (spec §4.4).
fn extract_product(lower: &str) -> Option<String> {
    for (alias, canonical) in COMPOUND_PRODUCT_ALIASES {
        if lower.contains(alias) {
            return Some((*canonical).to_owned());
        }
    }
    for alias in PRODUCT_ALIASES {
        if lower.contains(alias) {
            return Some(titlecase(alias));
        }
    }
    None
}

fn titlecase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn extract_charge_type(lower: &str) -> Option<String> {
    CHARGE_TYPE_KEYWORDS
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, ct)| (*ct).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visa_platinum_supplementary_is_unambiguous() {
        let q = extract("VISA Platinum supplementary card annual fee").unwrap();
        assert_eq!(q.network.as_deref(), Some("VISA"));
        assert_eq!(q.product.as_deref(), Some("Platinum"));
        assert_eq!(q.charge_type, "SUPPLEMENTARY_ANNUAL");
    }

    #[test]
    fn compound_product_preferred_over_bare() {
        let q = extract("UnionPay Classic annual fee").unwrap();
        assert_eq!(q.network.as_deref(), Some("UnionPay International"));
        assert_eq!(q.product.as_deref(), Some("Classic"));
    }

    #[test]
    fn conflicting_networks_are_ambiguous() {
        let err = extract("is the Visa or Mastercard annual fee higher").unwrap_err();
        assert!(matches!(err, ExtractError::AmbiguousNetwork(_)));
    }

    #[test]
    fn missing_product_is_not_an_extraction_error() {
        let q = extract("visa supplementary card annual fee").unwrap();
        assert!(q.product.is_none());
    }

    #[test]
    fn currency_preserved_verbatim_case() {
        let q = extract("what is the BDT 500 processing fee").unwrap();
        assert_eq!(q.currency.as_deref(), Some("BDT"));
        assert_eq!(q.amount, Some(500.0));
    }

    #[test]
    fn loan_product_recognized() {
        let q = extract("what is the early settlement fee for a personal loan").unwrap();
        assert_eq!(q.loan_product.as_deref(), Some("Personal Loan"));
        assert_eq!(q.charge_type, "EARLY_SETTLEMENT_FEE");
    }

    #[test]
    fn override_pins_network_and_reuses_rest_of_utterance() {
        let q = extract_with_overrides("is the Visa or Mastercard annual fee higher", Some("Mastercard"), None);
        assert_eq!(q.network.as_deref(), Some("Mastercard"));
        assert_eq!(q.charge_type, "ISSUANCE_ANNUAL_PRIMARY");
    }
}
