//! Fee-domain types shared by extraction, rule selection, and rendering
//! (spec §4.4).

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardCategory {
    Credit,
    Debit,
    Prepaid,
}

impl CardCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            CardCategory::Credit => "CREDIT",
            CardCategory::Debit => "DEBIT",
            CardCategory::Prepaid => "PREPAID",
        }
    }

    /// Parses the canonical uppercase form back into a `CardCategory`,
    /// the inverse of `as_str`, used when resuming a disambiguation from
    /// a `DisambiguationOption::canonical_id`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREDIT" => Some(CardCategory::Credit),
            "DEBIT" => Some(CardCategory::Debit),
            "PREPAID" => Some(CardCategory::Prepaid),
            _ => None,
        }
    }
}

/// A fee query extracted from an utterance. `None` on `category` /
/// `network` / `product` means "ANY" — not an ambiguity, just an
/// unconstrained dimension the service is free to match broadly.
#[derive(Debug, Clone, Default)]
pub struct FeeQuery {
    pub charge_type: String,
    pub category: Option<CardCategory>,
    pub network: Option<String>,
    pub product: Option<String>,
    pub product_line: Option<String>,
    pub loan_product: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub usage_index: Option<u32>,
}

/// The five condition kinds a fee rule may carry (spec §4.4 "Condition
/// interpretation").
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum Condition {
    None { amount: f64 },
    #[serde(rename = "WHICHEVER_HIGHER")]
    WhicheverHigher { percent: f64, fixed_minimum: f64 },
    #[serde(rename = "FREE_UPTO_N")]
    FreeUpToN { free_entitlement_count: u32 },
    Tiered {
        tier_rate: f64,
        tier_local_max: f64,
        global_min: f64,
        global_max: f64,
    },
    #[serde(rename = "NOTE_BASED")]
    NoteBased { note_ref: String },
}

/// A candidate fee rule as returned by the fee service. Service field
/// names map 1:1; `product` may carry a `/`-separated disjunction
/// ("Platinum/Titanium").
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRule {
    pub rule_id: String,
    pub priority: i32,
    pub charge_type: String,
    #[serde(default)]
    pub category: Option<CardCategory>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub loan_product: Option<String>,
    pub condition: Condition,
    pub effective_from: DateTime<Utc>,
    #[serde(default)]
    pub effective_to: Option<DateTime<Utc>>,
    pub currency: String,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub fee_basis: Option<String>,
}

impl FeeRule {
    /// `true` when the rule's `network` field is ANY (absent or the
    /// literal "ANY").
    pub fn network_is_any(&self) -> bool {
        match &self.network {
            None => true,
            Some(n) => n.eq_ignore_ascii_case("any"),
        }
    }

    /// `true` when the rule's `product` field is concrete — neither
    /// NULL, empty, nor "ANY" (spec §4.4 "Specificity score").
    pub fn product_is_concrete(&self) -> bool {
        match &self.product {
            None => false,
            Some(p) => !p.is_empty() && !p.eq_ignore_ascii_case("any"),
        }
    }

    /// `true` when `candidate_product` matches this rule's `product`
    /// field, expanding a `/`-separated disjunction.
    pub fn product_matches(&self, candidate_product: &str) -> bool {
        match &self.product {
            None => true,
            Some(p) if p.is_empty() || p.eq_ignore_ascii_case("any") => true,
            Some(p) => p
                .split('/')
                .any(|variant| variant.trim().eq_ignore_ascii_case(candidate_product)),
        }
    }

    /// `true` when the rule's `loan_product` field is concrete — the
    /// retail-asset analogue of `product_is_concrete`.
    pub fn loan_product_is_concrete(&self) -> bool {
        match &self.loan_product {
            None => false,
            Some(p) => !p.is_empty() && !p.eq_ignore_ascii_case("any"),
        }
    }

    /// `true` when `candidate_loan_product` matches this rule's
    /// `loan_product` field — the retail-asset analogue of
    /// `product_matches`.
    pub fn loan_product_matches(&self, candidate_loan_product: &str) -> bool {
        match &self.loan_product {
            None => true,
            Some(p) if p.is_empty() || p.eq_ignore_ascii_case("any") => true,
            Some(p) => p.eq_ignore_ascii_case(candidate_loan_product),
        }
    }

    pub fn is_active_as_of(&self, as_of: DateTime<Utc>) -> bool {
        self.effective_from <= as_of && self.effective_to.map(|to| as_of <= to).unwrap_or(true)
    }
}

/// The result of computing a fee for a single selected rule.
#[derive(Debug, Clone)]
pub enum FeeCalcOutcome {
    Calculated { amount: f64, currency: String },
    RequiresNoteResolution { note_ref: String },
}
