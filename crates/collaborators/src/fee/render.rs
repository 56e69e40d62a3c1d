//! Rendering a selected fee rule + computed outcome into the verbatim
//! authoritative answer text (spec §4.4).

use super::types::{FeeCalcOutcome, FeeQuery, FeeRule};
use super::vocab::FREE_THEN_PAID_CHARGE_TYPES;

/// Renders the primary outcome for a rule. When the charge type is one
/// of [`FREE_THEN_PAID_CHARGE_TYPES`] and the rule's condition is a
/// `FREE_UPTO_N`, the caller must additionally compute and render the
/// paid tier via [`render_free_then_paid`] rather than stopping here —
/// stating only "free" on a charge that later turns paid would mislead.
pub fn render(rule: &FeeRule, outcome: &FeeCalcOutcome) -> String {
    match outcome {
        FeeCalcOutcome::Calculated { amount, currency } => {
            if *amount == 0.0 {
                "There is no charge for this — it is free of cost.".to_owned()
            } else {
                format!("The applicable charge is {currency} {}.", format_amount(*amount))
            }
        }
        FeeCalcOutcome::RequiresNoteResolution { note_ref } => format!(
            "This charge depends on conditions set out in {note_ref}; please consult that note for the exact figure rather than an estimate."
        ),
    }
}

/// Renders the dual-tier sentence required for charge types in
/// [`FREE_THEN_PAID_CHARGE_TYPES`]: states the free entitlement and the
/// paid amount beyond it, never just one half.
pub fn render_free_then_paid(
    _query: &FeeQuery,
    free_entitlement_count: u32,
    paid_outcome: &FeeCalcOutcome,
) -> String {
    let paid_text = match paid_outcome {
        FeeCalcOutcome::Calculated { amount, currency } => {
            format!("{currency} {}", format_amount(*amount))
        }
        FeeCalcOutcome::RequiresNoteResolution { note_ref } => {
            format!("an amount set out in {note_ref}")
        }
    };
    let free_n = free_entitlement_count;
    let plural = if free_n == 1 { "" } else { "s" };
    format!(
        "The first {free_n} supplementary card{plural} are free of cost; each one after that is charged {paid_text}."
    )
}

pub fn is_free_then_paid(charge_type: &str) -> bool {
    FREE_THEN_PAID_CHARGE_TYPES.contains(&charge_type)
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_renders_as_free() {
        let text = render(
            &test_rule(),
            &FeeCalcOutcome::Calculated {
                amount: 0.0,
                currency: "BDT".to_owned(),
            },
        );
        assert!(text.contains("free"));
    }

    #[test]
    fn whole_amount_has_no_decimal() {
        let text = render(
            &test_rule(),
            &FeeCalcOutcome::Calculated {
                amount: 500.0,
                currency: "BDT".to_owned(),
            },
        );
        assert!(text.contains("BDT 500"));
        assert!(!text.contains("500.00"));
    }

    #[test]
    fn dual_tier_states_both_halves() {
        let text = render_free_then_paid(
            &FeeQuery::default(),
            2,
            &FeeCalcOutcome::Calculated {
                amount: 300.0,
                currency: "BDT".to_owned(),
            },
        );
        assert!(text.contains("first 2"));
        assert!(text.contains("BDT 300"));
    }

    fn test_rule() -> FeeRule {
        use super::super::types::Condition;
        FeeRule {
            rule_id: "r".to_owned(),
            priority: 1,
            charge_type: "PROCESSING_FEE".to_owned(),
            category: None,
            network: None,
            product: None,
            loan_product: None,
            condition: Condition::None { amount: 0.0 },
            effective_from: "2024-01-01T00:00:00Z".parse().unwrap(),
            effective_to: None,
            currency: "BDT".to_owned(),
            remarks: None,
            fee_basis: None,
        }
    }
}
