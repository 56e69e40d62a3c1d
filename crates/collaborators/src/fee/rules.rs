//! Rule selection and condition interpretation (spec §4.4).

use chrono::{DateTime, Utc};

use super::types::{Condition, FeeCalcOutcome, FeeQuery, FeeRule};

/// Specificity score (spec §4.4): `2*(category is not ANY) +
/// 2*(network is not ANY) + 2*(product is neither NULL, empty, nor
/// ANY)`. This depends only on how concrete the rule itself is, never
/// on whether the query happened to constrain that dimension too, and
/// never includes the fee value itself (spec's Open Question decision:
/// the fee amount is not a tie-breaker).
fn specificity(rule: &FeeRule, _query: &FeeQuery) -> i32 {
    let mut score = 0;
    if rule.category.is_some() {
        score += 2;
    }
    if !rule.network_is_any() {
        score += 2;
    }
    if rule.product_is_concrete() {
        score += 2;
    }
    score
}

fn rule_matches(rule: &FeeRule, query: &FeeQuery, as_of: DateTime<Utc>) -> bool {
    if rule.charge_type != query.charge_type {
        return false;
    }
    if !rule.is_active_as_of(as_of) {
        return false;
    }
    if let Some(cat) = query.category {
        if let Some(rule_cat) = rule.category {
            if rule_cat != cat {
                return false;
            }
        }
    }
    if let Some(network) = &query.network {
        if !rule.network_is_any() && rule.network.as_deref() != Some(network.as_str()) {
            return false;
        }
    }
    if let Some(product) = &query.product {
        if !rule.product_matches(product) {
            return false;
        }
    }
    if let Some(loan_product) = &query.loan_product {
        if !rule.loan_product_matches(loan_product) {
            return false;
        }
    }
    true
}

/// Selects the single best-matching rule, applying the tie-break
/// cascade: priority, then specificity, then recency (`effective_from`,
/// latest wins). Returns `None` when nothing matches — the caller must
/// treat this as `AuthoritativeNotFound`, never fall through to
/// retrieval.
pub fn select_rule<'a>(
    rules: &'a [FeeRule],
    query: &FeeQuery,
    as_of: DateTime<Utc>,
) -> Option<&'a FeeRule> {
    rules
        .iter()
        .filter(|r| rule_matches(r, query, as_of))
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| specificity(a, query).cmp(&specificity(b, query)))
                .then_with(|| a.effective_from.cmp(&b.effective_from))
        })
}

/// Selects the best rule excluding one already consumed, used by the
/// `FREE_UPTO_N` chain to find the paid-tier rule that applies once the
/// free entitlement is exhausted.
pub fn select_rule_excluding<'a>(
    rules: &'a [FeeRule],
    query: &FeeQuery,
    as_of: DateTime<Utc>,
    exclude_rule_id: &str,
) -> Option<&'a FeeRule> {
    rules
        .iter()
        .filter(|r| r.rule_id != exclude_rule_id)
        .filter(|r| rule_matches(r, query, as_of))
        .max_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| specificity(a, query).cmp(&specificity(b, query)))
                .then_with(|| a.effective_from.cmp(&b.effective_from))
        })
}

/// Computes the outcome for a selected rule. `usage_index` (1-based)
/// drives the `FREE_UPTO_N` chain; all other condition kinds are
/// context-free given the rule and the query's amount.
pub fn compute(
    rule: &FeeRule,
    query: &FeeQuery,
    all_rules: &[FeeRule],
    as_of: DateTime<Utc>,
) -> FeeCalcOutcome {
    match &rule.condition {
        Condition::None { amount } => FeeCalcOutcome::Calculated {
            amount: *amount,
            currency: rule.currency.clone(),
        },
        Condition::WhicheverHigher {
            percent,
            fixed_minimum,
        } => {
            let base = query.amount.unwrap_or(0.0);
            let pct_amount = base * percent / 100.0;
            FeeCalcOutcome::Calculated {
                amount: pct_amount.max(*fixed_minimum),
                currency: rule.currency.clone(),
            }
        }
        Condition::FreeUpToN {
            free_entitlement_count,
        } => {
            let usage = query.usage_index.unwrap_or(1);
            if usage <= *free_entitlement_count {
                FeeCalcOutcome::Calculated {
                    amount: 0.0,
                    currency: rule.currency.clone(),
                }
            } else {
                match select_rule_excluding(all_rules, query, as_of, &rule.rule_id) {
                    Some(paid_rule) => compute(paid_rule, query, all_rules, as_of),
                    None => FeeCalcOutcome::Calculated {
                        amount: 0.0,
                        currency: rule.currency.clone(),
                    },
                }
            }
        }
        Condition::Tiered {
            tier_rate,
            tier_local_max,
            global_min,
            global_max,
        } => {
            let base = query.amount.unwrap_or(0.0);
            let tiered = (base * tier_rate / 100.0).min(*tier_local_max);
            let clamped = tiered.max(*global_min).min(*global_max);
            FeeCalcOutcome::Calculated {
                amount: clamped,
                currency: rule.currency.clone(),
            }
        }
        Condition::NoteBased { note_ref } => FeeCalcOutcome::RequiresNoteResolution {
            note_ref: note_ref.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee::types::CardCategory;

    fn rule(id: &str, priority: i32, condition: Condition) -> FeeRule {
        FeeRule {
            rule_id: id.to_owned(),
            priority,
            charge_type: "ISSUANCE_ANNUAL_PRIMARY".to_owned(),
            category: Some(CardCategory::Credit),
            network: Some("VISA".to_owned()),
            product: None,
            loan_product: None,
            condition,
            effective_from: "2024-01-01T00:00:00Z".parse().unwrap(),
            effective_to: None,
            currency: "BDT".to_owned(),
            remarks: None,
            fee_basis: None,
        }
    }

    fn query() -> FeeQuery {
        FeeQuery {
            charge_type: "ISSUANCE_ANNUAL_PRIMARY".to_owned(),
            category: Some(CardCategory::Credit),
            network: Some("VISA".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn higher_priority_wins_over_specificity() {
        let mut specific = rule("specific", 1, Condition::None { amount: 500.0 });
        specific.product = Some("Platinum".to_owned());
        let generic = rule("generic", 2, Condition::None { amount: 1000.0 });
        let rules = vec![specific, generic];
        let as_of: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        let selected = select_rule(&rules, &query(), as_of).unwrap();
        assert_eq!(selected.rule_id, "generic");
    }

    #[test]
    fn whichever_higher_takes_the_max() {
        let r = rule(
            "r1",
            1,
            Condition::WhicheverHigher {
                percent: 2.0,
                fixed_minimum: 500.0,
            },
        );
        let mut q = query();
        q.amount = Some(10_000.0);
        let as_of: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        match compute(&r, &q, &[r.clone()], as_of) {
            FeeCalcOutcome::Calculated { amount, .. } => assert_eq!(amount, 500.0),
            _ => panic!("expected calculated"),
        }
    }

    #[test]
    fn free_upto_n_chains_to_paid_tier() {
        let free = rule(
            "free",
            1,
            Condition::FreeUpToN {
                free_entitlement_count: 2,
            },
        );
        let paid = rule("paid", 1, Condition::None { amount: 300.0 });
        let mut q = query();
        q.usage_index = Some(3);
        let as_of: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        let rules = vec![free.clone(), paid];
        match compute(&free, &q, &rules, as_of) {
            FeeCalcOutcome::Calculated { amount, .. } => assert_eq!(amount, 300.0),
            _ => panic!("expected calculated"),
        }
    }

    #[test]
    fn tiered_clamps_to_global_bounds() {
        let r = rule(
            "tiered",
            1,
            Condition::Tiered {
                tier_rate: 1.0,
                tier_local_max: 10_000.0,
                global_min: 200.0,
                global_max: 5_000.0,
            },
        );
        let mut q = query();
        q.amount = Some(100.0);
        let as_of: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        match compute(&r, &q, &[r.clone()], as_of) {
            FeeCalcOutcome::Calculated { amount, .. } => assert_eq!(amount, 200.0),
            _ => panic!("expected calculated"),
        }
    }

    #[test]
    fn note_based_requires_resolution() {
        let r = rule(
            "note",
            1,
            Condition::NoteBased {
                note_ref: "schedule-of-charges#3.2".to_owned(),
            },
        );
        let as_of: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        match compute(&r, &query(), &[r.clone()], as_of) {
            FeeCalcOutcome::RequiresNoteResolution { note_ref } => {
                assert_eq!(note_ref, "schedule-of-charges#3.2")
            }
            _ => panic!("expected note resolution"),
        }
    }

    #[test]
    fn specificity_scores_the_rule_not_the_query_overlap() {
        // A category-concrete rule scores 2 for that dimension even
        // when the query itself leaves category unconstrained; it is
        // not gated on the rule's category matching the query's.
        let mut category_rule = rule("category", 1, Condition::None { amount: 500.0 });
        category_rule.network = None;
        let mut network_rule = rule("network", 1, Condition::None { amount: 1000.0 });
        network_rule.category = None;

        let mut unconstrained_query = query();
        unconstrained_query.category = None;

        let as_of: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(specificity(&category_rule, &unconstrained_query), 2);
        assert_eq!(specificity(&network_rule, &unconstrained_query), 2);

        // Both score 2, a real tie, so the cascade falls through to
        // `effective_from`: the later-dated rule wins.
        let mut later = network_rule.clone();
        later.rule_id = "later".to_owned();
        later.effective_from = "2024-06-01T00:00:00Z".parse().unwrap();
        let rules = vec![category_rule, later.clone()];
        let selected = select_rule(&rules, &unconstrained_query, as_of).unwrap();
        assert_eq!(selected.rule_id, "later");
    }

    #[test]
    fn expired_rule_is_not_selected() {
        let mut expired = rule("expired", 5, Condition::None { amount: 1.0 });
        expired.effective_to = Some("2020-01-01T00:00:00Z".parse().unwrap());
        let current = rule("current", 1, Condition::None { amount: 2.0 });
        let rules = vec![expired, current];
        let as_of: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        let selected = select_rule(&rules, &query(), as_of).unwrap();
        assert_eq!(selected.rule_id, "current");
    }
}
