//! Fee Client (spec §4.4): extracts a fee query from an utterance,
//! selects the governing rule, computes the charge, and renders the
//! verbatim authoritative answer — or raises a disambiguation when the
//! query is genuinely ambiguous rather than merely unconstrained.

pub mod extract;
pub mod render;
pub mod rules;
pub mod service;
pub mod types;
mod vocab;

use std::collections::BTreeSet;
use std::sync::Arc;

use chat_domain::{DisambiguationKind, DisambiguationOption, DisambiguationState, Error, RenderedAnswer, Result};
use chrono::Utc;

use extract::{extract, extract_with_overrides, ExtractError};
use rules::{compute, select_rule};
use service::FeeRuleSource;
use types::{CardCategory, Condition, FeeCalcOutcome, FeeQuery, FeeRule};
use vocab::{LOAN_PRODUCT_DEPENDENT_CHARGE_TYPES, PRODUCT_DEPENDENT_CHARGE_TYPES};

pub const SOURCE_TAG: &str = "fee";

pub enum FeeOutcome {
    Answer(RenderedAnswer),
    Disambiguation(DisambiguationState),
}

pub struct FeeClient {
    source: Arc<dyn FeeRuleSource>,
}

impl FeeClient {
    pub fn new(source: Arc<dyn FeeRuleSource>) -> Self {
        Self { source }
    }

    pub async fn handle(&self, text: &str) -> Result<FeeOutcome> {
        let query = match extract(text) {
            Ok(q) => q,
            Err(ExtractError::AmbiguousNetwork(networks)) => {
                return Ok(FeeOutcome::Disambiguation(network_disambiguation(text, networks)));
            }
            Err(ExtractError::AmbiguousCategory(categories)) => {
                return Ok(FeeOutcome::Disambiguation(category_disambiguation(text, categories)));
            }
        };

        let rules = self.source.rules_for(&query.charge_type).await?;
        if rules.is_empty() {
            return Err(Error::AuthoritativeNotFound(format!(
                "no fee rules for charge type {}",
                query.charge_type
            )));
        }

        if query.product.is_none() && PRODUCT_DEPENDENT_CHARGE_TYPES.contains(&query.charge_type.as_str()) {
            if let Some(state) = self.product_disambiguation(&rules, &query)? {
                return Ok(FeeOutcome::Disambiguation(state));
            }
        }

        if query.loan_product.is_none()
            && LOAN_PRODUCT_DEPENDENT_CHARGE_TYPES.contains(&query.charge_type.as_str())
        {
            if let Some(state) = self.loan_product_disambiguation(&rules, &query)? {
                return Ok(FeeOutcome::Disambiguation(state));
            }
        }

        let as_of = now();
        let rule = select_rule(&rules, &query, as_of)
            .ok_or_else(|| Error::AuthoritativeNotFound(format!("no matching fee rule for {:?}", query)))?;

        let text = self.render_for(rule, &query, &rules, as_of);
        Ok(FeeOutcome::Answer(RenderedAnswer::authoritative(text, SOURCE_TAG)))
    }

    /// Resumes a fee query once the user has selected a disambiguation
    /// option — `context` is the `DisambiguationState::context` carried
    /// from the original call.
    pub async fn resume(&self, context: &serde_json::Value, selected: &str) -> Result<RenderedAnswer> {
        if let Some(precomputed) = context
            .get("answers")
            .and_then(|a| a.get(selected))
            .and_then(|v| v.as_str())
        {
            return Ok(RenderedAnswer::authoritative(precomputed.to_owned(), SOURCE_TAG));
        }

        let query = if let Some(charge_type) = context.get("charge_type").and_then(|v| v.as_str()) {
            let mut query = FeeQuery {
                charge_type: charge_type.to_owned(),
                ..Default::default()
            };
            if let Some(network) = context.get("network").and_then(|v| v.as_str()) {
                query.network = Some(network.to_owned());
            }
            match context.get("field").and_then(|v| v.as_str()) {
                Some("loan_product") => query.loan_product = Some(selected.to_owned()),
                _ => query.product = Some(selected.to_owned()),
            }
            query
        } else {
            let original_text = context
                .get("original_text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::Other("fee disambiguation context missing original_text".to_owned()))?;
            match context.get("dimension").and_then(|v| v.as_str()) {
                Some("network") => extract_with_overrides(original_text, Some(selected), None),
                Some("category") => {
                    let category = CardCategory::parse(selected).ok_or_else(|| {
                        Error::Other(format!("unknown card category in disambiguation context: {selected}"))
                    })?;
                    extract_with_overrides(original_text, None, Some(category))
                }
                other => {
                    return Err(Error::Other(format!(
                        "fee disambiguation context has unrecognized dimension: {other:?}"
                    )))
                }
            }
        };

        let rules = self.source.rules_for(&query.charge_type).await?;
        let as_of = now();
        let rule = select_rule(&rules, &query, as_of)
            .ok_or_else(|| Error::AuthoritativeNotFound(format!("no matching fee rule for {:?}", query)))?;
        let text = self.render_for(rule, &query, &rules, as_of);
        Ok(RenderedAnswer::authoritative(text, SOURCE_TAG))
    }

    fn render_for(&self, rule: &FeeRule, query: &FeeQuery, all_rules: &[FeeRule], as_of: chrono::DateTime<Utc>) -> String {
        if render::is_free_then_paid(&query.charge_type) {
            if let Condition::FreeUpToN { free_entitlement_count } = rule.condition {
                // Both tiers are stated unconditionally (spec §4.4), not
                // only when `usage_index` happens to fall within the
                // free entitlement — the paid tier is computed directly
                // from the rule chain, never inferred from whichever
                // amount this particular query's usage_index produced.
                let paid_outcome = match rules::select_rule_excluding(all_rules, query, as_of, &rule.rule_id) {
                    Some(paid_rule) => compute(paid_rule, query, all_rules, as_of),
                    None => FeeCalcOutcome::Calculated {
                        amount: 0.0,
                        currency: rule.currency.clone(),
                    },
                };
                return render::render_free_then_paid(query, free_entitlement_count, &paid_outcome);
            }
        }
        let outcome = compute(rule, query, all_rules, as_of);
        render::render(rule, &outcome)
    }

    /// Builds a `CardProduct` disambiguation when the query's charge
    /// type requires a product the utterance didn't name, precomputing
    /// every candidate's answer from the rules already fetched so
    /// resolution never needs a second round-trip (spec §4.7 "OR").
    fn product_disambiguation(
        &self,
        rules: &[FeeRule],
        query: &FeeQuery,
    ) -> Result<Option<DisambiguationState>> {
        let mut products: BTreeSet<String> = BTreeSet::new();
        for rule in rules {
            if rule.product_is_concrete() {
                if let Some(p) = &rule.product {
                    for variant in p.split('/') {
                        products.insert(variant.trim().to_owned());
                    }
                }
            }
        }
        if products.len() < 2 {
            return Ok(None);
        }

        let as_of = now();
        let mut answers = serde_json::Map::new();
        let mut options = Vec::new();
        for (i, product) in products.into_iter().enumerate() {
            let mut candidate_query = query.clone();
            candidate_query.product = Some(product.clone());
            let answer_text = select_rule(rules, &candidate_query, as_of)
                .map(|rule| self.render_for(rule, &candidate_query, rules, as_of));

            if let Some(text) = &answer_text {
                answers.insert(product.clone(), serde_json::Value::String(text.clone()));
            }

            let mut match_keys = BTreeSet::new();
            match_keys.insert(product.to_lowercase());

            options.push(DisambiguationOption {
                index: i + 1,
                display_name: product.clone(),
                canonical_id: product,
                match_keys,
                answer_text,
            });
        }

        let mut context = serde_json::Map::new();
        context.insert("charge_type".to_owned(), serde_json::Value::String(query.charge_type.clone()));
        context.insert("field".to_owned(), serde_json::Value::String("product".to_owned()));
        if let Some(network) = &query.network {
            context.insert("network".to_owned(), serde_json::Value::String(network.clone()));
        }
        context.insert("answers".to_owned(), serde_json::Value::Object(answers));

        Ok(Some(DisambiguationState {
            kind: DisambiguationKind::CardProduct,
            options,
            context: serde_json::Value::Object(context),
            created_at: Utc::now(),
        }))
    }

    /// Builds a `RetailAsset` disambiguation when a loan-charge query
    /// doesn't name which loan product it's about, precomputing every
    /// candidate's answer the same way `product_disambiguation` does
    /// for cards.
    fn loan_product_disambiguation(
        &self,
        rules: &[FeeRule],
        query: &FeeQuery,
    ) -> Result<Option<DisambiguationState>> {
        let mut loan_products: BTreeSet<String> = BTreeSet::new();
        for rule in rules {
            if rule.loan_product_is_concrete() {
                if let Some(p) = &rule.loan_product {
                    loan_products.insert(p.clone());
                }
            }
        }
        if loan_products.len() < 2 {
            return Ok(None);
        }

        let as_of = now();
        let mut answers = serde_json::Map::new();
        let mut options = Vec::new();
        for (i, loan_product) in loan_products.into_iter().enumerate() {
            let mut candidate_query = query.clone();
            candidate_query.loan_product = Some(loan_product.clone());
            let answer_text = select_rule(rules, &candidate_query, as_of)
                .map(|rule| self.render_for(rule, &candidate_query, rules, as_of));

            if let Some(text) = &answer_text {
                answers.insert(loan_product.clone(), serde_json::Value::String(text.clone()));
            }

            let mut match_keys = BTreeSet::new();
            match_keys.insert(loan_product.to_lowercase());

            options.push(DisambiguationOption {
                index: i + 1,
                display_name: loan_product.clone(),
                canonical_id: loan_product,
                match_keys,
                answer_text,
            });
        }

        let mut context = serde_json::Map::new();
        context.insert("charge_type".to_owned(), serde_json::Value::String(query.charge_type.clone()));
        context.insert("field".to_owned(), serde_json::Value::String("loan_product".to_owned()));
        context.insert("answers".to_owned(), serde_json::Value::Object(answers));

        Ok(Some(DisambiguationState {
            kind: DisambiguationKind::RetailAsset,
            options,
            context: serde_json::Value::Object(context),
            created_at: Utc::now(),
        }))
    }
}

/// Raises a `CardProduct`-kind disambiguation over conflicting network
/// names. None of the options can precompute `answer_text` — the other
/// query dimensions (charge type, amount) still need the original
/// utterance, so the context carries it verbatim for `resume` to
/// re-extract against once the network is pinned.
fn network_disambiguation(text: &str, networks: Vec<String>) -> DisambiguationState {
    let options = networks
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut match_keys = BTreeSet::new();
            match_keys.insert(name.to_lowercase());
            DisambiguationOption {
                index: i + 1,
                display_name: name.clone(),
                canonical_id: name,
                match_keys,
                answer_text: None,
            }
        })
        .collect();
    DisambiguationState {
        kind: DisambiguationKind::CardProduct,
        options,
        context: resume_context(text, "network"),
        created_at: Utc::now(),
    }
}

fn category_disambiguation(text: &str, categories: Vec<CardCategory>) -> DisambiguationState {
    let options = categories
        .into_iter()
        .enumerate()
        .map(|(i, cat)| {
            let name = cat.as_str().to_owned();
            let mut match_keys = BTreeSet::new();
            match_keys.insert(name.to_lowercase());
            DisambiguationOption {
                index: i + 1,
                display_name: name.clone(),
                canonical_id: name,
                match_keys,
                answer_text: None,
            }
        })
        .collect();
    DisambiguationState {
        kind: DisambiguationKind::CardProduct,
        options,
        context: resume_context(text, "category"),
        created_at: Utc::now(),
    }
}

fn resume_context(text: &str, dimension: &str) -> serde_json::Value {
    let mut context = serde_json::Map::new();
    context.insert("original_text".to_owned(), serde_json::Value::String(text.to_owned()));
    context.insert("dimension".to_owned(), serde_json::Value::String(dimension.to_owned()));
    serde_json::Value::Object(context)
}

fn now() -> chrono::DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedSource(Vec<FeeRule>);

    #[async_trait]
    impl FeeRuleSource for FixedSource {
        async fn rules_for(&self, _charge_type: &str) -> Result<Vec<FeeRule>> {
            Ok(self.0.clone())
        }
    }

    fn rule(product: Option<&str>, amount: f64) -> FeeRule {
        FeeRule {
            rule_id: format!("r-{:?}", product),
            priority: 1,
            charge_type: "ISSUANCE_ANNUAL_PRIMARY".to_owned(),
            category: None,
            network: Some("VISA".to_owned()),
            product: product.map(|p| p.to_owned()),
            loan_product: None,
            condition: Condition::None { amount },
            effective_from: "2024-01-01T00:00:00Z".parse().unwrap(),
            effective_to: None,
            currency: "BDT".to_owned(),
            remarks: None,
            fee_basis: None,
        }
    }

    #[tokio::test]
    async fn missing_product_raises_disambiguation_with_precomputed_answers() {
        let rules = vec![rule(Some("Classic"), 500.0), rule(Some("Platinum"), 2000.0)];
        let client = FeeClient::new(Arc::new(FixedSource(rules)));
        let outcome = client.handle("VISA annual fee").await.unwrap();
        match outcome {
            FeeOutcome::Disambiguation(state) => {
                assert_eq!(state.options.len(), 2);
                assert!(state.options.iter().all(|o| o.answer_text.is_some()));
            }
            FeeOutcome::Answer(_) => panic!("expected disambiguation"),
        }
    }

    #[tokio::test]
    async fn concrete_product_answers_directly() {
        let rules = vec![rule(Some("Classic"), 500.0), rule(Some("Platinum"), 2000.0)];
        let client = FeeClient::new(Arc::new(FixedSource(rules)));
        let outcome = client.handle("VISA Platinum annual fee").await.unwrap();
        match outcome {
            FeeOutcome::Answer(answer) => {
                assert!(answer.text.contains("2000"));
                assert!(answer.suppress_generation);
            }
            FeeOutcome::Disambiguation(_) => panic!("expected answer"),
        }
    }

    #[tokio::test]
    async fn no_rules_is_authoritative_not_found() {
        let client = FeeClient::new(Arc::new(FixedSource(vec![])));
        let err = client.handle("VISA Platinum annual fee").await.unwrap_err();
        assert!(matches!(err, Error::AuthoritativeNotFound(_)));
    }

    fn network_rule(network: &str, amount: f64) -> FeeRule {
        FeeRule {
            rule_id: format!("r-{network}"),
            priority: 1,
            charge_type: "ISSUANCE_ANNUAL_PRIMARY".to_owned(),
            category: None,
            network: Some(network.to_owned()),
            product: None,
            loan_product: None,
            condition: Condition::None { amount },
            effective_from: "2024-01-01T00:00:00Z".parse().unwrap(),
            effective_to: None,
            currency: "BDT".to_owned(),
            remarks: None,
            fee_basis: None,
        }
    }

    #[tokio::test]
    async fn conflicting_network_disambiguation_resumes_from_original_text() {
        let rules = vec![network_rule("VISA", 500.0), network_rule("Mastercard", 700.0)];
        let client = FeeClient::new(Arc::new(FixedSource(rules)));
        let outcome = client.handle("is the Visa or Mastercard annual fee higher").await.unwrap();
        let state = match outcome {
            FeeOutcome::Disambiguation(state) => state,
            FeeOutcome::Answer(_) => panic!("expected disambiguation"),
        };
        let mastercard = state.options.iter().find(|o| o.canonical_id == "Mastercard").unwrap();
        assert!(mastercard.answer_text.is_none());

        let answer = client.resume(&state.context, "Mastercard").await.unwrap();
        assert!(answer.text.contains("700"));
    }

    fn loan_rule(loan_product: &str, amount: f64) -> FeeRule {
        FeeRule {
            rule_id: format!("r-{loan_product}"),
            priority: 1,
            charge_type: "EARLY_SETTLEMENT_FEE".to_owned(),
            category: None,
            network: None,
            product: None,
            loan_product: Some(loan_product.to_owned()),
            condition: Condition::None { amount },
            effective_from: "2024-01-01T00:00:00Z".parse().unwrap(),
            effective_to: None,
            currency: "BDT".to_owned(),
            remarks: None,
            fee_basis: None,
        }
    }

    #[tokio::test]
    async fn supplementary_fee_states_both_tiers_even_once_the_free_entitlement_is_exhausted() {
        let free = FeeRule {
            rule_id: "free".to_owned(),
            priority: 1,
            charge_type: "SUPPLEMENTARY_ANNUAL".to_owned(),
            category: None,
            network: Some("VISA".to_owned()),
            product: None,
            loan_product: None,
            condition: Condition::FreeUpToN { free_entitlement_count: 2 },
            effective_from: "2024-01-01T00:00:00Z".parse().unwrap(),
            effective_to: None,
            currency: "BDT".to_owned(),
            remarks: None,
            fee_basis: None,
        };
        let paid = FeeRule {
            rule_id: "paid".to_owned(),
            priority: 1,
            charge_type: "SUPPLEMENTARY_ANNUAL".to_owned(),
            category: None,
            network: Some("VISA".to_owned()),
            product: None,
            loan_product: None,
            condition: Condition::None { amount: 2300.0 },
            effective_from: "2024-01-01T00:00:00Z".parse().unwrap(),
            effective_to: None,
            currency: "BDT".to_owned(),
            remarks: None,
            fee_basis: None,
        };
        let rules = vec![free.clone(), paid];
        let client = FeeClient::new(Arc::new(FixedSource(rules.clone())));
        let as_of = now();
        // usage_index = 3 exceeds free_entitlement_count = 2, so
        // compute() chains straight to the paid rule's non-zero amount —
        // the rendered text must still state the free tier too.
        let query = FeeQuery {
            charge_type: "SUPPLEMENTARY_ANNUAL".to_owned(),
            network: Some("VISA".to_owned()),
            usage_index: Some(3),
            ..Default::default()
        };
        let text = client.render_for(&free, &query, &rules, as_of);
        assert!(text.contains("first 2"));
        assert!(text.contains("BDT 2300") || text.contains("BDT 2,300"));
    }

    #[tokio::test]
    async fn missing_loan_product_raises_retail_asset_disambiguation() {
        let rules = vec![loan_rule("Personal Loan", 1000.0), loan_rule("Home Loan", 2500.0)];
        let client = FeeClient::new(Arc::new(FixedSource(rules)));
        let outcome = client.handle("what is the early settlement fee").await.unwrap();
        match outcome {
            FeeOutcome::Disambiguation(state) => {
                assert!(matches!(state.kind, DisambiguationKind::RetailAsset));
                assert!(state.options.iter().all(|o| o.answer_text.is_some()));
            }
            FeeOutcome::Answer(_) => panic!("expected disambiguation"),
        }
    }
}
