//! Selection-time stopword list (spec §4.7, Glossary): tokens excluded
//! from `match_keys` substring scoring because they are too generic to
//! discriminate between options.

pub const STOPWORDS: &[&str] = &[
    "fee",
    "card",
    "bdt",
    "usd",
    "per",
    "transaction",
    "amount",
    "annual",
    "fees",
    "charge",
    "charges",
    "year",
    "month",
    "rate",
    "percent",
    "with",
    "for",
    "the",
    "and",
    "of",
    "to",
    "is",
    "on",
    "a",
    "an",
    "interest",
    "loan",
    "credit",
    "debit",
];
