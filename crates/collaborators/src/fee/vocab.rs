//! Extraction vocabularies (spec §4.4 "Query extraction").

/// Network aliases, case-insensitive, mapped to the service's canonical
/// token. Longer/compound aliases are listed before the words they
/// contain so scanning in order prefers the more specific match.
pub const NETWORK_ALIASES: &[(&str, &str)] = &[
    ("union pay international", "UnionPay International"),
    ("union pay", "UnionPay International"),
    ("unionpay international", "UnionPay International"),
    ("unionpay", "UnionPay International"),
    ("american express", "American Express"),
    ("amex", "American Express"),
    ("mastercard", "Mastercard"),
    ("master card", "Mastercard"),
    ("visa", "VISA"),
];

/// Compound product aliases checked before the bare names in
/// `PRODUCT_ALIASES` (spec: "UnionPay Classic matched before Classic").
pub const COMPOUND_PRODUCT_ALIASES: &[(&str, &str)] = &[
    ("unionpay classic", "Classic"),
    ("unionpay gold", "Gold"),
    ("unionpay platinum", "Platinum"),
    ("visa classic", "Classic"),
    ("visa gold", "Gold"),
    ("visa platinum", "Platinum"),
    ("visa signature", "Signature"),
    ("visa infinite", "Infinite"),
    ("mastercard titanium", "Titanium"),
    ("mastercard platinum", "Platinum"),
    ("mastercard world", "World"),
];

pub const PRODUCT_ALIASES: &[&str] = &[
    "classic", "gold", "platinum", "titanium", "signature", "infinite", "world",
];

/// Charge-type keyword phrases, longest/most specific first. The first
/// matching phrase wins.
pub const CHARGE_TYPE_KEYWORDS: &[(&str, &str)] = &[
    ("supplementary card annual fee", "SUPPLEMENTARY_ANNUAL"),
    ("supplementary annual fee", "SUPPLEMENTARY_ANNUAL"),
    ("supplementary free", "SUPPLEMENTARY_FREE_ENTITLEMENT"),
    ("supplementary", "SUPPLEMENTARY_ANNUAL"),
    ("primary card issuance", "ISSUANCE_ANNUAL_PRIMARY"),
    ("issuance fee", "ISSUANCE_ANNUAL_PRIMARY"),
    ("annual fee", "ISSUANCE_ANNUAL_PRIMARY"),
    ("cash withdrawal", "CASH_WITHDRAWAL_EBL_ATM"),
    ("cash advance", "CASH_WITHDRAWAL_EBL_ATM"),
    ("late payment", "LATE_PAYMENT"),
    ("overlimit", "OVERLIMIT"),
    ("over limit", "OVERLIMIT"),
    ("card replacement", "CARD_REPLACEMENT"),
    ("processing fee", "PROCESSING_FEE"),
    ("limit enhancement", "LIMIT_ENHANCEMENT_FEE"),
    ("early settlement", "EARLY_SETTLEMENT_FEE"),
    ("skybanking fee", "SKYBANKING_FEE"),
    ("skybanking", "SKYBANKING_FEE"),
    ("internet banking fee", "INTERNET_BANKING_FEE"),
    ("sms banking fee", "SMS_BANKING_FEE"),
    ("sms alert fee", "SMS_ALERT_FEE"),
];

/// Card-family charge types: one call to the card fee rule family.
pub const CARD_CHARGE_TYPES: &[&str] = &[
    "ISSUANCE_ANNUAL_PRIMARY",
    "SUPPLEMENTARY_ANNUAL",
    "SUPPLEMENTARY_FREE_ENTITLEMENT",
    "CASH_WITHDRAWAL_EBL_ATM",
    "LATE_PAYMENT",
    "OVERLIMIT",
    "CARD_REPLACEMENT",
    "PROCESSING_FEE",
];

/// Retail-asset (loan) family charge types: one call to the
/// retail-asset charge endpoint.
pub const RETAIL_ASSET_CHARGE_TYPES: &[&str] = &["LIMIT_ENHANCEMENT_FEE", "EARLY_SETTLEMENT_FEE"];

/// Skybanking/digital-channel family charge types.
pub const SKYBANKING_CHARGE_TYPES: &[&str] = &[
    "SKYBANKING_FEE",
    "INTERNET_BANKING_FEE",
    "SMS_BANKING_FEE",
    "SMS_ALERT_FEE",
];

/// Charge types for which an unspecified product is an ambiguity the
/// client must not guess past (spec §4.4; scenario 8's product
/// disambiguation).
pub const PRODUCT_DEPENDENT_CHARGE_TYPES: &[&str] =
    &["ISSUANCE_ANNUAL_PRIMARY", "SUPPLEMENTARY_ANNUAL"];

/// Loan-product aliases recognized in a retail-asset charge utterance,
/// mapped to the service's canonical token.
pub const LOAN_PRODUCT_ALIASES: &[(&str, &str)] = &[
    ("personal loan", "Personal Loan"),
    ("home loan", "Home Loan"),
    ("auto loan", "Auto Loan"),
    ("car loan", "Auto Loan"),
];

/// Retail-asset charge types for which an unspecified loan product is
/// an ambiguity the client must not guess past, mirroring
/// `PRODUCT_DEPENDENT_CHARGE_TYPES` for the card family.
pub const LOAN_PRODUCT_DEPENDENT_CHARGE_TYPES: &[&str] = RETAIL_ASSET_CHARGE_TYPES;

/// Charge types whose rendering must always state both the free-tier
/// threshold and the paid amount beyond it (spec §4.4, last paragraph).
pub const FREE_THEN_PAID_CHARGE_TYPES: &[&str] = &["SUPPLEMENTARY_ANNUAL"];
