//! Keyword vocabularies backing the classification rules (spec §4.1).
//! Each list is intentionally flat and lowercase; matching is plain
//! substring containment against a lowercased utterance.

pub const DIRECTORY_CUES: &[&str] = &[
    "phone",
    "telephone",
    "mobile",
    "extension",
    "ext.",
    "ip-phone",
    "ip phone",
    "email",
    "employee id",
    "employee-id",
    "phonebook",
    "phone book",
    "directory",
];

pub const DIVISION_DEPARTMENT_NOUNS: &[&str] = &["division", "department", "dept"];

pub const ROLE_NOUNS: &[&str] = &[
    "head", "manager", "director", "chief", "ceo", "cfo", "coo", "chairman", "lead",
];

pub const FEE_VOCAB: &[&str] = &[
    "card fee",
    "supplementary",
    "issuance",
    "annual fee",
    "processing fee",
    "late payment",
    "cash advance",
    "cash withdrawal",
    "lounge",
    "loan charge",
    "loan fee",
    // Standardized charge-type names (Glossary), lowercased.
    "issuance_annual_primary",
    "supplementary_annual",
    "supplementary_free_entitlement",
    "cash_withdrawal_ebl_atm",
    "late_payment",
    "overlimit",
    "card_replacement",
    "processing_fee",
    "limit_enhancement_fee",
    "early_settlement_fee",
    "overlimit fee",
    "card replacement",
    "limit enhancement",
    "early settlement",
    "renewal fee",
    "statement fee",
    "duplicate statement",
    "cheque book fee",
    "cheque return",
    "fund transfer fee",
    "sms banking fee",
    "sms alert fee",
    "skybanking fee",
    "internet banking fee",
    "foreign currency markup",
    "fx markup",
    "minimum balance fee",
    "account maintenance fee",
    "debit card fee",
    "credit card fee",
    "prepaid card fee",
];

pub const LOCATION_VOCAB: &[&str] = &[
    "branch",
    "atm",
    "crm",
    "rtdm",
    "priority center",
    "priority centre",
    "head office",
];

pub const MANAGEMENT_VOCAB: &[&str] =
    &["management committee", "board of directors", "managing director", "executive committee"];

pub const POLICY_VOCAB: &[&str] = &["policy", "procedure manual", "compliance guideline"];

pub const FINANCIAL_REPORT_VOCAB: &[&str] =
    &["annual report", "financial statement", "quarterly result", "balance sheet"];

pub const MILESTONE_VOCAB: &[&str] =
    &["milestone", "anniversary", "founding year", "history of the bank"];

pub const USER_DOCUMENT_VOCAB: &[&str] = &["my document", "uploaded file", "attached document"];
