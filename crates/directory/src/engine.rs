//! Directory Query Engine (spec §4.2): a fixed sequence of ranked
//! strategies over the employee record set, stopping at the first
//! strategy that yields a non-empty result.

use std::sync::Arc;

use chat_domain::{Employee, Result};

use crate::store::DirectoryStore;

const DEFAULT_LIMIT: usize = 5;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "of", "in", "is", "are", "who", "what", "where", "a", "an", "to",
];

pub struct DirectoryEngine {
    store: Arc<dyn DirectoryStore>,
    limit: usize,
}

/// One match surfaced by a strategy, carrying enough to sort within and
/// across strategies.
struct Match {
    score: i64,
    employee: Employee,
}

impl DirectoryEngine {
    pub fn new(store: Arc<dyn DirectoryStore>, limit: usize) -> Self {
        Self {
            store,
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Run the strategy sequence against `term`, returning the
    /// best-ranked rows from the first non-empty strategy.
    pub async fn search(&self, term: &str) -> Result<Vec<Employee>> {
        let employees = self.store.all_employees().await?;
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let strategies: [fn(&str, &[Employee]) -> Vec<Match>; 7] = [
            strategy_exact_name,
            strategy_employee_id,
            strategy_email,
            strategy_mobile,
            strategy_designation,
            strategy_full_text,
            strategy_partial_name,
        ];

        for strategy in strategies {
            let mut matches = strategy(term, &employees);
            if !matches.is_empty() {
                matches.sort_by(|a, b| {
                    b.score
                        .cmp(&a.score)
                        .then_with(|| a.employee.full_name.cmp(&b.employee.full_name))
                });
                matches.truncate(self.limit);
                return Ok(matches.into_iter().map(|m| m.employee).collect());
            }
        }

        Ok(Vec::new())
    }
}

fn content_tokens(term: &str) -> Vec<String> {
    term.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
        .map(str::to_owned)
        .collect()
}

fn is_purely_alphanumeric(term: &str) -> bool {
    !term.is_empty() && term.chars().all(|c| c.is_alphanumeric())
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// A term is "numeric-dominant" when, after stripping common phone
/// separators, what remains is entirely digits and there are enough of
/// them to plausibly be a mobile number.
fn is_numeric_dominant(term: &str) -> bool {
    let stripped: String = term
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '+'))
        .collect();
    !stripped.is_empty() && stripped.len() >= 6 && stripped.chars().all(|c| c.is_ascii_digit())
}

// Strategy 1: exact full-name match, case-insensitive.
fn strategy_exact_name(term: &str, employees: &[Employee]) -> Vec<Match> {
    let needle = term.to_lowercase();
    employees
        .iter()
        .filter(|e| e.full_name.to_lowercase() == needle)
        .map(|e| Match {
            score: 0,
            employee: e.clone(),
        })
        .collect()
}

// Strategy 2: employee-ID match when the term is purely alphanumeric/numeric.
fn strategy_employee_id(term: &str, employees: &[Employee]) -> Vec<Match> {
    if !is_purely_alphanumeric(term) {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    employees
        .iter()
        .filter(|e| e.employee_id.to_lowercase() == needle)
        .map(|e| Match {
            score: 0,
            employee: e.clone(),
        })
        .collect()
}

// Strategy 3: email match when the term contains '@'.
fn strategy_email(term: &str, employees: &[Employee]) -> Vec<Match> {
    if !term.contains('@') {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    employees
        .iter()
        .filter(|e| e.email.to_lowercase() == needle)
        .map(|e| Match {
            score: 0,
            employee: e.clone(),
        })
        .collect()
}

// Strategy 4: mobile-number match when the term is numeric-dominant;
// normalized by stripping non-digits on both sides.
fn strategy_mobile(term: &str, employees: &[Employee]) -> Vec<Match> {
    if !is_numeric_dominant(term) {
        return Vec::new();
    }
    let needle = digits_only(term);
    employees
        .iter()
        .filter(|e| digits_only(&e.mobile) == needle || digits_only(&e.ip_phone) == needle)
        .map(|e| Match {
            score: 0,
            employee: e.clone(),
        })
        .collect()
}

// Strategy 5: designation/role keyword match — every content token must
// appear as a substring of the designation; score by total occurrence
// count.
fn strategy_designation(term: &str, employees: &[Employee]) -> Vec<Match> {
    let tokens = content_tokens(term);
    if tokens.is_empty() {
        return Vec::new();
    }
    employees
        .iter()
        .filter_map(|e| {
            let designation = e.designation.to_lowercase();
            if !tokens.iter().all(|t| designation.contains(t.as_str())) {
                return None;
            }
            let score = tokens
                .iter()
                .map(|t| occurrence_count(&designation, t) as i64)
                .sum();
            Some(Match {
                score,
                employee: e.clone(),
            })
        })
        .collect()
}

// Strategy 6: full-text match against `search_vector` (name weighted
// highest via repetition, designation/department medium, division/email
// lowest); rank by summed occurrence score.
fn strategy_full_text(term: &str, employees: &[Employee]) -> Vec<Match> {
    let tokens = content_tokens(term);
    if tokens.is_empty() {
        return Vec::new();
    }
    employees
        .iter()
        .filter_map(|e| {
            let vector = e.search_vector();
            let score: i64 = tokens
                .iter()
                .map(|t| occurrence_count(&vector, t) as i64)
                .sum();
            if score > 0 {
                Some(Match {
                    score,
                    employee: e.clone(),
                })
            } else {
                None
            }
        })
        .collect()
}

// Strategy 7: partial-name fuzzy match — each content token required as
// a substring in `full_name`.
fn strategy_partial_name(term: &str, employees: &[Employee]) -> Vec<Match> {
    let tokens = content_tokens(term);
    if tokens.is_empty() {
        return Vec::new();
    }
    employees
        .iter()
        .filter_map(|e| {
            let name = e.full_name.to_lowercase();
            if !tokens.iter().all(|t| name.contains(t.as_str())) {
                return None;
            }
            let score = tokens.iter().map(|t| occurrence_count(&name, t) as i64).sum();
            Some(Match {
                score,
                employee: e.clone(),
            })
        })
        .collect()
}

fn occurrence_count(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn employee(id: &str, name: &str, designation: &str, division: &str) -> Employee {
        Employee {
            employee_id: id.into(),
            full_name: name.into(),
            designation: designation.into(),
            department: "Retail & SME Banking".into(),
            division: division.into(),
            email: format!("{}@ebl.com.bd", name.to_lowercase().replace(' ', ".")),
            mobile: "+8801711000000".into(),
            ip_phone: "4455".into(),
        }
    }

    struct FixtureStore(Vec<Employee>);

    #[async_trait]
    impl DirectoryStore for FixtureStore {
        async fn all_employees(&self) -> Result<Vec<Employee>> {
            Ok(self.0.clone())
        }
    }

    fn engine(rows: Vec<Employee>) -> DirectoryEngine {
        DirectoryEngine::new(Arc::new(FixtureStore(rows)), 5)
    }

    #[tokio::test]
    async fn exact_name_wins_over_fuzzy() {
        let e = engine(vec![
            employee("E001", "Zahid Hasan", "Senior Officer", "Retail & SME Banking"),
            employee("E002", "Zahid Hasan Chowdhury", "Officer", "Operations"),
        ]);
        let hits = e.search("zahid hasan").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].employee_id, "E001");
    }

    #[tokio::test]
    async fn division_head_designation_match() {
        let e = engine(vec![
            employee(
                "E010",
                "Rafiqul Islam",
                "Head of Retail & SME Banking",
                "Retail & SME Banking",
            ),
            employee("E011", "Somebody Else", "Officer", "IT"),
        ]);
        let hits = e.search("Retail & SME Banking head").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].employee_id, "E010");
    }

    #[tokio::test]
    async fn employee_id_strategy_only_fires_for_alphanumeric_terms() {
        let e = engine(vec![employee("E123", "Someone", "Officer", "IT")]);
        let hits = e.search("E123").await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn mobile_number_normalizes_separators() {
        let mut row = employee("E050", "Karim Uddin", "Officer", "IT");
        row.mobile = "01711-000111".into();
        let e = engine(vec![row]);
        let hits = e.search("01711000111").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].employee_id, "E050");
    }

    #[tokio::test]
    async fn unknown_name_returns_no_rows() {
        let e = engine(vec![employee("E001", "Zahid Hasan", "Officer", "IT")]);
        let hits = e.search("totally unknown person").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn store_error_propagates() {
        struct FailingStore;
        #[async_trait]
        impl DirectoryStore for FailingStore {
            async fn all_employees(&self) -> Result<Vec<Employee>> {
                Err(chat_domain::Error::AuthoritativeError {
                    source_name: "directory".into(),
                    message: "connection refused".into(),
                })
            }
        }
        let e = DirectoryEngine::new(Arc::new(FailingStore), 5);
        assert!(e.search("anyone").await.is_err());
    }
}
