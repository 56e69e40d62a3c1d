//! Query extraction for location-intent utterances (spec §4.5).

use super::types::{LocationQuery, LocationType};

const TYPE_ALIASES: &[(&str, LocationType)] = &[
    ("priority center", LocationType::PriorityCenter),
    ("priority centre", LocationType::PriorityCenter),
    ("head office", LocationType::HeadOffice),
    ("branch", LocationType::Branch),
    ("atm", LocationType::Atm),
    ("crm", LocationType::Crm),
    ("rtdm", LocationType::Rtdm),
];

const DEFAULT_LIMIT: u32 = 20;

pub fn extract(text: &str) -> LocationQuery {
    let lower = text.to_lowercase();

    let location_type = TYPE_ALIASES
        .iter()
        .find(|(alias, _)| lower.contains(alias))
        .map(|(_, t)| *t);

    let count_only = lower.contains("how many") || lower.contains("count of") || lower.contains("number of");

    let city = extract_after(&lower, "in ").or_else(|| extract_after(&lower, "at "));

    LocationQuery {
        location_type,
        city,
        region: None,
        search: None,
        limit: DEFAULT_LIMIT,
        offset: 0,
        count_only,
    }
}

fn extract_after(lower: &str, marker: &str) -> Option<String> {
    let idx = lower.find(marker)?;
    let rest = &lower[idx + marker.len()..];
    let word: String = rest
        .split_whitespace()
        .next()?
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if word.is_empty() {
        None
    } else {
        Some(titlecase(&word))
    }
}

fn titlecase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn how_many_is_count_only() {
        let q = extract("how many priority centers does the bank have");
        assert!(q.count_only);
        assert_eq!(q.location_type, Some(LocationType::PriorityCenter));
    }

    #[test]
    fn city_extracted_after_in() {
        let q = extract("find a branch in Dhaka");
        assert_eq!(q.city.as_deref(), Some("Dhaka"));
        assert_eq!(q.location_type, Some(LocationType::Branch));
    }
}
