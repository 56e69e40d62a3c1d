//! Location Client (spec §4.5): translates a location-intent utterance
//! into a query against the unified `/locations` endpoint and renders
//! the verbatim authoritative answer.

pub mod extract;
pub mod service;
pub mod types;

use std::sync::Arc;

use chat_domain::{RenderedAnswer, Result};

use extract::extract;
use service::LocationSource;
use types::LocationServiceResponse;

pub const SOURCE_TAG: &str = "location";

pub struct LocationClient {
    source: Arc<dyn LocationSource>,
    bank_name: String,
}

impl LocationClient {
    pub fn new(source: Arc<dyn LocationSource>, bank_name: impl Into<String>) -> Self {
        Self {
            source,
            bank_name: bank_name.into(),
        }
    }

    pub async fn handle(&self, text: &str) -> Result<RenderedAnswer> {
        let query = extract(text);
        let response = self.source.query(&query).await?;
        let type_label = query
            .location_type
            .map(|t| t.as_str())
            .unwrap_or("location");
        let text = render(&self.bank_name, type_label, query.count_only, &response);
        Ok(RenderedAnswer::authoritative(text, SOURCE_TAG))
    }
}

fn render(bank_name: &str, type_label: &str, count_only: bool, response: &LocationServiceResponse) -> String {
    let plural = if response.total == 1 { "" } else { "s" };
    let count_sentence = format!("{bank_name} has {} {type_label}{plural}.", response.total);

    if count_only || response.locations.is_empty() {
        return count_sentence;
    }

    let mut lines = vec![count_sentence];
    for loc in &response.locations {
        let address = loc
            .address
            .as_ref()
            .map(|a| {
                let mut parts = vec![a.line1.clone()];
                if let Some(l2) = &a.line2 {
                    parts.push(l2.clone());
                }
                parts.push(a.city.clone());
                parts.join(", ")
            })
            .unwrap_or_default();
        lines.push(format!("- {}: {}", loc.name, address));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Address, Location};

    #[test]
    fn count_only_leads_with_count_sentence() {
        let response = LocationServiceResponse {
            total: 42,
            locations: vec![],
        };
        let text = render("EBL", "Priority Center", true, &response);
        assert_eq!(text, "EBL has 42 Priority Centers.");
    }

    #[test]
    fn listing_includes_addresses() {
        let response = LocationServiceResponse {
            total: 1,
            locations: vec![Location {
                name: "Gulshan Branch".to_owned(),
                address: Some(Address {
                    line1: "Plot 1".to_owned(),
                    line2: None,
                    city: "Dhaka".to_owned(),
                    region: None,
                }),
            }],
        };
        let text = render("EBL", "branch", false, &response);
        assert!(text.starts_with("EBL has 1 branch."));
        assert!(text.contains("Gulshan Branch"));
    }
}
