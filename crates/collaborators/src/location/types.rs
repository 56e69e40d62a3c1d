//! Location-domain types (spec §4.5).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Branch,
    Atm,
    Crm,
    Rtdm,
    PriorityCenter,
    HeadOffice,
}

impl LocationType {
    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Branch => "branch",
            LocationType::Atm => "ATM",
            LocationType::Crm => "CRM",
            LocationType::Rtdm => "RTDM",
            LocationType::PriorityCenter => "Priority Center",
            LocationType::HeadOffice => "Head Office",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<LocationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub limit: u32,
    pub offset: u32,
    /// `true` for a "how many" utterance: rendering leads with the count
    /// sentence rather than a listing.
    #[serde(skip)]
    pub count_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationServiceResponse {
    pub total: u64,
    #[serde(default)]
    pub locations: Vec<Location>,
}
