use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::Cents;

/// A common origin/destination pair sold at negotiated flat rates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopularRoute {
    pub description: String,
    pub distance_miles: f64,
    /// Flat rate per vehicle id; vehicles without an entry price normally.
    pub flat_rates: BTreeMap<String, Cents>,
}

impl PopularRoute {
    pub fn flat_rate(&self, vehicle_id: &str) -> Option<Cents> {
        self.flat_rates.get(vehicle_id).copied()
    }
}

/// Lookup key for a route, e.g. `MIA-MCO`.
pub fn route_key(origin_code: &str, destination_code: &str) -> String {
    format!(
        "{}-{}",
        origin_code.trim().to_uppercase(),
        destination_code.trim().to_uppercase()
    )
}

#[test]
fn route_key_is_case_insensitive() {
    assert_eq!(route_key("mia", " mco"), "MIA-MCO");
    assert_eq!(route_key("MIA", "MCO"), route_key("Mia", "mCo"));
}
