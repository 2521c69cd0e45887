use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::{AppliedSurcharge, Capacity, Cents, RoundingStrategy, TierCharge};

/// Optional facts about the trip that can change its price.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TripContext {
    /// Local pickup time; no timezone conversion happens here.
    #[serde(default)]
    pub trip_date_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub origin_code: Option<String>,
    #[serde(default)]
    pub destination_code: Option<String>,
    #[serde(default)]
    pub passenger_count: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionModel {
    Tiered,
    Hourly,
    RouteFlat,
}

/// Intermediate amounts kept for auditing and disputes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub tier_charges: Vec<TierCharge>,
    pub distance_fare: Cents,
    pub airport_fee: Cents,
    pub hourly_fare: Cents,
    pub popular_route: Option<String>,
    pub surcharged_price: Cents,
    pub rounding_adjustment: Cents,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareQuote {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub base_fare: Cents,
    pub protection_model: ProtectionModel,
    pub applied_surcharges: Vec<AppliedSurcharge>,
    pub final_price: Cents,
    pub breakdown: FareBreakdown,
}

/// Result of pricing one trip. Being outside a vehicle's service area is a
/// normal outcome the rider must be shown, so it is not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Quotation {
    Priced(FareQuote),
    OutOfServiceArea { max_service_distance: f64 },
}

impl Quotation {
    pub fn fare(&self) -> Option<&FareQuote> {
        match self {
            Self::Priced(quote) => Some(quote),
            Self::OutOfServiceArea { .. } => None,
        }
    }

    pub fn into_fare(self) -> Option<FareQuote> {
        match self {
            Self::Priced(quote) => Some(quote),
            Self::OutOfServiceArea { .. } => None,
        }
    }
}

/// How the protection models compare for one trip, plus savings against
/// the old single-rate pricing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtectionComparison {
    pub vehicle_id: String,
    pub tiered_total: Cents,
    pub linear_total: Cents,
    pub hourly_total: Cents,
    pub chosen_model: ProtectionModel,
    pub savings_vs_linear: Cents,
    pub savings_percent: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuickEstimate {
    pub vehicle_id: String,
    pub distance_miles: f64,
    pub price: Cents,
}

/// A price before and after psychological rounding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundingImpact {
    pub vehicle_id: String,
    pub strategy: RoundingStrategy,
    pub unrounded_price: Cents,
    pub rounded_price: Cents,
    /// Negative when rounding lowered the price.
    pub difference: Cents,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceDifference {
    pub vehicle_id: String,
    pub vehicle_name: String,
    pub final_price: Cents,
    pub difference: Cents,
    pub percent_difference: i64,
    pub is_base: bool,
    pub capacity: Capacity,
}

/// Vehicles priced against a base vehicle, cheapest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleComparison {
    pub base_vehicle_id: String,
    pub base_price: Cents,
    pub vehicles: Vec<PriceDifference>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteOption {
    #[serde(default)]
    pub name: Option<String>,
    pub distance_miles: f64,
    pub duration_minutes: f64,
    #[serde(default)]
    pub origin_code: Option<String>,
    #[serde(default)]
    pub destination_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub route_index: usize,
    pub route_name: String,
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub quotation: Quotation,
}

#[test]
fn out_of_service_area_serializes_with_limit() {
    let quotation = Quotation::OutOfServiceArea {
        max_service_distance: 280.0,
    };

    assert_eq!(
        serde_json::to_value(&quotation).unwrap(),
        serde_json::json!({ "status": "out_of_service_area", "max_service_distance": 280.0 })
    );
    assert!(quotation.fare().is_none());
}

#[test]
fn trip_context_fields_are_optional() {
    let context: TripContext =
        serde_json::from_str(r#"{ "trip_date_time": "2025-03-08T20:00:00" }"#).unwrap();

    assert!(context.trip_date_time.is_some());
    assert!(context.origin_code.is_none());
}
