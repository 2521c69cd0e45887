use serde::{Deserialize, Serialize};

use crate::entities::{Cents, Multiplier};
use crate::error::{configuration_error, Error};

/// Per-mile rate for the miles falling inside `[min_miles, max_miles)`.
/// An absent `max_miles` makes the tier open ended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    pub min_miles: f64,
    pub max_miles: Option<f64>,
    pub rate_per_mile: Cents,
}

impl PriceTier {
    pub fn new(min_miles: f64, max_miles: Option<f64>, rate_per_mile: Cents) -> Self {
        Self {
            min_miles,
            max_miles,
            rate_per_mile,
        }
    }

    fn width(&self) -> Option<f64> {
        self.max_miles.map(|max| max - self.min_miles)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub max_passengers: u32,
    pub max_bags: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleClass {
    pub display_name: String,
    pub price_tiers: Vec<PriceTier>,
    pub airport_fee_base: Cents,
    pub hourly_protection_rate: Cents,
    pub capacity: Capacity,
    #[serde(default)]
    pub max_service_distance: Option<f64>,
}

/// Miles attributed to one tier and what they cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierCharge {
    pub tier: usize,
    pub miles: f64,
    pub rate_per_mile: Cents,
    pub cost: Cents,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TieredFare {
    pub total: Cents,
    pub charges: Vec<TierCharge>,
}

/// Share of the base airport fee charged for a trip of the given length.
pub fn airport_fee_factor(distance_miles: f64) -> Multiplier {
    let basis_points = if distance_miles <= 10.0 {
        10_000
    } else if distance_miles <= 30.0 {
        7_500
    } else if distance_miles <= 60.0 {
        5_000
    } else {
        2_500
    };

    Multiplier::from_basis_points(basis_points)
}

impl VehicleClass {
    /// The service-distance cap, when `distance_miles` goes past it.
    pub fn exceeded_limit(&self, distance_miles: f64) -> Option<f64> {
        self.max_service_distance.filter(|max| distance_miles > *max)
    }

    pub fn fits(&self, passenger_count: u32) -> bool {
        passenger_count <= self.capacity.max_passengers
    }

    /// Bracket-style fare: each tier's rate only applies to the miles inside it.
    /// `None` when the amount does not fit in `Cents`.
    pub fn tiered_fare(&self, distance_miles: f64) -> Option<TieredFare> {
        let mut remaining = distance_miles;
        let mut charges = Vec::new();
        let mut total = Cents::ZERO;

        for (index, tier) in self.price_tiers.iter().enumerate() {
            if remaining <= 0.0 {
                break;
            }

            let miles = match tier.width() {
                Some(width) => remaining.min(width),
                None => remaining,
            };
            let cost = tier.rate_per_mile.times(miles)?;
            total = total.checked_add(cost)?;

            charges.push(TierCharge {
                tier: index + 1,
                miles,
                rate_per_mile: tier.rate_per_mile,
                cost,
            });

            remaining -= miles;
        }

        Some(TieredFare { total, charges })
    }

    pub fn airport_fee(&self, distance_miles: f64) -> Option<Cents> {
        self.airport_fee_base.scale(airport_fee_factor(distance_miles))
    }

    pub fn hourly_fare(&self, duration_minutes: f64) -> Option<Cents> {
        self.hourly_protection_rate.times(duration_minutes / 60.0)
    }

    /// Checks tier coverage and rate progression. Run when a tariff is
    /// loaded or changed, not per quote.
    pub fn validate(&self, id: &str) -> Result<(), Error> {
        let violation = |detail: String| Err(configuration_error(format!("{}: {}", id, detail)));

        if let Some(max) = self.max_service_distance {
            if !max.is_finite() || max <= 0.0 {
                return violation(format!("invalid max service distance {}", max));
            }
        }

        if self.airport_fee_base < Cents::ZERO || self.hourly_protection_rate < Cents::ZERO {
            return violation("negative fee".into());
        }

        if self.capacity.max_passengers == 0 {
            return violation("capacity must allow at least one passenger".into());
        }

        let first = match self.price_tiers.first() {
            Some(tier) => tier,
            None => return violation("no price tiers".into()),
        };

        if first.min_miles != 0.0 {
            return violation(format!("first tier starts at mile {}", first.min_miles));
        }

        for (index, tier) in self.price_tiers.iter().enumerate() {
            if tier.rate_per_mile <= Cents::ZERO {
                return violation(format!("tier {} has no positive rate", index + 1));
            }

            if let Some(max) = tier.max_miles {
                if max <= tier.min_miles {
                    return violation(format!("tier {} is empty", index + 1));
                }
            }

            if index == 0 {
                continue;
            }

            let previous = &self.price_tiers[index - 1];

            match previous.max_miles {
                None => {
                    return violation(format!("tier {} follows an open-ended tier", index + 1))
                }
                Some(end) if end < tier.min_miles => {
                    return violation(format!(
                        "gap in tier coverage between miles {} and {}",
                        end, tier.min_miles
                    ))
                }
                Some(end) if end > tier.min_miles => {
                    return violation(format!(
                        "tiers {} and {} overlap at mile {}",
                        index,
                        index + 1,
                        tier.min_miles
                    ))
                }
                Some(_) => (),
            }

            if tier.rate_per_mile >= previous.rate_per_mile {
                return violation(format!("tier {} rate not lower than tier {}", index + 1, index));
            }
        }

        let last_end = self.price_tiers.last().and_then(|tier| tier.max_miles);
        if last_end != self.max_service_distance {
            return violation(format!(
                "tiers end at {:?} but the service distance is {:?}",
                last_end, self.max_service_distance
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_vehicle() -> VehicleClass {
    VehicleClass {
        display_name: "Test Sedan".into(),
        price_tiers: vec![
            PriceTier::new(0.0, Some(15.0), Cents(300)),
            PriceTier::new(15.0, Some(50.0), Cents(200)),
            PriceTier::new(50.0, None, Cents(100)),
        ],
        airport_fee_base: Cents(1_000),
        hourly_protection_rate: Cents(6_000),
        capacity: Capacity {
            max_passengers: 4,
            max_bags: 4,
        },
        max_service_distance: None,
    }
}

#[test]
fn tiers_are_charged_progressively() {
    let fare = test_vehicle().tiered_fare(60.0).unwrap();

    let miles: Vec<f64> = fare.charges.iter().map(|c| c.miles).collect();
    assert_eq!(miles, vec![15.0, 35.0, 10.0]);
    assert_eq!(fare.total, Cents(15 * 300 + 35 * 200 + 10 * 100));
}

#[test]
fn zero_distance_has_no_tier_charges() {
    let fare = test_vehicle().tiered_fare(0.0).unwrap();
    assert!(fare.charges.is_empty());
    assert_eq!(fare.total, Cents::ZERO);
}

#[test]
fn airport_fee_scales_down_with_distance() {
    let vehicle = test_vehicle();

    assert_eq!(vehicle.airport_fee(10.0), Some(Cents(1_000)));
    assert_eq!(vehicle.airport_fee(10.5), Some(Cents(750)));
    assert_eq!(vehicle.airport_fee(60.0), Some(Cents(500)));
    assert_eq!(vehicle.airport_fee(61.0), Some(Cents(250)));
}

#[test]
fn hourly_fare_is_prorated() {
    assert_eq!(test_vehicle().hourly_fare(90.0), Some(Cents(9_000)));
    assert_eq!(test_vehicle().hourly_fare(20.0), Some(Cents(2_000)));
}

#[test]
fn unbounded_tier_overflow_is_none() {
    assert!(test_vehicle().tiered_fare(1e17).is_none());
    assert!(test_vehicle().hourly_fare(1e300).is_none());
}

#[test]
fn validate_accepts_contiguous_tiers() {
    assert!(test_vehicle().validate("sedan").is_ok());
}

#[test]
fn validate_rejects_gap() {
    let mut vehicle = test_vehicle();
    vehicle.price_tiers[1].min_miles = 16.0;

    let err = vehicle.validate("sedan").unwrap_err();
    assert_eq!(err.code, 104);
    assert!(err.message.contains("gap"));
}

#[test]
fn validate_rejects_overlap() {
    let mut vehicle = test_vehicle();
    vehicle.price_tiers[1].min_miles = 14.0;

    assert!(vehicle.validate("sedan").unwrap_err().message.contains("overlap"));
}

#[test]
fn validate_rejects_rising_rate() {
    let mut vehicle = test_vehicle();
    vehicle.price_tiers[2].rate_per_mile = Cents(250);

    assert!(vehicle.validate("sedan").is_err());
}

#[test]
fn validate_requires_tiers_to_reach_service_distance() {
    let mut vehicle = test_vehicle();
    vehicle.max_service_distance = Some(200.0);
    assert!(vehicle.validate("sedan").is_err());

    vehicle.price_tiers[2].max_miles = Some(200.0);
    assert!(vehicle.validate("sedan").is_ok());
    assert_eq!(vehicle.exceeded_limit(200.0), None);
    assert_eq!(vehicle.exceeded_limit(200.5), Some(200.0));
}

/// Fields to overwrite on an existing vehicle class; absent fields are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub price_tiers: Option<Vec<PriceTier>>,
    #[serde(default)]
    pub airport_fee_base: Option<Cents>,
    #[serde(default)]
    pub hourly_protection_rate: Option<Cents>,
    #[serde(default)]
    pub capacity: Option<Capacity>,
    #[serde(default)]
    pub max_service_distance: Option<f64>,
}

impl VehicleClass {
    pub fn merged(&self, update: VehicleUpdate) -> VehicleClass {
        VehicleClass {
            display_name: update.display_name.unwrap_or_else(|| self.display_name.clone()),
            price_tiers: update
                .price_tiers
                .unwrap_or_else(|| self.price_tiers.clone()),
            airport_fee_base: update.airport_fee_base.unwrap_or(self.airport_fee_base),
            hourly_protection_rate: update
                .hourly_protection_rate
                .unwrap_or(self.hourly_protection_rate),
            capacity: update.capacity.unwrap_or(self.capacity),
            max_service_distance: update.max_service_distance.or(self.max_service_distance),
        }
    }
}

#[test]
fn merged_keeps_unspecified_fields() {
    let vehicle = test_vehicle();
    let merged = vehicle.merged(VehicleUpdate {
        hourly_protection_rate: Some(Cents(7_500)),
        ..VehicleUpdate::default()
    });

    assert_eq!(merged.hourly_protection_rate, Cents(7_500));
    assert_eq!(merged.price_tiers, vehicle.price_tiers);
    assert_eq!(merged.display_name, vehicle.display_name);
}
