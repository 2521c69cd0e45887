use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::entities::{
    route_key, Capacity, Cents, HolidayCalendar, Multiplier, PopularRoute, PriceTier,
    RoundingPolicy, SurchargeKind, SurchargeRule, SurgeStatus, Trigger, VehicleClass,
};
use crate::error::{configuration_error, unknown_vehicle_error, Error};

/// Everything a quote depends on. A tariff is never edited while quotes
/// read it; administrative changes build a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub vehicles: BTreeMap<String, VehicleClass>,
    #[serde(default)]
    pub popular_routes: BTreeMap<String, PopularRoute>,
    pub surcharges: Vec<SurchargeRule>,
    #[serde(default)]
    pub holidays: HolidayCalendar,
    #[serde(default)]
    pub rounding: RoundingPolicy,
    pub cancellation_fee: Cents,
}

impl Tariff {
    pub fn vehicle(&self, id: &str) -> Result<&VehicleClass, Error> {
        self.vehicles.get(id).ok_or_else(|| unknown_vehicle_error(id))
    }

    pub fn popular_route(
        &self,
        origin_code: &str,
        destination_code: &str,
    ) -> Option<&PopularRoute> {
        self.popular_routes
            .get(&route_key(origin_code, destination_code))
    }

    pub fn active_surcharges(&self, date_time: &NaiveDateTime) -> Vec<&SurchargeRule> {
        self.surcharges
            .iter()
            .filter(|rule| rule.trigger.matches(date_time, &self.holidays))
            .collect()
    }

    pub fn surge_status(&self, date_time: &NaiveDateTime) -> SurgeStatus {
        SurgeStatus::new(
            self.active_surcharges(date_time)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    pub fn vehicles_for_capacity(&self, passenger_count: u32) -> Vec<String> {
        self.vehicles
            .iter()
            .filter(|(_, vehicle)| vehicle.fits(passenger_count))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.vehicles.is_empty() {
            return Err(configuration_error("tariff has no vehicles".into()));
        }

        for (id, vehicle) in &self.vehicles {
            vehicle.validate(id)?;
        }

        for (key, route) in &self.popular_routes {
            if *key != key.to_uppercase() {
                return Err(configuration_error(format!(
                    "route key {} must be upper case",
                    key
                )));
            }

            for (vehicle_id, rate) in &route.flat_rates {
                if !self.vehicles.contains_key(vehicle_id) {
                    return Err(configuration_error(format!(
                        "route {} prices unknown vehicle {}",
                        key, vehicle_id
                    )));
                }

                if *rate <= Cents::ZERO {
                    return Err(configuration_error(format!(
                        "route {} has no positive rate for {}",
                        key, vehicle_id
                    )));
                }
            }
        }

        for rule in &self.surcharges {
            rule.validate()?;
        }

        if self.cancellation_fee < Cents::ZERO || self.rounding.threshold < Cents::ZERO {
            return Err(configuration_error("negative fee or threshold".into()));
        }

        Ok(())
    }

    /// The tariff the service runs with when no file is configured.
    pub fn standard() -> Self {
        let vehicles = BTreeMap::from([
            (
                "tesla".to_string(),
                VehicleClass {
                    display_name: "Tesla Model Y".into(),
                    price_tiers: standard_tiers([325, 285, 245, 215], Some(280.0)),
                    airport_fee_base: Cents::from_dollars(10),
                    hourly_protection_rate: Cents::from_dollars(100),
                    capacity: Capacity {
                        max_passengers: 4,
                        max_bags: 4,
                    },
                    max_service_distance: Some(280.0),
                },
            ),
            (
                "escalade".to_string(),
                VehicleClass {
                    display_name: "Cadillac Escalade".into(),
                    price_tiers: standard_tiers([450, 395, 345, 295], Some(280.0)),
                    airport_fee_base: Cents::from_dollars(15),
                    hourly_protection_rate: Cents::from_dollars(125),
                    capacity: Capacity {
                        max_passengers: 7,
                        max_bags: 8,
                    },
                    max_service_distance: Some(280.0),
                },
            ),
            (
                "sprinter".to_string(),
                VehicleClass {
                    display_name: "Mercedes Sprinter".into(),
                    price_tiers: standard_tiers([625, 550, 485, 425], None),
                    airport_fee_base: Cents::from_dollars(25),
                    hourly_protection_rate: Cents::from_dollars(150),
                    capacity: Capacity {
                        max_passengers: 12,
                        max_bags: 15,
                    },
                    max_service_distance: None,
                },
            ),
        ]);

        let mut popular_routes = BTreeMap::new();
        for (origin, destination, distance, rates) in [
            ("MIA", "MCO", 240.0, [450, 650, 850]),
            ("MIA", "TPA", 280.0, [520, 750, 950]),
            ("FLL", "PBI", 45.0, [120, 165, 220]),
        ] {
            let flat_rates: BTreeMap<String, Cents> = ["tesla", "escalade", "sprinter"]
                .iter()
                .zip(rates)
                .map(|(id, dollars)| (id.to_string(), Cents::from_dollars(dollars)))
                .collect();

            popular_routes.insert(
                route_key(origin, destination),
                PopularRoute {
                    description: format!("{} to {}", airport_city(origin), airport_city(destination)),
                    distance_miles: distance,
                    flat_rates: flat_rates.clone(),
                },
            );
            popular_routes.insert(
                route_key(destination, origin),
                PopularRoute {
                    description: format!("{} to {}", airport_city(destination), airport_city(origin)),
                    distance_miles: distance,
                    flat_rates,
                },
            );
        }

        let surcharges = vec![
            SurchargeRule {
                kind: SurchargeKind::Night,
                trigger: Trigger::Hours { start: 22, end: 6 },
                multiplier: Multiplier::from_basis_points(11_500),
            },
            SurchargeRule {
                kind: SurchargeKind::Weekend,
                trigger: Trigger::Weekdays {
                    days: vec![Weekday::Sat, Weekday::Sun],
                },
                multiplier: Multiplier::from_basis_points(11_000),
            },
            SurchargeRule {
                kind: SurchargeKind::Peak,
                trigger: Trigger::Hours { start: 7, end: 9 },
                multiplier: Multiplier::from_basis_points(12_000),
            },
            SurchargeRule {
                kind: SurchargeKind::Holiday,
                trigger: Trigger::Holiday,
                multiplier: Multiplier::from_basis_points(12_500),
            },
        ];

        let holidays = [
            (2025, 1, 1),
            (2025, 7, 4),
            (2025, 11, 27),
            (2025, 12, 25),
            (2026, 1, 1),
            (2026, 7, 4),
            (2026, 11, 26),
            (2026, 12, 25),
        ]
        .into_iter()
        .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect();

        Self {
            vehicles,
            popular_routes,
            surcharges,
            holidays,
            rounding: RoundingPolicy::default(),
            cancellation_fee: Cents::from_dollars(25),
        }
    }
}

/// Local, medium, long and very long distance bands.
fn standard_tiers(rates: [i64; 4], max_service_distance: Option<f64>) -> Vec<PriceTier> {
    vec![
        PriceTier::new(0.0, Some(15.0), Cents(rates[0])),
        PriceTier::new(15.0, Some(50.0), Cents(rates[1])),
        PriceTier::new(50.0, Some(100.0), Cents(rates[2])),
        PriceTier::new(100.0, max_service_distance, Cents(rates[3])),
    ]
}

fn airport_city(code: &str) -> &'static str {
    match code {
        "MIA" => "Miami",
        "MCO" => "Orlando",
        "TPA" => "Tampa",
        "FLL" => "Fort Lauderdale",
        "PBI" => "West Palm Beach",
        _ => "Unknown",
    }
}

#[test]
fn standard_tariff_is_valid() {
    let tariff = Tariff::standard();

    assert!(tariff.validate().is_ok());
    assert_eq!(tariff.vehicles.len(), 3);
    assert_eq!(tariff.popular_routes.len(), 6);
}

#[test]
fn popular_route_lookup_ignores_case() {
    let tariff = Tariff::standard();
    let route = tariff.popular_route("mia", "mco").unwrap();

    assert_eq!(route.description, "Miami to Orlando");
    assert_eq!(route.flat_rate("tesla"), Some(Cents::from_dollars(450)));
    assert!(tariff.popular_route("MIA", "JFK").is_none());
}

#[test]
fn unknown_vehicle_is_rejected() {
    assert_eq!(Tariff::standard().vehicle("limo").unwrap_err().code, 102);
}

#[test]
fn vehicles_for_capacity_filters_small_cars() {
    let tariff = Tariff::standard();

    assert_eq!(tariff.vehicles_for_capacity(4).len(), 3);
    assert_eq!(tariff.vehicles_for_capacity(7), vec!["escalade", "sprinter"]);
    assert_eq!(tariff.vehicles_for_capacity(13), Vec::<String>::new());
}

#[test]
fn surge_status_on_holiday_weekend_night() {
    let tariff = Tariff::standard();
    // 2026-07-04 is a Saturday
    let date_time = NaiveDate::from_ymd_opt(2026, 7, 4)
        .unwrap()
        .and_hms_opt(23, 0, 0)
        .unwrap();

    let kinds: Vec<SurchargeKind> = tariff
        .surge_status(&date_time)
        .rules
        .iter()
        .map(|rule| rule.kind)
        .collect();

    assert_eq!(
        kinds,
        vec![SurchargeKind::Night, SurchargeKind::Weekend, SurchargeKind::Holiday]
    );
}

#[test]
fn route_for_unknown_vehicle_fails_validation() {
    let mut tariff = Tariff::standard();
    tariff
        .popular_routes
        .get_mut("MIA-MCO")
        .unwrap()
        .flat_rates
        .insert("limo".into(), Cents::from_dollars(900));

    assert_eq!(tariff.validate().unwrap_err().code, 104);
}

#[test]
fn tariff_round_trips_through_json() {
    let tariff = Tariff::standard();
    let json = serde_json::to_string(&tariff).unwrap();

    assert_eq!(serde_json::from_str::<Tariff>(&json).unwrap(), tariff);
}
