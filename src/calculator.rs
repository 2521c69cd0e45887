//! Fare computation over an explicit tariff snapshot.
//!
//! Every function here is pure: the same tariff and inputs give the same
//! prices. Callers hold the snapshot for the whole computation.

use crate::entities::{
    AppliedSurcharge, Cents, FareBreakdown, FareQuote, PriceDifference, ProtectionComparison,
    ProtectionModel, QuickEstimate, Quotation, RoundingImpact, RoundingPolicy, RoundingStrategy,
    RouteEstimate, RouteOption, Tariff, TripContext, VehicleComparison,
};
use crate::error::{capacity_exceeded_error, invalid_input_error, Error};

fn check_trip(distance_miles: f64, duration_minutes: f64) -> Result<(), Error> {
    let valid = |value: f64| value.is_finite() && value >= 0.0;

    if !valid(distance_miles) || !valid(duration_minutes) {
        return Err(invalid_input_error());
    }

    Ok(())
}

/// Amounts too large for `Cents` come from absurd trip inputs.
fn representable<T>(amount: Option<T>) -> Result<T, Error> {
    amount.ok_or_else(invalid_input_error)
}

/// `part / whole` as a whole percentage; zero when `whole` is zero.
fn percent_of(part: Cents, whole: Cents) -> i64 {
    if whole == Cents::ZERO {
        return 0;
    }

    (part.0 as f64 / whole.0 as f64 * 100.0).round() as i64
}

pub fn quote(
    tariff: &Tariff,
    vehicle_id: &str,
    distance_miles: f64,
    duration_minutes: f64,
    context: &TripContext,
) -> Result<Quotation, Error> {
    let vehicle = tariff.vehicle(vehicle_id)?;
    check_trip(distance_miles, duration_minutes)?;

    if let Some(max_service_distance) = vehicle.exceeded_limit(distance_miles) {
        return Ok(Quotation::OutOfServiceArea {
            max_service_distance,
        });
    }

    let route = match (&context.origin_code, &context.destination_code) {
        (Some(origin), Some(destination)) => tariff
            .popular_route(origin, destination)
            .and_then(|route| route.flat_rate(vehicle_id).map(|rate| (route, rate))),
        _ => None,
    };

    let (distance_fare, tier_charges) = match route {
        Some((_, flat_rate)) => (flat_rate, Vec::new()),
        None => {
            let tiered = representable(vehicle.tiered_fare(distance_miles))?;
            (tiered.total, tiered.charges)
        }
    };

    let airport_fee = representable(vehicle.airport_fee(distance_miles))?;
    let tiered_with_fee = representable(distance_fare.checked_add(airport_fee))?;
    let hourly_fare = representable(vehicle.hourly_fare(duration_minutes))?;

    let (base_fare, protection_model) = if hourly_fare > tiered_with_fee {
        (hourly_fare, ProtectionModel::Hourly)
    } else if route.is_some() {
        (tiered_with_fee, ProtectionModel::RouteFlat)
    } else {
        (tiered_with_fee, ProtectionModel::Tiered)
    };

    let mut applied_surcharges: Vec<AppliedSurcharge> = Vec::new();
    if let Some(date_time) = &context.trip_date_time {
        for rule in tariff.active_surcharges(date_time) {
            applied_surcharges.push(AppliedSurcharge {
                kind: rule.kind,
                multiplier: rule.multiplier,
                dollar_amount: representable(base_fare.markup(rule.multiplier))?,
            });
        }
    }

    let surcharged_price = representable(
        base_fare.compound(applied_surcharges.iter().map(|s| &s.multiplier)),
    )?;
    let final_price = representable(tariff.rounding.apply(surcharged_price))?;

    Ok(Quotation::Priced(FareQuote {
        vehicle_id: vehicle_id.to_string(),
        vehicle_name: vehicle.display_name.clone(),
        distance_miles,
        duration_minutes,
        base_fare,
        protection_model,
        applied_surcharges,
        final_price,
        breakdown: FareBreakdown {
            tier_charges,
            distance_fare,
            airport_fee,
            hourly_fare,
            popular_route: route.map(|(route, _)| route.description.clone()),
            surcharged_price,
            rounding_adjustment: final_price - surcharged_price,
        },
    }))
}

/// Like `quote`, but refuses a party larger than the vehicle holds. The
/// capacity is read from the same tariff the price comes from.
pub fn quote_within_capacity(
    tariff: &Tariff,
    vehicle_id: &str,
    distance_miles: f64,
    duration_minutes: f64,
    context: &TripContext,
) -> Result<Quotation, Error> {
    let vehicle = tariff.vehicle(vehicle_id)?;

    if let Some(passengers) = context.passenger_count {
        if !vehicle.fits(passengers) {
            return Err(capacity_exceeded_error(
                vehicle.capacity.max_passengers,
                passengers,
            ));
        }
    }

    quote(tariff, vehicle_id, distance_miles, duration_minutes, context)
}

/// Quotes every vehicle class, cheapest first. Classes that cannot serve
/// the distance are left out.
pub fn compare_vehicles(
    tariff: &Tariff,
    distance_miles: f64,
    duration_minutes: f64,
    context: &TripContext,
) -> Result<Vec<FareQuote>, Error> {
    let mut quotes = Vec::new();

    for vehicle_id in tariff.vehicles.keys() {
        let quotation = quote(tariff, vehicle_id, distance_miles, duration_minutes, context)?;

        if let Some(fare) = quotation.into_fare() {
            quotes.push(fare);
        }
    }

    quotes.sort_by_key(|q| q.final_price);

    Ok(quotes)
}

/// Every servable vehicle priced against `base_vehicle_id`. `None` when
/// the base vehicle cannot serve the distance.
pub fn compare_with_base(
    tariff: &Tariff,
    base_vehicle_id: &str,
    distance_miles: f64,
    duration_minutes: f64,
    context: &TripContext,
) -> Result<Option<VehicleComparison>, Error> {
    let base_price = match quote(
        tariff,
        base_vehicle_id,
        distance_miles,
        duration_minutes,
        context,
    )?
    .into_fare()
    {
        Some(fare) => fare.final_price,
        None => return Ok(None),
    };

    let mut vehicles = Vec::new();

    for (vehicle_id, vehicle) in &tariff.vehicles {
        let quotation = quote(tariff, vehicle_id, distance_miles, duration_minutes, context)?;
        let fare = match quotation.into_fare() {
            Some(fare) => fare,
            None => continue,
        };
        let difference = fare.final_price - base_price;

        vehicles.push(PriceDifference {
            vehicle_id: vehicle_id.clone(),
            vehicle_name: fare.vehicle_name,
            final_price: fare.final_price,
            difference,
            percent_difference: percent_of(difference, base_price),
            is_base: vehicle_id == base_vehicle_id,
            capacity: vehicle.capacity,
        });
    }

    vehicles.sort_by_key(|v| v.final_price);

    Ok(Some(VehicleComparison {
        base_vehicle_id: base_vehicle_id.to_string(),
        base_price,
        vehicles,
    }))
}

pub fn capacity_check(
    tariff: &Tariff,
    vehicle_id: &str,
    passenger_count: u32,
) -> Result<bool, Error> {
    Ok(tariff.vehicle(vehicle_id)?.fits(passenger_count))
}

pub fn protection_comparison(
    tariff: &Tariff,
    vehicle_id: &str,
    distance_miles: f64,
    duration_minutes: f64,
) -> Result<ProtectionComparison, Error> {
    let vehicle = tariff.vehicle(vehicle_id)?;
    check_trip(distance_miles, duration_minutes)?;

    let tiered = representable(vehicle.tiered_fare(distance_miles))?;
    let fee = representable(vehicle.airport_fee(distance_miles))?;
    let tiered_total = representable(tiered.total.checked_add(fee))?;

    let linear_total = match vehicle.price_tiers.first() {
        Some(tier) => representable(
            tier.rate_per_mile
                .times(distance_miles)
                .and_then(|fare| fare.checked_add(vehicle.airport_fee_base)),
        )?,
        None => tiered_total,
    };
    let hourly_total = representable(vehicle.hourly_fare(duration_minutes))?;

    let chosen_model = if hourly_total > tiered_total {
        ProtectionModel::Hourly
    } else {
        ProtectionModel::Tiered
    };
    let savings_vs_linear = linear_total - tiered_total;

    Ok(ProtectionComparison {
        vehicle_id: vehicle_id.to_string(),
        tiered_total,
        linear_total,
        hourly_total,
        chosen_model,
        savings_vs_linear,
        savings_percent: percent_of(savings_vs_linear, linear_total),
    })
}

/// Tiered fare plus airport fee, rounded for display. Ignores time, routes
/// and surcharges. `None` outside the service area.
pub fn quick_estimate(
    tariff: &Tariff,
    vehicle_id: &str,
    distance_miles: f64,
) -> Result<Option<QuickEstimate>, Error> {
    let vehicle = tariff.vehicle(vehicle_id)?;
    check_trip(distance_miles, 0.0)?;

    if vehicle.exceeded_limit(distance_miles).is_some() {
        return Ok(None);
    }

    let tiered = representable(vehicle.tiered_fare(distance_miles))?;
    let fee = representable(vehicle.airport_fee(distance_miles))?;
    let raw_price = representable(tiered.total.checked_add(fee))?;

    Ok(Some(QuickEstimate {
        vehicle_id: vehicle_id.to_string(),
        distance_miles,
        price: representable(tariff.rounding.apply(raw_price))?,
    }))
}

/// The same trip priced with and without psychological rounding. When the
/// tariff has rounding switched off, the automatic strategy is shown.
pub fn rounding_impact(
    tariff: &Tariff,
    vehicle_id: &str,
    distance_miles: f64,
    duration_minutes: f64,
    context: &TripContext,
) -> Result<Option<RoundingImpact>, Error> {
    let fare = match quote(tariff, vehicle_id, distance_miles, duration_minutes, context)?
        .into_fare()
    {
        Some(fare) => fare,
        None => return Ok(None),
    };

    let policy = match tariff.rounding.strategy {
        RoundingStrategy::Disabled => RoundingPolicy {
            strategy: RoundingStrategy::Auto,
            ..tariff.rounding
        },
        _ => tariff.rounding,
    };

    let unrounded_price = fare.breakdown.surcharged_price;
    let rounded_price = representable(policy.apply(unrounded_price))?;

    Ok(Some(RoundingImpact {
        vehicle_id: vehicle_id.to_string(),
        strategy: policy.strategy,
        unrounded_price,
        rounded_price,
        difference: rounded_price - unrounded_price,
    }))
}

/// Prices alternative routes for one vehicle, cheapest first; routes the
/// vehicle cannot serve come last.
pub fn estimate_routes(
    tariff: &Tariff,
    vehicle_id: &str,
    routes: &[RouteOption],
    context: &TripContext,
) -> Result<Vec<RouteEstimate>, Error> {
    let mut estimates = Vec::with_capacity(routes.len());

    for (index, route) in routes.iter().enumerate() {
        let route_context = TripContext {
            origin_code: route.origin_code.clone(),
            destination_code: route.destination_code.clone(),
            ..context.clone()
        };

        let quotation = quote(
            tariff,
            vehicle_id,
            route.distance_miles,
            route.duration_minutes,
            &route_context,
        )?;

        estimates.push(RouteEstimate {
            route_index: index,
            route_name: route
                .name
                .clone()
                .unwrap_or_else(|| format!("Route {}", index + 1)),
            distance_miles: route.distance_miles,
            duration_minutes: route.duration_minutes,
            quotation,
        });
    }

    estimates.sort_by_key(|e| match e.quotation.fare() {
        Some(fare) => (false, fare.final_price),
        None => (true, Cents::ZERO),
    });

    Ok(estimates)
}

#[cfg(test)]
fn saturday_at(hour: u32) -> chrono::NaiveDateTime {
    // 2025-03-08 is a Saturday
    chrono::NaiveDate::from_ymd_opt(2025, 3, 8)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[cfg(test)]
fn priced(quotation: Quotation) -> FareQuote {
    quotation.into_fare().expect("expected a priced quote")
}

#[test]
fn short_tesla_trip_uses_first_tier() {
    let tariff = Tariff::standard();
    let fare = priced(quote(&tariff, "tesla", 12.0, 20.0, &TripContext::default()).unwrap());

    assert_eq!(fare.breakdown.distance_fare, Cents(3_900));
    assert_eq!(fare.breakdown.airport_fee, Cents(750));
    assert_eq!(fare.breakdown.hourly_fare, Cents(3_333));
    assert_eq!(fare.base_fare, Cents(4_650));
    assert_eq!(fare.protection_model, ProtectionModel::Tiered);
    assert!(fare.applied_surcharges.is_empty());
    assert_eq!(fare.final_price, Cents::from_dollars(49));
}

#[test]
fn sprinter_weekend_trip_spans_two_tiers() {
    let tariff = Tariff::standard();
    let context = TripContext {
        trip_date_time: Some(saturday_at(20)),
        ..TripContext::default()
    };
    let fare = priced(quote(&tariff, "sprinter", 45.0, 60.0, &context).unwrap());

    let miles: Vec<f64> = fare.breakdown.tier_charges.iter().map(|c| c.miles).collect();
    assert_eq!(miles, vec![15.0, 30.0]);
    assert_eq!(fare.breakdown.distance_fare, Cents(25_875));
    assert_eq!(fare.breakdown.airport_fee, Cents(1_250));
    assert_eq!(fare.base_fare, Cents(27_125));
    assert_eq!(fare.applied_surcharges.len(), 1);
    assert_eq!(fare.applied_surcharges[0].dollar_amount, Cents(2_713));
    assert_eq!(fare.breakdown.surcharged_price, Cents(29_838));
    assert_eq!(fare.final_price, Cents::from_dollars(299));
}

#[test]
fn popular_route_flat_rate_replaces_tiers() {
    let tariff = Tariff::standard();
    let context = TripContext {
        trip_date_time: Some(saturday_at(23)),
        origin_code: Some("mia".into()),
        destination_code: Some("MCO".into()),
        passenger_count: Some(2),
    };
    let fare = priced(quote(&tariff, "tesla", 240.0, 240.0, &context).unwrap());

    assert!(fare.breakdown.tier_charges.is_empty());
    assert_eq!(fare.breakdown.distance_fare, Cents::from_dollars(450));
    assert_eq!(fare.breakdown.popular_route.as_deref(), Some("Miami to Orlando"));
    assert_eq!(fare.base_fare, Cents(45_250));
    assert_eq!(fare.protection_model, ProtectionModel::RouteFlat);

    let amounts: Vec<Cents> = fare.applied_surcharges.iter().map(|s| s.dollar_amount).collect();
    assert_eq!(amounts, vec![Cents(6_788), Cents(4_525)]);
    assert_eq!(fare.breakdown.surcharged_price, Cents(57_241));
    assert_eq!(fare.final_price, Cents::from_dollars(595));
}

#[test]
fn service_area_is_enforced() {
    let tariff = Tariff::standard();
    let context = TripContext::default();

    assert_eq!(
        quote(&tariff, "escalade", 300.0, 300.0, &context).unwrap(),
        Quotation::OutOfServiceArea {
            max_service_distance: 280.0
        }
    );
    assert!(quote(&tariff, "tesla", 281.0, 300.0, &context)
        .unwrap()
        .fare()
        .is_none());
    assert!(quote(&tariff, "tesla", 280.0, 300.0, &context)
        .unwrap()
        .fare()
        .is_some());
    assert!(quote(&tariff, "sprinter", 900.0, 900.0, &context)
        .unwrap()
        .fare()
        .is_some());
}

#[test]
fn invalid_requests_are_rejected() {
    let tariff = Tariff::standard();
    let context = TripContext::default();

    assert_eq!(quote(&tariff, "limo", 10.0, 10.0, &context).unwrap_err().code, 102);
    assert_eq!(quote(&tariff, "tesla", -1.0, 10.0, &context).unwrap_err().code, 101);
    assert_eq!(quote(&tariff, "tesla", 1.0, f64::NAN, &context).unwrap_err().code, 101);
    assert_eq!(quote(&tariff, "tesla", f64::INFINITY, 1.0, &context).unwrap_err().code, 101);
}

#[test]
fn hourly_protection_wins_slow_trips() {
    let tariff = Tariff::standard();
    let fare = priced(quote(&tariff, "tesla", 5.0, 90.0, &TripContext::default()).unwrap());

    assert_eq!(fare.protection_model, ProtectionModel::Hourly);
    assert_eq!(fare.base_fare, Cents(15_000));
}

#[test]
fn hourly_protection_beats_route_flat() {
    let tariff = Tariff::standard();
    let context = TripContext {
        origin_code: Some("FLL".into()),
        destination_code: Some("PBI".into()),
        ..TripContext::default()
    };
    let fare = priced(quote(&tariff, "tesla", 45.0, 180.0, &context).unwrap());

    assert_eq!(fare.protection_model, ProtectionModel::Hourly);
    assert_eq!(fare.breakdown.popular_route.as_deref(), Some("Fort Lauderdale to West Palm Beach"));
}

#[test]
fn base_fare_never_below_either_model() {
    let tariff = Tariff::standard();
    let context = TripContext::default();

    for vehicle_id in ["tesla", "escalade", "sprinter"] {
        for distance in [0.0, 3.5, 10.0, 15.0, 27.3, 50.0, 99.9, 180.0, 280.0] {
            for duration in [0.0, 15.0, 45.0, 120.0, 300.0] {
                let fare = priced(quote(&tariff, vehicle_id, distance, duration, &context).unwrap());
                let tiered_with_fee = fare
                    .breakdown
                    .distance_fare
                    .checked_add(fare.breakdown.airport_fee)
                    .unwrap();

                assert!(fare.base_fare >= fare.breakdown.hourly_fare);
                assert!(fare.base_fare >= tiered_with_fee);
            }
        }
    }
}

#[test]
fn tiers_cover_every_mile() {
    let tariff = Tariff::standard();

    for (vehicle_id, vehicle) in &tariff.vehicles {
        let limit = vehicle.max_service_distance.unwrap_or(400.0);
        let mut distance = 0.0;

        while distance <= limit {
            let attributed: f64 = vehicle
                .tiered_fare(distance)
                .unwrap()
                .charges
                .iter()
                .map(|c| c.miles)
                .sum();
            assert!(
                (attributed - distance).abs() < 1e-9,
                "{} at {} miles attributed {}",
                vehicle_id,
                distance,
                attributed
            );
            distance += 0.25;
        }
    }
}

#[test]
fn price_grows_with_distance_within_a_fee_band() {
    let tariff = Tariff::standard();
    let context = TripContext::default();

    for vehicle_id in ["tesla", "escalade"] {
        let mut previous = Cents::ZERO;
        let mut distance = 10.5;

        while distance <= 30.0 {
            let fare = priced(quote(&tariff, vehicle_id, distance, 0.0, &context).unwrap());
            let unrounded = fare.breakdown.surcharged_price;

            assert!(unrounded >= previous);
            // whole-dollar rounding plus at most $5 to the nearest ending
            assert!((fare.final_price.0 - unrounded.0).abs() <= 550);

            previous = unrounded;
            distance += 0.5;
        }
    }
}

#[test]
fn simultaneous_surcharges_share_one_base() {
    let tariff = Tariff::standard();
    let context = TripContext {
        // 2025-03-08 is a Saturday, peak hour
        trip_date_time: Some(saturday_at(8)),
        ..TripContext::default()
    };
    let fare = priced(quote(&tariff, "escalade", 40.0, 30.0, &context).unwrap());

    assert_eq!(fare.applied_surcharges.len(), 2);
    let expected = fare
        .base_fare
        .compound(&[tariff.surcharges[1].multiplier, tariff.surcharges[2].multiplier])
        .unwrap();
    assert_eq!(fare.breakdown.surcharged_price, expected);

    let peak = &fare.applied_surcharges[1];
    assert_eq!(Some(peak.dollar_amount), fare.base_fare.markup(peak.multiplier));
}

#[test]
fn compare_ranks_by_price_and_drops_unservable() {
    let tariff = Tariff::standard();
    let context = TripContext::default();

    let quotes = compare_vehicles(&tariff, 20.0, 30.0, &context).unwrap();
    let ids: Vec<&str> = quotes.iter().map(|q| q.vehicle_id.as_str()).collect();
    assert_eq!(ids, vec!["tesla", "escalade", "sprinter"]);

    let quotes = compare_vehicles(&tariff, 300.0, 300.0, &context).unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].vehicle_id, "sprinter");
}

#[test]
fn capacity_check_uses_vehicle_limits() {
    let tariff = Tariff::standard();

    assert!(capacity_check(&tariff, "tesla", 4).unwrap());
    assert!(!capacity_check(&tariff, "tesla", 5).unwrap());
    assert!(capacity_check(&tariff, "limo", 1).is_err());
}

#[test]
fn protection_comparison_reports_savings() {
    let tariff = Tariff::standard();
    let comparison = protection_comparison(&tariff, "tesla", 60.0, 60.0).unwrap();

    // 15 × 3.25 + 35 × 2.85 + 10 × 2.45 + half of the $10 fee
    assert_eq!(comparison.tiered_total, Cents(4_875 + 9_975 + 2_450 + 500));
    assert_eq!(comparison.linear_total, Cents(19_500 + 1_000));
    assert_eq!(comparison.hourly_total, Cents(10_000));
    assert_eq!(comparison.chosen_model, ProtectionModel::Tiered);
    assert_eq!(comparison.savings_vs_linear, Cents(20_500 - 17_800));
    assert_eq!(comparison.savings_percent, 13);
}

#[test]
fn route_estimates_put_unservable_routes_last() {
    let tariff = Tariff::standard();
    let routes = vec![
        RouteOption {
            name: Some("Coastal".into()),
            distance_miles: 300.0,
            duration_minutes: 320.0,
            origin_code: None,
            destination_code: None,
        },
        RouteOption {
            name: None,
            distance_miles: 30.0,
            duration_minutes: 40.0,
            origin_code: None,
            destination_code: None,
        },
        RouteOption {
            name: Some("Highway".into()),
            distance_miles: 20.0,
            duration_minutes: 25.0,
            origin_code: None,
            destination_code: None,
        },
    ];

    let estimates = estimate_routes(&tariff, "tesla", &routes, &TripContext::default()).unwrap();
    let names: Vec<&str> = estimates.iter().map(|e| e.route_name.as_str()).collect();

    assert_eq!(names, vec!["Highway", "Route 2", "Coastal"]);
    assert!(estimates[2].quotation.fare().is_none());
}

#[test]
fn holiday_weekend_night_compounds_three_surcharges() {
    use crate::entities::SurchargeKind;

    let tariff = Tariff::standard();
    // 2026-07-04 is a Saturday and a listed holiday
    let context = TripContext {
        trip_date_time: chrono::NaiveDate::from_ymd_opt(2026, 7, 4)
            .and_then(|date| date.and_hms_opt(23, 0, 0)),
        ..TripContext::default()
    };
    let fare = priced(quote(&tariff, "tesla", 20.0, 30.0, &context).unwrap());

    let kinds: Vec<SurchargeKind> = fare.applied_surcharges.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![SurchargeKind::Night, SurchargeKind::Weekend, SurchargeKind::Holiday]
    );

    assert_eq!(fare.base_fare, Cents(7_050));
    for surcharge in &fare.applied_surcharges {
        assert_eq!(
            Some(surcharge.dollar_amount),
            fare.base_fare.markup(surcharge.multiplier)
        );
    }
    let amounts: Vec<Cents> = fare.applied_surcharges.iter().map(|s| s.dollar_amount).collect();
    assert_eq!(amounts, vec![Cents(1_058), Cents(705), Cents(1_763)]);

    // 70.50 × 1.15 × 1.10 × 1.25 = 111.478125
    assert_eq!(fare.breakdown.surcharged_price, Cents(11_148));
    assert_eq!(fare.final_price, Cents::from_dollars(115));
}

#[test]
fn unrepresentable_amounts_are_invalid_input() {
    let tariff = Tariff::standard();

    let err = quote(&tariff, "sprinter", 1e17, 0.0, &TripContext::default()).unwrap_err();
    assert_eq!(err.code, 101);

    let context = TripContext {
        trip_date_time: Some(saturday_at(12)),
        ..TripContext::default()
    };
    let err = quote(&tariff, "tesla", 12.0, 1e300, &context).unwrap_err();
    assert_eq!(err.code, 101);

    assert_eq!(
        protection_comparison(&tariff, "sprinter", 1e17, 0.0).unwrap_err().code,
        101
    );
}

#[test]
fn quote_within_capacity_checks_party_size() {
    let tariff = Tariff::standard();
    let party_of = |passengers| TripContext {
        passenger_count: Some(passengers),
        ..TripContext::default()
    };

    let err = quote_within_capacity(&tariff, "tesla", 12.0, 20.0, &party_of(5)).unwrap_err();
    assert_eq!(err.code, 103);

    assert!(quote_within_capacity(&tariff, "tesla", 12.0, 20.0, &party_of(4)).is_ok());
    assert!(quote_within_capacity(&tariff, "escalade", 12.0, 20.0, &party_of(5)).is_ok());
    assert_eq!(
        quote_within_capacity(&tariff, "limo", 12.0, 20.0, &party_of(1))
            .unwrap_err()
            .code,
        102
    );
}

#[test]
fn compare_with_base_reports_differences() {
    let tariff = Tariff::standard();
    let context = TripContext::default();

    // $75, $95 and $135 after rounding
    let comparison = compare_with_base(&tariff, "tesla", 20.0, 30.0, &context)
        .unwrap()
        .unwrap();

    assert_eq!(comparison.base_price, Cents::from_dollars(75));
    let rows: Vec<(&str, Cents, i64, bool)> = comparison
        .vehicles
        .iter()
        .map(|v| {
            (
                v.vehicle_id.as_str(),
                v.difference,
                v.percent_difference,
                v.is_base,
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("tesla", Cents::ZERO, 0, true),
            ("escalade", Cents::from_dollars(20), 27, false),
            ("sprinter", Cents::from_dollars(60), 80, false)
        ]
    );
    assert_eq!(comparison.vehicles[2].capacity.max_passengers, 12);

    assert!(compare_with_base(&tariff, "escalade", 300.0, 300.0, &context)
        .unwrap()
        .is_none());
}

#[test]
fn quick_estimate_skips_time_and_surcharges() {
    let tariff = Tariff::standard();

    let estimate = quick_estimate(&tariff, "tesla", 12.0).unwrap().unwrap();
    assert_eq!(estimate.price, Cents::from_dollars(49));

    // 258.75 + 12.50 rounds to the nearest nine
    let estimate = quick_estimate(&tariff, "sprinter", 45.0).unwrap().unwrap();
    assert_eq!(estimate.price, Cents::from_dollars(269));

    assert!(quick_estimate(&tariff, "tesla", 300.0).unwrap().is_none());
    assert_eq!(quick_estimate(&tariff, "tesla", -3.0).unwrap_err().code, 101);
}

#[test]
fn rounding_impact_shows_both_prices() {
    let mut tariff = Tariff::standard();
    let context = TripContext::default();

    let impact = rounding_impact(&tariff, "tesla", 12.0, 20.0, &context)
        .unwrap()
        .unwrap();
    assert_eq!(impact.unrounded_price, Cents(4_650));
    assert_eq!(impact.rounded_price, Cents(4_900));
    assert_eq!(impact.difference, Cents(250));

    tariff.rounding.strategy = RoundingStrategy::Disabled;
    let impact = rounding_impact(&tariff, "tesla", 12.0, 20.0, &context)
        .unwrap()
        .unwrap();
    assert_eq!(impact.strategy, RoundingStrategy::Auto);
    assert_eq!(impact.rounded_price, Cents(4_900));
}

#[test]
fn identical_requests_produce_identical_quotes() {
    let tariff = Tariff::standard();
    let context = TripContext {
        trip_date_time: Some(saturday_at(23)),
        ..TripContext::default()
    };

    let first = quote(&tariff, "escalade", 40.0, 30.0, &context).unwrap();
    let second = quote(&tariff, "escalade", 40.0, 30.0, &context).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
