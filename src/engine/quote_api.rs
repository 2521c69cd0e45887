use super::Engine;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    api::QuoteAPI,
    calculator,
    entities::{
        Cents, FareQuote, ProtectionComparison, QuickEstimate, Quotation, RoundingImpact,
        RouteEstimate, RouteOption, SurgeStatus, TripContext, VehicleComparison,
    },
    error::Error,
};

fn log_rejection(err: Error) -> Error {
    if matches!(err.code, 102 | 103) {
        tracing::warn!("{}", err.message);
    }

    err
}

#[async_trait]
impl QuoteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn quote(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Quotation, Error> {
        let tariff = self.snapshot()?;

        calculator::quote(
            &tariff,
            vehicle_id,
            distance_miles,
            duration_minutes,
            &context,
        )
        .map_err(log_rejection)
    }

    #[tracing::instrument(skip(self))]
    async fn quote_within_capacity(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Quotation, Error> {
        let tariff = self.snapshot()?;

        calculator::quote_within_capacity(
            &tariff,
            vehicle_id,
            distance_miles,
            duration_minutes,
            &context,
        )
        .map_err(log_rejection)
    }

    #[tracing::instrument(skip(self))]
    async fn compare_vehicles(
        &self,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Vec<FareQuote>, Error> {
        let tariff = self.snapshot()?;

        calculator::compare_vehicles(&tariff, distance_miles, duration_minutes, &context)
    }

    #[tracing::instrument(skip(self))]
    async fn compare_with_base(
        &self,
        base_vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Option<VehicleComparison>, Error> {
        let tariff = self.snapshot()?;

        calculator::compare_with_base(
            &tariff,
            base_vehicle_id,
            distance_miles,
            duration_minutes,
            &context,
        )
        .map_err(log_rejection)
    }

    #[tracing::instrument(skip(self, routes), fields(routes = routes.len()))]
    async fn estimate_routes(
        &self,
        vehicle_id: &str,
        routes: Vec<RouteOption>,
        context: TripContext,
    ) -> Result<Vec<RouteEstimate>, Error> {
        let tariff = self.snapshot()?;

        calculator::estimate_routes(&tariff, vehicle_id, &routes, &context).map_err(log_rejection)
    }

    #[tracing::instrument(skip(self))]
    async fn surge_status(&self, date_time: NaiveDateTime) -> Result<SurgeStatus, Error> {
        Ok(self.snapshot()?.surge_status(&date_time))
    }

    #[tracing::instrument(skip(self))]
    async fn capacity_check(&self, vehicle_id: &str, passenger_count: u32) -> Result<bool, Error> {
        let tariff = self.snapshot()?;

        calculator::capacity_check(&tariff, vehicle_id, passenger_count).map_err(log_rejection)
    }

    #[tracing::instrument(skip(self))]
    async fn vehicles_for_capacity(&self, passenger_count: u32) -> Result<Vec<String>, Error> {
        Ok(self.snapshot()?.vehicles_for_capacity(passenger_count))
    }

    #[tracing::instrument(skip(self))]
    async fn protection_comparison(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
    ) -> Result<ProtectionComparison, Error> {
        let tariff = self.snapshot()?;

        calculator::protection_comparison(&tariff, vehicle_id, distance_miles, duration_minutes)
            .map_err(log_rejection)
    }

    #[tracing::instrument(skip(self))]
    async fn quick_estimate(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
    ) -> Result<Option<QuickEstimate>, Error> {
        let tariff = self.snapshot()?;

        calculator::quick_estimate(&tariff, vehicle_id, distance_miles).map_err(log_rejection)
    }

    #[tracing::instrument(skip(self))]
    async fn rounding_impact(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
    ) -> Result<Option<RoundingImpact>, Error> {
        let tariff = self.snapshot()?;

        calculator::rounding_impact(
            &tariff,
            vehicle_id,
            distance_miles,
            duration_minutes,
            &TripContext::default(),
        )
        .map_err(log_rejection)
    }

    #[tracing::instrument(skip(self))]
    async fn cancellation_fee(&self) -> Result<Cents, Error> {
        Ok(self.snapshot()?.cancellation_fee)
    }
}

#[test]
fn quote_uses_live_tariff() {
    use crate::entities::Tariff;

    let engine = Engine::new(Tariff::standard()).unwrap();

    let quotation =
        tokio_test::block_on(engine.quote("tesla", 12.0, 25.0, TripContext::default())).unwrap();

    assert_eq!(quotation.fare().unwrap().final_price, Cents::from_dollars(49));
}

#[test]
fn unknown_vehicle_is_an_error() {
    use crate::entities::Tariff;

    let engine = Engine::new(Tariff::standard()).unwrap();

    let err = tokio_test::block_on(engine.quote("limo", 12.0, 25.0, TripContext::default()))
        .unwrap_err();

    assert_eq!(err.code, 102);
}

#[test]
fn cancellation_fee_defaults_to_25_dollars() {
    use crate::entities::Tariff;

    let engine = Engine::new(Tariff::standard()).unwrap();

    assert_eq!(
        tokio_test::block_on(engine.cancellation_fee()).unwrap(),
        Cents::from_dollars(25)
    );
}

#[test]
fn quotes_see_whole_snapshots_during_updates() {
    use crate::api::TariffAPI;
    use crate::entities::{Tariff, VehicleUpdate};
    use std::thread;

    let engine = Engine::new(Tariff::standard()).unwrap();
    let update = VehicleUpdate {
        hourly_protection_rate: Some(Cents::from_dollars(500)),
        ..VehicleUpdate::default()
    };

    // 12 miles in 20 minutes: $49 tiered before the update, $169 hourly after.
    let prices: Vec<Cents> = thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..50)
                        .map(|_| {
                            tokio_test::block_on(engine.quote(
                                "tesla",
                                12.0,
                                20.0,
                                TripContext::default(),
                            ))
                            .unwrap()
                            .fare()
                            .unwrap()
                            .final_price
                        })
                        .collect::<Vec<Cents>>()
                })
            })
            .collect();

        tokio_test::block_on(engine.update_vehicle_config("tesla", update)).unwrap();

        readers
            .into_iter()
            .flat_map(|reader| reader.join().unwrap())
            .collect()
    });

    for price in prices {
        assert!(price == Cents::from_dollars(49) || price == Cents::from_dollars(169));
    }
}

#[test]
fn capacity_follows_the_live_tariff() {
    use crate::api::TariffAPI;
    use crate::entities::{Capacity, Tariff, VehicleUpdate};

    let engine = Engine::new(Tariff::standard()).unwrap();
    let party = TripContext {
        passenger_count: Some(6),
        ..TripContext::default()
    };

    let err =
        tokio_test::block_on(engine.quote_within_capacity("tesla", 12.0, 20.0, party.clone()))
            .unwrap_err();
    assert_eq!(err.code, 103);

    let update = VehicleUpdate {
        capacity: Some(Capacity {
            max_passengers: 6,
            max_bags: 4,
        }),
        ..VehicleUpdate::default()
    };
    tokio_test::block_on(engine.update_vehicle_config("tesla", update)).unwrap();

    let quotation =
        tokio_test::block_on(engine.quote_within_capacity("tesla", 12.0, 20.0, party)).unwrap();
    assert_eq!(quotation.fare().unwrap().final_price, Cents::from_dollars(49));
}
