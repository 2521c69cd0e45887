use super::Engine;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    api::TariffAPI,
    entities::{RoundingPolicy, VehicleClass, VehicleUpdate},
    error::{invalid_input_error, unknown_vehicle_error, Error},
};

#[async_trait]
impl TariffAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn get_vehicle_config(&self, vehicle_id: &str) -> Result<VehicleClass, Error> {
        Ok(self.snapshot()?.vehicle(vehicle_id)?.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn list_vehicles(&self) -> Result<BTreeMap<String, VehicleClass>, Error> {
        Ok(self.snapshot()?.vehicles.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn update_vehicle_config(
        &self,
        vehicle_id: &str,
        update: VehicleUpdate,
    ) -> Result<VehicleClass, Error> {
        let vehicle = self.revise(|tariff| {
            let vehicle = tariff.vehicles.get_mut(vehicle_id).ok_or_else(|| {
                tracing::warn!("update for unknown vehicle {}", vehicle_id);
                unknown_vehicle_error(vehicle_id)
            })?;

            *vehicle = vehicle.merged(update);

            Ok(vehicle.clone())
        })?;

        tracing::info!("vehicle {} updated", vehicle_id);

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self))]
    async fn add_holiday(&self, date: NaiveDate) -> Result<bool, Error> {
        let added = self.revise(|tariff| Ok(tariff.holidays.add(date)))?;

        if added {
            tracing::info!("holiday {} added", date);
        }

        Ok(added)
    }

    #[tracing::instrument(skip(self))]
    async fn remove_holiday(&self, date: NaiveDate) -> Result<bool, Error> {
        let removed = self.revise(|tariff| Ok(tariff.holidays.remove(&date)))?;

        if removed {
            tracing::info!("holiday {} removed", date);
        }

        Ok(removed)
    }

    #[tracing::instrument(skip(self))]
    async fn list_holidays(&self) -> Result<Vec<NaiveDate>, Error> {
        Ok(self.snapshot()?.holidays.dates())
    }

    #[tracing::instrument(skip(self))]
    async fn set_rounding(&self, policy: RoundingPolicy) -> Result<RoundingPolicy, Error> {
        if policy.threshold.0 < 0 {
            return Err(invalid_input_error());
        }

        self.revise(|tariff| {
            tariff.rounding = policy;
            Ok(())
        })?;

        tracing::info!(strategy = ?policy.strategy, "rounding policy changed");

        Ok(policy)
    }
}

#[cfg(test)]
fn standard_engine() -> Engine {
    Engine::new(crate::entities::Tariff::standard()).unwrap()
}

#[test]
fn partial_update_keeps_other_fields() {
    use crate::entities::Cents;

    let engine = standard_engine();
    let update = VehicleUpdate {
        airport_fee_base: Some(Cents::from_dollars(12)),
        ..VehicleUpdate::default()
    };

    let vehicle = tokio_test::block_on(engine.update_vehicle_config("tesla", update)).unwrap();

    assert_eq!(vehicle.airport_fee_base, Cents::from_dollars(12));
    assert_eq!(vehicle.display_name, "Tesla Model Y");
    assert_eq!(
        tokio_test::block_on(engine.get_vehicle_config("tesla")).unwrap(),
        vehicle
    );
}

#[test]
fn invalid_update_is_rejected_whole() {
    use crate::entities::{Cents, PriceTier};

    let engine = standard_engine();
    let before = tokio_test::block_on(engine.get_vehicle_config("tesla")).unwrap();

    // rising rate in the second tier, with a valid fee change alongside
    let update = VehicleUpdate {
        airport_fee_base: Some(Cents::from_dollars(12)),
        price_tiers: Some(vec![
            PriceTier::new(0.0, Some(15.0), Cents(325)),
            PriceTier::new(15.0, Some(280.0), Cents(400)),
        ]),
        ..VehicleUpdate::default()
    };

    let err = tokio_test::block_on(engine.update_vehicle_config("tesla", update)).unwrap_err();

    assert_eq!(err.code, 104);
    assert_eq!(
        tokio_test::block_on(engine.get_vehicle_config("tesla")).unwrap(),
        before
    );
}

#[test]
fn updating_unknown_vehicle_fails() {
    let engine = standard_engine();

    let err =
        tokio_test::block_on(engine.update_vehicle_config("limo", VehicleUpdate::default()))
            .unwrap_err();

    assert_eq!(err.code, 102);
}

#[test]
fn holidays_change_surge_status() {
    use crate::api::QuoteAPI;

    let engine = standard_engine();
    let date = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
    let noon = date.and_hms_opt(12, 0, 0).unwrap();

    assert!(!tokio_test::block_on(engine.surge_status(noon)).unwrap().active);

    assert!(tokio_test::block_on(engine.add_holiday(date)).unwrap());
    assert!(!tokio_test::block_on(engine.add_holiday(date)).unwrap());
    assert!(tokio_test::block_on(engine.surge_status(noon)).unwrap().active);
    assert!(tokio_test::block_on(engine.list_holidays())
        .unwrap()
        .contains(&date));

    assert!(tokio_test::block_on(engine.remove_holiday(date)).unwrap());
    assert!(!tokio_test::block_on(engine.remove_holiday(date)).unwrap());
    assert!(!tokio_test::block_on(engine.surge_status(noon)).unwrap().active);
}

#[test]
fn rounding_can_be_switched_off() {
    use crate::api::QuoteAPI;
    use crate::entities::{Cents, RoundingStrategy, TripContext};

    let engine = standard_engine();
    let policy = RoundingPolicy {
        strategy: RoundingStrategy::Disabled,
        threshold: Cents::from_dollars(10),
    };

    tokio_test::block_on(engine.set_rounding(policy)).unwrap();

    let quotation =
        tokio_test::block_on(engine.quote("tesla", 12.0, 25.0, TripContext::default())).unwrap();

    assert_eq!(quotation.fare().unwrap().final_price, Cents(4_650));
}
