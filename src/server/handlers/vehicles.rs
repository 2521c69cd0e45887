use std::collections::BTreeMap;

use axum::extract::{Extension, Json, Path, Query};
use serde::{Deserialize, Serialize};

use crate::entities::{
    ProtectionComparison, QuickEstimate, RoundingImpact, VehicleClass, VehicleUpdate,
};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Debug, Serialize, Deserialize)]
pub struct SavingsParams {
    distance_miles: f64,
    duration_minutes: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EstimateParams {
    distance_miles: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CapacityCheck {
    vehicle_id: String,
    passenger_count: u32,
    fits: bool,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
) -> Result<Json<BTreeMap<String, VehicleClass>>, Error> {
    let vehicles = api.list_vehicles().await?;

    Ok(vehicles.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
) -> Result<Json<VehicleClass>, Error> {
    let vehicle = api.get_vehicle_config(&id).await?;

    Ok(vehicle.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
    Json(update): Json<VehicleUpdate>,
) -> Result<Json<VehicleClass>, Error> {
    let vehicle = api.update_vehicle_config(&id, update).await?;

    Ok(vehicle.into())
}

pub async fn savings(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
    Query(params): Query<SavingsParams>,
) -> Result<Json<ProtectionComparison>, Error> {
    let comparison = api
        .protection_comparison(&id, params.distance_miles, params.duration_minutes)
        .await?;

    Ok(comparison.into())
}

pub async fn estimate(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
    Query(params): Query<EstimateParams>,
) -> Result<Json<Option<QuickEstimate>>, Error> {
    let estimate = api.quick_estimate(&id, params.distance_miles).await?;

    Ok(estimate.into())
}

pub async fn rounding_impact(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
    Query(params): Query<SavingsParams>,
) -> Result<Json<Option<RoundingImpact>>, Error> {
    let impact = api
        .rounding_impact(&id, params.distance_miles, params.duration_minutes)
        .await?;

    Ok(impact.into())
}

pub async fn check_capacity(
    Extension(api): Extension<DynAPI>,
    Path((id, passengers)): Path<(String, u32)>,
) -> Result<Json<CapacityCheck>, Error> {
    let fits = api.capacity_check(&id, passengers).await?;

    Ok(CapacityCheck {
        vehicle_id: id,
        passenger_count: passengers,
        fits,
    }
    .into())
}

pub async fn for_capacity(
    Extension(api): Extension<DynAPI>,
    Path(passengers): Path<u32>,
) -> Result<Json<Vec<String>>, Error> {
    let vehicle_ids = api.vehicles_for_capacity(passengers).await?;

    Ok(vehicle_ids.into())
}

#[cfg(test)]
fn test_api() -> DynAPI {
    use crate::engine::Engine;
    use crate::entities::Tariff;
    use std::sync::Arc;

    Arc::new(Engine::new(Tariff::standard()).unwrap())
}

#[test]
fn update_then_find_returns_new_config() {
    use crate::entities::Cents;

    let api = test_api();
    let change: VehicleUpdate =
        serde_json::from_str(r#"{ "hourly_protection_rate": 11000 }"#).unwrap();

    tokio_test::block_on(update(
        Extension(api.clone()),
        Path("tesla".to_string()),
        Json(change),
    ))
    .unwrap();

    let Json(vehicle) =
        tokio_test::block_on(find(Extension(api), Path("tesla".to_string()))).unwrap();

    assert_eq!(vehicle.hourly_protection_rate, Cents(11_000));
}

#[test]
fn check_capacity_reports_fit() {
    let Json(check) = tokio_test::block_on(check_capacity(
        Extension(test_api()),
        Path(("escalade".to_string(), 8)),
    ))
    .unwrap();

    assert!(!check.fits);
}

#[test]
fn savings_for_unknown_vehicle_fails() {
    let err = tokio_test::block_on(savings(
        Extension(test_api()),
        Path("limo".to_string()),
        Query(SavingsParams {
            distance_miles: 20.0,
            duration_minutes: 30.0,
        }),
    ))
    .unwrap_err();

    assert_eq!(err.code, 102);
}

#[test]
fn estimate_prices_distance_only() {
    use crate::entities::Cents;

    let Json(estimate) = tokio_test::block_on(estimate(
        Extension(test_api()),
        Path("tesla".to_string()),
        Query(EstimateParams {
            distance_miles: 12.0,
        }),
    ))
    .unwrap();

    assert_eq!(estimate.unwrap().price, Cents(4_900));
}

#[test]
fn rounding_impact_reports_both_prices() {
    use crate::entities::Cents;

    let Json(impact) = tokio_test::block_on(rounding_impact(
        Extension(test_api()),
        Path("tesla".to_string()),
        Query(SavingsParams {
            distance_miles: 12.0,
            duration_minutes: 20.0,
        }),
    ))
    .unwrap();

    let impact = impact.unwrap();
    assert_eq!(impact.unrounded_price, Cents(4_650));
    assert_eq!(impact.rounded_price, Cents(4_900));
    assert_eq!(impact.difference, Cents(250));
}
