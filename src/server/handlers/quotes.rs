use axum::extract::{Extension, Json};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::{
    FareQuote, Quotation, RouteEstimate, RouteOption, TripContext, VehicleComparison,
};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateParams {
    vehicle_id: String,
    distance_miles: f64,
    duration_minutes: f64,
    #[serde(flatten)]
    context: TripContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompareParams {
    distance_miles: f64,
    duration_minutes: f64,
    #[serde(flatten)]
    context: TripContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompareWithBaseParams {
    base_vehicle_id: String,
    distance_miles: f64,
    duration_minutes: f64,
    #[serde(flatten)]
    context: TripContext,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EstimateRoutesParams {
    vehicle_id: String,
    routes: Vec<RouteOption>,
    #[serde(default)]
    trip_date_time: Option<NaiveDateTime>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CreateParams>,
) -> Result<Json<Quotation>, Error> {
    let quotation = api
        .quote_within_capacity(
            &params.vehicle_id,
            params.distance_miles,
            params.duration_minutes,
            params.context,
        )
        .await?;

    Ok(quotation.into())
}

pub async fn compare(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CompareParams>,
) -> Result<Json<Vec<FareQuote>>, Error> {
    let quotes = api
        .compare_vehicles(
            params.distance_miles,
            params.duration_minutes,
            params.context,
        )
        .await?;

    Ok(quotes.into())
}

pub async fn compare_with_base(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CompareWithBaseParams>,
) -> Result<Json<Option<VehicleComparison>>, Error> {
    let comparison = api
        .compare_with_base(
            &params.base_vehicle_id,
            params.distance_miles,
            params.duration_minutes,
            params.context,
        )
        .await?;

    Ok(comparison.into())
}

pub async fn estimate_routes(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<EstimateRoutesParams>,
) -> Result<Json<Vec<RouteEstimate>>, Error> {
    let context = TripContext {
        trip_date_time: params.trip_date_time,
        ..TripContext::default()
    };

    let estimates = api
        .estimate_routes(&params.vehicle_id, params.routes, context)
        .await?;

    Ok(estimates.into())
}

#[cfg(test)]
fn test_api() -> DynAPI {
    use crate::engine::Engine;
    use crate::entities::Tariff;
    use std::sync::Arc;

    Arc::new(Engine::new(Tariff::standard()).unwrap())
}

#[test]
fn create_rejects_too_many_passengers() {
    let params: CreateParams = serde_json::from_value(serde_json::json!({
        "vehicle_id": "tesla",
        "distance_miles": 12.0,
        "duration_minutes": 25.0,
        "passenger_count": 6
    }))
    .unwrap();

    let err = tokio_test::block_on(create(Extension(test_api()), Json(params))).unwrap_err();

    assert_eq!(err.code, 103);
}

#[test]
fn create_prices_popular_route() {
    use crate::entities::{Cents, ProtectionModel};

    let params: CreateParams = serde_json::from_value(serde_json::json!({
        "vehicle_id": "tesla",
        "distance_miles": 240,
        "duration_minutes": 210,
        "origin_code": "MIA",
        "destination_code": "MCO",
        "passenger_count": 3
    }))
    .unwrap();

    let Json(quotation) =
        tokio_test::block_on(create(Extension(test_api()), Json(params))).unwrap();
    let fare = quotation.fare().unwrap();

    // $450 flat plus a quarter of the $10 airport fee
    assert_eq!(fare.protection_model, ProtectionModel::RouteFlat);
    assert_eq!(fare.base_fare, Cents(45_250));
}

#[test]
fn compare_lists_cheapest_first() {
    let params: CompareParams = serde_json::from_value(serde_json::json!({
        "distance_miles": 20.0,
        "duration_minutes": 30.0
    }))
    .unwrap();

    let Json(quotes) =
        tokio_test::block_on(compare(Extension(test_api()), Json(params))).unwrap();
    let ids: Vec<&str> = quotes.iter().map(|q| q.vehicle_id.as_str()).collect();

    assert_eq!(ids, vec!["tesla", "escalade", "sprinter"]);
}

#[test]
fn estimate_routes_applies_trip_time_to_every_route() {
    let params: EstimateRoutesParams = serde_json::from_value(serde_json::json!({
        "vehicle_id": "escalade",
        "trip_date_time": "2025-03-08T23:30:00",
        "routes": [
            { "name": "Turnpike", "distance_miles": 30.0, "duration_minutes": 35.0 },
            { "name": "Local", "distance_miles": 24.0, "duration_minutes": 50.0 }
        ]
    }))
    .unwrap();

    let Json(estimates) =
        tokio_test::block_on(estimate_routes(Extension(test_api()), Json(params))).unwrap();

    assert_eq!(estimates.len(), 2);
    for estimate in estimates {
        assert_eq!(estimate.quotation.fare().unwrap().applied_surcharges.len(), 2);
    }
}

#[test]
fn compare_with_base_is_empty_when_base_cannot_serve() {
    let params: CompareWithBaseParams = serde_json::from_value(serde_json::json!({
        "base_vehicle_id": "tesla",
        "distance_miles": 300.0,
        "duration_minutes": 300.0
    }))
    .unwrap();

    let Json(comparison) =
        tokio_test::block_on(compare_with_base(Extension(test_api()), Json(params))).unwrap();

    assert!(comparison.is_none());
}
