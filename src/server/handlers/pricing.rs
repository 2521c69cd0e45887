use axum::extract::{Extension, Json, Query};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::{Cents, RoundingPolicy, SurgeStatus};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Debug, Serialize, Deserialize)]
pub struct SurgeParams {
    date_time: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancellationFee {
    cancellation_fee: Cents,
}

pub async fn surge(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<SurgeParams>,
) -> Result<Json<SurgeStatus>, Error> {
    let status = api.surge_status(params.date_time).await?;

    Ok(status.into())
}

pub async fn set_rounding(
    Extension(api): Extension<DynAPI>,
    Json(policy): Json<RoundingPolicy>,
) -> Result<Json<RoundingPolicy>, Error> {
    let policy = api.set_rounding(policy).await?;

    Ok(policy.into())
}

pub async fn cancellation_fee(
    Extension(api): Extension<DynAPI>,
) -> Result<Json<CancellationFee>, Error> {
    let cancellation_fee = api.cancellation_fee().await?;

    Ok(CancellationFee { cancellation_fee }.into())
}

#[test]
fn surge_reports_peak_hour() {
    use crate::engine::Engine;
    use crate::entities::{SurchargeKind, Tariff};
    use std::sync::Arc;

    let api: DynAPI = Arc::new(Engine::new(Tariff::standard()).unwrap());
    let params: SurgeParams =
        serde_json::from_str(r#"{ "date_time": "2025-03-11T08:15:00" }"#).unwrap();

    let Json(status) = tokio_test::block_on(surge(Extension(api), Query(params))).unwrap();

    assert!(status.active);
    assert_eq!(status.rules[0].kind, SurchargeKind::Peak);
    assert!((status.total_multiplier - 1.2).abs() < 1e-9);
}

#[test]
fn rounding_policy_uses_strategy_names() {
    use crate::engine::Engine;
    use crate::entities::{RoundingStrategy, Tariff};
    use std::sync::Arc;

    let api: DynAPI = Arc::new(Engine::new(Tariff::standard()).unwrap());
    let policy: RoundingPolicy =
        serde_json::from_str(r#"{ "strategy": "always9", "threshold": 2000 }"#).unwrap();

    let Json(applied) =
        tokio_test::block_on(set_rounding(Extension(api), Json(policy))).unwrap();

    assert_eq!(applied.strategy, RoundingStrategy::AlwaysNine);
    assert_eq!(applied.threshold, Cents(2_000));
}
