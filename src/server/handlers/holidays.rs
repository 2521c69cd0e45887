use axum::extract::{Extension, Json, Path};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::parse_date;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateParams {
    date: String,
}

/// `changed` is false when the calendar already was in the requested state.
#[derive(Debug, Serialize, Deserialize)]
pub struct HolidayChange {
    date: NaiveDate,
    changed: bool,
}

pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<NaiveDate>>, Error> {
    let holidays = api.list_holidays().await?;

    Ok(holidays.into())
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CreateParams>,
) -> Result<Json<HolidayChange>, Error> {
    let date = parse_date(&params.date)?;
    let changed = api.add_holiday(date).await?;

    Ok(HolidayChange { date, changed }.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Path(date): Path<String>,
) -> Result<Json<HolidayChange>, Error> {
    let date = parse_date(&date)?;
    let changed = api.remove_holiday(date).await?;

    Ok(HolidayChange { date, changed }.into())
}

#[test]
fn create_rejects_malformed_date() {
    use crate::engine::Engine;
    use crate::entities::Tariff;
    use std::sync::Arc;

    let api: DynAPI = Arc::new(Engine::new(Tariff::standard()).unwrap());
    let params = CreateParams {
        date: "July 4th".into(),
    };

    let err = tokio_test::block_on(create(Extension(api), Json(params))).unwrap_err();

    assert_eq!(err.code, 101);
}

#[test]
fn delete_reports_whether_date_was_listed() {
    use crate::engine::Engine;
    use crate::entities::Tariff;
    use std::sync::Arc;

    let api: DynAPI = Arc::new(Engine::new(Tariff::standard()).unwrap());

    let Json(first) =
        tokio_test::block_on(delete(Extension(api.clone()), Path("2025-12-25".into()))).unwrap();
    let Json(second) =
        tokio_test::block_on(delete(Extension(api.clone()), Path("2025-12-25".into()))).unwrap();

    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(tokio_test::block_on(api.list_holidays()).unwrap().len(), 7);
}
