use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::entities::{
    Cents, FareQuote, ProtectionComparison, QuickEstimate, Quotation, RoundingImpact,
    RoundingPolicy, RouteEstimate, RouteOption, SurgeStatus, TripContext, VehicleClass,
    VehicleComparison, VehicleUpdate,
};
use crate::error::Error;

#[async_trait]
pub trait QuoteAPI {
    async fn quote(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Quotation, Error>;

    /// `quote`, refusing a `passenger_count` the vehicle cannot carry.
    async fn quote_within_capacity(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Quotation, Error>;

    async fn compare_vehicles(
        &self,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Vec<FareQuote>, Error>;

    async fn compare_with_base(
        &self,
        base_vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
        context: TripContext,
    ) -> Result<Option<VehicleComparison>, Error>;

    async fn estimate_routes(
        &self,
        vehicle_id: &str,
        routes: Vec<RouteOption>,
        context: TripContext,
    ) -> Result<Vec<RouteEstimate>, Error>;

    async fn surge_status(&self, date_time: NaiveDateTime) -> Result<SurgeStatus, Error>;

    async fn capacity_check(&self, vehicle_id: &str, passenger_count: u32) -> Result<bool, Error>;

    async fn vehicles_for_capacity(&self, passenger_count: u32) -> Result<Vec<String>, Error>;

    async fn protection_comparison(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
    ) -> Result<ProtectionComparison, Error>;

    async fn quick_estimate(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
    ) -> Result<Option<QuickEstimate>, Error>;

    async fn rounding_impact(
        &self,
        vehicle_id: &str,
        distance_miles: f64,
        duration_minutes: f64,
    ) -> Result<Option<RoundingImpact>, Error>;

    async fn cancellation_fee(&self) -> Result<Cents, Error>;
}

/// Administrative changes. Each one replaces the live tariff as a whole or
/// not at all.
#[async_trait]
pub trait TariffAPI {
    async fn get_vehicle_config(&self, vehicle_id: &str) -> Result<VehicleClass, Error>;

    async fn list_vehicles(&self) -> Result<BTreeMap<String, VehicleClass>, Error>;

    async fn update_vehicle_config(
        &self,
        vehicle_id: &str,
        update: VehicleUpdate,
    ) -> Result<VehicleClass, Error>;

    async fn add_holiday(&self, date: NaiveDate) -> Result<bool, Error>;

    async fn remove_holiday(&self, date: NaiveDate) -> Result<bool, Error>;

    async fn list_holidays(&self) -> Result<Vec<NaiveDate>, Error>;

    async fn set_rounding(&self, policy: RoundingPolicy) -> Result<RoundingPolicy, Error>;
}

pub trait API: QuoteAPI + TariffAPI {}
