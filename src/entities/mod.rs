mod holiday;
mod money;
mod quote;
mod rounding;
mod route;
mod surcharge;
mod tariff;
mod vehicle;

pub use holiday::{parse_date, HolidayCalendar};
pub use money::{Cents, Multiplier};
pub use quote::{
    FareBreakdown, FareQuote, PriceDifference, ProtectionComparison, ProtectionModel,
    QuickEstimate, Quotation, RoundingImpact, RouteEstimate, RouteOption, TripContext,
    VehicleComparison,
};
pub use rounding::{RoundingPolicy, RoundingStrategy};
pub use route::{route_key, PopularRoute};
pub use surcharge::{AppliedSurcharge, SurchargeKind, SurchargeRule, SurgeStatus, Trigger};
pub use tariff::Tariff;
pub use vehicle::{
    airport_fee_factor, Capacity, PriceTier, TierCharge, TieredFare, VehicleClass, VehicleUpdate,
};
