pub mod holidays;
pub mod pricing;
pub mod quotes;
pub mod vehicles;
