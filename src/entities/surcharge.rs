use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::entities::{Cents, HolidayCalendar, Multiplier};
use crate::error::{configuration_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurchargeKind {
    Night,
    Weekend,
    Peak,
    Holiday,
}

/// When a surcharge is active, judged on the trip's local datetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// `start <= hour < end`, wrapping past midnight when `start > end`.
    Hours { start: u32, end: u32 },
    Weekdays { days: Vec<Weekday> },
    Holiday,
}

impl Trigger {
    pub fn matches(&self, date_time: &NaiveDateTime, holidays: &HolidayCalendar) -> bool {
        match self {
            Self::Hours { start, end } => {
                let hour = date_time.hour();
                if start <= end {
                    hour >= *start && hour < *end
                } else {
                    hour >= *start || hour < *end
                }
            }
            Self::Weekdays { days } => days.contains(&date_time.weekday()),
            Self::Holiday => holidays.contains(&date_time.date()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurchargeRule {
    pub kind: SurchargeKind,
    pub trigger: Trigger,
    pub multiplier: Multiplier,
}

impl SurchargeRule {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.multiplier.is_markup() {
            return Err(configuration_error(format!(
                "{:?} surcharge multiplier must exceed 1.0",
                self.kind
            )));
        }

        match &self.trigger {
            Trigger::Hours { start, end } if *start > 23 || *end > 24 || start == end => Err(
                configuration_error(format!("{:?} surcharge has an invalid hour range", self.kind)),
            ),
            Trigger::Weekdays { days } if days.is_empty() => Err(configuration_error(format!(
                "{:?} surcharge has no weekdays",
                self.kind
            ))),
            _ => Ok(()),
        }
    }
}

/// One surcharge as it contributed to a quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedSurcharge {
    pub kind: SurchargeKind,
    pub multiplier: Multiplier,
    pub dollar_amount: Cents,
}

/// Surcharges that would apply at a given moment, without a price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurgeStatus {
    pub active: bool,
    pub rules: Vec<SurchargeRule>,
    pub total_multiplier: f64,
}

impl SurgeStatus {
    pub fn new(rules: Vec<SurchargeRule>) -> Self {
        Self {
            active: !rules.is_empty(),
            total_multiplier: rules.iter().map(|r| f64::from(r.multiplier)).product(),
            rules,
        }
    }
}

#[test]
fn night_hours_wrap_midnight() {
    use chrono::NaiveDate;

    let night = Trigger::Hours { start: 22, end: 6 };
    let holidays = HolidayCalendar::default();
    let day = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();

    assert!(night.matches(&day.and_hms_opt(23, 30, 0).unwrap(), &holidays));
    assert!(night.matches(&day.and_hms_opt(5, 59, 0).unwrap(), &holidays));
    assert!(!night.matches(&day.and_hms_opt(6, 0, 0).unwrap(), &holidays));
    assert!(!night.matches(&day.and_hms_opt(21, 59, 0).unwrap(), &holidays));
}

#[test]
fn peak_hours_exclude_end() {
    use chrono::NaiveDate;

    let peak = Trigger::Hours { start: 7, end: 9 };
    let holidays = HolidayCalendar::default();
    let day = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();

    assert!(peak.matches(&day.and_hms_opt(7, 0, 0).unwrap(), &holidays));
    assert!(peak.matches(&day.and_hms_opt(8, 59, 0).unwrap(), &holidays));
    assert!(!peak.matches(&day.and_hms_opt(9, 0, 0).unwrap(), &holidays));
}

#[test]
fn weekday_trigger_parses_from_json() {
    let trigger: Trigger =
        serde_json::from_str(r#"{"type":"weekdays","days":["Sat","Sun"]}"#).unwrap();

    assert_eq!(
        trigger,
        Trigger::Weekdays {
            days: vec![Weekday::Sat, Weekday::Sun]
        }
    );
}

#[test]
fn rule_validation_rejects_discounts() {
    let rule = SurchargeRule {
        kind: SurchargeKind::Night,
        trigger: Trigger::Hours { start: 22, end: 6 },
        multiplier: Multiplier::from_basis_points(9_000),
    };

    assert!(rule.validate().is_err());
}

#[test]
fn surge_status_multiplies_rules() {
    let status = SurgeStatus::new(vec![
        SurchargeRule {
            kind: SurchargeKind::Night,
            trigger: Trigger::Hours { start: 22, end: 6 },
            multiplier: Multiplier::from_basis_points(11_500),
        },
        SurchargeRule {
            kind: SurchargeKind::Holiday,
            trigger: Trigger::Holiday,
            multiplier: Multiplier::from_basis_points(12_500),
        },
    ]);

    assert!(status.active);
    assert!((status.total_multiplier - 1.4375).abs() < 1e-9);
    assert!(!SurgeStatus::new(vec![]).active);
}
