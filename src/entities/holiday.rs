use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{invalid_input_error, Error};

/// Calendar dates that carry the holiday surcharge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayCalendar(BTreeSet<NaiveDate>);

impl HolidayCalendar {
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.0.contains(date)
    }

    /// Returns false when the date was already present.
    pub fn add(&mut self, date: NaiveDate) -> bool {
        self.0.insert(date)
    }

    /// Returns false when the date was not present.
    pub fn remove(&mut self, date: &NaiveDate) -> bool {
        self.0.remove(date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<NaiveDate> for HolidayCalendar {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        HolidayCalendar(iter.into_iter().collect())
    }
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| invalid_input_error())
}

#[test]
fn add_and_remove_report_changes() {
    let date = parse_date("2025-07-04").unwrap();
    let mut calendar = HolidayCalendar::default();

    assert!(calendar.add(date));
    assert!(!calendar.add(date));
    assert!(calendar.contains(&date));
    assert!(calendar.remove(&date));
    assert!(!calendar.remove(&date));
}

#[test]
fn parse_date_rejects_other_formats() {
    assert!(parse_date("07/04/2025").is_err());
    assert!(parse_date("2025-02-30").is_err());
}

#[test]
fn serializes_as_iso_dates() {
    let calendar: HolidayCalendar = vec![parse_date("2025-12-25").unwrap()]
        .into_iter()
        .collect();

    assert_eq!(serde_json::to_string(&calendar).unwrap(), r#"["2025-12-25"]"#);
}
