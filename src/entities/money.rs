use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// An amount of money in US cents.
///
/// Arithmetic that can leave the `i64` range is checked and yields `None`;
/// callers turn that into an input error.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(pub i64);

const BASIS_POINTS: i128 = 10_000;

/// Half-up division for non-negative numerators.
fn div_round(numerator: i128, denominator: i128) -> Option<i64> {
    let rounded = numerator.checked_add(denominator / 2)? / denominator;

    i64::try_from(rounded).ok()
}

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// For literal amounts; use `checked_from_dollars` on computed values.
    pub fn from_dollars(dollars: i64) -> Self {
        Cents(dollars * 100)
    }

    pub fn checked_from_dollars(dollars: i64) -> Option<Self> {
        dollars.checked_mul(100).map(Cents)
    }

    /// `rate` per unit applied to a fractional quantity, rounded to the cent.
    pub fn times(self, quantity: f64) -> Option<Self> {
        let amount = (self.0 as f64 * quantity).round();

        // `i64::MAX as f64` is 2^63, one past the largest i64
        if amount.is_finite() && amount.abs() < i64::MAX as f64 {
            Some(Cents(amount as i64))
        } else {
            None
        }
    }

    pub fn checked_add(self, rhs: Cents) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Cents)
    }

    pub fn scale(self, factor: Multiplier) -> Option<Self> {
        div_round(
            self.0 as i128 * factor.basis_points() as i128,
            BASIS_POINTS,
        )
        .map(Cents)
    }

    /// The portion of `scale` above 1.0, i.e. `self × (factor − 1)`.
    pub fn markup(self, factor: Multiplier) -> Option<Self> {
        let excess = factor.basis_points() as i128 - BASIS_POINTS;

        div_round(self.0 as i128 * excess, BASIS_POINTS).map(Cents)
    }

    /// Applies every factor to the same amount and rounds once at the end.
    pub fn compound<'a, I>(self, factors: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Multiplier>,
    {
        let mut numerator = self.0 as i128;
        let mut denominator: i128 = 1;

        for factor in factors {
            numerator = numerator.checked_mul(factor.basis_points() as i128)?;
            denominator = denominator.checked_mul(BASIS_POINTS)?;
        }

        div_round(numerator, denominator).map(Cents)
    }

    /// Nearest whole dollar, halves rounding up.
    pub fn whole_dollars(self) -> i64 {
        let carry = if self.0 % 100 >= 50 { 1 } else { 0 };

        self.0 / 100 + carry
    }
}

/// Only used between non-negative amounts, which cannot overflow.
impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();

        if abs % 100 == 0 {
            write!(f, "{}${}", sign, abs / 100)
        } else {
            write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
        }
    }
}

/// A positive price factor held in basis points; `1.15` is stored as 11500.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ONE: Multiplier = Multiplier(10_000);

    pub const fn from_basis_points(basis_points: u32) -> Self {
        Multiplier(basis_points)
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }

    pub fn is_markup(&self) -> bool {
        self.0 > Self::ONE.0
    }
}

impl TryFrom<f64> for Multiplier {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value <= 0.0 || value > 100.0 {
            return Err(format!("multiplier out of range: {}", value));
        }

        Ok(Multiplier((value * 10_000.0).round() as u32))
    }
}

impl From<Multiplier> for f64 {
    fn from(m: Multiplier) -> f64 {
        m.0 as f64 / 10_000.0
    }
}

#[test]
fn compound_rounds_once() {
    let base = Cents(27_125);
    let weekend = Multiplier::from_basis_points(11_000);

    assert_eq!(base.compound(&[weekend]), Some(Cents(29_838)));
    assert_eq!(base.markup(weekend), Some(Cents(2_713)));

    let night = Multiplier::from_basis_points(11_500);
    assert_eq!(Cents(45_250).compound(&[night, weekend]), Some(Cents(57_241)));
}

#[test]
fn whole_dollars_rounds_half_up() {
    assert_eq!(Cents(4_650).whole_dollars(), 47);
    assert_eq!(Cents(4_649).whole_dollars(), 46);
    assert_eq!(Cents(30_525).whole_dollars(), 305);
}

#[test]
fn display_drops_zero_cents() {
    assert_eq!(Cents(24_900).to_string(), "$249");
    assert_eq!(Cents(3_333).to_string(), "$33.33");
}

#[test]
fn multiplier_parses_decimal_factors() {
    let m: Multiplier = serde_json::from_str("1.15").unwrap();
    assert_eq!(m.basis_points(), 11_500);
    assert!(m.is_markup());

    assert!(serde_json::from_str::<Multiplier>("-1.0").is_err());
}

#[test]
fn out_of_range_amounts_are_none() {
    let weekend = Multiplier::from_basis_points(11_000);
    let largest = Cents(i64::MAX);

    assert_eq!(Cents(325).times(1e300), None);
    assert_eq!(Cents(325).times(f64::INFINITY), None);
    assert_eq!(Cents(325).times(2.0), Some(Cents(650)));
    assert_eq!(largest.checked_add(Cents(1)), None);
    assert_eq!(largest.scale(weekend), None);
    assert_eq!(largest.compound(&[weekend]), None);
    assert_eq!(largest.compound(&Vec::<Multiplier>::new()), Some(largest));
    assert_eq!(Cents::checked_from_dollars(i64::MAX / 10), None);
}
