//! Psychological price endings.
//!
//! A price is rounded to the nearest whole-dollar amount with the right
//! ending inside its own price band, never below the threshold. The result
//! is in the same band with the right ending, so rounding it again leaves it
//! untouched.

use serde::{Deserialize, Serialize};

use crate::entities::Cents;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingStrategy {
    /// Ending chosen by price band.
    Auto,
    #[serde(rename = "always9")]
    AlwaysNine,
    #[serde(rename = "always5")]
    AlwaysFive,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingPolicy {
    pub strategy: RoundingStrategy,
    /// Prices below this are left alone.
    pub threshold: Cents,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            strategy: RoundingStrategy::Auto,
            threshold: Cents::from_dollars(10),
        }
    }
}

impl RoundingPolicy {
    /// `None` when the rounded amount does not fit in `Cents`.
    pub fn apply(&self, price: Cents) -> Option<Cents> {
        if self.strategy == RoundingStrategy::Disabled || price < self.threshold {
            return Some(price);
        }

        let dollars = price.whole_dollars();
        let (band_low, band_high) = self.band(dollars);
        let low = band_low.max(self.threshold_dollars());

        let below = (low..=dollars).rev().find(|&n| self.has_ending(n));
        let above = match band_high {
            Some(high) => (dollars..=high).find(|&n| self.has_ending(n)),
            None => (dollars..dollars.saturating_add(100)).find(|&n| self.has_ending(n)),
        };

        let chosen = match (below, above) {
            (Some(low), Some(high)) if high - dollars < dollars - low => high,
            (Some(low), _) => low,
            (None, Some(high)) => high,
            (None, None) => dollars,
        };

        Cents::checked_from_dollars(chosen)
    }

    /// Smallest whole-dollar amount at or above the threshold.
    fn threshold_dollars(&self) -> i64 {
        let threshold = self.threshold.0.max(0);

        threshold / 100 + if threshold % 100 > 0 { 1 } else { 0 }
    }

    /// Inclusive dollar range of the band `dollars` falls in.
    fn band(&self, dollars: i64) -> (i64, Option<i64>) {
        match self.strategy {
            RoundingStrategy::Auto => match dollars {
                d if d < 50 => (0, Some(49)),
                d if d < 150 => (50, Some(149)),
                d if d < 500 => (150, Some(499)),
                _ => (500, None),
            },
            _ => (0, None),
        }
    }

    fn has_ending(&self, dollars: i64) -> bool {
        match self.strategy {
            RoundingStrategy::AlwaysNine => dollars % 10 == 9,
            RoundingStrategy::AlwaysFive => dollars % 10 == 5,
            RoundingStrategy::Auto => match dollars {
                d if d < 50 => d % 10 == 9,
                d if d < 150 => d % 10 == 5,
                d if d < 500 => d % 10 == 9,
                d => d % 100 == 45 || d % 100 == 95,
            },
            RoundingStrategy::Disabled => true,
        }
    }
}

#[cfg(test)]
fn auto(dollars: i64) -> i64 {
    RoundingPolicy::default()
        .apply(Cents::from_dollars(dollars))
        .unwrap()
        .whole_dollars()
}

#[test]
fn auto_uses_nines_under_fifty() {
    assert_eq!(auto(47), 49);
    assert_eq!(auto(33), 29);
    assert_eq!(auto(30), 29);
    assert_eq!(auto(23), 19);
}

#[test]
fn auto_uses_fives_in_mid_range() {
    assert_eq!(auto(73), 75);
    assert_eq!(auto(127), 125);
    assert_eq!(auto(79), 75);
    assert_eq!(auto(53), 55);
    assert_eq!(auto(52), 55);
    assert_eq!(auto(50), 55);
    assert_eq!(auto(149), 145);
}

#[test]
fn auto_uses_nines_up_to_five_hundred() {
    assert_eq!(auto(247), 249);
    assert_eq!(auto(243), 239);
    assert_eq!(auto(250), 249);
    assert_eq!(auto(150), 159);
    assert_eq!(auto(498), 499);
}

#[test]
fn auto_moves_to_nearest_nine_when_ending_in_five() {
    let policy = RoundingPolicy::default();
    assert_eq!(policy.apply(Cents(30_525)), Some(Cents(30_900)));
}

#[test]
fn auto_premium_ends_in_forty_five_or_ninety_five() {
    assert_eq!(auto(523), 545);
    assert_eq!(auto(510), 545);
    assert_eq!(auto(500), 545);
    assert_eq!(auto(560), 545);
    assert_eq!(auto(580), 595);
    assert_eq!(auto(1250), 1245);
    assert_eq!(auto(1275), 1295);
}

#[test]
fn below_threshold_is_untouched() {
    let policy = RoundingPolicy::default();
    assert_eq!(policy.apply(Cents(999)), Some(Cents(999)));
    assert_eq!(policy.apply(Cents(1_020)), Some(Cents(1_900)));
    assert_eq!(policy.apply(Cents(1_000)), Some(Cents(1_900)));
}

#[test]
fn fixed_strategies() {
    let nine = RoundingPolicy {
        strategy: RoundingStrategy::AlwaysNine,
        ..RoundingPolicy::default()
    };
    let five = RoundingPolicy {
        strategy: RoundingStrategy::AlwaysFive,
        ..RoundingPolicy::default()
    };

    assert_eq!(nine.apply(Cents::from_dollars(73)), Some(Cents::from_dollars(69)));
    assert_eq!(nine.apply(Cents::from_dollars(1_250)), Some(Cents::from_dollars(1_249)));
    assert_eq!(five.apply(Cents::from_dollars(247)), Some(Cents::from_dollars(245)));
    assert_eq!(five.apply(Cents::from_dollars(243)), Some(Cents::from_dollars(245)));
}

#[test]
fn disabled_keeps_cents() {
    let policy = RoundingPolicy {
        strategy: RoundingStrategy::Disabled,
        ..RoundingPolicy::default()
    };
    assert_eq!(policy.apply(Cents(30_525)), Some(Cents(30_525)));
}

#[test]
fn rounding_is_idempotent() {
    for strategy in [
        RoundingStrategy::Auto,
        RoundingStrategy::AlwaysNine,
        RoundingStrategy::AlwaysFive,
        RoundingStrategy::Disabled,
    ] {
        let policy = RoundingPolicy {
            strategy,
            ..RoundingPolicy::default()
        };

        for cents in (0..250_000).step_by(37) {
            let once = policy.apply(Cents(cents)).unwrap();
            assert_eq!(policy.apply(once), Some(once), "{:?} at {}", strategy, cents);
        }
    }
}

#[test]
fn strategy_names_match_configuration() {
    let strategy: RoundingStrategy = serde_json::from_str(r#""always9""#).unwrap();
    assert_eq!(strategy, RoundingStrategy::AlwaysNine);
}

#[test]
fn auto_keeps_prices_in_their_band() {
    let policy = RoundingPolicy::default();

    for cents in (1_000..250_000).step_by(13) {
        let price = Cents(cents);
        let dollars = price.whole_dollars();
        let rounded = policy.apply(price).unwrap().whole_dollars();

        assert!(rounded >= 10, "{} fell below the threshold", price);
        match dollars {
            d if d < 50 => assert_eq!(rounded % 10, 9),
            d if d < 150 => assert!(rounded >= 50 && rounded % 10 == 5, "{}", price),
            d if d < 500 => assert!(rounded >= 150 && rounded % 10 == 9, "{}", price),
            _ => assert!(rounded % 100 == 45 || rounded % 100 == 95, "{}", price),
        }
    }
}

#[test]
fn rounding_largest_price_stays_in_range() {
    let rounded = RoundingPolicy::default().apply(Cents(i64::MAX)).unwrap();

    assert_eq!(rounded.whole_dollars() % 100, 45);
}
