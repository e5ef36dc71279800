//! Floor marker and slider geometry.
//!
//! The slider runs from 0 to the total available balance. Collateral locked by debt
//! is shown as a floor the handle cannot cross. When anything is locked the floor
//! is padded by [`FLOOR_PADDING`] so the user cannot stop exactly on the boundary.

use rust_decimal::Decimal;
use serde::Serialize;

use balanced_common::config::{FLOOR_PADDING, SLIDER_RANGE_MAX_BOTTOM_THRESHOLD};
use balanced_common::units::round_dp;

use crate::chain::Position;

/// Floor marker with the default padding: `min(locked + (locked > 0 ? 1 : 0), total)`.
pub fn compute_floor_marker(locked: Decimal, total: Decimal) -> Decimal {
    compute_floor_marker_with_padding(locked, total, FLOOR_PADDING)
}

/// Floor marker with an explicit padding.
pub fn compute_floor_marker_with_padding(locked: Decimal, total: Decimal, padding: Decimal) -> Decimal {
    let padded = if locked > Decimal::ZERO {
        locked + padding
    } else {
        locked
    };
    padded.min(total)
}

/// Locked-collateral bar shown above the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockBar {
    /// Only shown when something is locked.
    pub show: bool,
    /// Floor marker as a percentage of the total.
    pub percent: Decimal,
}

impl LockBar {
    pub fn new(position: &Position, floor: Decimal) -> Self {
        let percent = if position.total_available().is_zero() {
            Decimal::ZERO
        } else {
            floor / position.total_available() * Decimal::ONE_HUNDRED
        };
        Self {
            show: !position.locked().is_zero(),
            percent,
        }
    }
}

/// Range and handle placement for the collateral slider, at display precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliderBounds {
    pub min: Decimal,
    pub max: Decimal,
    /// Initial handle position (deposited amount).
    pub start: Decimal,
    /// Lower padding the handle cannot enter.
    pub padding_floor: Decimal,
}

impl SliderBounds {
    pub fn new(position: &Position, floor: Decimal) -> Self {
        Self::with_bottom_threshold(position, floor, SLIDER_RANGE_MAX_BOTTOM_THRESHOLD)
    }

    /// A zero-width range breaks the slider, so an empty balance uses
    /// `bottom_threshold` as the maximum.
    pub fn with_bottom_threshold(position: &Position, floor: Decimal, bottom_threshold: Decimal) -> Self {
        let max = if position.total_available().is_zero() {
            bottom_threshold
        } else {
            round_dp(position.total_available(), 2)
        };
        Self {
            min: Decimal::ZERO,
            max,
            start: round_dp(position.deposited(), 2),
            padding_floor: round_dp(floor, 2).max(Decimal::ZERO),
        }
    }

    /// Clamp a value into the reachable part of the slider.
    pub fn clamp(&self, value: Decimal) -> Decimal {
        value.max(self.padding_floor).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_floor_marker_examples() {
        assert_eq!(compute_floor_marker(d("30"), d("200")), d("31"));
        assert_eq!(compute_floor_marker(Decimal::ZERO, d("200")), Decimal::ZERO);
    }

    #[test]
    fn test_floor_marker_capped_by_total() {
        assert_eq!(compute_floor_marker(d("199.5"), d("200")), d("200"));
        assert_eq!(compute_floor_marker(d("200"), d("200")), d("200"));
    }

    #[test]
    fn test_floor_marker_bounds() {
        let cases = [
            ("0", "0"),
            ("0", "10"),
            ("0.01", "10"),
            ("5", "5.5"),
            ("9.999", "10"),
            ("42", "1000"),
        ];
        for (locked, total) in cases {
            let floor = compute_floor_marker(d(locked), d(total));
            assert!(floor <= d(total), "floor {floor} above total {total}");
            assert!(floor <= d(locked) + Decimal::ONE, "floor {floor} above locked+1");
            assert!(floor >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_custom_padding() {
        assert_eq!(compute_floor_marker_with_padding(d("30"), d("200"), d("0.5")), d("30.5"));
        assert_eq!(compute_floor_marker_with_padding(d("30"), d("200"), Decimal::ZERO), d("30"));
    }

    #[test]
    fn test_lock_bar() {
        let position = Position::new(d("100"), d("200"), d("30")).unwrap();
        let bar = LockBar::new(&position, compute_floor_marker(d("30"), d("200")));
        assert!(bar.show);
        assert_eq!(bar.percent, d("15.5"));

        let empty = Position::default();
        let bar = LockBar::new(&empty, Decimal::ZERO);
        assert!(!bar.show);
        assert_eq!(bar.percent, Decimal::ZERO);
    }

    #[test]
    fn test_slider_bounds() {
        let position = Position::new(d("100.456"), d("500.004"), d("30")).unwrap();
        let bounds = SliderBounds::new(&position, d("31"));
        assert_eq!(bounds.min, Decimal::ZERO);
        assert_eq!(bounds.max, d("500"));
        assert_eq!(bounds.start, d("100.46"));
        assert_eq!(bounds.padding_floor, d("31"));
        assert_eq!(bounds.clamp(d("10")), d("31"));
        assert_eq!(bounds.clamp(d("900")), d("500"));
        assert_eq!(bounds.clamp(d("250")), d("250"));
    }

    #[test]
    fn test_slider_bounds_zero_total() {
        let bounds = SliderBounds::new(&Position::default(), Decimal::ZERO);
        assert_eq!(bounds.max, d("0.000001"));
    }
}
