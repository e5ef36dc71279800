//! Two-field adjustment state and the adjustment it proposes.
//!
//! The panel shows one total split into a deposited (left) and a wallet (right)
//! field. Whichever field the user touched last is independent and keeps the raw
//! typed text; the other one is always `total - independent`. Values are not
//! clamped here: the slider enforces floor and ceiling visually and out-of-range
//! typed values are reconciled when confirming.

use rust_decimal::Decimal;
use serde::Serialize;

use balanced_common::error::AppError;
use balanced_common::types::{Direction, Field, InputSource};
use balanced_common::units::{parse_decimal, to_fixed};

use crate::chain::ExchangeRatio;

/// Display text for an amount held on-chain: `"0"` or two decimals.
pub fn display_amount(value: Decimal) -> String {
    if value.is_zero() {
        "0".to_string()
    } else {
        to_fixed(value, 2)
    }
}

/// Parsed values of both fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldValues {
    pub left: Decimal,
    pub right: Decimal,
}

impl FieldValues {
    pub fn get(&self, field: Field) -> Decimal {
        match field {
            Field::Left => self.left,
            Field::Right => self.right,
        }
    }
}

/// Text shown in both fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedAmounts {
    pub left: String,
    pub right: String,
}

/// Editing state of the collateral panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjustmentState {
    independent_field: Field,
    typed_value: String,
    is_adjusting: bool,
    input_source: InputSource,
}

impl AdjustmentState {
    /// Fresh, non-editing state showing `deposited` in the left field.
    pub fn new(deposited: Decimal) -> Self {
        Self {
            independent_field: Field::Left,
            typed_value: display_amount(deposited),
            is_adjusting: false,
            input_source: InputSource::Text,
        }
    }

    pub fn independent_field(&self) -> Field {
        self.independent_field
    }

    pub fn dependent_field(&self) -> Field {
        self.independent_field.opposite()
    }

    pub fn typed_value(&self) -> &str {
        &self.typed_value
    }

    pub fn is_adjusting(&self) -> bool {
        self.is_adjusting
    }

    pub fn input_source(&self) -> InputSource {
        self.input_source
    }

    /// Typed input into the current independent field.
    pub fn set_independent_value(&mut self, raw: &str) {
        self.set_field_input(self.independent_field, raw);
    }

    /// Typed input into a specific field, which becomes the independent one.
    pub fn set_field_input(&mut self, field: Field, raw: &str) {
        self.independent_field = field;
        self.typed_value = raw.to_string();
        self.input_source = InputSource::Text;
    }

    /// Drag input. The slider always moves the deposited side.
    pub fn set_from_slide_position(&mut self, position: Decimal) {
        self.independent_field = Field::Left;
        self.typed_value = position.to_string();
        self.input_source = InputSource::Slider;
    }

    pub fn enable_adjusting(&mut self) {
        self.is_adjusting = true;
    }

    /// Leave editing and show the on-chain deposited amount again.
    pub fn cancel_adjusting(&mut self, deposited: Decimal) {
        self.is_adjusting = false;
        self.reset_to(deposited);
    }

    /// Rewrite the left field with the on-chain deposited amount.
    pub fn reset_to(&mut self, deposited: Decimal) {
        self.set_field_input(Field::Left, &display_amount(deposited));
    }

    /// Parsed independent value; bad input counts as zero.
    pub fn independent_value(&self) -> Decimal {
        parse_decimal(&self.typed_value)
    }

    /// Both field values for a given total.
    pub fn values(&self, total: Decimal) -> FieldValues {
        let independent = self.independent_value();
        let dependent = total - independent;
        match self.independent_field {
            Field::Left => FieldValues {
                left: independent,
                right: dependent,
            },
            Field::Right => FieldValues {
                left: dependent,
                right: independent,
            },
        }
    }

    /// Proposed deposited amount after the adjustment.
    pub fn proposed_deposited(&self, total: Decimal) -> Decimal {
        self.values(total).left
    }

    /// Field texts: the independent field keeps what the user typed.
    pub fn formatted_amounts(&self, total: Decimal) -> FormattedAmounts {
        let dependent = display_amount(self.values(total).get(self.dependent_field()));
        match self.independent_field {
            Field::Left => FormattedAmounts {
                left: self.typed_value.clone(),
                right: dependent,
            },
            Field::Right => FormattedAmounts {
                left: dependent,
                right: self.typed_value.clone(),
            },
        }
    }

    /// Position the slider handle should follow, if it did not produce the input.
    pub fn slider_value(&self, total: Decimal) -> Option<Decimal> {
        match self.input_source {
            InputSource::Text => Some(self.proposed_deposited(total)),
            InputSource::Slider => None,
        }
    }
}

/// Transaction implied by the current input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProposedAdjustment {
    pub direction: Direction,
    /// Signed `proposed - current` in the primary unit.
    pub difference: Decimal,
    /// `|difference|` in the primary unit.
    pub magnitude: Decimal,
    /// Magnitude in the secondary unit, withdrawals only.
    pub magnitude_secondary: Option<Decimal>,
}

impl ProposedAdjustment {
    pub fn is_noop(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Amount handed to the submission layer, in the unit its entry point expects.
    pub fn submission_amount(&self) -> Decimal {
        match self.direction {
            Direction::Deposit => self.magnitude,
            Direction::Withdraw => self.magnitude_secondary.unwrap_or(self.magnitude),
        }
    }
}

/// Compare the proposed deposited amount with the current one.
///
/// Deposits are submitted in the primary unit; withdrawals are submitted in the
/// secondary unit, hence the conversion on that side only.
pub fn compute_proposed_adjustment(
    proposed: Decimal,
    current: Decimal,
    ratio: ExchangeRatio,
) -> Result<ProposedAdjustment, AppError> {
    let difference = proposed
        .checked_sub(current)
        .ok_or_else(|| AppError::Validation(format!("adjustment from {current} to {proposed} overflows")))?;
    let magnitude = difference.abs();
    if difference > Decimal::ZERO {
        Ok(ProposedAdjustment {
            direction: Direction::Deposit,
            difference,
            magnitude,
            magnitude_secondary: None,
        })
    } else {
        Ok(ProposedAdjustment {
            direction: Direction::Withdraw,
            difference,
            magnitude,
            magnitude_secondary: Some(ratio.to_secondary(magnitude)?),
        })
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
    fn test_dependent_follows_independent() {
        let mut state = AdjustmentState::new(d("100"));
        state.enable_adjusting();
        state.set_independent_value("150");

        let values = state.values(d("500"));
        assert_eq!(values.left, d("150"));
        assert_eq!(values.right, d("350"));
        assert_eq!(
            state.formatted_amounts(d("500")),
            FormattedAmounts {
                left: "150".to_string(),
                right: "350.00".to_string()
            }
        );
    }

    #[test]
    fn test_dependent_is_decimal_exact() {
        let mut state = AdjustmentState::new(Decimal::ZERO);
        let total = d("0.3");
        for v in ["0", "0.1", "0.2", "0.3"] {
            state.set_independent_value(v);
            assert_eq!(state.values(total).right, total - d(v));
        }
        state.set_independent_value("0.1");
        assert_eq!(state.values(total).right, d("0.2"));
    }

    #[test]
    fn test_right_field_independent() {
        let mut state = AdjustmentState::new(d("100"));
        state.set_field_input(Field::Right, "120");

        assert_eq!(state.independent_field(), Field::Right);
        assert_eq!(state.dependent_field(), Field::Left);
        assert_eq!(state.proposed_deposited(d("500")), d("380"));
        assert_eq!(state.formatted_amounts(d("500")).left, "380.00");
        assert_eq!(state.formatted_amounts(d("500")).right, "120");
    }

    #[test]
    fn test_bad_input_is_zero() {
        let mut state = AdjustmentState::new(d("100"));
        state.set_independent_value("");
        assert_eq!(state.values(d("500")).right, d("500"));
        state.set_independent_value("12abc");
        assert_eq!(state.independent_value(), Decimal::ZERO);
        // A zero dependent field shows "0"
        state.set_independent_value("500");
        assert_eq!(state.formatted_amounts(d("500")).right, "0");
    }

    #[test]
    fn test_out_of_range_stays_representable() {
        let mut state = AdjustmentState::new(d("100"));
        state.set_independent_value("650");
        assert_eq!(state.values(d("500")).right, d("-150"));
    }

    #[test]
    fn test_slide_marks_source_and_left_field() {
        let mut state = AdjustmentState::new(d("100"));
        state.set_field_input(Field::Right, "10");
        state.set_from_slide_position(d("220.5"));

        assert_eq!(state.input_source(), InputSource::Slider);
        assert_eq!(state.independent_field(), Field::Left);
        assert_eq!(state.typed_value(), "220.5");
        assert_eq!(state.slider_value(d("500")), None);

        state.set_independent_value("230");
        assert_eq!(state.input_source(), InputSource::Text);
        assert_eq!(state.slider_value(d("500")), Some(d("230")));
    }

    #[test]
    fn test_cancel_restores_deposited_two_decimals() {
        let mut state = AdjustmentState::new(d("100.456"));
        assert_eq!(state.typed_value(), "100.46");

        state.enable_adjusting();
        state.set_field_input(Field::Right, "3");
        state.cancel_adjusting(d("100.456"));

        assert!(!state.is_adjusting());
        assert_eq!(state.independent_field(), Field::Left);
        assert_eq!(state.typed_value(), "100.46");

        state.cancel_adjusting(Decimal::ZERO);
        assert_eq!(state.typed_value(), "0");
    }

    #[test]
    fn test_proposed_deposit() {
        let ratio = ExchangeRatio::new(d("1.25")).unwrap();
        let adj = compute_proposed_adjustment(d("150"), d("100"), ratio).unwrap();
        assert_eq!(adj.direction, Direction::Deposit);
        assert_eq!(adj.magnitude, d("50"));
        assert_eq!(adj.magnitude_secondary, None);
        assert_eq!(adj.submission_amount(), d("50"));
    }

    #[test]
    fn test_proposed_withdraw_converts_to_secondary() {
        let ratio = ExchangeRatio::new(d("1.25")).unwrap();
        let adj = compute_proposed_adjustment(d("40"), d("100"), ratio).unwrap();
        assert_eq!(adj.direction, Direction::Withdraw);
        assert_eq!(adj.difference, d("-60"));
        assert_eq!(adj.magnitude, d("60"));
        assert_eq!(adj.magnitude_secondary, Some(d("48")));
        assert_eq!(adj.submission_amount(), d("48"));
    }

    #[test]
    fn test_direction_matches_ordering() {
        let ratio = ExchangeRatio::default();
        for (proposed, current) in [("0", "10"), ("10", "0"), ("5.5", "5.25"), ("1", "1.01")] {
            let (p, c) = (d(proposed), d(current));
            let adj = compute_proposed_adjustment(p, c, ratio).unwrap();
            assert_eq!(adj.direction == Direction::Deposit, p > c);
            assert_eq!(adj.direction == Direction::Withdraw, p < c);
            assert_eq!(adj.magnitude, (p - c).abs());
        }
    }

    #[test]
    fn test_withdraw_overflow_is_error() {
        let ratio = ExchangeRatio::new(d("0.5")).unwrap();
        let result = compute_proposed_adjustment(Decimal::ZERO, Decimal::MAX, ratio);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_equal_amounts_is_noop() {
        let adj = compute_proposed_adjustment(d("100"), d("100"), ExchangeRatio::default()).unwrap();
        assert!(adj.is_noop());
    }
}
