//! Decimal parsing, display rounding and 18-decimal "loop" unit conversion.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::AppError;

/// Number of decimals of every token amount on-chain.
pub const LOOP_DECIMALS: u32 = 18;

/// Parse user input leniently.
///
/// Blank, unparseable or negative input yields zero; input is never rejected.
pub fn parse_decimal(raw: &str) -> Decimal {
    let raw = raw.trim();
    if raw.is_empty() {
        return Decimal::ZERO;
    }
    let parsed = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .unwrap_or(Decimal::ZERO);
    if parsed.is_sign_negative() {
        Decimal::ZERO
    } else {
        parsed
    }
}

/// Round half away from zero to `dp` decimals.
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Render with exactly `dp` decimals, e.g. `to_fixed(150, 2) == "150.00"`.
pub fn to_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = round_dp(value, dp);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Human-readable amount: two decimals at most, trailing zeros dropped,
/// thousands separated by commas.
pub fn format_amount(value: Decimal) -> String {
    let text = round_dp(value, 2).normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Convert a token amount into integer loop units (`amount * 10^18`, truncated).
pub fn to_loop(amount: Decimal) -> Result<u128, AppError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AppError::Validation(format!(
            "cannot convert negative amount {amount} to loop units"
        )));
    }
    let mantissa = amount.mantissa();
    let scale = amount.scale();
    let loops = if scale <= LOOP_DECIMALS {
        mantissa.checked_mul(10i128.pow(LOOP_DECIMALS - scale))
    } else {
        Some(mantissa / 10i128.pow(scale - LOOP_DECIMALS))
    };
    loops
        .and_then(|l| u128::try_from(l).ok())
        .ok_or_else(|| AppError::Validation(format!("amount {amount} overflows loop units")))
}

/// Convert integer loop units back into a token amount.
pub fn from_loop(loops: u128) -> Result<Decimal, AppError> {
    let mantissa = i128::try_from(loops)
        .map_err(|_| AppError::Decode(format!("loop value {loops} out of range")))?;
    Decimal::try_from_i128_with_scale(mantissa, LOOP_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|e| AppError::Decode(format!("loop value {loops} out of range: {e}")))
}

/// Parse a loop value encoded as `0x`-prefixed hex or as a decimal string.
pub fn parse_loop_str(raw: &str) -> Result<u128, AppError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16),
        None => raw.parse::<u128>(),
    };
    parsed.map_err(|e| AppError::Decode(format!("invalid loop value '{raw}': {e}")))
}
