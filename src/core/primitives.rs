use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{DrillError, DrillResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> DrillResult<f64> {
    value.to_f64().ok_or_else(|| {
        DrillError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Guarded division: `None` stands for an undefined value.
///
/// A zero denominator, and any quotient that is not finite, is undefined.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

/// `ratio` lifted over possibly-undefined operands.
#[must_use]
pub fn ratio_of(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    ratio(numerator?, denominator?)
}

/// `Some(value)` only when `value` is finite.
#[must_use]
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Subtraction over possibly-undefined operands; an overflow is undefined.
#[must_use]
pub fn difference(minuend: Option<f64>, subtrahend: Option<f64>) -> Option<f64> {
    finite(minuend? - subtrahend?)
}
