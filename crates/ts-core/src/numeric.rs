//! Float conventions for ridership, flows and spreads.

use crate::TsError;

pub type Real = f64;

/// Two ridership values closer than this are the same count. Absolute, so
/// large but genuinely different counts never collapse together.
pub const RIDERSHIP_EPSILON: Real = 1e-9;

/// Every value within `RIDERSHIP_EPSILON` of every other. Empty and
/// single-value slices are uniform.
pub fn is_uniform(values: &[Real]) -> bool {
    let Some((&first, rest)) = values.split_first() else {
        return true;
    };
    let (lo, hi) = rest
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    hi - lo <= RIDERSHIP_EPSILON
}

/// `value` if finite, otherwise a `NonFinite` error naming `what`.
pub fn require_finite(value: Real, what: &'static str) -> Result<Real, TsError> {
    if value.is_finite() {
        return Ok(value);
    }
    Err(TsError::NonFinite { what, value })
}
