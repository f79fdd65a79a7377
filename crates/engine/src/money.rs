//! Rounding and formatting of settlement-currency amounts.
//!
//! Reconciliation works on `f64` francs because converted amounts are raw
//! amounts multiplied by float rates. Intermediate sums and split shares stay
//! unrounded; rounding happens once, at the output edge, through [`round2`].

use std::fmt;

/// Rounds to 2 decimal places, half away from zero.
///
/// ```rust
/// use engine::money::round2;
///
/// assert_eq!(round2(0.125), 0.13);
/// assert_eq!(round2(-0.125), -0.13);
/// assert_eq!(round2(45.0), 45.0);
/// ```
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A CHF amount formatted for logs and diagnostics, e.g. `45.00 CHF`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chf(pub f64);

impl fmt::Display for Chf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} CHF", round2(self.0))
    }
}
