//! Log-space arithmetic over base-10 exponents.
//!
//! A [`LogValue`] stores `x` for the magnitude `10^x`. Linear magnitudes in
//! a long run overflow `f64` by hundreds of orders of magnitude, so the
//! underlying linear value is never materialized; addition and subtraction
//! are rewritten around the larger exponent instead.
//!
//! Ordering needs no helper: comparing two `LogValue`s is comparing their
//! exponents, so the plain `f64` comparison operators apply. `-∞` is the
//! sentinel for a zero magnitude.

/// A non-negative magnitude stored as its base-10 logarithm.
pub type LogValue = f64;

/// `log10(10^a + 10^b)`, computed without leaving the log domain.
///
/// Decomposes around the larger exponent: `hi + log10(1 + 10^(lo - hi))`.
/// When `a == b` the offset term is exactly `log10(2)`. Adding a zero
/// magnitude (`-∞`) is the identity.
pub fn log_add(a: LogValue, b: LogValue) -> LogValue {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    hi + (1.0 + 10f64.powf(lo - hi)).log10()
}

/// `log10(10^a - 10^b)`. The caller must guarantee `a >= b`.
///
/// A violated precondition yields `NaN`, never a clamped zero: an
/// over-debit is a logic error upstream and must surface as one.
pub fn log_sub(a: LogValue, b: LogValue) -> LogValue {
    if b == f64::NEG_INFINITY {
        return a;
    }
    a + (1.0 - 10f64.powf(b - a)).log10()
}

/// `log10` of a linear value: the entry point from linear space.
pub fn l10(value: f64) -> LogValue {
    value.log10()
}

/// `log2` of a linear value.
pub fn l2(value: f64) -> f64 {
    value.log2()
}

/// Stirling-series approximation of `log10(n!)`.
///
/// The closed-form leading pair plus a four-term asymptotic correction.
/// Production formulas with combinatorial growth depend on this exact
/// series, not on an exact factorial.
pub fn log_factorial(n: f64) -> LogValue {
    use std::f64::consts::{E, PI};
    0.5 * (2.0 * PI * n).log10()
        + n * (n / E).log10()
        + (1.0 + 1.0 / (12.0 * n) + 1.0 / (288.0 * n * n)
            - 139.0 / (51_840.0 * n.powi(3))
            - 571.0 / (2_488_320.0 * n.powi(4)))
        .log10()
}
