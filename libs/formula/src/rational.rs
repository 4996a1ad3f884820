//! Exact weight fractions
//!
//! [`Rational`] is an immutable value: every operation returns a new, reduced
//! fraction and overflow of the underlying `i64` is reported instead of
//! wrapping.

use crate::error::{Error, Result};
use num_integer::Integer;
use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, ToPrimitive, Zero};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rational(Ratio<i64>);

impl Rational {
    pub const ZERO: Rational = Rational(Ratio::new_raw(0, 1));
    pub const ONE: Rational = Rational(Ratio::new_raw(1, 1));

    /// Build `numer / denom`, reduced.
    pub fn new(numer: i64, denom: i64) -> Result<Self> {
        if denom == 0 {
            return Err(Error::DivisionByZero);
        }
        Ok(Self::raw(numer, denom).reduced())
    }

    /// Build `numer / denom` without reducing it.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub(crate) fn raw(numer: i64, denom: i64) -> Self {
        assert!(denom != 0, "rational with zero denominator");
        Rational(Ratio::new_raw(numer, denom))
    }

    pub fn from_integer(n: i64) -> Self {
        Rational(Ratio::from_integer(n))
    }

    /// Convert a parsed literal. Values with a short decimal expansion
    /// (`2.5`, `0.125`) convert exactly.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::Overflow);
        }
        if value.fract() == 0.0 {
            return value
                .to_i64()
                .map(Self::from_integer)
                .ok_or(Error::Overflow);
        }
        Ratio::<i64>::approximate_float(value)
            .map(Rational)
            .ok_or(Error::Overflow)
    }

    pub fn numer(&self) -> i64 {
        *self.0.numer()
    }

    pub fn denom(&self) -> i64 {
        *self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Divide numerator and denominator by their greatest common divisor,
    /// keeping the denominator positive.
    pub fn reduced(&self) -> Self {
        Rational(self.0.reduced())
    }

    pub fn multiply(&self, factor: Rational) -> Result<Self> {
        self.0
            .checked_mul(&factor.0)
            .map(Rational)
            .ok_or(Error::Overflow)
    }

    pub fn divide(&self, divisor: Rational) -> Result<Self> {
        if divisor.is_zero() {
            return Err(Error::DivisionByZero);
        }
        self.0
            .checked_div(&divisor.0)
            .map(Rational)
            .ok_or(Error::Overflow)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: Rational) -> Result<Self> {
        self.0
            .checked_add(&other.0)
            .map(Rational)
            .ok_or(Error::Overflow)
    }

    /// Scale to `denom` and return the matching numerator.
    ///
    /// `denom` must be a multiple of the reduced denominator, as produced by
    /// [`common_denominator`]; anything else is reported as an overflow.
    pub fn numer_over(&self, denom: i64) -> Result<i64> {
        let reduced = self.reduced();
        let (factor, rest) = denom.div_rem(&reduced.denom());
        if rest != 0 {
            return Err(Error::Overflow);
        }
        reduced.numer().checked_mul(factor).ok_or(Error::Overflow)
    }
}

/// Least common multiple of the reduced denominators.
pub fn common_denominator<'a, I>(fractions: I) -> Result<i64>
where
    I: IntoIterator<Item = &'a Rational>,
{
    fractions.into_iter().try_fold(1i64, |acc, fraction| {
        let denom = fraction.reduced().denom();
        let gcd = acc.gcd(&denom);
        (acc / gcd).checked_mul(denom).ok_or(Error::Overflow)
    })
}

impl Default for Rational {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer(), self.denom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn test_new_reduces() {
        let half = r(4, 8);
        assert_eq!((half.numer(), half.denom()), (1, 2));
        let neg = r(3, -6);
        assert_eq!((neg.numer(), neg.denom()), (-1, 2));
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(Rational::new(1, 0), Err(Error::DivisionByZero));
    }

    #[test]
    fn test_raw_keeps_form_until_reduced() {
        let raw = Rational::raw(6, 9);
        assert_eq!((raw.numer(), raw.denom()), (6, 9));
        let reduced = raw.reduced();
        assert_eq!((reduced.numer(), reduced.denom()), (2, 3));
        // the original value is untouched
        assert_eq!(raw.numer(), 6);
    }

    #[test]
    fn test_multiply_divide() {
        let x = r(1, 2).multiply(Rational::from_integer(5)).unwrap();
        assert_eq!(x, r(5, 2));
        let y = x.divide(Rational::from_integer(7)).unwrap();
        assert_eq!(y, r(5, 14));
        assert_eq!(
            y.divide(Rational::ZERO),
            Err(Error::DivisionByZero)
        );
    }

    #[test]
    fn test_add_cross_multiplies() {
        let a = r(1, 7);
        let b = r(5, 14);
        let sum = a.add(b).unwrap();
        assert_eq!(sum, r(1, 2));
        assert_eq!(b, r(5, 14));
        assert_eq!(r(1, 3).add(r(1, 3)).unwrap(), r(2, 3));
    }

    #[test]
    fn test_overflow_is_reported() {
        let big = Rational::from_integer(i64::MAX);
        assert_eq!(
            big.multiply(Rational::from_integer(2)),
            Err(Error::Overflow)
        );
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Rational::from_f64(2.5).unwrap(), r(5, 2));
        assert_eq!(Rational::from_f64(3.0).unwrap(), r(3, 1));
        assert_eq!(Rational::from_f64(0.125).unwrap(), r(1, 8));
        assert!(Rational::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_common_denominator() {
        let weights = [r(1, 7), r(5, 14), r(5, 14), r(1, 7)];
        assert_eq!(common_denominator(&weights).unwrap(), 14);
        assert_eq!(r(1, 7).numer_over(14).unwrap(), 2);
        assert_eq!(r(5, 14).numer_over(14).unwrap(), 5);
    }
}
