//! Rationals extended with typed infinities.

use std::fmt;
use std::ops::Neg;

use exlp_expr::Rational;

/// A rational bound extended with the two infinities.
///
/// The derived ordering places `NegInfinity` below every finite value and
/// `Infinity` above, so interval intersection is plain `max`/`min`.
/// Coefficients elsewhere stay plain [`Rational`]s, which keeps them finite
/// by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bound {
    NegInfinity,
    Finite(Rational),
    Infinity,
}

impl Bound {
    pub fn is_finite(&self) -> bool {
        matches!(self, Bound::Finite(_))
    }

    /// The finite value, if any.
    pub fn as_finite(&self) -> Option<&Rational> {
        match self {
            Bound::Finite(value) => Some(value),
            _ => None,
        }
    }

    /// Consume into the finite value, if any.
    pub fn into_finite(self) -> Option<Rational> {
        match self {
            Bound::Finite(value) => Some(value),
            _ => None,
        }
    }

    /// Lower-bound interpretation of an optional value: absent means
    /// unbounded below.
    pub fn lower_from(value: Option<Rational>) -> Self {
        value.map_or(Bound::NegInfinity, Bound::Finite)
    }

    /// Upper-bound interpretation of an optional value: absent means
    /// unbounded above.
    pub fn upper_from(value: Option<Rational>) -> Self {
        value.map_or(Bound::Infinity, Bound::Finite)
    }

    /// Subtract a finite rational from the bound; infinities absorb the
    /// shift.
    pub fn shift(&self, delta: &Rational) -> Self {
        match self {
            Bound::Finite(value) => Bound::Finite(value - delta),
            other => other.clone(),
        }
    }

    /// Divide by a nonzero rational, flipping the infinity for negative
    /// divisors.
    ///
    /// Panics on a zero divisor.
    pub fn div(&self, divisor: &Rational) -> Self {
        use num_traits::Zero;
        assert!(!divisor.is_zero(), "division of a bound by zero");
        let negative = divisor < &Rational::zero();
        match self {
            Bound::Finite(value) => Bound::Finite(value / divisor),
            Bound::NegInfinity if negative => Bound::Infinity,
            Bound::NegInfinity => Bound::NegInfinity,
            Bound::Infinity if negative => Bound::NegInfinity,
            Bound::Infinity => Bound::Infinity,
        }
    }
}

impl From<Rational> for Bound {
    fn from(value: Rational) -> Self {
        Bound::Finite(value)
    }
}

impl Neg for Bound {
    type Output = Bound;

    fn neg(self) -> Bound {
        match self {
            Bound::NegInfinity => Bound::Infinity,
            Bound::Finite(value) => Bound::Finite(-value),
            Bound::Infinity => Bound::NegInfinity,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::NegInfinity => write!(f, "-inf"),
            Bound::Finite(value) => write!(f, "{value}"),
            Bound::Infinity => write!(f, "inf"),
        }
    }
}
