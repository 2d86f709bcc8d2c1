//! Symbolic layer: variables, linear expressions and formulas over exact
//! rationals.
//!
//! Everything downstream of this crate works with [`Rational`], an
//! arbitrary-precision rational number. The arithmetic crates are re-exported
//! so the rest of the workspace shares a single numeric surface.

pub mod expr;
pub mod formula;
pub mod var;

pub use expr::{Addends, Expression};
pub use formula::{Formula, FormulaKind};
pub use var::Variable;

pub use num_bigint::BigInt;
pub use num_rational::BigRational;
pub use num_traits;

/// Arbitrary-precision rational used for every coefficient, bound and
/// solution value in the workspace.
pub type Rational = num_rational::BigRational;
