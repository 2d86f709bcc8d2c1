//! LP problem façade.
//!
//! [`LpProblem`] owns the mapping between symbolic [`exlp_expr::Variable`]s
//! and the columns of an exact simplex backend, normalizes incoming rows to
//! the two-sided bounded form, accumulates the objective and drives the
//! delta-optimality solve loop.

pub mod problem;
pub mod types;

mod error;

pub use error::LpError;
pub use problem::{LpProblem, PartialCallback, SolveCallback, SolveSummary};
pub use types::{Column, Row};
