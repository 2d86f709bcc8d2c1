//! Backend contract for the exlp exact LP solver.
//!
//! This crate holds everything a rational simplex engine and its callers
//! agree on: the [`Bound`] extension of the rationals with typed infinities,
//! the [`LpResult`] verdict set, the [`Config`] option surface, and the
//! [`LpBackend`] trait the engines implement.

pub mod backend;
pub mod bound;
pub mod config;
pub mod status;

pub use backend::{
    BackendColumn, BackendRow, LpBackend, PartialSolution, PartialSolveFn, SolveOutcome,
};
pub use bound::Bound;
pub use config::Config;
pub use status::LpResult;
