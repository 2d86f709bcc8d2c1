//! The [`LpProblem`] façade.
//!
//! # Module organization
//!
//! - [`builder`]: adding columns and rows, bounds, coefficients, objective
//! - [`solve`]: the delta-optimality solve loop, callbacks and verification
//! - [`inspect`]: structure and solution views, expected-verdict cross-check

mod builder;
mod inspect;
mod solve;

use std::collections::{BTreeMap, HashMap};

use exlp_expr::{Rational, Variable};
use exlp_solver::{Bound, Config, LpBackend, LpResult, PartialSolution};

/// Report handed to the solve callback after every [`LpProblem::solve`].
#[derive(Debug)]
pub struct SolveSummary<'a> {
    pub result: LpResult,
    pub primal: &'a [Rational],
    pub dual: &'a [Rational],
    pub obj_lb: &'a Bound,
    pub obj_ub: &'a Bound,
    /// Achieved precision of the solve.
    pub precision: &'a Rational,
}

/// Callback invoked exactly once at the end of every solve.
pub type SolveCallback = Box<dyn FnMut(&SolveSummary<'_>)>;

/// Callback forwarded to the backend for intermediate delta-feasible points;
/// returning `false` requests early termination.
pub type PartialCallback = Box<dyn FnMut(&PartialSolution<'_>) -> bool>;

/// Façade over an exact simplex backend.
///
/// The façade owns the canonical correspondence between domain variables and
/// solver columns, rewrites formula-style rows into the backend's two-sided
/// bounded form and stores the solution vectors of the last solve. The
/// backend always minimises; [`LpProblem::maximise`] negates coefficients on
/// the way in.
pub struct LpProblem {
    pub(crate) backend: Box<dyn LpBackend>,
    pub(crate) config: Config,
    pub(crate) info: BTreeMap<String, String>,
    pub(crate) var_to_col: HashMap<Variable, usize>,
    pub(crate) col_to_var: Vec<Variable>,
    pub(crate) solution: Vec<Rational>,
    pub(crate) dual_solution: Vec<Rational>,
    pub(crate) obj_lb: Bound,
    pub(crate) obj_ub: Bound,
    pub(crate) result: LpResult,
    pub(crate) solve_cb: Option<SolveCallback>,
    pub(crate) partial_cb: Option<PartialCallback>,
}

impl LpProblem {
    /// Create a façade over `backend` with a default configuration.
    pub fn new(backend: Box<dyn LpBackend>) -> Self {
        Self::with_config(backend, Config::default())
    }

    /// Create a façade over `backend` with the given configuration.
    pub fn with_config(backend: Box<dyn LpBackend>, config: Config) -> Self {
        Self {
            backend,
            config,
            info: BTreeMap::new(),
            var_to_col: HashMap::new(),
            col_to_var: Vec::new(),
            solution: Vec::new(),
            dual_solution: Vec::new(),
            obj_lb: Bound::NegInfinity,
            obj_ub: Bound::Infinity,
            result: LpResult::Unsolved,
            solve_cb: None,
            partial_cb: None,
        }
    }

    pub fn num_columns(&self) -> usize {
        self.backend.num_columns()
    }

    pub fn num_rows(&self) -> usize {
        self.backend.num_rows()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Verdict of the last solve, or `Unsolved` after any mutation.
    pub fn result(&self) -> LpResult {
        self.result
    }

    /// Primal solution of the last feasible solve.
    pub fn solution(&self) -> &[Rational] {
        &self.solution
    }

    /// Dual solution of the last solve; a Farkas certificate on
    /// infeasibility when the backend provides one.
    pub fn dual_solution(&self) -> &[Rational] {
        &self.dual_solution
    }

    /// Objective interval `[lb, ub]` established by the last solve.
    pub fn objective_bounds(&self) -> (&Bound, &Bound) {
        (&self.obj_lb, &self.obj_ub)
    }

    /// Set the option identified by `key`, as if a `* @set-option` record
    /// had been read from the input.
    pub fn set_option(&mut self, key: &str, value: &str) {
        self.config.apply_option(key, value);
    }

    /// Store a free-form info entry, as read from a `* @set-info` record.
    pub fn set_info(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.info.insert(key.into(), value.into());
    }

    /// Retrieve an info entry.
    pub fn get_info(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    /// Install the callback invoked at the end of every solve.
    pub fn set_solve_callback(&mut self, callback: SolveCallback) {
        self.solve_cb = Some(callback);
    }

    /// Install the partial-solution callback forwarded to the backend while
    /// continuous output is enabled.
    pub fn set_partial_callback(&mut self, callback: PartialCallback) {
        self.partial_cb = Some(callback);
    }

    /// Hint the backend about the expected number of columns.
    pub fn reserve_columns(&mut self, hint: usize) {
        self.col_to_var.reserve(hint);
        self.var_to_col.reserve(hint);
        self.backend.reserve_columns(hint);
    }

    /// Hint the backend about the expected number of rows.
    pub fn reserve_rows(&mut self, hint: usize) {
        self.backend.reserve_rows(hint);
    }
}
