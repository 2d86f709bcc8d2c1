//! The contract between the LP façade and a rational simplex engine.

use std::time::Duration;

use exlp_expr::{FormulaKind, Rational};

use crate::bound::Bound;
use crate::status::LpResult;

/// A column as stored by a backend: objective coefficient and bounds,
/// indexed positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendColumn {
    pub obj: Rational,
    pub lb: Bound,
    pub ub: Bound,
}

/// A two-sided row as stored by a backend. Entries pair column indices with
/// nonzero coefficients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRow {
    pub entries: Vec<(usize, Rational)>,
    pub lb: Bound,
    pub ub: Bound,
}

/// Snapshot handed to the partial-solution callback while a solve is in
/// flight.
#[derive(Debug)]
pub struct PartialSolution<'a> {
    /// Current primal point (feasible for the relaxation).
    pub primal: &'a [Rational],
    /// Current dual values, if the engine tracks them mid-solve.
    pub dual: &'a [Rational],
    /// Current lower bound on the objective.
    pub obj_lb: &'a Bound,
    /// Current upper bound on the objective.
    pub obj_ub: &'a Bound,
    /// Width of the objective interval.
    pub diff: &'a Bound,
    /// Tolerance the solve is running with.
    pub delta: &'a Rational,
}

/// Callback fired at every intermediate delta-feasible point; returning
/// `false` asks the engine to stop early.
pub type PartialSolveFn<'a> = &'a mut dyn FnMut(&PartialSolution<'_>) -> bool;

/// Everything a backend reports from one solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub result: LpResult,
    /// Primal solution (or ray direction when unbounded); empty unless the
    /// verdict is feasible and storing was requested.
    pub primal: Vec<Rational>,
    /// Dual solution; a Farkas certificate on infeasibility when available.
    pub dual: Vec<Rational>,
    pub obj_lb: Bound,
    pub obj_ub: Bound,
    /// Achieved precision: `obj_ub - obj_lb` when both are finite, zero for
    /// an exact optimum.
    pub precision: Rational,
}

impl SolveOutcome {
    /// Outcome for a verdict that carries no solution data.
    pub fn bare(result: LpResult) -> Self {
        Self {
            result,
            primal: Vec::new(),
            dual: Vec::new(),
            obj_lb: Bound::NegInfinity,
            obj_ub: Bound::Infinity,
            precision: Rational::from_integer(0.into()),
        }
    }
}

/// Operations every rational simplex engine exposes to the façade.
///
/// Backends always minimise. Columns and rows are identified by dense,
/// append-only indices; index arguments out of range are programming errors
/// and panic. A backend may represent a ranged row internally as one
/// two-sided row or as a pair of one-sided rows; in either case the index
/// returned by [`LpBackend::add_row`] refers to the last row appended.
pub trait LpBackend {
    fn num_columns(&self) -> usize;

    fn num_rows(&self) -> usize;

    /// Pre-sizing hint; may be a no-op.
    fn reserve_columns(&mut self, _hint: usize) {}

    /// Pre-sizing hint; may be a no-op.
    fn reserve_rows(&mut self, _hint: usize) {}

    /// Append a column, returning its index.
    fn add_column(&mut self, obj: Rational, lb: Bound, ub: Bound) -> usize;

    /// Append a two-sided row `lb <= entries . x <= ub`, returning the index
    /// of the last row appended.
    fn add_row(&mut self, entries: Vec<(usize, Rational)>, lb: Bound, ub: Bound) -> usize;

    /// Append a one-sided or equality row `entries . x kind rhs`.
    ///
    /// Panics for kinds other than `Leq`, `Eq` and `Geq`.
    fn add_row_with_sense(
        &mut self,
        entries: Vec<(usize, Rational)>,
        kind: FormulaKind,
        rhs: Rational,
    ) -> usize {
        let (lb, ub) = match kind {
            FormulaKind::Leq => (Bound::NegInfinity, Bound::Finite(rhs)),
            FormulaKind::Eq => (Bound::Finite(rhs.clone()), Bound::Finite(rhs)),
            FormulaKind::Geq => (Bound::Finite(rhs), Bound::Infinity),
            other => panic!("unsupported row sense {other}"),
        };
        self.add_row(entries, lb, ub)
    }

    /// The column at `index`.
    fn column(&self, index: usize) -> BackendColumn;

    /// The row at `index`.
    fn row(&self, index: usize) -> BackendRow;

    /// Replace a single constraint matrix entry.
    fn set_coefficient(&mut self, row: usize, column: usize, value: Rational);

    /// Replace a column's objective coefficient (minimisation sense).
    fn set_objective(&mut self, column: usize, value: Rational);

    /// Replace a column's bounds.
    fn set_bound(&mut self, column: usize, lb: Bound, ub: Bound);

    /// Wall-clock budget for subsequent solves; `None` removes the limit.
    /// Engines without timeout support may ignore it.
    fn set_time_limit(&mut self, _limit: Option<Duration>) {}

    /// Optimise with the requested precision, which is updated to the
    /// achieved precision on return.
    ///
    /// A zero `precision` demands an exact verdict. When `store_solution` is
    /// false the outcome carries the verdict and objective interval only.
    fn solve(
        &mut self,
        precision: &mut Rational,
        store_solution: bool,
        partial: Option<PartialSolveFn<'_>>,
    ) -> SolveOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingBackend {
        rows: Vec<BackendRow>,
    }

    impl LpBackend for RecordingBackend {
        fn num_columns(&self) -> usize {
            0
        }

        fn num_rows(&self) -> usize {
            self.rows.len()
        }

        fn add_column(&mut self, _obj: Rational, _lb: Bound, _ub: Bound) -> usize {
            0
        }

        fn add_row(&mut self, entries: Vec<(usize, Rational)>, lb: Bound, ub: Bound) -> usize {
            self.rows.push(BackendRow { entries, lb, ub });
            self.rows.len() - 1
        }

        fn column(&self, _index: usize) -> BackendColumn {
            unimplemented!()
        }

        fn row(&self, index: usize) -> BackendRow {
            self.rows[index].clone()
        }

        fn set_coefficient(&mut self, _row: usize, _column: usize, _value: Rational) {}

        fn set_objective(&mut self, _column: usize, _value: Rational) {}

        fn set_bound(&mut self, _column: usize, _lb: Bound, _ub: Bound) {}

        fn solve(
            &mut self,
            _precision: &mut Rational,
            _store_solution: bool,
            _partial: Option<PartialSolveFn<'_>>,
        ) -> SolveOutcome {
            SolveOutcome::bare(LpResult::Error)
        }
    }

    fn r(n: i64) -> Rational {
        Rational::from_integer(n.into())
    }

    #[test]
    fn sense_rows_translate_to_two_sided_bounds() {
        let mut backend = RecordingBackend::default();
        backend.add_row_with_sense(vec![(0, r(1))], FormulaKind::Leq, r(5));
        backend.add_row_with_sense(vec![(0, r(1))], FormulaKind::Eq, r(3));
        backend.add_row_with_sense(vec![(0, r(1))], FormulaKind::Geq, r(-2));

        assert_eq!(backend.row(0).lb, Bound::NegInfinity);
        assert_eq!(backend.row(0).ub, Bound::Finite(r(5)));
        assert_eq!(backend.row(1).lb, Bound::Finite(r(3)));
        assert_eq!(backend.row(1).ub, Bound::Finite(r(3)));
        assert_eq!(backend.row(2).lb, Bound::Finite(r(-2)));
        assert_eq!(backend.row(2).ub, Bound::Infinity);
    }

    #[test]
    #[should_panic(expected = "unsupported row sense")]
    fn strict_senses_are_rejected() {
        let mut backend = RecordingBackend::default();
        backend.add_row_with_sense(Vec::new(), FormulaKind::Lt, r(0));
    }
}
