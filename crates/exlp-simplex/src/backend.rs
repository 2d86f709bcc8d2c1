//! [`LpBackend`] implementation on top of the exact tableau.

use std::time::{Duration, Instant};

use exlp_expr::Rational;
use exlp_solver::{
    Bound, LpBackend, LpResult, PartialSolution, PartialSolveFn, SolveOutcome,
};
use exlp_solver::{BackendColumn, BackendRow};
use num_traits::Zero;

use crate::tableau::{Flow, Status, Tableau};

/// How a problem column maps onto nonnegative structural variables.
enum ColumnMap {
    /// `x = offset + s`
    Shifted { index: usize, offset: Rational },
    /// `x = offset - s`
    Reflected { index: usize, offset: Rational },
    /// `x = pos - neg`
    Split { pos: usize, neg: usize },
}

/// Exact simplex engine over the two-sided bounded problem form.
///
/// The engine stores columns and rows exactly as the façade hands them over
/// and only reduces to standard form when [`LpBackend::solve`] runs, so the
/// stored problem stays inspectable between solves.
#[derive(Default)]
pub struct SimplexBackend {
    columns: Vec<BackendColumn>,
    rows: Vec<BackendRow>,
    time_limit: Option<Duration>,
}

impl SimplexBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce the stored problem to `max g . s : A s <= b, s >= 0`.
    ///
    /// Returns `None` when a column interval is empty on its own, which
    /// makes the problem trivially infeasible.
    fn reduce(&self) -> Option<Reduction> {
        let mut maps = Vec::with_capacity(self.columns.len());
        let mut ranged_columns = Vec::new();
        let mut n_structural = 0;

        for column in &self.columns {
            match (&column.lb, &column.ub) {
                (Bound::Finite(_), Bound::NegInfinity) => return None,
                (Bound::Finite(lb), ub) => {
                    if let Bound::Finite(ub) = ub {
                        if ub < lb {
                            return None;
                        }
                        ranged_columns.push((n_structural, ub - lb));
                    }
                    maps.push(ColumnMap::Shifted {
                        index: n_structural,
                        offset: lb.clone(),
                    });
                    n_structural += 1;
                }
                (Bound::NegInfinity, Bound::Finite(ub)) => {
                    maps.push(ColumnMap::Reflected {
                        index: n_structural,
                        offset: ub.clone(),
                    });
                    n_structural += 1;
                }
                (Bound::NegInfinity, Bound::Infinity) => {
                    maps.push(ColumnMap::Split {
                        pos: n_structural,
                        neg: n_structural + 1,
                    });
                    n_structural += 2;
                }
                // lb = +inf or ub = -inf leave no value for the column.
                _ => return None,
            }
        }

        // Minimisation objective over structural variables plus the constant
        // picked up from the offsets.
        let mut objective_constant = Rational::zero();
        let mut min_coeffs = vec![Rational::zero(); n_structural];
        for (column, map) in self.columns.iter().zip(&maps) {
            if column.obj.is_zero() {
                continue;
            }
            match map {
                ColumnMap::Shifted { index, offset } => {
                    objective_constant += &column.obj * offset;
                    min_coeffs[*index] += &column.obj;
                }
                ColumnMap::Reflected { index, offset } => {
                    objective_constant += &column.obj * offset;
                    min_coeffs[*index] -= &column.obj;
                }
                ColumnMap::Split { pos, neg } => {
                    min_coeffs[*pos] += &column.obj;
                    min_coeffs[*neg] -= &column.obj;
                }
            }
        }

        let mut constraints: Vec<(Vec<Rational>, Rational)> = Vec::new();
        let mut duals = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut constant = Rational::zero();
            let mut coeffs = vec![Rational::zero(); n_structural];
            for (column, value) in &row.entries {
                match &maps[*column] {
                    ColumnMap::Shifted { index, offset } => {
                        constant += value * offset;
                        coeffs[*index] += value;
                    }
                    ColumnMap::Reflected { index, offset } => {
                        constant += value * offset;
                        coeffs[*index] -= value;
                    }
                    ColumnMap::Split { pos, neg } => {
                        coeffs[*pos] += value;
                        coeffs[*neg] -= value;
                    }
                }
            }

            let mut upper_index = None;
            let mut lower_index = None;
            if let Bound::Finite(ub) = row.ub.shift(&constant) {
                upper_index = Some(constraints.len());
                constraints.push((coeffs.clone(), ub));
            }
            if let Bound::Finite(lb) = row.lb.shift(&constant) {
                lower_index = Some(constraints.len());
                constraints.push((coeffs.iter().map(|c| -c).collect(), -lb));
            }
            duals.push((upper_index, lower_index));
        }
        for (index, span) in ranged_columns {
            let mut coeffs = vec![Rational::zero(); n_structural];
            coeffs[index] = Rational::from_integer(1.into());
            constraints.push((coeffs, span));
        }

        Some(Reduction {
            maps,
            objective_constant,
            min_coeffs,
            constraints,
            duals,
        })
    }

    /// Map structural values back to problem columns.
    fn recover_primal(&self, maps: &[ColumnMap], values: &[Rational]) -> Vec<Rational> {
        maps.iter()
            .map(|map| match map {
                ColumnMap::Shifted { index, offset } => offset + &values[*index],
                ColumnMap::Reflected { index, offset } => offset - &values[*index],
                ColumnMap::Split { pos, neg } => &values[*pos] - &values[*neg],
            })
            .collect()
    }
}

struct Reduction {
    maps: Vec<ColumnMap>,
    objective_constant: Rational,
    min_coeffs: Vec<Rational>,
    constraints: Vec<(Vec<Rational>, Rational)>,
    duals: Vec<(Option<usize>, Option<usize>)>,
}

impl LpBackend for SimplexBackend {
    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn reserve_columns(&mut self, hint: usize) {
        self.columns.reserve(hint);
    }

    fn reserve_rows(&mut self, hint: usize) {
        self.rows.reserve(hint);
    }

    fn add_column(&mut self, obj: Rational, lb: Bound, ub: Bound) -> usize {
        self.columns.push(BackendColumn { obj, lb, ub });
        self.columns.len() - 1
    }

    fn add_row(&mut self, entries: Vec<(usize, Rational)>, lb: Bound, ub: Bound) -> usize {
        for (column, _) in &entries {
            assert!(*column < self.columns.len(), "row entry column out of range");
        }
        self.rows.push(BackendRow { entries, lb, ub });
        self.rows.len() - 1
    }

    fn column(&self, index: usize) -> BackendColumn {
        self.columns[index].clone()
    }

    fn row(&self, index: usize) -> BackendRow {
        self.rows[index].clone()
    }

    fn set_coefficient(&mut self, row: usize, column: usize, value: Rational) {
        assert!(column < self.columns.len(), "column index out of range");
        let entries = &mut self.rows[row].entries;
        match entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => entries.push((column, value)),
        }
    }

    fn set_objective(&mut self, column: usize, value: Rational) {
        self.columns[column].obj = value;
    }

    fn set_bound(&mut self, column: usize, lb: Bound, ub: Bound) {
        let entry = &mut self.columns[column];
        entry.lb = lb;
        entry.ub = ub;
    }

    fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.time_limit = limit;
    }

    fn solve(
        &mut self,
        precision: &mut Rational,
        store_solution: bool,
        mut partial: Option<PartialSolveFn<'_>>,
    ) -> SolveOutcome {
        let Some(reduction) = self.reduce() else {
            return SolveOutcome::bare(LpResult::Infeasible);
        };

        let max_coeffs: Vec<Rational> = reduction.min_coeffs.iter().map(|c| -c).collect();
        let mut tableau = Tableau::new(max_coeffs, reduction.constraints);

        let started = Instant::now();
        let time_limit = self.time_limit;
        let objective_constant = &reduction.objective_constant;
        let delta = precision.clone();
        let maps = &reduction.maps;
        let recover =
            |tableau: &Tableau| self.recover_primal(maps, &tableau.structural_values());

        let mut control = |tableau: &Tableau, feasible: bool| {
            if let Some(limit) = time_limit {
                if started.elapsed() > limit {
                    return Flow::Timeout;
                }
            }
            if !feasible {
                return Flow::Continue;
            }
            if let Some(callback) = partial.as_mut() {
                let primal = recover(tableau);
                let obj_ub = Bound::Finite(objective_constant - tableau.objective_value());
                let snapshot = PartialSolution {
                    primal: &primal,
                    dual: &[],
                    obj_lb: &Bound::NegInfinity,
                    obj_ub: &obj_ub,
                    diff: &Bound::Infinity,
                    delta: &delta,
                };
                if !callback(&snapshot) {
                    return Flow::Interrupt;
                }
            }
            Flow::Continue
        };

        let status = tableau.solve(&mut control);
        tracing::debug!(
            component = "simplex",
            operation = "solve",
            status = ?status,
            columns = self.columns.len(),
            rows = self.rows.len(),
            "Simplex finished"
        );

        match status {
            Status::Optimal => {
                let objective = &reduction.objective_constant - tableau.objective_value();
                let mut outcome = SolveOutcome::bare(LpResult::Optimal);
                outcome.obj_lb = Bound::Finite(objective.clone());
                outcome.obj_ub = Bound::Finite(objective);
                *precision = Rational::zero();
                if store_solution {
                    outcome.primal =
                        self.recover_primal(&reduction.maps, &tableau.structural_values());
                    outcome.dual = reduction
                        .duals
                        .iter()
                        .map(|(upper, lower)| {
                            let priced = |index: &Option<usize>| {
                                index.map_or_else(Rational::zero, |i| {
                                    tableau.reduced_cost(tableau.slack_column(i)).clone()
                                })
                            };
                            priced(lower) - priced(upper)
                        })
                        .collect();
                }
                outcome
            }
            Status::Unbounded => {
                let mut outcome = SolveOutcome::bare(LpResult::Unbounded);
                outcome.obj_lb = Bound::NegInfinity;
                outcome.obj_ub = Bound::NegInfinity;
                *precision = Rational::zero();
                if store_solution {
                    outcome.primal =
                        self.recover_primal(&reduction.maps, &tableau.structural_values());
                }
                outcome
            }
            Status::Infeasible => SolveOutcome::bare(LpResult::Infeasible),
            Status::Interrupted => SolveOutcome::bare(LpResult::Unsolved),
            Status::TimedOut | Status::Stalled => SolveOutcome::bare(LpResult::Error),
        }
    }
}
