//! Dense exact-rational simplex tableau.
//!
//! Row 0 holds the objective row of the maximisation problem, column 0 the
//! right-hand side. Structural variables occupy columns `1..=n`, slack
//! variables the columns after them. `basic[i]` is the column currently
//! basic in constraint row `i`.

use exlp_expr::Rational;
use num_traits::{One, Zero};

/// Caller decision consulted once per pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// A callback asked the solve to stop.
    Interrupt,
    /// The time budget ran out.
    Timeout,
}

/// Terminal state of a tableau run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    Optimal,
    Unbounded,
    Infeasible,
    Interrupted,
    TimedOut,
    /// Internal anomaly (an artificial variable could not leave the basis).
    Stalled,
}

pub(crate) struct Tableau {
    rows: Vec<Vec<Rational>>,
    basic: Vec<usize>,
    n_structural: usize,
}

impl Tableau {
    /// Build the initial tableau for `max objective . s` subject to
    /// `constraints[i].0 . s <= constraints[i].1`, `s >= 0`, with the slack
    /// basis.
    pub(crate) fn new(
        objective: Vec<Rational>,
        constraints: Vec<(Vec<Rational>, Rational)>,
    ) -> Self {
        let n = objective.len();
        let m = constraints.len();
        let width = 1 + n + m;

        let mut rows = Vec::with_capacity(m + 1);
        let mut row0 = Vec::with_capacity(width);
        row0.push(Rational::zero());
        for coeff in objective {
            row0.push(-coeff);
        }
        row0.resize(width, Rational::zero());
        rows.push(row0);

        let mut basic = vec![0usize];
        for (i, (coeffs, rhs)) in constraints.into_iter().enumerate() {
            debug_assert_eq!(coeffs.len(), n);
            let mut row = Vec::with_capacity(width);
            row.push(rhs);
            row.extend(coeffs);
            row.resize(width, Rational::zero());
            row[1 + n + i] = Rational::one();
            rows.push(row);
            basic.push(1 + n + i);
        }

        Self {
            rows,
            basic,
            n_structural: n,
        }
    }

    fn n_constraints(&self) -> usize {
        self.rows.len() - 1
    }

    fn width(&self) -> usize {
        self.rows[0].len()
    }

    /// Current value of the maximisation objective.
    pub(crate) fn objective_value(&self) -> &Rational {
        &self.rows[0][0]
    }

    /// Reduced cost currently in the objective row at `column`.
    pub(crate) fn reduced_cost(&self, column: usize) -> &Rational {
        &self.rows[0][column]
    }

    /// Objective-row column index of the slack of constraint `i`.
    pub(crate) fn slack_column(&self, i: usize) -> usize {
        1 + self.n_structural + i
    }

    /// Values of the structural variables at the current basic solution.
    pub(crate) fn structural_values(&self) -> Vec<Rational> {
        let mut values = vec![Rational::zero(); self.n_structural];
        for (row, &column) in self.basic.iter().enumerate().skip(1) {
            if column >= 1 && column <= self.n_structural {
                values[column - 1] = self.rows[row][0].clone();
            }
        }
        values
    }

    /// Run the two-phase primal simplex. `control` is consulted after every
    /// pivot; the `bool` argument tells whether the current basis is primal
    /// feasible for the original problem (phase 2).
    pub(crate) fn solve(&mut self, control: &mut dyn FnMut(&Tableau, bool) -> Flow) -> Status {
        let infeasible_rows: Vec<bool> = std::iter::once(false)
            .chain(self.rows[1..].iter().map(|row| row[0] < Rational::zero()))
            .collect();
        let n_infeasible = infeasible_rows.iter().filter(|&&neg| neg).count();

        if n_infeasible > 0 {
            match self.phase_one(&infeasible_rows, n_infeasible, control) {
                Status::Optimal => {}
                other => return other,
            }
        }
        self.simplex(control, true)
    }

    /// Solve the auxiliary problem that drives the artificial variables of
    /// the rows with negative right-hand sides to zero, then restore the
    /// original objective row.
    fn phase_one(
        &mut self,
        infeasible_rows: &[bool],
        n_infeasible: usize,
        control: &mut dyn FnMut(&Tableau, bool) -> Flow,
    ) -> Status {
        let width = self.width();
        let mut aux = self.auxiliary_tableau(infeasible_rows, n_infeasible);

        match aux.simplex(control, false) {
            Status::Optimal => {}
            Status::Interrupted => return Status::Interrupted,
            Status::TimedOut => return Status::TimedOut,
            // The auxiliary objective is bounded, so anything else is an
            // engine anomaly.
            _ => return Status::Stalled,
        }
        if !aux.objective_value().is_zero() {
            return Status::Infeasible;
        }
        if !aux.drive_out_artificials(width) {
            return Status::Stalled;
        }

        for (target, source) in self.rows[1..].iter_mut().zip(&aux.rows[1..]) {
            target.clone_from_slice(&source[..width]);
        }
        self.basic.clone_from_slice(&aux.basic);

        // Price the original objective row out against the new basis.
        for i in 1..=self.n_constraints() {
            let multiplier = self.rows[0][self.basic[i]].clone();
            if multiplier.is_zero() {
                continue;
            }
            for j in 0..width {
                let delta = &multiplier * &self.rows[i][j];
                self.rows[0][j] -= delta;
            }
        }
        Status::Optimal
    }

    fn auxiliary_tableau(&self, infeasible_rows: &[bool], n_infeasible: usize) -> Tableau {
        let width = self.width();
        let mut rows = Vec::with_capacity(self.rows.len());
        rows.push(Vec::new());

        let mut artificial = 0;
        for (i, row) in self.rows.iter().enumerate().skip(1) {
            let mut aux_row: Vec<Rational> = if infeasible_rows[i] {
                row.iter().map(|value| -value).collect()
            } else {
                row.clone()
            };
            for j in 0..n_infeasible {
                aux_row.push(if infeasible_rows[i] && artificial == j {
                    Rational::one()
                } else {
                    Rational::zero()
                });
            }
            if infeasible_rows[i] {
                artificial += 1;
            }
            rows.push(aux_row);
        }

        let mut objective = vec![Rational::zero(); width + n_infeasible];
        for (i, row) in rows.iter().enumerate().skip(1) {
            if infeasible_rows[i] {
                for (target, value) in objective.iter_mut().zip(row) {
                    *target -= value;
                }
            }
        }
        for j in 0..n_infeasible {
            objective[width + j] = Rational::one();
        }
        rows[0] = objective;

        let mut basic = self.basic.clone();
        let mut artificial = 0;
        for (i, &neg) in infeasible_rows.iter().enumerate() {
            if neg {
                basic[i] = width + artificial;
                artificial += 1;
            }
        }

        Tableau {
            rows,
            basic,
            n_structural: self.n_structural,
        }
    }

    /// Pivot any artificial variable still basic at zero onto a real column
    /// so the basis survives dropping the artificial columns.
    fn drive_out_artificials(&mut self, real_width: usize) -> bool {
        for i in 1..=self.n_constraints() {
            if self.basic[i] < real_width {
                continue;
            }
            let Some(column) = (1..real_width)
                .find(|&column| !self.rows[i][column].is_zero())
            else {
                return false;
            };
            self.pivot(column, i);
        }
        true
    }

    /// Primal simplex iterations on the current (feasible) basis.
    fn simplex(&mut self, control: &mut dyn FnMut(&Tableau, bool) -> Flow, feasible: bool) -> Status {
        loop {
            let mut entering = 1;
            for (column, value) in self.rows[0].iter().enumerate().skip(1) {
                if *value < Rational::zero() && *value < self.rows[0][entering] {
                    entering = column;
                }
            }
            if self.rows[0][entering] >= Rational::zero() {
                return Status::Optimal;
            }

            let mut leaving = 0;
            for i in 1..=self.n_constraints() {
                if self.rows[i][entering] <= Rational::zero() {
                    continue;
                }
                if leaving == 0
                    || &self.rows[i][0] / &self.rows[i][entering]
                        < &self.rows[leaving][0] / &self.rows[leaving][entering]
                {
                    leaving = i;
                }
            }
            if leaving == 0 {
                return Status::Unbounded;
            }

            self.pivot(entering, leaving);
            tracing::trace!(
                component = "simplex",
                operation = "pivot",
                entering,
                leaving,
                "Pivoted"
            );
            match control(self, feasible) {
                Flow::Continue => {}
                Flow::Interrupt => return Status::Interrupted,
                Flow::Timeout => return Status::TimedOut,
            }
        }
    }

    fn pivot(&mut self, entering: usize, leaving: usize) {
        let pivot_value = self.rows[leaving][entering].clone();
        for value in self.rows[leaving].iter_mut() {
            *value /= &pivot_value;
        }
        for i in 0..self.rows.len() {
            if i == leaving {
                continue;
            }
            let multiplier = self.rows[i][entering].clone();
            if multiplier.is_zero() {
                continue;
            }
            for j in 0..self.rows[i].len() {
                let delta = &multiplier * &self.rows[leaving][j];
                self.rows[i][j] -= delta;
            }
        }
        self.basic[leaving] = entering;
    }
}
