//! The delta-optimality solve loop and solution verification.

use exlp_expr::Rational;
use exlp_solver::Bound;
use exlp_solver::LpResult;
use num_traits::Zero;

use crate::error::LpError;
use crate::problem::{LpProblem, SolveSummary};

impl LpProblem {
    /// Optimise the problem with the given `precision`, which is updated to
    /// the achieved precision on return.
    ///
    /// A zero precision demands an exact rational optimum. On a feasible
    /// verdict the primal and dual vectors are stored when `store_solution`
    /// is set; on infeasibility the dual holds a Farkas certificate when the
    /// backend provides one. The solve callback, if installed, is invoked
    /// exactly once with the outcome.
    pub fn solve(
        &mut self,
        precision: &mut Rational,
        store_solution: bool,
    ) -> Result<LpResult, LpError> {
        if self.backend.num_rows() == 0 || self.backend.num_columns() == 0 {
            return Err(LpError::EmptyProblem);
        }

        self.solution.clear();
        self.dual_solution.clear();
        self.backend.set_time_limit(self.config.timeout);

        let partial: Option<exlp_solver::PartialSolveFn<'_>> = if self.config.continuous_output {
            match self.partial_cb.as_mut() {
                Some(cb) => Some(cb.as_mut()),
                None => None,
            }
        } else {
            None
        };
        let outcome = self.backend.solve(precision, store_solution, partial);

        self.result = outcome.result;
        self.obj_lb = outcome.obj_lb;
        self.obj_ub = outcome.obj_ub;
        self.solution = outcome.primal;
        self.dual_solution = outcome.dual;
        *precision = outcome.precision;

        tracing::debug!(
            component = "problem",
            operation = "solve",
            status = %self.result,
            columns = self.backend.num_columns(),
            rows = self.backend.num_rows(),
            "Solve finished"
        );

        let mut callback = self.solve_cb.take();
        if let Some(callback) = callback.as_mut() {
            callback(&SolveSummary {
                result: self.result,
                primal: &self.solution,
                dual: &self.dual_solution,
                obj_lb: &self.obj_lb,
                obj_ub: &self.obj_ub,
                precision,
            });
        }
        self.solve_cb = callback;

        Ok(self.result)
    }

    /// Check the stored solution against every column bound and every row's
    /// two-sided bounds, exactly.
    ///
    /// With no stored solution there is nothing to refute and the check
    /// vacuously passes.
    pub fn verify(&self) -> bool {
        if self.solution.is_empty() {
            return true;
        }
        for index in 0..self.backend.num_columns() {
            let column = self.backend.column(index);
            let value = Bound::Finite(self.solution[index].clone());
            if value < column.lb || value > column.ub {
                tracing::debug!(
                    component = "problem",
                    operation = "verify",
                    status = "violated",
                    column = index,
                    "Column bound violated"
                );
                return false;
            }
        }
        for index in 0..self.backend.num_rows() {
            let row = self.backend.row(index);
            let mut activity = Rational::zero();
            for (column, coeff) in &row.entries {
                activity += coeff * &self.solution[*column];
            }
            let activity = Bound::Finite(activity);
            if activity < row.lb || activity > row.ub {
                tracing::debug!(
                    component = "problem",
                    operation = "verify",
                    status = "violated",
                    row = index,
                    "Row bounds violated"
                );
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exlp_expr::{Expression, Variable};
    use exlp_simplex::SimplexBackend;
    use exlp_solver::Config;

    fn r(n: i64) -> Rational {
        Rational::from_integer(n.into())
    }

    fn problem() -> LpProblem {
        LpProblem::new(Box::new(SimplexBackend::new()))
    }

    #[test]
    fn empty_problem_cannot_be_solved() {
        let mut lp = problem();
        let mut precision = r(0);
        assert_eq!(
            lp.solve(&mut precision, true),
            Err(LpError::EmptyProblem)
        );
    }

    #[test]
    fn small_feasibility_scenario() {
        // min 9x + y subject to x + y >= 10, x >= 0, y >= 0.
        let mut lp = problem();
        let x = Variable::new("x");
        let y = Variable::new("y");
        lp.add_column(x).unwrap();
        lp.add_column(y).unwrap();
        lp.add_row(
            vec![(x, r(1)), (y, r(1))],
            Bound::Finite(r(10)),
            Bound::Infinity,
        )
        .unwrap();
        let mut objective = Expression::term(x, r(9));
        Expression::add(&mut objective, y, &r(1));
        lp.minimise(&objective).unwrap();

        let mut precision = r(0);
        let result = lp.solve(&mut precision, true).unwrap();
        assert_eq!(result, LpResult::Optimal);
        assert_eq!(lp.solution_of(x), Some(&r(0)));
        assert_eq!(lp.solution_of(y), Some(&r(10)));
        assert_eq!(lp.objective_bounds().0, &Bound::Finite(r(10)));
        assert_eq!(lp.objective_bounds().1, &Bound::Finite(r(10)));
        assert_eq!(precision, r(0));
        assert!(lp.verify());
    }

    #[test]
    fn maximise_negates_the_backend_objective() {
        // max 2x + 3y over the classic polytope: optimum 28 at (5, 6).
        let mut lp = problem();
        let x = Variable::new("x");
        let y = Variable::new("y");
        lp.add_column(x).unwrap();
        lp.add_column(y).unwrap();
        lp.add_row(
            vec![(x, r(2)), (y, r(1))],
            Bound::NegInfinity,
            Bound::Finite(r(18)),
        )
        .unwrap();
        lp.add_row(
            vec![(x, r(6)), (y, r(5))],
            Bound::NegInfinity,
            Bound::Finite(r(60)),
        )
        .unwrap();
        lp.add_row(
            vec![(x, r(2)), (y, r(5))],
            Bound::NegInfinity,
            Bound::Finite(r(40)),
        )
        .unwrap();
        let mut objective = Expression::term(x, r(2));
        Expression::add(&mut objective, y, &r(3));
        lp.maximise(&objective).unwrap();

        let mut precision = r(0);
        let result = lp.solve(&mut precision, true).unwrap();
        assert_eq!(result, LpResult::Optimal);
        assert_eq!(lp.solution_of(x), Some(&r(5)));
        assert_eq!(lp.solution_of(y), Some(&r(6)));
        // The backend minimises the negated objective.
        assert_eq!(lp.objective_bounds().0, &Bound::Finite(r(-28)));
        assert!(lp.verify());
    }

    #[test]
    fn verdict_resets_on_mutation() {
        let mut lp = problem();
        let x = Variable::new("x");
        lp.add_column(x).unwrap();
        let y = Variable::new("y");
        lp.add_column(y).unwrap();
        lp.add_row(
            vec![(x, r(1)), (y, r(1))],
            Bound::Finite(r(1)),
            Bound::Infinity,
        )
        .unwrap();

        let mut precision = r(0);
        lp.solve(&mut precision, true).unwrap();
        assert_eq!(lp.result(), LpResult::Optimal);

        lp.set_objective(0, r(5)).unwrap();
        assert_eq!(lp.result(), LpResult::Unsolved);
    }

    #[test]
    fn solve_callback_fires_once_with_the_outcome() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut lp = problem();
        let x = Variable::new("x");
        let y = Variable::new("y");
        lp.add_column(x).unwrap();
        lp.add_column(y).unwrap();
        lp.add_row(
            vec![(x, r(1)), (y, r(1))],
            Bound::Finite(r(10)),
            Bound::Infinity,
        )
        .unwrap();

        let seen: Rc<RefCell<Vec<LpResult>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        lp.set_solve_callback(Box::new(move |summary| {
            sink.borrow_mut().push(summary.result);
        }));

        let mut precision = r(0);
        lp.solve(&mut precision, true).unwrap();
        assert_eq!(seen.borrow().as_slice(), &[LpResult::Optimal]);
    }

    #[test]
    fn partial_callback_requires_continuous_output() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let build = |continuous: bool| {
            let config = Config::new().with_continuous_output(continuous);
            let mut lp =
                LpProblem::with_config(Box::new(SimplexBackend::new()), config);
            let x = Variable::new("x");
            let y = Variable::new("y");
            lp.add_column_with_objective(x, r(-2)).unwrap();
            lp.add_column_with_objective(y, r(-3)).unwrap();
            lp.add_row(
                vec![(x, r(2)), (y, r(1))],
                Bound::NegInfinity,
                Bound::Finite(r(18)),
            )
            .unwrap();
            lp.add_row(
                vec![(x, r(6)), (y, r(5))],
                Bound::NegInfinity,
                Bound::Finite(r(60)),
            )
            .unwrap();
            lp
        };

        for (continuous, expect_calls) in [(false, false), (true, true)] {
            let mut lp = build(continuous);
            let calls = Rc::new(RefCell::new(0usize));
            let sink = Rc::clone(&calls);
            lp.set_partial_callback(Box::new(move |_| {
                *sink.borrow_mut() += 1;
                true
            }));
            let mut precision = r(0);
            lp.solve(&mut precision, true).unwrap();
            assert_eq!(*calls.borrow() > 0, expect_calls);
        }
    }

    #[test]
    fn infeasible_problem_reports_infeasible() {
        let mut lp = problem();
        let x = Variable::new("x");
        lp.add_column_with_bounds(x, Bound::Finite(r(0)), Bound::Finite(r(1)))
            .unwrap();
        let y = Variable::new("y");
        lp.add_column(y).unwrap();
        lp.add_row(
            vec![(x, r(1))],
            Bound::Finite(r(5)),
            Bound::Infinity,
        )
        .unwrap();
        // The single-addend row tightened x to an empty interval.
        lp.add_row(
            vec![(x, r(1)), (y, r(1))],
            Bound::Finite(r(0)),
            Bound::Infinity,
        )
        .unwrap();

        let mut precision = r(0);
        let result = lp.solve(&mut precision, true).unwrap();
        assert_eq!(result, LpResult::Infeasible);
        assert!(lp.solution().is_empty());
        assert!(lp.verify());
    }
}
