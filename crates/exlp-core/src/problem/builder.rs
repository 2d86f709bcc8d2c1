//! Methods for growing and mutating the LP problem.

use std::collections::BTreeMap;

use exlp_expr::{Expression, Formula, FormulaKind, Rational, Variable};
use exlp_solver::{Bound, LpResult};
use num_traits::Zero;

use crate::error::LpError;
use crate::problem::LpProblem;

impl LpProblem {
    /// Add a non-negative, unbounded-above column for `var` with objective
    /// coefficient 0.
    pub fn add_column(&mut self, var: Variable) -> Result<usize, LpError> {
        self.add_column_full(
            var,
            Rational::zero(),
            Bound::Finite(Rational::zero()),
            Bound::Infinity,
        )
    }

    /// Add a non-negative column with the given minimisation objective
    /// coefficient.
    pub fn add_column_with_objective(
        &mut self,
        var: Variable,
        obj: Rational,
    ) -> Result<usize, LpError> {
        self.add_column_full(var, obj, Bound::Finite(Rational::zero()), Bound::Infinity)
    }

    /// Add a column bounded to `[lb, ub]` with objective coefficient 0.
    pub fn add_column_with_bounds(
        &mut self,
        var: Variable,
        lb: Bound,
        ub: Bound,
    ) -> Result<usize, LpError> {
        self.add_column_full(var, Rational::zero(), lb, ub)
    }

    /// Add a column with objective coefficient and bounds, linking `var` to
    /// the returned column index.
    pub fn add_column_full(
        &mut self,
        var: Variable,
        obj: Rational,
        lb: Bound,
        ub: Bound,
    ) -> Result<usize, LpError> {
        if var.is_dummy() {
            return Err(LpError::DummyVariable);
        }
        if self.var_to_col.contains_key(&var) {
            return Err(LpError::DuplicateVariable(var));
        }
        if lb > ub {
            return Err(LpError::InvalidBounds {
                lower: lb,
                upper: ub,
            });
        }

        let index = self.backend.add_column(obj, lb, ub);
        self.var_to_col.insert(var, index);
        self.col_to_var.push(var);
        self.result = LpResult::Unsolved;
        tracing::debug!(
            component = "problem",
            operation = "add_column",
            status = "success",
            var = %var,
            index,
            "Added column"
        );
        Ok(index)
    }

    /// Add the two-sided row `lb <= addends <= ub`.
    ///
    /// Addends are coalesced per variable and zero coefficients dropped
    /// before the row reaches the backend. A row with exactly one addend is
    /// folded into the column's bounds instead of becoming a backend row; in
    /// that case the returned index refers to the last row added so far.
    pub fn add_row(
        &mut self,
        addends: Vec<(Variable, Rational)>,
        lb: Bound,
        ub: Bound,
    ) -> Result<usize, LpError> {
        let normalized = self.normalize_addends(addends)?;
        if let [(var, coeff)] = normalized.as_slice() {
            return self.fold_simple_bound(*var, coeff, lb, ub);
        }

        let entries = normalized
            .iter()
            .map(|(var, coeff)| (self.var_to_col[var], coeff.clone()))
            .collect();
        let index = self.backend.add_row(entries, lb, ub);
        self.result = LpResult::Unsolved;
        tracing::debug!(
            component = "problem",
            operation = "add_row",
            status = "success",
            index,
            addends = normalized.len(),
            "Added row"
        );
        Ok(index)
    }

    /// Add a formula-style row. Only `Eq`, `Leq` and `Geq` formulas are
    /// representable.
    pub fn add_formula(&mut self, formula: &Formula) -> Result<usize, LpError> {
        let rhs = formula.rhs().clone();
        let (lb, ub) = match formula.kind() {
            FormulaKind::Eq => (Bound::Finite(rhs.clone()), Bound::Finite(rhs)),
            FormulaKind::Leq => (Bound::NegInfinity, Bound::Finite(rhs)),
            FormulaKind::Geq => (Bound::Finite(rhs), Bound::Infinity),
            other => return Err(LpError::UnsupportedFormulaKind(other)),
        };
        let addends = formula
            .expression()
            .addends()
            .iter()
            .map(|(var, coeff)| (*var, coeff.clone()))
            .collect();
        self.add_row(addends, lb, ub)
    }

    /// Replace the constraint matrix entry at `(row, column)`.
    pub fn set_coefficient(
        &mut self,
        row: usize,
        column: usize,
        value: Rational,
    ) -> Result<(), LpError> {
        if row >= self.backend.num_rows() {
            return Err(LpError::InvalidRowIndex(row));
        }
        if column >= self.backend.num_columns() {
            return Err(LpError::InvalidColumnIndex(column));
        }
        self.backend.set_coefficient(row, column, value);
        self.result = LpResult::Unsolved;
        Ok(())
    }

    /// Replace the bounds of the column linked to `var`.
    pub fn set_bound(&mut self, var: Variable, lb: Bound, ub: Bound) -> Result<(), LpError> {
        let column = self.column_of(var)?;
        if lb > ub {
            return Err(LpError::InvalidBounds {
                lower: lb,
                upper: ub,
            });
        }
        self.backend.set_bound(column, lb, ub);
        self.result = LpResult::Unsolved;
        Ok(())
    }

    /// Replace the objective coefficient of `column` (minimisation sense).
    pub fn set_objective(&mut self, column: usize, value: Rational) -> Result<(), LpError> {
        if column >= self.backend.num_columns() {
            return Err(LpError::InvalidColumnIndex(column));
        }
        self.backend.set_objective(column, value);
        self.result = LpResult::Unsolved;
        Ok(())
    }

    /// Minimise `objective`: the objective coefficient of every variable the
    /// expression names is replaced; all other coefficients stay untouched,
    /// so the objective can be built incrementally.
    pub fn minimise(&mut self, objective: &Expression) -> Result<(), LpError> {
        self.accumulate_objective(objective, false)
    }

    /// Maximise `objective` by minimising its negation; see
    /// [`LpProblem::minimise`] for the accumulation contract.
    pub fn maximise(&mut self, objective: &Expression) -> Result<(), LpError> {
        self.accumulate_objective(objective, true)
    }

    fn accumulate_objective(
        &mut self,
        objective: &Expression,
        negate: bool,
    ) -> Result<(), LpError> {
        let mut updates = Vec::with_capacity(objective.addends().len());
        for (var, coeff) in objective.addends().iter() {
            let column = self.column_of(*var)?;
            let value = if negate { -coeff.clone() } else { coeff.clone() };
            updates.push((column, value));
        }
        for (column, value) in updates {
            self.backend.set_objective(column, value);
        }
        self.result = LpResult::Unsolved;
        tracing::debug!(
            component = "problem",
            operation = "set_objective",
            status = "success",
            negated = negate,
            terms = objective.addends().len(),
            "Accumulated objective"
        );
        Ok(())
    }

    pub(crate) fn column_of(&self, var: Variable) -> Result<usize, LpError> {
        self.var_to_col
            .get(&var)
            .copied()
            .ok_or(LpError::UnmappedVariable(var))
    }

    /// Coalesce duplicate variables, drop zero coefficients and check that
    /// every referenced variable is mapped.
    fn normalize_addends(
        &self,
        addends: Vec<(Variable, Rational)>,
    ) -> Result<Vec<(Variable, Rational)>, LpError> {
        let mut merged: BTreeMap<Variable, Rational> = BTreeMap::new();
        for (var, coeff) in addends {
            self.column_of(var)?;
            *merged.entry(var).or_insert_with(Rational::zero) += coeff;
        }
        Ok(merged
            .into_iter()
            .filter(|(_, coeff)| !coeff.is_zero())
            .collect())
    }

    /// Rewrite the single-addend row `lb <= coeff * var <= ub` as column
    /// bounds, intersected with the bounds already stored for the column.
    fn fold_simple_bound(
        &mut self,
        var: Variable,
        coeff: &Rational,
        lb: Bound,
        ub: Bound,
    ) -> Result<usize, LpError> {
        let column = self.column_of(var)?;
        let (mut new_lb, mut new_ub) = if coeff > &Rational::zero() {
            (lb.div(coeff), ub.div(coeff))
        } else {
            (ub.div(coeff), lb.div(coeff))
        };

        let current = self.backend.column(column);
        new_lb = new_lb.max(current.lb);
        new_ub = new_ub.min(current.ub);
        self.backend.set_bound(column, new_lb, new_ub);
        self.result = LpResult::Unsolved;
        tracing::debug!(
            component = "problem",
            operation = "add_row",
            status = "simple_bound",
            var = %var,
            "Folded single-addend row into column bounds"
        );
        Ok(self.backend.num_rows().saturating_sub(1))
    }
}
