//! Views of the problem structure and of the stored solution.

use std::collections::HashMap;
use std::str::FromStr;

use exlp_expr::{Expression, Formula, Rational, Variable};
use exlp_solver::{Bound, LpResult};

use crate::error::LpError;
use crate::problem::LpProblem;
use crate::types::{Column, Row};

impl LpProblem {
    /// Variables in column order.
    pub fn variables(&self) -> &[Variable] {
        &self.col_to_var
    }

    /// The variable linked to `column`.
    ///
    /// Panics when the column index is out of range.
    pub fn var(&self, column: usize) -> Variable {
        self.col_to_var[column]
    }

    /// The column at `index`.
    pub fn column(&self, index: usize) -> Result<Column, LpError> {
        if index >= self.backend.num_columns() {
            return Err(LpError::InvalidColumnIndex(index));
        }
        let column = self.backend.column(index);
        Ok(Column {
            var: self.col_to_var[index],
            lb: column.lb,
            ub: column.ub,
            obj: column.obj,
        })
    }

    /// The row at `index`.
    pub fn row(&self, index: usize) -> Result<Row, LpError> {
        if index >= self.backend.num_rows() {
            return Err(LpError::InvalidRowIndex(index));
        }
        let row = self.backend.row(index);
        Ok(Row {
            addends: row
                .entries
                .into_iter()
                .map(|(column, coeff)| (self.col_to_var[column], coeff))
                .collect(),
            lb: row.lb,
            ub: row.ub,
        })
    }

    /// The whole problem as a list of formulas: every row contributes its
    /// one- or two-sided comparisons and every finite column bound
    /// contributes a single-variable formula, so rows folded into bounds by
    /// the simple-bound shortcut are still represented.
    pub fn constraints(&self) -> Vec<Formula> {
        let mut formulas = Vec::new();
        for index in 0..self.backend.num_rows() {
            let row = self.backend.row(index);
            let expr = Expression::from_terms(
                row.entries
                    .iter()
                    .map(|(column, coeff)| (self.col_to_var[*column], coeff.clone())),
            );
            push_interval(&mut formulas, &expr, &row.lb, &row.ub);
        }
        for index in 0..self.backend.num_columns() {
            let column = self.backend.column(index);
            let expr = Expression::from(self.col_to_var[index]);
            push_interval(&mut formulas, &expr, &column.lb, &column.ub);
        }
        formulas
    }

    /// Mapping between every variable and its value in the stored solution.
    pub fn model(&self) -> HashMap<Variable, Rational> {
        self.col_to_var
            .iter()
            .zip(&self.solution)
            .map(|(var, value)| (*var, value.clone()))
            .collect()
    }

    /// Value of `var` in the stored solution.
    pub fn solution_of(&self, var: Variable) -> Option<&Rational> {
        self.var_to_col
            .get(&var)
            .and_then(|column| self.solution.get(*column))
    }

    /// The verdict announced by the input through `:status`, if any.
    pub fn expected(&self) -> LpResult {
        self.info
            .get(":status")
            .and_then(|value| LpResult::from_str(value).ok())
            .unwrap_or(LpResult::Unsolved)
    }

    /// Whether `result` is compatible with the verdict announced by the
    /// input. An exact optimum is accepted where a delta optimum was
    /// announced and vice versa.
    pub fn check_against_expected(&self, result: LpResult) -> bool {
        let expected = self.expected();
        expected == LpResult::Unsolved
            || expected == result
            || expected.relaxed() == result
            || expected == result.relaxed()
    }
}

fn push_interval(formulas: &mut Vec<Formula>, expr: &Expression, lb: &Bound, ub: &Bound) {
    match (lb, ub) {
        (Bound::Finite(lb), Bound::Finite(ub)) if lb == ub => {
            formulas.push(expr.eq_rat(lb.clone()));
        }
        (lb, ub) => {
            if let Bound::Finite(lb) = lb {
                formulas.push(expr.geq_rat(lb.clone()));
            }
            if let Bound::Finite(ub) = ub {
                formulas.push(expr.leq_rat(ub.clone()));
            }
        }
    }
}
