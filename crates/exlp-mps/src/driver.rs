//! Accumulation of MPS records and finalization into the LP façade.

use std::collections::HashMap;

use exlp_core::LpProblem;
use exlp_expr::{Expression, Rational, Variable};
use exlp_solver::Bound;
use num_traits::{Signed, Zero};

use crate::bound_type::BoundType;
use crate::error::ParseError;
use crate::sense::Sense;

/// A row as accumulated from ROWS/COLUMNS/RHS/RANGES records. The declared
/// rhs and range are kept apart; the effective `[lb, ub]` interval is
/// derived only at finalization.
struct MpsRow {
    name: String,
    sense: Sense,
    addends: Vec<(Variable, Rational)>,
    rhs: Option<Rational>,
    range: Option<Rational>,
}

/// A column as accumulated from COLUMNS/BOUNDS records.
///
/// A missing upper bound means unbounded above. A missing lower bound means
/// non-negative, unless `infinite_lb` is set or the MPS negative-upper-bound
/// convention applies at finalization.
struct MpsColumn {
    var: Variable,
    lb: Option<Rational>,
    ub: Option<Rational>,
    infinite_lb: bool,
}

/// Driver bringing the reader and the LP façade together: records flow in
/// through the `add_*` methods, [`MpsDriver::end`] pushes the finished
/// problem into the façade.
pub struct MpsDriver<'a> {
    lp: &'a mut LpProblem,
    problem_name: String,
    is_min: bool,
    objname: Option<String>,
    first_n_row: Option<String>,
    rhs_name: Option<String>,
    bound_name: Option<String>,
    rows: Vec<MpsRow>,
    row_index: HashMap<String, usize>,
    columns: Vec<MpsColumn>,
    column_index: HashMap<String, usize>,
}

impl<'a> MpsDriver<'a> {
    pub fn new(lp: &'a mut LpProblem) -> Self {
        Self {
            lp,
            problem_name: String::new(),
            is_min: true,
            objname: None,
            first_n_row: None,
            rhs_name: None,
            bound_name: None,
            rows: Vec::new(),
            row_index: HashMap::new(),
            columns: Vec::new(),
            column_index: HashMap::new(),
        }
    }

    /// Mutable access to the façade being populated, for option and info
    /// records that bypass the section machinery.
    pub fn lp_mut(&mut self) -> &mut LpProblem {
        self.lp
    }

    pub fn problem_name(&self) -> &str {
        &self.problem_name
    }

    pub fn set_problem_name(&mut self, name: impl Into<String>) {
        self.problem_name = name.into();
    }

    pub fn is_min(&self) -> bool {
        self.is_min
    }

    /// Name of the row carrying the objective: the OBJNAME section wins,
    /// otherwise the first N row declared.
    pub fn obj_row(&self) -> Option<&str> {
        self.objname.as_deref().or(self.first_n_row.as_deref())
    }

    /// OBJSENSE section: `MAX` toggles maximisation.
    pub fn objective_sense(&mut self, is_min: bool) {
        tracing::trace!(component = "mps", operation = "objective_sense", is_min, "Record");
        self.is_min = is_min;
    }

    /// OBJNAME section: pick the objective row by name.
    pub fn objective_name(&mut self, row: impl Into<String>) {
        self.objname = Some(row.into());
    }

    /// ROWS record: declare a row with its sense.
    pub fn add_row(&mut self, sense: Sense, row: &str) {
        tracing::trace!(component = "mps", operation = "add_row", %sense, row, "Record");
        if sense == Sense::N && self.objname.is_none() && self.first_n_row.is_none() {
            self.first_n_row = Some(row.to_string());
        }
        if !self.row_index.contains_key(row) {
            self.row_index.insert(row.to_string(), self.rows.len());
            self.rows.push(MpsRow {
                name: row.to_string(),
                sense,
                addends: Vec::new(),
                rhs: None,
                range: None,
            });
        }
    }

    /// COLUMNS record: one `(row, value)` pair of a column. The first
    /// occurrence of a column name materializes its variable.
    pub fn add_column(
        &mut self,
        line: usize,
        column: &str,
        row: &str,
        value: Rational,
    ) -> Result<(), ParseError> {
        tracing::trace!(component = "mps", operation = "add_column", column, row, %value, "Record");
        let column_id = match self.column_index.get(column) {
            Some(id) => *id,
            None => {
                let id = self.columns.len();
                self.column_index.insert(column.to_string(), id);
                self.columns.push(MpsColumn {
                    var: Variable::new(column),
                    lb: None,
                    ub: None,
                    infinite_lb: false,
                });
                id
            }
        };
        let var = self.columns[column_id].var;

        let skip_objective = self.lp.config().skip_optimise;
        if skip_objective && self.obj_row() == Some(row) {
            return Ok(());
        }
        let row_id = *self.row_index.get(row).ok_or_else(|| ParseError::UnknownRow {
            line,
            row: row.to_string(),
        })?;
        self.rows[row_id].addends.push((var, value));
        Ok(())
    }

    /// RHS record: one `(row, value)` pair of an rhs group.
    pub fn add_rhs(
        &mut self,
        line: usize,
        group: &str,
        row: &str,
        value: Rational,
    ) -> Result<(), ParseError> {
        if !self.verify_strict_rhs(group) {
            return Ok(());
        }
        let row_id = *self.row_index.get(row).ok_or_else(|| ParseError::UnknownRow {
            line,
            row: row.to_string(),
        })?;
        if self.rows[row_id].sense == Sense::N {
            tracing::warn!(
                component = "mps",
                operation = "add_rhs",
                status = "ignored",
                row,
                "RHS on an N row has no effect"
            );
            return Ok(());
        }
        self.rows[row_id].rhs = Some(value);
        Ok(())
    }

    /// RANGES record: one `(row, value)` pair of an rhs group.
    pub fn add_range(
        &mut self,
        line: usize,
        group: &str,
        row: &str,
        value: Rational,
    ) -> Result<(), ParseError> {
        if !self.verify_strict_rhs(group) {
            return Ok(());
        }
        let row_id = *self.row_index.get(row).ok_or_else(|| ParseError::UnknownRow {
            line,
            row: row.to_string(),
        })?;
        if self.rows[row_id].sense == Sense::N {
            tracing::warn!(
                component = "mps",
                operation = "add_range",
                status = "ignored",
                row,
                "RANGES on an N row has no effect"
            );
            return Ok(());
        }
        self.rows[row_id].range = Some(value);
        Ok(())
    }

    /// BOUNDS record. Value-carrying types must supply `value`.
    pub fn add_bound(
        &mut self,
        line: usize,
        bound_type: BoundType,
        group: &str,
        column: &str,
        value: Option<Rational>,
    ) -> Result<(), ParseError> {
        if !self.verify_strict_bound(group) {
            return Ok(());
        }
        let column_id =
            *self
                .column_index
                .get(column)
                .ok_or_else(|| ParseError::UnknownColumn {
                    line,
                    column: column.to_string(),
                })?;
        let entry = &mut self.columns[column_id];

        if bound_type.takes_value() {
            let value = value.ok_or_else(|| ParseError::MalformedRecord {
                line,
                reason: format!("bound type {bound_type} requires a value"),
            })?;
            match bound_type {
                BoundType::Up | BoundType::Ui => entry.ub = Some(value),
                BoundType::Lo | BoundType::Li => entry.lb = Some(value),
                BoundType::Fx => {
                    entry.lb = Some(value.clone());
                    entry.ub = Some(value);
                }
                _ => unreachable!(),
            }
        } else {
            match bound_type {
                BoundType::Bv => {
                    entry.lb = Some(Rational::zero());
                    entry.ub = Some(Rational::from_integer(1.into()));
                }
                BoundType::Fr | BoundType::Mi => entry.infinite_lb = true,
                BoundType::Pl => {}
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    /// ENDATA: finalize the accumulated problem into the façade.
    pub fn end(self) {
        let Self {
            lp,
            problem_name,
            is_min,
            objname,
            first_n_row,
            rows,
            columns,
            ..
        } = self;
        let obj_row = objname.or(first_n_row);

        lp.reserve_columns(columns.len());
        lp.reserve_rows(rows.len());

        let mut crossed_bounds = false;
        for column in &columns {
            let lb = match (&column.lb, &column.ub) {
                (Some(lb), _) => Bound::Finite(lb.clone()),
                (None, _) if column.infinite_lb => Bound::NegInfinity,
                (None, Some(ub)) if ub < &Rational::zero() => Bound::NegInfinity,
                (None, _) => Bound::Finite(Rational::zero()),
            };
            let ub = Bound::upper_from(column.ub.clone());
            // The façade rejects crossed bounds outright; an MPS file that
            // declares them still parses, it just describes an infeasible
            // problem. Collapse the column and record the contradiction.
            if lp
                .add_column_with_bounds(column.var, lb.clone(), ub)
                .is_err()
            {
                tracing::warn!(
                    component = "mps",
                    operation = "end",
                    status = "crossed_bounds",
                    column = %column.var,
                    "Column bounds cross; problem is infeasible"
                );
                let _ = lp.add_column_with_bounds(column.var, lb.clone(), lb);
                crossed_bounds = true;
            }
        }

        let mut objective = Expression::new();
        for row in rows {
            if Some(row.name.as_str()) == obj_row.as_deref() {
                objective = Expression::from_terms(row.addends);
                continue;
            }
            if row.sense == Sense::N {
                continue;
            }
            if row.addends.is_empty() {
                tracing::warn!(
                    component = "mps",
                    operation = "end",
                    status = "skipped",
                    row = row.name.as_str(),
                    "Row has no addends"
                );
                continue;
            }
            if row.rhs.is_none() && row.range.is_none() {
                tracing::warn!(
                    component = "mps",
                    operation = "end",
                    status = "defaulted",
                    row = row.name.as_str(),
                    "Row has no RHS; assuming 0"
                );
            }
            let rhs = row.rhs.unwrap_or_else(Rational::zero);
            let (lb, ub) = match row.sense {
                Sense::L => {
                    let lb = row.range.map(|range| &rhs - range.abs());
                    (Bound::lower_from(lb), Bound::Finite(rhs))
                }
                Sense::G => {
                    let ub = row.range.map(|range| &rhs + range.abs());
                    (Bound::Finite(rhs), Bound::upper_from(ub))
                }
                Sense::E => match row.range {
                    Some(range) if range.is_positive() => {
                        (Bound::Finite(rhs.clone()), Bound::Finite(&rhs + range))
                    }
                    Some(range) if range.is_negative() => {
                        (Bound::Finite(&rhs + range), Bound::Finite(rhs))
                    }
                    _ => (Bound::Finite(rhs.clone()), Bound::Finite(rhs)),
                },
                Sense::N => unreachable!(),
            };
            // Unresolvable only through driver bugs: every addend variable
            // was added as a column above.
            let _ = lp.add_row(row.addends, lb, ub);
        }

        if crossed_bounds {
            // An addend-free row with crossed bounds is unsatisfiable and
            // carries the contradiction into the solver.
            let _ = lp.add_row(
                Vec::new(),
                Bound::Finite(Rational::from_integer(1.into())),
                Bound::Finite(Rational::zero()),
            );
        }

        if !objective.is_empty() {
            let result = if is_min {
                lp.minimise(&objective)
            } else {
                lp.maximise(&objective)
            };
            debug_assert!(result.is_ok());
        }

        tracing::debug!(
            component = "mps",
            operation = "end",
            status = "success",
            problem = problem_name.as_str(),
            columns = lp.num_columns(),
            rows = lp.num_rows(),
            is_min,
            "Finalized MPS problem"
        );
    }

    /// In strict mode only the first rhs group name is honored; records of
    /// other groups are skipped with a warning.
    fn verify_strict_rhs(&mut self, group: &str) -> bool {
        if !self.lp.config().strict_mps {
            return true;
        }
        match &self.rhs_name {
            None => {
                self.rhs_name = Some(group.to_string());
                true
            }
            Some(name) if name == group => true,
            Some(name) => {
                tracing::warn!(
                    component = "mps",
                    operation = "verify_strict_rhs",
                    status = "skipped",
                    first = %name,
                    found = group,
                    "RHS group mismatch in strict mode"
                );
                false
            }
        }
    }

    /// Strict-mode group check for BOUNDS records.
    fn verify_strict_bound(&mut self, group: &str) -> bool {
        if !self.lp.config().strict_mps {
            return true;
        }
        match &self.bound_name {
            None => {
                self.bound_name = Some(group.to_string());
                true
            }
            Some(name) if name == group => true,
            Some(name) => {
                tracing::warn!(
                    component = "mps",
                    operation = "verify_strict_bound",
                    status = "skipped",
                    first = %name,
                    found = group,
                    "BOUNDS group mismatch in strict mode"
                );
                false
            }
        }
    }
}
