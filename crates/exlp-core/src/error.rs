//! Façade error types.

use exlp_expr::{FormulaKind, Variable};
use exlp_solver::Bound;

/// Errors that can occur while building or solving an LP problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LpError {
    /// The variable is already linked to a column.
    DuplicateVariable(Variable),
    /// The variable is not linked to any column.
    UnmappedVariable(Variable),
    /// The dummy variable cannot take part in a problem.
    DummyVariable,
    /// Lower bound above upper bound.
    InvalidBounds { lower: Bound, upper: Bound },
    /// Row index out of range.
    InvalidRowIndex(usize),
    /// Column index out of range.
    InvalidColumnIndex(usize),
    /// Formula kind not representable as a row.
    UnsupportedFormulaKind(FormulaKind),
    /// Solving requires at least one row and one column.
    EmptyProblem,
}

impl LpError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LpError::DuplicateVariable(_) => "VARIABLE_DUPLICATE",
            LpError::UnmappedVariable(_) => "VARIABLE_UNMAPPED",
            LpError::DummyVariable => "VARIABLE_DUMMY",
            LpError::InvalidBounds { .. } => "BOUNDS_INVALID",
            LpError::InvalidRowIndex(_) => "ROW_INVALID_INDEX",
            LpError::InvalidColumnIndex(_) => "COLUMN_INVALID_INDEX",
            LpError::UnsupportedFormulaKind(_) => "FORMULA_UNSUPPORTED_KIND",
            LpError::EmptyProblem => "PROBLEM_EMPTY",
        }
    }
}

impl std::fmt::Display for LpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LpError::DuplicateVariable(var) => {
                write!(f, "[{}] Variable '{}' already exists in the LP", self.code(), var)
            }
            LpError::UnmappedVariable(var) => {
                write!(f, "[{}] Variable '{}' has no column in the LP", self.code(), var)
            }
            LpError::DummyVariable => {
                write!(f, "[{}] The dummy variable cannot be used in an LP", self.code())
            }
            LpError::InvalidBounds { lower, upper } => write!(
                f,
                "[{}] Bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            LpError::InvalidRowIndex(index) => {
                write!(f, "[{}] Row index {} out of range", self.code(), index)
            }
            LpError::InvalidColumnIndex(index) => {
                write!(f, "[{}] Column index {} out of range", self.code(), index)
            }
            LpError::UnsupportedFormulaKind(kind) => write!(
                f,
                "[{}] Formula kind '{}' cannot be added as a row",
                self.code(),
                kind
            ),
            LpError::EmptyProblem => write!(
                f,
                "[{}] Cannot solve without at least one row and one column",
                self.code()
            ),
        }
    }
}

impl std::error::Error for LpError {}
