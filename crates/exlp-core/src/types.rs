//! Inspection views of the problem structure.

use std::fmt;

use exlp_expr::{Rational, Variable};
use exlp_solver::Bound;

/// A column of the LP as seen through the façade: the linked variable, its
/// bounds and its objective coefficient in minimisation sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub var: Variable,
    pub lb: Bound,
    pub ub: Bound,
    pub obj: Rational,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in [{}, {}]", self.var, self.lb, self.ub)
    }
}

/// A row of the LP: `lb <= sum of addends <= ub`, with addends over the
/// façade's variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub addends: Vec<(Variable, Rational)>,
    pub lb: Bound,
    pub ub: Bound,
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= ", self.lb)?;
        for (i, (var, coeff)) in self.addends.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{coeff}*{var}")?;
        }
        write!(f, " <= {}", self.ub)
    }
}
