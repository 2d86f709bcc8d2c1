//! Relational formulas over linear expressions.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Neg, Not};

use crate::expr::Expression;
use crate::var::Variable;
use crate::Rational;

/// Kinds of relational formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormulaKind {
    /// =
    Eq,
    /// !=
    Neq,
    /// >
    Gt,
    /// >=
    Geq,
    /// <
    Lt,
    /// <=
    Leq,
}

impl FormulaKind {
    /// Symbol used when printing the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            FormulaKind::Eq => "=",
            FormulaKind::Neq => "!=",
            FormulaKind::Gt => ">",
            FormulaKind::Geq => ">=",
            FormulaKind::Lt => "<",
            FormulaKind::Leq => "<=",
        }
    }

    /// Whether `lhs kind rhs` holds for the given rationals.
    pub fn holds(self, lhs: &Rational, rhs: &Rational) -> bool {
        match self {
            FormulaKind::Eq => lhs == rhs,
            FormulaKind::Neq => lhs != rhs,
            FormulaKind::Gt => lhs > rhs,
            FormulaKind::Geq => lhs >= rhs,
            FormulaKind::Lt => lhs < rhs,
            FormulaKind::Leq => lhs <= rhs,
        }
    }
}

impl Neg for FormulaKind {
    type Output = FormulaKind;

    /// Kind that keeps the comparison satisfied after both sides are
    /// multiplied by -1.
    fn neg(self) -> FormulaKind {
        match self {
            FormulaKind::Eq => FormulaKind::Eq,
            FormulaKind::Neq => FormulaKind::Neq,
            FormulaKind::Gt => FormulaKind::Lt,
            FormulaKind::Geq => FormulaKind::Leq,
            FormulaKind::Lt => FormulaKind::Gt,
            FormulaKind::Leq => FormulaKind::Geq,
        }
    }
}

impl Not for FormulaKind {
    type Output = FormulaKind;

    /// Kind of the logically negated comparison.
    fn not(self) -> FormulaKind {
        match self {
            FormulaKind::Eq => FormulaKind::Neq,
            FormulaKind::Neq => FormulaKind::Eq,
            FormulaKind::Gt => FormulaKind::Leq,
            FormulaKind::Geq => FormulaKind::Lt,
            FormulaKind::Lt => FormulaKind::Geq,
            FormulaKind::Leq => FormulaKind::Gt,
        }
    }
}

impl fmt::Display for FormulaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A relational constraint `expression kind rhs` with a rational rhs.
///
/// Formulas are value types; ordering is lexicographic on
/// `(kind, rhs, expression)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Formula {
    kind: FormulaKind,
    rhs: Rational,
    expression: Expression,
}

impl Formula {
    pub fn new(expression: Expression, kind: FormulaKind, rhs: Rational) -> Self {
        Self {
            kind,
            rhs,
            expression,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn kind(&self) -> FormulaKind {
        self.kind
    }

    pub fn rhs(&self) -> &Rational {
        &self.rhs
    }

    /// Evaluate `expression kind rhs` under `env`.
    ///
    /// Panics if a variable of the expression is missing from `env`.
    pub fn evaluate(&self, env: &HashMap<Variable, Rational>) -> bool {
        self.kind.holds(&self.expression.evaluate(env), &self.rhs)
    }

    /// Apply a variable substitution to the left-hand side, leaving kind and
    /// rhs untouched.
    pub fn substitute(&self, sigma: &HashMap<Variable, Variable>) -> Self {
        Self {
            kind: self.kind,
            rhs: self.rhs.clone(),
            expression: self.expression.substitute(sigma),
        }
    }
}

impl PartialOrd for Formula {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Formula {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.rhs.cmp(&other.rhs))
            .then_with(|| self.expression.cmp(&other.expression))
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expression, self.kind, self.rhs)
    }
}

impl Expression {
    /// Build `self kind rhs` against a rational literal.
    pub fn compare(&self, kind: FormulaKind, rhs: Rational) -> Formula {
        Formula::new(self.clone(), kind, rhs)
    }

    /// Build `self kind other` between two expressions: the right-hand side
    /// folds into the left and the literal becomes 0.
    pub fn compare_expr(&self, kind: FormulaKind, other: &Expression) -> Formula {
        let mut lhs = self.clone();
        lhs -= other;
        Formula::new(lhs, kind, Rational::from_integer(0.into()))
    }

    pub fn eq_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Eq, rhs)
    }

    pub fn neq_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Neq, rhs)
    }

    pub fn lt_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Lt, rhs)
    }

    pub fn leq_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Leq, rhs)
    }

    pub fn gt_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Gt, rhs)
    }

    pub fn geq_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Geq, rhs)
    }

    pub fn eq_expr(&self, other: &Expression) -> Formula {
        self.compare_expr(FormulaKind::Eq, other)
    }

    pub fn leq_expr(&self, other: &Expression) -> Formula {
        self.compare_expr(FormulaKind::Leq, other)
    }

    pub fn geq_expr(&self, other: &Expression) -> Formula {
        self.compare_expr(FormulaKind::Geq, other)
    }
}

impl Variable {
    /// Build `self kind rhs` against a rational literal.
    pub fn compare(&self, kind: FormulaKind, rhs: Rational) -> Formula {
        Expression::from(*self).compare(kind, rhs)
    }

    pub fn eq_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Eq, rhs)
    }

    pub fn leq_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Leq, rhs)
    }

    pub fn geq_rat(&self, rhs: Rational) -> Formula {
        self.compare(FormulaKind::Geq, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn r(n: i64) -> Rational {
        Rational::from_integer(n.into())
    }

    const ALL_KINDS: [FormulaKind; 6] = [
        FormulaKind::Eq,
        FormulaKind::Neq,
        FormulaKind::Gt,
        FormulaKind::Geq,
        FormulaKind::Lt,
        FormulaKind::Leq,
    ];

    #[test]
    fn double_negation_is_identity() {
        for kind in ALL_KINDS {
            assert_eq!(--kind, kind);
            assert_eq!(!!kind, kind);
        }
    }

    #[test]
    fn mirror_swaps_strict_and_loose_directions() {
        assert_eq!(-FormulaKind::Gt, FormulaKind::Lt);
        assert_eq!(-FormulaKind::Geq, FormulaKind::Leq);
        assert_eq!(-FormulaKind::Eq, FormulaKind::Eq);
        assert_eq!(-FormulaKind::Neq, FormulaKind::Neq);
    }

    #[test]
    fn logical_negation_pairs() {
        assert_eq!(!FormulaKind::Eq, FormulaKind::Neq);
        assert_eq!(!FormulaKind::Lt, FormulaKind::Geq);
        assert_eq!(!FormulaKind::Leq, FormulaKind::Gt);
    }

    #[test]
    fn evaluate_matches_operator_semantics() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let env = HashMap::from([(x, r(3)), (y, r(5))]);

        for kind in ALL_KINDS {
            let formula = Expression::from(x).compare_expr(kind, &Expression::from(y));
            assert_eq!(formula.evaluate(&env), kind.holds(&r(3), &r(5)), "{kind}");
        }
    }

    #[test]
    fn expression_comparison_moves_rhs_to_lhs() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let formula = Expression::from(x).leq_expr(&Expression::from(y));
        assert_eq!(formula.kind(), FormulaKind::Leq);
        assert_eq!(formula.rhs(), &r(0));
        assert_eq!(formula.expression().addends().get(&x), Some(&r(1)));
        assert_eq!(formula.expression().addends().get(&y), Some(&r(-1)));
    }

    #[test]
    fn literal_stays_on_rhs() {
        let x = Variable::new("x");
        let formula = x.geq_rat(r(10));
        assert_eq!(formula.kind(), FormulaKind::Geq);
        assert_eq!(formula.rhs(), &r(10));
        assert_eq!(formula.expression().len(), 1);
    }

    #[test]
    fn substitute_keeps_kind_and_rhs() {
        let x = Variable::new("x");
        let z = Variable::new("z");
        let formula = x.leq_rat(r(4));
        let renamed = formula.substitute(&HashMap::from([(x, z)]));
        assert_eq!(renamed.kind(), FormulaKind::Leq);
        assert_eq!(renamed.rhs(), &r(4));
        assert_eq!(renamed.expression().addends().get(&z), Some(&r(1)));
    }

    #[test]
    fn equal_formulas_hash_equal() {
        let x = Variable::new("x");
        let a = x.leq_rat(r(2));
        let b = x.leq_rat(r(2));
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(a, b);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn ordering_is_kind_then_rhs_then_expression() {
        let x = Variable::new("x");
        let a = x.eq_rat(r(1));
        let b = x.eq_rat(r(2));
        let c = x.leq_rat(r(0));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn display_shows_relation() {
        let x = Variable::new("price");
        assert_eq!(format!("{}", x.leq_rat(r(7))), "price <= 7");
    }
}
