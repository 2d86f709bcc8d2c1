//! Linear expressions over symbolic variables.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::rc::Rc;

use num_traits::{One, Zero};

use crate::var::Variable;
use crate::Rational;

/// Ordered sparse addend map of an expression: variable to nonzero
/// coefficient, iterated in ascending variable order.
pub type Addends = BTreeMap<Variable, Rational>;

/// A linear form `c1*x1 + ... + cn*xn`.
///
/// The addend map never stores a zero coefficient; entries that cancel are
/// removed eagerly. Expressions are cheap-to-copy value types sharing their
/// addend map behind a reference count; any mutation clones the map first if
/// it is shared (copy-on-write), so copies never observe each other's
/// updates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expression {
    addends: Rc<Addends>,
}

impl Expression {
    /// The zero expression.
    pub fn new() -> Self {
        Self {
            addends: Rc::new(Addends::new()),
        }
    }

    /// Expression holding a single addend `coeff * var`.
    ///
    /// Panics if `var` is the dummy variable.
    pub fn term(var: Variable, coeff: Rational) -> Self {
        assert!(!var.is_dummy(), "dummy variable used in an expression");
        let mut addends = Addends::new();
        if !coeff.is_zero() {
            addends.insert(var, coeff);
        }
        Self {
            addends: Rc::new(addends),
        }
    }

    /// Expression from an already-ordered addend map; zero coefficients are
    /// dropped.
    pub fn from_addends(addends: Addends) -> Self {
        let filtered: Addends = addends.into_iter().filter(|(_, c)| !c.is_zero()).collect();
        Self {
            addends: Rc::new(filtered),
        }
    }

    /// Expression from a list of `(variable, coefficient)` pairs, coalescing
    /// duplicates additively.
    pub fn from_terms(terms: impl IntoIterator<Item = (Variable, Rational)>) -> Self {
        let mut expr = Self::new();
        for (var, coeff) in terms {
            Expression::add(&mut expr, var, &coeff);
        }
        expr
    }

    /// The addend map.
    pub fn addends(&self) -> &Addends {
        &self.addends
    }

    /// Variables appearing in the expression, in ascending order.
    pub fn variables(&self) -> Vec<Variable> {
        self.addends.keys().copied().collect()
    }

    /// Number of holders sharing the underlying addend map.
    pub fn use_count(&self) -> usize {
        Rc::strong_count(&self.addends)
    }

    /// Whether the expression is the zero form.
    pub fn is_empty(&self) -> bool {
        self.addends.is_empty()
    }

    /// Number of addends.
    pub fn len(&self) -> usize {
        self.addends.len()
    }

    /// Add the linear monomial `coeff * var` in place.
    ///
    /// Adding a zero coefficient is a no-op; an addend whose coefficient
    /// cancels to zero is removed. Panics if `var` is the dummy variable.
    pub fn add(&mut self, var: Variable, coeff: &Rational) -> &mut Self {
        assert!(!var.is_dummy(), "dummy variable used in an expression");
        if coeff.is_zero() {
            return self;
        }
        match Rc::make_mut(&mut self.addends).entry(var) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coeff;
                if entry.get().is_zero() {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(coeff.clone());
            }
        }
        self
    }

    /// Subtract the linear monomial `coeff * var` in place.
    pub fn subtract(&mut self, var: Variable, coeff: &Rational) -> &mut Self {
        self.add(var, &-coeff.clone())
    }

    /// Evaluate the expression under `env`, a total assignment for its
    /// variables.
    ///
    /// Panics if a variable of the expression is missing from `env`.
    pub fn evaluate(&self, env: &HashMap<Variable, Rational>) -> Rational {
        let mut total = Rational::zero();
        for (var, coeff) in self.addends.iter() {
            let value = env
                .get(var)
                .unwrap_or_else(|| panic!("no value for variable '{var}' in environment"));
            total += coeff * value;
        }
        total
    }

    /// Rewrite every variable to its image under `sigma` (identity when
    /// absent), coalescing additively when two originals map to the same
    /// image. Substitutions happen simultaneously.
    pub fn substitute(&self, sigma: &HashMap<Variable, Variable>) -> Self {
        let mut result = Self::new();
        for (var, coeff) in self.addends.iter() {
            let target = sigma.get(var).copied().unwrap_or(*var);
            Expression::add(&mut result, target, coeff);
        }
        result
    }
}

impl Default for Expression {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Variable> for Expression {
    fn from(var: Variable) -> Self {
        Self::term(var, Rational::one())
    }
}

impl From<(Variable, Rational)> for Expression {
    fn from((var, coeff): (Variable, Rational)) -> Self {
        Self::term(var, coeff)
    }
}

impl Add for Expression {
    type Output = Expression;

    fn add(mut self, rhs: Expression) -> Expression {
        self += &rhs;
        self
    }
}

impl AddAssign<&Expression> for Expression {
    fn add_assign(&mut self, rhs: &Expression) {
        for (var, coeff) in rhs.addends.iter() {
            self.add(*var, coeff);
        }
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(mut self, rhs: Expression) -> Expression {
        self -= &rhs;
        self
    }
}

impl SubAssign<&Expression> for Expression {
    fn sub_assign(&mut self, rhs: &Expression) {
        for (var, coeff) in rhs.addends.iter() {
            self.subtract(*var, coeff);
        }
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self * -Rational::one()
    }
}

impl Mul<Rational> for Expression {
    type Output = Expression;

    fn mul(mut self, rhs: Rational) -> Expression {
        self *= rhs;
        self
    }
}

impl MulAssign<Rational> for Expression {
    fn mul_assign(&mut self, rhs: Rational) {
        if rhs.is_zero() {
            self.addends = Rc::new(Addends::new());
            return;
        }
        if rhs.is_one() {
            return;
        }
        let addends = Rc::make_mut(&mut self.addends);
        for coeff in addends.values_mut() {
            *coeff *= &rhs;
        }
    }
}

impl Div<Rational> for Expression {
    type Output = Expression;

    fn div(mut self, rhs: Rational) -> Expression {
        self /= rhs;
        self
    }
}

impl DivAssign<Rational> for Expression {
    /// Panics when dividing by zero.
    fn div_assign(&mut self, rhs: Rational) {
        assert!(!rhs.is_zero(), "division of an expression by zero");
        if rhs.is_one() {
            return;
        }
        let addends = Rc::make_mut(&mut self.addends);
        for coeff in addends.values_mut() {
            *coeff /= &rhs;
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.addends.is_empty() {
            return write!(f, "0");
        }
        for (i, (var, coeff)) in self.addends.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if coeff.is_one() {
                write!(f, "{var}")?;
            } else {
                write!(f, "{coeff}*{var}")?;
            }
        }
        Ok(())
    }
}
