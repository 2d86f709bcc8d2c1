//! Bound types of the BOUNDS section.

use std::fmt;
use std::str::FromStr;

/// Type tag of a BOUNDS record.
///
/// `UI` and `LI` carry integer-bound semantics in strict MPS; integrality is
/// out of scope here, so they behave exactly like `UP` and `LO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundType {
    /// Upper bound.
    Up,
    /// Integer upper bound.
    Ui,
    /// Lower bound.
    Lo,
    /// Integer lower bound.
    Li,
    /// Fixed value.
    Fx,
    /// Free variable.
    Fr,
    /// Unbounded below.
    Mi,
    /// Unbounded above.
    Pl,
    /// Binary variable.
    Bv,
}

impl BoundType {
    /// Whether this bound type carries a numeric value field.
    pub fn takes_value(self) -> bool {
        matches!(
            self,
            BoundType::Up | BoundType::Ui | BoundType::Lo | BoundType::Li | BoundType::Fx
        )
    }
}

impl FromStr for BoundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Ok(BoundType::Up),
            "UI" => Ok(BoundType::Ui),
            "LO" => Ok(BoundType::Lo),
            "LI" => Ok(BoundType::Li),
            "FX" => Ok(BoundType::Fx),
            "FR" => Ok(BoundType::Fr),
            "MI" => Ok(BoundType::Mi),
            "PL" => Ok(BoundType::Pl),
            "BV" => Ok(BoundType::Bv),
            other => Err(format!("invalid bound type '{other}'")),
        }
    }
}

impl fmt::Display for BoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            BoundType::Up => "UP",
            BoundType::Ui => "UI",
            BoundType::Lo => "LO",
            BoundType::Li => "LI",
            BoundType::Fx => "FX",
            BoundType::Fr => "FR",
            BoundType::Mi => "MI",
            BoundType::Pl => "PL",
            BoundType::Bv => "BV",
        };
        write!(f, "{tag}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_bound_types() {
        for (token, expected) in [
            ("UP", BoundType::Up),
            ("ui", BoundType::Ui),
            ("LO", BoundType::Lo),
            ("li", BoundType::Li),
            ("FX", BoundType::Fx),
            ("FR", BoundType::Fr),
            ("MI", BoundType::Mi),
            ("PL", BoundType::Pl),
            ("BV", BoundType::Bv),
        ] {
            assert_eq!(token.parse::<BoundType>().unwrap(), expected);
        }
        assert!("XX".parse::<BoundType>().is_err());
    }

    #[test]
    fn value_field_requirements() {
        assert!(BoundType::Up.takes_value());
        assert!(BoundType::Fx.takes_value());
        assert!(!BoundType::Fr.takes_value());
        assert!(!BoundType::Bv.takes_value());
        assert!(!BoundType::Pl.takes_value());
    }
}
