//! Row senses of the ROWS section.

use std::fmt;
use std::str::FromStr;

/// Relational type of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `<=`
    L,
    /// `=`
    E,
    /// `>=`
    G,
    /// No constraint; carries the objective.
    N,
}

impl FromStr for Sense {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "l" => Ok(Sense::L),
            "E" | "e" => Ok(Sense::E),
            "G" | "g" => Ok(Sense::G),
            "N" | "n" => Ok(Sense::N),
            other => Err(format!("invalid row sense '{other}'")),
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Sense::L => "L",
            Sense::E => "E",
            Sense::G => "G",
            Sense::N => "N",
        };
        write!(f, "{symbol}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_senses() {
        assert_eq!("L".parse::<Sense>().unwrap(), Sense::L);
        assert_eq!("e".parse::<Sense>().unwrap(), Sense::E);
        assert_eq!("G".parse::<Sense>().unwrap(), Sense::G);
        assert_eq!("n".parse::<Sense>().unwrap(), Sense::N);
        assert!("X".parse::<Sense>().is_err());
    }
}
