//! Exact parsing of MPS numeric tokens.
//!
//! Supported shapes: optional sign, plain integers, decimal fractions,
//! `E±exp` exponents, `n/d` rationals and the `inf`/`-inf` literals. The
//! value never passes through a float, so `1e30 + 1` stays exact.

use exlp_expr::{BigInt, Rational};
use exlp_solver::Bound;
use num_traits::{pow, Zero};

/// Parse a finite numeric token into an exact rational.
pub fn parse_rational(token: &str) -> Result<Rational, String> {
    let (negative, body) = match token.as_bytes().first() {
        Some(b'+') => (false, &token[1..]),
        Some(b'-') => (true, &token[1..]),
        _ => (false, token),
    };
    if body.is_empty() {
        return Err(format!("invalid number '{token}'"));
    }

    let magnitude = if let Some((numer, denom)) = body.split_once('/') {
        let numer: BigInt = numer
            .parse()
            .map_err(|_| format!("invalid numerator in '{token}'"))?;
        let denom: BigInt = denom
            .parse()
            .map_err(|_| format!("invalid denominator in '{token}'"))?;
        if denom.is_zero() {
            return Err(format!("zero denominator in '{token}'"));
        }
        Rational::new(numer, denom)
    } else {
        parse_decimal(body).ok_or_else(|| format!("invalid number '{token}'"))?
    };

    Ok(if negative { -magnitude } else { magnitude })
}

/// Parse a numeric token that may also be one of the infinity literals.
pub fn parse_bound(token: &str) -> Result<Bound, String> {
    if token.eq_ignore_ascii_case("inf") || token.eq_ignore_ascii_case("+inf") {
        return Ok(Bound::Infinity);
    }
    if token.eq_ignore_ascii_case("-inf") {
        return Ok(Bound::NegInfinity);
    }
    parse_rational(token).map(Bound::Finite)
}

fn parse_decimal(body: &str) -> Option<Rational> {
    let (mantissa, exponent) = match body.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().ok()?),
        None => (body, 0),
    };

    let (integral, fractional) = match mantissa.split_once('.') {
        Some((integral, fractional)) => (integral, fractional),
        None => (mantissa, ""),
    };
    if integral.is_empty() && fractional.is_empty() {
        return None;
    }
    if !integral.bytes().all(|b| b.is_ascii_digit())
        || !fractional.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let digits = format!("{integral}{fractional}");
    let numerator: BigInt = digits.parse().ok()?;
    let scale = i64::from(exponent) - fractional.len() as i64;
    Some(if scale >= 0 {
        Rational::from_integer(numerator * pow(BigInt::from(10), scale as usize))
    } else {
        Rational::new(numerator, pow(BigInt::from(10), (-scale) as usize))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from_integer(n.into())
    }

    fn ratio(n: i64, d: i64) -> Rational {
        Rational::new(n.into(), d.into())
    }

    #[test]
    fn integers_and_signs() {
        assert_eq!(parse_rational("42").unwrap(), r(42));
        assert_eq!(parse_rational("+42").unwrap(), r(42));
        assert_eq!(parse_rational("-42").unwrap(), r(-42));
        assert_eq!(parse_rational("0").unwrap(), r(0));
    }

    #[test]
    fn decimal_fractions_are_exact() {
        assert_eq!(parse_rational("0.5").unwrap(), ratio(1, 2));
        assert_eq!(parse_rational("-2.25").unwrap(), ratio(-9, 4));
        assert_eq!(parse_rational(".5").unwrap(), ratio(1, 2));
        assert_eq!(parse_rational("5.").unwrap(), r(5));
        assert_eq!(parse_rational("0.505").unwrap(), ratio(101, 200));
    }

    #[test]
    fn exponents() {
        assert_eq!(parse_rational("1e3").unwrap(), r(1000));
        assert_eq!(parse_rational("2.5E2").unwrap(), r(250));
        assert_eq!(parse_rational("25e-1").unwrap(), ratio(5, 2));
        assert_eq!(parse_rational("-1.5e-2").unwrap(), ratio(-3, 200));
    }

    #[test]
    fn explicit_rationals() {
        assert_eq!(parse_rational("1/3").unwrap(), ratio(1, 3));
        assert_eq!(parse_rational("-7/2").unwrap(), ratio(-7, 2));
        assert!(parse_rational("1/0").is_err());
    }

    #[test]
    fn infinity_literals() {
        assert_eq!(parse_bound("inf").unwrap(), Bound::Infinity);
        assert_eq!(parse_bound("INF").unwrap(), Bound::Infinity);
        assert_eq!(parse_bound("-inf").unwrap(), Bound::NegInfinity);
        assert_eq!(parse_bound("3").unwrap(), Bound::Finite(r(3)));
    }

    #[test]
    fn garbage_is_rejected() {
        for token in ["", "-", "abc", "1.2.3", "1e", "--2", "1//2", "1/2/3"] {
            assert!(parse_rational(token).is_err(), "{token}");
        }
    }

    #[test]
    fn display_round_trips() {
        for value in [r(0), r(7), r(-3), ratio(1, 3), ratio(-22, 7), ratio(101, 200)] {
            assert_eq!(parse_rational(&value.to_string()).unwrap(), value);
        }
    }
}
