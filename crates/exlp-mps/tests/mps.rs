//! MPS reader behavior against the LP façade.

use exlp_core::LpProblem;
use exlp_expr::{FormulaKind, Rational};
use exlp_mps::{parse_file, parse_str, ParseError};
use exlp_simplex::SimplexBackend;
use exlp_solver::{Bound, Config, LpResult};
use std::io::Write;

fn r(n: i64) -> Rational {
    Rational::from_integer(n.into())
}

fn problem() -> LpProblem {
    LpProblem::new(Box::new(SimplexBackend::new()))
}

fn column_named<'a>(lp: &'a LpProblem, name: &str) -> exlp_core::Column {
    let index = lp
        .variables()
        .iter()
        .position(|var| var.name() == name)
        .unwrap_or_else(|| panic!("no column named '{name}'"));
    lp.column(index).unwrap()
}

#[test]
fn ranges_on_a_greater_row_extend_upwards() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          ranges-g
ROWS
 G  R1
COLUMNS
    X1        R1        1
BOUNDS
 FR BND       X1
RHS
    RHS       R1        1
RANGES
    RNG       R1        51
ENDATA
",
    )
    .unwrap();

    // The single-addend row folds into the column: 1 <= X1 <= 1 + 51.
    let column = column_named(&lp, "X1");
    assert_eq!(column.lb, Bound::Finite(r(1)));
    assert_eq!(column.ub, Bound::Finite(r(52)));

    let formulas = lp.constraints();
    assert!(formulas
        .iter()
        .any(|f| f.kind() == FormulaKind::Geq && f.rhs() == &r(1)));
    assert!(formulas
        .iter()
        .any(|f| f.kind() == FormulaKind::Leq && f.rhs() == &r(52)));
}

#[test]
fn ranges_on_a_less_row_extend_downwards() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          ranges-l
ROWS
 L  R1
COLUMNS
    X1        R1        1
BOUNDS
 FR BND       X1
RHS
    RHS       R1        1
RANGES
    RNG       R1        51
ENDATA
",
    )
    .unwrap();

    let column = column_named(&lp, "X1");
    assert_eq!(column.lb, Bound::Finite(r(-50)));
    assert_eq!(column.ub, Bound::Finite(r(1)));
}

#[test]
fn ranges_on_equality_rows_follow_the_range_sign() {
    let source = |range: &str| {
        format!(
            "\
NAME          ranges-e
ROWS
 E  R1
COLUMNS
    X1        R1        1
    X2        R1        1
RHS
    RHS       R1        10
RANGES
    RNG       R1        {range}
ENDATA
"
        )
    };

    let mut lp = problem();
    parse_str(&mut lp, &source("4")).unwrap();
    let row = lp.row(0).unwrap();
    assert_eq!(row.lb, Bound::Finite(r(10)));
    assert_eq!(row.ub, Bound::Finite(r(14)));

    let mut lp = problem();
    parse_str(&mut lp, &source("-4")).unwrap();
    let row = lp.row(0).unwrap();
    assert_eq!(row.lb, Bound::Finite(r(6)));
    assert_eq!(row.ub, Bound::Finite(r(10)));
}

#[test]
fn bounds_matrix() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          bounds
ROWS
 E  R1
 N  Ob
COLUMNS
    X1        R1        1
    X2        R1        1
    X3        R1        1
    X4        R1        1
    X5        R1        1
RHS
BOUNDS
 LO BND       X1        61
 UP BND       X2        62
 FX BND       X3        63
 FR BND       X4
 MI BND       X5
ENDATA
",
    )
    .unwrap();

    let x1 = column_named(&lp, "X1");
    assert_eq!((x1.lb, x1.ub), (Bound::Finite(r(61)), Bound::Infinity));
    let x2 = column_named(&lp, "X2");
    assert_eq!((x2.lb, x2.ub), (Bound::Finite(r(0)), Bound::Finite(r(62))));
    let x3 = column_named(&lp, "X3");
    assert_eq!((x3.lb, x3.ub), (Bound::Finite(r(63)), Bound::Finite(r(63))));
    let x4 = column_named(&lp, "X4");
    assert_eq!((x4.lb, x4.ub), (Bound::NegInfinity, Bound::Infinity));
    let x5 = column_named(&lp, "X5");
    assert_eq!((x5.lb, x5.ub), (Bound::NegInfinity, Bound::Infinity));

    // The E row defaults to rhs 0.
    let row = lp.row(0).unwrap();
    assert_eq!(row.lb, Bound::Finite(r(0)));
    assert_eq!(row.ub, Bound::Finite(r(0)));
    assert_eq!(row.addends.len(), 5);
}

#[test]
fn negative_upper_bound_alone_frees_the_lower_bound() {
    // A second column keeps R1 from folding into X1's bounds, so the
    // interval below comes from the BOUNDS section alone.
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          negative-up
ROWS
 E  R1
 N  Ob
COLUMNS
    X1        R1        1
    X2        R1        1
RHS
BOUNDS
 UP BND       X1        -62
ENDATA
",
    )
    .unwrap();

    let column = column_named(&lp, "X1");
    assert_eq!(column.lb, Bound::NegInfinity);
    assert_eq!(column.ub, Bound::Finite(r(-62)));
}

#[test]
fn columns_without_bound_records_default_to_nonnegative() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          defaults
ROWS
 G  R1
COLUMNS
    X1        R1        1
    X2        R1        2
RHS
    RHS       R1        4
ENDATA
",
    )
    .unwrap();

    for name in ["X1", "X2"] {
        let column = column_named(&lp, name);
        assert_eq!(column.lb, Bound::Finite(r(0)), "{name}");
        assert_eq!(column.ub, Bound::Infinity, "{name}");
    }
}

#[test]
fn embedded_options_configure_the_facade() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
* @set-option :precision 0.505
* @set-option :produce-models true
* @set-info :status optimal
NAME          options
ROWS
 G  R1
COLUMNS
    X1        R1        1
RHS
    RHS       R1        1
ENDATA
",
    )
    .unwrap();

    assert_eq!(lp.config().precision, 0.505);
    assert!(lp.config().produce_models);
    assert_eq!(lp.expected(), LpResult::Optimal);
    assert!(lp.check_against_expected(LpResult::DeltaOptimal));
}

#[test]
fn strict_mps_keeps_only_the_first_rhs_group() {
    let source = "\
NAME          strict
ROWS
 G  R1
 G  R2
COLUMNS
    X1        R1        1
    X1        R2        1
RHS
    A         R1        5
    B         R2        7
ENDATA
";

    let config = Config::new().with_strict_mps(true);
    let mut lp = LpProblem::with_config(Box::new(SimplexBackend::new()), config);
    parse_str(&mut lp, source).unwrap();
    // R2's rhs came from group B and was skipped; it defaults to 0.
    let x1 = column_named(&lp, "X1");
    assert_eq!(x1.lb, Bound::Finite(r(5)));

    let mut lax = problem();
    parse_str(&mut lax, source).unwrap();
    let x1 = column_named(&lax, "X1");
    assert_eq!(x1.lb, Bound::Finite(r(7)));
}

#[test]
fn objsense_max_is_honoured() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          maximise
OBJSENSE
    MAX
ROWS
 N  Obj
 L  R1
COLUMNS
    X1        Obj       1    R1   1
    X2        R1        1
RHS
    RHS       R1        5
ENDATA
",
    )
    .unwrap();

    let mut precision = r(0);
    let result = lp.solve(&mut precision, true).unwrap();
    assert_eq!(result, LpResult::Optimal);
    assert_eq!(lp.solution()[0], r(5));
    // Maximisation is minimisation of the negated objective.
    assert_eq!(lp.objective_bounds().0, &Bound::Finite(r(-5)));
}

#[test]
fn parsed_problem_solves_to_the_expected_optimum() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          small
ROWS
 N  Cost
 G  R1
COLUMNS
    X         Cost      9    R1   1
    Y         Cost      1    R1   1
RHS
    RHS       R1        10
ENDATA
",
    )
    .unwrap();

    assert_eq!(lp.num_columns(), 2);
    assert_eq!(lp.num_rows(), 1);

    let mut precision = r(0);
    let result = lp.solve(&mut precision, true).unwrap();
    assert_eq!(result, LpResult::Optimal);
    assert_eq!(lp.objective_bounds().0, &Bound::Finite(r(10)));
    assert_eq!(lp.solution(), &[r(0), r(10)]);
    assert!(lp.verify());
}

#[test]
fn objname_overrides_the_first_n_row() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          objname
OBJSENSE
    MAX
OBJNAME
    Cost2
ROWS
 N  Cost1
 N  Cost2
 L  R1
COLUMNS
    X         Cost1     5    Cost2   1
    X         R1        1
    Y         R1        1
RHS
    RHS       R1        3
ENDATA
",
    )
    .unwrap();

    let mut precision = r(0);
    lp.solve(&mut precision, true).unwrap();
    // Cost2, not Cost1, is the objective: max X subject to X + Y <= 3
    // reaches 3; with Cost1 the backend would report -15.
    assert_eq!(lp.objective_bounds().0, &Bound::Finite(r(-3)));
    assert_eq!(lp.solution()[0], r(3));
}

#[test]
fn unknown_rhs_row_is_a_parse_error() {
    let mut lp = problem();
    let err = parse_str(
        &mut lp,
        "\
NAME          broken
ROWS
 G  R1
COLUMNS
    X1        R1        1
RHS
    RHS       NOPE      1
ENDATA
",
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::UnknownRow { .. }));
    assert_eq!(err.line(), Some(7));
}

#[test]
fn invalid_bound_type_is_a_parse_error() {
    let mut lp = problem();
    let err = parse_str(
        &mut lp,
        "\
NAME          broken
ROWS
 G  R1
COLUMNS
    X1        R1        1
BOUNDS
 ZZ BND       X1        1
ENDATA
",
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::InvalidBoundType { .. }));
}

#[test]
fn unknown_section_is_a_parse_error() {
    let mut lp = problem();
    let err = parse_str(&mut lp, "GARBAGE\n").unwrap_err();
    assert!(matches!(err, ParseError::UnknownSection { .. }));
}

#[test]
fn rational_and_exponent_tokens_stay_exact() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          exact
ROWS
 G  R1
COLUMNS
    X1        R1        1/3
    X2        R1        2.5e-1
RHS
    RHS       R1        1
ENDATA
",
    )
    .unwrap();

    let row = lp.row(0).unwrap();
    assert_eq!(row.addends[0].1, Rational::new(1.into(), 3.into()));
    assert_eq!(row.addends[1].1, Rational::new(1.into(), 4.into()));
}

#[test]
fn infinity_literals_in_bounds() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          infinities
ROWS
 G  R1
COLUMNS
    X1        R1        1
    X2        R1        1
RHS
    RHS       R1        1
BOUNDS
 LO BND       X1        -inf
 UP BND       X2        inf
ENDATA
",
    )
    .unwrap();

    let x1 = column_named(&lp, "X1");
    assert_eq!(x1.lb, Bound::NegInfinity);
    let x2 = column_named(&lp, "X2");
    assert_eq!(x2.lb, Bound::Finite(r(0)));
    assert_eq!(x2.ub, Bound::Infinity);
}

#[test]
fn missing_endata_is_tolerated() {
    let mut lp = problem();
    parse_str(
        &mut lp,
        "\
NAME          truncated
ROWS
 G  R1
COLUMNS
    X1        R1        1
    X2        R1        1
RHS
    RHS       R1        2
",
    )
    .unwrap();
    assert_eq!(lp.num_rows(), 1);
    assert_eq!(lp.num_columns(), 2);
}

#[test]
fn parse_file_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "\
NAME          from-disk
ROWS
 N  Obj
 G  R1
COLUMNS
    X         Obj       1    R1   1
    Y         R1        1
RHS
    RHS       R1        2
ENDATA
"
    )
    .unwrap();

    let mut lp = problem();
    parse_file(&mut lp, file.path()).unwrap();
    assert_eq!(lp.num_columns(), 2);

    let mut precision = r(0);
    let result = lp.solve(&mut precision, true).unwrap();
    assert_eq!(result, LpResult::Optimal);
    assert_eq!(lp.objective_bounds().0, &Bound::Finite(r(0)));
}
