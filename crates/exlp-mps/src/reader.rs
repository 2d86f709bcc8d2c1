//! Line-level MPS reader.
//!
//! Free-format records: a line whose first character is non-blank opens a
//! section, every other non-empty line is a whitespace-separated data record
//! of the current section. Comment lines start with `*`; the special
//! comments `* @set-option :key value` and `* @set-info :key value` are
//! applied to the façade wherever they appear before `ENDATA`.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use exlp_core::LpProblem;

use exlp_solver::Bound;

use crate::bound_type::BoundType;
use crate::driver::MpsDriver;
use crate::error::ParseError;
use crate::number::{parse_bound, parse_rational};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Name,
    ObjSense,
    ObjName,
    Rows,
    Columns,
    Rhs,
    Ranges,
    Bounds,
}

/// Parse an MPS program from a string.
pub fn parse_str(lp: &mut LpProblem, input: &str) -> Result<(), ParseError> {
    parse_reader(lp, input.as_bytes())
}

/// Parse an MPS program from a file.
pub fn parse_file(lp: &mut LpProblem, path: impl AsRef<Path>) -> Result<(), ParseError> {
    let file = File::open(path)?;
    parse_reader(lp, BufReader::new(file))
}

/// Parse an MPS program from any reader.
pub fn parse_reader(lp: &mut LpProblem, reader: impl Read) -> Result<(), ParseError> {
    let mut driver = MpsDriver::new(lp);
    let mut section = Section::Preamble;

    let reader = BufReader::new(reader);
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('*') {
            apply_comment(driver.lp_mut(), trimmed);
            continue;
        }

        if !trimmed.starts_with([' ', '\t']) {
            let mut tokens = trimmed.split_whitespace();
            let keyword = tokens.next().unwrap_or_default();
            section = match keyword {
                "NAME" => {
                    if let Some(name) = tokens.next() {
                        driver.set_problem_name(name);
                    }
                    Section::Name
                }
                "OBJSENSE" => {
                    if let Some(token) = tokens.next() {
                        objective_sense(&mut driver, number, token)?;
                    }
                    Section::ObjSense
                }
                "OBJNAME" => {
                    if let Some(token) = tokens.next() {
                        driver.objective_name(token);
                    }
                    Section::ObjName
                }
                "ROWS" => Section::Rows,
                "COLUMNS" => Section::Columns,
                "RHS" => Section::Rhs,
                "RANGES" => Section::Ranges,
                "BOUNDS" => Section::Bounds,
                "ENDATA" => {
                    driver.end();
                    return Ok(());
                }
                other => {
                    return Err(ParseError::UnknownSection {
                        line: number,
                        section: other.to_string(),
                    })
                }
            };
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match section {
            Section::Preamble | Section::Name => {}
            Section::ObjSense => objective_sense(&mut driver, number, tokens[0])?,
            Section::ObjName => driver.objective_name(tokens[0]),
            Section::Rows => rows_record(&mut driver, number, &tokens)?,
            Section::Columns => columns_record(&mut driver, number, &tokens)?,
            Section::Rhs => pairs_record(&mut driver, number, &tokens, false)?,
            Section::Ranges => pairs_record(&mut driver, number, &tokens, true)?,
            Section::Bounds => bounds_record(&mut driver, number, &tokens)?,
        }
    }

    // ENDATA is conventional but not required at end of input.
    driver.end();
    Ok(())
}

fn apply_comment(lp: &mut LpProblem, line: &str) {
    let mut tokens = line.trim_start_matches('*').split_whitespace();
    match tokens.next() {
        Some("@set-option") => {
            if let (Some(key), Some(value)) = (tokens.next(), tokens.next()) {
                tracing::debug!(
                    component = "mps",
                    operation = "set_option",
                    key,
                    value,
                    "Embedded option record"
                );
                lp.set_option(key, value);
            }
        }
        Some("@set-info") => {
            if let Some(key) = tokens.next() {
                let value = tokens.collect::<Vec<_>>().join(" ");
                lp.set_info(key, value);
            }
        }
        _ => {}
    }
}

fn objective_sense(
    driver: &mut MpsDriver<'_>,
    line: usize,
    token: &str,
) -> Result<(), ParseError> {
    match token.to_ascii_uppercase().as_str() {
        "MIN" | "MINIMIZE" | "MINIMISE" => {
            driver.objective_sense(true);
            Ok(())
        }
        "MAX" | "MAXIMIZE" | "MAXIMISE" => {
            driver.objective_sense(false);
            Ok(())
        }
        other => Err(ParseError::MalformedRecord {
            line,
            reason: format!("invalid objective sense '{other}'"),
        }),
    }
}

fn rows_record(
    driver: &mut MpsDriver<'_>,
    line: usize,
    tokens: &[&str],
) -> Result<(), ParseError> {
    let [sense, row] = tokens else {
        return Err(ParseError::MalformedRecord {
            line,
            reason: "ROWS record needs a sense and a row name".to_string(),
        });
    };
    let sense = sense.parse().map_err(|_| ParseError::InvalidSense {
        line,
        token: sense.to_string(),
    })?;
    driver.add_row(sense, row);
    Ok(())
}

fn columns_record(
    driver: &mut MpsDriver<'_>,
    line: usize,
    tokens: &[&str],
) -> Result<(), ParseError> {
    // Integrality markers are not supported; skip them so standard files
    // still parse.
    if tokens.iter().any(|token| token.contains("'MARKER'")) {
        tracing::warn!(
            component = "mps",
            operation = "columns_record",
            status = "skipped",
            line,
            "Ignoring COLUMNS marker record"
        );
        return Ok(());
    }
    let (column, pairs) = tokens.split_first().ok_or_else(|| ParseError::MalformedRecord {
        line,
        reason: "empty COLUMNS record".to_string(),
    })?;
    if pairs.is_empty() || pairs.len() % 2 != 0 || pairs.len() > 4 {
        return Err(ParseError::MalformedRecord {
            line,
            reason: "COLUMNS record needs one or two (row, value) pairs".to_string(),
        });
    }
    for pair in pairs.chunks(2) {
        let value = parse_rational(pair[1]).map_err(|_| ParseError::InvalidNumber {
            line,
            token: pair[1].to_string(),
        })?;
        driver.add_column(line, column, pair[0], value)?;
    }
    Ok(())
}

fn pairs_record(
    driver: &mut MpsDriver<'_>,
    line: usize,
    tokens: &[&str],
    ranges: bool,
) -> Result<(), ParseError> {
    let section = if ranges { "RANGES" } else { "RHS" };
    let (group, pairs) = tokens.split_first().ok_or_else(|| ParseError::MalformedRecord {
        line,
        reason: format!("empty {section} record"),
    })?;
    if pairs.is_empty() || pairs.len() % 2 != 0 || pairs.len() > 4 {
        return Err(ParseError::MalformedRecord {
            line,
            reason: format!("{section} record needs one or two (row, value) pairs"),
        });
    }
    for pair in pairs.chunks(2) {
        let value = parse_rational(pair[1]).map_err(|_| ParseError::InvalidNumber {
            line,
            token: pair[1].to_string(),
        })?;
        if ranges {
            driver.add_range(line, group, pair[0], value)?;
        } else {
            driver.add_rhs(line, group, pair[0], value)?;
        }
    }
    Ok(())
}

fn bounds_record(
    driver: &mut MpsDriver<'_>,
    line: usize,
    tokens: &[&str],
) -> Result<(), ParseError> {
    if tokens.len() < 3 || tokens.len() > 4 {
        return Err(ParseError::MalformedRecord {
            line,
            reason: "BOUNDS record needs a type, a group and a column".to_string(),
        });
    }
    let bound_type: BoundType = tokens[0]
        .parse()
        .map_err(|_| ParseError::InvalidBoundType {
            line,
            token: tokens[0].to_string(),
        })?;
    let value = match tokens.get(3) {
        Some(token) => Some(parse_bound(token).map_err(|_| ParseError::InvalidNumber {
            line,
            token: token.to_string(),
        })?),
        None => None,
    };
    let (group, column) = (tokens[1], tokens[2]);
    // An infinite value makes a value-carrying bound equivalent to one of
    // the value-less types.
    match value {
        Some(Bound::Finite(value)) => {
            driver.add_bound(line, bound_type, group, column, Some(value))
        }
        Some(Bound::Infinity) if matches!(bound_type, BoundType::Up | BoundType::Ui) => {
            driver.add_bound(line, BoundType::Pl, group, column, None)
        }
        Some(Bound::NegInfinity) if matches!(bound_type, BoundType::Lo | BoundType::Li) => {
            driver.add_bound(line, BoundType::Mi, group, column, None)
        }
        Some(bound) => Err(ParseError::MalformedRecord {
            line,
            reason: format!("bound type {bound_type} cannot take the value {bound}"),
        }),
        None => driver.add_bound(line, bound_type, group, column, None),
    }
}
