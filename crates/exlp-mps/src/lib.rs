//! MPS reader.
//!
//! Feeds the records of an MPS program into an [`exlp_core::LpProblem`]:
//! sections `NAME`, `OBJSENSE`, `OBJNAME`, `ROWS`, `COLUMNS`, `RHS`,
//! `RANGES`, `BOUNDS` and `ENDATA`, plus embedded `* @set-option` and
//! `* @set-info` records. Numeric tokens are parsed to exact rationals
//! without a floating-point intermediate.

mod bound_type;
mod driver;
mod error;
mod number;
mod reader;
mod sense;

pub use bound_type::BoundType;
pub use driver::MpsDriver;
pub use error::ParseError;
pub use number::{parse_bound, parse_rational};
pub use reader::{parse_file, parse_reader, parse_str};
pub use sense::Sense;
