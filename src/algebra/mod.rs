//! The symbolic algebra system.

mod expr;
pub mod ops;
mod parse;
mod polynomial;

pub use expr::{BinaryOperation, Expression, Parameter};
pub use parse::{parse, ParseError, TokenKind};
pub use polynomial::{Polynomial, RationalFunction};

pub(crate) use polynomial::to_f64;
