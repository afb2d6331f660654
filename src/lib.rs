//! Solve single-variable equations typed in shorthand (`2x^2 + 3 = 11`) and
//! answer riddles with a chat-completion API, all from a small web page.

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod algebra;
mod answer;
pub mod config;
mod equations;
mod normalize;
pub mod riddle;
mod roots;
mod solve;
pub mod web;

pub use answer::{
    equation_answer, solve_equation, ERROR_MARKER, NO_SOLUTION, UNKNOWN,
};
pub use equations::{Equation, EquationError};
pub use normalize::normalize;
pub use roots::{QuadraticSurd, Root};
pub use solve::{SolutionSet, SolveError};
