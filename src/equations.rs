use crate::{
    algebra::{Expression, Parameter, ParseError},
    normalize::normalize,
    solve::{SolutionSet, SolveError},
};
use std::str::FromStr;
use tracing::debug;

/// An equation in a single unknown, stored as `left - right = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    body: Expression,
}

impl Equation {
    pub fn new(left: Expression, right: Expression) -> Self {
        Equation { body: left - right }
    }

    /// The expression which equals zero whenever the equation holds.
    pub fn body(&self) -> &Expression { &self.body }

    pub fn solve_for(
        &self,
        unknown: &Parameter,
    ) -> Result<SolutionSet, SolveError> {
        crate::solve::solve(self, unknown)
    }
}

/// Parses the shorthand a person would type, e.g. `2x^2 + 3 = 7`.
impl FromStr for Equation {
    type Err = EquationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sides = s.split('=');

        let (left, right) = match (sides.next(), sides.next(), sides.next()) {
            (Some(left), Some(right), None) => (left, right),
            _ => return Err(EquationError::Format),
        };

        let left = normalize(left);
        let right = normalize(right);
        debug!(%left, %right, "Normalized the equation");

        Ok(Equation::new(left.parse()?, right.parse()?))
    }
}

/// The ways working with an equation can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EquationError {
    /// The text didn't contain exactly one `=`.
    #[error("Invalid equation format. Use '=' sign.")]
    Format,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_is_normalized_before_parsing() {
        let got: Equation = "2x^2 = 8".parse().unwrap();

        assert_eq!(got.body().to_string(), "2*x**2 - 8");
    }

    #[test]
    fn both_sides_are_kept() {
        let got: Equation = "x + 1 = 2 - x".parse().unwrap();

        assert_eq!(got.body().to_string(), "x + 1 - (2 - x)");
    }

    #[test]
    fn exactly_one_equals_sign_is_required() {
        let inputs = vec!["x + 1", "x = 1 = 2", "x == 2", ""];

        for src in inputs {
            let got = src.parse::<Equation>().unwrap_err();
            assert_eq!(got, EquationError::Format, "{}", src);
        }
    }

    #[test]
    fn parse_errors_are_passed_through() {
        let got = "x + = 2".parse::<Equation>().unwrap_err();

        assert!(matches!(got, EquationError::Parse(_)));
    }

    #[test]
    fn empty_sides_are_a_parse_error() {
        let got = "= 2".parse::<Equation>().unwrap_err();

        assert_eq!(
            got,
            EquationError::Parse(ParseError::UnexpectedEndOfInput)
        );
    }

    #[test]
    fn solve_for_the_unknown() {
        let equation: Equation = "3x - 6 = 0".parse().unwrap();

        let got = equation.solve_for(&Parameter::named("x")).unwrap();

        assert_eq!(got.to_string(), "{2}");
    }
}
