use crate::{
    algebra::{
        ops::{self, EvaluationError},
        Parameter, RationalFunction,
    },
    roots::{self, Root},
    Equation,
};
use std::fmt::{self, Display, Formatter};
use tracing::debug;

/// Solve a single equation for one unknown.
///
/// The equation's body (`left - right`) is rewritten as a rational function,
/// `P(x)/Q(x)`, by expanding every product and power and bringing everything
/// over a common denominator. The equation holds wherever
///
/// ```text
/// P(x) = 0 and Q(x) != 0
/// ```
///
/// so we find the roots of `P` and throw away anything that would make the
/// original equation divide by zero. When `P` is identically zero the
/// equation holds for every value of the unknown.
pub(crate) fn solve(
    equation: &Equation,
    unknown: &Parameter,
) -> Result<SolutionSet, SolveError> {
    let RationalFunction {
        numerator,
        denominator,
    } = ops::rational_function(equation.body(), unknown)?;

    debug!(%numerator, %denominator, "Rewrote the equation as a fraction");

    if numerator.is_zero() {
        return Ok(SolutionSet::Everything);
    }

    let roots: Vec<Root> = roots::find_roots(&numerator)?
        .into_iter()
        .filter(|root| !root.is_root_of(&denominator))
        .collect();

    debug!(solutions = roots.len(), "Solved");

    Ok(SolutionSet::Roots(roots))
}

/// Every value of an unknown which satisfies an equation.
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionSet {
    /// A finite (possibly empty) set of roots.
    Roots(Vec<Root>),
    /// The equation holds no matter what value the unknown takes.
    ///
    /// Identities such as `x = x` end up here instead of being reported as
    /// having no solution. Points where the equation divides by zero are not
    /// excluded, so `x/x = 1` is also `Everything`.
    Everything,
}

impl SolutionSet {
    pub fn is_empty(&self) -> bool {
        match self {
            SolutionSet::Roots(roots) => roots.is_empty(),
            SolutionSet::Everything => false,
        }
    }
}

impl Display for SolutionSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SolutionSet::Roots(roots) => {
                write!(f, "{{")?;
                for (i, root) in roots.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", root)?;
                }
                write!(f, "}}")
            },
            SolutionSet::Everything => write!(f, "everything"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error(transparent)]
    Eval(#[from] EvaluationError),
    #[error("the numeric root finder didn't converge")]
    DidntConverge,
    #[error("the coefficients are too large to approximate the roots")]
    NotRepresentable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve_str(src: &str) -> Result<SolutionSet, SolveError> {
        let equation: Equation = src.parse().unwrap();
        solve(&equation, &Parameter::named("x"))
    }

    #[test]
    fn single_equality() {
        let got = solve_str("x = 5").unwrap();

        assert_eq!(got.to_string(), "{5}");
    }

    #[test]
    fn linear_and_quadratic_equations() {
        let inputs = vec![
            ("2*x + 3 = 7", "{2}"),
            ("x**2 - 4 = 0", "{-2, 2}"),
            ("x**2 = 2", "{-sqrt(2), sqrt(2)}"),
            ("(x - 1)**2 = 0", "{1}"),
            ("x*(x - 1)*(x + 1) = 0", "{-1, 0, 1}"),
            ("x**2 + 1 = 0", "{-I, I}"),
            ("2*x = 3", "{3/2}"),
            ("0.5*x = 1", "{2}"),
        ];

        for (src, should_be) in inputs {
            let got = solve_str(src).unwrap();
            assert_eq!(got.to_string(), should_be, "{}", src);
        }
    }

    #[test]
    fn roots_of_the_denominator_are_discarded() {
        let inputs = vec![
            ("1/x = 2", "{1/2}"),
            ("x/x = 2", "{}"),
            ("(x**2 - 1)/(x - 1) = 0", "{-1}"),
            ("1/(x**2 + 1) = 1", "{0}"),
            ("x + 1/(x**2 - 2) = 1/(x**2 - 2)", "{0}"),
        ];

        for (src, should_be) in inputs {
            let got = solve_str(src).unwrap();
            assert_eq!(got.to_string(), should_be, "{}", src);
        }
    }

    #[test]
    fn surds_can_be_excluded_by_the_denominator() {
        // x**2 - 2 = 0 but both roots make the denominator zero
        let got = solve_str("(x**2 - 2)/(x**2 - 2) = 0").unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn identities_hold_everywhere() {
        let got = solve_str("x + 1 = 1 + x").unwrap();

        assert_eq!(got, SolutionSet::Everything);
        assert!(!got.is_empty());

        let got = solve_str("x/x = 1").unwrap();
        assert_eq!(got, SolutionSet::Everything);
    }

    #[test]
    fn contradictions_have_no_solutions() {
        let got = solve_str("x = x + 1").unwrap();

        assert_eq!(got, SolutionSet::Roots(Vec::new()));
        assert!(got.is_empty());
    }

    #[test]
    fn evaluation_errors_are_propagated() {
        let got = solve_str("x**x = 2").unwrap_err();

        assert_eq!(
            got,
            SolveError::Eval(EvaluationError::NonConstantExponent)
        );
        assert_eq!(got.to_string(), "exponents must be constant");
    }
}
