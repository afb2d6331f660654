//! Turning an equation typed by a person into the text shown on the page.

use crate::{
    algebra::Parameter,
    equations::{Equation, EquationError},
    solve::SolutionSet,
};

/// Prefixed to every message which describes a failure.
pub const ERROR_MARKER: &str = "❌";

/// Shown when the equation has no solutions.
pub const NO_SOLUTION: &str = "No solution found";

/// The only unknown an equation may contain.
pub const UNKNOWN: &str = "x";

/// Parse and solve an equation like `2x^2 = 8` for `x`.
pub fn solve_equation(text: &str) -> Result<SolutionSet, EquationError> {
    let equation: Equation = text.parse()?;
    let solutions = equation.solve_for(&Parameter::named(UNKNOWN))?;

    tracing::debug!(%text, %solutions, "Solved an equation");

    Ok(solutions)
}

/// Solve an equation and describe the result in a single line of text.
///
/// This never fails, errors are rendered as a message starting with
/// [`ERROR_MARKER`].
pub fn equation_answer(text: &str) -> String {
    match solve_equation(text) {
        Ok(solutions) => describe_solutions(&solutions),
        Err(EquationError::Format) => {
            format!("{} {}", ERROR_MARKER, EquationError::Format)
        },
        Err(e) => format!("{} Error solving equation: {}", ERROR_MARKER, e),
    }
}

fn describe_solutions(solutions: &SolutionSet) -> String {
    match solutions {
        SolutionSet::Everything => {
            format!("Every value of {} is a solution", UNKNOWN)
        },
        SolutionSet::Roots(roots) => match roots.as_slice() {
            [] => String::from(NO_SOLUTION),
            [root] => format!("{} = {}", UNKNOWN, root),
            roots => {
                let values: Vec<String> = roots
                    .iter()
                    .map(|root| format!("{} = {}", UNKNOWN, root))
                    .collect();
                format!("Solutions: {}", values.join(", "))
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    macro_rules! answer_test {
        ($name:ident, $src:expr => $should_be:expr) => {
            #[test]
            fn $name() {
                let got = equation_answer($src);
                assert_eq!(got, $should_be);
            }
        };
    }

    answer_test!(linear, "2x+3=7" => "x = 2");
    answer_test!(two_integer_roots, "x^2=4" => "Solutions: x = -2, x = 2");
    answer_test!(no_solution, "x=x+1" => "No solution found");
    answer_test!(identity, "x=x" => "Every value of x is a solution");
    answer_test!(missing_equals, "5x" => "❌ Invalid equation format. Use '=' sign.");
    answer_test!(too_many_equals, "x=1=2" => "❌ Invalid equation format. Use '=' sign.");
    answer_test!(
        irrational_roots,
        "x^2=2" => "Solutions: x = -sqrt(2), x = sqrt(2)"
    );
    answer_test!(imaginary_roots, "x^2+1=0" => "Solutions: x = -I, x = I");
    answer_test!(
        cube_roots_of_eight,
        "x^3=8" => "Solutions: x = 2, x = -1 - sqrt(3)*I, x = -1 + sqrt(3)*I"
    );
    answer_test!(
        complex_surds,
        "x^2 + x + 1 = 0" => "Solutions: x = -1/2 - sqrt(3)*I/2, x = -1/2 + sqrt(3)*I/2"
    );
    answer_test!(fractional_root, "2x = -3" => "x = -3/2");
    answer_test!(reciprocal, "1/x=2" => "x = 1/2");
    answer_test!(leading_dot_decimal, "x=.5" => "x = 1/2");
    answer_test!(zero_over_zero, "x/x=2" => "No solution found");
    answer_test!(
        other_variables,
        "y=2" => "❌ Error solving equation: unknown variable `y`, only `x` may be used"
    );
    answer_test!(
        division_by_zero,
        "1/(x - x) = 1" => "❌ Error solving equation: division by zero"
    );

    #[test]
    fn parse_errors_get_a_short_diagnostic() {
        let got = equation_answer("x=)(");

        assert!(got.starts_with(ERROR_MARKER));
        assert_eq!(
            got,
            "❌ Error solving equation: unexpected `)` at position 0"
        );
    }

    #[test]
    fn approximate_roots_are_rendered_as_decimals() {
        let got = equation_answer("x^3 = 2");

        assert!(got.starts_with("Solutions: x = 1.259921049895, "), "{}", got);
        assert_eq!(got.matches("*I").count(), 2, "{}", got);
    }

    #[test]
    fn huge_flat_equations_are_rejected_instead_of_overflowing() {
        let src = format!("x{}=0", "+1".repeat(30_000));

        let got = equation_answer(&src);

        assert_eq!(
            got,
            "❌ Error solving equation: the expression has more than 1024 \
             operators"
        );
    }

    #[test]
    fn typed_errors_are_available_to_callers() {
        let got = solve_equation("x + 1").unwrap_err();

        assert_eq!(got, EquationError::Format);
    }

    proptest! {
        #[test]
        fn anything_without_exactly_one_equals_is_rejected(
            src in "[^=]*|[^=]*=[^=]*=.*",
        ) {
            let got = equation_answer(&src);

            prop_assert_eq!(got, "❌ Invalid equation format. Use '=' sign.");
        }

        #[test]
        fn answers_are_a_single_line(src in "[0-9x+*/^() -]{0,12}=[0-9x+*/^() -]{0,12}") {
            let got = equation_answer(&src);

            prop_assert!(!got.is_empty());
            prop_assert!(!got.contains('\n'));
        }
    }
}
