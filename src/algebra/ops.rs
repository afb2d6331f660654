//! [`Expression`] operations.

use crate::algebra::{
    BinaryOperation, Expression, Parameter, Polynomial, RationalFunction,
};
use num_rational::BigRational;
use num_traits::ToPrimitive;

/// The largest polynomial degree we are willing to work with.
pub const MAX_DEGREE: usize = 64;

/// Errors that may occur when evaluating an [`Expression`] symbolically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("unknown variable `{name}`, only `{expected}` may be used")]
    UnknownParameter { name: String, expected: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("exponents must be constant")]
    NonConstantExponent,
    #[error("only integer exponents are supported, found {exponent}")]
    NonIntegerExponent { exponent: BigRational },
    #[error("the equation's degree is larger than {}", MAX_DEGREE)]
    DegreeTooLarge,
}

/// Rewrite an [`Expression`] as a single fraction of two polynomials in the
/// `unknown` parameter.
///
/// Every other [`Parameter`] is rejected.
pub fn rational_function(
    expr: &Expression,
    unknown: &Parameter,
) -> Result<RationalFunction, EvaluationError> {
    let got = match expr {
        Expression::Parameter(p) if p == unknown => RationalFunction::unknown(),
        Expression::Parameter(p) => {
            return Err(EvaluationError::UnknownParameter {
                name: p.name().to_string(),
                expected: unknown.name().to_string(),
            });
        },
        Expression::Constant(value) => RationalFunction::constant(value.clone()),
        Expression::Negate(inner) => -rational_function(inner, unknown)?,
        Expression::Binary { left, right, op } => {
            let left = rational_function(left, unknown)?;
            let right = rational_function(right, unknown)?;

            match op {
                BinaryOperation::Plus => left.add(&right),
                BinaryOperation::Minus => left.sub(&right),
                BinaryOperation::Times => left.mul(&right),
                BinaryOperation::Divide => left
                    .div(&right)
                    .ok_or(EvaluationError::DivisionByZero)?,
                BinaryOperation::Power => power(&left, &right)?,
            }
        },
    };

    if got.degree() > MAX_DEGREE {
        Err(EvaluationError::DegreeTooLarge)
    } else {
        Ok(got)
    }
}

fn power(
    base: &RationalFunction,
    exponent: &RationalFunction,
) -> Result<RationalFunction, EvaluationError> {
    let exponent = exponent
        .as_constant()
        .ok_or(EvaluationError::NonConstantExponent)?;

    if !exponent.is_integer() {
        return Err(EvaluationError::NonIntegerExponent { exponent });
    }

    let exponent = exponent
        .to_integer()
        .to_i64()
        .ok_or(EvaluationError::DegreeTooLarge)?;

    // check before multiplying anything out, x**1000000 would take forever
    let magnitude = exponent.unsigned_abs();
    if base.degree() > 0
        && magnitude.saturating_mul(base.degree() as u64) > MAX_DEGREE as u64
    {
        return Err(EvaluationError::DegreeTooLarge);
    }

    if base.degree() == 0 {
        return constant_power(base, exponent);
    }

    base.powi(exponent).ok_or(EvaluationError::DivisionByZero)
}

/// Raise a constant to some power, keeping the numbers from growing without
/// bound.
fn constant_power(
    base: &RationalFunction,
    exponent: i64,
) -> Result<RationalFunction, EvaluationError> {
    /// The most bits we let the result of `a**b` grow to.
    const MAX_BITS: u64 = 4096;

    let value = base.as_constant().ok_or(EvaluationError::DivisionByZero)?;
    let bits = value.numer().bits().max(value.denom().bits());
    if bits.saturating_mul(exponent.unsigned_abs()) > MAX_BITS {
        return Err(EvaluationError::DegreeTooLarge);
    }

    RationalFunction::from(Polynomial::constant(value))
        .powi(exponent)
        .ok_or(EvaluationError::DivisionByZero)
}
