//! Dense polynomials and rational functions in a single unknown, with exact
//! rational coefficients.

use nalgebra::Complex;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::{
    convert::TryFrom,
    fmt::{self, Display, Formatter},
    ops::{Add, Mul, Neg, Sub},
};

/// A polynomial, `c_0 + c_1*x + c_2*x**2 + ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients, lowest power first. The last coefficient is never zero.
    coefficients: Vec<BigRational>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Polynomial {
            coefficients: Vec::new(),
        }
    }

    pub fn one() -> Self { Polynomial::constant(BigRational::one()) }

    pub fn constant(value: BigRational) -> Self {
        Polynomial::from_coefficients(vec![value])
    }

    /// The polynomial `x`.
    pub fn unknown() -> Self {
        Polynomial::from_coefficients(vec![
            BigRational::zero(),
            BigRational::one(),
        ])
    }

    /// Create a polynomial from its coefficients, lowest power first.
    pub fn from_coefficients(mut coefficients: Vec<BigRational>) -> Self {
        while coefficients.last().map_or(false, Zero::is_zero) {
            coefficients.pop();
        }

        Polynomial { coefficients }
    }

    pub fn from_integers<I>(coefficients: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Polynomial::from_coefficients(
            coefficients
                .into_iter()
                .map(|c| BigRational::from_integer(c.into()))
                .collect(),
        )
    }

    pub fn coefficients(&self) -> &[BigRational] { &self.coefficients }

    pub fn coefficient(&self, power: usize) -> BigRational {
        self.coefficients
            .get(power)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// The highest power with a non-zero coefficient, or `None` for the zero
    /// polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.len().checked_sub(1)
    }

    pub fn is_zero(&self) -> bool { self.coefficients.is_empty() }

    pub fn leading_coefficient(&self) -> Option<&BigRational> {
        self.coefficients.last()
    }

    /// The value of this polynomial if it doesn't depend on `x`.
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.degree() {
            None => Some(BigRational::zero()),
            Some(0) => Some(self.coefficients[0].clone()),
            Some(_) => None,
        }
    }

    pub fn evaluate(&self, x: &BigRational) -> BigRational {
        // Horner's method
        self.coefficients
            .iter()
            .rev()
            .fold(BigRational::zero(), |acc, c| acc * x + c)
    }

    pub fn evaluate_complex(&self, z: Complex<f64>) -> Complex<f64> {
        self.coefficients
            .iter()
            .rev()
            .fold(Complex::new(0.0, 0.0), |acc, c| acc * z + to_f64(c))
    }

    pub fn derivative(&self) -> Polynomial {
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, c)| c * BigRational::from_integer(power.into()))
            .collect();

        Polynomial::from_coefficients(coefficients)
    }

    /// Scale this polynomial so its leading coefficient is `1`.
    pub fn monic(&self) -> Polynomial {
        match self.leading_coefficient() {
            Some(leading) => Polynomial {
                coefficients: self
                    .coefficients
                    .iter()
                    .map(|c| c / leading)
                    .collect(),
            },
            None => Polynomial::zero(),
        }
    }

    pub fn scale(&self, factor: &BigRational) -> Polynomial {
        Polynomial::from_coefficients(
            self.coefficients.iter().map(|c| c * factor).collect(),
        )
    }

    /// Polynomial long division, returning the quotient and remainder.
    ///
    /// Dividing by the zero polynomial leaves everything in the remainder.
    pub fn div_rem(&self, divisor: &Polynomial) -> (Polynomial, Polynomial) {
        let (divisor_degree, divisor_leading) =
            match (divisor.degree(), divisor.leading_coefficient()) {
                (Some(degree), Some(leading)) => (degree, leading),
                _ => return (Polynomial::zero(), self.clone()),
            };

        let mut remainder = self.coefficients.clone();
        let quotient_len =
            (remainder.len() + 1).saturating_sub(divisor_degree + 1);
        let mut quotient = vec![BigRational::zero(); quotient_len];

        for power in (0..quotient_len).rev() {
            let factor = &remainder[power + divisor_degree] / divisor_leading;
            if factor.is_zero() {
                continue;
            }

            for (i, c) in divisor.coefficients.iter().enumerate() {
                remainder[power + i] -= &factor * c;
            }
            quotient[power] = factor;
        }

        (
            Polynomial::from_coefficients(quotient),
            Polynomial::from_coefficients(remainder),
        )
    }

    /// The monic greatest common divisor of two polynomials.
    pub fn gcd(&self, other: &Polynomial) -> Polynomial {
        let mut a = self.clone();
        let mut b = other.clone();

        while !b.is_zero() {
            let (_, remainder) = a.div_rem(&b);
            a = b;
            b = remainder;
        }

        a.monic()
    }

    /// Remove repeated factors, so every root appears exactly once.
    pub fn squarefree(&self) -> Polynomial {
        if self.degree().map_or(true, |d| d == 0) {
            return self.clone();
        }

        let repeated = self.gcd(&self.derivative());
        let (quotient, _) = self.div_rem(&repeated);

        quotient
    }

    pub fn pow(&self, exponent: u32) -> Polynomial {
        let mut result = Polynomial::one();
        let mut base = self.clone();
        let mut exponent = exponent;

        // exponentiation by squaring
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = &result * &base;
            }
            exponent >>= 1;
            if exponent > 0 {
                base = &base * &base;
            }
        }

        result
    }

    /// Scale this polynomial into one with coprime integer coefficients and a
    /// positive leading coefficient, lowest power first.
    pub fn primitive_integer_coefficients(&self) -> Vec<BigInt> {
        let denominator_lcm = self
            .coefficients
            .iter()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));

        let mut integers: Vec<BigInt> = self
            .coefficients
            .iter()
            .map(|c| c * BigRational::from_integer(denominator_lcm.clone()))
            .map(|c| c.to_integer())
            .collect();

        let content = integers
            .iter()
            .fold(BigInt::zero(), |acc, c| acc.gcd(c));

        if !content.is_zero() {
            for c in &mut integers {
                *c /= &content;
            }
        }

        if integers.last().map_or(false, Signed::is_negative) {
            for c in &mut integers {
                *c = -c.clone();
            }
        }

        integers
    }
}

pub(crate) fn to_f64(value: &BigRational) -> f64 {
    match (value.numer().to_f64(), value.denom().to_f64()) {
        (Some(numerator), Some(denominator)) => numerator / denominator,
        _ => f64::NAN,
    }
}

impl<'a> Add for &'a Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &'a Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(rhs.coefficients.len());
        let coefficients = (0..len)
            .map(|power| self.coefficient(power) + rhs.coefficient(power))
            .collect();

        Polynomial::from_coefficients(coefficients)
    }
}

impl<'a> Sub for &'a Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &'a Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(rhs.coefficients.len());
        let coefficients = (0..len)
            .map(|power| self.coefficient(power) - rhs.coefficient(power))
            .collect();

        Polynomial::from_coefficients(coefficients)
    }
}

impl<'a> Mul for &'a Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &'a Polynomial) -> Polynomial {
        if self.is_zero() || rhs.is_zero() {
            return Polynomial::zero();
        }

        let mut coefficients = vec![
            BigRational::zero();
            self.coefficients.len() + rhs.coefficients.len() - 1
        ];

        for (i, left) in self.coefficients.iter().enumerate() {
            for (j, right) in rhs.coefficients.iter().enumerate() {
                coefficients[i + j] += left * right;
            }
        }

        Polynomial::from_coefficients(coefficients)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial {
            coefficients: self.coefficients.into_iter().map(|c| -c).collect(),
        }
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut first = true;

        for (power, c) in self.coefficients.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }

            if first {
                if c.is_negative() {
                    write!(f, "-")?;
                }
            } else if c.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            first = false;

            let magnitude = c.abs();
            match power {
                0 => write!(f, "{}", magnitude)?,
                _ if magnitude.is_one() => {},
                _ if magnitude.is_integer() => write!(f, "{}*", magnitude)?,
                _ => write!(f, "({})*", magnitude)?,
            }

            match power {
                0 => {},
                1 => write!(f, "x")?,
                _ => write!(f, "x**{}", power)?,
            }
        }

        Ok(())
    }
}

/// A quotient of two polynomials, `numerator / denominator`.
///
/// Common factors are never cancelled, so the denominator keeps every value of
/// `x` the original expression is undefined at.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalFunction {
    pub numerator: Polynomial,
    pub denominator: Polynomial,
}

impl RationalFunction {
    pub fn constant(value: BigRational) -> Self {
        RationalFunction::from(Polynomial::constant(value))
    }

    /// The rational function `x`.
    pub fn unknown() -> Self { RationalFunction::from(Polynomial::unknown()) }

    /// The value of this function if it doesn't depend on `x`.
    pub fn as_constant(&self) -> Option<BigRational> {
        let numerator = self.numerator.as_constant()?;
        let denominator = self.denominator.as_constant()?;

        if denominator.is_zero() {
            None
        } else {
            Some(numerator / denominator)
        }
    }

    /// The larger of the numerator and denominator degrees.
    pub fn degree(&self) -> usize {
        self.numerator
            .degree()
            .unwrap_or(0)
            .max(self.denominator.degree().unwrap_or(0))
    }

    /// Build a fraction, scaling it so the denominator is monic.
    ///
    /// The denominator must not be the zero polynomial.
    fn new(numerator: Polynomial, denominator: Polynomial) -> Self {
        match denominator.leading_coefficient() {
            Some(leading) if !leading.is_one() => {
                let factor = leading.recip();

                RationalFunction {
                    numerator: numerator.scale(&factor),
                    denominator: denominator.scale(&factor),
                }
            },
            _ => RationalFunction {
                numerator,
                denominator,
            },
        }
    }

    pub fn add(&self, other: &RationalFunction) -> RationalFunction {
        if self.denominator == other.denominator {
            return RationalFunction {
                numerator: &self.numerator + &other.numerator,
                denominator: self.denominator.clone(),
            };
        }

        RationalFunction::new(
            &(&self.numerator * &other.denominator)
                + &(&other.numerator * &self.denominator),
            &self.denominator * &other.denominator,
        )
    }

    pub fn sub(&self, other: &RationalFunction) -> RationalFunction {
        self.add(&-other.clone())
    }

    pub fn mul(&self, other: &RationalFunction) -> RationalFunction {
        RationalFunction::new(
            &self.numerator * &other.numerator,
            &self.denominator * &other.denominator,
        )
    }

    /// Divide by another rational function, or `None` if it is identically
    /// zero.
    pub fn div(&self, other: &RationalFunction) -> Option<RationalFunction> {
        if other.numerator.is_zero() {
            return None;
        }

        Some(RationalFunction::new(
            &self.numerator * &other.denominator,
            &self.denominator * &other.numerator,
        ))
    }

    /// Raise to an integer power, or `None` when a negative power would
    /// divide by zero.
    pub fn powi(&self, exponent: i64) -> Option<RationalFunction> {
        let magnitude = u32::try_from(exponent.unsigned_abs()).ok()?;
        let numerator = self.numerator.pow(magnitude);
        let denominator = self.denominator.pow(magnitude);

        if exponent >= 0 {
            Some(RationalFunction::new(numerator, denominator))
        } else if numerator.is_zero() {
            None
        } else {
            Some(RationalFunction::new(denominator, numerator))
        }
    }
}

impl From<Polynomial> for RationalFunction {
    fn from(numerator: Polynomial) -> Self {
        RationalFunction {
            numerator,
            denominator: Polynomial::one(),
        }
    }
}

impl Neg for RationalFunction {
    type Output = RationalFunction;

    fn neg(self) -> RationalFunction {
        RationalFunction {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}
