//! Finding the roots of a [`Polynomial`].

use crate::{
    algebra::{to_f64, Polynomial},
    solve::SolveError,
};
use arrayvec::ArrayVec;
use nalgebra::{Complex, DMatrix, Schur};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

/// Anything smaller than this is treated as zero when working with
/// approximate roots.
const APPROXIMATE_ZERO: f64 = 1e-9;

/// A single value which satisfies an equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Root {
    /// An exact rational value.
    Exact(BigRational),
    /// An exact irrational or complex value from the quadratic formula.
    Surd(QuadraticSurd),
    /// A floating point approximation, for roots of polynomials we can't
    /// factor exactly.
    Approximate(Complex<f64>),
}

impl Root {
    /// Does `polynomial` vanish at this root?
    pub fn is_root_of(&self, polynomial: &Polynomial) -> bool {
        match self {
            Root::Exact(value) => polynomial.evaluate(value).is_zero(),
            Root::Surd(surd) => {
                let (_, remainder) =
                    polynomial.div_rem(&surd.minimal_polynomial());
                remainder.is_zero()
            },
            Root::Approximate(z) => approx::abs_diff_eq!(
                magnitude(polynomial.evaluate_complex(*z)),
                0.0,
                epsilon = APPROXIMATE_ZERO
            ),
        }
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Root::Exact(value) => write!(f, "{}", value),
            Root::Surd(surd) => write!(f, "{}", surd),
            Root::Approximate(z) => write_approximate(*z, f),
        }
    }
}

/// The number `rational + coefficient*sqrt(radicand)`, with an extra factor
/// of `I` on the square root when `imaginary` is set.
///
/// The radicand is a positive square-free integer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticSurd {
    pub rational: BigRational,
    pub coefficient: BigRational,
    pub radicand: BigInt,
    pub imaginary: bool,
}

impl QuadraticSurd {
    /// The monic quadratic which has this surd and its conjugate as roots.
    pub fn minimal_polynomial(&self) -> Polynomial {
        // (x - p)**2 = q**2 * r, or -q**2 * r when the root is imaginary
        let p = &self.rational;
        let q_squared_r = &self.coefficient
            * &self.coefficient
            * BigRational::from_integer(self.radicand.clone());
        let offset = if self.imaginary {
            q_squared_r
        } else {
            -q_squared_r
        };

        Polynomial::from_coefficients(vec![
            p * p + offset,
            -(p * BigRational::from_integer(2.into())),
            BigRational::one(),
        ])
    }

    /// Everything after the sign of the irrational part, e.g. `3*sqrt(2)/2`
    /// or `sqrt(3)*I`.
    fn irrational_part(&self) -> String {
        let magnitude = self.coefficient.abs();
        let mut factors = Vec::new();

        if !magnitude.numer().is_one() {
            factors.push(magnitude.numer().to_string());
        }
        if !self.radicand.is_one() {
            factors.push(format!("sqrt({})", self.radicand));
        }
        if self.imaginary {
            factors.push(String::from("I"));
        }

        let mut text = factors.join("*");

        if !magnitude.denom().is_one() {
            text = format!("{}/{}", text, magnitude.denom());
        }

        text
    }
}

impl Display for QuadraticSurd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.coefficient.is_negative() {
            "-"
        } else {
            "+"
        };

        if self.rational.is_zero() {
            if self.coefficient.is_negative() {
                write!(f, "-")?;
            }
            write!(f, "{}", self.irrational_part())
        } else {
            write!(f, "{} {} {}", self.rational, sign, self.irrational_part())
        }
    }
}

fn write_approximate(z: Complex<f64>, f: &mut Formatter<'_>) -> fmt::Result {
    match (z.re == 0.0, z.im == 0.0) {
        (_, true) => write!(f, "{}", format_float(z.re)),
        (true, false) => write!(f, "{}*I", format_float(z.im)),
        (false, false) if z.im < 0.0 => write!(
            f,
            "{} - {}*I",
            format_float(z.re),
            format_float(-z.im)
        ),
        (false, false) => {
            write!(f, "{} + {}*I", format_float(z.re), format_float(z.im))
        },
    }
}

fn format_float(value: f64) -> String {
    let text = format!("{:.12}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');

    if text == "-0" {
        String::from("0")
    } else {
        text.to_string()
    }
}

/// Find every distinct root of a non-zero polynomial.
///
/// Rational roots come first in ascending order, followed by the roots of
/// whatever is left over. A left over quadratic is solved exactly, anything
/// bigger is solved numerically.
pub(crate) fn find_roots(
    polynomial: &Polynomial,
) -> Result<Vec<Root>, SolveError> {
    let mut remaining = polynomial.squarefree();
    let mut roots = Vec::new();

    for root in rational_roots(&remaining) {
        let factor = Polynomial::from_coefficients(vec![
            -root.clone(),
            BigRational::one(),
        ]);
        let (quotient, _) = remaining.div_rem(&factor);
        remaining = quotient;
        roots.push(Root::Exact(root));
    }

    match remaining.degree() {
        None | Some(0) => {},
        Some(1) => {
            let root = -remaining.coefficient(0) / remaining.coefficient(1);
            roots.push(Root::Exact(root));
        },
        Some(2) => roots.extend(quadratic_roots(&remaining)),
        Some(_) => roots.extend(approximate_roots(&remaining)?),
    }

    Ok(roots)
}

/// Use the rational root theorem to find every rational root, in ascending
/// order.
fn rational_roots(polynomial: &Polynomial) -> Vec<BigRational> {
    /// Give up on candidates when there are more than this many `p/q` pairs.
    const MAX_CANDIDATES: usize = 20_000;

    let coefficients = polynomial.primitive_integer_coefficients();
    let lowest = match coefficients.iter().position(|c| !c.is_zero()) {
        Some(ix) => ix,
        None => return Vec::new(),
    };

    let mut roots = BTreeSet::new();

    if lowest > 0 {
        roots.insert(BigRational::zero());
    }

    let trimmed = &coefficients[lowest..];
    if trimmed.len() < 2 {
        return roots.into_iter().collect();
    }

    let numerators = divisors(&trimmed[0]);
    let denominators = divisors(&trimmed[trimmed.len() - 1]);

    if let (Some(numerators), Some(denominators)) = (numerators, denominators)
    {
        if numerators.len() * denominators.len() <= MAX_CANDIDATES {
            for p in &numerators {
                for q in &denominators {
                    let candidates = [
                        BigRational::new(p.clone(), q.clone()),
                        BigRational::new(-p.clone(), q.clone()),
                    ];

                    for candidate in candidates.iter() {
                        if !roots.contains(candidate)
                            && polynomial.evaluate(candidate).is_zero()
                        {
                            roots.insert(candidate.clone());
                        }
                    }
                }
            }
        }
    }

    roots.into_iter().collect()
}

/// Every positive divisor of `n`, or `None` when `n` is too big to factor by
/// trial division.
fn divisors(n: &BigInt) -> Option<Vec<BigInt>> {
    const LIMIT: u64 = 1_000_000_000_000;

    let n = n.abs().to_u64().filter(|n| *n > 0 && *n <= LIMIT)?;
    let mut divisors = Vec::new();
    let mut i: u64 = 1;

    while i * i <= n {
        if n % i == 0 {
            divisors.push(BigInt::from(i));
            if i != n / i {
                divisors.push(BigInt::from(n / i));
            }
        }
        i += 1;
    }

    Some(divisors)
}

/// Solve `a*x**2 + b*x + c = 0` exactly, returning the root with the
/// smaller irrational part first.
fn quadratic_roots(polynomial: &Polynomial) -> ArrayVec<Root, 2> {
    let c = polynomial.coefficient(0);
    let b = polynomial.coefficient(1);
    let a = polynomial.coefficient(2);

    let two_a = &a * BigRational::from_integer(2.into());
    let rational = -&b / &two_a;
    let discriminant =
        &b * &b - &a * &c * BigRational::from_integer(4.into());

    let mut roots = ArrayVec::new();

    if discriminant.is_zero() {
        roots.push(Root::Exact(rational));
        return roots;
    }

    let (outside, radicand) = square_root(&discriminant.abs());
    let coefficient = (outside / &two_a).abs();
    let imaginary = discriminant.is_negative();

    if radicand.is_one() && !imaginary {
        roots.push(Root::Exact(&rational - &coefficient));
        roots.push(Root::Exact(rational + coefficient));
    } else {
        roots.push(Root::Surd(QuadraticSurd {
            rational: rational.clone(),
            coefficient: -coefficient.clone(),
            radicand: radicand.clone(),
            imaginary,
        }));
        roots.push(Root::Surd(QuadraticSurd {
            rational,
            coefficient,
            radicand,
            imaginary,
        }));
    }

    roots
}

/// Write `sqrt(value)` as `outside * sqrt(radicand)` with as small a
/// radicand as we can find.
fn square_root(value: &BigRational) -> (BigRational, BigInt) {
    // sqrt(n/d) = sqrt(n*d)/d
    let product = value.numer() * value.denom();
    let (outside, radicand) = extract_square_factors(product);

    (BigRational::new(outside, value.denom().clone()), radicand)
}

fn extract_square_factors(n: BigInt) -> (BigInt, BigInt) {
    const TRIAL_DIVISION_LIMIT: u64 = 100_000;

    let mut outside = BigInt::one();
    let mut inside = n;
    let mut factor: u64 = 2;

    while factor <= TRIAL_DIVISION_LIMIT {
        let square = BigInt::from(factor * factor);
        if square > inside {
            break;
        }

        while (&inside % &square).is_zero() {
            inside /= &square;
            outside *= factor;
        }

        factor += 1;
    }

    // whatever is left might still be a perfect square of large primes
    let root = inside.sqrt();
    if &root * &root == inside {
        outside *= root;
        inside = BigInt::one();
    }

    (outside, inside)
}

/// Approximate the roots of a polynomial as the eigenvalues of its companion
/// matrix, then tidy them up with a couple of Newton-Raphson steps.
///
/// Real roots come first in ascending order, then complex roots ordered by
/// their real and imaginary parts.
fn approximate_roots(polynomial: &Polynomial) -> Result<Vec<Root>, SolveError> {
    const MAX_ITERATIONS: usize = 10_000;

    let monic = polynomial.monic();
    let degree = monic.degree().unwrap_or(0);
    let coefficients: Vec<f64> = monic.coefficients().iter().map(to_f64).collect();

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(SolveError::NotRepresentable);
    }

    let companion = DMatrix::from_fn(degree, degree, |row, column| {
        if column == degree - 1 {
            -coefficients[row]
        } else if row == column + 1 {
            1.0
        } else {
            0.0
        }
    });

    let schur = Schur::try_new(companion, f64::EPSILON, MAX_ITERATIONS)
        .ok_or(SolveError::DidntConverge)?;

    let derivative = polynomial.derivative();
    let mut roots: Vec<Complex<f64>> = schur
        .complex_eigenvalues()
        .iter()
        .map(|z| polish(polynomial, &derivative, *z))
        .map(tidy)
        .collect();

    // conjugate pairs can disagree in the last few bits of their real part
    let key = |z: &Complex<f64>| (z.im != 0.0, (z.re * 1e9).round(), z.im);
    roots.sort_by(|left, right| {
        key(left).partial_cmp(&key(right)).unwrap_or(Ordering::Equal)
    });

    Ok(roots.into_iter().map(Root::Approximate).collect())
}

/// Refine a root with Newton's method, stopping as soon as a step doesn't
/// make things better.
fn polish(
    polynomial: &Polynomial,
    derivative: &Polynomial,
    mut z: Complex<f64>,
) -> Complex<f64> {
    const STEPS: usize = 8;

    for _ in 0..STEPS {
        let value = polynomial.evaluate_complex(z);
        let slope = derivative.evaluate_complex(z);

        if value.norm_sqr() == 0.0 || slope.norm_sqr() == 0.0 {
            break;
        }

        let next = z - value / slope;
        let improved = polynomial.evaluate_complex(next).norm_sqr()
            < value.norm_sqr();
        if !improved {
            break;
        }
        z = next;
    }

    z
}

/// The absolute value of a complex number.
fn magnitude(z: Complex<f64>) -> f64 { z.norm_sqr().sqrt() }

/// Snap tiny real or imaginary parts to zero.
fn tidy(z: Complex<f64>) -> Complex<f64> {
    let scale = magnitude(z).max(1.0);
    let snap = |value: f64| {
        if value.abs() <= APPROXIMATE_ZERO * scale {
            0.0
        } else {
            value
        }
    };

    Complex::new(snap(z.re), snap(z.im))
}
