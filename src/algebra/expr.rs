use num_rational::BigRational;
use num_traits::Signed;
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
};

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Parameter(Parameter),
    /// An exact rational constant.
    Constant(BigRational),
    /// An expression involving two operands.
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        op: BinaryOperation,
    },
    /// Negate the expression.
    Negate(Box<Expression>),
}

impl Expression {
    pub fn integer(value: i64) -> Self {
        Expression::Constant(BigRational::from_integer(value.into()))
    }

    /// Raise this expression to some power.
    pub fn pow(self, exponent: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(exponent),
            op: BinaryOperation::Power,
        }
    }

    /// How tightly this expression binds when written out, used to decide
    /// where parentheses are needed.
    fn precedence(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.precedence(),
            Expression::Negate(_) => NEGATE_PRECEDENCE,
            Expression::Constant(value) if value.is_negative() => {
                NEGATE_PRECEDENCE
            },
            Expression::Constant(value) if !value.is_integer() => {
                BinaryOperation::Divide.precedence()
            },
            Expression::Parameter(_) | Expression::Constant(_) => {
                ATOM_PRECEDENCE
            },
        }
    }
}

const NEGATE_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

/// A named unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter(SmolStr);

impl Parameter {
    pub fn named<S: AsRef<str>>(name: S) -> Self {
        Parameter(SmolStr::new(name))
    }

    pub fn name(&self) -> &str { &self.0 }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An operation that can be applied to two arguments.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl BinaryOperation {
    fn precedence(self) -> u8 {
        match self {
            BinaryOperation::Plus | BinaryOperation::Minus => 1,
            BinaryOperation::Times | BinaryOperation::Divide => 2,
            BinaryOperation::Power => 4,
        }
    }

    fn is_right_associative(self) -> bool { self == BinaryOperation::Power }

    fn symbol(self) -> &'static str {
        match self {
            BinaryOperation::Plus => " + ",
            BinaryOperation::Minus => " - ",
            BinaryOperation::Times => "*",
            BinaryOperation::Divide => "/",
            BinaryOperation::Power => "**",
        }
    }
}

// define some operator overloads to make constructing an expression easier.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Plus,
        }
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Minus,
        }
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Times,
        }
    }
}

impl Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Expression) -> Expression {
        Expression::Binary {
            left: Box::new(self),
            right: Box::new(rhs),
            op: BinaryOperation::Divide,
        }
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::Negate(Box::new(self)) }
}

impl From<Parameter> for Expression {
    fn from(p: Parameter) -> Expression { Expression::Parameter(p) }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Parameter(p) => write!(f, "{}", p),
            Expression::Constant(value) => write!(f, "{}", value),
            Expression::Binary { left, right, op } => {
                let precedence = op.precedence();
                let left_needs_parens = left.precedence() < precedence
                    || (op.is_right_associative()
                        && left.precedence() <= precedence);
                let right_needs_parens = right.precedence() < precedence
                    || (!op.is_right_associative()
                        && right.precedence() == precedence);

                write_operand(left, left_needs_parens, f)?;
                write!(f, "{}", op.symbol())?;
                write_operand(right, right_needs_parens, f)?;

                Ok(())
            },
            Expression::Negate(inner) => {
                write!(f, "-")?;
                write_operand(
                    inner,
                    inner.precedence() < NEGATE_PRECEDENCE,
                    f,
                )
            },
        }
    }
}

fn write_operand(
    expr: &Expression,
    parenthesize: bool,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
