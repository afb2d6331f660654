use crate::algebra::{BinaryOperation, Expression, Parameter};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Num, One};
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    ops::Range,
    str::FromStr,
};

/// Parse an [`Expression`] tree from some text.
pub fn parse(s: &str) -> Result<Expression, ParseError> {
    Parser::new(s).parse()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// How deeply parentheses and prefix operators may nest before we give up.
const MAX_DEPTH: usize = 256;

/// The most binary operators a single expression may contain. Long chains
/// like `1 + 1 + ...` build a tree as deep as the chain is long.
const MAX_OPERATORS: usize = 1024;

/// A simple recursive descent parser (`LL(1)`) for converting a string into an
/// expression tree.
///
/// The grammar:
///
/// ```text
/// expression     := term (("+" | "-") term)*
///
/// term           := unary (("*" | "/") unary)*
///
/// unary          := "-" unary
///                 | "+" unary
///                 | power
///
/// power          := atom "**" unary
///                 | atom
///
/// atom           := IDENTIFIER
///                 | "(" expression ")"
///                 | NUMBER
/// ```
///
/// Addition, subtraction, multiplication and division are left associative.
/// Exponentiation is right associative and binds tighter than negation, so
/// `-x**2` is `-(x**2)`.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
    depth: usize,
    operators: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
            depth: 0,
            operators: 0,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ParseError> {
        let expr = self.expression()?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: &[
                    TokenKind::Plus,
                    TokenKind::Minus,
                    TokenKind::Times,
                    TokenKind::Divide,
                    TokenKind::Power,
                ],
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.term()?;

        while let Some(op) =
            self.binary_op(&[TokenKind::Plus, TokenKind::Minus])?
        {
            let right = self.term()?;
            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op,
            };
        }

        Ok(left)
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.unary()?;

        while let Some(op) =
            self.binary_op(&[TokenKind::Times, TokenKind::Divide])?
        {
            let right = self.unary()?;
            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op,
            };
        }

        Ok(left)
    }

    /// Skip past the next token if it is one of the `expected` operators.
    fn binary_op(
        &mut self,
        expected: &[TokenKind],
    ) -> Result<Option<BinaryOperation>, ParseError> {
        match self.peek() {
            Some(kind) if expected.contains(&kind) => {
                let _ = self.advance()?;
                self.count_operator()?;
                Ok(Some(kind.as_binary_op()))
            },
            _ => Ok(None),
        }
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                let operand = self.nested(|p| p.unary())?;
                Ok(Expression::Negate(Box::new(operand)))
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
                self.nested(|p| p.unary())
            },
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.atom()?;

        if self.peek() == Some(TokenKind::Power) {
            let _ = self.advance()?;
            self.count_operator()?;
            let exponent = self.nested(|p| p.unary())?;
            Ok(base.pow(exponent))
        } else {
            Ok(base)
        }
    }

    fn atom(&mut self) -> Result<Expression, ParseError> {
        let expected = &[
            TokenKind::Number,
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Minus,
        ];

        match self.peek() {
            Some(TokenKind::Number) => {
                return self.number();
            },
            Some(TokenKind::Identifier) => {
                let ident = self.advance()?;
                return Ok(Expression::Parameter(Parameter::named(
                    ident.text,
                )));
            },
            Some(TokenKind::OpenParen) => {
                let _ = self.advance()?;
                let expr = self.nested(|p| p.expression())?;
                let close_paren = self.advance()?;

                if close_paren.kind == TokenKind::CloseParen {
                    return Ok(expr);
                } else {
                    return Err(ParseError::UnexpectedToken {
                        found: close_paren.kind,
                        span: close_paren.span,
                        expected: &[TokenKind::CloseParen],
                    });
                }
            },
            _ => {},
        }

        // we couldn't parse the atom, return a nice error
        match self.tokens.next() {
            Some(Ok(Token { span, kind, .. })) => {
                Err(ParseError::UnexpectedToken {
                    found: kind,
                    expected,
                    span,
                })
            },
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn count_operator(&mut self) -> Result<(), ParseError> {
        self.operators += 1;

        if self.operators > MAX_OPERATORS {
            Err(ParseError::TooManyOperators {
                limit: MAX_OPERATORS,
            })
        } else {
            Ok(())
        }
    }

    /// Run a parsing function one level deeper, bailing out if the input is
    /// nested too deeply.
    fn nested<F>(&mut self, then: F) -> Result<Expression, ParseError>
    where
        F: FnOnce(&mut Parser<'a>) -> Result<Expression, ParseError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeeplyNested { limit: MAX_DEPTH });
        }

        self.depth += 1;
        let got = then(self);
        self.depth -= 1;

        got
    }

    fn number(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance()?;
        debug_assert_eq!(token.kind, TokenKind::Number);

        parse_decimal(token.text)
            .map(Expression::Constant)
            .ok_or_else(|| ParseError::InvalidNumber {
                text: token.text.to_string(),
            })
    }
}

/// Convert a decimal literal like `3`, `3.` or `3.14` into an exact fraction.
fn parse_decimal(text: &str) -> Option<BigRational> {
    let (integral, fractional) = match text.find('.') {
        Some(index) => (&text[..index], &text[index + 1..]),
        None => (text, ""),
    };

    let digits = format!("{}{}", integral, fractional);
    let numerator = BigInt::from_str_radix(&digits, 10).ok()?;
    let denominator = num_traits::pow(BigInt::from(10), fractional.len());

    if denominator.is_one() {
        Some(BigRational::from_integer(numerator))
    } else {
        Some(BigRational::new(numerator, denominator))
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid character `{character}` at position {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unexpected {found} at position {}", .span.start)]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    #[error("`{text}` is not a valid number")]
    InvalidNumber { text: String },
    #[error("the expression is nested more than {limit} levels deep")]
    TooDeeplyNested { limit: usize },
    #[error("the expression has more than {limit} operators")]
    TooManyOperators { limit: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        self.advance()?;
        let end = self.cursor;

        Some(Ok(Token::from_text(self.src, start..end, kind)))
    }

    /// Either a `*` or a `**`.
    fn chomp_star(&mut self) -> Option<Result<Token<'a>, ParseError>> {
        if self.rest().starts_with("**") {
            let start = self.cursor;
            self.cursor += 2;

            Some(Ok(Token::from_text(
                self.src,
                start..self.cursor,
                TokenKind::Power,
            )))
        } else {
            self.chomp(TokenKind::Times)
        }
    }

    fn take_while<P>(&mut self, mut predicate: P) -> (&'a str, Range<usize>)
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        let end = self.cursor;
        (&self.src[start..end], start..end)
    }

    fn chomp_integer(&mut self) -> &'a str {
        let (text, _) = self.take_while(|c| c.is_ascii_digit());
        text
    }

    fn chomp_number(&mut self) -> Token<'a> {
        let start = self.cursor;
        self.chomp_integer();

        if self.peek() == Some('.') {
            // skip past the decimal
            self.advance();
            self.chomp_integer();
        }

        let end = self.cursor;

        Token::from_text(self.src, start..end, TokenKind::Number)
    }

    fn chomp_identifier(&mut self) -> Token<'a> {
        let mut seen_first_character = false;

        let (_, span) = self.take_while(|c| {
            if seen_first_character {
                c.is_ascii_alphanumeric() || c == '_'
            } else {
                seen_first_character = true;
                c.is_ascii_alphabetic() || c == '_'
            }
        });

        Token::from_text(self.src, span, TokenKind::Identifier)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen),
                ')' => self.chomp(TokenKind::CloseParen),
                '+' => self.chomp(TokenKind::Plus),
                '-' => self.chomp(TokenKind::Minus),
                '*' => self.chomp_star(),
                '/' => self.chomp(TokenKind::Divide),
                '_' | 'a'..='z' | 'A'..='Z' => {
                    Some(Ok(self.chomp_identifier()))
                },
                '0'..='9' => Some(Ok(self.chomp_number())),
                // a leading dot like `.5`
                '.' if self.rest()[1..].starts_with(|c: char| {
                    c.is_ascii_digit()
                }) =>
                {
                    Some(Ok(self.chomp_number()))
                },
                other => {
                    let index = self.cursor;
                    // make sure the iterator can still make progress
                    self.advance();

                    Some(Err(ParseError::InvalidCharacter {
                        character: other,
                        index,
                    }))
                },
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        src: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &src[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in an [`Expression`]'s text form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    Identifier,
    Number,
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl TokenKind {
    fn as_binary_op(self) -> BinaryOperation {
        match self {
            TokenKind::Plus => BinaryOperation::Plus,
            TokenKind::Minus => BinaryOperation::Minus,
            TokenKind::Times => BinaryOperation::Times,
            TokenKind::Divide => BinaryOperation::Divide,
            TokenKind::Power => BinaryOperation::Power,
            other => unreachable!("{:?} is not a binary op", other),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::OpenParen => write!(f, "`(`"),
            TokenKind::CloseParen => write!(f, "`)`"),
            TokenKind::Plus => write!(f, "`+`"),
            TokenKind::Minus => write!(f, "`-`"),
            TokenKind::Times => write!(f, "`*`"),
            TokenKind::Divide => write!(f, "`/`"),
            TokenKind::Power => write!(f, "`**`"),
        }
    }
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let mut tokens = Tokens::new($src);

                let got = tokens.next().unwrap().unwrap();

                let Range { start, end } = got.span;
                assert_eq!(start, 0);
                assert_eq!(end, $src.len());
                assert_eq!(got.kind, $should_be);

                assert!(
                    tokens.next().is_none(),
                    "{:?} should be empty",
                    tokens
                );
            }
        };
    }

    tokenize_test!(open_paren, "(", TokenKind::OpenParen);
    tokenize_test!(close_paren, ")", TokenKind::CloseParen);
    tokenize_test!(plus, "+", TokenKind::Plus);
    tokenize_test!(minus, "-", TokenKind::Minus);
    tokenize_test!(times, "*", TokenKind::Times);
    tokenize_test!(power, "**", TokenKind::Power);
    tokenize_test!(divide, "/", TokenKind::Divide);
    tokenize_test!(single_digit_integer, "3", TokenKind::Number);
    tokenize_test!(multi_digit_integer, "31", TokenKind::Number);
    tokenize_test!(number_with_trailing_dot, "31.", TokenKind::Number);
    tokenize_test!(simple_decimal, "3.14", TokenKind::Number);
    tokenize_test!(leading_dot_decimal, ".5", TokenKind::Number);
    tokenize_test!(simple_identifier, "x", TokenKind::Identifier);
    tokenize_test!(longer_identifier, "hello", TokenKind::Identifier);
    tokenize_test!(
        identifiers_can_have_underscores,
        "hello_world",
        TokenKind::Identifier
    );
    tokenize_test!(
        identifiers_can_start_with_underscores,
        "_hello_world",
        TokenKind::Identifier
    );
    tokenize_test!(
        identifiers_can_contain_numbers,
        "var5",
        TokenKind::Identifier
    );

    #[test]
    fn three_stars_are_a_power_then_a_times() {
        let kinds: Vec<_> = Tokens::new("***")
            .map(|tok| tok.unwrap().kind)
            .collect();

        assert_eq!(kinds, vec![TokenKind::Power, TokenKind::Times]);
    }

    #[test]
    fn invalid_characters_are_reported_with_their_position() {
        let mut tokens = Tokens::new("x ^ 2");

        let _x = tokens.next();
        let got = tokens.next().unwrap();

        assert_eq!(
            got,
            Err(ParseError::InvalidCharacter {
                character: '^',
                index: 2
            })
        );
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    macro_rules! parser_test {
        ($name:ident, $src:expr) => {
            parser_test!($name, $src, $src);
        };
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let got = Parser::new($src).parse().unwrap();

                let round_tripped = got.to_string();
                assert_eq!(round_tripped, $should_be);
            }
        };
    }

    parser_test!(simple_integer, "1");
    parser_test!(one_plus_one, "1 + 1");
    parser_test!(one_plus_one_plus_negative_one, "1 + -1");
    parser_test!(one_plus_one_times_three, "1 + 1*3");
    parser_test!(one_plus_one_all_times_three, "(1 + 1)*3");
    parser_test!(negative_one, "-1");
    parser_test!(negative_one_plus_one, "-1 + 1");
    parser_test!(negative_one_plus_x, "-1 + x");
    parser_test!(number_in_parens, "(1)", "1");
    parser_test!(bimdas, "1*2 + 3*4/(5 - 2)*1 - 3");
    parser_test!(subtraction_is_left_associative, "1 - 2 - 3");
    parser_test!(division_is_left_associative, "8/4/2");
    parser_test!(explicit_right_grouping, "1 - (2 - 3)");
    parser_test!(simple_power, "x**2");
    parser_test!(power_is_right_associative, "x**2**3");
    parser_test!(power_binds_tighter_than_negation, "-x**2");
    parser_test!(negative_exponent, "x**-1", "x**(-1)");
    parser_test!(unary_plus_is_dropped, "+x", "x");
    parser_test!(decimals_become_fractions, "0.5*x", "1/2*x");
    parser_test!(trailing_dot_is_an_integer, "3.*x", "3*x");
    parser_test!(leading_dot_is_a_fraction, ".25*x", "1/4*x");
    parser_test!(whitespace_is_ignored, " 2 * x+3 ", "2*x + 3");

    #[test]
    fn subtraction_groups_to_the_left() {
        let got = parse("1 - 2 - 3").unwrap();

        let should_be = (Expression::integer(1) - Expression::integer(2))
            - Expression::integer(3);
        assert_eq!(got, should_be);
    }

    #[test]
    fn stray_close_paren_is_an_unexpected_token() {
        let got = parse(")(").unwrap_err();

        match got {
            ParseError::UnexpectedToken { found, ref span, .. } => {
                assert_eq!(found, TokenKind::CloseParen);
                assert_eq!(*span, 0..1);
            },
            other => panic!("Unexpected error: {:?}", other),
        }
        assert_eq!(got.to_string(), "unexpected `)` at position 0");
    }

    #[test]
    fn leftover_tokens_are_an_error() {
        let got = parse("2 3").unwrap_err();

        assert_eq!(got.to_string(), "unexpected number at position 2");
    }

    #[test]
    fn missing_close_paren() {
        let got = parse("(x + 1").unwrap_err();

        assert_eq!(got, ParseError::UnexpectedEndOfInput);
    }

    #[test]
    fn empty_input() {
        let got = parse("   ").unwrap_err();

        assert_eq!(got, ParseError::UnexpectedEndOfInput);
    }

    #[test]
    fn lexer_errors_propagate() {
        let got = parse("x + $").unwrap_err();

        assert_eq!(
            got,
            ParseError::InvalidCharacter {
                character: '$',
                index: 4
            }
        );
    }

    #[test]
    fn deeply_nested_input_is_rejected() {
        let src = format!("{}x{}", "(".repeat(1000), ")".repeat(1000));

        let got = parse(&src).unwrap_err();

        assert_eq!(got, ParseError::TooDeeplyNested { limit: MAX_DEPTH });
    }

    #[test]
    fn long_operator_chains_are_rejected() {
        let src = format!("x{}", "+1".repeat(30_000));

        let got = parse(&src).unwrap_err();

        assert_eq!(
            got,
            ParseError::TooManyOperators {
                limit: MAX_OPERATORS
            }
        );
    }

    #[test]
    fn every_kind_of_operator_counts_towards_the_limit() {
        let src = format!("x{}", "*x**2-1/2".repeat(300));

        let got = parse(&src).unwrap_err();

        assert_eq!(
            got,
            ParseError::TooManyOperators {
                limit: MAX_OPERATORS
            }
        );
    }

    #[test]
    fn chains_within_the_limit_are_fine() {
        let src = format!("x{}", "+1".repeat(MAX_OPERATORS));

        assert!(parse(&src).is_ok());
    }

    #[test]
    fn a_lone_dot_is_not_a_number() {
        let got = parse(".").unwrap_err();

        assert_eq!(
            got,
            ParseError::InvalidCharacter {
                character: '.',
                index: 0
            }
        );
    }
}
