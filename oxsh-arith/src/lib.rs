// This file is part of oxsh, a POSIX command interpreter.
// Copyright (C) 2024 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! This crate implements the arithmetic expression language used in
//! arithmetic expansion.
//!
//! The language is the C-style integer expression language required by POSIX:
//! decimal, octal, and hexadecimal constants, variables, the unary operators
//! `+ - ~ !`, the full set of binary operators with C precedence, the ternary
//! conditional, assignment (simple and compound), and the comma operator.
//! All values are signed 64-bit integers with C wrap-around semantics;
//! the only failing computations are division and remainder by zero.
//!
//! Variables are accessed through the [`Env`] trait, which the caller
//! implements on its variable store. An undefined variable evaluates to zero,
//! and a variable value that is not a valid integer evaluates to its leading
//! decimal digits (or zero if there are none).
//!
//! The parser is a precedence-climbing expression parser that evaluates while
//! parsing. Operands whose value cannot affect the result (the unselected
//! branch of `?:` and the short-circuited side of `&&`/`||`) are parsed in a
//! skip mode that performs no variable access and no assignment.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! let env = &mut HashMap::new();
//! let result = oxsh_arith::eval("x = 2 + 3 * 4", env);
//! assert_eq!(result, Ok(oxsh_arith::Value(14)));
//! assert_eq!(env["x"], "14");
//! ```

use std::fmt::Display;
use std::iter::Peekable;
use std::ops::Range;
use thiserror::Error;

mod env;
mod token;

pub use env::Env;
use token::Operator;
use token::Token;
pub use token::TokenError;
use token::TokenValue;
use token::Tokens;

/// Result of arithmetic expansion
///
/// All arithmetic is performed on signed 64-bit integers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Value(pub i64);

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Intermediate result of evaluating part of an expression
///
/// A variable term is kept unresolved until its value is needed, so that an
/// assignment can see the variable name rather than its value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Term<'a> {
    /// Value
    Value(Value),
    /// Variable
    Variable {
        /// Variable name
        name: &'a str,
        /// Range of the substring in the evaluated expression where the
        /// variable occurs
        location: Range<usize>,
    },
}

/// Cause of a syntax error in an expression
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum SyntaxError {
    /// A value is missing where one is expected.
    #[error("expected a value")]
    MissingValue,
    /// A `(` lacks a matching `)`.
    #[error("unmatched parenthesis")]
    UnmatchedParenthesis,
    /// A `?` lacks a matching `:`.
    #[error("`?` without matching `:`")]
    MissingColon,
    /// The left-hand side of an assignment is not a variable.
    #[error("assignment to a non-variable")]
    InvalidAssignmentTarget,
    /// The expression continues past a complete expression.
    #[error("redundant token")]
    RedundantToken,
}

/// Cause of an arithmetic expansion error
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ErrorCause<E> {
    /// Error in tokenization
    TokenError(TokenError),
    /// Error in syntax
    SyntaxError(SyntaxError),
    /// Division or remainder by zero
    DivisionByZero,
    /// Error assigning a variable value
    AssignVariableError(E),
}

impl<E: Display> Display for ErrorCause<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorCause::*;
        match self {
            TokenError(e) => e.fmt(f),
            SyntaxError(e) => e.fmt(f),
            DivisionByZero => "division by zero".fmt(f),
            AssignVariableError(e) => e.fmt(f),
        }
    }
}

impl<E> From<TokenError> for ErrorCause<E> {
    fn from(e: TokenError) -> Self {
        ErrorCause::TokenError(e)
    }
}

impl<E> From<SyntaxError> for ErrorCause<E> {
    fn from(e: SyntaxError) -> Self {
        ErrorCause::SyntaxError(e)
    }
}

/// Description of an error that occurred during evaluation
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error<E> {
    /// Cause of the error
    pub cause: ErrorCause<E>,
    /// Range of the substring in the evaluated expression string where the
    /// error occurred
    pub location: Range<usize>,
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.cause.fmt(f)
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for Error<E> {}

impl<E> From<token::Error> for Error<E> {
    fn from(e: token::Error) -> Self {
        Error {
            cause: e.cause.into(),
            location: e.location,
        }
    }
}

/// Parses the leading decimal digits of a variable value.
///
/// POSIX leaves non-numeric variable values unspecified in arithmetic
/// contexts; we take the value of the leading digits, or zero if there are
/// none. The digits accumulate with wrap-around like every other
/// computation.
fn parse_variable_value(value: &str) -> i64 {
    let value = value.trim();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let mut result: i64 = 0;
    for c in digits.chars().take_while(char::is_ascii_digit) {
        result = result
            .wrapping_mul(10)
            .wrapping_add((c as u8 - b'0') as i64);
    }
    if negative {
        result = result.wrapping_neg();
    }
    result
}

/// Specifies the behavior of parse functions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    /// Evaluate the (sub)expression parsed.
    Eval,
    /// Just parse a (sub)expression; don't evaluate.
    Skip,
}

impl Term<'_> {
    /// Evaluates the term into a value.
    fn into_value<E: Env>(
        self,
        mode: Mode,
        env: &E,
    ) -> Value {
        match mode {
            Mode::Eval => match self {
                Term::Value(value) => value,
                Term::Variable { name, .. } => match env.get_variable(name) {
                    Some(value) => Value(parse_variable_value(value)),
                    None => Value(0),
                },
            },
            Mode::Skip => Value(0),
        }
    }
}

/// Parses a leaf expression.
///
/// A leaf expression is a constant number, variable, or parenthesized
/// expression, optionally modified by unary prefix operators.
fn parse_leaf<'a, E: Env>(
    tokens: &mut Peekable<Tokens<'a>>,
    mode: Mode,
    env: &mut E,
    src_len: usize,
) -> Result<Term<'a>, Error<E::AssignVariableError>> {
    match tokens.next().transpose()? {
        Some(Token {
            value: TokenValue::Term(term),
            ..
        }) => Ok(term),

        Some(Token {
            value: TokenValue::Operator(operator),
            location,
        }) => {
            use Operator::*;
            match operator {
                OpenParen => {
                    let inner = parse_binary(tokens, 1, mode, env, src_len)?;
                    match tokens.next().transpose()? {
                        Some(Token {
                            value: TokenValue::Operator(CloseParen),
                            ..
                        }) => Ok(inner),
                        _ => Err(Error {
                            cause: SyntaxError::UnmatchedParenthesis.into(),
                            location,
                        }),
                    }
                }
                Plus => {
                    let value = parse_leaf(tokens, mode, env, src_len)?.into_value(mode, env);
                    Ok(Term::Value(value))
                }
                Minus => {
                    let Value(operand) =
                        parse_leaf(tokens, mode, env, src_len)?.into_value(mode, env);
                    Ok(Term::Value(Value(operand.wrapping_neg())))
                }
                Tilde => {
                    let Value(operand) =
                        parse_leaf(tokens, mode, env, src_len)?.into_value(mode, env);
                    Ok(Term::Value(Value(!operand)))
                }
                Bang => {
                    let Value(operand) =
                        parse_leaf(tokens, mode, env, src_len)?.into_value(mode, env);
                    Ok(Term::Value(Value((operand == 0) as i64)))
                }
                _ => Err(Error {
                    cause: SyntaxError::MissingValue.into(),
                    location,
                }),
            }
        }

        None => Err(Error {
            cause: SyntaxError::MissingValue.into(),
            location: src_len..src_len,
        }),
    }
}

/// Applies a binary operator.
fn apply_binary<E>(
    op: Operator,
    lhs: Value,
    rhs: Value,
    location: Range<usize>,
) -> Result<Value, Error<E>> {
    let (Value(lhs), Value(rhs)) = (lhs, rhs);
    use Operator::*;
    Ok(Value(match op {
        BarBar => (lhs != 0 || rhs != 0) as i64,
        AndAnd => (lhs != 0 && rhs != 0) as i64,
        Bar => lhs | rhs,
        Caret => lhs ^ rhs,
        And => lhs & rhs,
        EqualEqual => (lhs == rhs) as i64,
        BangEqual => (lhs != rhs) as i64,
        Less => (lhs < rhs) as i64,
        Greater => (lhs > rhs) as i64,
        LessEqual => (lhs <= rhs) as i64,
        GreaterEqual => (lhs >= rhs) as i64,
        // The shift count wraps modulo the value width, like C on most
        // hardware; shifting never fails.
        LessLess => lhs.wrapping_shl(rhs as u32),
        GreaterGreater => lhs.wrapping_shr(rhs as u32),
        Plus => lhs.wrapping_add(rhs),
        Minus => lhs.wrapping_sub(rhs),
        Asterisk => lhs.wrapping_mul(rhs),
        Slash | Percent if rhs == 0 => {
            return Err(Error {
                cause: ErrorCause::DivisionByZero,
                location,
            })
        }
        Slash => lhs.wrapping_div(rhs),
        Percent => lhs.wrapping_rem(rhs),
        _ => panic!("not a binary operator: {op:?}"),
    }))
}

/// Parses an expression that may contain binary operators.
///
/// This function consumes operators with precedence equal to or greater than
/// the given minimum precedence, which must be greater than 0.
fn parse_binary<'a, E: Env>(
    tokens: &mut Peekable<Tokens<'a>>,
    min_precedence: u8,
    mode: Mode,
    env: &mut E,
    src_len: usize,
) -> Result<Term<'a>, Error<E::AssignVariableError>> {
    let mut term = parse_leaf(tokens, mode, env, src_len)?;

    while let Some(&Ok(Token {
        value: TokenValue::Operator(operator),
        ..
    })) = tokens.peek()
    {
        let precedence = operator.precedence();
        if precedence == 0 || precedence < min_precedence {
            break;
        }

        let location = match tokens.next() {
            Some(Ok(Token { location, .. })) => location,
            _ => unreachable!("the operator token was peeked"),
        };

        use Operator::*;
        if let Some(operand_op) = operator.assignment_operand() {
            // Assignment is right-associative, so the right-hand side is
            // parsed at the same precedence.
            match term {
                Term::Variable {
                    name,
                    location: name_location,
                } => {
                    let rhs = parse_binary(tokens, precedence, mode, env, src_len)?
                        .into_value(mode, env);
                    let value = match operand_op {
                        None => rhs,
                        Some(op) => {
                            let old = Term::Variable {
                                name,
                                location: name_location.clone(),
                            }
                            .into_value(mode, env);
                            apply_binary(op, old, rhs, location.clone())?
                        }
                    };
                    if mode == Mode::Eval {
                        env.assign_variable(name, value.to_string(), name_location)
                            .map_err(|e| Error {
                                cause: ErrorCause::AssignVariableError(e),
                                location,
                            })?;
                    }
                    term = Term::Value(value);
                }
                Term::Value(_) => {
                    return Err(Error {
                        cause: SyntaxError::InvalidAssignmentTarget.into(),
                        location,
                    })
                }
            }
            continue;
        }

        match operator {
            Question => {
                let Value(condition) = term.into_value(mode, env);
                let (then_mode, else_mode) = match mode {
                    Mode::Skip => (Mode::Skip, Mode::Skip),
                    Mode::Eval if condition != 0 => (Mode::Eval, Mode::Skip),
                    Mode::Eval => (Mode::Skip, Mode::Eval),
                };
                // The expression between `?` and `:` extends down to the
                // comma operator, like a parenthesized expression.
                let then_value =
                    parse_binary(tokens, 1, then_mode, env, src_len)?.into_value(then_mode, env);
                match tokens.next().transpose()? {
                    Some(Token {
                        value: TokenValue::Operator(Colon),
                        ..
                    }) => {}
                    _ => {
                        return Err(Error {
                            cause: SyntaxError::MissingColon.into(),
                            location,
                        })
                    }
                }
                // Right-associative: parse at the same precedence.
                let else_value = parse_binary(tokens, precedence, else_mode, env, src_len)?
                    .into_value(else_mode, env);
                term = Term::Value(if condition != 0 { then_value } else { else_value });
            }
            Comma => {
                // The left value is discarded after its side effects.
                let _ = term.into_value(mode, env);
                let rhs = parse_binary(tokens, precedence + 1, mode, env, src_len)?;
                term = Term::Value(rhs.into_value(mode, env));
            }
            BarBar | AndAnd => {
                let Value(lhs) = term.into_value(mode, env);
                let skip_rhs = match operator {
                    BarBar => lhs != 0,
                    AndAnd => lhs == 0,
                    _ => unreachable!(),
                };
                let rhs_mode = if skip_rhs { Mode::Skip } else { mode };
                let rhs = parse_binary(tokens, precedence + 1, rhs_mode, env, src_len)?
                    .into_value(rhs_mode, env);
                term = Term::Value(apply_binary(operator, Value(lhs), rhs, location)?);
            }
            Bar | Caret | And | EqualEqual | BangEqual | Less | LessEqual | Greater
            | GreaterEqual | LessLess | GreaterGreater | Plus | Minus | Asterisk | Slash
            | Percent => {
                let rhs = parse_binary(tokens, precedence + 1, mode, env, src_len)?;
                let (lhs, rhs) = (term.into_value(mode, env), rhs.into_value(mode, env));
                term = Term::Value(apply_binary(operator, lhs, rhs, location)?);
            }
            Colon | Bang | Tilde | OpenParen | CloseParen => {
                unreachable!("precedence 0 operators never reach here")
            }
            Equal | BarEqual | CaretEqual | AndEqual | LessLessEqual | GreaterGreaterEqual
            | PlusEqual | MinusEqual | AsteriskEqual | SlashEqual | PercentEqual => {
                unreachable!("assignments handled above")
            }
        }
    }

    Ok(term)
}

/// Evaluates an arithmetic expression.
pub fn eval<E: Env>(expression: &str, env: &mut E) -> Result<Value, Error<E::AssignVariableError>> {
    let src_len = expression.len();
    let mut tokens = Tokens::new(expression).peekable();
    let term = parse_binary(&mut tokens, 1, Mode::Eval, env, src_len)?;
    match tokens.next().transpose()? {
        None => Ok(term.into_value(Mode::Eval, env)),
        Some(token) => Err(Error {
            cause: SyntaxError::RedundantToken.into(),
            location: token.location,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn integer_constants() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1", env), Ok(Value(1)));
        assert_eq!(eval("42", env), Ok(Value(42)));
        assert_eq!(eval("010", env), Ok(Value(8)));
        assert_eq!(eval("0x10", env), Ok(Value(16)));
        assert_eq!(eval("0X1F", env), Ok(Value(31)));
        assert_eq!(eval("0", env), Ok(Value(0)));
    }

    #[test]
    fn invalid_digit_in_octal_constant() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("08", env),
            Err(Error {
                cause: ErrorCause::TokenError(TokenError::InvalidNumericConstant),
                location: 0..2,
            })
        );
    }

    #[test]
    fn unset_variable_is_zero() {
        let env = &mut HashMap::new();
        assert_eq!(eval("foo", env), Ok(Value(0)));
        assert_eq!(eval("foo + 3", env), Ok(Value(3)));
    }

    #[test]
    fn integer_variable() {
        let env = &mut HashMap::new();
        env.insert("foo".to_string(), "42".to_string());
        assert_eq!(eval("foo", env), Ok(Value(42)));
    }

    #[test]
    fn non_numeric_variable_takes_leading_digits() {
        let env = &mut HashMap::new();
        env.insert("a".to_string(), "12abc".to_string());
        env.insert("b".to_string(), "abc".to_string());
        env.insert("c".to_string(), " -3 ".to_string());
        env.insert("d".to_string(), "".to_string());
        assert_eq!(eval("a", env), Ok(Value(12)));
        assert_eq!(eval("b", env), Ok(Value(0)));
        assert_eq!(eval("c", env), Ok(Value(-3)));
        assert_eq!(eval("d", env), Ok(Value(0)));
    }

    #[test]
    fn simple_assignment() {
        let env = &mut HashMap::new();
        assert_eq!(eval("a=1", env), Ok(Value(1)));
        assert_eq!(eval(" foo = 40 + 2 ", env), Ok(Value(42)));
        assert_eq!(env["a"], "1");
        assert_eq!(env["foo"], "42");
    }

    #[test]
    fn assignment_is_right_associative() {
        let env = &mut HashMap::new();
        assert_eq!(eval("a = b = 7", env), Ok(Value(7)));
        assert_eq!(env["a"], "7");
        assert_eq!(env["b"], "7");
    }

    #[test]
    fn compound_assignments() {
        let env = &mut HashMap::new();
        env.insert("v".to_string(), "10".to_string());
        assert_eq!(eval("v += 5", env), Ok(Value(15)));
        assert_eq!(env["v"], "15");
        assert_eq!(eval("v -= 3", env), Ok(Value(12)));
        assert_eq!(eval("v *= 2", env), Ok(Value(24)));
        // The old value is the left operand.
        assert_eq!(eval("v /= 5", env), Ok(Value(4)));
        assert_eq!(eval("v %= 3", env), Ok(Value(1)));
        assert_eq!(eval("v <<= 4", env), Ok(Value(16)));
        assert_eq!(eval("v >>= 2", env), Ok(Value(4)));
        assert_eq!(eval("v |= 3", env), Ok(Value(7)));
        assert_eq!(eval("v ^= 1", env), Ok(Value(6)));
        assert_eq!(eval("v &= 2", env), Ok(Value(2)));
    }

    #[test]
    fn assignment_to_non_variable() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1 = 2", env),
            Err(Error {
                cause: ErrorCause::SyntaxError(SyntaxError::InvalidAssignmentTarget),
                location: 2..3,
            })
        );
    }

    #[test]
    fn boolean_logic_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("0||0", env), Ok(Value(0)));
        assert_eq!(eval("2 || 3", env), Ok(Value(1)));
        assert_eq!(eval("0&&1", env), Ok(Value(0)));
        assert_eq!(eval("2 && 3", env), Ok(Value(1)));
    }

    #[test]
    fn short_circuit_skips_assignments() {
        let env = &mut HashMap::new();
        assert_eq!(eval("0 && (x = 1)", env), Ok(Value(0)));
        assert_eq!(env.get("x"), None);
        assert_eq!(eval("1 || (x = 1)", env), Ok(Value(1)));
        assert_eq!(env.get("x"), None);
        assert_eq!(eval("1 && (x = 1)", env), Ok(Value(1)));
        assert_eq!(env["x"], "1");
    }

    #[test]
    fn short_circuit_skips_division_by_zero() {
        let env = &mut HashMap::new();
        assert_eq!(eval("0 && 1 / 0", env), Ok(Value(0)));
        assert_eq!(eval("1 || 1 % 0", env), Ok(Value(1)));
    }

    #[test]
    fn ternary_conditional() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1 ? 2 : 3", env), Ok(Value(2)));
        assert_eq!(eval("0 ? 2 : 3", env), Ok(Value(3)));
        // Only the selected branch is evaluated.
        assert_eq!(eval("1 ? (a = 1) : (b = 2)", env), Ok(Value(1)));
        assert_eq!(env["a"], "1");
        assert_eq!(env.get("b"), None);
        assert_eq!(eval("0 ? 1 / 0 : 9", env), Ok(Value(9)));
    }

    #[test]
    fn ternary_is_right_associative() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1 ? 2 : 0 ? 3 : 4", env), Ok(Value(2)));
        assert_eq!(eval("0 ? 2 : 0 ? 3 : 4", env), Ok(Value(4)));
        assert_eq!(eval("0 ? 2 : 1 ? 3 : 4", env), Ok(Value(3)));
    }

    #[test]
    fn missing_colon_in_ternary() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1 ? 2", env),
            Err(Error {
                cause: ErrorCause::SyntaxError(SyntaxError::MissingColon),
                location: 2..3,
            })
        );
    }

    #[test]
    fn comma_operator() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1, 2", env), Ok(Value(2)));
        assert_eq!(eval("a = 1, b = 2, a + b", env), Ok(Value(3)));
        assert_eq!(env["a"], "1");
        assert_eq!(env["b"], "2");
    }

    #[test]
    fn comparison_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("1<2", env), Ok(Value(1)));
        assert_eq!(eval("2<1", env), Ok(Value(0)));
        assert_eq!(eval("5<=5", env), Ok(Value(1)));
        assert_eq!(eval("5>5", env), Ok(Value(0)));
        assert_eq!(eval("5>=5", env), Ok(Value(1)));
        assert_eq!(eval("5==5", env), Ok(Value(1)));
        assert_eq!(eval("5!=5", env), Ok(Value(0)));
    }

    #[test]
    fn bitwise_and_shift_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("3|5", env), Ok(Value(7)));
        assert_eq!(eval("3^5", env), Ok(Value(6)));
        assert_eq!(eval("3&5", env), Ok(Value(1)));
        assert_eq!(eval("5<<3", env), Ok(Value(40)));
        assert_eq!(eval("64>>3", env), Ok(Value(8)));
    }

    #[test]
    fn additive_and_multiplicative_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("2+5-3", env), Ok(Value(4)));
        assert_eq!(eval("2+3*4", env), Ok(Value(14)));
        assert_eq!(eval("120/10/5", env), Ok(Value(2)));
        assert_eq!(eval("17%5", env), Ok(Value(2)));
    }

    #[test]
    fn unary_operators() {
        let env = &mut HashMap::new();
        assert_eq!(eval("-0", env), Ok(Value(0)));
        assert_eq!(eval(" - 12 ", env), Ok(Value(-12)));
        assert_eq!(eval("- - 49", env), Ok(Value(49)));
        assert_eq!(eval("+10", env), Ok(Value(10)));
        assert_eq!(eval("~0", env), Ok(Value(-1)));
        assert_eq!(eval("!0", env), Ok(Value(1)));
        assert_eq!(eval("!7", env), Ok(Value(0)));
        assert_eq!(eval("!!7", env), Ok(Value(1)));
    }

    #[test]
    fn parentheses() {
        let env = &mut HashMap::new();
        assert_eq!(eval("(42)", env), Ok(Value(42)));
        assert_eq!(eval("(2+3)*4", env), Ok(Value(20)));
        assert_eq!(eval("2*(3+4)", env), Ok(Value(14)));
    }

    #[test]
    fn unmatched_parenthesis() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("(1+2", env),
            Err(Error {
                cause: ErrorCause::SyntaxError(SyntaxError::UnmatchedParenthesis),
                location: 0..1,
            })
        );
    }

    #[test]
    fn wrap_around() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("9223372036854775807 + 1", env),
            Ok(Value(i64::MIN))
        );
        assert_eq!(
            eval("-9223372036854775807 - 2", env),
            Ok(Value(i64::MAX))
        );
        assert_eq!(
            eval("0x7FFFFFFFFFFFFFFF * 2", env),
            Ok(Value(-2))
        );
    }

    #[test]
    fn division_by_zero() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1/0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 1..2,
            })
        );
        assert_eq!(
            eval("10 % 0", env),
            Err(Error {
                cause: ErrorCause::DivisionByZero,
                location: 3..4,
            })
        );
    }

    #[test]
    fn missing_value() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("", env),
            Err(Error {
                cause: ErrorCause::SyntaxError(SyntaxError::MissingValue),
                location: 0..0,
            })
        );
        assert_eq!(
            eval("1 +", env),
            Err(Error {
                cause: ErrorCause::SyntaxError(SyntaxError::MissingValue),
                location: 3..3,
            })
        );
    }

    #[test]
    fn redundant_token() {
        let env = &mut HashMap::new();
        assert_eq!(
            eval("1 2", env),
            Err(Error {
                cause: ErrorCause::SyntaxError(SyntaxError::RedundantToken),
                location: 2..3,
            })
        );
    }
}
