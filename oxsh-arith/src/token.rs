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

//! Tokenization of arithmetic expressions

use std::iter::FusedIterator;
use std::ops::Range;
use thiserror::Error;

use crate::Term;
use crate::Value;

/// Operator
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `|`
    Bar,
    /// `||`
    BarBar,
    /// `|=`
    BarEqual,
    /// `^`
    Caret,
    /// `^=`
    CaretEqual,
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `&=`
    AndEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `<<`
    LessLess,
    /// `<<=`
    LessLessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `>>`
    GreaterGreater,
    /// `>>=`
    GreaterGreaterEqual,
    /// `+`
    Plus,
    /// `+=`
    PlusEqual,
    /// `-`
    Minus,
    /// `-=`
    MinusEqual,
    /// `*`
    Asterisk,
    /// `*=`
    AsteriskEqual,
    /// `/`
    Slash,
    /// `/=`
    SlashEqual,
    /// `%`
    Percent,
    /// `%=`
    PercentEqual,
    /// `~`
    Tilde,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
}

impl Operator {
    /// Binding power of the operator when used as a binary (or ternary)
    /// operator, or 0 if the operator is not binary.
    ///
    /// Higher values bind tighter. Unary prefix operators are handled in the
    /// leaf parser and do not appear in this table.
    #[must_use]
    pub fn precedence(self) -> u8 {
        use Operator::*;
        match self {
            Comma => 1,
            Equal | BarEqual | CaretEqual | AndEqual | LessLessEqual | GreaterGreaterEqual
            | PlusEqual | MinusEqual | AsteriskEqual | SlashEqual | PercentEqual => 2,
            Question => 3,
            BarBar => 4,
            AndAnd => 5,
            Bar => 6,
            Caret => 7,
            And => 8,
            EqualEqual | BangEqual => 9,
            Less | LessEqual | Greater | GreaterEqual => 10,
            LessLess | GreaterGreater => 11,
            Plus | Minus => 12,
            Asterisk | Slash | Percent => 13,
            Colon | Bang | Tilde | OpenParen | CloseParen => 0,
        }
    }

    /// If the operator is a compound assignment, returns the underlying
    /// binary operator.
    ///
    /// The plain `=` maps to `None` within `Some`, so the result is
    /// `None` for non-assignment operators, `Some(None)` for `=`, and
    /// `Some(Some(op))` for `op=`.
    #[must_use]
    pub fn assignment_operand(self) -> Option<Option<Operator>> {
        use Operator::*;
        match self {
            Equal => Some(None),
            BarEqual => Some(Some(Bar)),
            CaretEqual => Some(Some(Caret)),
            AndEqual => Some(Some(And)),
            LessLessEqual => Some(Some(LessLess)),
            GreaterGreaterEqual => Some(Some(GreaterGreater)),
            PlusEqual => Some(Some(Plus)),
            MinusEqual => Some(Some(Minus)),
            AsteriskEqual => Some(Some(Asterisk)),
            SlashEqual => Some(Some(Slash)),
            PercentEqual => Some(Some(Percent)),
            _ => None,
        }
    }
}

/// Value of a [`Token`]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TokenValue<'a> {
    /// Term (number or variable)
    Term(Term<'a>),
    /// Operator
    Operator(Operator),
}

/// Atomic lexical element of an expression
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Token<'a> {
    /// Token value
    pub value: TokenValue<'a>,
    /// Range of the substring where the token occurs in the parsed expression
    pub location: Range<usize>,
}

/// Cause of a tokenization error
#[derive(Clone, Copy, Debug, Eq, Error, Hash, PartialEq)]
pub enum TokenError {
    /// A numeric constant contains an invalid digit.
    #[error("invalid numeric constant")]
    InvalidNumericConstant,

    /// The expression contains a character that is not a whitespace,
    /// operator, number, or identifier.
    #[error("invalid character")]
    InvalidCharacter,
}

/// Tokenization error with its location
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Error {
    /// Cause of the error
    pub cause: TokenError,
    /// Range of the substring in the evaluated expression string where the
    /// error occurred
    pub location: Range<usize>,
}

/// List of all the operator spellings.
///
/// If a prefix of a valid operator is another operator, the prefix (the
/// shorter operator) must appear after the longer. With this ordering, we can
/// short-circuit unnecessary matching on finding a first match.
const OPERATORS: &[(&str, Operator)] = &[
    ("?", Operator::Question),
    (":", Operator::Colon),
    (",", Operator::Comma),
    ("|=", Operator::BarEqual),
    ("||", Operator::BarBar),
    ("|", Operator::Bar),
    ("^=", Operator::CaretEqual),
    ("^", Operator::Caret),
    ("&=", Operator::AndEqual),
    ("&&", Operator::AndAnd),
    ("&", Operator::And),
    ("==", Operator::EqualEqual),
    ("=", Operator::Equal),
    ("!=", Operator::BangEqual),
    ("!", Operator::Bang),
    ("<<=", Operator::LessLessEqual),
    ("<<", Operator::LessLess),
    ("<=", Operator::LessEqual),
    ("<", Operator::Less),
    (">>=", Operator::GreaterGreaterEqual),
    (">>", Operator::GreaterGreater),
    (">=", Operator::GreaterEqual),
    (">", Operator::Greater),
    ("+=", Operator::PlusEqual),
    ("+", Operator::Plus),
    ("-=", Operator::MinusEqual),
    ("-", Operator::Minus),
    ("*=", Operator::AsteriskEqual),
    ("*", Operator::Asterisk),
    ("/=", Operator::SlashEqual),
    ("/", Operator::Slash),
    ("%=", Operator::PercentEqual),
    ("%", Operator::Percent),
    ("~", Operator::Tilde),
    ("(", Operator::OpenParen),
    (")", Operator::CloseParen),
];

/// Iterator that yields tokens from an expression string
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Tokens<'a> {
    /// Creates a tokenizer for the given expression.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Tokens { source, index: 0 }
    }

    /// Parses a numeric constant starting at the current index.
    fn parse_number(&mut self) -> Result<Token<'a>, Error> {
        let start = self.index;
        let rest = &self.source[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .map_or(self.source.len(), |i| start + i);
        let text = &self.source[start..end];
        self.index = end;
        let location = start..end;

        let result = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
        {
            i64::from_str_radix(hex, 16)
        } else if text.len() > 1 && text.starts_with('0') {
            i64::from_str_radix(&text[1..], 8)
        } else {
            text.parse()
        };
        match result {
            Ok(value) => Ok(Token {
                value: TokenValue::Term(Term::Value(Value(value))),
                location,
            }),
            Err(_) => Err(Error {
                cause: TokenError::InvalidNumericConstant,
                location,
            }),
        }
    }

    /// Parses an identifier starting at the current index.
    fn parse_identifier(&mut self) -> Token<'a> {
        let start = self.index;
        let rest = &self.source[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .map_or(self.source.len(), |i| start + i);
        self.index = end;
        Token {
            value: TokenValue::Term(Term::Variable {
                name: &self.source[start..end],
                location: start..end,
            }),
            location: start..end,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.source[self.index..].trim_start();
        self.index = self.source.len() - rest.len();

        let c = rest.chars().next()?;
        if c.is_ascii_digit() {
            return Some(self.parse_number());
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Some(Ok(self.parse_identifier()));
        }

        for &(spelling, operator) in OPERATORS {
            if rest.starts_with(spelling) {
                let location = self.index..self.index + spelling.len();
                self.index += spelling.len();
                return Some(Ok(Token {
                    value: TokenValue::Operator(operator),
                    location,
                }));
            }
        }

        Some(Err(Error {
            cause: TokenError::InvalidCharacter,
            location: self.index..self.index + c.len_utf8(),
        }))
    }
}

impl FusedIterator for Tokens<'_> {}
