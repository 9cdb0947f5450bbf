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

//! Operator tokens

use std::fmt;

/// Operator token of the shell language
///
/// Operators are recognized by longest match: when the input could extend
/// the operator scanned so far into a longer one, the lexer keeps reading.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    /// `&`
    And,
    /// `&&`
    AndAnd,
    /// `;`
    Semicolon,
    /// `;;`
    SemicolonSemicolon,
    /// `;&`
    SemicolonAnd,
    /// `|`
    Bar,
    /// `||`
    BarBar,
    /// `<`
    Less,
    /// `<<`
    LessLess,
    /// `<<-`
    LessLessDash,
    /// `<>`
    LessGreater,
    /// `<&`
    LessAnd,
    /// `>`
    Greater,
    /// `>>`
    GreaterGreater,
    /// `>|`
    GreaterBar,
    /// `>&`
    GreaterAnd,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
}

impl Operator {
    /// Returns the operator as a string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        use Operator::*;
        match self {
            And => "&",
            AndAnd => "&&",
            Semicolon => ";",
            SemicolonSemicolon => ";;",
            SemicolonAnd => ";&",
            Bar => "|",
            BarBar => "||",
            Less => "<",
            LessLess => "<<",
            LessLessDash => "<<-",
            LessGreater => "<>",
            LessAnd => "<&",
            Greater => ">",
            GreaterGreater => ">>",
            GreaterBar => ">|",
            GreaterAnd => ">&",
            OpenParen => "(",
            CloseParen => ")",
        }
    }

    /// Returns true if the character can start an operator.
    #[must_use]
    pub fn is_operator_start(c: char) -> bool {
        matches!(c, '&' | ';' | '|' | '<' | '>' | '(' | ')')
    }

    /// Returns the operator that results from appending the character to
    /// this operator, if any.
    #[must_use]
    pub fn extend(self, c: char) -> Option<Operator> {
        use Operator::*;
        match (self, c) {
            (And, '&') => Some(AndAnd),
            (Semicolon, ';') => Some(SemicolonSemicolon),
            (Semicolon, '&') => Some(SemicolonAnd),
            (Bar, '|') => Some(BarBar),
            (Less, '<') => Some(LessLess),
            (LessLess, '-') => Some(LessLessDash),
            (Less, '>') => Some(LessGreater),
            (Less, '&') => Some(LessAnd),
            (Greater, '>') => Some(GreaterGreater),
            (Greater, '|') => Some(GreaterBar),
            (Greater, '&') => Some(GreaterAnd),
            _ => None,
        }
    }

    /// Returns the single-character operator for the given character, if any.
    #[must_use]
    pub fn from_char(c: char) -> Option<Operator> {
        use Operator::*;
        match c {
            '&' => Some(And),
            ';' => Some(Semicolon),
            '|' => Some(Bar),
            '<' => Some(Less),
            '>' => Some(Greater),
            '(' => Some(OpenParen),
            ')' => Some(CloseParen),
            _ => None,
        }
    }

    /// Returns true if some longer operator starts with this operator.
    #[must_use]
    pub fn is_extensible(self) -> bool {
        use Operator::*;
        matches!(self, And | Semicolon | Bar | Less | LessLess | Greater)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
