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

//! Definition of errors that happen in the parser

use crate::source::Location;
use thiserror::Error;

/// Types of syntax errors
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum SyntaxError {
    /// A token appears where another construct is required.
    #[error("expected {expected}, found `{found}`")]
    UnexpectedToken {
        /// Description of what the grammar requires here
        expected: &'static str,
        /// Source form of the offending token
        found: String,
    },

    /// The input ends where more tokens are required.
    ///
    /// In interactive mode this is not reported to the user; it makes the
    /// front-end prompt for a continuation line.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput {
        /// Description of what the grammar requires here
        expected: &'static str,
    },

    /// A `&&`, `||`, `|`, or `!` is not followed by a command.
    #[error("missing command after `{after}`")]
    MissingCommand {
        /// Operator after which a command is required
        after: &'static str,
    },

    /// A clause that requires commands contains none.
    #[error("no commands in {construct}")]
    EmptyClause {
        /// Construct whose clause is empty
        construct: &'static str,
    },

    /// The variable name of a for loop is not a valid identifier.
    #[error("invalid for loop variable name")]
    InvalidForName,

    /// An `IO_NUMBER` token does not fit in a file descriptor.
    #[error("file descriptor out of range")]
    FdOutOfRange,

    /// A `(` after a word is not a function definition.
    #[error("invalid use of `(`")]
    UnmatchedParenthesis,

    /// A here-document operator is missing its content.
    #[error("here-document content is missing")]
    MissingHereDocContent,
}

/// Parse error with its location
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    /// Cause of the error
    pub cause: SyntaxError,
    /// Position of the offending token
    pub location: Location,
}

impl Error {
    /// Whether this error is an unexpected end of input.
    ///
    /// An interactive front-end reads a continuation line and parses again
    /// when this returns true, rather than reporting the error.
    #[must_use]
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self.cause, SyntaxError::UnexpectedEndOfInput { .. })
    }
}

/// Result type for parser functions
pub type Result<T> = std::result::Result<T, Error>;
