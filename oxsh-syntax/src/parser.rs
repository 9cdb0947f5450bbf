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

//! Syntax parser for the shell language
//!
//! The [`Parser`] consumes a token list produced by the
//! [lexer](crate::lex::Lexer) (and rewritten by
//! [alias substitution](crate::alias::substitute_aliases)) and builds an
//! abstract syntax tree by recursive descent over the POSIX shell grammar.
//!
//! The parser takes ownership of the token list. On success, the consumed
//! tokens have been moved into the AST; [`Parser::into_rest`] returns
//! whatever was not consumed. On failure, the parser reports an [`Error`]
//! naming the expected construct and the location of the offending token;
//! [unexpected end of input](Error::is_unexpected_eof) is distinguished so
//! an interactive front-end can prompt for a continuation line and try
//! again.

mod command;
mod compound_command;
mod core;
mod error;
mod list;
mod pipeline;
mod redir;
mod simple_command;

pub use self::core::Parser;
pub use self::error::{Error, Result, SyntaxError};
