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

//! Shell language syntax and parser.
//!
//! This crate defines data types for constructing abstract syntax trees
//! (ASTs) of the shell language; see the [`syntax`] module. Every AST element
//! carries a [location](source::Location) telling where it appears in the
//! source code.
//!
//! Turning source code into an AST takes three stages:
//!
//! 1. The [lexer](lex::Lexer) is fed raw input and produces a stream of
//!    [tokens](lex::Token). The lexer is a push lexer: when the input ends in
//!    the middle of a token (an open quote, an unterminated here-document, a
//!    backslash-newline), it reports [incompleteness](lex::Scan::Incomplete)
//!    instead of failing, so an interactive front-end can prompt for a
//!    continuation line.
//! 2. [Alias substitution](alias::substitute_aliases) rewrites the token
//!    stream, replacing command words that name aliases.
//! 3. The [parser](parser::Parser) consumes the token stream and builds the
//!    AST by recursive descent. Tokens are moved into the AST on success; on
//!    failure, the parser reports an [error](parser::Error) with the location
//!    of the offending token.

pub mod alias;
pub mod lex;
pub mod parser;
pub mod source;
pub mod syntax;
