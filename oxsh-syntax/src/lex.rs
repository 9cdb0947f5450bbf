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

//! Lexical analyzer
//!
//! This module contains the [`Lexer`] and its supporting types. The lexer is
//! a push lexer: input is appended with [`Lexer::push_str`], and
//! [`Lexer::next_token`] either produces a [`Token`] or reports that the
//! input so far does not yet delimit one. See the submodule items for
//! details.

mod core;
mod heredoc;
mod keyword;
mod op;
mod word;

pub use self::core::{Lexer, LexError, LexErrorCause, Scan, Token, TokenId};
pub use self::keyword::Keyword;
pub use self::op::Operator;
pub use self::word::parse_text;
