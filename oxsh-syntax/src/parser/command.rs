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

//! Syntax parser for commands
//!
//! The `command` production is three-way ambiguous. It is disambiguated by
//! look-ahead: a compound-command starter keyword or `(` selects a compound
//! command, a word followed by `(` selects a function definition, and
//! anything else is a simple command.

use super::core::Parser;
use super::error::Result;
use crate::lex::{Keyword, Operator, TokenId};
use crate::syntax::{Command, FunctionDefinition};
use std::rc::Rc;

/// Whether the keyword can be the first token of a compound command.
fn starts_compound_command(keyword: Keyword) -> bool {
    use Keyword::*;
    matches!(keyword, OpenBrace | If | While | Until | For | Case)
}

impl Parser {
    /// Whether the next token can start a command.
    ///
    /// This decides where a [compound list](Parser::compound_list) ends:
    /// the terminator words of enclosing constructs (`then`, `fi`, `done`,
    /// `esac`, `}`, and the like) cannot start a command.
    pub(super) fn can_start_command(&self) -> bool {
        match self.peek().id {
            TokenId::Token(None) => true,
            TokenId::Token(Some(keyword)) => {
                starts_compound_command(keyword) || keyword == Keyword::Bang
            }
            TokenId::Operator(Operator::OpenParen) => true,
            TokenId::Operator(operator) => super::redir::is_redir_operator(operator),
            TokenId::IoNumber => true,
            _ => false,
        }
    }

    /// Parses a command.
    pub(super) fn command(&mut self) -> Result<Command> {
        match self.peek().id {
            TokenId::Token(Some(keyword)) if starts_compound_command(keyword) => {
                Ok(Command::Compound(self.full_compound_command()?))
            }
            TokenId::Operator(Operator::OpenParen) => {
                Ok(Command::Compound(self.full_compound_command()?))
            }
            TokenId::Token(None)
                if self.peek2().id == TokenId::Operator(Operator::OpenParen)
                    && self.peek().word.to_string_if_literal().is_some() =>
            {
                self.function_definition()
            }
            TokenId::Token(Some(_)) => {
                // A reserved word in command position that does not start a
                // compound command is a syntax error, as in `then` without
                // `if`.
                Err(self.unexpected("command"))
            }
            _ => self.simple_command(),
        }
    }

    /// Parses a function definition command.
    ///
    /// The next two tokens must be a word and a `(`.
    fn function_definition(&mut self) -> Result<Command> {
        let name = self.take().word;
        self.take(); // `(`
        if self.peek().id != TokenId::Operator(Operator::CloseParen) {
            return Err(self.unexpected("`)`"));
        }
        self.take();
        self.linebreak()?;

        if !self.can_start_command() {
            return Err(self.unexpected("compound command"));
        }
        let body = self.full_compound_command()?;
        Ok(Command::Function(FunctionDefinition {
            name,
            body: Rc::new(body),
        }))
    }
}
