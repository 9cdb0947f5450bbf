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

//! Syntax parser for command lists

use super::core::Parser;
use super::error::{Error, Result, SyntaxError};
use crate::lex::{Operator, TokenId};
use crate::syntax::{AndOr, AndOrList, Item, List};

impl Parser {
    /// Parses an and-or list: pipelines separated by `&&` and `||`.
    pub(super) fn and_or_list(&mut self) -> Result<AndOrList> {
        let first = self.pipeline()?;
        let mut rest = Vec::new();
        loop {
            let condition = match self.peek().id {
                TokenId::Operator(Operator::AndAnd) => AndOr::AndThen,
                TokenId::Operator(Operator::BarBar) => AndOr::OrElse,
                _ => break,
            };
            self.take();
            self.linebreak()?;
            if !self.can_start_command() {
                if self.at_end() {
                    return Err(self.unexpected("command"));
                }
                let after = match condition {
                    AndOr::AndThen => "&&",
                    AndOr::OrElse => "||",
                };
                return Err(Error {
                    cause: SyntaxError::MissingCommand { after },
                    location: self.peek().location,
                });
            }
            rest.push((condition, self.pipeline()?));
        }
        Ok(AndOrList { first, rest })
    }

    /// Parses a complete command: and-or lists separated by `;` and `&`,
    /// terminated by a newline or the end of input.
    pub(super) fn complete_command(&mut self) -> Result<List> {
        let mut items = Vec::new();
        loop {
            let and_or = self.and_or_list()?;
            match self.peek().id {
                TokenId::Operator(Operator::And) => {
                    self.take();
                    items.push(Item {
                        and_or,
                        is_async: true,
                    });
                }
                TokenId::Operator(Operator::Semicolon) => {
                    self.take();
                    items.push(Item {
                        and_or,
                        is_async: false,
                    });
                }
                _ => {
                    items.push(Item {
                        and_or,
                        is_async: false,
                    });
                    break;
                }
            }
            if !self.can_start_command() {
                break;
            }
        }

        if !self.newline()? && !self.at_end() {
            return Err(self.unexpected("newline"));
        }
        self.ensure_no_pending_heredocs()?;
        Ok(List(items))
    }

    /// Parses a possibly empty list of commands inside a compound command.
    ///
    /// The list ends at the first token that cannot start a command, which
    /// is where the enclosing construct's terminator word is expected.
    pub(super) fn compound_list(&mut self) -> Result<List> {
        let mut items = Vec::new();
        loop {
            self.linebreak()?;
            if !self.can_start_command() {
                return Ok(List(items));
            }
            let and_or = self.and_or_list()?;
            match self.peek().id {
                TokenId::Operator(Operator::And) => {
                    self.take();
                    items.push(Item {
                        and_or,
                        is_async: true,
                    });
                }
                TokenId::Operator(Operator::Semicolon) => {
                    self.take();
                    items.push(Item {
                        and_or,
                        is_async: false,
                    });
                }
                TokenId::Newline => {
                    items.push(Item {
                        and_or,
                        is_async: false,
                    });
                }
                _ => {
                    items.push(Item {
                        and_or,
                        is_async: false,
                    });
                    return Ok(List(items));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;

    fn parse(source: &str) -> List {
        let tokens = Lexer::from_source(source).collect_tokens().unwrap();
        let mut parser = Parser::new(tokens);
        let list = parser.parse_program().unwrap();
        assert!(parser.at_end());
        list
    }

    #[test]
    fn separators_and_async_flags() {
        let list = parse("a; b& c");
        assert_eq!(list.0.len(), 3);
        assert!(!list.0[0].is_async);
        assert!(list.0[1].is_async);
        assert!(!list.0[2].is_async);
    }

    #[test]
    fn and_or_chains() {
        let list = parse("a && b || c");
        let and_or = &list.0[0].and_or;
        assert_eq!(and_or.rest.len(), 2);
        assert_eq!(and_or.rest[0].0, AndOr::AndThen);
        assert_eq!(and_or.rest[1].0, AndOr::OrElse);
    }

    #[test]
    fn newline_allowed_after_and_or_operator() {
        let list = parse("a &&\n\nb");
        assert_eq!(list.0[0].and_or.rest.len(), 1);
    }

    #[test]
    fn missing_command_after_and_or() {
        // At the end of input, the error asks for a continuation line.
        let tokens = Lexer::from_source("a &&").collect_tokens().unwrap();
        let error = Parser::new(tokens).parse_program().unwrap_err();
        assert!(error.is_unexpected_eof());

        // Mid-input, the missing command is a plain syntax error.
        let tokens = Lexer::from_source("a && ; b").collect_tokens().unwrap();
        let error = Parser::new(tokens).parse_program().unwrap_err();
        assert_eq!(error.cause, SyntaxError::MissingCommand { after: "&&" });
    }

    #[test]
    fn trailing_semicolon_and_ampersand() {
        assert_eq!(parse("a;").0.len(), 1);
        let list = parse("a&");
        assert_eq!(list.0.len(), 1);
        assert!(list.0[0].is_async);
    }
}
