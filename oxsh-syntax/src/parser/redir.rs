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

//! Syntax parser for redirections

use super::core::Parser;
use super::error::{Error, Result, SyntaxError};
use crate::lex::{Operator, TokenId};
use crate::syntax::{Fd, HereDoc, Redir, RedirBody, RedirOp};
use std::cell::OnceCell;
use std::rc::Rc;

/// Whether the operator starts a redirection.
pub(super) fn is_redir_operator(operator: Operator) -> bool {
    use Operator::*;
    matches!(
        operator,
        Less | LessLess | LessLessDash | LessGreater | LessAnd | Greater | GreaterGreater
            | GreaterBar | GreaterAnd
    )
}

impl Parser {
    /// Parses one redirection if the next token starts one.
    pub(super) fn maybe_redirection(&mut self) -> Result<Option<Redir>> {
        let fd = match self.peek().id {
            TokenId::IoNumber => {
                let token = self.peek();
                let digits = token
                    .word
                    .to_string_if_literal()
                    .expect("an IO_NUMBER token is always literal");
                let fd = digits.parse().map_err(|_| Error {
                    cause: SyntaxError::FdOutOfRange,
                    location: token.location,
                })?;
                self.take();
                Some(Fd(fd))
            }
            TokenId::Operator(operator) if is_redir_operator(operator) => None,
            _ => return Ok(None),
        };

        let operator = match self.peek().id {
            TokenId::Operator(operator) if is_redir_operator(operator) => {
                self.take();
                operator
            }
            _ => return Err(self.unexpected("redirection operator")),
        };

        let body = match operator {
            Operator::LessLess | Operator::LessLessDash => {
                let delimiter = self.expect_word("here-document delimiter")?;
                let here_doc = Rc::new(HereDoc {
                    delimiter,
                    remove_tabs: operator == Operator::LessLessDash,
                    content: OnceCell::new(),
                });
                self.register_pending_heredoc(Rc::clone(&here_doc));
                RedirBody::HereDoc(here_doc)
            }
            _ => {
                let operator = RedirOp::try_from(operator)
                    .expect("every non-here-doc redirection operator is a RedirOp");
                let operand = self.expect_word("redirection target")?;
                if operand.is_empty() {
                    return Err(self.unexpected("redirection target"));
                }
                RedirBody::Normal { operator, operand }
            }
        };

        Ok(Some(Redir { fd, body }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;
    use assert_matches::assert_matches;

    fn parse_redir(source: &str) -> Result<Option<Redir>> {
        let tokens = Lexer::from_source(source).collect_tokens().unwrap();
        Parser::new(tokens).maybe_redirection()
    }

    #[test]
    fn not_a_redirection() {
        assert_matches!(parse_redir("word"), Ok(None));
        assert_matches!(parse_redir(""), Ok(None));
    }

    #[test]
    fn file_redirections() {
        let redir = parse_redir("<input").unwrap().unwrap();
        assert_eq!(redir.fd, None);
        assert_matches!(redir.body, RedirBody::Normal { operator, operand } => {
            assert_eq!(operator, RedirOp::FileIn);
            assert_eq!(operand.to_string(), "input");
        });

        let redir = parse_redir(">>log").unwrap().unwrap();
        assert_matches!(redir.body, RedirBody::Normal { operator, .. } => {
            assert_eq!(operator, RedirOp::FileAppend);
        });

        let redir = parse_redir(">|force").unwrap().unwrap();
        assert_matches!(redir.body, RedirBody::Normal { operator, .. } => {
            assert_eq!(operator, RedirOp::FileClobber);
        });
    }

    #[test]
    fn fd_redirections() {
        let redir = parse_redir("2>&1").unwrap().unwrap();
        assert_eq!(redir.fd, Some(Fd(2)));
        assert_matches!(redir.body, RedirBody::Normal { operator, operand } => {
            assert_eq!(operator, RedirOp::FdOut);
            assert_eq!(operand.to_string(), "1");
        });

        let redir = parse_redir("0<&3").unwrap().unwrap();
        assert_eq!(redir.fd, Some(Fd(0)));
    }

    #[test]
    fn io_number_out_of_range() {
        let error = parse_redir("99999999999999999999>x").unwrap_err();
        assert_eq!(error.cause, SyntaxError::FdOutOfRange);
    }

    #[test]
    fn here_doc_redir_registers_pending_content() {
        let tokens = Lexer::from_source("<<EOF\nbody\nEOF\n")
            .collect_tokens()
            .unwrap();
        let mut parser = Parser::new(tokens);
        let redir = parser.maybe_redirection().unwrap().unwrap();
        let here_doc = assert_matches!(&redir.body, RedirBody::HereDoc(h) => Rc::clone(h));
        assert_eq!(here_doc.delimiter.to_string(), "EOF");
        assert!(!here_doc.remove_tabs);
        // The content arrives after the newline token.
        assert!(here_doc.content.get().is_none());
        parser.newline().unwrap();
        let content = here_doc.content.get().unwrap();
        assert_eq!(content.to_string(), "body\n");
    }

    #[test]
    fn missing_redirection_target() {
        parse_redir(">").unwrap_err();
        parse_redir("> ;").unwrap_err();
    }
}
