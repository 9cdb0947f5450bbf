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

//! Syntax parser for pipelines

use super::core::Parser;
use super::error::{Error, Result, SyntaxError};
use crate::lex::Keyword::Bang;
use crate::lex::{Operator, TokenId};
use crate::syntax::Pipeline;

impl Parser {
    /// Parses a pipeline: one or more commands separated by `|`, with an
    /// optional leading `!`.
    pub(super) fn pipeline(&mut self) -> Result<Pipeline> {
        let negation = if self.at_keyword(Bang) {
            self.take();
            true
        } else {
            false
        };

        if negation {
            // `! !` is not portable and is rejected.
            if self.at_keyword(Bang) {
                return Err(self.unexpected("command"));
            }
            if !self.can_start_command() {
                return Err(Error {
                    cause: SyntaxError::MissingCommand { after: "!" },
                    location: self.peek().location,
                });
            }
        }

        let mut commands = vec![self.command()?];
        while self.peek().id == TokenId::Operator(Operator::Bar) {
            self.take();
            self.linebreak()?;
            if !self.can_start_command() {
                if self.at_end() {
                    return Err(self.unexpected("command"));
                }
                return Err(Error {
                    cause: SyntaxError::MissingCommand { after: "|" },
                    location: self.peek().location,
                });
            }
            commands.push(self.command()?);
        }

        Ok(Pipeline { commands, negation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;

    fn parse_pipeline(source: &str) -> Result<Pipeline> {
        let tokens = Lexer::from_source(source).collect_tokens().unwrap();
        Parser::new(tokens).pipeline()
    }

    #[test]
    fn single_command() {
        let pipeline = parse_pipeline("echo ok").unwrap();
        assert_eq!(pipeline.commands.len(), 1);
        assert!(!pipeline.negation);
    }

    #[test]
    fn multiple_commands() {
        let pipeline = parse_pipeline("a | b | c").unwrap();
        assert_eq!(pipeline.commands.len(), 3);
    }

    #[test]
    fn negation() {
        let pipeline = parse_pipeline("! a | b").unwrap();
        assert!(pipeline.negation);
        assert_eq!(pipeline.commands.len(), 2);
    }

    #[test]
    fn newline_after_bar() {
        let pipeline = parse_pipeline("a |\n\nb").unwrap();
        assert_eq!(pipeline.commands.len(), 2);
    }

    #[test]
    fn missing_command_after_bar() {
        // At the end of input, the error asks for a continuation line.
        let error = parse_pipeline("a |").unwrap_err();
        assert!(error.is_unexpected_eof());

        let error = parse_pipeline("a | ; b").unwrap_err();
        assert_eq!(error.cause, SyntaxError::MissingCommand { after: "|" });
    }

    #[test]
    fn double_negation_is_rejected() {
        parse_pipeline("! ! a").unwrap_err();
    }
}
