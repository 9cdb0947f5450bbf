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

//! Fundamental parts of the syntax parser

use super::error::{Error, Result, SyntaxError};
use crate::lex::{Keyword, Token, TokenId};
use crate::source::Location;
use crate::syntax::{HereDoc, Text, TextUnit, Word, WordUnit};
use std::rc::Rc;

/// Syntax parser
///
/// A parser owns a token list and a position into it. Grammar functions,
/// defined in the sibling modules as `impl Parser` blocks, advance the
/// position as they consume tokens and move the consumed tokens into the
/// AST they build.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    /// Here-documents whose operator has been parsed but whose content has
    /// not yet arrived
    pending_heredocs: Vec<Rc<HereDoc>>,
}

impl Parser {
    /// Creates a parser for the given token list.
    ///
    /// If the list does not end with an end-of-input token, one is
    /// appended so that running off the end is reported as an unexpected
    /// end of input.
    #[must_use]
    pub fn new(mut tokens: Vec<Token>) -> Parser {
        let end = tokens
            .last()
            .is_some_and(|token| token.id == TokenId::EndOfInput);
        if !end {
            let location = tokens
                .last()
                .map_or_else(Location::start, |token| token.location);
            tokens.push(Token {
                word: Word {
                    units: Vec::new(),
                    location,
                },
                id: TokenId::EndOfInput,
                location,
            });
        }
        Parser {
            tokens,
            index: 0,
            pending_heredocs: Vec::new(),
        }
    }

    /// Returns the tokens that have not been consumed.
    #[must_use]
    pub fn into_rest(mut self) -> Vec<Token> {
        self.tokens.split_off(self.index)
    }

    /// Whether all tokens (except the end-of-input token) are consumed.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.peek().id == TokenId::EndOfInput
    }

    /// Returns a reference to the next token without consuming it.
    pub(super) fn peek(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    /// Returns a reference to the token after the next one.
    pub(super) fn peek2(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + 1).min(last)]
    }

    /// Consumes the next token and returns it.
    pub(super) fn take(&mut self) -> Token {
        let last = self.tokens.len() - 1;
        let i = self.index.min(last);
        if self.index < last {
            self.index += 1;
        }
        let location = self.tokens[i].location;
        std::mem::replace(
            &mut self.tokens[i],
            Token {
                word: Word {
                    units: Vec::new(),
                    location,
                },
                id: TokenId::EndOfInput,
                location,
            },
        )
    }

    /// Creates an error describing that the next token is not what the
    /// grammar requires.
    pub(super) fn unexpected(&self, expected: &'static str) -> Error {
        let token = self.peek();
        let cause = if token.id == TokenId::EndOfInput {
            SyntaxError::UnexpectedEndOfInput { expected }
        } else {
            SyntaxError::UnexpectedToken {
                expected,
                found: token.to_string(),
            }
        };
        Error {
            cause,
            location: token.location,
        }
    }

    /// Whether the next token is the given keyword.
    pub(super) fn at_keyword(&self, keyword: Keyword) -> bool {
        self.peek().id == TokenId::Token(Some(keyword))
    }

    /// Consumes the next token, which must be the given keyword.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token> {
        if self.at_keyword(keyword) {
            Ok(self.take())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    /// Consumes the next token, which must be a word (possibly annotated
    /// as a reserved word).
    pub(super) fn expect_word(&mut self, expected: &'static str) -> Result<Word> {
        match self.peek().id {
            TokenId::Token(_) => Ok(self.take().word),
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Consumes a newline token and the here-document bodies that follow
    /// it, filling the pending here-documents.
    ///
    /// Returns false without consuming anything if the next token is not a
    /// newline.
    pub(super) fn newline(&mut self) -> Result<bool> {
        if self.peek().id != TokenId::Newline {
            return Ok(false);
        }
        self.take();
        while self.peek().id == TokenId::HereDocBody {
            let token = self.take();
            let text = Text(
                token
                    .word
                    .units
                    .into_iter()
                    .map(|unit| match unit {
                        WordUnit::Unquoted(unit) => unit,
                        // The lexer builds here-doc bodies from unquoted
                        // units only.
                        _ => TextUnit::Literal('\0'),
                    })
                    .collect(),
            );
            if let Some(here_doc) = self.take_pending_heredoc() {
                here_doc.content.set(text).ok();
            }
        }
        Ok(true)
    }

    /// Consumes any number of newline tokens.
    pub(super) fn linebreak(&mut self) -> Result<()> {
        while self.newline()? {}
        Ok(())
    }

    /// Registers a here-document whose content is yet to be parsed.
    pub(super) fn register_pending_heredoc(&mut self, here_doc: Rc<HereDoc>) {
        self.pending_heredocs.push(here_doc);
    }

    fn take_pending_heredoc(&mut self) -> Option<Rc<HereDoc>> {
        if self.pending_heredocs.is_empty() {
            None
        } else {
            Some(self.pending_heredocs.remove(0))
        }
    }

    /// Reports an error if a here-document is missing its content.
    ///
    /// This happens when the input ends before the newline that would
    /// introduce the content.
    pub(super) fn ensure_no_pending_heredocs(&self) -> Result<()> {
        match self.pending_heredocs.first() {
            None => Ok(()),
            Some(here_doc) => Err(Error {
                cause: SyntaxError::MissingHereDocContent,
                location: here_doc.delimiter.location,
            }),
        }
    }

    /// Parses a whole program: a sequence of complete commands up to the
    /// end of input.
    pub fn parse_program(&mut self) -> Result<crate::syntax::List> {
        let mut items = Vec::new();
        loop {
            self.linebreak()?;
            if self.at_end() {
                self.ensure_no_pending_heredocs()?;
                return Ok(crate::syntax::List(items));
            }
            let list = self.complete_command()?;
            items.extend(list.0);
        }
    }

    /// Parses one complete command, consuming the newline that terminates
    /// it.
    ///
    /// Returns `None` if only newlines remain before the end of input.
    pub fn parse_complete_command(&mut self) -> Result<Option<crate::syntax::List>> {
        self.linebreak()?;
        if self.at_end() {
            self.ensure_no_pending_heredocs()?;
            return Ok(None);
        }
        let list = self.complete_command()?;
        Ok(Some(list))
    }
}
