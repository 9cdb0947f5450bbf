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

//! Syntax parser for compound commands

use super::core::Parser;
use super::error::{Error, Result, SyntaxError};
use crate::lex::Keyword::{Case, CloseBrace, Do, Done, Elif, Else, Esac, Fi, For, If, In, OpenBrace, Then, Until, While};
use crate::lex::{Operator, TokenId};
use crate::syntax::{
    CaseContinuation, CaseItem, CompoundCommand, ElifThen, FullCompoundCommand, List, Word,
};

/// Whether the string is a valid POSIX identifier.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl Parser {
    /// Parses a compound command with optional trailing redirections.
    pub(super) fn full_compound_command(&mut self) -> Result<FullCompoundCommand> {
        let command = self.compound_command()?;
        let mut redirs = Vec::new();
        while let Some(redir) = self.maybe_redirection()? {
            redirs.push(redir);
        }
        Ok(FullCompoundCommand { command, redirs })
    }

    /// Parses a compound command.
    fn compound_command(&mut self) -> Result<CompoundCommand> {
        match self.peek().id {
            TokenId::Token(Some(OpenBrace)) => self.brace_group(),
            TokenId::Operator(Operator::OpenParen) => self.subshell(),
            TokenId::Token(Some(If)) => self.if_command(),
            TokenId::Token(Some(While)) => self.while_command(),
            TokenId::Token(Some(Until)) => self.until_command(),
            TokenId::Token(Some(For)) => self.for_command(),
            TokenId::Token(Some(Case)) => self.case_command(),
            _ => Err(self.unexpected("compound command")),
        }
    }

    /// Parses a non-empty compound list for a clause of the given
    /// construct.
    fn clause(&mut self, construct: &'static str) -> Result<List> {
        let list = self.compound_list()?;
        if list.0.is_empty() {
            // At the end of input the clause may be completed by a
            // continuation line, which is a different diagnostic.
            if self.at_end() {
                return Err(self.unexpected("commands"));
            }
            return Err(Error {
                cause: SyntaxError::EmptyClause { construct },
                location: self.peek().location,
            });
        }
        Ok(list)
    }

    /// Parses a brace group. The next token must be `{`.
    fn brace_group(&mut self) -> Result<CompoundCommand> {
        self.take();
        let list = self.clause("brace group")?;
        self.expect_keyword(CloseBrace)?;
        Ok(CompoundCommand::Grouping(list))
    }

    /// Parses a subshell. The next token must be `(`.
    fn subshell(&mut self) -> Result<CompoundCommand> {
        self.take();
        let list = self.clause("subshell")?;
        if self.peek().id != TokenId::Operator(Operator::CloseParen) {
            return Err(self.unexpected("`)`"));
        }
        self.take();
        Ok(CompoundCommand::Subshell(list))
    }

    /// Parses a `do ... done` clause.
    fn do_clause(&mut self) -> Result<List> {
        self.expect_keyword(Do)?;
        let body = self.clause("do clause")?;
        self.expect_keyword(Done)?;
        Ok(body)
    }

    /// Parses a while loop. The next token must be `while`.
    fn while_command(&mut self) -> Result<CompoundCommand> {
        self.take();
        let condition = self.clause("while condition")?;
        let body = self.do_clause()?;
        Ok(CompoundCommand::While { condition, body })
    }

    /// Parses an until loop. The next token must be `until`.
    fn until_command(&mut self) -> Result<CompoundCommand> {
        self.take();
        let condition = self.clause("until condition")?;
        let body = self.do_clause()?;
        Ok(CompoundCommand::Until { condition, body })
    }

    /// Parses an if conditional construct. The next token must be `if`.
    fn if_command(&mut self) -> Result<CompoundCommand> {
        self.take();
        let condition = self.clause("if condition")?;
        self.expect_keyword(Then)?;
        let body = self.clause("then clause")?;

        let mut elifs = Vec::new();
        while self.at_keyword(Elif) {
            self.take();
            let condition = self.clause("elif condition")?;
            self.expect_keyword(Then)?;
            let body = self.clause("then clause")?;
            elifs.push(ElifThen { condition, body });
        }

        let r#else = if self.at_keyword(Else) {
            self.take();
            Some(self.clause("else clause")?)
        } else {
            None
        };

        self.expect_keyword(Fi)?;
        Ok(CompoundCommand::If {
            condition,
            body,
            elifs,
            r#else,
        })
    }

    /// Parses a for loop. The next token must be `for`.
    fn for_command(&mut self) -> Result<CompoundCommand> {
        self.take();

        let name = self.expect_word("variable name")?;
        match name.to_string_if_literal() {
            Some(literal) if is_identifier(&literal) => {}
            _ => {
                return Err(Error {
                    cause: SyntaxError::InvalidForName,
                    location: name.location,
                })
            }
        }

        self.linebreak()?;
        let values = if self.at_keyword(In) {
            self.take();
            let mut values: Vec<Word> = Vec::new();
            while let TokenId::Token(_) = self.peek().id {
                values.push(self.take().word);
            }
            if self.peek().id == TokenId::Operator(Operator::Semicolon) {
                self.take();
            }
            Some(values)
        } else {
            if self.peek().id == TokenId::Operator(Operator::Semicolon) {
                self.take();
            }
            None
        };
        self.linebreak()?;

        let body = self.do_clause()?;
        Ok(CompoundCommand::For { name, values, body })
    }

    /// Parses a case conditional construct. The next token must be `case`.
    fn case_command(&mut self) -> Result<CompoundCommand> {
        self.take();
        let subject = self.expect_word("word")?;
        self.linebreak()?;
        self.expect_keyword(In)?;
        self.linebreak()?;

        let mut items = Vec::new();
        loop {
            if self.at_keyword(Esac) {
                self.take();
                return Ok(CompoundCommand::Case { subject, items });
            }

            let open_paren = self.peek().id == TokenId::Operator(Operator::OpenParen);
            if open_paren {
                self.take();
            }

            let mut patterns = Vec::new();
            loop {
                match self.peek().id {
                    TokenId::Token(_) => patterns.push(self.take().word),
                    _ => return Err(self.unexpected("pattern")),
                }
                if self.peek().id == TokenId::Operator(Operator::Bar) {
                    self.take();
                } else {
                    break;
                }
            }

            if self.peek().id != TokenId::Operator(Operator::CloseParen) {
                return Err(self.unexpected("`)`"));
            }
            self.take();

            let body = self.compound_list()?;

            let continuation = match self.peek().id {
                TokenId::Operator(Operator::SemicolonSemicolon) => {
                    self.take();
                    CaseContinuation::Break
                }
                TokenId::Operator(Operator::SemicolonAnd) => {
                    self.take();
                    CaseContinuation::FallThrough
                }
                TokenId::Token(Some(Esac)) => {
                    // The last item may omit its terminator.
                    items.push(CaseItem {
                        patterns,
                        body,
                        continuation: CaseContinuation::Break,
                    });
                    self.take();
                    return Ok(CompoundCommand::Case { subject, items });
                }
                _ => return Err(self.unexpected("`;;`")),
            };
            items.push(CaseItem {
                patterns,
                body,
                continuation,
            });
            self.linebreak()?;
        }
    }
}
