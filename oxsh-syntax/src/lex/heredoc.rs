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

//! Here-document contents
//!
//! When the lexer scans a `<<` or `<<-` operator, it records the following
//! word token as a pending here-document delimiter. The content lines are
//! consumed after the newline that ends the current command line; each
//! content becomes a [`HereDocBody`](super::TokenId::HereDocBody) token
//! emitted right after that newline, in operator order.

use super::core::{Cursor, Interrupt, LexError, LexErrorCause, Lexer, ScanResult, Token, TokenId};
use super::word::TextContext;
use crate::syntax::{Text, Word, WordUnit};

/// Here-document whose content is yet to be scanned
#[derive(Clone, Debug)]
pub(crate) struct PendingHereDoc {
    /// Delimiter with quotations removed
    pub delimiter: String,
    /// Whether the delimiter word contained any quotation
    ///
    /// A quoted delimiter suppresses expansion in the content: every
    /// content character is literal.
    pub quoted: bool,
    /// Whether leading tabs are stripped from content and delimiter lines
    /// (the `<<-` operator)
    pub remove_tabs: bool,
}

impl Lexer {
    /// Scans the content of one here-document.
    ///
    /// Lines are consumed until a line equals the delimiter exactly (after
    /// tab stripping for `<<-`). The content is packaged as a
    /// `HereDocBody` token whose word holds the content as unquoted text
    /// units.
    pub(crate) fn scan_heredoc_body(
        &self,
        cur: &mut Cursor,
        pending: &PendingHereDoc,
    ) -> ScanResult<Token> {
        let location = cur.location();
        let mut content = String::new();

        loop {
            let mut line = String::new();
            let mut terminated = true;
            loop {
                match self.peek(cur) {
                    Some('\n') => {
                        self.advance(cur);
                        break;
                    }
                    Some('\0') => {
                        return Err(Interrupt::Error(LexError {
                            cause: LexErrorCause::NulByte,
                            location: cur.location(),
                        }))
                    }
                    Some(c) => {
                        self.advance(cur);
                        line.push(c);
                    }
                    None if self.is_finished() => {
                        // The final line of the input may lack a trailing
                        // newline and can still be the delimiter line.
                        terminated = false;
                        break;
                    }
                    None => return Err(Interrupt::Incomplete),
                }
            }

            let stripped = if pending.remove_tabs {
                line.trim_start_matches('\t')
            } else {
                &line[..]
            };
            if stripped == pending.delimiter {
                break;
            }
            if !terminated {
                return Err(Interrupt::Error(LexError {
                    cause: LexErrorCause::UnclosedHereDocContent {
                        delimiter: pending.delimiter.clone(),
                    },
                    location,
                }));
            }
            content.push_str(stripped);
            content.push('\n');
        }

        let text = if pending.quoted {
            Text::from_literal_chars(&content)
        } else {
            parse_content(&content, location)?
        };

        Ok(Token {
            word: Word {
                units: text.0.into_iter().map(WordUnit::Unquoted).collect(),
                location,
            },
            id: TokenId::HereDocBody,
            location,
        })
    }
}

/// Parses the raw content of an unquoted here-document into a text.
///
/// The content is scanned with here-document escape rules: a backslash
/// escapes only `$`, `` ` ``, `\`, and a newline, and the `$`-initiated
/// and backquoted expansion constructs are recognized.
fn parse_content(content: &str, location: crate::source::Location) -> ScanResult<Text> {
    let sub = Lexer::from_source(content);
    let mut cur = sub.cursor();
    sub.scan_text(&mut cur, TextContext::HereDoc)
        .map_err(|interrupt| match interrupt {
            // Positions inside the content are relative to the content, so
            // report errors at the here-document itself.
            Interrupt::Error(error) => Interrupt::Error(LexError {
                cause: error.cause,
                location,
            }),
            Interrupt::Incomplete => {
                unreachable!("a finished lexer never reports Incomplete")
            }
        })
}
