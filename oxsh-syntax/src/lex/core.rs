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

//! Fundamental building blocks for the lexical analyzer
//!
//! The [`Lexer`] turns raw input into [`Token`]s. It is a push lexer:
//! [`push_str`](Lexer::push_str) appends input, and
//! [`next_token`](Lexer::next_token) scans the next token. When the input
//! read so far ends in the middle of a token, `next_token` returns
//! [`Scan::Incomplete`] without consuming anything, so the caller can push
//! a continuation line and try again. [`finish`](Lexer::finish) declares
//! the end of input, after which a pending incomplete token becomes a hard
//! [`LexError`].
//!
//! Scanning is speculative: a scan walks a [`Cursor`] over the input buffer
//! and the consumed region is committed only when a whole token has been
//! produced. This is what makes the incomplete state free of side effects.

use super::heredoc::PendingHereDoc;
use super::keyword::Keyword;
use super::op::Operator;
use crate::source::Location;
use crate::syntax::{TextUnit, Word, WordUnit};
use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroU64;
use thiserror::Error;

/// Returns true if the character is a blank character.
pub fn is_blank(c: char) -> bool {
    c != '\n' && c.is_whitespace()
}

/// Token identifier, or classification of tokens
///
/// This enum classifies a token as defined in POSIX XCU 2.10.1 Shell Grammar
/// Lexical Conventions. For convenience, the identifiers `Newline`,
/// `HereDocBody`, and `EndOfInput` are included although POSIX does not
/// count them as tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenId {
    /// `TOKEN`
    ///
    /// If this token _looks like_ a reserved word, this variant has the
    /// associated `Keyword` value. However, it depends on context whether
    /// the token is actually regarded as a reserved word or an ordinary
    /// word; the parser makes that decision.
    Token(Option<Keyword>),
    /// Operator
    Operator(Operator),
    /// `IO_NUMBER`
    IoNumber,
    /// Newline
    Newline,
    /// Content of a here-document
    ///
    /// The lexer emits one `HereDocBody` token per pending here-document
    /// right after the newline token that ends the command line containing
    /// the here-document operators, in operator order. The body text is
    /// stored in the token word as unquoted units.
    HereDocBody,
    /// End of input
    EndOfInput,
}

/// Result of lexical analysis produced by the [`Lexer`]
#[derive(Clone, Debug)]
pub struct Token {
    /// Content of the token
    pub word: Word,
    /// Token identifier
    pub id: TokenId,
    /// Position of the first character of the token
    pub location: Location,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            TokenId::Newline => f.write_str("\n"),
            TokenId::EndOfInput => Ok(()),
            _ => self.word.fmt(f),
        }
    }
}

/// Cause of a lexical error
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum LexErrorCause {
    /// The input contains a NUL byte.
    #[error("NUL byte in input")]
    NulByte,
    /// A single quotation lacks a closing `'`.
    #[error("unclosed single quote")]
    UnclosedSingleQuote,
    /// A double quotation lacks a closing `"`.
    #[error("unclosed double quote")]
    UnclosedDoubleQuote,
    /// A backquote command substitution lacks a closing `` ` ``.
    #[error("unclosed backquote command substitution")]
    UnclosedBackquote,
    /// A `$(` command substitution lacks a closing `)`.
    #[error("unclosed command substitution")]
    UnclosedCommandSubstitution,
    /// A `$((` arithmetic expansion lacks a closing `))`.
    #[error("unclosed arithmetic expansion")]
    UnclosedArith,
    /// A `${` parameter expansion lacks a closing `}`.
    #[error("unclosed parameter expansion")]
    UnclosedParam,
    /// A `${}` parameter expansion has no parameter name.
    #[error("empty parameter expansion")]
    EmptyParam,
    /// A parameter expansion modifier is malformed.
    #[error("invalid parameter expansion modifier")]
    InvalidModifier,
    /// A here-document content is missing its delimiter line.
    #[error("here-document delimited by end of input (wanted `{delimiter}`)")]
    UnclosedHereDocContent {
        /// Delimiter the here-document was looking for
        delimiter: String,
    },
}

/// Lexical error with its location
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct LexError {
    /// Cause of the error
    pub cause: LexErrorCause,
    /// Position of the error in the source code
    pub location: Location,
}

/// Result of [`Lexer::next_token`]
#[derive(Clone, Debug)]
pub enum Scan {
    /// A complete token was scanned.
    Token(Token),
    /// The input read so far does not yet delimit a token.
    ///
    /// More input may complete the token; the caller should push a
    /// continuation line and retry.
    Incomplete,
}

/// Reason a speculative scan stopped before producing a value
#[derive(Clone, Debug)]
pub(crate) enum Interrupt {
    /// More input is needed.
    Incomplete,
    /// The input is invalid.
    Error(LexError),
}

pub(crate) type ScanResult<T> = Result<T, Interrupt>;

/// Read position of a speculative scan
///
/// A cursor indexes into the lexer's input buffer and tracks the source
/// position of the indexed character. Scans advance a cursor; the lexer
/// commits the cursor position only when a whole token has been scanned.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor {
    pub pos: usize,
    pub line: u64,
    pub column: u64,
}

impl Cursor {
    /// Returns the location of the character the cursor points at.
    pub fn location(&self) -> Location {
        Location {
            line: NonZeroU64::new(self.line).unwrap_or(NonZeroU64::MIN),
            column: NonZeroU64::new(self.column).unwrap_or(NonZeroU64::MIN),
        }
    }
}

/// Lexical analyzer
///
/// See the [module documentation](self) for an overview.
#[derive(Clone, Debug)]
pub struct Lexer {
    /// Characters read so far
    source: Vec<char>,
    /// Index of the next character to be consumed
    index: usize,
    /// Line number of the next character
    line: u64,
    /// Column number of the next character
    column: u64,
    /// Whether the end of input has been declared
    finished: bool,
    /// Here-doc body tokens scanned but not yet returned
    ready: VecDeque<Token>,
    /// Here-documents whose body is still to be scanned
    pending_heredocs: VecDeque<PendingHereDoc>,
    /// Set when a `<<` or `<<-` operator token has just been returned; the
    /// value is the `remove_tabs` flag. The next word token is then taken
    /// as a here-document delimiter.
    awaiting_delimiter: Option<bool>,
}

impl Default for Lexer {
    fn default() -> Lexer {
        Lexer::new()
    }
}

impl Lexer {
    /// Creates a lexer with no input.
    #[must_use]
    pub fn new() -> Lexer {
        Lexer {
            source: Vec::new(),
            index: 0,
            line: 1,
            column: 1,
            finished: false,
            ready: VecDeque::new(),
            pending_heredocs: VecDeque::new(),
            awaiting_delimiter: None,
        }
    }

    /// Creates a lexer with a complete, fixed source string.
    ///
    /// The lexer is already [finished](Self::finish), so it never reports
    /// [`Scan::Incomplete`].
    #[must_use]
    pub fn from_source(source: &str) -> Lexer {
        let mut lexer = Lexer::new();
        lexer.push_str(source);
        lexer.finish();
        lexer
    }

    /// Appends input to the lexer.
    ///
    /// # Panics
    ///
    /// If the lexer is already finished.
    pub fn push_str(&mut self, s: &str) {
        assert!(!self.finished, "input pushed to a finished lexer");
        self.source.extend(s.chars());
    }

    /// Declares the end of input.
    ///
    /// After this call, a token that would otherwise be reported as
    /// incomplete is either delimited by the end of input or reported as an
    /// error.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Whether the end of input has been declared.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns a cursor at the committed read position.
    pub(crate) fn cursor(&self) -> Cursor {
        Cursor {
            pos: self.index,
            line: self.line,
            column: self.column,
        }
    }

    /// Returns the character at the cursor, if available.
    pub(crate) fn peek(&self, cur: &Cursor) -> Option<char> {
        self.source.get(cur.pos).copied()
    }

    /// Consumes the character at the cursor.
    pub(crate) fn advance(&self, cur: &mut Cursor) -> Option<char> {
        let c = self.peek(cur)?;
        cur.pos += 1;
        if c == '\n' {
            cur.line += 1;
            cur.column = 1;
        } else {
            cur.column += 1;
        }
        Some(c)
    }

    /// Commits everything up to the cursor as consumed.
    fn commit(&mut self, cur: Cursor) {
        debug_assert!(cur.pos >= self.index);
        self.index = cur.pos;
        self.line = cur.line;
        self.column = cur.column;
    }

    /// Removes line continuations (a backslash followed by a newline) at
    /// the cursor.
    ///
    /// Returns `Incomplete` when the input ends just after a backslash, in
    /// which case it is not yet known whether the backslash starts a line
    /// continuation.
    pub(crate) fn skip_line_continuations(&self, cur: &mut Cursor) -> ScanResult<()> {
        while self.peek(cur) == Some('\\') {
            let mut ahead = *cur;
            self.advance(&mut ahead);
            match self.peek(&ahead) {
                Some('\n') => {
                    self.advance(&mut ahead);
                    *cur = ahead;
                }
                Some(_) => return Ok(()),
                None if self.finished => return Ok(()),
                None => return Err(Interrupt::Incomplete),
            }
        }
        Ok(())
    }

    /// Skips blanks and a comment at the cursor.
    ///
    /// A `#` at the position where a token would start introduces a comment
    /// that runs to (but does not include) the next newline.
    fn skip_blanks_and_comment(&self, cur: &mut Cursor) -> ScanResult<()> {
        loop {
            self.skip_line_continuations(cur)?;
            match self.peek(cur) {
                Some(c) if is_blank(c) => {
                    self.advance(cur);
                }
                Some('#') => {
                    while let Some(c) = self.peek(cur) {
                        if c == '\n' {
                            break;
                        }
                        self.advance(cur);
                    }
                    if self.peek(cur).is_none() {
                        return Ok(());
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Scans an operator token. The cursor must be at an operator start
    /// character.
    fn scan_operator(&self, cur: &mut Cursor) -> ScanResult<Operator> {
        let first = self.advance(cur).unwrap();
        let mut operator = Operator::from_char(first).unwrap();
        loop {
            self.skip_line_continuations(cur)?;
            match self.peek(cur) {
                Some(c) => match operator.extend(c) {
                    Some(longer) => {
                        operator = longer;
                        self.advance(cur);
                    }
                    None => break,
                },
                None if self.finished => break,
                // A longer operator may still be coming.
                None if operator.is_extensible() => return Err(Interrupt::Incomplete),
                None => break,
            }
        }
        Ok(operator)
    }

    /// Scans one token at the cursor.
    fn scan_token(&self, cur: &mut Cursor) -> ScanResult<Token> {
        self.skip_blanks_and_comment(cur)?;
        let location = cur.location();

        let Some(c) = self.peek(cur) else {
            return if self.finished {
                Ok(Token {
                    word: Word {
                        units: Vec::new(),
                        location,
                    },
                    id: TokenId::EndOfInput,
                    location,
                })
            } else {
                Err(Interrupt::Incomplete)
            };
        };

        if c == '\0' {
            return Err(Interrupt::Error(LexError {
                cause: LexErrorCause::NulByte,
                location,
            }));
        }

        if c == '\n' {
            self.advance(cur);
            return Ok(Token {
                word: Word {
                    units: vec![WordUnit::Unquoted(TextUnit::Literal('\n'))],
                    location,
                },
                id: TokenId::Newline,
                location,
            });
        }

        if Operator::is_operator_start(c) {
            let operator = self.scan_operator(cur)?;
            let word = Word {
                units: operator
                    .as_str()
                    .chars()
                    .map(|c| WordUnit::Unquoted(TextUnit::Literal(c)))
                    .collect(),
                location,
            };
            return Ok(Token {
                word,
                id: TokenId::Operator(operator),
                location,
            });
        }

        let word = self.scan_word(cur, super::word::WordContext::Token)?;

        // A word of digits immediately followed by a redirection operator
        // is an IO_NUMBER.
        if matches!(self.peek(cur), Some('<' | '>')) {
            if let Some(literal) = word.to_string_if_literal() {
                if !literal.is_empty() && literal.bytes().all(|b| b.is_ascii_digit()) {
                    return Ok(Token {
                        word,
                        id: TokenId::IoNumber,
                        location,
                    });
                }
            }
        }

        let keyword = word
            .to_string_if_literal()
            .and_then(|s| s.parse::<Keyword>().ok());
        Ok(Token {
            word,
            id: TokenId::Token(keyword),
            location,
        })
    }

    /// Scans the next token.
    ///
    /// Returns [`Scan::Incomplete`] when the input read so far does not
    /// delimit a complete token; nothing is consumed in that case.
    pub fn next_token(&mut self) -> Result<Scan, LexError> {
        if let Some(token) = self.ready.pop_front() {
            return Ok(Scan::Token(token));
        }

        let mut cur = self.cursor();
        let token = match self.scan_token(&mut cur) {
            Ok(token) => token,
            Err(Interrupt::Incomplete) => return Ok(Scan::Incomplete),
            Err(Interrupt::Error(error)) => return Err(error),
        };

        // Here-document bookkeeping is done at commit time only, so that an
        // incomplete scan has no side effects.
        let mut bodies = Vec::new();
        match token.id {
            TokenId::Operator(op @ (Operator::LessLess | Operator::LessLessDash)) => {
                self.awaiting_delimiter = Some(op == Operator::LessLessDash);
            }
            TokenId::Token(_) if self.awaiting_delimiter.is_some() => {
                let remove_tabs = self.awaiting_delimiter.take().unwrap();
                let (delimiter, quoted) = token.word.unquote();
                self.pending_heredocs.push_back(PendingHereDoc {
                    delimiter,
                    quoted,
                    remove_tabs,
                });
            }
            TokenId::Newline if !self.pending_heredocs.is_empty() => {
                for pending in &self.pending_heredocs {
                    match self.scan_heredoc_body(&mut cur, pending) {
                        Ok(body) => bodies.push(body),
                        Err(Interrupt::Incomplete) => return Ok(Scan::Incomplete),
                        Err(Interrupt::Error(error)) => return Err(error),
                    }
                }
                self.pending_heredocs.clear();
            }
            _ => self.awaiting_delimiter = None,
        }

        self.commit(cur);
        self.ready.extend(bodies);
        Ok(Scan::Token(token))
    }

    /// Scans all remaining tokens up to and including the end of input.
    ///
    /// This is a convenience for callers that have a finished lexer, such
    /// as the re-lexing of alias substitutions and command substitutions.
    ///
    /// # Panics
    ///
    /// If the lexer is not finished.
    pub fn collect_tokens(&mut self) -> Result<Vec<Token>, LexError> {
        assert!(self.finished, "collect_tokens requires a finished lexer");
        let mut tokens = Vec::new();
        loop {
            match self.next_token()? {
                Scan::Token(token) => {
                    let end = token.id == TokenId::EndOfInput;
                    tokens.push(token);
                    if end {
                        return Ok(tokens);
                    }
                }
                Scan::Incomplete => unreachable!("a finished lexer never reports Incomplete"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Text;
    use assert_matches::assert_matches;

    fn tokens_of(source: &str) -> Vec<Token> {
        Lexer::from_source(source).collect_tokens().unwrap()
    }

    fn ids_of(source: &str) -> Vec<TokenId> {
        tokens_of(source).iter().map(|t| t.id).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(ids_of(""), [TokenId::EndOfInput]);
        assert_eq!(ids_of("  \t "), [TokenId::EndOfInput]);
    }

    #[test]
    fn simple_words() {
        let tokens = tokens_of("echo foo");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].id, TokenId::Token(None));
        assert_eq!(tokens[0].word.to_string(), "echo");
        assert_eq!(tokens[1].word.to_string(), "foo");
        assert_eq!(tokens[2].id, TokenId::EndOfInput);
    }

    #[test]
    fn keywords_are_annotated() {
        let tokens = tokens_of("if while foo");
        assert_eq!(tokens[0].id, TokenId::Token(Some(Keyword::If)));
        assert_eq!(tokens[1].id, TokenId::Token(Some(Keyword::While)));
        assert_eq!(tokens[2].id, TokenId::Token(None));
    }

    #[test]
    fn quoted_keyword_is_not_annotated() {
        let tokens = tokens_of("i\\f 'if'");
        assert_eq!(tokens[0].id, TokenId::Token(None));
        assert_eq!(tokens[1].id, TokenId::Token(None));
    }

    #[test]
    fn operators() {
        assert_eq!(
            ids_of("a && b || c; d & (e)"),
            [
                TokenId::Token(None),
                TokenId::Operator(Operator::AndAnd),
                TokenId::Token(None),
                TokenId::Operator(Operator::BarBar),
                TokenId::Token(None),
                TokenId::Operator(Operator::Semicolon),
                TokenId::Token(None),
                TokenId::Operator(Operator::And),
                TokenId::Operator(Operator::OpenParen),
                TokenId::Token(None),
                TokenId::Operator(Operator::CloseParen),
                TokenId::EndOfInput,
            ]
        );
    }

    #[test]
    fn longest_match_for_operators() {
        assert_eq!(
            ids_of("a;;b"),
            [
                TokenId::Token(None),
                TokenId::Operator(Operator::SemicolonSemicolon),
                TokenId::Token(None),
                TokenId::EndOfInput,
            ]
        );
        assert_eq!(
            ids_of("x<<-y\n\t y\n\t-y\ny\n"),
            [
                TokenId::Token(None),
                TokenId::Operator(Operator::LessLessDash),
                TokenId::Token(None),
                TokenId::Newline,
                TokenId::HereDocBody,
                TokenId::EndOfInput,
            ]
        );
    }

    #[test]
    fn io_number() {
        let tokens = tokens_of("2>file 10<x 2 >y z2>w");
        assert_eq!(tokens[0].id, TokenId::IoNumber);
        assert_eq!(tokens[0].word.to_string(), "2");
        assert_eq!(tokens[2].id, TokenId::Token(None));
        assert_eq!(tokens[2].word.to_string(), "file");
        assert_eq!(tokens[3].id, TokenId::IoNumber);
        assert_eq!(tokens[3].word.to_string(), "10");
        // A blank before the operator makes the digits an ordinary word.
        assert_eq!(tokens[6].id, TokenId::Token(None));
        assert_eq!(tokens[6].word.to_string(), "2");
        // A non-digit makes the token an ordinary word.
        assert_eq!(tokens[9].id, TokenId::Token(None));
        assert_eq!(tokens[9].word.to_string(), "z2");
    }

    #[test]
    fn newline_token() {
        assert_eq!(
            ids_of("a\nb\n"),
            [
                TokenId::Token(None),
                TokenId::Newline,
                TokenId::Token(None),
                TokenId::Newline,
                TokenId::EndOfInput,
            ]
        );
    }

    #[test]
    fn comments() {
        let tokens = tokens_of("echo a # comment ; | &\nb");
        assert_eq!(
            tokens.iter().map(|t| t.id).collect::<Vec<_>>(),
            [
                TokenId::Token(None),
                TokenId::Token(None),
                TokenId::Newline,
                TokenId::Token(None),
                TokenId::EndOfInput,
            ]
        );
        // A hash inside a word does not start a comment.
        let tokens = tokens_of("echo a#b");
        assert_eq!(tokens[1].word.to_string(), "a#b");
    }

    #[test]
    fn line_continuation_in_word() {
        let tokens = tokens_of("ec\\\nho x");
        assert_eq!(tokens[0].word.to_string(), "echo");
        assert_eq!(tokens[0].word.to_string_if_literal().unwrap(), "echo");
    }

    #[test]
    fn line_continuation_in_operator() {
        assert_eq!(
            ids_of("a &\\\n& b"),
            [
                TokenId::Token(None),
                TokenId::Operator(Operator::AndAnd),
                TokenId::Token(None),
                TokenId::EndOfInput,
            ]
        );
    }

    #[test]
    fn incomplete_word_at_end_of_input() {
        let mut lexer = Lexer::new();
        lexer.push_str("echo fo");
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.word.to_string(), "echo");
        // "fo" could be extended by more input.
        assert_matches!(lexer.next_token(), Ok(Scan::Incomplete));
        lexer.push_str("o bar");
        lexer.finish();
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.word.to_string(), "foo");
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.word.to_string(), "bar");
    }

    #[test]
    fn incomplete_quote() {
        let mut lexer = Lexer::new();
        lexer.push_str("echo 'partial");
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.word.to_string(), "echo");
        assert_matches!(lexer.next_token(), Ok(Scan::Incomplete));
        lexer.push_str(" quote'");
        lexer.finish();
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.word.to_string(), "'partial quote'");
    }

    #[test]
    fn unclosed_quote_is_an_error_when_finished() {
        let mut lexer = Lexer::from_source("'oops");
        let error = lexer.next_token().unwrap_err();
        assert_eq!(error.cause, LexErrorCause::UnclosedSingleQuote);
    }

    #[test]
    fn nul_byte_is_an_error() {
        let mut lexer = Lexer::from_source("echo a\0b");
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.word.to_string(), "echo");
        let error = lexer.next_token().unwrap_err();
        assert_eq!(error.cause, LexErrorCause::NulByte);
    }

    #[test]
    fn token_locations() {
        let tokens = tokens_of("a b\n c");
        assert_eq!(tokens[0].location.line.get(), 1);
        assert_eq!(tokens[0].location.column.get(), 1);
        assert_eq!(tokens[1].location.column.get(), 3);
        assert_eq!(tokens[3].location.line.get(), 2);
        assert_eq!(tokens[3].location.column.get(), 2);
    }

    #[test]
    fn here_doc_tokens() {
        let tokens = tokens_of("cat <<EOF\nhello\nworld\nEOF\necho x\n");
        assert_eq!(
            tokens.iter().map(|t| t.id).collect::<Vec<_>>(),
            [
                TokenId::Token(None),
                TokenId::Operator(Operator::LessLess),
                TokenId::Token(None),
                TokenId::Newline,
                TokenId::HereDocBody,
                TokenId::Token(None),
                TokenId::Token(None),
                TokenId::Newline,
                TokenId::EndOfInput,
            ]
        );
        assert_eq!(tokens[4].word.to_string(), "hello\nworld\n");
    }

    #[test]
    fn here_doc_with_tab_removal() {
        let tokens = tokens_of("cat <<-END\n\thello\n\tEND\n");
        let body = &tokens[4];
        assert_eq!(body.id, TokenId::HereDocBody);
        assert_eq!(body.word.to_string(), "hello\n");
    }

    #[test]
    fn here_doc_with_quoted_delimiter_is_literal() {
        let tokens = tokens_of("cat <<'EOF'\n$x `y`\nEOF\n");
        let body = &tokens[4];
        let text = Text(
            body.word
                .units
                .iter()
                .map(|unit| assert_matches!(unit, WordUnit::Unquoted(u) => u.clone()))
                .collect(),
        );
        assert_eq!(text.to_string_if_literal().unwrap(), "$x `y`\n");
    }

    #[test]
    fn here_doc_with_expansion() {
        let tokens = tokens_of("cat <<EOF\na $x b\nEOF\n");
        let body = &tokens[4];
        assert!(body.word.units.iter().any(|unit| matches!(
            unit,
            WordUnit::Unquoted(TextUnit::RawParam { .. })
        )));
    }

    #[test]
    fn multiple_here_docs_on_one_line() {
        let tokens = tokens_of("cat <<A <<B\nfirst\nA\nsecond\nB\n");
        assert_eq!(
            tokens.iter().map(|t| t.id).collect::<Vec<_>>(),
            [
                TokenId::Token(None),
                TokenId::Operator(Operator::LessLess),
                TokenId::Token(None),
                TokenId::Operator(Operator::LessLess),
                TokenId::Token(None),
                TokenId::Newline,
                TokenId::HereDocBody,
                TokenId::HereDocBody,
                TokenId::EndOfInput,
            ]
        );
        assert_eq!(tokens[6].word.to_string(), "first\n");
        assert_eq!(tokens[7].word.to_string(), "second\n");
    }

    #[test]
    fn here_doc_body_is_incomplete_until_delimited() {
        let mut lexer = Lexer::new();
        lexer.push_str("cat <<EOF\nhello\n");
        for _ in 0..3 {
            assert_matches!(lexer.next_token(), Ok(Scan::Token(_)));
        }
        // The newline cannot be delivered until the body is complete.
        assert_matches!(lexer.next_token(), Ok(Scan::Incomplete));
        lexer.push_str("EOF\n");
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.id, TokenId::Newline);
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        assert_eq!(token.id, TokenId::HereDocBody);
        assert_eq!(token.word.to_string(), "hello\n");
    }

    #[test]
    fn unterminated_here_doc_is_an_error() {
        let mut lexer = Lexer::from_source("cat <<EOF\nhello\n");
        for _ in 0..3 {
            assert_matches!(lexer.next_token(), Ok(Scan::Token(_)));
        }
        let error = lexer.next_token().unwrap_err();
        assert_matches!(
            error.cause,
            LexErrorCause::UnclosedHereDocContent { delimiter } => {
                assert_eq!(delimiter, "EOF");
            }
        );
    }
}
