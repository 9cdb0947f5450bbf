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

//! Word and text scanning
//!
//! This part of the lexer assembles word tokens. A word is scanned into a
//! sequence of units that records where each part came from: plain
//! characters, backslash escapes, single- and double-quoted segments, and
//! the `$`-initiated and backquoted expansion constructs. The raw inner
//! text of command substitutions and arithmetic expansions is retained for
//! re-parsing at expansion time.

use super::core::{is_blank, Cursor, Interrupt, LexError, LexErrorCause, Lexer, ScanResult};
use super::op::Operator;
use crate::source::Location;
use crate::syntax::{
    BracedParam, Modifier, Param, SpecialParam, Substr, Switch, SwitchCondition, SwitchType, Text,
    TextUnit, Trim, TrimLength, TrimSide, Word, WordUnit,
};

/// Context that determines where a word ends
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum WordContext {
    /// Word as an ordinary token, delimited by blanks, newlines, and
    /// operator characters
    Token,
    /// Word inside a braced parameter expansion, delimited by `}`
    BracedParamWord,
}

/// Context that determines the escape and delimiter rules of a text
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TextContext {
    /// Text between double quotes, where a backslash escapes `$`, `` ` ``,
    /// `"`, and `\`
    DoubleQuote,
    /// Here-document content, where a backslash escapes `$`, `` ` ``, and
    /// `\`
    HereDoc,
}

impl TextContext {
    fn escapes(self, c: char) -> bool {
        match self {
            TextContext::DoubleQuote => matches!(c, '$' | '`' | '"' | '\\'),
            TextContext::HereDoc => matches!(c, '$' | '`' | '\\'),
        }
    }
}

impl Lexer {
    /// Scans a word.
    ///
    /// The word ends at the first delimiter selected by the context. The
    /// result may be empty if the cursor starts at a delimiter.
    pub(crate) fn scan_word(&self, cur: &mut Cursor, context: WordContext) -> ScanResult<Word> {
        let location = cur.location();
        let mut units = Vec::new();
        loop {
            self.skip_line_continuations(cur)?;
            let Some(c) = self.peek(cur) else {
                if self.is_finished() {
                    break;
                }
                return Err(Interrupt::Incomplete);
            };
            match c {
                '\0' => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::NulByte,
                        location: cur.location(),
                    }))
                }
                '\'' => units.push(self.scan_single_quote(cur)?),
                '"' => units.push(WordUnit::DoubleQuote(self.scan_double_quote(cur)?)),
                '\\' => {
                    self.advance(cur);
                    match self.peek(cur) {
                        Some(c) => {
                            self.advance(cur);
                            units.push(WordUnit::Unquoted(TextUnit::Backslashed(c)));
                        }
                        // A backslash at the end of input stands for itself.
                        None if self.is_finished() => {
                            units.push(WordUnit::Unquoted(TextUnit::Literal('\\')));
                            break;
                        }
                        None => return Err(Interrupt::Incomplete),
                    }
                }
                '$' => units.push(WordUnit::Unquoted(self.scan_dollar(cur)?)),
                '`' => units.push(WordUnit::Unquoted(self.scan_backquote(cur)?)),
                _ => {
                    let ends = match context {
                        WordContext::Token => {
                            is_blank(c) || c == '\n' || Operator::is_operator_start(c)
                        }
                        WordContext::BracedParamWord => c == '}',
                    };
                    if ends {
                        break;
                    }
                    self.advance(cur);
                    units.push(WordUnit::Unquoted(TextUnit::Literal(c)));
                }
            }
        }
        Ok(Word { units, location })
    }

    /// Scans a single-quoted string. The cursor must be at the opening
    /// quote.
    ///
    /// No character is special between single quotes, not even a backslash
    /// or newline.
    fn scan_single_quote(&self, cur: &mut Cursor) -> ScanResult<WordUnit> {
        let opening_location = cur.location();
        self.advance(cur);
        let mut value = String::new();
        loop {
            match self.peek(cur) {
                Some('\'') => {
                    self.advance(cur);
                    return Ok(WordUnit::SingleQuote(value));
                }
                Some('\0') => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::NulByte,
                        location: cur.location(),
                    }))
                }
                Some(c) => {
                    self.advance(cur);
                    value.push(c);
                }
                None if self.is_finished() => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::UnclosedSingleQuote,
                        location: opening_location,
                    }))
                }
                None => return Err(Interrupt::Incomplete),
            }
        }
    }

    /// Scans a double-quoted text. The cursor must be at the opening quote.
    fn scan_double_quote(&self, cur: &mut Cursor) -> ScanResult<Text> {
        let opening_location = cur.location();
        self.advance(cur);
        let text = self.scan_text(cur, TextContext::DoubleQuote)?;
        match self.peek(cur) {
            Some('"') => {
                self.advance(cur);
                Ok(text)
            }
            None if self.is_finished() => Err(Interrupt::Error(LexError {
                cause: LexErrorCause::UnclosedDoubleQuote,
                location: opening_location,
            })),
            None => Err(Interrupt::Incomplete),
            Some(_) => unreachable!("scan_text stops only at the delimiter or end of input"),
        }
    }

    /// Scans a text, stopping at the delimiter selected by the context or
    /// at the end of input.
    pub(crate) fn scan_text(&self, cur: &mut Cursor, context: TextContext) -> ScanResult<Text> {
        let mut units = Vec::new();
        loop {
            match self.peek(cur) {
                None => break,
                Some('"') if context == TextContext::DoubleQuote => break,
                Some('\0') => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::NulByte,
                        location: cur.location(),
                    }))
                }
                Some('\\') => {
                    let mut ahead = *cur;
                    self.advance(&mut ahead);
                    match self.peek(&ahead) {
                        // Line continuation
                        Some('\n') => {
                            self.advance(&mut ahead);
                            *cur = ahead;
                        }
                        Some(c) if context.escapes(c) => {
                            self.advance(&mut ahead);
                            *cur = ahead;
                            units.push(TextUnit::Backslashed(c));
                        }
                        // The backslash stays literal before other
                        // characters.
                        Some(_) => {
                            *cur = ahead;
                            units.push(TextUnit::Literal('\\'));
                        }
                        None if self.is_finished() => {
                            *cur = ahead;
                            units.push(TextUnit::Literal('\\'));
                        }
                        None => return Err(Interrupt::Incomplete),
                    }
                }
                Some('$') => units.push(self.scan_dollar(cur)?),
                Some('`') => units.push(self.scan_backquote(cur)?),
                Some(c) => {
                    self.advance(cur);
                    units.push(TextUnit::Literal(c));
                }
            }
        }
        Ok(Text(units))
    }

    /// Scans an expansion construct starting with `$`. The cursor must be
    /// at the dollar.
    ///
    /// A dollar not followed by a construct scans as a literal dollar.
    fn scan_dollar(&self, cur: &mut Cursor) -> ScanResult<TextUnit> {
        let location = cur.location();
        let mut ahead = *cur;
        self.advance(&mut ahead);
        self.skip_line_continuations(&mut ahead)?;

        match self.peek(&ahead) {
            None if self.is_finished() => {
                *cur = ahead;
                Ok(TextUnit::Literal('$'))
            }
            None => Err(Interrupt::Incomplete),
            Some('{') => {
                *cur = ahead;
                self.scan_braced_param(cur, location)
            }
            Some('(') => {
                let mut probe = ahead;
                self.advance(&mut probe);
                self.skip_line_continuations(&mut probe)?;
                if self.peek(&probe) == Some('(') {
                    let mut arith_cur = ahead;
                    if let Some(unit) = self.scan_arith(&mut arith_cur, location)? {
                        *cur = arith_cur;
                        return Ok(unit);
                    }
                }
                *cur = ahead;
                self.scan_command_subst(cur, location)
            }
            Some(c) if c.is_ascii_digit() => {
                self.advance(&mut ahead);
                *cur = ahead;
                Ok(TextUnit::RawParam {
                    param: Param::from_id(c.to_string()),
                    location,
                })
            }
            Some(c) if SpecialParam::from_char(c).is_some() => {
                self.advance(&mut ahead);
                *cur = ahead;
                Ok(TextUnit::RawParam {
                    param: Param::from_id(c.to_string()),
                    location,
                })
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(c) = self.peek(&ahead) {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        self.advance(&mut ahead);
                    } else {
                        break;
                    }
                }
                if self.peek(&ahead).is_none() && !self.is_finished() {
                    // The name may continue in the next input chunk.
                    return Err(Interrupt::Incomplete);
                }
                *cur = ahead;
                Ok(TextUnit::RawParam {
                    param: Param::from_id(name),
                    location,
                })
            }
            Some(_) => {
                *cur = ahead;
                Ok(TextUnit::Literal('$'))
            }
        }
    }

    /// Scans a backquoted command substitution. The cursor must be at the
    /// opening backquote.
    ///
    /// Within backquotes, a backslash retains its literal meaning except
    /// before `$`, `` ` ``, and `\`. The stored content has this backslash
    /// processing already applied so it can be re-parsed like `$(...)`
    /// content.
    fn scan_backquote(&self, cur: &mut Cursor) -> ScanResult<TextUnit> {
        let location = cur.location();
        self.advance(cur);
        let mut content = String::new();
        loop {
            match self.peek(cur) {
                Some('`') => {
                    self.advance(cur);
                    return Ok(TextUnit::Backquote { content, location });
                }
                Some('\\') => {
                    let mut ahead = *cur;
                    self.advance(&mut ahead);
                    match self.peek(&ahead) {
                        Some(c @ ('$' | '`' | '\\')) => {
                            self.advance(&mut ahead);
                            *cur = ahead;
                            content.push(c);
                        }
                        Some(c) => {
                            self.advance(&mut ahead);
                            *cur = ahead;
                            content.push('\\');
                            content.push(c);
                        }
                        None if self.is_finished() => {
                            return Err(Interrupt::Error(LexError {
                                cause: LexErrorCause::UnclosedBackquote,
                                location,
                            }))
                        }
                        None => return Err(Interrupt::Incomplete),
                    }
                }
                Some('\0') => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::NulByte,
                        location: cur.location(),
                    }))
                }
                Some(c) => {
                    self.advance(cur);
                    content.push(c);
                }
                None if self.is_finished() => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::UnclosedBackquote,
                        location,
                    }))
                }
                None => return Err(Interrupt::Incomplete),
            }
        }
    }

    /// Scans the raw content of a `$(...)` command substitution. The cursor
    /// must be at the opening parenthesis.
    ///
    /// The content is captured as raw text for later re-parsing. The scan
    /// is nesting-aware: parentheses inside the content are tracked, with
    /// quoted segments, backslash escapes, and comments skipped over so
    /// that parentheses within them do not count.
    fn scan_command_subst(&self, cur: &mut Cursor, location: Location) -> ScanResult<TextUnit> {
        self.advance(cur);
        let mut content = String::new();
        let mut depth = 0u32;
        // Whether the next `#` would start a comment
        let mut at_word_start = true;
        loop {
            match self.peek(cur) {
                Some(')') if depth == 0 => {
                    self.advance(cur);
                    return Ok(TextUnit::CommandSubst { content, location });
                }
                Some(c @ (')' | '(')) => {
                    depth = if c == '(' { depth + 1 } else { depth - 1 };
                    self.advance(cur);
                    content.push(c);
                    at_word_start = c == '(';
                }
                Some('\'') => {
                    self.advance(cur);
                    content.push('\'');
                    loop {
                        match self.peek(cur) {
                            Some('\'') => {
                                self.advance(cur);
                                content.push('\'');
                                break;
                            }
                            Some(c) => {
                                self.advance(cur);
                                content.push(c);
                            }
                            None if self.is_finished() => {
                                return Err(Interrupt::Error(LexError {
                                    cause: LexErrorCause::UnclosedCommandSubstitution,
                                    location,
                                }))
                            }
                            None => return Err(Interrupt::Incomplete),
                        }
                    }
                    at_word_start = false;
                }
                Some('"') => {
                    self.advance(cur);
                    content.push('"');
                    loop {
                        match self.peek(cur) {
                            Some('"') => {
                                self.advance(cur);
                                content.push('"');
                                break;
                            }
                            Some('\\') => {
                                self.advance(cur);
                                content.push('\\');
                                if let Some(c) = self.advance(cur) {
                                    content.push(c);
                                } else if self.is_finished() {
                                    return Err(Interrupt::Error(LexError {
                                        cause: LexErrorCause::UnclosedCommandSubstitution,
                                        location,
                                    }));
                                } else {
                                    return Err(Interrupt::Incomplete);
                                }
                            }
                            Some(c) => {
                                self.advance(cur);
                                content.push(c);
                            }
                            None if self.is_finished() => {
                                return Err(Interrupt::Error(LexError {
                                    cause: LexErrorCause::UnclosedCommandSubstitution,
                                    location,
                                }))
                            }
                            None => return Err(Interrupt::Incomplete),
                        }
                    }
                    at_word_start = false;
                }
                Some('\\') => {
                    self.advance(cur);
                    content.push('\\');
                    match self.peek(cur) {
                        Some(c) => {
                            self.advance(cur);
                            content.push(c);
                        }
                        None if self.is_finished() => {
                            return Err(Interrupt::Error(LexError {
                                cause: LexErrorCause::UnclosedCommandSubstitution,
                                location,
                            }))
                        }
                        None => return Err(Interrupt::Incomplete),
                    }
                    at_word_start = false;
                }
                Some('#') if at_word_start => {
                    // Comments may contain unbalanced parentheses.
                    while let Some(c) = self.peek(cur) {
                        if c == '\n' {
                            break;
                        }
                        self.advance(cur);
                        content.push(c);
                    }
                }
                Some(c) => {
                    self.advance(cur);
                    content.push(c);
                    at_word_start = is_blank(c) || matches!(c, '\n' | ';' | '&' | '|');
                }
                None if self.is_finished() => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::UnclosedCommandSubstitution,
                        location,
                    }))
                }
                None => return Err(Interrupt::Incomplete),
            }
        }
    }

    /// Tries to scan an arithmetic expansion. The cursor must be at the
    /// first of the two opening parentheses.
    ///
    /// Returns `Ok(None)` if the construct turns out not to be an
    /// arithmetic expansion (a `$((` that is really a command substitution
    /// starting with a subshell), in which case the caller re-scans it as a
    /// command substitution.
    fn scan_arith(&self, cur: &mut Cursor, location: Location) -> ScanResult<Option<TextUnit>> {
        self.advance(cur);
        self.advance(cur);
        let mut content = String::new();
        let mut depth = 0u32;
        loop {
            match self.peek(cur) {
                Some('(') => {
                    depth += 1;
                    self.advance(cur);
                    content.push('(');
                }
                Some(')') if depth > 0 => {
                    depth -= 1;
                    self.advance(cur);
                    content.push(')');
                }
                Some(')') => {
                    let mut ahead = *cur;
                    self.advance(&mut ahead);
                    match self.peek(&ahead) {
                        Some(')') => {
                            self.advance(&mut ahead);
                            *cur = ahead;
                            return Ok(Some(TextUnit::Arith { content, location }));
                        }
                        Some(_) => return Ok(None),
                        None if self.is_finished() => {
                            return Err(Interrupt::Error(LexError {
                                cause: LexErrorCause::UnclosedArith,
                                location,
                            }))
                        }
                        None => return Err(Interrupt::Incomplete),
                    }
                }
                Some('\0') => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::NulByte,
                        location: cur.location(),
                    }))
                }
                Some(c) => {
                    self.advance(cur);
                    content.push(c);
                }
                None if self.is_finished() => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::UnclosedArith,
                        location,
                    }))
                }
                None => return Err(Interrupt::Incomplete),
            }
        }
    }

    /// Scans a parameter name inside braces: an identifier, a run of
    /// digits, or a single special character.
    fn scan_param_name(&self, cur: &mut Cursor, location: Location) -> ScanResult<Param> {
        match self.peek(cur) {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(c) = self.peek(cur) {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        self.advance(cur);
                    } else {
                        break;
                    }
                }
                if self.peek(cur).is_none() && !self.is_finished() {
                    return Err(Interrupt::Incomplete);
                }
                Ok(Param::from_id(name))
            }
            Some(c) if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(c) = self.peek(cur) {
                    if c.is_ascii_digit() {
                        digits.push(c);
                        self.advance(cur);
                    } else {
                        break;
                    }
                }
                if self.peek(cur).is_none() && !self.is_finished() {
                    return Err(Interrupt::Incomplete);
                }
                Ok(Param::from_id(digits))
            }
            Some(c) if SpecialParam::from_char(c).is_some() => {
                self.advance(cur);
                Ok(Param::from_id(c.to_string()))
            }
            Some('}') => Err(Interrupt::Error(LexError {
                cause: LexErrorCause::EmptyParam,
                location,
            })),
            Some(_) => Err(Interrupt::Error(LexError {
                cause: LexErrorCause::InvalidModifier,
                location,
            })),
            None if self.is_finished() => Err(Interrupt::Error(LexError {
                cause: LexErrorCause::UnclosedParam,
                location,
            })),
            None => Err(Interrupt::Incomplete),
        }
    }

    /// Scans the raw text of a substring bound: characters up to an
    /// unnested `:` or `}`.
    fn scan_substr_expr(&self, cur: &mut Cursor, location: Location) -> ScanResult<String> {
        let mut content = String::new();
        let mut depth = 0u32;
        loop {
            match self.peek(cur) {
                Some(':' | '}') if depth == 0 => return Ok(content),
                Some('(') => {
                    depth += 1;
                    self.advance(cur);
                    content.push('(');
                }
                Some(')') => {
                    depth = depth.saturating_sub(1);
                    self.advance(cur);
                    content.push(')');
                }
                Some('\0') => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::NulByte,
                        location: cur.location(),
                    }))
                }
                Some(c) => {
                    self.advance(cur);
                    content.push(c);
                }
                None if self.is_finished() => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::UnclosedParam,
                        location,
                    }))
                }
                None => return Err(Interrupt::Incomplete),
            }
        }
    }

    /// Scans a braced parameter expansion. The cursor must be at the
    /// opening brace; the location is that of the `$`.
    fn scan_braced_param(&self, cur: &mut Cursor, location: Location) -> ScanResult<TextUnit> {
        self.advance(cur);

        // `${#}` is the special parameter `#`; `${#name}` is a length
        // expansion.
        if self.peek(cur) == Some('#') {
            let mut ahead = *cur;
            self.advance(&mut ahead);
            match self.peek(&ahead) {
                Some('}') => {
                    self.advance(&mut ahead);
                    *cur = ahead;
                    return Ok(TextUnit::BracedParam(BracedParam {
                        param: Param::from_id("#"),
                        modifier: Modifier::None,
                        location,
                    }));
                }
                Some(_) => {
                    *cur = ahead;
                    let param = self.scan_param_name(cur, location)?;
                    return match self.peek(cur) {
                        Some('}') => {
                            self.advance(cur);
                            Ok(TextUnit::BracedParam(BracedParam {
                                param,
                                modifier: Modifier::Length,
                                location,
                            }))
                        }
                        Some(_) => Err(Interrupt::Error(LexError {
                            cause: LexErrorCause::InvalidModifier,
                            location,
                        })),
                        None if self.is_finished() => Err(Interrupt::Error(LexError {
                            cause: LexErrorCause::UnclosedParam,
                            location,
                        })),
                        None => Err(Interrupt::Incomplete),
                    };
                }
                None if self.is_finished() => {
                    return Err(Interrupt::Error(LexError {
                        cause: LexErrorCause::UnclosedParam,
                        location,
                    }))
                }
                None => return Err(Interrupt::Incomplete),
            }
        }

        let param = self.scan_param_name(cur, location)?;

        let modifier = match self.peek(cur) {
            Some('}') => Modifier::None,
            Some(':') => {
                let mut ahead = *cur;
                self.advance(&mut ahead);
                match self.peek(&ahead) {
                    Some(c @ ('-' | '=' | '?' | '+')) => {
                        self.advance(&mut ahead);
                        *cur = ahead;
                        let word = self.scan_word(cur, WordContext::BracedParamWord)?;
                        Modifier::Switch(Switch {
                            r#type: switch_type(c),
                            condition: SwitchCondition::UnsetOrEmpty,
                            word,
                        })
                    }
                    Some(_) => {
                        *cur = ahead;
                        let offset = self.scan_substr_expr(cur, location)?;
                        let length = if self.peek(cur) == Some(':') {
                            self.advance(cur);
                            Some(self.scan_substr_expr(cur, location)?)
                        } else {
                            None
                        };
                        Modifier::Substr(Substr { offset, length })
                    }
                    None if self.is_finished() => {
                        return Err(Interrupt::Error(LexError {
                            cause: LexErrorCause::UnclosedParam,
                            location,
                        }))
                    }
                    None => return Err(Interrupt::Incomplete),
                }
            }
            Some(c @ ('-' | '=' | '?' | '+')) => {
                self.advance(cur);
                let word = self.scan_word(cur, WordContext::BracedParamWord)?;
                Modifier::Switch(Switch {
                    r#type: switch_type(c),
                    condition: SwitchCondition::Unset,
                    word,
                })
            }
            Some(c @ ('#' | '%')) => {
                self.advance(cur);
                let side = if c == '#' {
                    TrimSide::Prefix
                } else {
                    TrimSide::Suffix
                };
                let length = if self.peek(cur) == Some(c) {
                    self.advance(cur);
                    TrimLength::Longest
                } else {
                    TrimLength::Shortest
                };
                let pattern = self.scan_word(cur, WordContext::BracedParamWord)?;
                Modifier::Trim(Trim {
                    side,
                    length,
                    pattern,
                })
            }
            Some(_) => {
                return Err(Interrupt::Error(LexError {
                    cause: LexErrorCause::InvalidModifier,
                    location,
                }))
            }
            None if self.is_finished() => {
                return Err(Interrupt::Error(LexError {
                    cause: LexErrorCause::UnclosedParam,
                    location,
                }))
            }
            None => return Err(Interrupt::Incomplete),
        };

        match self.peek(cur) {
            Some('}') => {
                self.advance(cur);
                Ok(TextUnit::BracedParam(BracedParam {
                    param,
                    modifier,
                    location,
                }))
            }
            Some(_) => Err(Interrupt::Error(LexError {
                cause: LexErrorCause::InvalidModifier,
                location,
            })),
            None if self.is_finished() => Err(Interrupt::Error(LexError {
                cause: LexErrorCause::UnclosedParam,
                location,
            })),
            None => Err(Interrupt::Incomplete),
        }
    }
}

/// Parses a complete string as expandable text.
///
/// The string is scanned with the escape rules of an unquoted
/// here-document: a backslash escapes only `$`, `` ` ``, `\`, and a
/// newline, and the `$`-initiated and backquoted expansion constructs are
/// recognized. This is how the body of an arithmetic expansion is prepared
/// for parameter and command substitution before evaluation.
pub fn parse_text(source: &str) -> Result<Text, LexError> {
    let lexer = Lexer::from_source(source);
    let mut cur = lexer.cursor();
    match lexer.scan_text(&mut cur, TextContext::HereDoc) {
        Ok(text) => Ok(text),
        Err(Interrupt::Error(error)) => Err(error),
        Err(Interrupt::Incomplete) => unreachable!("a finished lexer never reports Incomplete"),
    }
}

fn switch_type(c: char) -> SwitchType {
    match c {
        '+' => SwitchType::Alter,
        '-' => SwitchType::Default,
        '=' => SwitchType::Assign,
        '?' => SwitchType::Error,
        _ => unreachable!("not a switch character: {c:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Scan;
    use assert_matches::assert_matches;

    fn word_of(source: &str) -> Word {
        let mut lexer = Lexer::from_source(source);
        let token = assert_matches!(lexer.next_token(), Ok(Scan::Token(t)) => t);
        token.word
    }

    fn first_unit(source: &str) -> WordUnit {
        word_of(source).units.into_iter().next().unwrap()
    }

    #[test]
    fn quoting_units() {
        let word = word_of(r#"a'b c'"d e"\f"#);
        assert_eq!(
            word.units,
            [
                WordUnit::Unquoted(TextUnit::Literal('a')),
                WordUnit::SingleQuote("b c".to_string()),
                WordUnit::DoubleQuote(Text(vec![
                    TextUnit::Literal('d'),
                    TextUnit::Literal(' '),
                    TextUnit::Literal('e'),
                ])),
                WordUnit::Unquoted(TextUnit::Backslashed('f')),
            ]
        );
    }

    #[test]
    fn double_quote_escapes() {
        let word = word_of(r#""\$\`\"\\\a""#);
        assert_eq!(
            word.units,
            [WordUnit::DoubleQuote(Text(vec![
                TextUnit::Backslashed('$'),
                TextUnit::Backslashed('`'),
                TextUnit::Backslashed('"'),
                TextUnit::Backslashed('\\'),
                TextUnit::Literal('\\'),
                TextUnit::Literal('a'),
            ]))]
        );
    }

    #[test]
    fn raw_params() {
        assert_matches!(
            first_unit("$foo"),
            WordUnit::Unquoted(TextUnit::RawParam { param, .. }) => {
                assert_eq!(param.id, "foo");
            }
        );
        assert_matches!(
            first_unit("$1x"),
            WordUnit::Unquoted(TextUnit::RawParam { param, .. }) => {
                // Only one digit is taken without braces.
                assert_eq!(param.id, "1");
            }
        );
        assert_matches!(
            first_unit("$?"),
            WordUnit::Unquoted(TextUnit::RawParam { param, .. }) => {
                assert_eq!(param.id, "?");
            }
        );
    }

    #[test]
    fn lone_dollar_is_literal() {
        assert_eq!(first_unit("$ "), WordUnit::Unquoted(TextUnit::Literal('$')));
        assert_eq!(first_unit("$"), WordUnit::Unquoted(TextUnit::Literal('$')));
    }

    #[test]
    fn braced_param_plain() {
        assert_matches!(
            first_unit("${foo}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_eq!(p.param.id, "foo");
                assert_eq!(p.modifier, Modifier::None);
            }
        );
        assert_matches!(
            first_unit("${12}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_eq!(p.param.id, "12");
            }
        );
        assert_matches!(
            first_unit("${#}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_eq!(p.param.id, "#");
                assert_eq!(p.modifier, Modifier::None);
            }
        );
    }

    #[test]
    fn braced_param_length() {
        assert_matches!(
            first_unit("${#foo}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_eq!(p.param.id, "foo");
                assert_eq!(p.modifier, Modifier::Length);
            }
        );
    }

    #[test]
    fn braced_param_switches() {
        assert_matches!(
            first_unit("${foo:-bar}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Switch(switch) => {
                    assert_eq!(switch.r#type, SwitchType::Default);
                    assert_eq!(switch.condition, SwitchCondition::UnsetOrEmpty);
                    assert_eq!(switch.word.to_string(), "bar");
                });
            }
        );
        assert_matches!(
            first_unit("${foo=bar baz}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Switch(switch) => {
                    assert_eq!(switch.r#type, SwitchType::Assign);
                    assert_eq!(switch.condition, SwitchCondition::Unset);
                    // The word extends to the closing brace, blanks
                    // included.
                    assert_eq!(switch.word.to_string(), "bar baz");
                });
            }
        );
        assert_matches!(
            first_unit("${foo:+}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Switch(switch) => {
                    assert_eq!(switch.r#type, SwitchType::Alter);
                    assert!(switch.word.is_empty());
                });
            }
        );
    }

    #[test]
    fn braced_param_nested_expansion_in_word() {
        assert_matches!(
            first_unit("${foo:-${bar}}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Switch(switch) => {
                    assert_matches!(
                        &switch.word.units[0],
                        WordUnit::Unquoted(TextUnit::BracedParam(inner)) => {
                            assert_eq!(inner.param.id, "bar");
                        }
                    );
                });
            }
        );
    }

    #[test]
    fn braced_param_trims() {
        assert_matches!(
            first_unit("${foo#p*}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Trim(trim) => {
                    assert_eq!(trim.side, TrimSide::Prefix);
                    assert_eq!(trim.length, TrimLength::Shortest);
                    assert_eq!(trim.pattern.to_string(), "p*");
                });
            }
        );
        assert_matches!(
            first_unit("${foo%%*.c}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Trim(trim) => {
                    assert_eq!(trim.side, TrimSide::Suffix);
                    assert_eq!(trim.length, TrimLength::Longest);
                    assert_eq!(trim.pattern.to_string(), "*.c");
                });
            }
        );
    }

    #[test]
    fn braced_param_substr() {
        assert_matches!(
            first_unit("${foo:1+2:3}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Substr(substr) => {
                    assert_eq!(substr.offset, "1+2");
                    assert_eq!(substr.length.as_deref(), Some("3"));
                });
            }
        );
        assert_matches!(
            first_unit("${foo:5}"),
            WordUnit::Unquoted(TextUnit::BracedParam(p)) => {
                assert_matches!(p.modifier, Modifier::Substr(substr) => {
                    assert_eq!(substr.offset, "5");
                    assert_eq!(substr.length, None);
                });
            }
        );
    }

    #[test]
    fn empty_param_is_an_error() {
        let mut lexer = Lexer::from_source("${}");
        let error = lexer.next_token().unwrap_err();
        assert_eq!(error.cause, LexErrorCause::EmptyParam);
    }

    #[test]
    fn unclosed_param_is_an_error() {
        let mut lexer = Lexer::from_source("${foo");
        let error = lexer.next_token().unwrap_err();
        assert_eq!(error.cause, LexErrorCause::UnclosedParam);
    }

    #[test]
    fn command_substitution() {
        assert_matches!(
            first_unit("$(echo hi)"),
            WordUnit::Unquoted(TextUnit::CommandSubst { content, .. }) => {
                assert_eq!(content, "echo hi");
            }
        );
        // Nested substitutions and quotes are scanned over.
        assert_matches!(
            first_unit(r#"$(echo "$(date)" ')')"#),
            WordUnit::Unquoted(TextUnit::CommandSubst { content, .. }) => {
                assert_eq!(content, r#"echo "$(date)" ')'"#);
            }
        );
        assert_matches!(
            first_unit("$( (a; b) )"),
            WordUnit::Unquoted(TextUnit::CommandSubst { content, .. }) => {
                assert_eq!(content, " (a; b) ");
            }
        );
    }

    #[test]
    fn backquote_substitution() {
        assert_matches!(
            first_unit("`echo hi`"),
            WordUnit::Unquoted(TextUnit::Backquote { content, .. }) => {
                assert_eq!(content, "echo hi");
            }
        );
        // Backslash processing applies to $, backquote, and backslash.
        assert_matches!(
            first_unit(r"`a\$b \\ \x`"),
            WordUnit::Unquoted(TextUnit::Backquote { content, .. }) => {
                assert_eq!(content, r"a$b \ \x");
            }
        );
    }

    #[test]
    fn arithmetic_expansion() {
        assert_matches!(
            first_unit("$((1 + 2))"),
            WordUnit::Unquoted(TextUnit::Arith { content, .. }) => {
                assert_eq!(content, "1 + 2");
            }
        );
        // Parentheses nest inside the expression.
        assert_matches!(
            first_unit("$(( (1+2) * 3 ))"),
            WordUnit::Unquoted(TextUnit::Arith { content, .. }) => {
                assert_eq!(content, " (1+2) * 3 ");
            }
        );
    }

    #[test]
    fn dollar_paren_paren_that_is_a_command_substitution() {
        // `$((` followed by a subshell is a command substitution.
        assert_matches!(
            first_unit("$((a); (b))"),
            WordUnit::Unquoted(TextUnit::CommandSubst { content, .. }) => {
                assert_eq!(content, "(a); (b)");
            }
        );
    }

    #[test]
    fn expansions_in_double_quotes() {
        let word = word_of(r#""$x $(y)""#);
        assert_matches!(&word.units[0], WordUnit::DoubleQuote(Text(units)) => {
            assert_matches!(&units[0], TextUnit::RawParam { param, .. } => {
                assert_eq!(param.id, "x");
            });
            assert_eq!(units[1], TextUnit::Literal(' '));
            assert_matches!(&units[2], TextUnit::CommandSubst { content, .. } => {
                assert_eq!(content, "y");
            });
        });
    }
}
