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

//! Word expansion
//!
//! Expanding a word takes the POSIX steps in order:
//!
//! 1. tilde expansion,
//! 2. parameter expansion,
//! 3. command substitution,
//! 4. arithmetic expansion,
//! 5. field splitting,
//! 6. pathname expansion, and
//! 7. quote removal.
//!
//! Steps 1 through 4 (the _initial expansion_) produce strings of
//! [`AttrChar`]s: characters attributed with their [origin](Origin) and
//! quoting state. The later steps consult the attributes — field splitting
//! applies only to unquoted characters that came from an expansion, and
//! pathname expansion treats quoted characters literally — and quote
//! removal finally drops the quoting characters themselves.
//!
//! The initial expansion can produce more than one string: `"$@"` expands
//! to one string per positional parameter. Such strings are kept apart
//! through the remaining steps so that the parameters stay separate fields
//! regardless of quoting.
//!
//! In contexts that take a single field (assignment values, redirection
//! targets, `case` subjects), [`expand_word_single`] skips field splitting
//! and pathname expansion.

pub mod arith;
pub mod command_subst;
pub mod glob;
pub mod param;
pub mod split;
pub mod tilde;

use oxsh_env::option::ShellOption;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;
use oxsh_syntax::source::Location;
use oxsh_syntax::syntax::{Text, TextUnit, Word, WordUnit};
use thiserror::Error;

/// Origin of a character produced by the initial expansion
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    /// The character appeared literally in the original word.
    Literal,
    /// The character came from a tilde expansion.
    ///
    /// Such characters are not subject to field splitting and are treated
    /// literally in pathname expansion.
    HardExpansion,
    /// The character came from a parameter expansion, command
    /// substitution, or arithmetic expansion.
    ///
    /// Such characters are subject to field splitting where applicable.
    SoftExpansion,
}

/// Character with attributes describing its origin
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AttrChar {
    /// Character value
    pub value: char,
    /// Character origin
    pub origin: Origin,
    /// Whether the character is quoted by another character
    pub is_quoted: bool,
    /// Whether the character is a quotation mark that quotes other
    /// characters
    ///
    /// A character can be both quoting and quoted, like the backslash in
    /// `"\$"`.
    pub is_quoting: bool,
}

/// Cause of an expansion error
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum ErrorCause {
    /// Expansion of an unset parameter with the `Unset` option off
    #[error("{param}: parameter not set")]
    UnsetParameter {
        /// Name of the parameter
        param: String,
    },

    /// Expansion of an unset or empty parameter with the `?` modifier
    #[error("{param}: {message}")]
    EmptyExpansion {
        /// Name of the parameter
        param: String,
        /// Message given in the modifier word, or a default
        message: String,
    },

    /// Assignment modifier applied to a parameter that is not a variable
    #[error("{param}: cannot assign in this way")]
    NonassignableParameter {
        /// Name of the parameter
        param: String,
    },

    /// Assignment modifier applied to a read-only variable
    #[error("{param}: is read-only")]
    AssignReadOnly {
        /// Name of the variable
        param: String,
    },

    /// Error evaluating an arithmetic expansion
    #[error("arithmetic expansion: {message}")]
    ArithError {
        /// Description of the error
        message: String,
    },

    /// Error in the lexical analysis of re-parsed expansion content
    #[error("{0}")]
    ReparseError(#[from] oxsh_syntax::lex::LexError),

    /// System error during a command substitution
    #[error("error in command substitution: {0}")]
    CommandSubstError(oxsh_env::system::Errno),
}

/// Expansion error with its location
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    /// Cause of the error
    pub cause: ErrorCause,
    /// Position of the word being expanded
    pub location: Location,
}

/// Result type for expansion functions
pub type Result<T> = std::result::Result<T, Error>;

/// Accumulator for the initial expansion
///
/// The output is a non-empty list of attributed strings. Most expansions
/// append to the last string; `"$@"` [breaks](Output::break_string) the
/// string between parameters.
/// One string produced by the initial expansion, with field-production
/// flags
#[derive(Clone, Debug, Default)]
pub(crate) struct ExpandedString {
    /// Attributed characters of the string
    pub chars: Vec<AttrChar>,
    /// The string contained an expansion of `"$@"` with zero positional
    /// parameters, so it produces no field if nothing else contributed a
    /// character to it (even though the surrounding quotation marks did).
    pub from_empty_params: bool,
    /// The string is a quoted positional parameter of `"$@"` and produces
    /// a field even if the parameter value is empty.
    pub forced: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Output {
    strings: Vec<ExpandedString>,
}

impl Output {
    pub fn new() -> Output {
        Output {
            strings: vec![ExpandedString::default()],
        }
    }

    /// Appends a character to the current string.
    pub fn push_char(&mut self, c: AttrChar) {
        if self.strings.is_empty() {
            self.strings.push(ExpandedString::default());
        }
        self.strings.last_mut().unwrap().chars.push(c);
    }

    /// Appends characters sharing the same attributes.
    pub fn push_str(&mut self, s: &str, origin: Origin, is_quoted: bool) {
        for value in s.chars() {
            self.push_char(AttrChar {
                value,
                origin,
                is_quoted,
                is_quoting: false,
            });
        }
    }

    /// Appends a quotation mark character.
    pub fn push_quoting(&mut self, value: char) {
        self.push_char(AttrChar {
            value,
            origin: Origin::Literal,
            is_quoted: false,
            is_quoting: true,
        });
    }

    /// Starts a new string, as between two positional parameters of
    /// `"$@"`.
    ///
    /// The new string produces a field even if it ends up empty, since it
    /// holds a quoted parameter value.
    pub fn break_string(&mut self) {
        self.strings.push(ExpandedString {
            forced: true,
            ..ExpandedString::default()
        });
    }

    /// Marks the current string as containing an expansion of `"$@"` with
    /// zero positional parameters.
    pub fn mark_empty_params(&mut self) {
        if let Some(string) = self.strings.last_mut() {
            string.from_empty_params = true;
        }
    }

    pub(crate) fn into_strings(self) -> Vec<ExpandedString> {
        self.strings
    }
}

/// Performs the initial expansion of a text unit.
pub(crate) fn expand_text_unit(
    env: &mut Env,
    unit: &TextUnit,
    is_quoted: bool,
    output: &mut Output,
) -> Result<()> {
    match unit {
        TextUnit::Literal(c) => output.push_char(AttrChar {
            value: *c,
            origin: Origin::Literal,
            is_quoted,
            is_quoting: false,
        }),
        TextUnit::Backslashed(c) => {
            output.push_char(AttrChar {
                value: '\\',
                origin: Origin::Literal,
                is_quoted,
                is_quoting: true,
            });
            output.push_char(AttrChar {
                value: *c,
                origin: Origin::Literal,
                is_quoted: true,
                is_quoting: false,
            });
        }
        TextUnit::RawParam { param, location } => {
            param::expand_raw_param(env, param, location, is_quoted, output)?;
        }
        TextUnit::BracedParam(braced_param) => {
            param::expand_braced_param(env, braced_param, is_quoted, output)?;
        }
        TextUnit::CommandSubst { content, location } => {
            let value = command_subst::expand(env, content, location)?;
            output.push_str(&value, Origin::SoftExpansion, is_quoted);
        }
        TextUnit::Backquote { content, location } => {
            let value = command_subst::expand(env, content, location)?;
            output.push_str(&value, Origin::SoftExpansion, is_quoted);
        }
        TextUnit::Arith { content, location } => {
            let value = arith::expand(env, content, location)?;
            output.push_str(&value, Origin::SoftExpansion, is_quoted);
        }
    }
    Ok(())
}

/// Performs the initial expansion of a text.
pub(crate) fn expand_text(
    env: &mut Env,
    text: &Text,
    is_quoted: bool,
    output: &mut Output,
) -> Result<()> {
    for unit in &text.0 {
        expand_text_unit(env, unit, is_quoted, output)?;
    }
    Ok(())
}

/// Performs the initial expansion of a word: tilde expansion followed by
/// parameter expansion, command substitution, and arithmetic expansion.
///
/// If `assignment` is true, tilde expansion is also performed after
/// unquoted colons, as in assignment values like `PATH=~/bin:~you/bin`.
pub(crate) fn initial_expand(env: &mut Env, word: &Word, assignment: bool) -> Result<Output> {
    let mut output = Output::new();
    let mut units = &word.units[..];

    let consumed = tilde::expand_tilde(env, units, &mut output);
    units = &units[consumed..];

    while let Some(unit) = units.first() {
        match unit {
            WordUnit::Unquoted(text_unit) => {
                expand_text_unit(env, text_unit, false, &mut output)?;
                let was_colon = matches!(text_unit, TextUnit::Literal(':'));
                units = &units[1..];
                if assignment && was_colon {
                    let consumed = tilde::expand_tilde(env, units, &mut output);
                    units = &units[consumed..];
                }
            }
            WordUnit::SingleQuote(value) => {
                output.push_quoting('\'');
                for c in value.chars() {
                    output.push_char(AttrChar {
                        value: c,
                        origin: Origin::Literal,
                        is_quoted: true,
                        is_quoting: false,
                    });
                }
                output.push_quoting('\'');
                units = &units[1..];
            }
            WordUnit::DoubleQuote(text) => {
                output.push_quoting('"');
                expand_text(env, text, true, &mut output)?;
                output.push_quoting('"');
                units = &units[1..];
            }
        }
    }
    Ok(output)
}

/// Removes quotation marks from an attributed string, yielding the field
/// value.
fn quote_removal(chars: &[AttrChar]) -> String {
    chars
        .iter()
        .filter(|c| !c.is_quoting)
        .map(|c| c.value)
        .collect()
}

/// Expands a word to any number of fields.
///
/// This is the full seven-step expansion used for command words.
pub fn expand_word(env: &mut Env, word: &Word) -> Result<Vec<Field>> {
    let output = initial_expand(env, word, false)?;

    let ifs = env
        .variables
        .get_value("IFS")
        .map(str::to_owned)
        .unwrap_or_else(|| split::DEFAULT_IFS.to_string());

    let glob_enabled = env.options.get(ShellOption::Glob);
    let mut result = Vec::new();
    for string in output.into_strings() {
        // `"$@"` with no positional parameters produces no field even
        // though its quotation marks are in the string.
        if string.from_empty_params && string.chars.iter().all(|c| c.is_quoting) {
            continue;
        }

        let subfields = split::split(string.chars, &ifs);
        if subfields.is_empty() && string.forced {
            // An empty quoted positional parameter still makes a field.
            result.push(Field {
                value: String::new(),
                origin: word.location,
            });
            continue;
        }

        for field in subfields {
            // A string with no characters at all (not even quotation
            // marks) expands to no field.
            if field.is_empty() {
                continue;
            }
            if glob_enabled {
                if let Some(paths) = glob::expand(env, &field) {
                    result.extend(paths.into_iter().map(|value| Field {
                        value,
                        origin: word.location,
                    }));
                    continue;
                }
            }
            result.push(Field {
                value: quote_removal(&field),
                origin: word.location,
            });
        }
    }
    Ok(result)
}

/// Expands each of the given words to fields.
pub fn expand_words(env: &mut Env, words: &[Word]) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    for word in words {
        fields.extend(expand_word(env, word)?);
    }
    Ok(fields)
}

/// Expands a word to exactly one field.
///
/// Field splitting and pathname expansion are skipped; this is the
/// expansion of assignment values, redirection targets, and `case`
/// subjects. If `assignment` is true, tilde expansion is also performed
/// after unquoted colons.
pub fn expand_word_single(env: &mut Env, word: &Word, assignment: bool) -> Result<Field> {
    let output = initial_expand(env, word, assignment)?;
    let value = output
        .into_strings()
        .iter()
        .map(|string| quote_removal(&string.chars))
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Field {
        value,
        origin: word.location,
    })
}

/// Expands a word into a pattern string for matching.
///
/// Quoted characters are backslash-escaped in the result so that the
/// pattern matcher treats them literally. Field splitting and pathname
/// expansion do not apply.
pub fn expand_word_pattern(env: &mut Env, word: &Word) -> Result<String> {
    let output = initial_expand(env, word, false)?;
    let mut pattern = String::new();
    for string in output.into_strings() {
        for c in string.chars {
            if c.is_quoting {
                continue;
            }
            if c.is_quoted || c.origin == Origin::HardExpansion {
                if matches!(c.value, '*' | '?' | '[' | ']' | '\\' | '-' | '!' | '^') {
                    pattern.push('\\');
                }
            }
            pattern.push(c.value);
        }
    }
    Ok(pattern)
}

/// Converts an expansion error into a diagnostic and an interrupt divert.
///
/// Expansion errors interrupt the current command; in a non-interactive
/// shell the interrupt exits the shell.
pub fn report_error(env: &mut Env, error: &Error) -> oxsh_env::semantics::Result {
    env.print_error(Some(&error.location), &error.cause.to_string());
    env.exit_status = ExitStatus::ERROR;
    std::ops::ControlFlow::Break(oxsh_env::semantics::Divert::Interrupt(Some(
        ExitStatus::ERROR,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::system::test_helper::DummySystem;
    use oxsh_env::variable::Scope;
    use oxsh_syntax::source::Location;

    fn test_env() -> Env {
        Env::new(Box::new(DummySystem::default()))
    }

    fn word(source: &str) -> Word {
        use oxsh_syntax::lex::{Lexer, Scan, TokenId};
        let mut lexer = Lexer::from_source(source);
        match lexer.next_token().unwrap() {
            Scan::Token(token) => {
                assert!(matches!(token.id, TokenId::Token(_)));
                token.word
            }
            Scan::Incomplete => panic!("incomplete token in {source:?}"),
        }
    }

    fn values(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.value.as_str()).collect()
    }

    #[test]
    fn literal_word() {
        let mut env = test_env();
        let fields = expand_word(&mut env, &word("hello")).unwrap();
        assert_eq!(values(&fields), ["hello"]);
    }

    #[test]
    fn quote_removal_keeps_protected_characters() {
        let mut env = test_env();
        let fields = expand_word(&mut env, &word(r#"a'b c'"d"\e"#)).unwrap();
        assert_eq!(values(&fields), ["ab cde"]);
    }

    #[test]
    fn unset_variable_expands_to_nothing() {
        let mut env = test_env();
        let fields = expand_word(&mut env, &word("$nosuch")).unwrap();
        assert_eq!(values(&fields), [] as [&str; 0]);

        let fields = expand_word(&mut env, &word("a$nosuch")).unwrap();
        assert_eq!(values(&fields), ["a"]);
    }

    #[test]
    fn quoted_empty_word_is_kept() {
        let mut env = test_env();
        let fields = expand_word(&mut env, &word("\"\"")).unwrap();
        assert_eq!(values(&fields), [""]);
        let fields = expand_word(&mut env, &word("''")).unwrap();
        assert_eq!(values(&fields), [""]);
    }

    #[test]
    fn variable_value_is_field_split() {
        let mut env = test_env();
        env.variables
            .assign(Scope::Global, "x", Some("a b  c".to_string()))
            .unwrap();
        let fields = expand_word(&mut env, &word("$x")).unwrap();
        assert_eq!(values(&fields), ["a", "b", "c"]);

        // Quoted expansions are not split.
        let fields = expand_word(&mut env, &word("\"$x\"")).unwrap();
        assert_eq!(values(&fields), ["a b  c"]);
    }

    #[test]
    fn literal_text_is_not_field_split() {
        let mut env = test_env();
        env.variables
            .assign(Scope::Global, "IFS", Some("a".to_string()))
            .unwrap();
        let fields = expand_word(&mut env, &word("banana")).unwrap();
        assert_eq!(values(&fields), ["banana"]);
    }

    #[test]
    fn single_field_expansion_does_not_split() {
        let mut env = test_env();
        env.variables
            .assign(Scope::Global, "x", Some("a b".to_string()))
            .unwrap();
        let field = expand_word_single(&mut env, &word("$x"), false).unwrap();
        assert_eq!(field.value, "a b");
    }

    #[test]
    fn pattern_expansion_escapes_quoted_characters() {
        let mut env = test_env();
        let pattern = expand_word_pattern(&mut env, &word("a*'b*'")).unwrap();
        assert_eq!(pattern, r"a*b\*");
    }

    #[test]
    fn unset_parameter_error_with_nounset() {
        use oxsh_env::option::ShellOption::Unset;
        let mut env = test_env();
        env.options.set(Unset, false);
        let error = expand_word(&mut env, &word("$nosuch")).unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::UnsetParameter {
                param: "nosuch".to_string()
            }
        );
    }

    #[test]
    fn arith_expansion_produces_decimal() {
        let mut env = test_env();
        let fields = expand_word(&mut env, &word("$((2+3))")).unwrap();
        assert_eq!(values(&fields), ["5"]);
    }

    #[test]
    fn error_location_is_the_word_location() {
        let mut env = test_env();
        env.options.set(ShellOption::Unset, false);
        let error = expand_word(&mut env, &word("$nosuch")).unwrap_err();
        assert_eq!(error.location, Location::start());
    }
}
