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

//! Syntax parser for simple commands

use super::core::Parser;
use super::error::Result;
use crate::lex::TokenId;
use crate::syntax::{Assign, Command, SimpleCommand, TextUnit, Word, WordUnit};

/// Splits an assignment word into its name and value.
///
/// A word is an assignment if it starts with a non-empty literal POSIX
/// identifier followed by an unquoted `=`. Returns the word intact
/// otherwise.
fn to_assignment(word: Word) -> std::result::Result<Assign, Word> {
    let mut name = String::new();
    for (index, unit) in word.units.iter().enumerate() {
        match unit {
            WordUnit::Unquoted(TextUnit::Literal('=')) => {
                if name.is_empty() || !is_identifier(&name) {
                    return Err(word);
                }
                let value = Word {
                    units: word.units[index + 1..].to_vec(),
                    location: word.location,
                };
                return Ok(Assign {
                    name,
                    value,
                    location: word.location,
                });
            }
            WordUnit::Unquoted(TextUnit::Literal(c)) => name.push(*c),
            _ => return Err(word),
        }
    }
    Err(word)
}

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
    /// Parses a simple command.
    ///
    /// Words before the first non-assignment word that have the form
    /// `name=value` become assignments; everything after the first
    /// ordinary word is an ordinary word, and redirections may appear
    /// anywhere.
    pub(super) fn simple_command(&mut self) -> Result<Command> {
        let mut assigns = Vec::new();
        let mut words: Vec<Word> = Vec::new();
        let mut redirs = Vec::new();

        loop {
            if let Some(redir) = self.maybe_redirection()? {
                redirs.push(redir);
                continue;
            }
            match self.peek().id {
                TokenId::Token(_) => {
                    let word = self.take().word;
                    if words.is_empty() {
                        match to_assignment(word) {
                            Ok(assign) => assigns.push(assign),
                            Err(word) => words.push(word),
                        }
                    } else {
                        words.push(word);
                    }
                }
                _ => break,
            }
        }

        if assigns.is_empty() && words.is_empty() && redirs.is_empty() {
            return Err(self.unexpected("command"));
        }
        Ok(Command::Simple(SimpleCommand {
            assigns,
            words,
            redirs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> Result<Command> {
        let tokens = Lexer::from_source(source).collect_tokens().unwrap();
        Parser::new(tokens).simple_command()
    }

    fn parse_simple(source: &str) -> SimpleCommand {
        assert_matches!(parse(source), Ok(Command::Simple(c)) => c)
    }

    #[test]
    fn words_only() {
        let command = parse_simple("echo a b");
        assert!(command.assigns.is_empty());
        assert_eq!(command.words.len(), 3);
        assert!(command.redirs.is_empty());
    }

    #[test]
    fn assignment_prefix() {
        let command = parse_simple("x=1 y=b\\ c echo ok");
        assert_eq!(command.assigns.len(), 2);
        assert_eq!(command.assigns[0].name, "x");
        assert_eq!(command.assigns[0].value.to_string(), "1");
        assert_eq!(command.assigns[1].name, "y");
        assert_eq!(command.words.len(), 2);
    }

    #[test]
    fn assignments_only() {
        let command = parse_simple("x=1 y=");
        assert_eq!(command.assigns.len(), 2);
        assert_eq!(command.assigns[1].value.to_string(), "");
        assert!(command.words.is_empty());
    }

    #[test]
    fn assignment_after_command_name_is_a_word() {
        let command = parse_simple("echo x=1");
        assert!(command.assigns.is_empty());
        assert_eq!(command.words.len(), 2);
        assert_eq!(command.words[1].to_string(), "x=1");
    }

    #[test]
    fn non_identifier_is_not_an_assignment() {
        let command = parse_simple("1x=1");
        assert!(command.assigns.is_empty());
        assert_eq!(command.words[0].to_string(), "1x=1");

        // A quoted character defeats assignment recognition.
        let command = parse_simple("x\\=1");
        assert!(command.assigns.is_empty());

        let command = parse_simple("=1");
        assert!(command.assigns.is_empty());
    }

    #[test]
    fn assignment_value_may_contain_expansions() {
        let command = parse_simple("x=$HOME/bin");
        assert_eq!(command.assigns.len(), 1);
        assert_matches!(
            &command.assigns[0].value.units[0],
            WordUnit::Unquoted(TextUnit::RawParam { param, .. }) => {
                assert_eq!(param.id, "HOME");
            }
        );
    }

    #[test]
    fn redirections_interleaved() {
        let command = parse_simple("<in x=1 echo >out 2>&1 ok");
        assert_eq!(command.assigns.len(), 1);
        assert_eq!(command.words.len(), 2);
        assert_eq!(command.redirs.len(), 3);
    }

    #[test]
    fn keywords_are_ordinary_words_in_argument_position() {
        let command = parse_simple("echo if fi done");
        assert_eq!(command.words.len(), 4);
    }

    #[test]
    fn empty_input_is_an_error() {
        parse("").unwrap_err();
        parse(";").unwrap_err();
    }
}
