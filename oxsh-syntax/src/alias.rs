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

//! Defining and substituting aliases
//!
//! This module provides data structures for defining aliases in the shell
//! execution environment, and the token-stream rewriting pass that
//! substitutes them.
//!
//! Alias substitution runs between the lexer and the parser: a word token
//! in command position whose literal value names an alias is replaced by
//! the re-lexed replacement text. The first word of the replacement is
//! subject to further substitution, with a guard set preventing a name from
//! being substituted again inside its own replacement.

use crate::lex::{Keyword, LexError, Lexer, Operator, Token, TokenId};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;

/// Name-value pair that defines an alias
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    /// Name of the alias that is matched against command words
    pub name: String,
    /// String that substitutes a word that matched the alias name
    pub replacement: String,
}

/// Wrapper of [`Alias`] for inserting into a hash set
///
/// A `HashEntry` wraps an `Alias` in `Rc` so that the definition can be
/// referred to even after it is removed from the set. The `Hash` and
/// `PartialEq` implementations compare only names.
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Alias>);

impl HashEntry {
    /// Convenience method for creating a new alias definition as a
    /// `HashEntry`
    #[must_use]
    pub fn new(name: String, replacement: String) -> HashEntry {
        HashEntry(Rc::new(Alias { name, replacement }))
    }
}

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Collection of aliases
pub type AliasSet = HashSet<HashEntry>;

/// Whether the token ends a command, so that the next word is in command
/// position.
fn ends_command(token: &Token) -> bool {
    match token.id {
        TokenId::Operator(op) => matches!(
            op,
            Operator::Semicolon
                | Operator::SemicolonSemicolon
                | Operator::SemicolonAnd
                | Operator::And
                | Operator::AndAnd
                | Operator::Bar
                | Operator::BarBar
                | Operator::OpenParen
                | Operator::CloseParen
        ),
        TokenId::Newline => true,
        // Most reserved words are followed by a command.
        TokenId::Token(Some(keyword)) => !matches!(
            keyword,
            Keyword::Case | Keyword::For | Keyword::In | Keyword::Esac
        ),
        _ => false,
    }
}

/// Substitutes one word with its alias replacement.
///
/// The replacement text is re-lexed in place. If the replacement's own
/// first word names another alias that is not in `active`, it is
/// substituted recursively.
fn substitute_one(
    alias: &Alias,
    aliases: &AliasSet,
    active: &mut HashSet<String>,
    output: &mut Vec<Token>,
) -> Result<(), LexError> {
    let mut tokens = Lexer::from_source(&alias.replacement).collect_tokens()?;
    // Drop the end-of-input token and any trailing newline tokens that the
    // replacement text would otherwise inject.
    while matches!(
        tokens.last(),
        Some(token) if matches!(token.id, TokenId::EndOfInput | TokenId::Newline)
    ) {
        tokens.pop();
    }

    let mut tokens = tokens.into_iter();
    if let Some(first) = tokens.next() {
        substitute_word(first, aliases, active, output)?;
    }
    output.extend(tokens);
    Ok(())
}

/// Substitutes a command-position word token, recursively.
fn substitute_word(
    token: Token,
    aliases: &AliasSet,
    active: &mut HashSet<String>,
    output: &mut Vec<Token>,
) -> Result<(), LexError> {
    if let TokenId::Token(_) = token.id {
        if let Some(name) = token.word.to_string_if_literal() {
            if !active.contains(&name) {
                if let Some(entry) = aliases.get(name.as_str()) {
                    let alias = Rc::clone(&entry.0);
                    active.insert(name.clone());
                    let result = substitute_one(&alias, aliases, active, output);
                    active.remove(&name);
                    return result;
                }
            }
        }
    }
    output.push(token);
    Ok(())
}

/// Performs alias substitution on a token list.
///
/// Every word token in command position whose literal value names a defined
/// alias is replaced by the re-lexed replacement text. Replacement is
/// recursive on the first word of the replacement, guarded so that no alias
/// is expanded within its own replacement.
///
/// Re-lexing a replacement can fail if the replacement text is not
/// lexically valid, in which case the error is returned.
pub fn substitute_aliases(tokens: Vec<Token>, aliases: &AliasSet) -> Result<Vec<Token>, LexError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut command_position = true;
    let mut active = HashSet::new();

    for token in tokens {
        if command_position && !aliases.is_empty() {
            let starts_command = matches!(token.id, TokenId::Token(None));
            if starts_command {
                substitute_word(token, aliases, &mut active, &mut output)?;
                // The replacement may itself end the command, as in
                // `alias a='b;'`.
                command_position = output.last().map_or(true, ends_command);
                continue;
            }
        }
        command_position = ends_command(&token);
        output.push(token);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(definitions: &[(&str, &str)]) -> AliasSet {
        definitions
            .iter()
            .map(|&(name, replacement)| HashEntry::new(name.to_string(), replacement.to_string()))
            .collect()
    }

    fn substitute(source: &str, aliases: &AliasSet) -> String {
        let tokens = Lexer::from_source(source).collect_tokens().unwrap();
        let tokens = substitute_aliases(tokens, aliases).unwrap();
        tokens
            .iter()
            .filter(|t| !matches!(t.id, TokenId::EndOfInput))
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn no_aliases() {
        let aliases = AliasSet::new();
        assert_eq!(substitute("ls -l", &aliases), "ls -l");
    }

    #[test]
    fn simple_substitution() {
        let aliases = set(&[("ll", "ls -l")]);
        assert_eq!(substitute("ll foo", &aliases), "ls -l foo");
    }

    #[test]
    fn only_command_position_words_are_substituted() {
        let aliases = set(&[("ll", "ls -l")]);
        assert_eq!(substitute("echo ll", &aliases), "echo ll");
        assert_eq!(substitute("ll; ll", &aliases), "ls -l ; ls -l");
        assert_eq!(substitute("a && ll", &aliases), "a && ls -l");
        assert_eq!(substitute("a | ll", &aliases), "a | ls -l");
    }

    #[test]
    fn quoted_words_are_not_substituted() {
        let aliases = set(&[("ll", "ls -l")]);
        assert_eq!(substitute("'ll'", &aliases), "'ll'");
        assert_eq!(substitute("l\\l", &aliases), "l\\l");
    }

    #[test]
    fn recursion_on_first_word_of_replacement() {
        let aliases = set(&[("a", "b x"), ("b", "c y")]);
        assert_eq!(substitute("a z", &aliases), "c y x z");
    }

    #[test]
    fn self_recursion_is_guarded() {
        let aliases = set(&[("ls", "ls -F")]);
        assert_eq!(substitute("ls", &aliases), "ls -F");
    }

    #[test]
    fn mutual_recursion_is_guarded() {
        let aliases = set(&[("a", "b"), ("b", "a x")]);
        assert_eq!(substitute("a", &aliases), "a x");
    }

    #[test]
    fn substitution_after_keywords() {
        let aliases = set(&[("t", "true")]);
        assert_eq!(substitute("if t", &aliases), "if true");
        assert_eq!(substitute("while t", &aliases), "while true");
    }

    #[test]
    fn keywords_themselves_are_not_substituted() {
        // A word that happens to be a reserved word is not an alias
        // candidate.
        let aliases = set(&[("if", "oops")]);
        assert_eq!(substitute("if true", &aliases), "if true");
    }
}
