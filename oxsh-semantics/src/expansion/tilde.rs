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

//! Tilde expansion

use super::{AttrChar, Origin, Output};
use oxsh_env::Env;
use oxsh_syntax::syntax::{TextUnit, WordUnit};

/// Performs tilde expansion at the beginning of the given units.
///
/// If the units start with an unquoted literal `~`, the characters up to
/// the first `/` (or the end of the word) name a user whose home directory
/// replaces the region; an empty name means the value of `HOME`. Any
/// quoted or expanded character in the region defeats the expansion, as
/// does an unknown user name.
///
/// Returns the number of units consumed; the caller expands the remaining
/// units normally. The replacement characters are pushed as
/// [hard expansion](Origin::HardExpansion) characters, exempt from field
/// splitting and pathname expansion.
pub fn expand_tilde(env: &mut Env, units: &[WordUnit], output: &mut Output) -> usize {
    if units.first() != Some(&WordUnit::Unquoted(TextUnit::Literal('~'))) {
        return 0;
    }

    let mut name = String::new();
    let mut consumed = 1;
    for unit in &units[1..] {
        match unit {
            WordUnit::Unquoted(TextUnit::Literal('/')) => break,
            WordUnit::Unquoted(TextUnit::Literal(c)) => {
                name.push(*c);
                consumed += 1;
            }
            // A quoted character or expansion in the name region defeats
            // tilde expansion.
            _ => return 0,
        }
    }

    let directory = if name.is_empty() {
        env.variables.get_value("HOME").map(str::to_owned)
    } else {
        env.system.home_directory(&name)
    };

    match directory {
        Some(directory) => {
            for value in directory.chars() {
                output.push_char(AttrChar {
                    value,
                    origin: Origin::HardExpansion,
                    is_quoted: false,
                    is_quoting: false,
                });
            }
            consumed
        }
        // On failure the region is left literal.
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::system::test_helper::DummySystem;
    use oxsh_env::variable::Scope;
    use oxsh_syntax::syntax::Word;

    fn units(source: &str) -> Vec<WordUnit> {
        Word::from_literal(source).units
    }

    fn expand(env: &mut Env, source: &str) -> (usize, String) {
        let units = units(source);
        let mut output = Output::new();
        let consumed = expand_tilde(env, &units, &mut output);
        let text: String = output
            .into_strings()
            .iter()
            .flat_map(|string| &string.chars)
            .map(|c| c.value)
            .collect();
        (consumed, text)
    }

    #[test]
    fn bare_tilde_expands_to_home() {
        let mut env = Env::new(Box::new(DummySystem::default()));
        env.variables
            .assign(Scope::Global, "HOME", Some("/home/me".to_string()))
            .unwrap();
        let (consumed, text) = expand(&mut env, "~");
        assert_eq!(consumed, 1);
        assert_eq!(text, "/home/me");
    }

    #[test]
    fn tilde_before_slash() {
        let mut env = Env::new(Box::new(DummySystem::default()));
        env.variables
            .assign(Scope::Global, "HOME", Some("/home/me".to_string()))
            .unwrap();
        let (consumed, text) = expand(&mut env, "~/bin");
        assert_eq!(consumed, 1);
        assert_eq!(text, "/home/me");
    }

    #[test]
    fn tilde_with_unknown_user_is_literal() {
        let mut env = Env::new(Box::new(DummySystem::default()));
        let (consumed, text) = expand(&mut env, "~nobody/x");
        assert_eq!(consumed, 0);
        assert_eq!(text, "");
    }

    #[test]
    fn tilde_without_home_is_literal() {
        let mut env = Env::new(Box::new(DummySystem::default()));
        let (consumed, _) = expand(&mut env, "~");
        assert_eq!(consumed, 0);
    }

    #[test]
    fn non_tilde_word() {
        let mut env = Env::new(Box::new(DummySystem::default()));
        let (consumed, _) = expand(&mut env, "x~");
        assert_eq!(consumed, 0);
    }
}
