// This file is part of oxsh, a POSIX command interpreter.
// Copyright (C) 2024 WATANABE Yuki

//! Parsed representation of globbing patterns

use crate::Error;

/// Bracket expression component
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BracketItem {
    /// Literal character
    Char(char),
    /// Inclusive character range (e.g. `a-z`)
    Range(char, char),
}

/// Bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether the expression starts with `!` or `^`
    ///
    /// When true, the set of matching characters is inverted.
    pub complement: bool,

    /// Content of the bracket expression
    pub items: Vec<BracketItem>,
}

/// Pattern component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// Literal character
    Char(char),
    /// Pattern that matches a single character (`?`)
    AnyChar,
    /// Pattern that matches any character sequence (`*`)
    AnyString,
    /// Bracket expression
    Bracket(Bracket),
}

/// Tries to parse a bracket expression starting at `chars[start]`, which must
/// be a `[`.
///
/// Returns the bracket and the index just past the closing `]`, or `None` if
/// the input does not form a valid bracket expression (in which case the `[`
/// is a literal).
fn parse_bracket(chars: &[char], start: usize) -> Result<Option<(Bracket, usize)>, Error> {
    debug_assert_eq!(chars[start], '[');
    let mut i = start + 1;

    let complement = matches!(chars.get(i), Some('!' | '^'));
    if complement {
        i += 1;
    }

    let mut items = Vec::new();
    // A `]` in the first position is a literal member, not the terminator.
    let mut first = true;
    loop {
        let c = match chars.get(i) {
            Some(&c) => c,
            None => return Ok(None),
        };
        if c == ']' && !first {
            return Ok(Some((
                Bracket { complement, items },
                i + 1,
            )));
        }
        first = false;

        // A range needs a character after the `-`, and the `-` must not be
        // the last member before `]`.
        if let (Some('-'), Some(&end)) = (chars.get(i + 1), chars.get(i + 2)) {
            if end != ']' {
                if end < c {
                    return Err(Error::ReversedRange);
                }
                items.push(BracketItem::Range(c, end));
                i += 3;
                continue;
            }
        }
        items.push(BracketItem::Char(c));
        i += 1;
    }
}

/// Parses a pattern string into atoms.
pub fn parse(pattern: &str, literal_escapes: bool) -> Result<Vec<Atom>, Error> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut atoms = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '?' => atoms.push(Atom::AnyChar),
            '*' => {
                // Consecutive stars are equivalent to one.
                if atoms.last() != Some(&Atom::AnyString) {
                    atoms.push(Atom::AnyString);
                }
            }
            '\\' if !literal_escapes => {
                i += 1;
                match chars.get(i) {
                    Some(&c) => atoms.push(Atom::Char(c)),
                    // A trailing backslash matches a literal backslash.
                    None => atoms.push(Atom::Char('\\')),
                }
            }
            '[' => match parse_bracket(&chars, i)? {
                Some((bracket, next)) => {
                    atoms.push(Atom::Bracket(bracket));
                    i = next;
                    continue;
                }
                None => atoms.push(Atom::Char('[')),
            },
            c => atoms.push(Atom::Char(c)),
        }
        i += 1;
    }
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_characters() {
        assert_eq!(
            parse("ab", false),
            Ok(vec![Atom::Char('a'), Atom::Char('b')])
        );
    }

    #[test]
    fn wildcards() {
        assert_eq!(
            parse("a?*", false),
            Ok(vec![Atom::Char('a'), Atom::AnyChar, Atom::AnyString])
        );
    }

    #[test]
    fn consecutive_stars_collapse() {
        assert_eq!(parse("**", false), Ok(vec![Atom::AnyString]));
        assert_eq!(
            parse("a***b", false),
            Ok(vec![Atom::Char('a'), Atom::AnyString, Atom::Char('b')])
        );
    }

    #[test]
    fn bracket_with_range_and_literals() {
        assert_eq!(
            parse("[a-cx]", false),
            Ok(vec![Atom::Bracket(Bracket {
                complement: false,
                items: vec![BracketItem::Range('a', 'c'), BracketItem::Char('x')],
            })])
        );
    }

    #[test]
    fn complement_bracket() {
        assert_eq!(
            parse("[!a]", false),
            Ok(vec![Atom::Bracket(Bracket {
                complement: true,
                items: vec![BracketItem::Char('a')],
            })])
        );
    }

    #[test]
    fn bracket_with_initial_closing_bracket() {
        assert_eq!(
            parse("[]a]", false),
            Ok(vec![Atom::Bracket(Bracket {
                complement: false,
                items: vec![BracketItem::Char(']'), BracketItem::Char('a')],
            })])
        );
    }

    #[test]
    fn trailing_hyphen_is_literal() {
        assert_eq!(
            parse("[a-]", false),
            Ok(vec![Atom::Bracket(Bracket {
                complement: false,
                items: vec![BracketItem::Char('a'), BracketItem::Char('-')],
            })])
        );
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        assert_eq!(
            parse("[ab", false),
            Ok(vec![Atom::Char('['), Atom::Char('a'), Atom::Char('b')])
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(
            parse(r"\*\\", false),
            Ok(vec![Atom::Char('*'), Atom::Char('\\')])
        );
        assert_eq!(
            parse(r"\*", true),
            Ok(vec![Atom::Char('\\'), Atom::AnyString])
        );
    }
}
