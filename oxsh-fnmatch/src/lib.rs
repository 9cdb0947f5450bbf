// This file is part of oxsh, a POSIX command interpreter.
// Copyright (C) 2024 WATANABE Yuki

//! This crate provides pattern matching based on a globbing pattern.
//!
//! This implementation supports the following syntax in patterns:
//!
//! - Any single character (`?`)
//! - Any character sequence (`*`)
//! - Bracket expression (`[...]`)
//!     - Character literals
//!     - Character ranges (e.g. `a-z`)
//!     - Complement (`[!...]` or `[^...]`)
//!
//! Locale-specific collating symbols, equivalence classes, and character
//! classes are not supported. Matching is performed directly on the pattern
//! with a backtracking scan; the position of the most recent `*` is the only
//! backtrack point, so matching runs in `O(pattern × text)` in the worst
//! case and allocates nothing.
//!
//! # Example
//!
//! ```
//! use oxsh_fnmatch::{Config, Pattern};
//! let p = Pattern::parse("fo*.rs", Config::default()).unwrap();
//! assert!(p.is_match("foobar.rs"));
//! assert!(!p.is_match("foobar.c"));
//! ```

mod ast;

pub use self::ast::{Atom, Bracket, BracketItem};
use thiserror::Error;

/// Error parsing a pattern
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A bracket expression contains a range whose bounds are in the wrong
    /// order (e.g. `[z-a]`).
    #[error("character range with reversed bounds")]
    ReversedRange,
}

/// Configuration that selects the matching behavior
///
/// The default configuration enables none of the flags.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct Config {
    /// Prevents `*`, `?`, and bracket expressions from matching a slash.
    ///
    /// When this flag is set, a slash in the text only matches a literal
    /// slash in the pattern, and a `*` cannot consume characters across a
    /// slash. This is the behavior needed for pathname expansion, where the
    /// pattern is applied one pathname component at a time.
    pub anchor_slashes: bool,

    /// Prevents wildcards from matching an initial period.
    ///
    /// When this flag is set, a period at the start of the text (or, with
    /// [`anchor_slashes`](Self::anchor_slashes), right after a slash) only
    /// matches a literal period in the pattern.
    pub literal_period: bool,

    /// Disables backslash escapes in the pattern.
    ///
    /// By default, a backslash in the pattern makes the next character
    /// literal. When this flag is set, a backslash matches itself.
    pub literal_escapes: bool,

    /// Makes the match case-insensitive.
    pub case_insensitive: bool,
}

/// Compiled globbing pattern
///
/// A `Pattern` is created by [parsing](Self::parse) a pattern string with a
/// [`Config`]. The pattern borrows nothing, so it can outlive the string it
/// was parsed from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pattern {
    atoms: Vec<Atom>,
    config: Config,
}

/// Folds a character for case-insensitive comparison.
fn fold(c: char, config: Config) -> char {
    if config.case_insensitive {
        // One-to-many lowercase mappings are rare enough to ignore here.
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c
    }
}

impl Pattern {
    /// Parses a pattern string.
    ///
    /// Parsing never fails on unmatched brackets: a `[` that does not open a
    /// valid bracket expression matches a literal `[`, as POSIX requires.
    pub fn parse(pattern: &str, config: Config) -> Result<Self, Error> {
        let atoms = ast::parse(pattern, config.literal_escapes)?;
        Ok(Pattern { atoms, config })
    }

    /// Returns true if the pattern contains no wildcard atoms.
    ///
    /// A literal pattern matches exactly one string, which is returned by
    /// [`as_literal`](Self::as_literal).
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.atoms.iter().all(|atom| matches!(atom, Atom::Char(_)))
    }

    /// Returns the string matched by the pattern if it is literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<String> {
        self.atoms
            .iter()
            .map(|atom| match atom {
                Atom::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Matches the pattern against the whole of `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let mut p = 0;
        let mut t = 0;
        // Position to resume from when the match fails: the atom index just
        // after the most recent `*` and the text index of the character the
        // `*` will consume next.
        let mut star_anchor: Option<(usize, usize)> = None;

        loop {
            match self.atoms.get(p) {
                Some(Atom::AnyString) => {
                    star_anchor = Some((p + 1, t));
                    p += 1;
                    continue;
                }
                Some(atom) => {
                    if let Some(&c) = text.get(t) {
                        if self.atom_matches(atom, c, self.is_leading(&text, t)) {
                            p += 1;
                            t += 1;
                            continue;
                        }
                    }
                }
                None => {
                    if t == text.len() {
                        return true;
                    }
                }
            }

            // Backtrack to the last `*`, making it consume one more character.
            match star_anchor {
                Some((after_star, consumed))
                    if consumed < text.len() && self.star_consumes(&text, consumed) =>
                {
                    star_anchor = Some((after_star, consumed + 1));
                    p = after_star;
                    t = consumed + 1;
                }
                _ => return false,
            }
        }
    }

    /// Whether the text position is one where a period must be literal.
    fn is_leading(&self, text: &[char], t: usize) -> bool {
        t == 0 || (self.config.anchor_slashes && text[t - 1] == '/')
    }

    /// Whether a `*` may consume the character at `text[t]`.
    fn star_consumes(&self, text: &[char], t: usize) -> bool {
        if self.config.anchor_slashes && text[t] == '/' {
            return false;
        }
        if self.config.literal_period && text[t] == '.' && self.is_leading(text, t) {
            return false;
        }
        true
    }

    /// Matches a single non-`*` atom against a single character.
    fn atom_matches(&self, atom: &Atom, c: char, leading: bool) -> bool {
        let config = self.config;
        let wildcard_excluded = (config.anchor_slashes && c == '/')
            || (config.literal_period && c == '.' && leading);
        match atom {
            Atom::Char(pc) => fold(*pc, config) == fold(c, config),
            Atom::AnyChar => !wildcard_excluded,
            Atom::AnyString => unreachable!("handled by the caller"),
            Atom::Bracket(bracket) => !wildcard_excluded && bracket_matches(bracket, c, config),
        }
    }
}

/// Matches a bracket expression against a single character.
fn bracket_matches(bracket: &Bracket, c: char, config: Config) -> bool {
    let c = fold(c, config);
    let found = bracket.items.iter().any(|item| match item {
        BracketItem::Char(pc) => fold(*pc, config) == c,
        BracketItem::Range(start, end) => (fold(*start, config)..=fold(*end, config)).contains(&c),
    });
    found != bracket.complement
}

/// Convenience function that parses and matches in one step.
///
/// Returns false if the pattern does not parse.
#[must_use]
pub fn fnmatch(pattern: &str, text: &str, config: Config) -> bool {
    match Pattern::parse(pattern, config) {
        Ok(pattern) => pattern.is_match(text),
        Err(_) => false,
    }
}
