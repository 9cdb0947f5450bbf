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

//! Field splitting
//!
//! Field splitting breaks the result of the initial expansion into fields
//! at `IFS` characters. Only unquoted characters that came from an
//! expansion are subject to splitting; literal and quoted text never
//! splits.
//!
//! Runs of IFS whitespace act as a single separator and do not produce
//! empty fields at the beginning or end of the input. A non-whitespace
//! IFS character, together with any adjacent IFS whitespace, delimits
//! exactly one field and can produce empty fields, except that a trailing
//! delimiter does not produce a final empty field.

use super::{AttrChar, Origin};

/// The field splitting behavior when `IFS` is unset
pub const DEFAULT_IFS: &str = " \t\n";

/// Whether the character is subject to field splitting.
fn is_splittable(c: &AttrChar) -> bool {
    c.origin == Origin::SoftExpansion && !c.is_quoted && !c.is_quoting
}

/// Whether the IFS character counts as IFS whitespace.
fn is_ifs_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// Splits an attributed string into fields at IFS characters.
pub fn split(chars: Vec<AttrChar>, ifs: &str) -> Vec<Vec<AttrChar>> {
    if ifs.is_empty() {
        return vec![chars];
    }

    let mut fields = Vec::new();
    let mut current = Vec::new();
    let mut i = 0;

    let is_separator = |c: &AttrChar| is_splittable(c) && ifs.contains(c.value);
    let is_ws_separator = |c: &AttrChar| is_separator(c) && is_ifs_whitespace(c.value);

    // Leading IFS whitespace is ignored.
    while chars.get(i).is_some_and(is_ws_separator) {
        i += 1;
    }

    while let Some(c) = chars.get(i) {
        if is_separator(c) && !is_ws_separator(c) {
            // A non-whitespace separator delimits the (possibly empty)
            // current field and absorbs adjacent whitespace.
            fields.push(std::mem::take(&mut current));
            i += 1;
            while chars.get(i).is_some_and(is_ws_separator) {
                i += 1;
            }
        } else if is_ws_separator(c) {
            // A whitespace run is one delimiter; an adjacent
            // non-whitespace separator merges with it.
            while chars.get(i).is_some_and(is_ws_separator) {
                i += 1;
            }
            match chars.get(i) {
                Some(next) if is_separator(next) => {}
                Some(_) => fields.push(std::mem::take(&mut current)),
                None => break,
            }
        } else {
            current.push(*c);
            i += 1;
        }
    }

    // A trailing delimiter does not produce a final empty field.
    if !current.is_empty() {
        fields.push(current);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soft(s: &str) -> Vec<AttrChar> {
        s.chars()
            .map(|value| AttrChar {
                value,
                origin: Origin::SoftExpansion,
                is_quoted: false,
                is_quoting: false,
            })
            .collect()
    }

    fn literal(s: &str) -> Vec<AttrChar> {
        s.chars()
            .map(|value| AttrChar {
                value,
                origin: Origin::Literal,
                is_quoted: false,
                is_quoting: false,
            })
            .collect()
    }

    fn values(fields: Vec<Vec<AttrChar>>) -> Vec<String> {
        fields
            .iter()
            .map(|field| field.iter().map(|c| c.value).collect())
            .collect()
    }

    #[test]
    fn whitespace_splitting() {
        assert_eq!(values(split(soft("a b  c"), " \t\n")), ["a", "b", "c"]);
        assert_eq!(values(split(soft("  a  "), " \t\n")), ["a"]);
        assert_eq!(values(split(soft("   "), " \t\n")), [] as [&str; 0]);
    }

    #[test]
    fn non_whitespace_separators_produce_empty_fields() {
        assert_eq!(values(split(soft("a::b"), ":")), ["a", "", "b"]);
        assert_eq!(values(split(soft(":a"), ":")), ["", "a"]);
        assert_eq!(values(split(soft("::"), ":")), ["", ""]);
    }

    #[test]
    fn trailing_separator_makes_no_empty_field() {
        assert_eq!(values(split(soft("a:"), ":")), ["a"]);
        assert_eq!(values(split(soft("a::"), ":")), ["a", ""]);
    }

    #[test]
    fn whitespace_adjacent_to_separator_merges() {
        assert_eq!(values(split(soft("a : b"), ": ")), ["a", "b"]);
        assert_eq!(values(split(soft("a :: b"), ": ")), ["a", "", "b"]);
        assert_eq!(values(split(soft(" : a"), ": ")), ["", "a"]);
    }

    #[test]
    fn literal_text_does_not_split() {
        assert_eq!(values(split(literal("a b"), " ")), ["a b"]);
    }

    #[test]
    fn quoted_characters_do_not_split() {
        let mut chars = soft("a b");
        chars[1].is_quoted = true;
        assert_eq!(values(split(chars, " ")), ["a b"]);
    }

    #[test]
    fn empty_ifs_disables_splitting() {
        assert_eq!(values(split(soft("a b"), "")), ["a b"]);
    }

    #[test]
    fn mixed_literal_and_soft() {
        let mut chars = literal("a=");
        chars.extend(soft("x y"));
        assert_eq!(values(split(chars, " ")), ["a=x", "y"]);
    }
}
