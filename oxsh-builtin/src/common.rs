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

//! Utilities shared by the built-in implementations

use oxsh_env::builtin::Result;
use oxsh_env::frame::FrameKind;
use oxsh_env::io::{print_to_fd, Fd};
use oxsh_env::semantics::{Divert, ExitStatus, Field};
use oxsh_env::Env;

/// Writes text to the standard output.
pub fn output(env: &mut Env, text: &str) {
    print_to_fd(env, Fd::STDOUT, text.as_bytes());
}

/// Whether the built-in currently executing acts as a special built-in.
fn acting_as_special(env: &Env) -> bool {
    env.stack.iter().find_map(|frame| match frame.kind {
        FrameKind::Builtin { is_special } => Some(is_special),
        _ => None,
    }) == Some(true)
}

/// Reports a built-in usage or operand error.
///
/// The message is printed to the standard error. The exit status is 2;
/// for a special built-in the error also interrupts the shell, which
/// exits if non-interactive.
pub fn report_error(env: &mut Env, name: &str, message: &str) -> Result {
    let message = format!("{name}: {message}");
    env.print_error(None, &message);
    if acting_as_special(env) && !env.is_interactive() {
        Result::with_divert(ExitStatus::ERROR, Divert::Interrupt(Some(ExitStatus::ERROR)))
    } else {
        Result::new(ExitStatus::ERROR)
    }
}

/// Reports a runtime failure of a built-in with exit status 1.
pub fn report_failure(env: &mut Env, name: &str, message: &str) -> Result {
    let message = format!("{name}: {message}");
    env.print_error(None, &message);
    Result::new(ExitStatus::FAILURE)
}

/// Parses an operand that must be a positive decimal integer, as for
/// `break`, `continue`, and `shift`.
pub fn parse_positive(field: &Field) -> Option<usize> {
    match field.value.parse() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

/// Quotes a value for re-inputtable output, as in the listings of `set`,
/// `export`, `alias`, and `trap`.
///
/// The value is enclosed in single quotes, with embedded single quotes
/// rendered as `'\''`.
pub fn quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'/' | b'='))
    {
        return value.to_string();
    }
    let mut result = String::with_capacity(value.len() + 2);
    result.push('\'');
    for c in value.chars() {
        if c == '\'' {
            result.push_str("'\\''");
        } else {
            result.push(c);
        }
    }
    result.push('\'');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_plain_and_special_values() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a/b.c"), "a/b.c");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("it's"), "'it'\\''s'");
        assert_eq!(quote("$x"), "'$x'");
    }

    #[test]
    fn positive_operand_parsing() {
        assert_eq!(parse_positive(&Field::dummy("3")), Some(3));
        assert_eq!(parse_positive(&Field::dummy("0")), None);
        assert_eq!(parse_positive(&Field::dummy("-1")), None);
        assert_eq!(parse_positive(&Field::dummy("x")), None);
    }
}
