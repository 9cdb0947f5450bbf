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

//! Test built-in
//!
//! The **`test`** (and **`[`**) built-in evaluates a conditional
//! expression.
//!
//! # Semantics
//!
//! Supported primaries: the string tests `-n`, `-z`, `=`, and
//! `!=`; the algebraic comparisons `-eq`, `-ne`, `-gt`, `-ge`,
//! `-lt`, and `-le`; the file tests `-e`, `-f`, `-d`, `-r`,
//! `-w`, `-x`, and `-s`; and `!` negation. A single operand tests
//! for a non-empty string. The `[` spelling requires a closing `]`
//! operand.
//!
//! # Exit status
//!
//! Zero if the expression is true, 1 if it is false, 2 on a usage error.
//!
//! File tests consult the file system through the environment's
//! [`System`](oxsh_env::system::System) interface.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::system::{AccessFlags, FileType};
use oxsh_env::Env;
use std::ffi::CString;

fn integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn file_test(env: &Env, operator: &str, operand: &str) -> Option<bool> {
    let Ok(path) = CString::new(operand) else {
        return Some(false);
    };
    let stat = env.system.stat(&path);
    Some(match operator {
        "-e" => stat.is_ok(),
        "-f" => stat.map(|s| s.r#type == FileType::Regular).unwrap_or(false),
        "-d" => stat
            .map(|s| s.r#type == FileType::Directory)
            .unwrap_or(false),
        "-s" => stat.map(|s| s.size > 0).unwrap_or(false),
        "-r" => env.system.access(&path, AccessFlags::R_OK),
        "-w" => env.system.access(&path, AccessFlags::W_OK),
        "-x" => env.system.access(&path, AccessFlags::X_OK),
        _ => return None,
    })
}

/// Evaluates the operand list, or reports why it cannot be evaluated.
fn evaluate(env: &Env, operands: &[&str]) -> std::result::Result<bool, String> {
    match operands {
        [] => Ok(false),
        ["!", rest @ ..] if !rest.is_empty() => evaluate(env, rest).map(|value| !value),
        [value] => Ok(!value.is_empty()),
        [operator, operand] => match *operator {
            "-n" => Ok(!operand.is_empty()),
            "-z" => Ok(operand.is_empty()),
            _ => match file_test(env, operator, operand) {
                Some(value) => Ok(value),
                None => Err(format!("unknown operator `{operator}`")),
            },
        },
        [left, operator, right] => match *operator {
            "=" => Ok(left == right),
            "!=" => Ok(left != right),
            "-eq" | "-ne" | "-gt" | "-ge" | "-lt" | "-le" => {
                let (Some(left), Some(right)) = (integer(left), integer(right)) else {
                    return Err(String::from("integer expression expected"));
                };
                Ok(match *operator {
                    "-eq" => left == right,
                    "-ne" => left != right,
                    "-gt" => left > right,
                    "-ge" => left >= right,
                    "-lt" => left < right,
                    "-le" => left <= right,
                    _ => unreachable!(),
                })
            }
            _ => Err(format!("unknown operator `{operator}`")),
        },
        _ => Err(String::from("too many operands")),
    }
}

fn run(env: &mut Env, name: &str, operands: &[&str]) -> Result {
    match evaluate(env, operands) {
        Ok(true) => Result::new(ExitStatus::SUCCESS),
        Ok(false) => Result::new(ExitStatus::FAILURE),
        Err(message) => report_error(env, name, &message),
    }
}

/// Entry point for executing the `test` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands: Vec<&str> = args.iter().map(|field| field.value.as_str()).collect();
    run(env, "test", &operands)
}

/// Entry point for executing the `[` built-in
pub fn bracket_main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut operands: Vec<&str> = args.iter().map(|field| field.value.as_str()).collect();
    if operands.pop() != Some("]") {
        return report_error(env, "[", "missing closing `]`");
    }
    run(env, "[", &operands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::system::test_helper::DummySystem;

    fn test_env() -> Env {
        Env::new(Box::new(DummySystem::default()))
    }

    #[test]
    fn string_tests() {
        let env = test_env();
        assert_eq!(evaluate(&env, &[]), Ok(false));
        assert_eq!(evaluate(&env, &["x"]), Ok(true));
        assert_eq!(evaluate(&env, &[""]), Ok(false));
        assert_eq!(evaluate(&env, &["-n", "x"]), Ok(true));
        assert_eq!(evaluate(&env, &["-n", ""]), Ok(false));
        assert_eq!(evaluate(&env, &["-z", ""]), Ok(true));
        assert_eq!(evaluate(&env, &["a", "=", "a"]), Ok(true));
        assert_eq!(evaluate(&env, &["a", "=", "b"]), Ok(false));
        assert_eq!(evaluate(&env, &["a", "!=", "b"]), Ok(true));
    }

    #[test]
    fn negation() {
        let env = test_env();
        assert_eq!(evaluate(&env, &["!", ""]), Ok(true));
        assert_eq!(evaluate(&env, &["!", "a", "=", "a"]), Ok(false));
    }

    #[test]
    fn integer_comparisons() {
        let env = test_env();
        assert_eq!(evaluate(&env, &["1", "-eq", "1"]), Ok(true));
        assert_eq!(evaluate(&env, &["1", "-lt", "2"]), Ok(true));
        assert_eq!(evaluate(&env, &["2", "-le", "1"]), Ok(false));
        assert_eq!(evaluate(&env, &["-1", "-gt", "-2"]), Ok(true));
        assert!(evaluate(&env, &["x", "-eq", "1"]).is_err());
    }

    #[test]
    fn file_tests() {
        let mut system = DummySystem::default();
        system.add_file("/dir/file");
        let env = Env::new(Box::new(system));

        assert_eq!(evaluate(&env, &["-e", "/dir/file"]), Ok(true));
        assert_eq!(evaluate(&env, &["-f", "/dir/file"]), Ok(true));
        assert_eq!(evaluate(&env, &["-d", "/dir/file"]), Ok(false));
        assert_eq!(evaluate(&env, &["-d", "/dir"]), Ok(true));
        assert_eq!(evaluate(&env, &["-s", "/dir/file"]), Ok(true));
        assert_eq!(evaluate(&env, &["-r", "/dir/file"]), Ok(true));
        assert_eq!(evaluate(&env, &["-x", "/dir/file"]), Ok(false));
        assert_eq!(evaluate(&env, &["-x", "/dir"]), Ok(true));
        assert_eq!(evaluate(&env, &["-e", "/nosuch"]), Ok(false));
    }

    #[test]
    fn usage_errors() {
        let env = test_env();
        assert!(evaluate(&env, &["a", "b", "c", "d"]).is_err());
        assert!(evaluate(&env, &["a", "%%", "b"]).is_err());
    }
}
