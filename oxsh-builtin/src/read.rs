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

//! Read built-in
//!
//! The **`read`** built-in reads a line from the standard input into
//! variables.
//!
//! # Syntax
//!
//! ```sh
//! read [-r] name...
//! ```
//!
//! # Semantics
//!
//! One line is read. Unless `-r` is given, a backslash escapes the
//! following character, and a backslash-newline continues the line. The
//! line is split into fields at `IFS` characters; each field is
//! assigned to the corresponding *name*, with the last name receiving
//! the remainder of the line.
//!
//! # Exit status
//!
//! Zero on success; 1 at end of input; 2 on a usage or assignment error.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::io::Fd;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::variable::Scope;
use oxsh_env::Env;

/// Reads one logical line, processing backslashes unless `raw`.
///
/// Returns `None` if the input is at end of file before any byte is
/// read.
fn read_line(env: &mut Env, raw: bool) -> Option<String> {
    let mut line = String::new();
    let mut any = false;
    let mut escaped = false;
    loop {
        let mut buffer = [0; 1];
        let byte = match env.system.read(Fd::STDIN, &mut buffer) {
            Ok(0) => break,
            Ok(_) => buffer[0],
            Err(oxsh_env::system::Errno::EINTR) => continue,
            Err(_) => break,
        };
        any = true;
        let c = byte as char;
        if escaped {
            escaped = false;
            if c != '\n' {
                line.push(c);
            }
            continue;
        }
        match c {
            '\\' if !raw => escaped = true,
            '\n' => break,
            _ => line.push(c),
        }
    }
    if any || !line.is_empty() {
        Some(line)
    } else {
        None
    }
}

/// Whether the IFS character counts as IFS whitespace.
fn is_ifs_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// Splits the line into at most `count` fields at IFS characters, with
/// the last field taking the remainder.
fn split(line: &str, ifs: &str, count: usize) -> Vec<String> {
    let mut fields = Vec::new();
    let mut rest = line.trim_start_matches(|c| ifs.contains(c) && is_ifs_whitespace(c));
    while fields.len() + 1 < count {
        match rest.find(|c| ifs.contains(c)) {
            Some(index) => {
                fields.push(rest[..index].to_string());
                rest = &rest[index + 1..];
                rest = rest.trim_start_matches(|c: char| {
                    ifs.contains(c) && is_ifs_whitespace(c)
                });
            }
            None => break,
        }
    }
    // The last variable receives the remainder with trailing IFS
    // whitespace removed.
    let rest = rest.trim_end_matches(|c| ifs.contains(c) && is_ifs_whitespace(c));
    fields.push(rest.to_string());
    fields
}

/// Entry point for executing the `read` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut raw = false;
    let mut names = &args[..];
    if args.first().map(|f| f.value.as_str()) == Some("-r") {
        raw = true;
        names = &args[1..];
    }
    if names.is_empty() {
        return report_error(env, "read", "missing variable operand");
    }

    let Some(line) = read_line(env, raw) else {
        return Result::new(ExitStatus::FAILURE);
    };

    let ifs = env
        .variables
        .get_value("IFS")
        .unwrap_or(" \t\n")
        .to_string();
    let mut values = split(&line, &ifs, names.len());
    values.resize(names.len(), String::new());

    for (name, value) in names.iter().zip(values) {
        if let Err(error) = env
            .variables
            .assign(Scope::Global, &name.value, Some(value))
        {
            let message = error.to_string();
            return report_error(env, "read", &message);
        }
    }
    Result::new(ExitStatus::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitting_into_fields() {
        assert_eq!(split("a b c", " ", 2), ["a", "b c"]);
        assert_eq!(split("a b c", " ", 3), ["a", "b", "c"]);
        assert_eq!(split("  a  b  ", " ", 3), ["a", "b"]);
        assert_eq!(split("a:b:c", ":", 2), ["a", "b:c"]);
        assert_eq!(split("whole line", " ", 1), ["whole line"]);
    }
}
