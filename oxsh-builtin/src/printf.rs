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

//! Printf built-in
//!
//! The **`printf`** built-in writes formatted output.
//!
//! # Syntax
//!
//! ```sh
//! printf format [argument...]
//! ```
//!
//! # Semantics
//!
//! The format string supports the `%s`, `%c`, `%d`, `%i`, `%u`, `%o`,
//! `%x`, `%X`, and `%%` conversions and the `\\`, `\a`, `\b`, `\f`,
//! `\n`, `\r`, `\t`, and `\v` escape sequences. If there are more
//! arguments than conversions, the format is reused until the arguments
//! are exhausted, as POSIX requires. A missing argument formats as an
//! empty string or zero.
//!
//! # Exit status
//!
//! Zero on success; 2 on a usage error.

use crate::common::{output, report_error};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

/// Translates an escape sequence character.
fn escape(c: char) -> Option<char> {
    match c {
        '\\' => Some('\\'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0C'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0B'),
        _ => None,
    }
}

/// Parses the leading integer of an argument, defaulting to zero.
fn integer_argument(argument: Option<&Field>) -> i64 {
    argument
        .map(|field| field.value.trim())
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// Entry point for executing the `printf` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some((format, arguments)) = args.split_first() else {
        return report_error(env, "printf", "missing format operand");
    };
    let format: Vec<char> = format.value.chars().collect();

    let mut result = String::new();
    let mut arguments = arguments.iter();
    loop {
        let mut used_argument = false;
        let mut i = 0;
        while i < format.len() {
            match format[i] {
                '\\' if i + 1 < format.len() => {
                    i += 1;
                    match escape(format[i]) {
                        Some(c) => result.push(c),
                        None => {
                            result.push('\\');
                            result.push(format[i]);
                        }
                    }
                }
                '%' if i + 1 < format.len() => {
                    i += 1;
                    match format[i] {
                        '%' => result.push('%'),
                        's' => {
                            if let Some(argument) = arguments.next() {
                                used_argument = true;
                                result.push_str(&argument.value);
                            }
                        }
                        'c' => {
                            if let Some(argument) = arguments.next() {
                                used_argument = true;
                                if let Some(c) = argument.value.chars().next() {
                                    result.push(c);
                                }
                            }
                        }
                        'd' | 'i' => {
                            let argument = arguments.next();
                            used_argument |= argument.is_some();
                            result.push_str(&integer_argument(argument).to_string());
                        }
                        'u' => {
                            let argument = arguments.next();
                            used_argument |= argument.is_some();
                            let value = integer_argument(argument) as u64;
                            result.push_str(&value.to_string());
                        }
                        'o' => {
                            let argument = arguments.next();
                            used_argument |= argument.is_some();
                            result.push_str(&format!("{:o}", integer_argument(argument)));
                        }
                        'x' => {
                            let argument = arguments.next();
                            used_argument |= argument.is_some();
                            result.push_str(&format!("{:x}", integer_argument(argument)));
                        }
                        'X' => {
                            let argument = arguments.next();
                            used_argument |= argument.is_some();
                            result.push_str(&format!("{:X}", integer_argument(argument)));
                        }
                        other => {
                            return report_error(
                                env,
                                "printf",
                                &format!("invalid conversion specifier `%{other}`"),
                            )
                        }
                    }
                }
                c => result.push(c),
            }
            i += 1;
        }

        // POSIX: reuse the format while arguments remain, but do not loop
        // on a format that consumes none.
        if arguments.len() == 0 || !used_argument {
            break;
        }
    }

    output(env, &result);
    Result::new(ExitStatus::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::system::test_helper::DummySystem;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn test_env() -> (Env, Rc<RefCell<Vec<u8>>>) {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let system = DummySystem {
            output: Rc::clone(&buffer),
            ..DummySystem::default()
        };
        (Env::new(Box::new(system)), buffer)
    }

    fn run(args: &[&str]) -> String {
        let (mut env, buffer) = test_env();
        main(&mut env, Field::dummies(args.iter().copied()));
        let bytes = buffer.borrow();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn string_conversion() {
        assert_eq!(run(&["%s", "hello"]), "hello");
        assert_eq!(run(&["<%s>", "a b"]), "<a b>");
        assert_eq!(run(&["%s"]), "");
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(run(&["%d", "42"]), "42");
        assert_eq!(run(&["%d", "-7"]), "-7");
        assert_eq!(run(&["%d", "junk"]), "0");
        assert_eq!(run(&["%x", "255"]), "ff");
        assert_eq!(run(&["%o", "8"]), "10");
    }

    #[test]
    fn escapes_and_percent() {
        assert_eq!(run(&["a\\tb\\n"]), "a\tb\n");
        assert_eq!(run(&["100%%"]), "100%");
    }

    #[test]
    fn format_reuse() {
        assert_eq!(run(&["%s-", "a", "b", "c"]), "a-b-c-");
    }

    #[test]
    fn no_trailing_newline_is_added() {
        assert_eq!(run(&["%s", "x"]), "x");
    }
}
