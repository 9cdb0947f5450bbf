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

//! Command built-in
//!
//! The **`command`** built-in executes a command bypassing function
//! lookup, or describes how a name would be resolved.
//!
//! # Syntax
//!
//! ```sh
//! command [-v] name [argument...]
//! ```
//!
//! # Semantics
//!
//! Without `-v`, the *name* is resolved to a built-in or an external
//! utility — never a function — and executed with the remaining
//! arguments. A special built-in executed this way loses its special
//! properties. With `-v`, the resolution of *name* is printed instead:
//! the path for an external utility, the plain name otherwise.
//!
//! # Exit status
//!
//! Without `-v`, the exit status of the executed command, or 127 if it
//! was not found. With `-v`, zero if the name was resolved and 1
//! otherwise.

use crate::common::{output, report_error};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;
use oxsh_semantics::command_search::search_path;
use std::ffi::CString;
use std::ops::ControlFlow::Break;

fn resolve_description(env: &mut Env, name: &str) -> Option<String> {
    use std::str::FromStr;
    if oxsh_syntax::lex::Keyword::from_str(name).is_ok() {
        return Some(name.to_string());
    }
    if let Some(entry) = env.aliases.get(name) {
        return Some(format!("alias {}='{}'", entry.0.name, entry.0.replacement));
    }
    if env.builtins.contains_key(name) || env.functions.get(name).is_some() {
        return Some(name.to_string());
    }
    if name.contains('/') {
        return Some(name.to_string());
    }
    search_path(env, name).map(|path| path.to_string_lossy().into_owned())
}

/// Entry point for executing the `command` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let verbose = args.first().map(|f| f.value.as_str()) == Some("-v");
    let operands = if verbose { &args[1..] } else { &args[..] };
    let Some((name, rest)) = operands.split_first() else {
        return report_error(env, "command", "missing command operand");
    };

    if verbose {
        return match resolve_description(env, &name.value) {
            Some(description) => {
                output(env, &description);
                output(env, "\n");
                Result::new(ExitStatus::SUCCESS)
            }
            None => Result::new(ExitStatus::FAILURE),
        };
    }

    // Execute, skipping functions. A special built-in run through
    // `command` acts as a regular one, so its diverts other than those
    // of the control-flow built-ins are kept but its errors are not
    // fatal.
    if let Some(&builtin) = env.builtins.get(name.value.as_str()) {
        return (builtin.execute)(env, rest.to_vec());
    }

    let path = if name.value.contains('/') {
        CString::new(name.value.as_str()).ok()
    } else {
        search_path(env, &name.value)
    };
    match path {
        Some(path) => {
            let fields: Vec<Field> = operands.to_vec();
            let result = oxsh_semantics::command::simple::execute_program(env, path, fields);
            match result {
                Break(divert) => Result {
                    exit_status: env.exit_status,
                    divert: Break(divert),
                },
                _ => Result::new(env.exit_status),
            }
        }
        None => {
            let message = format!("{}: command not found", name.value);
            env.print_error(Some(&name.origin), &message);
            Result::new(ExitStatus::NOT_FOUND)
        }
    }
}
