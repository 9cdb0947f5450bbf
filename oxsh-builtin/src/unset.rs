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

//! Unset built-in
//!
//! The **`unset`** built-in removes variables or functions.
//!
//! # Syntax
//!
//! ```sh
//! unset [-fv] name...
//! ```
//!
//! # Semantics
//!
//! With `-v` (the default), each *name* names a variable to remove;
//! with `-f`, a function. Removing a nonexistent name is not an error;
//! removing a read-only variable is.
//!
//! # Exit status
//!
//! Zero on success; 2 if a variable is read-only or on a usage error.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `unset` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut functions = false;
    let mut operands = &args[..];
    match args.first().map(|f| f.value.as_str()) {
        Some("-f") => {
            functions = true;
            operands = &args[1..];
        }
        Some("-v") => operands = &args[1..],
        _ => {}
    }

    for operand in operands {
        if functions {
            env.functions.remove(operand.value.as_str());
        } else if let Err(error) = env.variables.unset(&operand.value) {
            let message = error.to_string();
            return report_error(env, "unset", &message);
        }
    }
    Result::new(ExitStatus::SUCCESS)
}
