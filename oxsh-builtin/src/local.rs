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

//! Local built-in
//!
//! The **`local`** built-in declares function-local variables.
//!
//! # Syntax
//!
//! ```sh
//! local name[=value]...
//! ```
//!
//! # Semantics
//!
//! Each *name* is declared in the calling function's local scope, hiding
//! any variable of the same name until the function returns. With
//! `=value`, the local is also assigned. Outside a function the
//! built-in is an error.
//!
//! # Exit status
//!
//! Zero on success; 2 outside a function or on an assignment error.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::variable::Scope;
use oxsh_env::Env;

/// Entry point for executing the `local` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if !env.stack.in_returnable_context() {
        return report_error(env, "local", "can only be used in a function");
    }

    for operand in &args {
        let (name, value) = match operand.value.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (operand.value.as_str(), None),
        };
        if let Err(error) = env.variables.assign(Scope::Local, name, value) {
            let message = error.to_string();
            return report_error(env, "local", &message);
        }
    }
    Result::new(ExitStatus::SUCCESS)
}
