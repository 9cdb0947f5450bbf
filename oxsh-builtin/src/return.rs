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

//! Return built-in
//!
//! The **`return`** built-in ends the execution of the current function
//! or dot script.
//!
//! # Syntax
//!
//! ```sh
//! return [n]
//! ```
//!
//! # Semantics
//!
//! The function or dot script finishes with exit status *n*, defaulting
//! to the current value of `$?`. Outside a function or dot script the
//! built-in is an error.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{Divert, ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `return` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let exit_status = match args.first() {
        None => env.exit_status,
        Some(operand) => match operand.value.parse() {
            Ok(n) => ExitStatus(n),
            Err(_) => return report_error(env, "return", "operand must be a decimal integer"),
        },
    };

    if !env.stack.in_returnable_context() {
        return report_error(env, "return", "not in a function or dot script");
    }
    Result::with_divert(exit_status, Divert::Return(Some(exit_status)))
}
