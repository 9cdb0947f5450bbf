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

//! Shift built-in
//!
//! The **`shift`** built-in removes leading positional parameters.
//!
//! # Syntax
//!
//! ```sh
//! shift [n]
//! ```
//!
//! # Semantics
//!
//! The first *n* positional parameters are removed and the rest renumber
//! from `$1`. *n* defaults to 1. It is an error if *n* is greater than
//! `$#`.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `shift` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let count = match args.first() {
        None => 1,
        Some(operand) => match operand.value.parse() {
            Ok(count) => count,
            Err(_) => {
                return report_error(env, "shift", "operand must be a decimal integer")
            }
        },
    };

    let params = &mut env.variables.positional_params_mut().values;
    if count > params.len() {
        return report_error(env, "shift", "cannot shift past the last parameter");
    }
    params.drain(..count);
    Result::new(ExitStatus::SUCCESS)
}
