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

//! Exit built-in
//!
//! The **`exit`** built-in makes the shell exit.
//!
//! # Syntax
//!
//! ```sh
//! exit [n]
//! ```
//!
//! # Semantics
//!
//! The shell exits with status *n* modulo 256, defaulting to the current
//! value of `$?`. The `EXIT` trap, if any, runs before the shell
//! exits.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{Divert, ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `exit` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let exit_status = match args.first() {
        None => env.exit_status,
        Some(operand) => match operand.value.parse::<i32>() {
            Ok(n) => ExitStatus(n.rem_euclid(256)),
            Err(_) => return report_error(env, "exit", "operand must be a decimal integer"),
        },
    };
    Result::with_divert(exit_status, Divert::Exit(Some(exit_status)))
}
