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

//! Continue built-in
//!
//! The **`continue`** built-in skips to the next iteration of a loop.
//!
//! # Syntax
//!
//! ```sh
//! continue [n]
//! ```
//!
//! # Semantics
//!
//! `continue n` resumes the *n*th innermost enclosing `for`, `while`,
//! or `until` loop with its next iteration. If *n* is greater than the
//! number of enclosing loops, the outermost one is continued. *n*
//! defaults to 1.
//!
//! # Exit status
//!
//! Zero if a loop is continued; 2 on a usage error.

use crate::common::{parse_positive, report_error};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{Divert, ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `continue` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let count = match args.first() {
        None => 1,
        Some(operand) => match parse_positive(operand) {
            Some(count) => count,
            None => {
                return report_error(
                    env,
                    "continue",
                    "operand must be a positive decimal integer",
                )
            }
        },
    };

    let enclosing = env.stack.loop_count(count);
    if enclosing == 0 {
        return report_error(env, "continue", "not in a loop");
    }
    Result::with_divert(
        ExitStatus::SUCCESS,
        Divert::Continue {
            count: enclosing - 1,
        },
    )
}
