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

//! Break built-in
//!
//! The **`break`** built-in terminates the execution of a loop.
//!
//! # Syntax
//!
//! ```sh
//! break [n]
//! ```
//!
//! # Semantics
//!
//! `break n` quits the execution of the *n*th innermost `for`, `while`,
//! or `until` loop that lexically encloses the command. If *n* is
//! greater than the number of enclosing loops, the outermost one is
//! exited. *n* defaults to 1.
//!
//! # Exit status
//!
//! Zero if a loop is exited; 2 on a usage error.
//!
//! # Implementation notes
//!
//! A successful invocation returns a result whose divert is
//! `Break(Divert::Break { count: n - 1 })`; the enclosing loops handle
//! the divert, each consuming one level of the count.

use crate::common::{parse_positive, report_error};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{Divert, ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `break` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let count = match args.first() {
        None => 1,
        Some(operand) => match parse_positive(operand) {
            Some(count) => count,
            None => {
                return report_error(env, "break", "operand must be a positive decimal integer")
            }
        },
    };

    let enclosing = env.stack.loop_count(count);
    if enclosing == 0 {
        return report_error(env, "break", "not in a loop");
    }
    Result::with_divert(
        ExitStatus::SUCCESS,
        Divert::Break {
            count: enclosing - 1,
        },
    )
}
