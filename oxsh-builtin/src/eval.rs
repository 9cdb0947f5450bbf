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

//! Eval built-in
//!
//! The **`eval`** built-in concatenates its arguments into a command
//! string and executes it in the current execution environment.
//!
//! # Syntax
//!
//! ```sh
//! eval [word...]
//! ```
//!
//! # Exit status
//!
//! The exit status of the executed commands, or zero if the resulting
//! string is empty.

use itertools::Itertools;
use oxsh_env::builtin::Result;
use oxsh_env::frame::FrameKind;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;
use std::ops::ControlFlow::{Break, Continue};

/// Entry point for executing the `eval` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let command = args.iter().map(|field| field.value.as_str()).join(" ");
    if command.is_empty() {
        return Result::new(ExitStatus::SUCCESS);
    }

    let mut guard = env.push_frame(FrameKind::Eval);
    let result = oxsh_semantics::run_string(&mut guard, &command);
    drop(guard);
    match result {
        Continue(()) => Result::new(env.exit_status),
        Break(divert) => Result {
            exit_status: env.exit_status,
            divert: Break(divert),
        },
    }
}
