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

//! Exec built-in
//!
//! The **`exec`** built-in replaces the shell with an external utility,
//! or makes its redirections permanent.
//!
//! # Syntax
//!
//! ```sh
//! exec [utility [argument...]]
//! ```
//!
//! # Semantics
//!
//! With a *utility* operand, the shell process is replaced by the
//! utility, which inherits the open file descriptors and the exported
//! variables; nothing after a successful `exec` runs. Without operands,
//! the built-in does nothing, but redirections applied to it stay in
//! effect in the current shell instead of being undone.
//!
//! # Exit status
//!
//! Without operands, zero. If the utility cannot be executed, the
//! non-interactive shell exits with 126, or 127 if it was not found.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{Divert, ExitStatus, Field};
use oxsh_env::system::Errno;
use oxsh_env::Env;
use oxsh_semantics::command_search::search_path;
use std::ffi::CString;

/// Entry point for executing the `exec` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some(utility) = args.first() else {
        // The caller keeps the redirections applied to `exec` permanent.
        return Result::new(ExitStatus::SUCCESS);
    };

    let path = if utility.value.contains('/') {
        CString::new(utility.value.as_str()).ok()
    } else {
        search_path(env, &utility.value)
    };
    let Some(path) = path else {
        let message = format!("{}: command not found", utility.value);
        env.print_error(Some(&utility.origin), &message);
        return Result::with_divert(
            ExitStatus::NOT_FOUND,
            Divert::Exit(Some(ExitStatus::NOT_FOUND)),
        );
    };

    let arguments: Vec<CString> = args
        .iter()
        .filter_map(|field| CString::new(field.value.as_str()).ok())
        .collect();
    let environment: Vec<CString> = env
        .variables
        .environ()
        .into_iter()
        .filter_map(|entry| CString::new(entry).ok())
        .collect();

    let errno = env.system.execve(&path, &arguments, &environment);
    let exit_status = match errno {
        Errno::ENOENT | Errno::ENOTDIR => ExitStatus::NOT_FOUND,
        _ => ExitStatus::NOEXEC,
    };
    let message = format!("{}: {errno}", utility.value);
    let _ = report_error(env, "exec", &message);
    Result::with_divert(exit_status, Divert::Exit(Some(exit_status)))
}
