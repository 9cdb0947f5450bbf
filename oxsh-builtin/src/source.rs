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

//! Dot built-in
//!
//! The **`.`** built-in reads and executes commands from a file in the
//! current execution environment.
//!
//! # Syntax
//!
//! ```sh
//! . file [argument...]
//! ```
//!
//! # Semantics
//!
//! A *file* name without a slash is sought in the directories named by
//! `$PATH` (the file need not be executable); a name with a slash is
//! used as is. If arguments are given, they become the positional
//! parameters for the duration of the script, and the previous
//! parameters are restored afterwards. A `return` in the script ends
//! it.
//!
//! # Exit status
//!
//! The exit status of the last command executed, or zero if the file
//! contains no commands. An unreadable file is an error.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::frame::FrameKind;
use oxsh_env::semantics::{Divert, ExitStatus, Field};
use oxsh_env::system::{Mode, OFlag};
use oxsh_env::variable::PositionalParams;
use oxsh_env::Env;
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};

/// Locates the dot script, searching `$PATH` for slashless names.
fn locate(env: &mut Env, name: &str) -> Option<CString> {
    if name.contains('/') {
        return CString::new(name).ok();
    }
    let path = env.variables.get_value("PATH").unwrap_or("").to_string();
    for dir in path.split(':') {
        let candidate = if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        };
        let Ok(candidate) = CString::new(candidate) else {
            continue;
        };
        if env
            .system
            .open(&candidate, OFlag::O_RDONLY, Mode::empty())
            .map(|fd| env.system.close(fd).ok())
            .is_ok()
        {
            return Some(candidate);
        }
    }
    // Fall back to the literal name so the open below reports the error.
    CString::new(name).ok()
}

/// Reads the whole file into a string.
fn read_file(env: &mut Env, path: &CString) -> std::result::Result<String, String> {
    let fd = env
        .system
        .open(path, OFlag::O_RDONLY, Mode::empty())
        .map_err(|errno| errno.to_string())?;
    let mut bytes = Vec::new();
    let mut buffer = [0; 4096];
    loop {
        match env.system.read(fd, &mut buffer) {
            Ok(0) => break,
            Ok(count) => bytes.extend_from_slice(&buffer[..count]),
            Err(oxsh_env::system::Errno::EINTR) => continue,
            Err(errno) => {
                env.system.close(fd).ok();
                return Err(errno.to_string());
            }
        }
    }
    env.system.close(fd).ok();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Entry point for executing the `.` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some((file, script_args)) = args.split_first() else {
        return report_error(env, ".", "missing file operand");
    };

    let Some(path) = locate(env, &file.value) else {
        return report_error(env, ".", "invalid file name");
    };
    let source = match read_file(env, &path) {
        Ok(source) => source,
        Err(message) => {
            let message = format!("{}: {message}", file.value);
            return report_error(env, ".", &message);
        }
    };

    let replaces_positional = !script_args.is_empty();
    let mut guard = env.push_frame(FrameKind::DotScript {
        replaces_positional,
    });
    if replaces_positional {
        *guard.variables.positional_params_mut() =
            PositionalParams::from_fields(script_args.iter().cloned());
    }
    let result = oxsh_semantics::run_string(&mut guard, &source);
    drop(guard);

    match result {
        Continue(()) => Result::new(env.exit_status),
        Break(Divert::Return(exit_status)) => {
            let exit_status = exit_status.unwrap_or(env.exit_status);
            Result::new(exit_status)
        }
        Break(divert) => Result {
            exit_status: env.exit_status,
            divert: Break(divert),
        },
    }
}
