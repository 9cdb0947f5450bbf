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

//! Command substitution
//!
//! The command text is re-parsed and executed in a forked child with its
//! standard output connected to a pipe. The parent reads the pipe to the
//! end, waits for the child, and takes the captured output with all
//! trailing newlines removed. The exit status of the substitution becomes
//! the exit status of the last command executed in it.

use super::{Error, ErrorCause, Result};
use crate::runner;
use oxsh_env::semantics::ExitStatus;
use oxsh_env::system::{WaitPidFlag, WaitStatus};
use oxsh_env::Env;
use oxsh_syntax::source::Location;
use oxsh_syntax::syntax::Fd;

/// Performs a command substitution, returning the captured output.
pub fn expand(env: &mut Env, content: &str, location: &Location) -> Result<String> {
    let system_error = |errno| Error {
        cause: ErrorCause::CommandSubstError(errno),
        location: *location,
    };

    let (read_end, write_end) = env.system.pipe().map_err(system_error)?;

    match env.system.fork().map_err(system_error)? {
        oxsh_env::system::ForkResult::Child => {
            // In the child: write captured output to the pipe via the
            // standard output.
            env.system.close(read_end).ok();
            env.system.dup2(write_end, Fd::STDOUT).ok();
            env.system.close(write_end).ok();
            env.traps.enter_subshell(&mut *env.system);

            let divert = runner::run_string(env, content);
            let exit_status = oxsh_env::semantics::apply_divert(divert, env)
                .and_then(|divert| divert.exit_status())
                .unwrap_or(env.exit_status);
            let exit_code = exit_status.to_raw_exit_code();
            env.system.exit(exit_code.into())
        }
        oxsh_env::system::ForkResult::Parent { child } => {
            env.system.close(write_end).map_err(system_error)?;

            let mut output = Vec::new();
            let mut buffer = [0; 1024];
            loop {
                match env.system.read(read_end, &mut buffer) {
                    Ok(0) => break,
                    Ok(count) => output.extend_from_slice(&buffer[..count]),
                    Err(oxsh_env::system::Errno::EINTR) => continue,
                    Err(errno) => {
                        env.system.close(read_end).ok();
                        return Err(system_error(errno));
                    }
                }
            }
            env.system.close(read_end).ok();

            let status = env
                .system
                .wait(child, WaitPidFlag::empty())
                .map_err(system_error)?;
            env.exit_status = match status {
                WaitStatus::Exited(_, code) => ExitStatus(code),
                WaitStatus::Signaled(_, signal, _) => ExitStatus::from(signal),
                _ => ExitStatus::FAILURE,
            };

            let mut value = String::from_utf8_lossy(&output).into_owned();
            while value.ends_with('\n') {
                value.pop();
            }
            Ok(value)
        }
    }
}
