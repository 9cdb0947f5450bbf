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

//! Wait built-in
//!
//! The **`wait`** built-in waits for asynchronous jobs to finish.
//!
//! # Syntax
//!
//! ```sh
//! wait [pid...]
//! ```
//!
//! # Semantics
//!
//! Without operands, the built-in waits for all known child processes.
//! With process ID operands, it waits for each and reports the exit
//! status of the last one.
//!
//! # Exit status
//!
//! Zero, or the exit status of the last awaited process; 127 if the
//! process is not a child of the shell.

use oxsh_env::builtin::Result;
use oxsh_env::job::{Pid, ProcessState};
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::system::{Errno, WaitPidFlag, WaitStatus};
use oxsh_env::Env;

/// Waits for one process, recording its state in the job set.
fn wait_for(env: &mut Env, pid: Pid) -> ExitStatus {
    loop {
        match env.system.wait(pid, WaitPidFlag::empty()) {
            Ok(WaitStatus::Exited(pid, code)) => {
                let exit_status = ExitStatus(code);
                env.jobs.report(pid, ProcessState::Exited(exit_status));
                return exit_status;
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                let exit_status = ExitStatus::from(signal);
                env.jobs.report(pid, ProcessState::Signaled(signal));
                return exit_status;
            }
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(_) => return ExitStatus::NOT_FOUND,
        }
    }
}

/// Entry point for executing the `wait` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut exit_status = ExitStatus::SUCCESS;

    if args.is_empty() {
        // Wait for every remaining child.
        loop {
            match env.system.wait(Pid::from_raw(-1), WaitPidFlag::empty()) {
                Ok(WaitStatus::Exited(pid, code)) => {
                    env.jobs.report(pid, ProcessState::Exited(ExitStatus(code)));
                }
                Ok(WaitStatus::Signaled(pid, signal, _)) => {
                    env.jobs.report(pid, ProcessState::Signaled(signal));
                }
                Ok(_) => {}
                Err(Errno::EINTR) => {}
                Err(_) => break,
            }
        }
    } else {
        for operand in &args {
            match operand.value.parse::<i32>() {
                Ok(pid) => exit_status = wait_for(env, Pid::from_raw(pid)),
                Err(_) => exit_status = ExitStatus::ERROR,
            }
        }
    }
    Result::new(exit_status)
}
