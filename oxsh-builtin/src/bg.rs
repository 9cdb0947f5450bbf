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

//! Bg built-in
//!
//! The **`bg`** built-in resumes a stopped job in the background.
//!
//! # Syntax
//!
//! ```sh
//! bg [%n]
//! ```
//!
//! # Semantics
//!
//! The job (the current job by default) is continued with `SIGCONT`
//! and left running in the background.
//!
//! # Exit status
//!
//! Zero on success; 1 if there is no such job.

use crate::common::{output, report_failure};
use crate::fg::find_job;
use oxsh_env::builtin::Result;
use oxsh_env::job::{Pid, ProcessState};
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::signal::Signal;
use oxsh_env::Env;

/// Entry point for executing the `bg` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operand = args.first().map(|f| f.value.as_str());
    let Some(key) = find_job(env, operand) else {
        return report_failure(env, "bg", "no such job");
    };
    let Some(job) = env.jobs.get_mut(key) else {
        return report_failure(env, "bg", "no such job");
    };
    let pgid = job.pgid;
    for process in &mut job.processes {
        if matches!(process.state, ProcessState::Stopped(_)) {
            process.state = ProcessState::Running;
        }
    }
    let line = format!("[{}] {}\n", job.number, job.name());

    env.system
        .kill(Pid::from_raw(-pgid.as_raw()), Some(Signal::SIGCONT))
        .ok();
    output(env, &line);
    Result::new(ExitStatus::SUCCESS)
}
