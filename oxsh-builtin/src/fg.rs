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

//! Fg built-in
//!
//! The **`fg`** built-in brings a job to the foreground.
//!
//! # Syntax
//!
//! ```sh
//! fg [%n]
//! ```
//!
//! # Semantics
//!
//! The job (the current job by default) is continued with `SIGCONT`,
//! given the terminal, and waited for as if it had been started in the
//! foreground. Requires job control.
//!
//! # Exit status
//!
//! The exit status of the resumed job; 1 if there is no such job.

use crate::common::{output, report_failure};
use oxsh_env::builtin::Result;
use oxsh_env::job::{Pid, ProcessState};
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::signal::Signal;
use oxsh_env::system::{Errno, WaitPidFlag, WaitStatus};
use oxsh_env::Env;
use oxsh_syntax::syntax::Fd;

/// Looks up the job named by the operand, or the current job.
pub(crate) fn find_job(env: &Env, operand: Option<&str>) -> Option<usize> {
    match operand {
        None => env.jobs.current_job(),
        Some(operand) => {
            let number = operand.strip_prefix('%')?.parse().ok()?;
            env.jobs.find_by_number(number)
        }
    }
}

/// Entry point for executing the `fg` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operand = args.first().map(|f| f.value.as_str());
    let Some(key) = find_job(env, operand) else {
        return report_failure(env, "fg", "no such job");
    };
    let Some(job) = env.jobs.get(key) else {
        return report_failure(env, "fg", "no such job");
    };
    let pgid = job.pgid;
    let name = job.name();

    output(env, &name);
    output(env, "\n");

    let shell_pgid = env.system.getpgrp();
    env.system.tcsetpgrp(Fd::STDIN, pgid).ok();
    env.system.kill(Pid::from_raw(-pgid.as_raw()), Some(Signal::SIGCONT)).ok();

    let mut exit_status = ExitStatus::SUCCESS;
    loop {
        match env.system.wait(Pid::from_raw(-pgid.as_raw()), WaitPidFlag::WUNTRACED) {
            Ok(WaitStatus::Exited(pid, code)) => {
                exit_status = ExitStatus(code);
                env.jobs.report(pid, ProcessState::Exited(exit_status));
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                exit_status = ExitStatus::from(signal);
                env.jobs.report(pid, ProcessState::Signaled(signal));
            }
            Ok(WaitStatus::Stopped(pid, signal)) => {
                exit_status = ExitStatus::from(signal);
                env.jobs.report(pid, ProcessState::Stopped(signal));
                break;
            }
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(_) => break,
        }
        let done = env
            .jobs
            .get(key)
            .map(|job| !matches!(job.state(), oxsh_env::job::JobState::Running))
            .unwrap_or(true);
        if done {
            break;
        }
    }
    env.system.tcsetpgrp(Fd::STDIN, shell_pgid).ok();

    env.jobs.remove_reapable();
    if let Some(job) = env.jobs.get_mut(key) {
        if matches!(job.state(), oxsh_env::job::JobState::Done | oxsh_env::job::JobState::Terminated) {
            job.is_notified = true;
        }
    }
    env.jobs.remove_reapable();
    Result::new(exit_status)
}
