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

//! Pipeline execution
//!
//! A pipeline of _n_ commands forks _n_ children connected by anonymous
//! pipes. The members run logically concurrently; the parent waits for
//! all of them. The pipeline's exit status is that of the last member,
//! or, with the `PipeFail` option, the status of the rightmost member
//! that failed. Under job control the members are placed in their own
//! process group, which gets the terminal while the pipeline runs in the
//! foreground; a stopped pipeline becomes a stopped job.

use super::{report_system_error, Execute};
use oxsh_env::frame::FrameKind;
use oxsh_env::job::{Pid, Process, ProcessState};
use oxsh_env::option::ShellOption;
use oxsh_env::semantics::{ExitStatus, Result};
use oxsh_env::system::{Errno, ForkResult, WaitPidFlag, WaitStatus};
use oxsh_env::Env;
use oxsh_syntax::syntax::{Command, Fd};
use std::ops::ControlFlow::Continue;

/// Executes the members of a multi-command pipeline.
pub fn execute_members(env: &mut Env, commands: &[Command]) -> Result {
    let monitor = env.options.get(ShellOption::Monitor);
    let count = commands.len();
    let mut children: Vec<Pid> = Vec::with_capacity(count);
    let mut names: Vec<String> = Vec::with_capacity(count);
    let mut pgid: Option<Pid> = None;
    let mut previous_read: Option<Fd> = None;

    for (index, command) in commands.iter().enumerate() {
        let pipes = if index + 1 < count {
            match env.system.pipe() {
                Ok(pipes) => Some(pipes),
                Err(errno) => return report_system_error(env, errno, "cannot create pipe"),
            }
        } else {
            None
        };

        match env.system.fork() {
            Err(errno) => return report_system_error(env, errno, "cannot fork"),

            Ok(ForkResult::Child) => {
                if monitor {
                    let group = pgid.unwrap_or_else(|| env.system.getpid());
                    env.system.setpgid(Pid::from_raw(0), group).ok();
                }
                env.traps.enter_subshell(&mut *env.system);

                if let Some(read) = previous_read {
                    env.system.dup2(read, Fd::STDIN).ok();
                    env.system.close(read).ok();
                }
                if let Some((read, write)) = pipes {
                    env.system.close(read).ok();
                    env.system.dup2(write, Fd::STDOUT).ok();
                    env.system.close(write).ok();
                }

                let mut guard = env.push_frame(FrameKind::PipelineMember);
                let result = command.execute(&mut guard);
                drop(guard);
                oxsh_env::semantics::apply_divert(result, env);
                let exit_code = env.exit_status.to_raw_exit_code();
                env.system.exit(exit_code.into())
            }

            Ok(ForkResult::Parent { child }) => {
                if monitor {
                    let group = *pgid.get_or_insert(child);
                    env.system.setpgid(child, group).ok();
                }
                children.push(child);
                names.push(command.to_string());

                if let Some(read) = previous_read {
                    env.system.close(read).ok();
                }
                previous_read = match pipes {
                    Some((read, write)) => {
                        env.system.close(write).ok();
                        Some(read)
                    }
                    None => None,
                };
            }
        }
    }

    // Foreground the pipeline's process group while waiting.
    let shell_pgid = env.system.getpgrp();
    if monitor {
        if let Some(pgid) = pgid {
            env.system.tcsetpgrp(Fd::STDIN, pgid).ok();
        }
    }

    let mut statuses: Vec<ExitStatus> = Vec::with_capacity(count);
    let mut stopped: Vec<Process> = Vec::new();
    for (index, &child) in children.iter().enumerate() {
        let options = if monitor {
            WaitPidFlag::WUNTRACED
        } else {
            WaitPidFlag::empty()
        };
        let status = loop {
            match env.system.wait(child, options) {
                Ok(WaitStatus::Exited(_, code)) => break ExitStatus(code),
                Ok(WaitStatus::Signaled(_, signal, _)) => break ExitStatus::from(signal),
                Ok(WaitStatus::Stopped(pid, signal)) => {
                    stopped.push(Process {
                        pid,
                        state: ProcessState::Stopped(signal),
                        name: names[index].clone(),
                    });
                    break ExitStatus::from(signal);
                }
                Ok(_) => continue,
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => break ExitStatus::FAILURE,
                Err(errno) => {
                    return report_system_error(env, errno, "cannot wait for pipeline")
                }
            }
        };
        statuses.push(status);
    }

    if monitor {
        env.system.tcsetpgrp(Fd::STDIN, shell_pgid).ok();
    }

    // A stopped foreground pipeline becomes a stopped background job.
    if !stopped.is_empty() {
        let group = pgid.unwrap_or_else(|| stopped[0].pid);
        env.jobs.add(group, stopped, true);
    }

    env.exit_status = if env.options.get(ShellOption::PipeFail) {
        statuses
            .iter()
            .rev()
            .find(|status| !status.is_successful())
            .copied()
            .unwrap_or(ExitStatus::SUCCESS)
    } else {
        statuses.last().copied().unwrap_or(ExitStatus::SUCCESS)
    };
    Continue(())
}
