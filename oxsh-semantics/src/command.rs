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

//! Command execution
//!
//! This module implements the [`Execute`] trait for the AST types. Between
//! commands, after pipelines, and on loop iterations the executor runs
//! pending [trap handlers](crate::trap); interruption of the normal
//! control flow travels as the `Divert` of the returned result.

pub mod compound;
pub mod pipeline;
pub mod simple;

use crate::trap::run_traps;
use oxsh_env::frame::FrameKind;
use oxsh_env::job::Process;
use oxsh_env::option::ShellOption;
use oxsh_env::semantics::{Divert, ExitStatus, Result};
use oxsh_env::system::Errno;
use oxsh_env::Env;
use oxsh_syntax::syntax::{
    AndOr, AndOrList, Command, FunctionDefinition, Item, List, Pipeline,
};
use std::ops::ControlFlow::{Break, Continue};

/// Syntactic construct that can be executed
pub trait Execute {
    /// Executes this construct, updating `env.exit_status`.
    fn execute(&self, env: &mut Env) -> Result;
}

/// Reports a system call failure during command execution.
pub(crate) fn report_system_error(env: &mut Env, errno: Errno, what: &str) -> Result {
    env.print_error(None, &format!("{what}: {errno}"));
    env.exit_status = ExitStatus::ERROR;
    Continue(())
}

/// Exits the shell if the `ErrExit` option demands it.
///
/// The option is suppressed in tested contexts: conditions of `if`,
/// `while`, and `until`, operands of `&&` and `||`, and negated
/// pipelines, all of which push a [`FrameKind::Condition`] frame.
pub(crate) fn apply_errexit(env: &mut Env) -> Result {
    if env.options.get(ShellOption::ErrExit)
        && !env.exit_status.is_successful()
        && !env.stack.in_condition_context()
    {
        Break(Divert::Exit(Some(env.exit_status)))
    } else {
        Continue(())
    }
}

/// Starts an asynchronous command.
///
/// The command runs in a forked child that does not read the terminal;
/// the parent records the job and sets `$!` without waiting.
fn start_async(env: &mut Env, and_or: &AndOrList) -> Result {
    match env.system.fork() {
        Err(errno) => report_system_error(env, errno, "cannot start asynchronous command"),
        Ok(oxsh_env::system::ForkResult::Child) => {
            env.traps.enter_subshell(&mut *env.system);
            let mut guard = env.push_frame(FrameKind::BackgroundJob);
            let result = and_or.execute(&mut guard);
            drop(guard);
            oxsh_env::semantics::apply_divert(result, env);
            let exit_code = env.exit_status.to_raw_exit_code();
            env.system.exit(exit_code.into())
        }
        Ok(oxsh_env::system::ForkResult::Parent { child }) => {
            let process = Process {
                pid: child,
                state: oxsh_env::job::ProcessState::Running,
                name: and_or.to_string(),
            };
            env.jobs.add(child, vec![process], true);
            env.jobs.set_last_async_pid(child);
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
    }
}

impl Execute for List {
    fn execute(&self, env: &mut Env) -> Result {
        for item in &self.0 {
            item.execute(env)?;
            run_traps(env)?;
        }
        Continue(())
    }
}

impl Execute for Item {
    fn execute(&self, env: &mut Env) -> Result {
        if self.is_async {
            start_async(env, &self.and_or)
        } else {
            self.and_or.execute(env)
        }
    }
}

impl Execute for AndOrList {
    fn execute(&self, env: &mut Env) -> Result {
        run_conditional(env, &self.first, !self.rest.is_empty())?;

        for (i, (condition, pipeline)) in self.rest.iter().enumerate() {
            let run = match condition {
                AndOr::AndThen => env.exit_status.is_successful(),
                AndOr::OrElse => !env.exit_status.is_successful(),
            };
            if run {
                let is_tested = i + 1 < self.rest.len();
                run_conditional(env, pipeline, is_tested)?;
            }
        }
        Continue(())
    }
}

/// Executes a pipeline, optionally in a condition frame that suppresses
/// `ErrExit`.
fn run_conditional(env: &mut Env, pipeline: &Pipeline, is_tested: bool) -> Result {
    if is_tested {
        let mut guard = env.push_frame(FrameKind::Condition);
        pipeline.execute(&mut guard)
    } else {
        pipeline.execute(env)
    }
}

impl Execute for Pipeline {
    fn execute(&self, env: &mut Env) -> Result {
        if self.negation {
            {
                let mut guard = env.push_frame(FrameKind::Condition);
                run_pipeline_commands(&mut guard, &self.commands)?;
            }
            env.exit_status = if env.exit_status.is_successful() {
                ExitStatus::FAILURE
            } else {
                ExitStatus::SUCCESS
            };
            // A negated pipeline is exempt from ErrExit.
            Continue(())
        } else {
            run_pipeline_commands(env, &self.commands)?;
            apply_errexit(env)
        }
    }
}

/// Executes the commands of a pipeline.
///
/// A pipeline of one command runs in the current execution environment, so
/// its side effects (`cd`, assignments) persist. A longer pipeline forks
/// one child per member.
fn run_pipeline_commands(env: &mut Env, commands: &[Command]) -> Result {
    match commands {
        [command] => command.execute(env),
        commands => pipeline::execute_members(env, commands),
    }
}

impl Execute for Command {
    fn execute(&self, env: &mut Env) -> Result {
        match self {
            Command::Simple(command) => command.execute(env),
            Command::Compound(command) => command.execute(env),
            Command::Function(definition) => definition.execute(env),
        }
    }
}

impl Execute for FunctionDefinition {
    fn execute(&self, env: &mut Env) -> Result {
        use oxsh_env::function::HashEntry;
        let name = self
            .name
            .to_string_if_literal()
            .unwrap_or_else(|| self.name.to_string());
        let entry = HashEntry::new(
            name,
            std::rc::Rc::clone(&self.body),
            self.name.location,
        );
        env.functions.replace(entry);
        env.exit_status = ExitStatus::SUCCESS;
        Continue(())
    }
}

/// Runs a function in a forked child, waiting for it to finish.
///
/// Used for subshells and as the building block of pipelines and command
/// substitution relatives. The child never returns: it exits with the
/// final exit status. The parent returns the child's wait result as an
/// exit status.
pub(crate) fn run_in_subshell<F>(env: &mut Env, kind: FrameKind, f: F) -> Result
where
    F: FnOnce(&mut Env) -> Result,
{
    use oxsh_env::system::{WaitPidFlag, WaitStatus};
    match env.system.fork() {
        Err(errno) => report_system_error(env, errno, "cannot fork"),
        Ok(oxsh_env::system::ForkResult::Child) => {
            env.traps.enter_subshell(&mut *env.system);
            let mut guard = env.push_frame(kind);
            let result = f(&mut guard);
            drop(guard);
            oxsh_env::semantics::apply_divert(result, env);
            crate::trap::run_exit_trap(env);
            let exit_code = env.exit_status.to_raw_exit_code();
            env.system.exit(exit_code.into())
        }
        Ok(oxsh_env::system::ForkResult::Parent { child }) => {
            let status = loop {
                match env.system.wait(child, WaitPidFlag::empty()) {
                    Ok(WaitStatus::Exited(_, code)) => break ExitStatus(code),
                    Ok(WaitStatus::Signaled(_, signal, _)) => break ExitStatus::from(signal),
                    Ok(_) => continue,
                    Err(Errno::EINTR) => continue,
                    Err(errno) => {
                        return report_system_error(env, errno, "cannot wait for subshell")
                    }
                }
            };
            env.exit_status = status;
            Continue(())
        }
    }
}
