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

//! Entry point of the oxsh shell
//!
//! This crate ties the other crates together into the `oxsh` binary: it
//! parses the invocation, builds the execution environment, runs the
//! commands from the selected source, and converts the final state into
//! the process exit status.

pub mod startup;

use oxsh_env::option::ShellOption;
use oxsh_env::semantics::{Divert, ExitStatus};
use oxsh_env::system::{Mode, OFlag};
use oxsh_env::Env;
use oxsh_semantics::trap::run_exit_trap;
use oxsh_syntax::syntax::Fd;
use startup::args::{Invocation, Source};
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};

/// Runs the shell in a prepared environment.
///
/// Returns the exit status the shell process should report. The `EXIT`
/// trap runs before this function returns.
pub fn run(env: &mut Env, invocation: Invocation) -> ExitStatus {
    oxsh_builtin::register(env);

    for (option, state) in &invocation.option_settings {
        env.options.set(*option, *state);
    }
    env.variables.positional_params_mut().values = invocation.positional_params.clone();

    let result = match &invocation.source {
        Source::CommandString {
            command,
            command_name,
        } => {
            env.options.set(ShellOption::CmdLine, true);
            if let Some(command_name) = command_name {
                env.arg0 = command_name.clone();
            }
            oxsh_semantics::run_string(env, command)
        }

        Source::Stdin => {
            env.options.set(ShellOption::Stdin, true);
            oxsh_semantics::read_eval_loop(env, Fd::STDIN)
        }

        Source::File { path } => {
            env.arg0 = path.clone();
            match open_script(env, path) {
                Ok(fd) => {
                    let result = oxsh_semantics::read_eval_loop(env, fd);
                    env.system.close(fd).ok();
                    result
                }
                Err(message) => {
                    env.print_error(None, &message);
                    env.exit_status = ExitStatus::NOT_FOUND;
                    Continue(())
                }
            }
        }
    };

    match result {
        Continue(()) => {}
        Break(divert) => {
            if let Some(exit_status) = divert.exit_status() {
                env.exit_status = exit_status;
            }
            // A stray return at the top level of a script acts like exit.
            if let Divert::Return(Some(exit_status)) = divert {
                env.exit_status = exit_status;
            }
        }
    }

    run_exit_trap(env);
    env.exit_status
}

/// Opens the script file named on the command line.
fn open_script(env: &mut Env, path: &str) -> Result<Fd, String> {
    let c_path =
        CString::new(path).map_err(|_| format!("{path}: invalid script file name"))?;
    env.system
        .open(&c_path, OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())
        .map_err(|errno| format!("cannot open script file '{path}': {errno}"))
}

/// Prepares the environment and runs the shell with the real system.
///
/// This is the whole `main` of the `oxsh` binary. The first element of
/// `arguments` is the name the shell was invoked as; the rest is parsed
/// as the POSIX `sh` command line.
pub fn main_with_args<I>(arguments: I) -> ExitStatus
where
    I: IntoIterator<Item = String>,
{
    // SAFETY: this is the only place a system is created in the process.
    let system = unsafe { oxsh_env::system::RealSystem::new() };
    let mut env = Env::new(Box::new(system));

    let mut arguments = arguments.into_iter();
    env.arg0 = arguments.next().unwrap_or_else(|| "oxsh".to_string());

    let invocation = match startup::args::parse(arguments) {
        Ok(invocation) => invocation,
        Err(error) => {
            let message = error.to_string();
            env.print_error(None, &message);
            return ExitStatus::ERROR;
        }
    };

    startup::init_variables(&mut env, std::env::vars());
    if startup::auto_interactive(&env, &invocation) {
        env.options.set(ShellOption::Interactive, true);
    }

    run(&mut env, invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use startup::args::parse;

    #[test]
    fn invocation_smoke_test() {
        let invocation =
            parse(["-e", "-c", "exit 3"].iter().map(|s| s.to_string())).unwrap();
        assert_eq!(
            invocation.option_settings,
            [(ShellOption::ErrExit, true)]
        );
        assert!(matches!(invocation.source, Source::CommandString { .. }));
    }
}
