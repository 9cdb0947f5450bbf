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

//! Kill built-in
//!
//! The **`kill`** built-in sends a signal to processes or jobs.
//!
//! # Syntax
//!
//! ```sh
//! kill [-signal | -s signal] pid...
//! ```
//!
//! # Semantics
//!
//! The signal defaults to `TERM`. A *pid* operand of the form `%n`
//! names job *n*, whose whole process group receives the signal.
//!
//! # Exit status
//!
//! Zero if every signal was sent; 1 if any send failed; 2 on a usage
//! error.

use crate::common::report_error;
use oxsh_env::builtin::Result;
use oxsh_env::job::Pid;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::signal::{parse_signal, Signal};
use oxsh_env::Env;

/// Resolves a process operand: a decimal process ID or a `%n` job
/// specification (signalling the job'"'"'s process group).
fn resolve_target(env: &Env, operand: &str) -> Option<Pid> {
    if let Some(job_spec) = operand.strip_prefix('%') {
        let number = job_spec.parse().ok()?;
        let key = env.jobs.find_by_number(number)?;
        let pgid = env.jobs.get(key)?.pgid;
        return Some(Pid::from_raw(-pgid.as_raw()));
    }
    operand.parse().ok().map(Pid::from_raw)
}

/// Entry point for executing the `kill` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut signal = Signal::SIGTERM;
    let mut operands = &args[..];

    match args.first().map(|f| f.value.as_str()) {
        Some("-s") => {
            let Some(name) = args.get(1) else {
                return report_error(env, "kill", "missing signal name");
            };
            let Some(parsed) = parse_signal(&name.value) else {
                let message = format!("invalid signal `{}`", name.value);
                return report_error(env, "kill", &message);
            };
            signal = parsed;
            operands = &args[2..];
        }
        Some(first) if first.starts_with('-') && first.len() > 1 => {
            let Some(parsed) = parse_signal(&first[1..]) else {
                let message = format!("invalid signal `{first}`");
                return report_error(env, "kill", &message);
            };
            signal = parsed;
            operands = &args[1..];
        }
        _ => {}
    }

    if operands.is_empty() {
        return report_error(env, "kill", "missing process operand");
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in operands {
        let Some(pid) = resolve_target(env, &operand.value) else {
            let message = format!("{}: no such process or job", operand.value);
            env.print_error(Some(&operand.origin), &message);
            exit_status = ExitStatus::FAILURE;
            continue;
        };
        if let Err(errno) = env.system.kill(pid, Some(signal)) {
            let message = format!("{}: {errno}", operand.value);
            env.print_error(Some(&operand.origin), &message);
            exit_status = ExitStatus::FAILURE;
        }
    }
    Result::new(exit_status)
}
