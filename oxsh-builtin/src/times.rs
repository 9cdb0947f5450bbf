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

//! Times built-in
//!
//! The **`times`** built-in writes the accumulated user and system CPU
//! times of the shell and of its waited-for children, in the POSIX
//! `%dm%fs` format: one line for the shell, one for the children.

use crate::common::{output, report_failure};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

fn format_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor();
    let seconds = seconds - minutes * 60.0;
    format!("{minutes:.0}m{seconds:.6}s")
}

/// Entry point for executing the `times` built-in
pub fn main(env: &mut Env, _args: Vec<Field>) -> Result {
    let times = match env.system.times() {
        Ok(times) => times,
        Err(errno) => {
            let message = errno.to_string();
            return report_failure(env, "times", &message);
        }
    };
    let report = format!(
        "{} {}\n{} {}\n",
        format_time(times.self_user),
        format_time(times.self_system),
        format_time(times.children_user),
        format_time(times.children_system),
    );
    output(env, &report);
    Result::new(ExitStatus::SUCCESS)
}
