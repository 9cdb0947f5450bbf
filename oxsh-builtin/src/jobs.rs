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

//! Jobs built-in
//!
//! The **`jobs`** built-in reports the status of jobs. Each job is
//! printed as `[n] + state command`, where `+` marks the current job
//! and `-` the previous one. Reported finished jobs are removed from
//! the job set.

use crate::common::output;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `jobs` built-in
pub fn main(env: &mut Env, _args: Vec<Field>) -> Result {
    let current = env.jobs.current_job();
    let previous = env.jobs.previous_job();

    let mut lines = String::new();
    let mut keys = Vec::new();
    for (key, job) in env.jobs.iter() {
        let marker = if Some(key) == current {
            '+'
        } else if Some(key) == previous {
            '-'
        } else {
            ' '
        };
        lines.push_str(&format!(
            "[{}] {} {}  {}\n",
            job.number,
            marker,
            job.state(),
            job.name(),
        ));
        keys.push(key);
    }
    output(env, &lines);

    for key in keys {
        if let Some(job) = env.jobs.get_mut(key) {
            job.is_notified = true;
        }
    }
    env.jobs.remove_reapable();
    Result::new(ExitStatus::SUCCESS)
}
