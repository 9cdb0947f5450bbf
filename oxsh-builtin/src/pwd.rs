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

//! Pwd built-in
//!
//! The **`pwd`** built-in prints the absolute pathname of the working
//! directory.

use crate::common::{output, report_failure};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `pwd` built-in
pub fn main(env: &mut Env, _args: Vec<Field>) -> Result {
    match env.system.getcwd() {
        Ok(path) => {
            let line = format!("{}\n", path.to_string_lossy());
            output(env, &line);
            Result::new(ExitStatus::SUCCESS)
        }
        Err(errno) => {
            let message = errno.to_string();
            report_failure(env, "pwd", &message)
        }
    }
}
