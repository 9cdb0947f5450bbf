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

//! Cd built-in
//!
//! The **`cd`** built-in changes the working directory.
//!
//! # Syntax
//!
//! ```sh
//! cd [directory]
//! ```
//!
//! # Semantics
//!
//! Without an operand, the directory is the value of `HOME`. The
//! operand `-` names the previous working directory (`$OLDPWD`) and
//! prints the new directory. On success, `PWD` and `OLDPWD` are
//! updated.
//!
//! # Exit status
//!
//! Zero on success; 1 if the directory cannot be entered.

use crate::common::{output, report_failure};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::variable::Scope;
use oxsh_env::Env;
use std::ffi::CString;

/// Entry point for executing the `cd` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut print_new_directory = false;
    let target = match args.first().map(|field| field.value.as_str()) {
        None => match env.variables.get_value("HOME") {
            Some(home) => home.to_string(),
            None => return report_failure(env, "cd", "HOME not set"),
        },
        Some("-") => match env.variables.get_value("OLDPWD") {
            Some(oldpwd) => {
                print_new_directory = true;
                oldpwd.to_string()
            }
            None => return report_failure(env, "cd", "OLDPWD not set"),
        },
        Some(directory) => directory.to_string(),
    };

    let Ok(path) = CString::new(target.clone()) else {
        return report_failure(env, "cd", "invalid directory name");
    };
    let old_pwd = env.variables.get_value("PWD").map(str::to_owned);
    if let Err(errno) = env.system.chdir(&path) {
        let message = format!("{target}: {errno}");
        return report_failure(env, "cd", &message);
    }

    let new_pwd = match env.system.getcwd() {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(_) => target,
    };
    if let Some(old_pwd) = old_pwd {
        env.variables
            .assign(Scope::Global, "OLDPWD", Some(old_pwd))
            .ok();
    }
    env.variables
        .assign(Scope::Global, "PWD", Some(new_pwd.clone()))
        .ok();

    if print_new_directory {
        output(env, &new_pwd);
        output(env, "\n");
    }
    Result::new(ExitStatus::SUCCESS)
}
