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

//! Export built-in
//!
//! The **`export`** built-in marks variables for export to the
//! environment of subsequently executed commands.
//!
//! # Syntax
//!
//! ```sh
//! export [-p] [name[=value]...]
//! ```
//!
//! # Semantics
//!
//! Each *name* is marked exported; with `=value`, the variable is also
//! assigned. Without operands (or with `-p`), the currently exported
//! variables are printed in a re-inputtable form.
//!
//! # Exit status
//!
//! Zero on success; 2 on an assignment or usage error.

use crate::common::{output, quote, report_error};
use itertools::Itertools;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::variable::Scope;
use oxsh_env::Env;

fn print_exported(env: &mut Env) -> Result {
    let lines = env
        .variables
        .iter()
        .filter(|(_, variable)| variable.exported)
        .map(|(name, variable)| match &variable.value {
            Some(value) => format!("export {name}={}\n", quote(value)),
            None => format!("export {name}\n"),
        })
        .sorted()
        .collect::<String>();
    output(env, &lines);
    Result::new(ExitStatus::SUCCESS)
}

/// Entry point for executing the `export` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands: Vec<&Field> = args.iter().filter(|f| f.value != "-p").collect();
    if operands.is_empty() {
        return print_exported(env);
    }

    for operand in operands {
        let (name, value) = match operand.value.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (operand.value.as_str(), None),
        };
        if let Some(value) = value {
            if let Err(error) = env.variables.assign(Scope::Global, name, Some(value)) {
                let message = error.to_string();
                return report_error(env, "export", &message);
            }
        }
        env.variables.set_exported(name, true);
    }
    Result::new(ExitStatus::SUCCESS)
}
