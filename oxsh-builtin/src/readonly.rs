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

//! Readonly built-in
//!
//! The **`readonly`** built-in makes variables read-only.
//!
//! # Syntax
//!
//! ```sh
//! readonly [-p] [name[=value]...]
//! ```
//!
//! # Semantics
//!
//! Each *name* becomes read-only; with `=value`, the variable is
//! assigned first. A read-only variable can no longer be assigned or
//! unset. Without operands (or with `-p`), the read-only variables are
//! printed in a re-inputtable form.
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

fn print_read_only(env: &mut Env) -> Result {
    let lines = env
        .variables
        .iter()
        .filter(|(_, variable)| variable.is_read_only())
        .map(|(name, variable)| match &variable.value {
            Some(value) => format!("readonly {name}={}\n", quote(value)),
            None => format!("readonly {name}\n"),
        })
        .sorted()
        .collect::<String>();
    output(env, &lines);
    Result::new(ExitStatus::SUCCESS)
}

/// Entry point for executing the `readonly` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let operands: Vec<&Field> = args.iter().filter(|f| f.value != "-p").collect();
    if operands.is_empty() {
        return print_read_only(env);
    }

    for operand in operands {
        let (name, value) = match operand.value.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (operand.value.as_str(), None),
        };
        if let Some(value) = value {
            if let Err(error) = env.variables.assign(Scope::Global, name, Some(value)) {
                let message = error.to_string();
                return report_error(env, "readonly", &message);
            }
        }
        let location = operand.origin;
        env.variables.set_read_only(name, location);
    }
    Result::new(ExitStatus::SUCCESS)
}
