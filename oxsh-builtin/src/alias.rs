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

//! Alias built-in
//!
//! The **`alias`** built-in defines or prints aliases.
//!
//! # Syntax
//!
//! ```sh
//! alias [name[=value]...]
//! ```
//!
//! # Semantics
//!
//! An operand with `=` defines an alias; one without prints the named
//! alias. Without operands, all aliases are printed in a re-inputtable
//! form.
//!
//! # Exit status
//!
//! Zero on success; 1 if a named alias is not defined.

use crate::common::{output, quote};
use itertools::Itertools;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;
use oxsh_syntax::alias::HashEntry;

fn print_all(env: &mut Env) -> Result {
    let lines = env
        .aliases
        .iter()
        .map(|entry| format!("alias {}={}\n", entry.0.name, quote(&entry.0.replacement)))
        .sorted()
        .collect::<String>();
    output(env, &lines);
    Result::new(ExitStatus::SUCCESS)
}

/// Entry point for executing the `alias` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        return print_all(env);
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in &args {
        match operand.value.split_once('=') {
            Some((name, value)) => {
                env.aliases
                    .replace(HashEntry::new(name.to_string(), value.to_string()));
            }
            None => match env.aliases.get(operand.value.as_str()) {
                Some(entry) => {
                    let line =
                        format!("alias {}={}\n", entry.0.name, quote(&entry.0.replacement));
                    output(env, &line);
                }
                None => {
                    let message = format!("{}: no such alias", operand.value);
                    env.print_error(Some(&operand.origin), &message);
                    exit_status = ExitStatus::FAILURE;
                }
            },
        }
    }
    Result::new(exit_status)
}
