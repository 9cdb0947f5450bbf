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

//! Hash built-in
//!
//! The **`hash`** built-in manages the table of remembered utility
//! locations.
//!
//! # Syntax
//!
//! ```sh
//! hash [-r] [utility...]
//! ```
//!
//! # Semantics
//!
//! Without operands, the remembered locations are printed. With `-r`,
//! the table is emptied. Each *utility* operand is searched for in
//! `$PATH` and its location remembered.
//!
//! # Exit status
//!
//! Zero on success; 1 if a utility was not found.

use crate::common::output;
use itertools::Itertools;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;
use oxsh_semantics::command_search::search_path;

/// Entry point for executing the `hash` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        let lines = env
            .hashed_commands
            .iter()
            .map(|(name, path)| format!("{name}\t{path}\n"))
            .sorted()
            .collect::<String>();
        output(env, &lines);
        return Result::new(ExitStatus::SUCCESS);
    }

    if args.first().map(|f| f.value.as_str()) == Some("-r") {
        env.hashed_commands.clear();
        return Result::new(ExitStatus::SUCCESS);
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in &args {
        match search_path(env, &operand.value) {
            Some(path) => {
                env.hashed_commands.insert(
                    operand.value.clone(),
                    path.to_string_lossy().into_owned(),
                );
            }
            None => {
                let message = format!("{}: not found", operand.value);
                env.print_error(Some(&operand.origin), &message);
                exit_status = ExitStatus::FAILURE;
            }
        }
    }
    Result::new(exit_status)
}
