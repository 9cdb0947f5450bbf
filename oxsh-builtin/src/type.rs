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

//! Type built-in
//!
//! The **`type`** built-in describes how each operand would be
//! interpreted as a command name.
//!
//! # Exit status
//!
//! Zero if every operand was resolved; 1 otherwise.

use crate::common::output;
use oxsh_env::builtin::{Result, Type};
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;
use oxsh_semantics::command_search::search_path;
use std::str::FromStr;

fn describe(env: &mut Env, name: &str) -> Option<String> {
    if oxsh_syntax::lex::Keyword::from_str(name).is_ok() {
        return Some(format!("{name} is a shell keyword"));
    }
    if let Some(entry) = env.aliases.get(name) {
        return Some(format!(
            "{name} is an alias for {}",
            entry.0.replacement.clone()
        ));
    }
    if let Some(builtin) = env.builtins.get(name) {
        return Some(match builtin.r#type {
            Type::Special => format!("{name} is a special shell builtin"),
            Type::Intrinsic => format!("{name} is a shell builtin"),
        });
    }
    if env.functions.get(name).is_some() {
        return Some(format!("{name} is a shell function"));
    }
    search_path(env, name).map(|path| format!("{name} is {}", path.to_string_lossy()))
}

/// Entry point for executing the `type` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let mut exit_status = ExitStatus::SUCCESS;
    for operand in &args {
        match describe(env, &operand.value) {
            Some(description) => {
                output(env, &description);
                output(env, "\n");
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
