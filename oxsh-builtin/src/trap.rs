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

//! Trap built-in
//!
//! The **`trap`** built-in sets or prints the actions taken when the
//! shell receives signals or exits.
//!
//! # Syntax
//!
//! ```sh
//! trap [action condition...]
//! ```
//!
//! # Semantics
//!
//! Each *condition* is a signal name (with or without the `SIG`
//! prefix), a signal number, or `EXIT` (or `0`). The *action* `-`
//! resets the condition to the default behavior, an empty action ignores
//! the condition, and any other action is a command string executed when
//! the condition occurs. Without operands, the current settings are
//! printed in a re-inputtable form.
//!
//! # Exit status
//!
//! Zero on success; 2 on an invalid condition or an untrappable signal.

use crate::common::{output, quote, report_error};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::signal::parse_signal;
use oxsh_env::trap::{Action, Condition};
use oxsh_env::Env;

fn print_traps(env: &mut Env) -> Result {
    let mut lines = String::new();
    for (condition, action) in env.traps.iter() {
        let action = match action {
            Action::Default => continue,
            Action::Ignore => String::from("''"),
            Action::Command(command) => quote(command),
        };
        lines.push_str(&format!("trap -- {action} {condition}\n"));
    }
    output(env, &lines);
    Result::new(ExitStatus::SUCCESS)
}

fn parse_condition(spec: &str) -> Option<Condition> {
    if spec == "EXIT" || spec == "0" {
        return Some(Condition::Exit);
    }
    parse_signal(spec).map(Condition::Signal)
}

/// Entry point for executing the `trap` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let Some((action, conditions)) = args.split_first() else {
        return print_traps(env);
    };
    if conditions.is_empty() {
        return report_error(env, "trap", "missing condition operand");
    }

    let action = match action.value.as_str() {
        "-" => Action::Default,
        "" => Action::Ignore,
        command => Action::Command(command.into()),
    };

    for condition in conditions {
        let Some(condition) = parse_condition(&condition.value) else {
            let message = format!("invalid condition `{}`", condition.value);
            return report_error(env, "trap", &message);
        };
        let result = {
            let Env { traps, system, .. } = env;
            traps.set_action(&mut **system, condition, action.clone())
        };
        if let Err(error) = result {
            let message = error.to_string();
            return report_error(env, "trap", &message);
        }
    }
    Result::new(ExitStatus::SUCCESS)
}
