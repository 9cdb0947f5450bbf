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

//! Unalias built-in
//!
//! The **`unalias`** built-in removes alias definitions.
//!
//! # Syntax
//!
//! ```sh
//! unalias -a
//! unalias name...
//! ```
//!
//! # Exit status
//!
//! Zero on success; 1 if a named alias is not defined.

use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `unalias` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.first().map(|f| f.value.as_str()) == Some("-a") {
        env.aliases.clear();
        return Result::new(ExitStatus::SUCCESS);
    }

    let mut exit_status = ExitStatus::SUCCESS;
    for operand in &args {
        if !env.aliases.remove(operand.value.as_str()) {
            let message = format!("{}: no such alias", operand.value);
            env.print_error(Some(&operand.origin), &message);
            exit_status = ExitStatus::FAILURE;
        }
    }
    Result::new(exit_status)
}
