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

//! Umask built-in
//!
//! The **`umask`** built-in prints or sets the file mode creation mask.
//!
//! # Syntax
//!
//! ```sh
//! umask [mode]
//! ```
//!
//! # Semantics
//!
//! Without an operand, the current mask is printed in octal. An octal
//! *mode* operand replaces the mask. Symbolic modes are not supported.
//!
//! # Exit status
//!
//! Zero on success; 2 on an invalid mode.

use crate::common::{output, report_error};
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::system::Mode;
use oxsh_env::Env;

/// Entry point for executing the `umask` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    match args.first() {
        None => {
            // Setting the mask is the only way to read it; restore right
            // away.
            let current = env.system.umask(Mode::empty());
            env.system.umask(current);
            let line = format!("{:04o}\n", current.bits());
            output(env, &line);
            Result::new(ExitStatus::SUCCESS)
        }
        Some(operand) => match u32::from_str_radix(&operand.value, 8) {
            Ok(bits) if bits <= 0o777 => {
                env.system.umask(Mode::from_bits_truncate(bits));
                Result::new(ExitStatus::SUCCESS)
            }
            _ => report_error(env, "umask", "invalid octal mode"),
        },
    }
}
