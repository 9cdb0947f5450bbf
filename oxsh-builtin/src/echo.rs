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

//! Echo built-in
//!
//! The **`echo`** built-in writes its arguments to the standard output,
//! separated by spaces and terminated by a newline. No options and no
//! escape sequences are interpreted; `printf` is the portable way to
//! format output.

use crate::common::output;
use itertools::Itertools;
use oxsh_env::builtin::Result;
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

/// Entry point for executing the `echo` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let line = args.iter().map(|field| field.value.as_str()).join(" ");
    output(env, &line);
    output(env, "\n");
    Result::new(ExitStatus::SUCCESS)
}
