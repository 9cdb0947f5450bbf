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

//! This crate defines the word expansion and command execution semantics
//! of the shell.
//!
//! The [`expansion`] module implements the word expansion pipeline: tilde
//! expansion, parameter expansion, command substitution, and arithmetic
//! expansion produce an attributed character string, which field
//! splitting, pathname expansion, and quote removal turn into fields.
//!
//! The [`command`] module implements the [`Execute`] trait for the AST
//! types of the [`oxsh_syntax`] crate, driving the expansion and the
//! execution environment. Interruption of the normal control flow
//! (`break`, `continue`, `return`, `exit`, and shell errors) travels as
//! the [`Divert`](oxsh_env::semantics::Divert) value of execution
//! results.
//!
//! The [`runner`] module glues the stages together: it feeds input to the
//! lexer, performs alias substitution, parses, and executes, which is the
//! loop the shell's main program and the `eval` and `.` built-ins run.

pub mod command;
pub mod command_search;
pub mod expansion;
pub mod redir;
pub mod runner;
pub mod trap;

pub use command::Execute;
pub use runner::{read_eval_loop, run_string};
