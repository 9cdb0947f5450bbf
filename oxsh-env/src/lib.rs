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

//! This crate defines the shell execution environment.
//!
//! A shell execution environment is a collection of data that may affect or
//! be affected by the execution of commands. Application-managed parts
//! (variables, functions, aliases, options, traps, jobs) are implemented in
//! pure Rust in this crate. System-managed parts (file descriptors, the
//! working directory, the umask, processes) are reached through the
//! [`System`] trait, whose [`RealSystem`](system::RealSystem)
//! implementation talks to the underlying operating system.
//!
//! The [`Env`] struct aggregates all of it. Execution enters nested
//! contexts (subshells, functions, loops, dot scripts, trap handlers) by
//! pushing [frames](frame) onto the environment's frame stack; each frame
//! kind declares, per sub-store, whether the frame shares, owns, or copies
//! it, and popping the frame releases exactly what it acquired.

pub mod builtin;
pub mod fd;
pub mod frame;
pub mod function;
pub mod io;
pub mod job;
pub mod option;
pub mod semantics;
pub mod signal;
pub mod system;
pub mod trap;
pub mod variable;

use self::builtin::Builtin;
use self::frame::FrameStack;
use self::function::FunctionSet;
use self::job::JobSet;
use self::option::OptionSet;
use self::semantics::ExitStatus;
use self::system::System;
use self::trap::TrapSet;
use self::variable::VariableSet;
use std::collections::HashMap;

#[doc(no_inline)]
pub use oxsh_syntax::alias::AliasSet;

/// Whole shell execution environment
///
/// The environment is passed around as `&mut Env`; there is no global
/// state. Everything a command can observe or modify hangs off this
/// struct, directly or through the [`System`] handle.
#[derive(Debug)]
pub struct Env {
    /// Aliases defined in the environment
    pub aliases: AliasSet,

    /// Built-in utilities available in the environment
    pub builtins: HashMap<&'static str, Builtin>,

    /// Exit status of the last executed command (`$?`)
    pub exit_status: ExitStatus,

    /// Functions defined in the environment
    pub functions: FunctionSet,

    /// Remembered locations of executed utilities (the `hash` built-in)
    pub hashed_commands: HashMap<String, String>,

    /// Jobs managed in the environment
    pub jobs: JobSet,

    /// Shell options
    pub options: OptionSet,

    /// Name under which the shell was invoked (`$0`)
    pub arg0: String,

    /// Runtime execution context stack
    pub stack: FrameStack,

    /// Interface to the underlying operating system
    pub system: Box<dyn System>,

    /// Traps defined in the environment
    pub traps: TrapSet,

    /// Variables and positional parameters defined in the environment
    pub variables: VariableSet,
}

impl Env {
    /// Creates a new environment with the given system interface.
    ///
    /// All stores start out empty; built-ins and initial variables are
    /// registered by the startup code.
    #[must_use]
    pub fn new(system: Box<dyn System>) -> Env {
        Env {
            aliases: AliasSet::default(),
            builtins: HashMap::new(),
            exit_status: ExitStatus::SUCCESS,
            functions: FunctionSet::default(),
            hashed_commands: HashMap::new(),
            jobs: JobSet::default(),
            options: OptionSet::default(),
            arg0: String::new(),
            stack: FrameStack::default(),
            system,
            traps: TrapSet::default(),
            variables: VariableSet::default(),
        }
    }

    /// Whether the shell is interactive.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        use self::option::ShellOption::Interactive;
        self.options.get(Interactive)
    }

    /// Convenience method for printing an error message to the standard
    /// error.
    ///
    /// See [`io::print_error`] for the message format.
    pub fn print_error(&mut self, location: Option<&oxsh_syntax::source::Location>, message: &str) {
        io::print_error(self, location, message)
    }
}
