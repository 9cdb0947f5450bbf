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

//! Type definitions for built-in utilities
//!
//! This module defines the interface between the command execution engine
//! and built-in implementations. The built-ins themselves live in a
//! separate crate and are registered into [`Env::builtins`](crate::Env) on
//! startup, so the set of built-ins is statically discoverable.

use crate::semantics::{Divert, ExitStatus};
use crate::Env;
use crate::semantics::Field;
use std::ops::ControlFlow;

/// Types of built-in utilities
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// Special built-in
    ///
    /// Special built-ins are found before functions in command search.
    /// Variable assignments on a special built-in persist, and an error in
    /// a special built-in interrupts a non-interactive shell.
    Special,

    /// Intrinsic regular built-in
    ///
    /// Regular built-ins are found after functions and do not require an
    /// external counterpart in `$PATH`.
    Intrinsic,
}

/// Result of built-in execution
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Result {
    /// Exit status of the built-in
    pub exit_status: ExitStatus,
    /// Control-flow divert the built-in requests, if any
    ///
    /// The `break`, `continue`, `return`, and `exit` built-ins are
    /// implemented by returning a divert here; the caller propagates it.
    pub divert: ControlFlow<Divert>,
}

impl Result {
    /// Creates a result with the given exit status and no divert.
    #[must_use]
    pub fn new(exit_status: ExitStatus) -> Result {
        Result {
            exit_status,
            divert: ControlFlow::Continue(()),
        }
    }

    /// Creates a result with the given divert.
    ///
    /// The exit status is used if the divert does not carry one.
    #[must_use]
    pub fn with_divert(exit_status: ExitStatus, divert: Divert) -> Result {
        Result {
            exit_status,
            divert: ControlFlow::Break(divert),
        }
    }
}

impl From<ExitStatus> for Result {
    fn from(exit_status: ExitStatus) -> Result {
        Result::new(exit_status)
    }
}

/// Type of functions that implement built-ins
///
/// A built-in receives the environment and its arguments (not including
/// the command name) and returns its exit status and optional divert.
pub type Main = fn(&mut Env, Vec<Field>) -> Result;

/// Built-in utility definition
#[derive(Clone, Copy, Debug)]
pub struct Builtin {
    /// Type of the built-in
    pub r#type: Type,
    /// Function that implements the built-in
    pub execute: Main,
}
