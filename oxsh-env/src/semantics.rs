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

//! Type definitions for command execution
//!
//! The executor communicates interruption of the normal control flow
//! (`return`, `break`, `continue`, `exit`) through the [`Divert`] value of a
//! [`Result`], which is [`std::ops::ControlFlow`]. Each syntactic construct
//! checks the result of its children and either handles the divert (a loop
//! handles `Break` and `Continue`) or propagates it upward.

use crate::signal;
use oxsh_syntax::source::Location;
use std::ffi::c_int;
use std::ops::ControlFlow;
use std::process::ExitCode;
use std::process::Termination;

/// Resultant string of word expansion
///
/// A field is a string accompanied by the location of the word it resulted
/// from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    /// String value of the field
    pub value: String,
    /// Location of the word this field resulted from
    pub origin: Location,
}

impl Field {
    /// Creates a new field with a dummy origin location.
    #[inline]
    pub fn dummy<S: Into<String>>(value: S) -> Field {
        Field {
            value: value.into(),
            origin: Location::dummy(),
        }
    }

    /// Creates an array of fields with dummy origin locations.
    pub fn dummies<I, S>(values: I) -> Vec<Field>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().map(Self::dummy).collect()
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

/// Number that summarizes the result of command execution
///
/// An exit status is an integer returned from a utility (or command) when
/// executed. In the shell language, the special parameter `$?` expands to
/// the exit status of the last executed command. Exit statuses also affect
/// the behavior of some compound commands.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub c_int);

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<c_int> for ExitStatus {
    fn from(value: c_int) -> ExitStatus {
        ExitStatus(value)
    }
}

impl From<ExitStatus> for c_int {
    fn from(exit_status: ExitStatus) -> c_int {
        exit_status.0
    }
}

/// Converts a signal to the corresponding exit status.
///
/// A command killed by signal _n_ has exit status 128 + _n_.
impl From<signal::Signal> for ExitStatus {
    fn from(signal: signal::Signal) -> Self {
        ExitStatus(0x80 + signal as c_int)
    }
}

impl ExitStatus {
    /// Exit status of 0: success
    pub const SUCCESS: ExitStatus = ExitStatus(0);

    /// Exit status of 1: failure
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Exit status of 2: error severer than failure
    pub const ERROR: ExitStatus = ExitStatus(2);

    /// Exit status of 126: command found but not executable
    pub const NOEXEC: ExitStatus = ExitStatus(126);

    /// Exit status of 127: command not found
    pub const NOT_FOUND: ExitStatus = ExitStatus(127);

    /// Returns true if and only if `self` is zero.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.0 == 0
    }

    /// Returns the lowest 8 bits of the exit status, which is what the
    /// process reports to its parent.
    #[must_use]
    pub const fn to_raw_exit_code(self) -> u8 {
        self.0 as u8
    }
}

/// Converts the exit status to `ExitCode`, keeping the lowest 8 bits.
impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        self.to_raw_exit_code().into()
    }
}

/// Result of interrupted command execution
///
/// `Divert` implements `Ord`; values are ordered by severity.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Divert {
    /// Continue the current loop.
    Continue {
        /// Number of loops to exit before continuing
        ///
        /// `0` continues the innermost loop, `1` the one-level-outer loop,
        /// and so on.
        count: usize,
    },

    /// Break the current loop.
    Break {
        /// Number of loops to break
        ///
        /// `0` breaks the innermost loop, `1` the one-level-outer loop, and
        /// so on.
        count: usize,
    },

    /// Return from the current function or dot script.
    Return(Option<ExitStatus>),

    /// Interrupt the current command.
    ///
    /// This is what a shell error raises: in an interactive shell it
    /// aborts the current command line and returns to the prompt; in a
    /// non-interactive shell it behaves like `Exit`.
    Interrupt(Option<ExitStatus>),

    /// Exit from the current shell execution environment.
    ///
    /// The shell exits after executing the `EXIT` trap, if any.
    Exit(Option<ExitStatus>),
}

impl Divert {
    /// Returns the exit status associated with the `Divert`, if any.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        use Divert::*;
        match self {
            Continue { .. } | Break { .. } => None,
            Return(exit_status) | Interrupt(exit_status) | Exit(exit_status) => *exit_status,
        }
    }
}

/// Result of command execution
///
/// If the command was interrupted in the middle of execution, the result is
/// a `Break` carrying the [`Divert`] that specifies what to do next.
pub type Result<T = ()> = ControlFlow<Divert, T>;

/// Extracts the continuation value, applying the divert's exit status to
/// the environment.
///
/// This is used at the boundaries that stop divert propagation, such as the
/// whole-shell entry point.
pub fn apply_divert(result: Result, env: &mut crate::Env) -> Option<Divert> {
    match result {
        ControlFlow::Continue(()) => None,
        ControlFlow::Break(divert) => {
            if let Some(exit_status) = divert.exit_status() {
                env.exit_status = exit_status;
            }
            Some(divert)
        }
    }
}
