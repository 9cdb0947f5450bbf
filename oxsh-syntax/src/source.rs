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

//! Source code positions
//!
//! Every token, and hence every AST element, carries a [`Location`] that
//! names the line and column where the element starts. Locations are
//! rendered in diagnostics as `line N`, following the format required for
//! shell error messages.

use std::fmt;
use std::num::NonZeroU64;

/// Position of a syntactic element in the source code
///
/// Lines and columns count from one. A column is a character position, not a
/// byte position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    /// Line number, starting from 1
    pub line: NonZeroU64,
    /// Column number, starting from 1
    pub column: NonZeroU64,
}

impl Location {
    /// Creates a location pointing at the very beginning of the source.
    #[must_use]
    pub fn start() -> Location {
        Location {
            line: NonZeroU64::MIN,
            column: NonZeroU64::MIN,
        }
    }

    /// Creates a placeholder location for elements constructed without
    /// source code, as in tests.
    #[must_use]
    pub fn dummy() -> Location {
        Location::start()
    }
}

impl Default for Location {
    fn default() -> Location {
        Location::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}
