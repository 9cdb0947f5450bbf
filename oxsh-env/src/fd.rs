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

//! File-descriptor bookkeeping for redirections
//!
//! Applying a redirection saves the previous state of the affected file
//! descriptor into an [`FdTable`]: the old descriptor is duplicated out
//! of the way (with the close-on-exec flag so executed programs never see
//! the copy), or recorded as closed if it was not open. The table is
//! owned by the guard of the command that applied the redirections, whose
//! lifetime coincides with the execution frame the redirections belong
//! to; [restoring](restore) undoes the redirections in reverse order.

use crate::system::System;
use oxsh_syntax::syntax::Fd;

/// Lowest file descriptor number used for saved copies
///
/// POSIX reserves descriptors 0 through 9 for the user; copies made to
/// save a descriptor across a redirection are placed at 10 or above.
pub const MIN_SAVED_FD: Fd = Fd(10);

/// How a redirected file descriptor was produced
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FdOrigin {
    /// Opened from a path
    File,
    /// Duplicated from another descriptor
    Dup,
    /// Reads from a here-document
    HereDoc,
}

/// Record of one applied redirection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SavedFd {
    /// Descriptor that was redirected
    pub fd: Fd,
    /// Where the previous descriptor was saved, or `None` if it was closed
    pub saved_as: Option<Fd>,
    /// How the new descriptor was produced
    pub origin: FdOrigin,
}

/// Saved file descriptors of one frame, in application order
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FdTable {
    entries: Vec<SavedFd>,
}

impl FdTable {
    /// Records an applied redirection.
    pub fn record(&mut self, entry: SavedFd) {
        self.entries.push(entry);
    }

    /// Whether any redirection has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns all records.
    pub fn take_entries(&mut self) -> Vec<SavedFd> {
        std::mem::take(&mut self.entries)
    }
}

/// Undoes recorded redirections, newest first.
///
/// Each redirected descriptor is closed and, if the previous descriptor
/// was saved, restored from (and the save slot closed). Errors are
/// ignored; restoration must not cascade.
pub fn restore(system: &mut dyn System, entries: Vec<SavedFd>) {
    for entry in entries.into_iter().rev() {
        match entry.saved_as {
            Some(saved) => {
                system.dup2(saved, entry.fd).ok();
                system.close(saved).ok();
            }
            None => {
                system.close(entry.fd).ok();
            }
        }
    }
}
