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

//! Input/output helpers and diagnostic message formatting
//!
//! Every runtime diagnostic is one line on the standard error, of the form
//! `name: line N: message` where `name` is the name the shell or script was
//! invoked as and the `line N:` part is present when a source location is
//! known.

use crate::Env;
use oxsh_syntax::source::Location;

#[doc(no_inline)]
pub use oxsh_syntax::syntax::Fd;

/// Formats a diagnostic message.
#[must_use]
pub fn format_error(arg0: &str, location: Option<&Location>, message: &str) -> String {
    match location {
        Some(location) => format!("{arg0}: {location}: {message}\n"),
        None => format!("{arg0}: {message}\n"),
    }
}

/// Prints a one-line diagnostic message to the standard error.
pub fn print_error(env: &mut Env, location: Option<&Location>, message: &str) {
    let message = format_error(&env.arg0, location, message);
    print_to_fd(env, Fd::STDERR, message.as_bytes());
}

/// Writes the whole buffer to the given file descriptor, ignoring errors.
///
/// Diagnostics and built-in output must not panic or error-cascade when the
/// descriptor is closed or full; the write result is intentionally
/// discarded.
pub fn print_to_fd(env: &mut Env, fd: Fd, bytes: &[u8]) {
    let mut written = 0;
    while written < bytes.len() {
        match env.system.write(fd, &bytes[written..]) {
            Ok(0) | Err(_) => break,
            Ok(n) => written += n,
        }
    }
}
