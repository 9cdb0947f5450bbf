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

//! Signal types and name conversion

use std::str::FromStr;

#[doc(no_inline)]
pub use nix::sys::signal::Signal;

/// Parses a signal specification as used by the `trap` and `kill`
/// built-ins.
///
/// A specification is a signal number (`15`), a name without the `SIG`
/// prefix (`TERM`), or a full name (`SIGTERM`). Names are matched case
/// insensitively.
#[must_use]
pub fn parse_signal(spec: &str) -> Option<Signal> {
    if let Ok(number) = spec.parse::<i32>() {
        return Signal::try_from(number).ok();
    }
    let upper = spec.to_ascii_uppercase();
    let name = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };
    Signal::from_str(&name).ok()
}

/// Returns the conventional name of the signal without the `SIG` prefix.
#[must_use]
pub fn signal_name(signal: Signal) -> &'static str {
    let name = signal.as_str();
    name.strip_prefix("SIG").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_by_number() {
        assert_eq!(parse_signal("15"), Some(Signal::SIGTERM));
        assert_eq!(parse_signal("9"), Some(Signal::SIGKILL));
        assert_eq!(parse_signal("12345"), None);
    }

    #[test]
    fn parse_by_name() {
        assert_eq!(parse_signal("TERM"), Some(Signal::SIGTERM));
        assert_eq!(parse_signal("SIGTERM"), Some(Signal::SIGTERM));
        assert_eq!(parse_signal("term"), Some(Signal::SIGTERM));
        assert_eq!(parse_signal("INT"), Some(Signal::SIGINT));
        assert_eq!(parse_signal("NOSUCH"), None);
    }

    #[test]
    fn names_have_no_prefix() {
        assert_eq!(signal_name(Signal::SIGINT), "INT");
        assert_eq!(signal_name(Signal::SIGQUIT), "QUIT");
    }
}
