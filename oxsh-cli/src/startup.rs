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

//! Shell startup
//!
//! This module prepares an execution environment from the invocation:
//! parsing the command line, importing the inherited environment as
//! exported variables, and initializing the standard variables.

pub mod args;

use oxsh_env::option::ShellOption;
use oxsh_env::variable::Scope;
use oxsh_env::Env;

/// Variables initialized at startup unless inherited
const DEFAULT_VARIABLES: &[(&str, &str)] = &[
    ("IFS", " \t\n"),
    ("PS1", "$ "),
    ("PS2", "> "),
    ("PS4", "+ "),
    ("OPTIND", "1"),
];

/// Imports the inherited environment and initializes standard variables.
///
/// Every well-formed `NAME=value` in the inherited environment becomes an
/// exported variable. `PWD` is set to the working directory (unless a
/// valid inherited value exists), `PPID` to the parent process ID, and
/// `IFS`, `PS1`, `PS2`, and `PS4` to their defaults when absent.
pub fn init_variables<I>(env: &mut Env, inherited: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (name, value) in inherited {
        if is_name(&name) {
            env.variables.assign(Scope::Global, &name, Some(value)).ok();
            env.variables.set_exported(&name, true);
        }
    }

    for &(name, value) in DEFAULT_VARIABLES {
        if env.variables.get_value(name).is_none() {
            env.variables
                .assign(Scope::Global, name, Some(value.to_string()))
                .ok();
        }
    }

    let ppid = env.system.getppid().to_string();
    env.variables
        .assign(Scope::Global, "PPID", Some(ppid))
        .ok();

    if let Ok(pwd) = env.system.getcwd() {
        let pwd = pwd.to_string_lossy().into_owned();
        if env.variables.get_value("PWD") != Some(&pwd) {
            env.variables.assign(Scope::Global, "PWD", Some(pwd)).ok();
        }
        env.variables.set_exported("PWD", true);
    }
}

/// Whether the string is a well-formed variable name.
fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Decides whether the shell should be implicitly interactive.
///
/// As per POSIX, a shell reading from the standard input with no operands
/// is interactive if its standard input and standard error are attached
/// to a terminal.
pub fn auto_interactive(env: &Env, invocation: &args::Invocation) -> bool {
    use oxsh_syntax::syntax::Fd;
    if invocation.source != args::Source::Stdin {
        return false;
    }
    if invocation
        .option_settings
        .iter()
        .any(|&(option, _)| option == ShellOption::Interactive)
    {
        return false;
    }
    env.system.isatty(Fd::STDIN) && env.system.isatty(Fd::STDERR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert!(is_name("PATH"));
        assert!(is_name("_x1"));
        assert!(!is_name("1x"));
        assert!(!is_name("a-b"));
        assert!(!is_name(""));
    }
}
