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

//! Command search
//!
//! The name of a simple command resolves, in order, to a special
//! built-in, a function, a regular built-in, or an executable found by a
//! `PATH` search. A name containing a slash bypasses the search entirely.
//! Successful `PATH` searches are remembered in the command hash table,
//! which is consulted before searching again.

use oxsh_env::builtin::{Builtin, Type};
use oxsh_env::function::Function;
use oxsh_env::Env;
use std::ffi::CString;
use std::rc::Rc;

/// Result of command search
#[derive(Clone, Debug)]
pub enum Target {
    /// Special built-in utility
    SpecialBuiltin(Builtin),
    /// Function
    Function(Rc<Function>),
    /// Regular built-in utility
    Builtin(Builtin),
    /// External utility at the given path
    External {
        /// Path to the executable
        path: CString,
    },
    /// Nothing found
    NotFound,
}

/// Searches for the target of a command name.
pub fn search(env: &mut Env, name: &str) -> Target {
    if name.contains('/') {
        return match CString::new(name) {
            Ok(path) => Target::External { path },
            Err(_) => Target::NotFound,
        };
    }

    if let Some(&builtin) = env.builtins.get(name) {
        if builtin.r#type == Type::Special {
            return Target::SpecialBuiltin(builtin);
        }
    }

    if let Some(entry) = env.functions.get(name) {
        return Target::Function(Rc::clone(&entry.0));
    }

    if let Some(&builtin) = env.builtins.get(name) {
        return Target::Builtin(builtin);
    }

    if let Some(path) = env.hashed_commands.get(name) {
        if let Ok(path) = CString::new(path.as_str()) {
            return Target::External { path };
        }
    }

    match search_path(env, name) {
        Some(path) => {
            env.hashed_commands
                .insert(name.to_string(), path.to_string_lossy().into_owned());
            Target::External { path }
        }
        None => Target::NotFound,
    }
}

/// Walks `$PATH` looking for an executable file with the given name.
///
/// An empty `PATH` element names the current directory.
pub fn search_path(env: &mut Env, name: &str) -> Option<CString> {
    let path = env.variables.get_value("PATH").unwrap_or("").to_string();
    for dir in path.split(':') {
        let candidate = if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        };
        let Ok(candidate) = CString::new(candidate) else {
            continue;
        };
        if env.system.is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use oxsh_env::builtin;
    use oxsh_env::semantics::{ExitStatus, Field};
    use oxsh_env::system::test_helper::DummySystem;

    fn dummy_builtin(env: &mut Env, _args: Vec<Field>) -> builtin::Result {
        let _ = env;
        builtin::Result::new(ExitStatus::SUCCESS)
    }

    fn test_env() -> Env {
        Env::new(Box::new(DummySystem::default()))
    }

    fn define_function(env: &mut Env, name: &str) {
        use oxsh_env::function::HashEntry;
        use oxsh_syntax::source::Location;
        use oxsh_syntax::syntax::{CompoundCommand, FullCompoundCommand, List};
        env.functions.insert(HashEntry::new(
            name.to_string(),
            Rc::new(FullCompoundCommand {
                command: CompoundCommand::Grouping(List(vec![])),
                redirs: vec![],
            }),
            Location::dummy(),
        ));
    }

    #[test]
    fn special_builtin_beats_function() {
        let mut env = test_env();
        env.builtins.insert(
            "special",
            Builtin {
                r#type: Type::Special,
                execute: dummy_builtin,
            },
        );
        define_function(&mut env, "special");
        assert_matches!(search(&mut env, "special"), Target::SpecialBuiltin(_));
    }

    #[test]
    fn function_beats_regular_builtin() {
        let mut env = test_env();
        env.builtins.insert(
            "regular",
            Builtin {
                r#type: Type::Intrinsic,
                execute: dummy_builtin,
            },
        );
        define_function(&mut env, "regular");
        assert_matches!(search(&mut env, "regular"), Target::Function(_));
    }

    #[test]
    fn regular_builtin_without_function() {
        let mut env = test_env();
        env.builtins.insert(
            "regular",
            Builtin {
                r#type: Type::Intrinsic,
                execute: dummy_builtin,
            },
        );
        assert_matches!(search(&mut env, "regular"), Target::Builtin(_));
    }

    #[test]
    fn slash_bypasses_search() {
        let mut env = test_env();
        assert_matches!(
            search(&mut env, "/bin/echo"),
            Target::External { path } => {
                assert_eq!(path.to_str().unwrap(), "/bin/echo");
            }
        );
    }

    #[test]
    fn hashed_command_is_reused() {
        let mut env = test_env();
        env.hashed_commands
            .insert("tool".to_string(), "/opt/tool".to_string());
        assert_matches!(
            search(&mut env, "tool"),
            Target::External { path } => {
                assert_eq!(path.to_str().unwrap(), "/opt/tool");
            }
        );
    }

    #[test]
    fn nothing_found() {
        // The dummy system has no executable files at all.
        let mut env = test_env();
        assert_matches!(search(&mut env, "nosuch"), Target::NotFound);
    }
}
