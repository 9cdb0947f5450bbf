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

//! Implementations of built-in utilities.
//!
//! Each utility lives in its own module, named after it. The [`BUILTINS`]
//! table lists every built-in with its [type](Type); [`register`] loads
//! the table into an execution environment, which is what the shell's
//! startup code calls. Keeping the whole set in one static table makes
//! the built-ins statically discoverable.

pub mod alias;
pub mod bg;
pub mod r#break;
pub mod cd;
pub mod colon;
pub mod command;
pub mod r#continue;
pub mod echo;
pub mod eval;
pub mod exec;
pub mod exit;
pub mod export;
pub mod r#false;
pub mod fg;
pub mod hash;
pub mod jobs;
pub mod kill;
pub mod local;
pub mod printf;
pub mod pwd;
pub mod read;
pub mod readonly;
pub mod r#return;
pub mod set;
pub mod shift;
pub mod source;
pub mod test;
pub mod times;
pub mod trap;
pub mod r#true;
pub mod r#type;
pub mod umask;
pub mod unalias;
pub mod unset;
pub mod wait;

mod common;

use oxsh_env::builtin::{Builtin, Type};
use oxsh_env::Env;

/// All the built-in utilities with their types
pub const BUILTINS: &[(&str, Builtin)] = &[
    (
        ":",
        Builtin {
            r#type: Type::Special,
            execute: colon::main,
        },
    ),
    (
        ".",
        Builtin {
            r#type: Type::Special,
            execute: source::main,
        },
    ),
    (
        "break",
        Builtin {
            r#type: Type::Special,
            execute: r#break::main,
        },
    ),
    (
        "continue",
        Builtin {
            r#type: Type::Special,
            execute: r#continue::main,
        },
    ),
    (
        "eval",
        Builtin {
            r#type: Type::Special,
            execute: eval::main,
        },
    ),
    (
        "exec",
        Builtin {
            r#type: Type::Special,
            execute: exec::main,
        },
    ),
    (
        "exit",
        Builtin {
            r#type: Type::Special,
            execute: exit::main,
        },
    ),
    (
        "export",
        Builtin {
            r#type: Type::Special,
            execute: export::main,
        },
    ),
    (
        "readonly",
        Builtin {
            r#type: Type::Special,
            execute: readonly::main,
        },
    ),
    (
        "return",
        Builtin {
            r#type: Type::Special,
            execute: r#return::main,
        },
    ),
    (
        "set",
        Builtin {
            r#type: Type::Special,
            execute: set::main,
        },
    ),
    (
        "shift",
        Builtin {
            r#type: Type::Special,
            execute: shift::main,
        },
    ),
    (
        "times",
        Builtin {
            r#type: Type::Special,
            execute: times::main,
        },
    ),
    (
        "trap",
        Builtin {
            r#type: Type::Special,
            execute: trap::main,
        },
    ),
    (
        "unset",
        Builtin {
            r#type: Type::Special,
            execute: unset::main,
        },
    ),
    (
        "alias",
        Builtin {
            r#type: Type::Intrinsic,
            execute: alias::main,
        },
    ),
    (
        "bg",
        Builtin {
            r#type: Type::Intrinsic,
            execute: bg::main,
        },
    ),
    (
        "cd",
        Builtin {
            r#type: Type::Intrinsic,
            execute: cd::main,
        },
    ),
    (
        "command",
        Builtin {
            r#type: Type::Intrinsic,
            execute: command::main,
        },
    ),
    (
        "echo",
        Builtin {
            r#type: Type::Intrinsic,
            execute: echo::main,
        },
    ),
    (
        "false",
        Builtin {
            r#type: Type::Intrinsic,
            execute: r#false::main,
        },
    ),
    (
        "fg",
        Builtin {
            r#type: Type::Intrinsic,
            execute: fg::main,
        },
    ),
    (
        "hash",
        Builtin {
            r#type: Type::Intrinsic,
            execute: hash::main,
        },
    ),
    (
        "jobs",
        Builtin {
            r#type: Type::Intrinsic,
            execute: jobs::main,
        },
    ),
    (
        "kill",
        Builtin {
            r#type: Type::Intrinsic,
            execute: kill::main,
        },
    ),
    (
        "local",
        Builtin {
            r#type: Type::Intrinsic,
            execute: local::main,
        },
    ),
    (
        "printf",
        Builtin {
            r#type: Type::Intrinsic,
            execute: printf::main,
        },
    ),
    (
        "pwd",
        Builtin {
            r#type: Type::Intrinsic,
            execute: pwd::main,
        },
    ),
    (
        "read",
        Builtin {
            r#type: Type::Intrinsic,
            execute: read::main,
        },
    ),
    (
        "test",
        Builtin {
            r#type: Type::Intrinsic,
            execute: test::main,
        },
    ),
    (
        "[",
        Builtin {
            r#type: Type::Intrinsic,
            execute: test::bracket_main,
        },
    ),
    (
        "true",
        Builtin {
            r#type: Type::Intrinsic,
            execute: r#true::main,
        },
    ),
    (
        "type",
        Builtin {
            r#type: Type::Intrinsic,
            execute: r#type::main,
        },
    ),
    (
        "umask",
        Builtin {
            r#type: Type::Intrinsic,
            execute: umask::main,
        },
    ),
    (
        "unalias",
        Builtin {
            r#type: Type::Intrinsic,
            execute: unalias::main,
        },
    ),
    (
        "wait",
        Builtin {
            r#type: Type::Intrinsic,
            execute: wait::main,
        },
    ),
];

/// Registers all the built-ins in the environment.
pub fn register(env: &mut Env) {
    for &(name, builtin) in BUILTINS {
        env.builtins.insert(name, builtin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::system::test_helper::DummySystem;

    #[test]
    fn register_defines_every_builtin() {
        let mut env = Env::new(Box::new(DummySystem::default()));
        register(&mut env);
        for &(name, _) in BUILTINS {
            assert!(env.builtins.contains_key(name), "missing builtin {name}");
        }
        assert_eq!(env.builtins.len(), BUILTINS.len());
    }

    #[test]
    fn special_builtins_match_posix_list() {
        let specials: Vec<&str> = BUILTINS
            .iter()
            .filter(|(_, b)| b.r#type == Type::Special)
            .map(|&(name, _)| name)
            .collect();
        for name in [
            ":", ".", "break", "continue", "eval", "exec", "exit", "export", "readonly",
            "return", "set", "shift", "times", "trap", "unset",
        ] {
            assert!(specials.contains(&name), "{name} must be special");
        }
    }
}
