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

//! Set built-in
//!
//! The **`set`** built-in changes shell options and positional
//! parameters.
//!
//! # Syntax
//!
//! ```sh
//! set [±abCefhmnuvx] [±o [option]] [--] [argument...]
//! ```
//!
//! # Semantics
//!
//! A `-` letter turns the corresponding option on and a `+` letter
//! turns it off (for `-C`, `-f`, `-n`, and `-u`, "on" means the
//! restrictive behavior, matching the historical letters). `-o name`
//! sets a long-named option and `+o name` clears it; `-o` without a
//! name lists the option settings. Remaining operands replace the
//! positional parameters; `--` forces the remaining operands to be
//! taken as parameters even if they begin with `-`. `set` with no
//! arguments prints all variables.
//!
//! # Exit status
//!
//! Zero on success; 2 on an invalid option.

use crate::common::{output, quote, report_error};
use itertools::Itertools;
use oxsh_env::builtin::Result;
use oxsh_env::option::{option_for_letter, OName};
use oxsh_env::semantics::{ExitStatus, Field};
use oxsh_env::Env;

fn print_variables(env: &mut Env) -> Result {
    let lines = env
        .variables
        .iter()
        .filter_map(|(name, variable)| {
            let value = variable.value.as_ref()?;
            Some(format!("{name}={}\n", quote(value)))
        })
        .sorted()
        .collect::<String>();
    output(env, &lines);
    Result::new(ExitStatus::SUCCESS)
}

fn print_options(env: &mut Env) -> Result {
    let lines = env
        .options
        .iter()
        .map(|(option, state)| {
            let state = if state { "on" } else { "off" };
            format!("{option}\t{state}\n")
        })
        .collect::<String>();
    output(env, &lines);
    Result::new(ExitStatus::SUCCESS)
}

/// Entry point for executing the `set` built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    if args.is_empty() {
        return print_variables(env);
    }

    let mut arguments = args.iter().peekable();
    let mut replace_params = false;

    while let Some(argument) = arguments.peek() {
        let value = argument.value.as_str();
        let (enable, rest) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => match value.strip_prefix('+') {
                Some(rest) => (false, rest),
                None => {
                    replace_params = true;
                    break;
                }
            },
        };
        arguments.next();

        if value == "--" || value == "-" {
            replace_params = true;
            break;
        }

        for letter in rest.chars() {
            if letter == 'o' {
                let Some(name) = arguments.next() else {
                    return print_options(env);
                };
                let parsed: OName = match name.value.parse() {
                    Ok(parsed) => parsed,
                    Err(error) => {
                        let message = format!("{}: {error}", name.value);
                        return report_error(env, "set", &message);
                    }
                };
                let state = if enable { parsed.state } else { !parsed.state };
                env.options.set(parsed.option, state);
                continue;
            }

            match option_for_letter(letter) {
                Some((option, state)) if option.is_modifiable() => {
                    let state = if enable { state } else { !state };
                    env.options.set(option, state);
                }
                _ => {
                    let message = format!("invalid option letter `{letter}`");
                    return report_error(env, "set", &message);
                }
            }
        }
    }

    if replace_params || arguments.peek().is_some() {
        env.variables.positional_params_mut().values = arguments
            .map(|argument| argument.value.clone())
            .collect();
    }
    Result::new(ExitStatus::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::option::ShellOption;
    use oxsh_env::system::test_helper::DummySystem;

    fn test_env() -> Env {
        Env::new(Box::new(DummySystem::default()))
    }

    fn run(env: &mut Env, args: &[&str]) -> ExitStatus {
        main(env, Field::dummies(args.iter().copied())).exit_status
    }

    #[test]
    fn option_letters() {
        let mut env = test_env();
        assert_eq!(run(&mut env, &["-e"]), ExitStatus::SUCCESS);
        assert!(env.options.get(ShellOption::ErrExit));
        run(&mut env, &["+e"]);
        assert!(!env.options.get(ShellOption::ErrExit));

        // -u clears the (inverted) Unset option.
        run(&mut env, &["-u"]);
        assert!(!env.options.get(ShellOption::Unset));
        run(&mut env, &["+u"]);
        assert!(env.options.get(ShellOption::Unset));
    }

    #[test]
    fn long_options() {
        let mut env = test_env();
        run(&mut env, &["-o", "pipefail"]);
        assert!(env.options.get(ShellOption::PipeFail));
        run(&mut env, &["+o", "pipefail"]);
        assert!(!env.options.get(ShellOption::PipeFail));

        run(&mut env, &["-o", "noglob"]);
        assert!(!env.options.get(ShellOption::Glob));
    }

    #[test]
    fn positional_parameters() {
        let mut env = test_env();
        run(&mut env, &["--", "a", "b", "c"]);
        assert_eq!(env.variables.positional_params().values, ["a", "b", "c"]);

        run(&mut env, &["--"]);
        assert!(env.variables.positional_params().values.is_empty());

        run(&mut env, &["-e", "x", "-y"]);
        assert_eq!(env.variables.positional_params().values, ["x", "-y"]);
    }

    #[test]
    fn invalid_option() {
        let mut env = test_env();
        assert_eq!(run(&mut env, &["-Z"]), ExitStatus::ERROR);
    }
}
