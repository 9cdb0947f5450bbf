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

//! Command line argument parsing
//!
//! The shell accepts the POSIX `sh` invocation syntax:
//!
//! ```sh
//! sh [-abCefhimnuvx] [-o option] [+abCefhimnuvx] [+o option]
//!    [-c command_string | -s | script_file] [argument...]
//! ```
//!
//! A `-` letter selects the option's `-` state, a `+` letter the
//! opposite. `-c` takes the command string from the next operand, `-s`
//! reads the standard input, and otherwise the first operand names a
//! script file. Remaining operands become the positional parameters.

use oxsh_env::option::{option_for_letter, OName, ShellOption};
use thiserror::Error;

/// Where the shell reads commands from
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Source {
    /// Command string given with `-c`
    CommandString {
        /// The command string
        command: String,
        /// Optional command name used as `$0`
        command_name: Option<String>,
    },
    /// Standard input (`-s`, or no operands)
    Stdin,
    /// Script file named by the first operand
    File {
        /// Path of the script file
        path: String,
    },
}

/// Parsed invocation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    /// Where commands are read from
    pub source: Source,
    /// Option settings in command line order
    pub option_settings: Vec<(ShellOption, bool)>,
    /// Initial positional parameters
    pub positional_params: Vec<String>,
}

/// Error in the command line
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// An option letter is not recognized.
    #[error("invalid option `{0}`")]
    InvalidOption(String),
    /// The argument of `-o` is not an option name.
    #[error("invalid option name `{0}`")]
    InvalidOptionName(String),
    /// `-c` was given without a command string.
    #[error("missing command string after `-c`")]
    MissingCommandString,
    /// `-o` was given without an option name.
    #[error("missing option name after `-o`")]
    MissingOptionName,
}

/// Parses the command line (not including `argv[0]`).
pub fn parse<I>(arguments: I) -> Result<Invocation, Error>
where
    I: IntoIterator<Item = String>,
{
    let mut arguments = arguments.into_iter();
    let mut option_settings = Vec::new();
    let mut command_string = false;
    let mut read_stdin = false;

    let mut next = arguments.next();
    while let Some(argument) = &next {
        let (selects, letters) = match argument.strip_prefix('-') {
            Some(letters) => (true, letters),
            None => match argument.strip_prefix('+') {
                Some(letters) => (false, letters),
                None => break,
            },
        };
        if argument == "-" || argument == "--" {
            next = arguments.next();
            break;
        }

        let mut letters = letters.chars();
        while let Some(letter) = letters.next() {
            match letter {
                'c' => command_string = true,
                's' => read_stdin = true,
                'i' => option_settings.push((ShellOption::Interactive, selects)),
                'o' => {
                    let name: String = letters.collect();
                    let name = if name.is_empty() {
                        arguments.next().ok_or(Error::MissingOptionName)?
                    } else {
                        name
                    };
                    let parsed: OName = name
                        .parse()
                        .map_err(|_| Error::InvalidOptionName(name.clone()))?;
                    let state = if selects { parsed.state } else { !parsed.state };
                    option_settings.push((parsed.option, state));
                    break;
                }
                letter => match option_for_letter(letter) {
                    Some((option, state)) => {
                        let state = if selects { state } else { !state };
                        option_settings.push((option, state));
                    }
                    None => return Err(Error::InvalidOption(format!("-{letter}"))),
                },
            }
        }
        next = arguments.next();
    }

    let mut operands: Vec<String> = next.into_iter().chain(arguments).collect();

    let source = if command_string {
        if operands.is_empty() {
            return Err(Error::MissingCommandString);
        }
        let command = operands.remove(0);
        let command_name = if operands.is_empty() {
            None
        } else {
            Some(operands.remove(0))
        };
        Source::CommandString {
            command,
            command_name,
        }
    } else if read_stdin || operands.is_empty() {
        Source::Stdin
    } else {
        Source::File {
            path: operands.remove(0),
        }
    };

    Ok(Invocation {
        source,
        option_settings,
        positional_params: operands,
    })
}
