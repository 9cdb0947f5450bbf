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

//! Type definitions for shell options
//!
//! Options are modeled in their positive sense: [`Clobber`], [`Exec`],
//! [`Glob`], and [`Unset`] are on by default, and the `-C`, `-n`, `-f`,
//! and `-u` invocation letters turn them off. The mapping between
//! letters, `-o` names, and options lives here; the behavior the options
//! select is implemented by the execution engine.

use enumset::EnumSet;
use enumset::EnumSetType;
use std::fmt;
use std::str::FromStr;

/// Shell option
#[derive(Clone, Copy, Debug, EnumSetType, Eq, Hash, PartialEq)]
#[enumset(no_super_impls)]
#[non_exhaustive]
pub enum ShellOption {
    /// Exports all variables when they are assigned. (`-a`)
    AllExport,
    /// Allows `>` to overwrite an existing file. (off with `-C`)
    Clobber,
    /// The shell is executing a command string given with `-c`.
    CmdLine,
    /// Exits the shell when a command returns a non-zero exit status.
    /// (`-e`)
    ErrExit,
    /// Actually executes commands. (off with `-n`)
    Exec,
    /// Enables pathname expansion. (off with `-f`)
    Glob,
    /// Remembers the location of utilities as they are executed. (`-h`)
    HashAll,
    /// Enables behavior for interactive use.
    Interactive,
    /// Enables job control. (`-m`)
    Monitor,
    /// Reports finished asynchronous jobs before each prompt. (`-b`)
    Notify,
    /// Makes a pipeline's exit status the last non-zero member status.
    /// (`-o pipefail`)
    PipeFail,
    /// Reads commands from the standard input. (`-s`)
    Stdin,
    /// Expands unset parameters to an empty string instead of failing.
    /// (off with `-u`)
    Unset,
    /// Writes input lines to the standard error as they are read. (`-v`)
    Verbose,
    /// Writes expanded commands to the standard error before executing
    /// them. (`-x`)
    XTrace,
}

pub use ShellOption::*;

impl ShellOption {
    /// Returns the option name used with `set -o`.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            AllExport => "allexport",
            Clobber => "clobber",
            CmdLine => "cmdline",
            ErrExit => "errexit",
            Exec => "exec",
            Glob => "glob",
            HashAll => "hashall",
            Interactive => "interactive",
            Monitor => "monitor",
            Notify => "notify",
            PipeFail => "pipefail",
            Stdin => "stdin",
            Unset => "unset",
            Verbose => "verbose",
            XTrace => "xtrace",
        }
    }

    /// Whether the option can be changed with the `set` built-in.
    ///
    /// The remaining options are fixed at shell startup.
    #[must_use]
    pub fn is_modifiable(self) -> bool {
        !matches!(self, CmdLine | Interactive | Stdin)
    }
}

impl fmt::Display for ShellOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.long_name())
    }
}

/// Mapping from single-letter options to shell options
///
/// The boolean is the state the letter selects with `-`; `+` selects the
/// opposite. For example, `-e` turns `ErrExit` on while `-f` turns `Glob`
/// off.
const LETTERS: &[(char, ShellOption, bool)] = &[
    ('a', AllExport, true),
    ('b', Notify, true),
    ('C', Clobber, false),
    ('c', CmdLine, true),
    ('e', ErrExit, true),
    ('f', Glob, false),
    ('h', HashAll, true),
    ('i', Interactive, true),
    ('m', Monitor, true),
    ('n', Exec, false),
    ('s', Stdin, true),
    ('u', Unset, false),
    ('v', Verbose, true),
    ('x', XTrace, true),
];

/// Mapping from `-o` option names to shell options
///
/// The boolean is the option state the name selects when set with `-o`.
/// Both the positive names and the POSIX `no`-prefixed names are listed.
const O_NAMES: &[(&str, ShellOption, bool)] = &[
    ("allexport", AllExport, true),
    ("errexit", ErrExit, true),
    ("hashall", HashAll, true),
    ("monitor", Monitor, true),
    ("noclobber", Clobber, false),
    ("noexec", Exec, false),
    ("noglob", Glob, false),
    ("notify", Notify, true),
    ("nounset", Unset, false),
    ("pipefail", PipeFail, true),
    ("verbose", Verbose, true),
    ("xtrace", XTrace, true),
];

/// Looks up a single-letter option.
///
/// Returns the option and the state the letter selects with `-`.
#[must_use]
pub fn option_for_letter(letter: char) -> Option<(ShellOption, bool)> {
    LETTERS
        .iter()
        .find(|&&(c, _, _)| c == letter)
        .map(|&(_, option, state)| (option, state))
}

/// Error parsing an option name
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum ParseOptionError {
    /// The name does not match any option name.
    #[error("no such option")]
    NoSuchOption,
    /// The name is a prefix of more than one option name.
    #[error("ambiguous option name")]
    Ambiguous,
}

/// Parsed `-o` option name
///
/// The name may be abbreviated as long as it is an unambiguous prefix of a
/// valid name; a full name is never considered ambiguous.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OName {
    /// The option the name refers to
    pub option: ShellOption,
    /// The state the name selects when set with `-o`
    pub state: bool,
}

impl FromStr for OName {
    type Err = ParseOptionError;
    fn from_str(name: &str) -> Result<OName, ParseOptionError> {
        if let Some(&(_, option, state)) = O_NAMES.iter().find(|&&(n, _, _)| n == name) {
            return Ok(OName { option, state });
        }
        let mut matches = O_NAMES.iter().filter(|&&(n, _, _)| n.starts_with(name));
        match (matches.next(), matches.next()) {
            (Some(&(_, option, state)), None) if !name.is_empty() => Ok(OName { option, state }),
            (Some(_), Some(_)) => Err(ParseOptionError::Ambiguous),
            _ => Err(ParseOptionError::NoSuchOption),
        }
    }
}

/// State of all shell options
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OptionSet {
    enabled: EnumSet<ShellOption>,
}

impl Default for OptionSet {
    /// The default state: `Clobber`, `Exec`, `Glob`, and `Unset` are on;
    /// everything else is off.
    fn default() -> OptionSet {
        OptionSet {
            enabled: Clobber | Exec | Glob | Unset,
        }
    }
}

impl OptionSet {
    /// Returns whether the option is on.
    #[must_use]
    pub fn get(&self, option: ShellOption) -> bool {
        self.enabled.contains(option)
    }

    /// Turns the option on or off.
    pub fn set(&mut self, option: ShellOption, state: bool) {
        if state {
            self.enabled.insert(option);
        } else {
            self.enabled.remove(option);
        }
    }

    /// Renders the value of the special parameter `$-`: the letters of
    /// the single-letter options that are currently selected.
    #[must_use]
    pub fn letters(&self) -> String {
        LETTERS
            .iter()
            .filter(|&&(_, option, state)| self.get(option) == state)
            .map(|&(letter, _, _)| letter)
            .collect()
    }

    /// Iterates over all options and their states, for `set -o` output.
    pub fn iter(&self) -> impl Iterator<Item = (ShellOption, bool)> + '_ {
        O_NAMES
            .iter()
            .map(move |&(_, option, _)| (option, self.get(option)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_states() {
        let options = OptionSet::default();
        assert!(options.get(Clobber));
        assert!(options.get(Exec));
        assert!(options.get(Glob));
        assert!(options.get(Unset));
        assert!(!options.get(ErrExit));
        assert!(!options.get(XTrace));
    }

    #[test]
    fn letters_reflect_selected_options() {
        let mut options = OptionSet::default();
        assert_eq!(options.letters(), "");
        options.set(ErrExit, true);
        options.set(Glob, false);
        assert_eq!(options.letters(), "ef");
        options.set(Interactive, true);
        options.set(Stdin, true);
        assert_eq!(options.letters(), "efis");
    }

    #[test]
    fn o_name_parsing() {
        let name: OName = "errexit".parse().unwrap();
        assert_eq!(name.option, ErrExit);
        assert!(name.state);

        let name: OName = "noglob".parse().unwrap();
        assert_eq!(name.option, Glob);
        assert!(!name.state);

        let name: OName = "pipefail".parse().unwrap();
        assert_eq!(name.option, PipeFail);
        assert!(name.state);
    }

    #[test]
    fn o_name_abbreviation() {
        let name: OName = "pipe".parse().unwrap();
        assert_eq!(name.option, PipeFail);

        assert_eq!("no".parse::<OName>(), Err(ParseOptionError::Ambiguous));
        assert_eq!("bogus".parse::<OName>(), Err(ParseOptionError::NoSuchOption));
        assert_eq!("".parse::<OName>(), Err(ParseOptionError::Ambiguous));
    }

    #[test]
    fn letter_lookup() {
        assert_eq!(option_for_letter('e'), Some((ErrExit, true)));
        assert_eq!(option_for_letter('u'), Some((Unset, false)));
        assert_eq!(option_for_letter('z'), None);
    }
}
