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

//! Arithmetic expansion
//!
//! The raw expression text first undergoes the initial expansion (tilde
//! expansion does not apply, but parameter expansion, command
//! substitution, and nested arithmetic expansion do) without field
//! splitting or pathname expansion. The resulting string is then
//! evaluated by the [`oxsh_arith`] expression evaluator, with variable
//! reads and assignments going to the calling environment's variable
//! store.

use super::{expand_text, Error, ErrorCause, Output, Result};
use oxsh_env::variable::Scope;
use oxsh_env::Env;
use oxsh_syntax::source::Location;
use std::ops::Range;

/// Adapter that exposes the shell variable store to the arithmetic
/// evaluator.
#[derive(Debug)]
struct VariableEnv<'a> {
    env: &'a mut Env,
}

impl oxsh_arith::Env for VariableEnv<'_> {
    type AssignVariableError = oxsh_env::variable::AssignError;

    fn get_variable(&self, name: &str) -> Option<&str> {
        self.env.variables.get_value(name)
    }

    fn assign_variable(
        &mut self,
        name: &str,
        value: String,
        _location: Range<usize>,
    ) -> std::result::Result<(), Self::AssignVariableError> {
        self.env.variables.assign(Scope::Global, name, Some(value))
    }
}

/// Evaluates an expression text to an integer.
///
/// The text undergoes the initial expansion before evaluation. This is
/// also used for the offset and length of a substring parameter
/// expansion.
pub fn eval_expression(env: &mut Env, content: &str, location: &Location) -> Result<i64> {
    // Expand the raw text as if it were the unquoted body of a word,
    // without field splitting or pathname expansion.
    let text = oxsh_syntax::lex::parse_text(content).map_err(|error| Error {
        cause: ErrorCause::ReparseError(error),
        location: *location,
    })?;
    let mut output = Output::new();
    expand_text(env, &text, false, &mut output)?;
    let expression: String = output
        .into_strings()
        .iter()
        .flat_map(|string| &string.chars)
        .filter(|c| !c.is_quoting)
        .map(|c| c.value)
        .collect();

    let mut variable_env = VariableEnv { env };
    match oxsh_arith::eval(&expression, &mut variable_env) {
        Ok(value) => Ok(value.0),
        Err(error) => Err(Error {
            cause: ErrorCause::ArithError {
                message: error.to_string(),
            },
            location: *location,
        }),
    }
}

/// Performs an arithmetic expansion, producing the decimal representation
/// of the result.
pub fn expand(env: &mut Env, content: &str, location: &Location) -> Result<String> {
    eval_expression(env, content, location).map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::system::test_helper::DummySystem;

    fn test_env() -> Env {
        Env::new(Box::new(DummySystem::default()))
    }

    fn assign(env: &mut Env, name: &str, value: &str) {
        env.variables
            .assign(Scope::Global, name, Some(value.to_string()))
            .unwrap();
    }

    #[test]
    fn evaluates_constants() {
        let mut env = test_env();
        assert_eq!(expand(&mut env, "1 + 2", &Location::dummy()), Ok("3".into()));
        assert_eq!(
            expand(&mut env, "010 + 0x10", &Location::dummy()),
            Ok("24".into())
        );
    }

    #[test]
    fn reads_and_assigns_variables() {
        let mut env = test_env();
        assign(&mut env, "x", "6");
        assert_eq!(expand(&mut env, "x * 7", &Location::dummy()), Ok("42".into()));

        expand(&mut env, "y = x + 1", &Location::dummy()).unwrap();
        assert_eq!(env.variables.get_value("y"), Some("7"));
    }

    #[test]
    fn parameter_expansion_before_evaluation() {
        let mut env = test_env();
        assign(&mut env, "op", "+");
        assert_eq!(
            expand(&mut env, "1 $op 2", &Location::dummy()),
            Ok("3".into())
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut env = test_env();
        let error = expand(&mut env, "1 / 0", &Location::dummy()).unwrap_err();
        assert!(matches!(error.cause, ErrorCause::ArithError { .. }));
    }

    #[test]
    fn assignment_to_read_only_variable_fails() {
        let mut env = test_env();
        assign(&mut env, "r", "1");
        env.variables
            .set_read_only("r", oxsh_syntax::source::Location::dummy());
        let error = expand(&mut env, "r = 2", &Location::dummy()).unwrap_err();
        assert!(matches!(error.cause, ErrorCause::ArithError { .. }));
    }
}
