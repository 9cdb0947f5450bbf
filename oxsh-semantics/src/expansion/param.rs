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

//! Parameter expansion

use super::{arith, expand_text_unit, Error, ErrorCause, Origin, Output, Result};
use oxsh_env::option::ShellOption;
use oxsh_env::variable::Scope;
use oxsh_env::Env;
use oxsh_fnmatch::{Config, Pattern};
use oxsh_syntax::source::Location;
use oxsh_syntax::syntax::{
    BracedParam, Modifier, Param, ParamType, SpecialParam, Substr, Switch, SwitchCondition,
    SwitchType, Trim, TrimLength, TrimSide, Word, WordUnit,
};

/// Looked-up value of a parameter
#[derive(Clone, Debug, Eq, PartialEq)]
enum Lookup {
    /// The parameter is not set.
    Unset,
    /// Single value
    Value(String),
    /// All positional parameters (`$@` or `$*`)
    Params(Vec<String>),
}

impl Lookup {
    /// Whether the value triggers a switch with the given condition.
    fn triggers(&self, condition: SwitchCondition) -> bool {
        match self {
            Lookup::Unset => true,
            Lookup::Value(value) => {
                condition == SwitchCondition::UnsetOrEmpty && value.is_empty()
            }
            Lookup::Params(values) => {
                condition == SwitchCondition::UnsetOrEmpty
                    && values.iter().all(|value| value.is_empty())
            }
        }
    }
}

/// Looks up the value of a parameter in the environment.
fn look_up(env: &mut Env, param: &Param) -> Lookup {
    match param.r#type {
        ParamType::Variable => match env.variables.get_value(&param.id) {
            Some(value) => Lookup::Value(value.to_string()),
            None => Lookup::Unset,
        },
        ParamType::Positional(index) => {
            let values = &env.variables.positional_params().values;
            match index.checked_sub(1).and_then(|i| values.get(i)) {
                Some(value) => Lookup::Value(value.clone()),
                None => Lookup::Unset,
            }
        }
        ParamType::Special(special) => match special {
            SpecialParam::At | SpecialParam::Asterisk => {
                Lookup::Params(env.variables.positional_params().values.clone())
            }
            SpecialParam::Number => {
                Lookup::Value(env.variables.positional_params().values.len().to_string())
            }
            SpecialParam::Question => Lookup::Value(env.exit_status.to_string()),
            SpecialParam::Hyphen => Lookup::Value(env.options.letters()),
            SpecialParam::Dollar => Lookup::Value(env.system.getpid().to_string()),
            SpecialParam::Exclamation => match env.jobs.last_async_pid() {
                Some(pid) => Lookup::Value(pid.to_string()),
                None => Lookup::Unset,
            },
            SpecialParam::Zero => Lookup::Value(env.arg0.clone()),
        },
    }
}

/// Whether the `Unset` shell option applies to the parameter.
///
/// `$@`, `$*`, and `$!` expand to nothing when unset even under `set -u`.
fn exempt_from_unset_check(param: &Param) -> bool {
    matches!(
        param.r#type,
        ParamType::Special(SpecialParam::At)
            | ParamType::Special(SpecialParam::Asterisk)
            | ParamType::Special(SpecialParam::Exclamation)
    )
}

/// The separator character used when joining `$*`: the first character of
/// `IFS`, a space when `IFS` is unset, or nothing when `IFS` is empty.
fn join_separator(env: &Env) -> Option<char> {
    match env.variables.get_value("IFS") {
        None => Some(' '),
        Some(ifs) => ifs.chars().next(),
    }
}

/// Pushes a looked-up value into the expansion output.
///
/// For `$@` (and unquoted `$*`), each positional parameter becomes its own
/// piece: quoted, the pieces are separate strings that stay separate
/// fields; unquoted, they are joined with a separator that field splitting
/// will split at again.
fn push_lookup(
    env: &Env,
    param: &Param,
    lookup: Lookup,
    is_quoted: bool,
    output: &mut Output,
) {
    match lookup {
        Lookup::Unset => {}
        Lookup::Value(value) => output.push_str(&value, Origin::SoftExpansion, is_quoted),
        Lookup::Params(values) => {
            let star = param.r#type == ParamType::Special(SpecialParam::Asterisk);
            if values.is_empty() && is_quoted && !star {
                output.mark_empty_params();
                return;
            }
            let separator = join_separator(env);
            let mut first = true;
            for value in values {
                if !first {
                    if is_quoted && star {
                        if let Some(separator) = separator {
                            output.push_char(super::AttrChar {
                                value: separator,
                                origin: Origin::SoftExpansion,
                                is_quoted,
                                is_quoting: false,
                            });
                        }
                    } else if is_quoted {
                        output.break_string();
                    } else {
                        // An unquoted separator that field splitting will
                        // remove again.
                        output.push_char(super::AttrChar {
                            value: separator.unwrap_or(' '),
                            origin: Origin::SoftExpansion,
                            is_quoted: false,
                            is_quoting: false,
                        });
                    }
                }
                first = false;
                output.push_str(&value, Origin::SoftExpansion, is_quoted);
            }
        }
    }
}

/// Expands a parameter without braces.
pub(crate) fn expand_raw_param(
    env: &mut Env,
    param: &Param,
    location: &Location,
    is_quoted: bool,
    output: &mut Output,
) -> Result<()> {
    let lookup = look_up(env, param);
    if lookup == Lookup::Unset
        && !env.options.get(ShellOption::Unset)
        && !exempt_from_unset_check(param)
    {
        return Err(Error {
            cause: ErrorCause::UnsetParameter {
                param: param.id.clone(),
            },
            location: *location,
        });
    }
    push_lookup(env, param, lookup, is_quoted, output);
    Ok(())
}

/// Expands the word of a switch modifier into the output.
fn expand_switch_word(
    env: &mut Env,
    word: &Word,
    is_quoted: bool,
    output: &mut Output,
) -> Result<()> {
    for unit in &word.units {
        match unit {
            WordUnit::Unquoted(text_unit) => expand_text_unit(env, text_unit, is_quoted, output)?,
            WordUnit::SingleQuote(value) => {
                output.push_quoting('\'');
                output.push_str(value, Origin::Literal, true);
                output.push_quoting('\'');
            }
            WordUnit::DoubleQuote(text) => {
                output.push_quoting('"');
                super::expand_text(env, text, true, output)?;
                output.push_quoting('"');
            }
        }
    }
    Ok(())
}

/// Expands a switch word to a plain string.
fn switch_word_to_string(env: &mut Env, word: &Word) -> Result<String> {
    super::expand_word_single(env, word, false).map(|field| field.value)
}

/// Applies a trim modifier to one value.
fn trim_value(value: &str, pattern: &Pattern, trim: &Trim) -> String {
    // Byte indices of character boundaries, in ascending order.
    let boundaries = || {
        value
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(value.len()))
    };
    match (trim.side, trim.length) {
        (TrimSide::Prefix, TrimLength::Shortest) => {
            for i in boundaries() {
                if pattern.is_match(&value[..i]) {
                    return value[i..].to_string();
                }
            }
            value.to_string()
        }
        (TrimSide::Prefix, TrimLength::Longest) => {
            for i in boundaries().collect::<Vec<_>>().into_iter().rev() {
                if pattern.is_match(&value[..i]) {
                    return value[i..].to_string();
                }
            }
            value.to_string()
        }
        (TrimSide::Suffix, TrimLength::Shortest) => {
            for i in boundaries().collect::<Vec<_>>().into_iter().rev() {
                if pattern.is_match(&value[i..]) {
                    return value[..i].to_string();
                }
            }
            value.to_string()
        }
        (TrimSide::Suffix, TrimLength::Longest) => {
            for i in boundaries() {
                if pattern.is_match(&value[i..]) {
                    return value[..i].to_string();
                }
            }
            value.to_string()
        }
    }
}

/// Applies a substring modifier to one value.
fn substr_value(value: &str, offset: i64, length: Option<i64>) -> String {
    if offset < 0 {
        return String::new();
    }
    let chars = value.chars().skip(offset as usize);
    match length {
        None => chars.collect(),
        Some(length) if length <= 0 => String::new(),
        Some(length) => chars.take(length as usize).collect(),
    }
}

/// Maps a lookup over its value(s).
fn map_lookup<F: FnMut(&str) -> String>(lookup: Lookup, mut f: F) -> Lookup {
    match lookup {
        Lookup::Unset => Lookup::Value(f("")),
        Lookup::Value(value) => Lookup::Value(f(&value)),
        Lookup::Params(values) => {
            Lookup::Params(values.iter().map(|value| f(value)).collect())
        }
    }
}

/// Expands a braced parameter expansion.
pub(crate) fn expand_braced_param(
    env: &mut Env,
    braced_param: &BracedParam,
    is_quoted: bool,
    output: &mut Output,
) -> Result<()> {
    let param = &braced_param.param;
    let location = braced_param.location;
    let lookup = look_up(env, param);

    match &braced_param.modifier {
        Modifier::None => {
            if lookup == Lookup::Unset
                && !env.options.get(ShellOption::Unset)
                && !exempt_from_unset_check(param)
            {
                return Err(Error {
                    cause: ErrorCause::UnsetParameter {
                        param: param.id.clone(),
                    },
                    location,
                });
            }
            push_lookup(env, param, lookup, is_quoted, output);
        }

        Modifier::Length => {
            let length = match &lookup {
                Lookup::Unset => 0,
                Lookup::Value(value) => value.len(),
                Lookup::Params(values) => values.len(),
            };
            output.push_str(&length.to_string(), Origin::SoftExpansion, is_quoted);
        }

        Modifier::Switch(Switch {
            r#type,
            condition,
            word,
        }) => {
            let triggered = lookup.triggers(*condition);
            match r#type {
                SwitchType::Default => {
                    if triggered {
                        expand_switch_word(env, word, is_quoted, output)?;
                    } else {
                        push_lookup(env, param, lookup, is_quoted, output);
                    }
                }
                SwitchType::Alter => {
                    if !triggered {
                        expand_switch_word(env, word, is_quoted, output)?;
                    }
                }
                SwitchType::Assign => {
                    if triggered {
                        if param.r#type != ParamType::Variable {
                            return Err(Error {
                                cause: ErrorCause::NonassignableParameter {
                                    param: param.id.clone(),
                                },
                                location,
                            });
                        }
                        let value = switch_word_to_string(env, word)?;
                        env.variables
                            .assign(Scope::Global, &param.id, Some(value.clone()))
                            .map_err(|_| Error {
                                cause: ErrorCause::AssignReadOnly {
                                    param: param.id.clone(),
                                },
                                location,
                            })?;
                        output.push_str(&value, Origin::SoftExpansion, is_quoted);
                    } else {
                        push_lookup(env, param, lookup, is_quoted, output);
                    }
                }
                SwitchType::Error => {
                    if triggered {
                        let message = if word.is_empty() {
                            match condition {
                                SwitchCondition::Unset => "parameter not set".to_string(),
                                SwitchCondition::UnsetOrEmpty => {
                                    "parameter null or not set".to_string()
                                }
                            }
                        } else {
                            switch_word_to_string(env, word)?
                        };
                        return Err(Error {
                            cause: ErrorCause::EmptyExpansion {
                                param: param.id.clone(),
                                message,
                            },
                            location,
                        });
                    }
                    push_lookup(env, param, lookup, is_quoted, output);
                }
            }
        }

        Modifier::Trim(trim) => {
            let pattern_text = super::expand_word_pattern(env, &trim.pattern)?;
            let lookup = match Pattern::parse(&pattern_text, Config::default()) {
                Ok(pattern) => map_lookup(lookup, |value| trim_value(value, &pattern, trim)),
                // An unparsable pattern matches nothing and removes
                // nothing.
                Err(_) => lookup,
            };
            push_lookup(env, param, lookup, is_quoted, output);
        }

        Modifier::Substr(Substr { offset, length }) => {
            let offset = arith::eval_expression(env, offset, &location)?;
            let length = match length {
                Some(length) => Some(arith::eval_expression(env, length, &location)?),
                None => None,
            };
            let lookup = map_lookup(lookup, |value| substr_value(value, offset, length));
            push_lookup(env, param, lookup, is_quoted, output);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_env::semantics::ExitStatus;
    use oxsh_env::system::test_helper::DummySystem;
    use oxsh_env::variable::PositionalParams;
    use crate::expansion::expand_word;
    use oxsh_env::semantics::Field;
    use oxsh_syntax::lex::{Lexer, Scan, TokenId};

    fn test_env() -> Env {
        Env::new(Box::new(DummySystem::default()))
    }

    fn word(source: &str) -> Word {
        let mut lexer = Lexer::from_source(source);
        match lexer.next_token().unwrap() {
            Scan::Token(token) => {
                assert!(matches!(token.id, TokenId::Token(_)));
                token.word
            }
            Scan::Incomplete => panic!("incomplete token in {source:?}"),
        }
    }

    fn expand(env: &mut Env, source: &str) -> Vec<String> {
        expand_word(env, &word(source))
            .unwrap()
            .into_iter()
            .map(|Field { value, .. }| value)
            .collect()
    }

    fn assign(env: &mut Env, name: &str, value: &str) {
        env.variables
            .assign(Scope::Global, name, Some(value.to_string()))
            .unwrap();
    }

    fn set_params(env: &mut Env, values: &[&str]) {
        *env.variables.positional_params_mut() = PositionalParams {
            values: values.iter().map(|s| s.to_string()).collect(),
        };
    }

    #[test]
    fn plain_and_braced_values() {
        let mut env = test_env();
        assign(&mut env, "x", "value");
        assert_eq!(expand(&mut env, "$x"), ["value"]);
        assert_eq!(expand(&mut env, "${x}"), ["value"]);
    }

    #[test]
    fn special_parameters() {
        let mut env = test_env();
        env.exit_status = ExitStatus(42);
        set_params(&mut env, &["a", "b", "c"]);
        assert_eq!(expand(&mut env, "$?"), ["42"]);
        assert_eq!(expand(&mut env, "$#"), ["3"]);
        assert_eq!(expand(&mut env, "$1"), ["a"]);
        assert_eq!(expand(&mut env, "$3"), ["c"]);
        assert_eq!(expand(&mut env, "${10}"), [] as [&str; 0]);
    }

    #[test]
    fn quoted_at_keeps_parameters_separate() {
        let mut env = test_env();
        set_params(&mut env, &["a b", "c"]);
        assert_eq!(expand(&mut env, "\"$@\""), ["a b", "c"]);
        assert_eq!(expand(&mut env, "x\"$@\"y"), ["xa b", "cy"]);
    }

    #[test]
    fn quoted_star_joins_with_first_ifs_character() {
        let mut env = test_env();
        set_params(&mut env, &["a", "b", "c"]);
        assert_eq!(expand(&mut env, "\"$*\""), ["a b c"]);
        assign(&mut env, "IFS", ":-");
        assert_eq!(expand(&mut env, "\"$*\""), ["a:b:c"]);
        assign(&mut env, "IFS", "");
        assert_eq!(expand(&mut env, "\"$*\""), ["abc"]);
    }

    #[test]
    fn unquoted_at_field_splits() {
        let mut env = test_env();
        set_params(&mut env, &["a b", "c"]);
        assert_eq!(expand(&mut env, "$@"), ["a", "b", "c"]);
        assert_eq!(expand(&mut env, "$*"), ["a", "b", "c"]);
    }

    #[test]
    fn empty_at_expands_to_no_fields() {
        let mut env = test_env();
        assert_eq!(expand(&mut env, "\"$@\""), [] as [&str; 0]);
    }

    #[test]
    fn length_modifier() {
        let mut env = test_env();
        assign(&mut env, "x", "hello");
        assert_eq!(expand(&mut env, "${#x}"), ["5"]);
        assert_eq!(expand(&mut env, "${#nosuch}"), ["0"]);
        set_params(&mut env, &["a", "b"]);
        assert_eq!(expand(&mut env, "${#}"), ["2"]);
    }

    #[test]
    fn default_switches() {
        let mut env = test_env();
        assert_eq!(expand(&mut env, "${x:-default}"), ["default"]);
        assert_eq!(expand(&mut env, "${x-default}"), ["default"]);
        assign(&mut env, "x", "");
        // `:-` also triggers on an empty value; `-` does not.
        assert_eq!(expand(&mut env, "${x:-default}"), ["default"]);
        assert_eq!(expand(&mut env, "${x-default}"), [] as [&str; 0]);
        assign(&mut env, "x", "set");
        assert_eq!(expand(&mut env, "${x:-default}"), ["set"]);
    }

    #[test]
    fn assign_switch() {
        let mut env = test_env();
        assert_eq!(expand(&mut env, "${x:=assigned}"), ["assigned"]);
        assert_eq!(env.variables.get_value("x"), Some("assigned"));
        assert_eq!(expand(&mut env, "${x:=other}"), ["assigned"]);
    }

    #[test]
    fn assign_switch_rejects_positional_parameter() {
        let mut env = test_env();
        let error = expand_word(&mut env, &word("${1:=x}")).unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::NonassignableParameter {
                param: "1".to_string()
            }
        );
    }

    #[test]
    fn error_switch() {
        let mut env = test_env();
        let error = expand_word(&mut env, &word("${x:?}")).unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::EmptyExpansion {
                param: "x".to_string(),
                message: "parameter null or not set".to_string()
            }
        );

        let error = expand_word(&mut env, &word("${x?custom message}")).unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::EmptyExpansion {
                param: "x".to_string(),
                message: "custom message".to_string()
            }
        );

        assign(&mut env, "x", "ok");
        assert_eq!(expand(&mut env, "${x:?}"), ["ok"]);
    }

    #[test]
    fn alter_switch() {
        let mut env = test_env();
        assert_eq!(expand(&mut env, "${x:+alt}"), [] as [&str; 0]);
        assign(&mut env, "x", "set");
        assert_eq!(expand(&mut env, "${x:+alt}"), ["alt"]);
        assign(&mut env, "x", "");
        assert_eq!(expand(&mut env, "${x:+alt}"), [] as [&str; 0]);
        assert_eq!(expand(&mut env, "${x+alt}"), ["alt"]);
    }

    #[test]
    fn trim_modifiers() {
        let mut env = test_env();
        assign(&mut env, "x", "a/b/c.d");
        assert_eq!(expand(&mut env, "${x#*/}"), ["b/c.d"]);
        assert_eq!(expand(&mut env, "${x##*/}"), ["c.d"]);
        assert_eq!(expand(&mut env, "${x%.*}"), ["a/b/c"]);
        assert_eq!(expand(&mut env, "${x%%/*}"), ["a"]);
        // A pattern that does not match leaves the value unchanged.
        assert_eq!(expand(&mut env, "${x#z}"), ["a/b/c.d"]);
    }

    #[test]
    fn trim_with_quoted_pattern_is_literal() {
        let mut env = test_env();
        assign(&mut env, "x", "a*b");
        assert_eq!(expand(&mut env, "${x#'a*'}"), ["b"]);
        assign(&mut env, "y", "aXb");
        assert_eq!(expand(&mut env, "${y#'a*'}"), ["aXb"]);
    }

    #[test]
    fn substr_modifier() {
        let mut env = test_env();
        assign(&mut env, "x", "abcdef");
        assert_eq!(expand(&mut env, "${x:1:2}"), ["bc"]);
        assert_eq!(expand(&mut env, "${x:3}"), ["def"]);
        assert_eq!(expand(&mut env, "${x:1+1:6/2}"), ["cde"]);
        // Out-of-range bounds clamp to nothing.
        assert_eq!(expand(&mut env, "${x:9}"), [] as [&str; 0]);
        assert_eq!(expand(&mut env, "${x:0:0}"), [] as [&str; 0]);
    }
}
