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

//! Compound command execution

use super::{run_in_subshell, Execute};
use crate::expansion::{expand_word_pattern, expand_word_single, expand_words, report_error};
use crate::redir::RedirGuard;
use crate::trap::run_traps;
use oxsh_env::frame::FrameKind;
use oxsh_env::semantics::{Divert, ExitStatus, Result};
use oxsh_env::variable::Scope;
use oxsh_env::Env;
use oxsh_fnmatch::{Config, Pattern};
use oxsh_syntax::syntax::{
    CaseContinuation, CaseItem, CompoundCommand, ElifThen, FullCompoundCommand, List, Word,
};
use std::ops::ControlFlow::{Break, Continue};

impl Execute for FullCompoundCommand {
    fn execute(&self, env: &mut Env) -> Result {
        let mut guard = RedirGuard::new(env);
        if let Err(error) = guard.perform_redirs(&self.redirs) {
            drop(guard);
            return crate::redir::report_error(env, &error, false);
        }
        self.command.execute(&mut guard)
    }
}

impl Execute for CompoundCommand {
    fn execute(&self, env: &mut Env) -> Result {
        use CompoundCommand::*;
        match self {
            Grouping(list) => {
                let mut guard = env.push_frame(FrameKind::BraceGroup);
                list.execute(&mut guard)
            }
            Subshell(list) => {
                run_in_subshell(env, FrameKind::Subshell, |env| list.execute(env))
            }
            If {
                condition,
                body,
                elifs,
                r#else,
            } => execute_if(env, condition, body, elifs, r#else.as_ref()),
            While { condition, body } => execute_loop(env, condition, body, true),
            Until { condition, body } => execute_loop(env, condition, body, false),
            For { name, values, body } => execute_for(env, name, values.as_deref(), body),
            Case { subject, items } => execute_case(env, subject, items),
        }
    }
}

/// Executes a list as the condition of a conditional construct.
///
/// The condition runs in a frame that suppresses the `ErrExit` option.
fn execute_condition(env: &mut Env, condition: &List) -> Result {
    let mut guard = env.push_frame(FrameKind::Condition);
    condition.execute(&mut guard)
}

fn execute_if(
    env: &mut Env,
    condition: &List,
    body: &List,
    elifs: &[ElifThen],
    r#else: Option<&List>,
) -> Result {
    execute_condition(env, condition)?;
    if env.exit_status.is_successful() {
        return body.execute(env);
    }
    for ElifThen { condition, body } in elifs {
        execute_condition(env, condition)?;
        if env.exit_status.is_successful() {
            return body.execute(env);
        }
    }
    match r#else {
        Some(r#else) => r#else.execute(env),
        None => {
            // An if command that executes no body succeeds.
            env.exit_status = ExitStatus::SUCCESS;
            Continue(())
        }
    }
}

/// Handles a divert produced by a loop body.
///
/// `break` and `continue` targeting this loop are consumed; those
/// targeting an outer loop are propagated with a decremented count.
enum LoopControl {
    NextIteration,
    ExitLoop,
}

fn handle_loop_divert(result: Result) -> std::result::Result<LoopControl, Result> {
    match result {
        Continue(()) => Ok(LoopControl::NextIteration),
        Break(Divert::Break { count: 0 }) => Ok(LoopControl::ExitLoop),
        Break(Divert::Break { count }) => Err(Break(Divert::Break { count: count - 1 })),
        Break(Divert::Continue { count: 0 }) => Ok(LoopControl::NextIteration),
        Break(Divert::Continue { count }) => Err(Break(Divert::Continue { count: count - 1 })),
        other => Err(other),
    }
}

/// Executes a `while` (`expected == true`) or `until` (`expected ==
/// false`) loop.
fn execute_loop(env: &mut Env, condition: &List, body: &List, expected: bool) -> Result {
    let mut guard = env.push_frame(FrameKind::Loop);
    let mut body_status = ExitStatus::SUCCESS;
    loop {
        run_traps(&mut guard)?;

        match handle_loop_divert(execute_condition(&mut guard, condition)) {
            Ok(LoopControl::NextIteration) => {}
            Ok(LoopControl::ExitLoop) => break,
            Err(other) => return other,
        }
        if guard.exit_status.is_successful() != expected {
            break;
        }

        match handle_loop_divert(body.execute(&mut guard)) {
            Ok(LoopControl::NextIteration) => body_status = guard.exit_status,
            Ok(LoopControl::ExitLoop) => {
                body_status = guard.exit_status;
                break;
            }
            Err(other) => return other,
        }
    }
    guard.exit_status = body_status;
    Continue(())
}

fn execute_for(
    env: &mut Env,
    name: &Word,
    values: Option<&[Word]>,
    body: &List,
) -> Result {
    let variable_name = name
        .to_string_if_literal()
        .expect("the parser validates the for loop variable name");

    let values: Vec<String> = match values {
        Some(words) => match expand_words(env, words) {
            Ok(fields) => fields.into_iter().map(|field| field.value).collect(),
            Err(error) => return report_error(env, &error),
        },
        None => env.variables.positional_params().values.clone(),
    };

    let mut guard = env.push_frame(FrameKind::Loop);
    let mut body_status = ExitStatus::SUCCESS;
    for value in values {
        run_traps(&mut guard)?;

        if let Err(error) = guard
            .variables
            .assign(Scope::Global, &variable_name, Some(value))
        {
            let message = error.to_string();
            guard.print_error(Some(&name.location), &message);
            guard.exit_status = ExitStatus::ERROR;
            return Break(Divert::Interrupt(Some(ExitStatus::ERROR)));
        }

        match handle_loop_divert(body.execute(&mut guard)) {
            Ok(LoopControl::NextIteration) => body_status = guard.exit_status,
            Ok(LoopControl::ExitLoop) => {
                body_status = guard.exit_status;
                break;
            }
            Err(other) => return other,
        }
    }
    guard.exit_status = body_status;
    Continue(())
}

fn execute_case(env: &mut Env, subject: &Word, items: &[CaseItem]) -> Result {
    let subject = match expand_word_single(env, subject, false) {
        Ok(field) => field.value,
        Err(error) => return report_error(env, &error),
    };

    let mut status = ExitStatus::SUCCESS;
    let mut fall_through = false;
    for item in items {
        let matched = fall_through || {
            let mut matched = false;
            for pattern in &item.patterns {
                let pattern_text = match expand_word_pattern(env, pattern) {
                    Ok(text) => text,
                    Err(error) => return report_error(env, &error),
                };
                if let Ok(pattern) = Pattern::parse(&pattern_text, Config::default()) {
                    if pattern.is_match(&subject) {
                        matched = true;
                        break;
                    }
                }
            }
            matched
        };
        if !matched {
            continue;
        }

        let mut guard = env.push_frame(FrameKind::CaseBody);
        guard.exit_status = ExitStatus::SUCCESS;
        item.body.execute(&mut guard)?;
        status = guard.exit_status;
        drop(guard);

        match item.continuation {
            CaseContinuation::Break => {
                env.exit_status = status;
                return Continue(());
            }
            CaseContinuation::FallThrough => fall_through = true,
        }
    }
    env.exit_status = status;
    Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run_string;
    use oxsh_env::system::test_helper::DummySystem;

    fn test_env() -> Env {
        Env::new(Box::new(DummySystem::default()))
    }

    #[test]
    fn if_command_runs_matching_branch() {
        let mut env = test_env();
        run_string(&mut env, "if x=1; then y=then; else y=else; fi");
        assert_eq!(env.variables.get_value("y"), Some("then"));
    }

    #[test]
    fn if_without_matching_branch_succeeds() {
        let mut env = test_env();
        env.exit_status = ExitStatus::FAILURE;
        run_string(&mut env, "if ! x=1; then y=1; fi");
        assert_eq!(env.variables.get_value("y"), None);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn for_loop_iterates_and_sets_variable() {
        let mut env = test_env();
        run_string(&mut env, "for i in a b c; do last=$i; done");
        assert_eq!(env.variables.get_value("i"), Some("c"));
        assert_eq!(env.variables.get_value("last"), Some("c"));
    }

    #[test]
    fn for_loop_with_no_values_runs_zero_times() {
        let mut env = test_env();
        env.exit_status = ExitStatus::FAILURE;
        run_string(&mut env, "for i in; do x=ran; done");
        assert_eq!(env.variables.get_value("x"), None);
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn case_matches_patterns() {
        let mut env = test_env();
        run_string(&mut env, "case abc in a*) x=star ;; *) x=other ;; esac");
        assert_eq!(env.variables.get_value("x"), Some("star"));

        run_string(&mut env, "case zzz in a*) y=star ;; *) y=other ;; esac");
        assert_eq!(env.variables.get_value("y"), Some("other"));
    }

    #[test]
    fn case_with_no_match_succeeds() {
        let mut env = test_env();
        env.exit_status = ExitStatus::FAILURE;
        run_string(&mut env, "case x in y) a=1 ;; esac");
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn case_fall_through() {
        let mut env = test_env();
        run_string(&mut env, "case a in a) x=first ;& b) y=second ;; c) z=third ;; esac");
        assert_eq!(env.variables.get_value("x"), Some("first"));
        assert_eq!(env.variables.get_value("y"), Some("second"));
        assert_eq!(env.variables.get_value("z"), None);
    }

    #[test]
    fn case_subject_is_not_field_split() {
        let mut env = test_env();
        use oxsh_env::variable::Scope;
        env.variables
            .assign(Scope::Global, "v", Some("a b".to_string()))
            .unwrap();
        run_string(&mut env, "case $v in 'a b') x=whole ;; *) x=split ;; esac");
        assert_eq!(env.variables.get_value("x"), Some("whole"));
    }
}
