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

//! Simple command execution
//!
//! Executing a simple command expands the command words to fields, then
//! resolves the first field in the order special built-in, function,
//! regular built-in, `PATH` search, and invokes the target. Variable
//! assignments on the command persist when the target is a special
//! built-in or function; otherwise they only reach the environment of the
//! executed command. A command with no words performs its assignments in
//! the current environment and succeeds with the status of the last
//! command substitution, if any.

use super::{apply_errexit, report_system_error, Execute};
use crate::command_search::{search, Target};
use crate::expansion::{expand_word_single, expand_words, report_error};
use crate::redir::RedirGuard;
use oxsh_env::builtin::Builtin;
use oxsh_env::frame::FrameKind;
use oxsh_env::function::Function;
use oxsh_env::io::{print_to_fd, Fd};
use oxsh_env::option::ShellOption;
use oxsh_env::semantics::{Divert, ExitStatus, Field, Result};
use oxsh_env::variable::Scope;
use oxsh_env::Env;
use oxsh_syntax::syntax::{Assign, Redir, SimpleCommand};
use std::ffi::CString;
use std::ops::ControlFlow::{Break, Continue};
use std::rc::Rc;

impl Execute for SimpleCommand {
    fn execute(&self, env: &mut Env) -> Result {
        let fields = match expand_words(env, &self.words) {
            Ok(fields) => fields,
            Err(error) => return report_error(env, &error),
        };

        if fields.is_empty() {
            return execute_assignments_only(env, &self.assigns, &self.redirs);
        }

        let target = search(env, &fields[0].value);
        match target {
            Target::SpecialBuiltin(builtin) => {
                execute_builtin(env, builtin, true, &self.assigns, &self.redirs, fields)
            }
            Target::Function(function) => {
                execute_function(env, function, &self.assigns, &self.redirs, fields)
            }
            Target::Builtin(builtin) => {
                execute_builtin(env, builtin, false, &self.assigns, &self.redirs, fields)
            }
            Target::External { path } => {
                execute_external(env, path, &self.assigns, &self.redirs, fields)
            }
            Target::NotFound => {
                let message = format!("{}: command not found", fields[0].value);
                env.print_error(Some(&fields[0].origin), &message);
                env.exit_status = ExitStatus::NOT_FOUND;
                apply_errexit(env)
            }
        }
    }
}

/// Expands the values of assignment words.
fn expand_assigns(
    env: &mut Env,
    assigns: &[Assign],
) -> std::result::Result<Vec<(String, Field)>, crate::expansion::Error> {
    assigns
        .iter()
        .map(|assign| {
            expand_word_single(env, &assign.value, true)
                .map(|field| (assign.name.clone(), field))
        })
        .collect()
}

/// Performs expanded assignments.
///
/// Assignment stops at the first read-only failure, in which case the
/// command must not be executed.
fn perform_assignments(
    env: &mut Env,
    values: &[(String, Field)],
    scope: Scope,
    export: bool,
) -> Result {
    let all_export = env.options.get(ShellOption::AllExport);
    for (name, field) in values {
        if env
            .variables
            .get(name)
            .is_some_and(|variable| variable.is_read_only())
        {
            let message = format!("{name}: is read-only");
            env.print_error(Some(&field.origin), &message);
            env.exit_status = ExitStatus::ERROR;
            return Break(Divert::Interrupt(Some(ExitStatus::ERROR)));
        }
        env.variables
            .assign(scope, name, Some(field.value.clone()))
            .expect("read-only variables are checked above");
        if export || all_export {
            env.variables.set_exported(name, true);
        }
    }
    Continue(())
}

/// Prints the trace line for the `XTrace` option.
fn xtrace(env: &mut Env, assigns: &[(String, Field)], fields: &[Field]) {
    if !env.options.get(ShellOption::XTrace) {
        return;
    }
    let prefix = env.variables.get_value("PS4").unwrap_or("+ ").to_string();
    let mut line = prefix;
    let mut first = true;
    for (name, field) in assigns {
        if !first {
            line.push(' ');
        }
        first = false;
        line.push_str(name);
        line.push('=');
        line.push_str(&field.value);
    }
    for field in fields {
        if !first {
            line.push(' ');
        }
        first = false;
        line.push_str(&field.value);
    }
    line.push('\n');
    print_to_fd(env, Fd::STDERR, line.as_bytes());
}

/// Executes a simple command that has no command words.
fn execute_assignments_only(env: &mut Env, assigns: &[Assign], redirs: &[Redir]) -> Result {
    // The status is that of the last command substitution performed
    // during the expansions, or zero.
    env.exit_status = ExitStatus::SUCCESS;

    let values = match expand_assigns(env, assigns) {
        Ok(values) => values,
        Err(error) => return report_error(env, &error),
    };
    xtrace(env, &values, &[]);

    let mut guard = RedirGuard::new(env);
    if let Err(error) = guard.perform_redirs(redirs) {
        drop(guard);
        return crate::redir::report_error(env, &error, false);
    }
    drop(guard);

    perform_assignments(env, &values, Scope::Global, false)
}

/// Executes a built-in utility.
fn execute_builtin(
    env: &mut Env,
    builtin: Builtin,
    is_special: bool,
    assigns: &[Assign],
    redirs: &[Redir],
    fields: Vec<Field>,
) -> Result {
    let values = match expand_assigns(env, assigns) {
        Ok(values) => values,
        Err(error) => return report_error(env, &error),
    };
    xtrace(env, &values, &fields);

    // Assignments on a special built-in persist; on a regular built-in
    // they live in a temporary context for the duration of the built-in.
    let temporary_context = !is_special && !values.is_empty();
    if temporary_context {
        env.variables.push_context(None);
    }
    let scope = if temporary_context {
        Scope::Local
    } else {
        Scope::Global
    };
    let assignment_result = perform_assignments(env, &values, scope, temporary_context);

    // The redirections of the `exec` special built-in outlive the command.
    let permanent_redirs = is_special && fields[0].value == "exec";

    let result = if let Break(divert) = assignment_result {
        Break(divert)
    } else {
        let mut guard = RedirGuard::new(env);
        if let Err(error) = guard.perform_redirs(redirs) {
            drop(guard);
            crate::redir::report_error(env, &error, is_special)
        } else {
            let mut frame = guard.push_frame(FrameKind::Builtin { is_special });
            let args = fields[1..].to_vec();
            let result = (builtin.execute)(&mut frame, args);
            frame.exit_status = result.exit_status;
            drop(frame);
            if permanent_redirs {
                guard.commit();
            } else {
                drop(guard);
            }
            match result.divert {
                Continue(()) => apply_errexit(env),
                Break(divert) => Break(divert),
            }
        }
    };

    if temporary_context {
        env.variables.pop_context();
    }
    result
}

/// Calls a function.
fn execute_function(
    env: &mut Env,
    function: Rc<Function>,
    assigns: &[Assign],
    redirs: &[Redir],
    fields: Vec<Field>,
) -> Result {
    let values = match expand_assigns(env, assigns) {
        Ok(values) => values,
        Err(error) => return report_error(env, &error),
    };
    xtrace(env, &values, &fields);

    // Assignments on a function call persist in the enclosing context.
    perform_assignments(env, &values, Scope::Global, false)?;

    let mut guard = RedirGuard::new(env);
    if let Err(error) = guard.perform_redirs(redirs) {
        drop(guard);
        return crate::redir::report_error(env, &error, false);
    }

    let mut frame = guard.push_frame(FrameKind::Function);
    frame.variables.positional_params_mut().values = fields[1..]
        .iter()
        .map(|field| field.value.clone())
        .collect();

    let result = function.body.execute(&mut frame);
    drop(frame);
    drop(guard);

    match result {
        Break(Divert::Return(exit_status)) => {
            if let Some(exit_status) = exit_status {
                env.exit_status = exit_status;
            }
            apply_errexit(env)
        }
        Continue(()) => apply_errexit(env),
        other => other,
    }
}

/// Executes an external utility at a known path, without assignments or
/// redirections.
///
/// This is the entry point used by the `command` built-in, which bypasses
/// function lookup.
pub fn execute_program(env: &mut Env, path: CString, fields: Vec<Field>) -> Result {
    execute_external(env, path, &[], &[], fields)
}

/// Executes an external utility in a forked child.
fn execute_external(
    env: &mut Env,
    path: CString,
    assigns: &[Assign],
    redirs: &[Redir],
    fields: Vec<Field>,
) -> Result {
    use oxsh_env::system::{Errno, ForkResult, WaitPidFlag, WaitStatus};

    let values = match expand_assigns(env, assigns) {
        Ok(values) => values,
        Err(error) => return report_error(env, &error),
    };
    xtrace(env, &values, &fields);

    match env.system.fork() {
        Err(errno) => {
            report_system_error(env, errno, "cannot fork")?;
            apply_errexit(env)
        }

        Ok(ForkResult::Child) => {
            env.traps.enter_subshell(&mut *env.system);

            let mut guard = RedirGuard::new(env);
            match guard.perform_redirs(redirs) {
                Ok(()) => guard.commit(),
                Err(error) => {
                    let message = error.cause.to_string();
                    guard.print_error(Some(&error.location), &message);
                    guard.system.exit(ExitStatus::FAILURE.0)
                }
            }

            // The assignments become part of the child's environment.
            let _ = perform_assignments(env, &values, Scope::Global, true);
            let envs: Vec<CString> = env
                .variables
                .environ()
                .into_iter()
                .filter_map(|entry| CString::new(entry).ok())
                .collect();
            let args: Vec<CString> = fields
                .iter()
                .filter_map(|field| CString::new(field.value.clone()).ok())
                .collect();

            let errno = env.system.execve(&path, &args, &envs);
            let exit_status = match errno {
                Errno::ENOEXEC => {
                    // A file without a recognizable executable format is
                    // run as a shell script.
                    let mut script_args = Vec::with_capacity(args.len() + 1);
                    script_args.push(CString::new("sh").unwrap());
                    script_args.push(path.clone());
                    script_args.extend(args.into_iter().skip(1));
                    let sh = CString::new("/bin/sh").unwrap();
                    env.system.execve(&sh, &script_args, &envs);
                    ExitStatus::NOEXEC
                }
                Errno::ENOENT | Errno::ENOTDIR => ExitStatus::NOT_FOUND,
                _ => ExitStatus::NOEXEC,
            };
            let message = format!("{}: {}", fields[0].value, errno);
            env.print_error(Some(&fields[0].origin), &message);
            env.system.exit(exit_status.0)
        }

        Ok(ForkResult::Parent { child }) => {
            let status = loop {
                match env.system.wait(child, WaitPidFlag::empty()) {
                    Ok(WaitStatus::Exited(_, code)) => break ExitStatus(code),
                    Ok(WaitStatus::Signaled(_, signal, _)) => break ExitStatus::from(signal),
                    Ok(_) => continue,
                    Err(Errno::EINTR) => continue,
                    Err(errno) => {
                        report_system_error(env, errno, "cannot wait for command")?;
                        break ExitStatus::ERROR;
                    }
                }
            };
            env.exit_status = status;
            apply_errexit(env)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run_string;
    use oxsh_env::builtin::{self, Type};
    use oxsh_env::system::test_helper::DummySystem;

    use std::cell::RefCell;
    use std::rc::Rc;

    /// Creates an environment whose written output can be inspected.
    fn test_env() -> (Env, Rc<RefCell<Vec<u8>>>) {
        let output = Rc::new(RefCell::new(Vec::new()));
        let system = DummySystem {
            output: Rc::clone(&output),
            ..DummySystem::default()
        };
        (Env::new(Box::new(system)), output)
    }

    fn echo_builtin(env: &mut Env, args: Vec<Field>) -> builtin::Result {
        let line = args
            .iter()
            .map(|field| field.value.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        print_to_fd(env, Fd::STDOUT, line.as_bytes());
        print_to_fd(env, Fd::STDOUT, b"\n");
        builtin::Result::new(ExitStatus::SUCCESS)
    }

    fn probe_builtin(env: &mut Env, _args: Vec<Field>) -> builtin::Result {
        // Records the visible value of `probe` at the time of execution.
        let value = env.variables.get_value("probe").unwrap_or("").to_string();
        let exported = env
            .variables
            .get("probe")
            .is_some_and(|variable| variable.exported);
        let output = format!("{value}:{exported}");
        print_to_fd(env, Fd::STDOUT, output.as_bytes());
        builtin::Result::new(ExitStatus::SUCCESS)
    }

    fn register(env: &mut Env, name: &'static str, r#type: Type, main: builtin::Main) {
        env.builtins.insert(
            name,
            Builtin {
                r#type,
                execute: main,
            },
        );
    }

    fn output(buffer: &Rc<RefCell<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&buffer.borrow()).into_owned()
    }

    #[test]
    fn builtin_receives_expanded_arguments() {
        let (mut env, out) = test_env();
        register(&mut env, "echo", Type::Intrinsic, echo_builtin);
        env.variables
            .assign(Scope::Global, "x", Some("a b".to_string()))
            .unwrap();
        run_string(&mut env, "echo $x \"$x\" $((1+1))");
        assert_eq!(output(&out), "a b a b 2\n");
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
    }

    #[test]
    fn assignment_on_special_builtin_persists() {
        let (mut env, _) = test_env();
        register(&mut env, ":", Type::Special, |_, _| {
            builtin::Result::new(ExitStatus::SUCCESS)
        });
        run_string(&mut env, "x=persists :");
        assert_eq!(env.variables.get_value("x"), Some("persists"));
    }

    #[test]
    fn assignment_on_regular_builtin_is_temporary_and_exported() {
        let (mut env, out) = test_env();
        register(&mut env, "probe", Type::Intrinsic, probe_builtin);
        env.variables
            .assign(Scope::Global, "probe", Some("outer".to_string()))
            .unwrap();
        run_string(&mut env, "probe=inner probe");
        // The built-in saw the temporary, exported value.
        assert_eq!(output(&out), "inner:true");
        // The assignment did not persist.
        assert_eq!(env.variables.get_value("probe"), Some("outer"));
    }

    #[test]
    fn command_not_found_sets_127() {
        let (mut env, _) = test_env();
        run_string(&mut env, "no-such-command-anywhere");
        assert_eq!(env.exit_status, ExitStatus::NOT_FOUND);
    }

    #[test]
    fn assignments_only_command_succeeds() {
        let (mut env, _) = test_env();
        env.exit_status = ExitStatus::FAILURE;
        run_string(&mut env, "x=1");
        assert_eq!(env.exit_status, ExitStatus::SUCCESS);
        assert_eq!(env.variables.get_value("x"), Some("1"));
    }

    #[test]
    fn read_only_assignment_aborts_command() {
        let (mut env, out) = test_env();
        register(&mut env, "probe", Type::Intrinsic, probe_builtin);
        env.variables
            .assign(Scope::Global, "x", Some("old".to_string()))
            .unwrap();
        env.variables
            .set_read_only("x", oxsh_syntax::source::Location::dummy());
        let result = run_string(&mut env, "x=new probe");
        assert!(result.is_break());
        // The command was not executed.
        assert_eq!(output(&out), "");
        assert_eq!(env.variables.get_value("x"), Some("old"));
    }

    #[test]
    fn function_call_sets_positional_parameters() {
        let (mut env, out) = test_env();
        register(&mut env, "echo", Type::Intrinsic, echo_builtin);
        run_string(&mut env, "f() { echo $# $1 $2; }; f a b");
        assert_eq!(output(&out), "2 a b\n");
    }

    #[test]
    fn function_parameters_are_restored_after_call() {
        let (mut env, _) = test_env();
        env.variables.positional_params_mut().values = vec!["outer".to_string()];
        run_string(&mut env, "f() { x=$1; }; f inner");
        assert_eq!(env.variables.get_value("x"), Some("inner"));
        assert_eq!(env.variables.positional_params().values, ["outer"]);
    }

    #[test]
    fn function_assignment_persists_by_default() {
        let (mut env, _) = test_env();
        run_string(&mut env, "f() { x=1; }; x=0; f");
        assert_eq!(env.variables.get_value("x"), Some("1"));
    }

    #[test]
    fn all_export_option_exports_assignments() {
        let (mut env, _) = test_env();
        env.options.set(ShellOption::AllExport, true);
        run_string(&mut env, "x=1");
        assert!(env.variables.get("x").unwrap().exported);
    }
}
