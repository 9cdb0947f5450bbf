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

//! The lex–substitute–parse–execute loop
//!
//! [`run_string`] runs a complete source string: command strings given
//! with `-c`, command substitutions, `eval` operands, dot scripts, and
//! trap actions. [`read_eval_loop`] incrementally reads a file descriptor
//! instead, executing each complete command as soon as it has been read,
//! prompting between lines when interactive.

use crate::command::Execute;
use crate::trap::run_traps;
use oxsh_env::io::{print_to_fd, Fd};
use oxsh_env::option::ShellOption;
use oxsh_env::semantics::{Divert, ExitStatus, Result};
use oxsh_syntax::alias::substitute_aliases;
use oxsh_syntax::lex::{Lexer, Scan, Token, TokenId};
use oxsh_syntax::parser::Parser;
use oxsh_env::Env;
use std::ops::ControlFlow::{Break, Continue};

/// Reports a lexical or syntax error.
///
/// The error interrupts the current command with exit status 2; in a
/// non-interactive shell the interrupt exits the shell.
fn report_parse_error(
    env: &mut Env,
    location: &oxsh_syntax::source::Location,
    message: &str,
) -> Result {
    env.print_error(Some(location), message);
    env.exit_status = ExitStatus::ERROR;
    Break(Divert::Interrupt(Some(ExitStatus::ERROR)))
}

/// Parses and executes a complete source string.
pub fn run_string(env: &mut Env, source: &str) -> Result {
    let tokens = match Lexer::from_source(source).collect_tokens() {
        Ok(tokens) => tokens,
        Err(error) => return report_parse_error(env, &error.location, &error.to_string()),
    };
    let tokens = match substitute_aliases(tokens, &env.aliases) {
        Ok(tokens) => tokens,
        Err(error) => return report_parse_error(env, &error.location, &error.to_string()),
    };
    let mut parser = Parser::new(tokens);
    let list = match parser.parse_program() {
        Ok(list) => list,
        Err(error) => return report_parse_error(env, &error.location, &error.to_string()),
    };
    list.execute(env)
}

/// Reads one line from the file descriptor, including the newline.
///
/// Bytes are read one at a time so that no input beyond the newline is
/// consumed; a command that reads the same descriptor must see the bytes
/// the shell has not used. Returns `None` at end of input.
fn read_line(env: &mut Env, fd: Fd) -> Option<String> {
    let mut bytes = Vec::new();
    loop {
        let mut buffer = [0; 1];
        match env.system.read(fd, &mut buffer) {
            Ok(0) => break,
            Ok(_) => {
                bytes.push(buffer[0]);
                if buffer[0] == b'\n' {
                    break;
                }
            }
            Err(oxsh_env::system::Errno::EINTR) => continue,
            Err(_) => break,
        }
    }
    if bytes.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Prints the primary or secondary prompt when interactive.
fn prompt(env: &mut Env, continuation: bool) {
    if !env.is_interactive() {
        return;
    }
    let variable = if continuation { "PS2" } else { "PS1" };
    let default = if continuation { "> " } else { "$ " };
    let value = env
        .variables
        .get_value(variable)
        .unwrap_or(default)
        .to_string();
    print_to_fd(env, Fd::STDERR, value.as_bytes());
}

/// Parses the accumulated tokens and executes them if they form a
/// complete program.
///
/// Returns `None` if the input ends in the middle of a construct and more
/// lines should be read.
fn try_execute(env: &mut Env, tokens: &[Token], at_eof: bool) -> Option<Result> {
    let tokens = match substitute_aliases(tokens.to_vec(), &env.aliases) {
        Ok(tokens) => tokens,
        Err(error) => {
            return Some(report_parse_error(env, &error.location, &error.to_string()))
        }
    };
    let mut parser = Parser::new(tokens);
    match parser.parse_program() {
        Ok(list) => Some(list.execute(env)),
        Err(error) if error.is_unexpected_eof() && !at_eof => None,
        Err(error) => Some(report_parse_error(env, &error.location, &error.to_string())),
    }
}

/// Reads and executes commands from a file descriptor until end of input.
///
/// Each complete command is executed as soon as it has been read, so that
/// earlier commands can affect the parsing of later ones (aliases) and
/// interactive input is handled command by command. In an interactive
/// shell, an [interrupt](Divert::Interrupt) aborts the current command
/// line and the loop continues; any other divert is propagated to the
/// caller.
pub fn read_eval_loop(env: &mut Env, fd: Fd) -> Result {
    let mut lexer = Lexer::new();
    let mut tokens: Vec<Token> = Vec::new();
    let mut at_eof = false;

    loop {
        match lexer.next_token() {
            Err(error) => {
                let result = report_parse_error(env, &error.location, &error.to_string());
                match result {
                    Break(Divert::Interrupt(exit_status)) if env.is_interactive() => {
                        if let Some(exit_status) = exit_status {
                            env.exit_status = exit_status;
                        }
                        // Drop the broken input and start over.
                        lexer = Lexer::new();
                        tokens.clear();
                        at_eof = false;
                    }
                    other => return other,
                }
            }

            Ok(Scan::Incomplete) => {
                debug_assert!(!at_eof, "a finished lexer never reports Incomplete");
                run_traps(env)?;
                prompt(env, !tokens.is_empty());
                match read_line(env, fd) {
                    Some(line) => {
                        if env.options.get(ShellOption::Verbose) {
                            print_to_fd(env, Fd::STDERR, line.as_bytes());
                        }
                        lexer.push_str(&line);
                    }
                    None => {
                        lexer.finish();
                        at_eof = true;
                    }
                }
            }

            Ok(Scan::Token(token)) => {
                let id = token.id;
                tokens.push(token);
                if id != TokenId::Newline && id != TokenId::EndOfInput {
                    continue;
                }

                match try_execute(env, &tokens, at_eof) {
                    None => continue,
                    Some(result) => {
                        tokens.clear();
                        match result {
                            Continue(()) => {}
                            Break(Divert::Interrupt(exit_status)) if env.is_interactive() => {
                                if let Some(exit_status) = exit_status {
                                    env.exit_status = exit_status;
                                }
                            }
                            Break(divert) => return Break(divert),
                        }
                    }
                }

                if id == TokenId::EndOfInput {
                    return Continue(());
                }
            }
        }
    }
}
