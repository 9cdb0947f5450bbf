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

//! Redirection semantics
//!
//! Redirections are applied in the order they appear. Before a file
//! descriptor is overwritten, its previous state is saved by duplicating
//! it to a high descriptor with the close-on-exec flag; the [`RedirGuard`]
//! undoes the redirections in reverse order when dropped, or
//! [commits](RedirGuard::commit) them permanently for `exec`.

use crate::expansion;
use oxsh_env::fd::{self, FdOrigin, FdTable, SavedFd};
use oxsh_env::option::ShellOption;
use oxsh_env::system::{Errno, Mode, OFlag};
use oxsh_env::Env;
use oxsh_syntax::source::Location;
use oxsh_syntax::syntax::{Fd, Redir, RedirBody, RedirOp, Text};
use std::ffi::CString;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Cause of a redirection error
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ErrorCause {
    /// Expanding the redirection operand failed.
    #[error(transparent)]
    Expansion(#[from] expansion::Error),

    /// The target file could not be opened.
    #[error("cannot open `{target}`: {errno}")]
    OpenFile {
        /// Name of the file
        target: String,
        /// Error returned by the system
        errno: Errno,
    },

    /// The operand of `<&` or `>&` is not a file descriptor or `-`.
    #[error("`{operand}` is not a valid file descriptor")]
    InvalidFdOperand {
        /// The operand as expanded
        operand: String,
    },

    /// A system call failed while manipulating file descriptors.
    #[error("redirection error: {0}")]
    FdError(Errno),
}

/// Redirection error with its location
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    /// Cause of the error
    pub cause: ErrorCause,
    /// Position of the redirection
    pub location: Location,
}

/// RAII guard that undoes applied redirections when dropped
///
/// The guard dereferences to the environment so the command being
/// redirected can be executed through it.
#[derive(Debug)]
#[must_use = "redirections are undone when the guard is dropped"]
pub struct RedirGuard<'e> {
    env: &'e mut Env,
    saved: FdTable,
}

impl<'e> RedirGuard<'e> {
    /// Creates a guard with no redirections applied yet.
    pub fn new(env: &'e mut Env) -> Self {
        RedirGuard {
            env,
            saved: FdTable::default(),
        }
    }

    /// Applies all the given redirections in order.
    ///
    /// On error, the redirections applied so far remain applied; they are
    /// undone when the guard is dropped.
    pub fn perform_redirs(&mut self, redirs: &[Redir]) -> Result<(), Error> {
        for redir in redirs {
            self.perform_redir(redir)?;
        }
        Ok(())
    }

    /// Saves the state of a descriptor about to be overwritten.
    fn save(&mut self, fd: Fd, origin: FdOrigin) -> Result<(), Error> {
        let saved_as = match self.env.system.dup_save(fd) {
            Ok(saved) => Some(saved),
            // The descriptor was closed; restoring will close it again.
            Err(Errno::EBADF) => None,
            Err(errno) => {
                return Err(Error {
                    cause: ErrorCause::FdError(errno),
                    location: Location::dummy(),
                })
            }
        };
        self.saved.record(SavedFd {
            fd,
            saved_as,
            origin,
        });
        Ok(())
    }

    /// Applies one redirection.
    fn perform_redir(&mut self, redir: &Redir) -> Result<(), Error> {
        let fd = redir.fd_or_default();
        match &redir.body {
            RedirBody::Normal { operator, operand } => {
                let target = expansion::expand_word_single(self.env, operand, false)
                    .map_err(|error| Error {
                        location: error.location,
                        cause: ErrorCause::Expansion(error),
                    })?;
                let location = target.origin;

                match operator {
                    RedirOp::FdIn | RedirOp::FdOut => {
                        self.save(fd, FdOrigin::Dup)?;
                        if target.value == "-" {
                            self.env.system.close(fd).ok();
                            return Ok(());
                        }
                        let source = target
                            .value
                            .parse()
                            .map(Fd)
                            .map_err(|_| Error {
                                cause: ErrorCause::InvalidFdOperand {
                                    operand: target.value.clone(),
                                },
                                location,
                            })?;
                        self.env.system.dup2(source, fd).map_err(|errno| Error {
                            cause: ErrorCause::FdError(errno),
                            location,
                        })?;
                    }

                    _ => {
                        let flags = match operator {
                            RedirOp::FileIn => OFlag::O_RDONLY,
                            RedirOp::FileInOut => OFlag::O_RDWR | OFlag::O_CREAT,
                            RedirOp::FileOut => {
                                if self.env.options.get(ShellOption::Clobber) {
                                    OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC
                                } else {
                                    // noclobber: refuse to overwrite an
                                    // existing file
                                    OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_EXCL
                                }
                            }
                            RedirOp::FileClobber => {
                                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC
                            }
                            RedirOp::FileAppend => {
                                OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND
                            }
                            RedirOp::FdIn | RedirOp::FdOut => unreachable!("handled above"),
                        };
                        let path = CString::new(target.value.clone()).map_err(|_| Error {
                            cause: ErrorCause::OpenFile {
                                target: target.value.clone(),
                                errno: Errno::EILSEQ,
                            },
                            location,
                        })?;
                        // The old state must be saved before the open, so
                        // that the new descriptor cannot be mistaken for
                        // the old one if the open lands on the same
                        // number.
                        self.save(fd, FdOrigin::File)?;
                        let mode = Mode::from_bits_truncate(0o666);
                        let opened = self
                            .env
                            .system
                            .open(&path, flags, mode)
                            .map_err(|errno| Error {
                                cause: ErrorCause::OpenFile {
                                    target: target.value.clone(),
                                    errno,
                                },
                                location,
                            })?;
                        self.move_fd(opened, fd)?;
                    }
                }
            }

            RedirBody::HereDoc(here_doc) => {
                let content = here_doc
                    .content
                    .get()
                    .expect("here-doc content is filled by the parser");
                let value = self.expand_heredoc_content(content)?;
                self.save(fd, FdOrigin::HereDoc)?;
                let (read_end, write_end) =
                    self.env.system.pipe().map_err(|errno| Error {
                        cause: ErrorCause::FdError(errno),
                        location: here_doc.delimiter.location,
                    })?;
                // Writing the whole content up front bounds here-docs to
                // the pipe capacity, which is ample for the usual inline
                // use.
                let mut bytes = value.as_bytes();
                while !bytes.is_empty() {
                    match self.env.system.write(write_end, bytes) {
                        Ok(0) | Err(_) => break,
                        Ok(count) => bytes = &bytes[count..],
                    }
                }
                self.env.system.close(write_end).ok();
                self.move_fd(read_end, fd)?;
            }
        }
        Ok(())
    }

    /// Moves an open descriptor onto the redirected number.
    fn move_fd(&mut self, from: Fd, to: Fd) -> Result<(), Error> {
        if from != to {
            self.env.system.dup2(from, to).map_err(|errno| Error {
                cause: ErrorCause::FdError(errno),
                location: Location::dummy(),
            })?;
            self.env.system.close(from).ok();
        }
        Ok(())
    }

    /// Expands the content of a here-document.
    ///
    /// The content is expanded like a double-quoted string: no field
    /// splitting and no pathname expansion, with quoting characters kept
    /// out of the result.
    fn expand_heredoc_content(&mut self, content: &Text) -> Result<String, Error> {
        let mut output = crate::expansion::Output::new();
        crate::expansion::expand_text(self.env, content, true, &mut output).map_err(|error| {
            Error {
                location: error.location,
                cause: ErrorCause::Expansion(error),
            }
        })?;
        Ok(output
            .into_strings()
            .iter()
            .flat_map(|string| &string.chars)
            .filter(|c| !c.is_quoting)
            .map(|c| c.value)
            .collect())
    }

    /// Makes the applied redirections permanent.
    ///
    /// The saved descriptors are closed instead of being restored. This
    /// implements the redirections of the `exec` special built-in.
    pub fn commit(mut self) {
        for entry in self.saved.take_entries() {
            if let Some(saved) = entry.saved_as {
                self.env.system.close(saved).ok();
            }
        }
    }
}

impl Drop for RedirGuard<'_> {
    fn drop(&mut self) {
        fd::restore(&mut *self.env.system, self.saved.take_entries());
    }
}

impl Deref for RedirGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for RedirGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

/// Reports a redirection error and decides how to continue.
///
/// A redirection error aborts the simple command with a non-zero exit
/// status; for a special built-in it interrupts the shell.
pub fn report_error(env: &mut Env, error: &Error, special: bool) -> oxsh_env::semantics::Result {
    use oxsh_env::semantics::{Divert, ExitStatus};
    env.print_error(Some(&error.location), &error.cause.to_string());
    env.exit_status = ExitStatus::FAILURE;
    if special {
        std::ops::ControlFlow::Break(Divert::Interrupt(Some(ExitStatus::FAILURE)))
    } else {
        std::ops::ControlFlow::Continue(())
    }
}
