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

//! Interface to the underlying operating system
//!
//! The [`System`] trait collects every OS interaction the shell performs:
//! process creation and waiting, file descriptor manipulation, signal
//! dispositions, and process attributes. [`RealSystem`] implements the
//! trait against the real system. Nothing outside this module calls
//! process-related OS primitives directly.

use crate::signal::Signal;
use oxsh_syntax::syntax::Fd;
use std::ffi::{CStr, CString};
use std::fmt::Debug;
use std::path::PathBuf;

#[doc(no_inline)]
pub use nix::errno::Errno;
#[doc(no_inline)]
pub use nix::fcntl::OFlag;
#[doc(no_inline)]
pub use nix::sys::stat::Mode;
#[doc(no_inline)]
pub use nix::sys::wait::{WaitPidFlag, WaitStatus};
#[doc(no_inline)]
pub use nix::unistd::{AccessFlags, ForkResult, Pid};

/// Result type for system operations
pub type Result<T> = std::result::Result<T, Errno>;

/// Type of a file, as far as the shell distinguishes
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FileType {
    /// Regular file
    Regular,
    /// Directory
    Directory,
    /// Anything else (device, pipe, socket, symbolic link, ...)
    Other,
}

/// Metadata of a file
///
/// This is the subset of `stat(2)` results the shell consults: pathname
/// expansion checks existence and the `test` built-in checks the type,
/// size, and permission bits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileStat {
    /// Type of the file
    pub r#type: FileType,
    /// Size of the file in bytes
    pub size: u64,
    /// Permission bits of the file
    pub mode: Mode,
}

/// Signal disposition selected by the shell
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Disposition {
    /// Perform the default action.
    Default,
    /// Ignore the signal.
    Ignore,
    /// Record the signal for retrieval with
    /// [`caught_signals`](System::caught_signals).
    Catch,
}

/// Process times in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Times {
    /// User CPU time of the shell process
    pub self_user: f64,
    /// System CPU time of the shell process
    pub self_system: f64,
    /// User CPU time of waited-for children
    pub children_user: f64,
    /// System CPU time of waited-for children
    pub children_system: f64,
}

/// Abstraction of the operating system interface
///
/// All methods that can fail return an [`Errno`] error. See the module
/// documentation for the design rationale.
pub trait System: Debug {
    /// Creates a new child process.
    ///
    /// This calls `fork(2)`. The caller must make sure the child process
    /// does not return from the code that handles the
    /// [`Child`](ForkResult::Child) case; it must either exec or exit.
    fn fork(&mut self) -> Result<ForkResult>;

    /// Replaces the current process image.
    ///
    /// On success, this function never returns.
    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Errno;

    /// Terminates the current process immediately.
    fn exit(&mut self, exit_code: i32) -> !;

    /// Waits for a state change of the given process or process group.
    fn wait(&mut self, target: Pid, options: WaitPidFlag) -> Result<WaitStatus>;

    /// Creates a pipe, returning the read and write ends.
    fn pipe(&mut self) -> Result<(Fd, Fd)>;

    /// Duplicates `from` onto `to`, closing `to` first if open.
    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd>;

    /// Duplicates `from` to the lowest free descriptor not less than
    /// [`MIN_SAVED_FD`](crate::fd::MIN_SAVED_FD), with the close-on-exec
    /// flag set.
    ///
    /// This is how a descriptor is saved out of the way before a
    /// redirection overwrites it.
    fn dup_save(&mut self, from: Fd) -> Result<Fd>;

    /// Closes the file descriptor.
    fn close(&mut self, fd: Fd) -> Result<()>;

    /// Opens a file.
    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd>;

    /// Reads from the file descriptor.
    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize>;

    /// Writes to the file descriptor.
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize>;

    /// Whether the file descriptor refers to a terminal.
    fn isatty(&self, fd: Fd) -> bool;

    /// Sets the file mode creation mask, returning the previous mask.
    fn umask(&mut self, mask: Mode) -> Mode;

    /// Changes the working directory.
    fn chdir(&mut self, path: &CStr) -> Result<()>;

    /// Returns the current working directory.
    fn getcwd(&self) -> Result<PathBuf>;

    /// Returns the process ID of the shell process.
    fn getpid(&self) -> Pid;

    /// Returns the process ID of the parent process.
    fn getppid(&self) -> Pid;

    /// Returns the process group ID of the shell process.
    fn getpgrp(&self) -> Pid;

    /// Sets the process group of a process.
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()>;

    /// Makes the process group the foreground process group of the
    /// terminal open at the file descriptor.
    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> Result<()>;

    /// Returns the foreground process group of the terminal.
    fn tcgetpgrp(&self, fd: Fd) -> Result<Pid>;

    /// Sends a signal to a process or process group.
    ///
    /// A `None` signal validates the target without sending anything.
    fn kill(&mut self, pid: Pid, signal: Option<Signal>) -> Result<()>;

    /// Selects what happens when the shell receives the signal.
    fn set_disposition(&mut self, signal: Signal, disposition: Disposition) -> Result<()>;

    /// Returns the signals caught since the last call.
    fn caught_signals(&mut self) -> Vec<Signal>;

    /// Returns the home directory of the named user, from the user
    /// database.
    fn home_directory(&self, user: &str) -> Option<String>;

    /// Returns the metadata of the file at the path.
    fn stat(&self, path: &CStr) -> Result<FileStat>;

    /// Returns the names of the entries of the directory at the path,
    /// excluding `.` and `..`.
    ///
    /// Pathname expansion scans directories through this method so that
    /// it can run against a simulated file system in tests.
    fn read_dir(&self, path: &CStr) -> Result<Vec<String>>;

    /// Whether the file at the path is accessible in the given ways.
    fn access(&self, path: &CStr, flags: AccessFlags) -> bool;

    /// Whether the path names an executable regular file.
    fn is_executable_file(&self, path: &CStr) -> bool;

    /// Returns the consumed CPU times of the shell and its waited-for
    /// children.
    fn times(&self) -> Result<Times>;
}

mod real;

pub use self::real::RealSystem;

#[cfg(any(test, feature = "test-helper"))]
pub mod test_helper {
    //! A do-nothing system for unit tests of pure bookkeeping code.
    //!
    //! This module is available to dependent crates through the
    //! `test-helper` cargo feature.

    use super::*;
    use crate::fd::MIN_SAVED_FD;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// System whose operations record their arguments or fail
    ///
    /// The output buffer is shared so a test can keep a handle to it
    /// while the environment owns the system. The `files` map is a
    /// simulated file hierarchy consulted by [`stat`](System::stat),
    /// [`read_dir`](System::read_dir), and [`access`](System::access), so
    /// pathname expansion and file tests can run without touching the
    /// real file system.
    #[derive(Debug, Default)]
    pub struct DummySystem {
        /// Signal dispositions selected so far
        pub dispositions: HashMap<Signal, Disposition>,
        /// Bytes written to any file descriptor
        pub output: Rc<RefCell<Vec<u8>>>,
        /// Simulated files, keyed by absolute path
        pub files: HashMap<String, FileStat>,
    }

    impl DummySystem {
        /// Adds a regular file, creating its ancestor directories.
        pub fn add_file(&mut self, path: &str) {
            self.add_dirs_leading_to(path);
            self.files.insert(
                path.to_string(),
                FileStat {
                    r#type: FileType::Regular,
                    size: 1,
                    mode: Mode::from_bits_truncate(0o644),
                },
            );
        }

        /// Adds a directory, creating its ancestor directories.
        pub fn add_dir(&mut self, path: &str) {
            self.add_dirs_leading_to(path);
            self.files.insert(
                path.to_string(),
                FileStat {
                    r#type: FileType::Directory,
                    size: 0,
                    mode: Mode::from_bits_truncate(0o755),
                },
            );
        }

        fn add_dirs_leading_to(&mut self, path: &str) {
            let mut end = 0;
            while let Some(slash) = path[end..].find('/') {
                end += slash;
                if end > 0 {
                    self.files.entry(path[..end].to_string()).or_insert(FileStat {
                        r#type: FileType::Directory,
                        size: 0,
                        mode: Mode::from_bits_truncate(0o755),
                    });
                }
                end += 1;
            }
        }
    }

    impl System for DummySystem {
        fn fork(&mut self) -> Result<ForkResult> {
            Err(Errno::ENOSYS)
        }
        fn execve(&mut self, _: &CStr, _: &[CString], _: &[CString]) -> Errno {
            Errno::ENOSYS
        }
        fn exit(&mut self, exit_code: i32) -> ! {
            panic!("DummySystem::exit({exit_code})")
        }
        fn wait(&mut self, _: Pid, _: WaitPidFlag) -> Result<WaitStatus> {
            Err(Errno::ECHILD)
        }
        fn pipe(&mut self) -> Result<(Fd, Fd)> {
            Err(Errno::ENOSYS)
        }
        fn dup2(&mut self, _: Fd, to: Fd) -> Result<Fd> {
            Ok(to)
        }
        fn dup_save(&mut self, _: Fd) -> Result<Fd> {
            Ok(MIN_SAVED_FD)
        }
        fn close(&mut self, _: Fd) -> Result<()> {
            Ok(())
        }
        fn open(&mut self, _: &CStr, _: OFlag, _: Mode) -> Result<Fd> {
            Err(Errno::ENOSYS)
        }
        fn read(&mut self, _: Fd, _: &mut [u8]) -> Result<usize> {
            Ok(0)
        }
        fn write(&mut self, _: Fd, buffer: &[u8]) -> Result<usize> {
            self.output.borrow_mut().extend_from_slice(buffer);
            Ok(buffer.len())
        }
        fn isatty(&self, _: Fd) -> bool {
            false
        }
        fn umask(&mut self, _: Mode) -> Mode {
            Mode::empty()
        }
        fn chdir(&mut self, _: &CStr) -> Result<()> {
            Ok(())
        }
        fn getcwd(&self) -> Result<PathBuf> {
            Ok(PathBuf::from("/"))
        }
        fn getpid(&self) -> Pid {
            Pid::from_raw(1)
        }
        fn getppid(&self) -> Pid {
            Pid::from_raw(0)
        }
        fn getpgrp(&self) -> Pid {
            Pid::from_raw(1)
        }
        fn setpgid(&mut self, _: Pid, _: Pid) -> Result<()> {
            Ok(())
        }
        fn tcsetpgrp(&mut self, _: Fd, _: Pid) -> Result<()> {
            Ok(())
        }
        fn tcgetpgrp(&self, _: Fd) -> Result<Pid> {
            Ok(Pid::from_raw(1))
        }
        fn kill(&mut self, _: Pid, _: Option<Signal>) -> Result<()> {
            Ok(())
        }
        fn set_disposition(&mut self, signal: Signal, disposition: Disposition) -> Result<()> {
            self.dispositions.insert(signal, disposition);
            Ok(())
        }
        fn caught_signals(&mut self) -> Vec<Signal> {
            Vec::new()
        }
        fn home_directory(&self, _: &str) -> Option<String> {
            None
        }
        fn stat(&self, path: &CStr) -> Result<FileStat> {
            let path = path.to_str().map_err(|_| Errno::EILSEQ)?;
            self.files.get(path).copied().ok_or(Errno::ENOENT)
        }
        fn read_dir(&self, path: &CStr) -> Result<Vec<String>> {
            let path = path.to_str().map_err(|_| Errno::EILSEQ)?;
            match self.files.get(path) {
                Some(stat) if stat.r#type == FileType::Directory => {}
                Some(_) => return Err(Errno::ENOTDIR),
                None => return Err(Errno::ENOENT),
            }
            let prefix = if path.ends_with('/') {
                path.to_string()
            } else {
                format!("{path}/")
            };
            let mut names: Vec<String> = self
                .files
                .keys()
                .filter_map(|file| file.strip_prefix(&prefix))
                .filter(|rest| !rest.is_empty() && !rest.contains('/'))
                .map(str::to_owned)
                .collect();
            names.sort();
            Ok(names)
        }
        fn access(&self, path: &CStr, flags: AccessFlags) -> bool {
            let Ok(path) = path.to_str() else {
                return false;
            };
            let Some(stat) = self.files.get(path) else {
                return false;
            };
            !flags.contains(AccessFlags::X_OK)
                || stat.mode.bits() & 0o111 != 0
        }
        fn is_executable_file(&self, path: &CStr) -> bool {
            let Ok(path) = path.to_str() else {
                return false;
            };
            let Some(stat) = self.files.get(path) else {
                return false;
            };
            stat.r#type == FileType::Regular && stat.mode.bits() & 0o111 != 0
        }
        fn times(&self) -> Result<Times> {
            Ok(Times::default())
        }
    }
}
