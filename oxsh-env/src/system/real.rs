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

//! Implementation of `System` that actually interacts with the system

use super::{
    AccessFlags, Disposition, Errno, FileStat, FileType, Mode, OFlag, Result, System, Times,
    WaitPidFlag, WaitStatus,
};
use crate::fd::MIN_SAVED_FD;
use crate::signal::Signal;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet};
use nix::unistd::{ForkResult, Pid};
use oxsh_syntax::syntax::Fd;
use std::ffi::{c_int, CStr, CString, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flags set by the signal handler, indexed by signal number
///
/// The handler must be async-signal-safe, so it only stores into an
/// atomic; the flags are drained by [`RealSystem::caught_signals`] in
/// normal context.
static CAUGHT: [AtomicBool; 65] = [const { AtomicBool::new(false) }; 65];

extern "C" fn catch_signal(signal: c_int) {
    if let Ok(index) = usize::try_from(signal) {
        if let Some(flag) = CAUGHT.get(index) {
            flag.store(true, Ordering::Relaxed);
        }
    }
}

fn is_regular_file(path: &CStr) -> bool {
    match nix::sys::stat::stat(path) {
        Ok(stat) => stat.st_mode & libc::S_IFMT == libc::S_IFREG,
        Err(_) => false,
    }
}

/// Implementation of `System` that actually interacts with the system
///
/// `RealSystem` has no state at the Rust level because the relevant state
/// is managed by the underlying operating system.
#[derive(Debug)]
pub struct RealSystem(());

impl RealSystem {
    /// Creates an interface to the real system.
    ///
    /// # Safety
    ///
    /// The caller must be the only source of signal handler registrations
    /// in the process, since caught-signal flags are process-global.
    /// The shell registers exactly one `RealSystem` at startup.
    pub unsafe fn new() -> RealSystem {
        RealSystem(())
    }
}

impl System for RealSystem {
    fn fork(&mut self) -> Result<ForkResult> {
        // SAFETY: the child only executes exec, exit, and the self-contained
        // interpreter; no other thread exists in the shell process.
        unsafe { nix::unistd::fork() }
    }

    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Errno {
        match nix::unistd::execve(path, args, envs) {
            Ok(infallible) => match infallible {},
            Err(errno) => errno,
        }
    }

    fn exit(&mut self, exit_code: i32) -> ! {
        std::process::exit(exit_code)
    }

    fn wait(&mut self, target: Pid, options: WaitPidFlag) -> Result<WaitStatus> {
        nix::sys::wait::waitpid(target, Some(options))
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let mut fds = [0 as c_int; 2];
        Errno::result(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
        Ok((Fd(fds[0]), Fd(fds[1])))
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        Errno::result(unsafe { libc::dup2(from.0, to.0) }).map(Fd)
    }

    fn dup_save(&mut self, from: Fd) -> Result<Fd> {
        Errno::result(unsafe { libc::fcntl(from.0, libc::F_DUPFD_CLOEXEC, MIN_SAVED_FD.0) })
            .map(Fd)
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        Errno::result(unsafe { libc::close(fd.0) }).map(drop)
    }

    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd> {
        Errno::result(unsafe {
            libc::open(path.as_ptr(), flags.bits(), mode.bits() as libc::c_uint)
        })
        .map(Fd)
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        let count = Errno::result(unsafe {
            libc::read(fd.0, buffer.as_mut_ptr().cast(), buffer.len())
        })?;
        Ok(count as usize)
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        let count =
            Errno::result(unsafe { libc::write(fd.0, buffer.as_ptr().cast(), buffer.len()) })?;
        Ok(count as usize)
    }

    fn isatty(&self, fd: Fd) -> bool {
        unsafe { libc::isatty(fd.0) == 1 }
    }

    fn umask(&mut self, mask: Mode) -> Mode {
        let previous = unsafe { libc::umask(mask.bits()) };
        Mode::from_bits_truncate(previous)
    }

    fn chdir(&mut self, path: &CStr) -> Result<()> {
        nix::unistd::chdir(path)
    }

    fn getcwd(&self) -> Result<PathBuf> {
        nix::unistd::getcwd()
    }

    fn getpid(&self) -> Pid {
        nix::unistd::getpid()
    }

    fn getppid(&self) -> Pid {
        nix::unistd::getppid()
    }

    fn getpgrp(&self) -> Pid {
        nix::unistd::getpgrp()
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()> {
        nix::unistd::setpgid(pid, pgid)
    }

    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> Result<()> {
        Errno::result(unsafe { libc::tcsetpgrp(fd.0, pgid.as_raw()) }).map(drop)
    }

    fn tcgetpgrp(&self, fd: Fd) -> Result<Pid> {
        Errno::result(unsafe { libc::tcgetpgrp(fd.0) }).map(Pid::from_raw)
    }

    fn kill(&mut self, pid: Pid, signal: Option<Signal>) -> Result<()> {
        nix::sys::signal::kill(pid, signal)
    }

    fn set_disposition(&mut self, signal: Signal, disposition: Disposition) -> Result<()> {
        let handler = match disposition {
            Disposition::Default => SigHandler::SigDfl,
            Disposition::Ignore => SigHandler::SigIgn,
            Disposition::Catch => SigHandler::Handler(catch_signal),
        };
        let action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
        // SAFETY: the handler only stores into an atomic flag.
        unsafe { nix::sys::signal::sigaction(signal, &action) }.map(drop)
    }

    fn caught_signals(&mut self) -> Vec<Signal> {
        let mut signals = Vec::new();
        for (number, flag) in CAUGHT.iter().enumerate() {
            if flag.swap(false, Ordering::Relaxed) {
                if let Ok(signal) = Signal::try_from(number as c_int) {
                    signals.push(signal);
                }
            }
        }
        signals
    }

    fn home_directory(&self, user: &str) -> Option<String> {
        let user = nix::unistd::User::from_name(user).ok()??;
        user.dir.to_str().map(str::to_owned)
    }

    fn stat(&self, path: &CStr) -> Result<FileStat> {
        let stat = nix::sys::stat::stat(path)?;
        let r#type = match stat.st_mode & libc::S_IFMT {
            libc::S_IFREG => FileType::Regular,
            libc::S_IFDIR => FileType::Directory,
            _ => FileType::Other,
        };
        Ok(FileStat {
            r#type,
            size: stat.st_size.max(0) as u64,
            mode: Mode::from_bits_truncate(stat.st_mode & 0o7777),
        })
    }

    fn read_dir(&self, path: &CStr) -> Result<Vec<String>> {
        let path = OsStr::from_bytes(path.to_bytes());
        let entries = std::fs::read_dir(path)
            .map_err(|error| Errno::from_raw(error.raw_os_error().unwrap_or(libc::EIO)))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|error| Errno::from_raw(error.raw_os_error().unwrap_or(libc::EIO)))?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    fn access(&self, path: &CStr, flags: AccessFlags) -> bool {
        nix::unistd::access(path, flags).is_ok()
    }

    fn is_executable_file(&self, path: &CStr) -> bool {
        is_regular_file(path) && nix::unistd::access(path, AccessFlags::X_OK).is_ok()
    }

    fn times(&self) -> Result<Times> {
        let mut tms = libc::tms {
            tms_utime: 0,
            tms_stime: 0,
            tms_cutime: 0,
            tms_cstime: 0,
        };
        Errno::result(unsafe { libc::times(&mut tms) })?;
        let ticks_per_second =
            Errno::result(unsafe { libc::sysconf(libc::_SC_CLK_TCK) })? as f64;
        Ok(Times {
            self_user: tms.tms_utime as f64 / ticks_per_second,
            self_system: tms.tms_stime as f64 / ticks_per_second,
            children_user: tms.tms_cutime as f64 / ticks_per_second,
            children_system: tms.tms_cstime as f64 / ticks_per_second,
        })
    }
}
