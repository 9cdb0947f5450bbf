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

//! Type definitions for job management
//!
//! A [`Job`] records the processes executing one pipeline. Jobs live in a
//! [`JobSet`], an index-based arena: other parts of the shell refer to
//! jobs by arena key, never by pointer, so a removed job can never be
//! reached through a dangling reference.

use crate::semantics::ExitStatus;
use crate::signal::Signal;
use slab::Slab;

#[doc(no_inline)]
pub use nix::unistd::Pid;

/// State of one process in a job
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessState {
    /// The process is running.
    Running,
    /// The process was stopped by a signal.
    Stopped(Signal),
    /// The process exited with the given status.
    Exited(ExitStatus),
    /// The process was killed by a signal.
    Signaled(Signal),
}

impl ProcessState {
    /// Whether the process has finished, one way or another.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, ProcessState::Exited(_) | ProcessState::Signaled(_))
    }

    /// The exit status the process reports to the shell.
    ///
    /// A process killed by signal _n_ reports 128 + _n_; a running or
    /// stopped process reports nothing.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            ProcessState::Exited(exit_status) => Some(*exit_status),
            ProcessState::Signaled(signal) => Some(ExitStatus::from(*signal)),
            ProcessState::Running | ProcessState::Stopped(_) => None,
        }
    }
}

/// One process of a job
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Process {
    /// Process ID
    pub pid: Pid,
    /// Last known state of the process
    pub state: ProcessState,
    /// Source form of the command the process is executing
    pub name: String,
}

/// Aggregated state of a job, derived from its member processes
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobState {
    /// At least one member is stopped.
    Stopped,
    /// No member is stopped and at least one is running.
    Running,
    /// All members have finished and at least one was killed by a signal.
    Terminated,
    /// All members exited normally.
    Done,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Stopped => "Stopped",
            JobState::Running => "Running",
            JobState::Terminated => "Terminated",
            JobState::Done => "Done",
        };
        f.write_str(s)
    }
}

/// Set of processes executing one pipeline
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    /// User-visible job number, as in `%1`
    pub number: usize,
    /// Process group ID of the job
    pub pgid: Pid,
    /// Member processes, in pipeline order
    pub processes: Vec<Process>,
    /// Whether the job was started asynchronously
    pub is_background: bool,
    /// Whether the user has been told about the job's current state
    pub is_notified: bool,
}

impl Job {
    /// Computes the aggregated state of the job.
    #[must_use]
    pub fn state(&self) -> JobState {
        let mut any_running = false;
        let mut any_signaled = false;
        for process in &self.processes {
            match process.state {
                ProcessState::Stopped(_) => return JobState::Stopped,
                ProcessState::Running => any_running = true,
                ProcessState::Signaled(_) => any_signaled = true,
                ProcessState::Exited(_) => {}
            }
        }
        if any_running {
            JobState::Running
        } else if any_signaled {
            JobState::Terminated
        } else {
            JobState::Done
        }
    }

    /// The exit status of the job: that of its last member process.
    #[must_use]
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.processes.last().and_then(|p| p.state.exit_status())
    }

    /// Source form of the pipeline the job is executing.
    #[must_use]
    pub fn name(&self) -> String {
        self.processes
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Whether the job has finished and its state has been reported.
    #[must_use]
    pub fn is_reapable(&self) -> bool {
        self.is_notified && matches!(self.state(), JobState::Done | JobState::Terminated)
    }
}

/// Collection of jobs
#[derive(Clone, Debug, Default)]
pub struct JobSet {
    jobs: Slab<Job>,
    /// Number to give the next added job
    next_number: usize,
    /// Arena key of the current job (`%+`)
    current: Option<usize>,
    /// Arena key of the previous job (`%-`)
    previous: Option<usize>,
    /// Process ID of the most recent asynchronous command (`$!`)
    last_async_pid: Option<Pid>,
}

impl JobSet {
    /// Adds a job, making it the current job.
    ///
    /// Returns the arena key of the added job. Job numbers increase
    /// monotonically, starting from 1.
    pub fn add(&mut self, pgid: Pid, processes: Vec<Process>, is_background: bool) -> usize {
        self.next_number += 1;
        let job = Job {
            number: self.next_number,
            pgid,
            processes,
            is_background,
            is_notified: false,
        };
        let key = self.jobs.insert(job);
        if self.current != Some(key) {
            self.previous = self.current;
            self.current = Some(key);
        }
        key
    }

    /// Returns a reference to the job with the given arena key.
    #[must_use]
    pub fn get(&self, key: usize) -> Option<&Job> {
        self.jobs.get(key)
    }

    /// Returns a mutable reference to the job with the given arena key.
    pub fn get_mut(&mut self, key: usize) -> Option<&mut Job> {
        self.jobs.get_mut(key)
    }

    /// Iterates over all jobs in job-number order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Job)> {
        let mut jobs: Vec<_> = self.jobs.iter().collect();
        jobs.sort_by_key(|(_, job)| job.number);
        jobs.into_iter()
    }

    /// Finds the job containing the given process and the index of the
    /// process within it.
    #[must_use]
    pub fn find_by_pid(&self, pid: Pid) -> Option<(usize, usize)> {
        self.jobs.iter().find_map(|(key, job)| {
            job.processes
                .iter()
                .position(|p| p.pid == pid)
                .map(|index| (key, index))
        })
    }

    /// Records a state change of the given process.
    ///
    /// Returns the key of the affected job, if any. A job whose state
    /// changes becomes un-notified again.
    pub fn report(&mut self, pid: Pid, state: ProcessState) -> Option<usize> {
        let (key, index) = self.find_by_pid(pid)?;
        let job = &mut self.jobs[key];
        if job.processes[index].state != state {
            job.processes[index].state = state;
            job.is_notified = false;
        }
        Some(key)
    }

    /// Looks up a job by its user-visible number.
    #[must_use]
    pub fn find_by_number(&self, number: usize) -> Option<usize> {
        self.jobs
            .iter()
            .find(|(_, job)| job.number == number)
            .map(|(key, _)| key)
    }

    /// The current job (`%+`).
    #[must_use]
    pub fn current_job(&self) -> Option<usize> {
        self.current
    }

    /// The previous job (`%-`).
    #[must_use]
    pub fn previous_job(&self) -> Option<usize> {
        self.previous
    }

    /// Removes the job with the given key.
    pub fn remove(&mut self, key: usize) -> Option<Job> {
        if !self.jobs.contains(key) {
            return None;
        }
        let job = self.jobs.remove(key);
        if self.current == Some(key) {
            self.current = self.previous.take();
        } else if self.previous == Some(key) {
            self.previous = None;
        }
        job.into()
    }

    /// Removes all jobs that have finished and been reported to the user.
    pub fn remove_reapable(&mut self) {
        let keys: Vec<usize> = self
            .jobs
            .iter()
            .filter(|(_, job)| job.is_reapable())
            .map(|(key, _)| key)
            .collect();
        for key in keys {
            self.remove(key);
        }
    }

    /// Returns the process ID of the most recent asynchronous command.
    #[must_use]
    pub fn last_async_pid(&self) -> Option<Pid> {
        self.last_async_pid
    }

    /// Sets the process ID of the most recent asynchronous command.
    pub fn set_last_async_pid(&mut self, pid: Pid) {
        self.last_async_pid = Some(pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(pid: i32, state: ProcessState) -> Process {
        Process {
            pid: Pid::from_raw(pid),
            state,
            name: format!("proc{pid}"),
        }
    }

    #[test]
    fn aggregated_state() {
        let mut job = Job {
            number: 1,
            pgid: Pid::from_raw(100),
            processes: vec![
                process(100, ProcessState::Running),
                process(101, ProcessState::Exited(ExitStatus::SUCCESS)),
            ],
            is_background: true,
            is_notified: false,
        };
        assert_eq!(job.state(), JobState::Running);

        job.processes[0].state = ProcessState::Stopped(Signal::SIGTSTP);
        assert_eq!(job.state(), JobState::Stopped);

        job.processes[0].state = ProcessState::Signaled(Signal::SIGKILL);
        assert_eq!(job.state(), JobState::Terminated);

        job.processes[0].state = ProcessState::Exited(ExitStatus::FAILURE);
        assert_eq!(job.state(), JobState::Done);
    }

    #[test]
    fn job_numbers_are_monotonic() {
        let mut set = JobSet::default();
        let a = set.add(Pid::from_raw(1), vec![], true);
        let b = set.add(Pid::from_raw(2), vec![], true);
        set.remove(a);
        let c = set.add(Pid::from_raw(3), vec![], true);
        assert_eq!(set.get(b).unwrap().number, 2);
        assert_eq!(set.get(c).unwrap().number, 3);
    }

    #[test]
    fn current_and_previous_jobs() {
        let mut set = JobSet::default();
        let a = set.add(Pid::from_raw(1), vec![], true);
        assert_eq!(set.current_job(), Some(a));
        assert_eq!(set.previous_job(), None);

        let b = set.add(Pid::from_raw(2), vec![], true);
        assert_eq!(set.current_job(), Some(b));
        assert_eq!(set.previous_job(), Some(a));

        set.remove(b);
        assert_eq!(set.current_job(), Some(a));
    }

    #[test]
    fn report_updates_state_and_notification() {
        let mut set = JobSet::default();
        let key = set.add(
            Pid::from_raw(10),
            vec![process(10, ProcessState::Running)],
            true,
        );
        set.get_mut(key).unwrap().is_notified = true;

        let reported = set.report(
            Pid::from_raw(10),
            ProcessState::Exited(ExitStatus::SUCCESS),
        );
        assert_eq!(reported, Some(key));
        let job = set.get(key).unwrap();
        assert_eq!(job.state(), JobState::Done);
        assert!(!job.is_notified);

        assert_eq!(set.report(Pid::from_raw(99), ProcessState::Running), None);
    }

    #[test]
    fn reapable_jobs_are_removed() {
        let mut set = JobSet::default();
        let done = set.add(
            Pid::from_raw(1),
            vec![process(1, ProcessState::Exited(ExitStatus::SUCCESS))],
            true,
        );
        let running = set.add(
            Pid::from_raw(2),
            vec![process(2, ProcessState::Running)],
            true,
        );
        set.get_mut(done).unwrap().is_notified = true;
        set.get_mut(running).unwrap().is_notified = true;

        set.remove_reapable();
        assert!(set.get(done).is_none());
        assert!(set.get(running).is_some());
    }
}
