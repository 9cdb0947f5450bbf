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

//! Signal and exit handling settings
//!
//! A [`TrapSet`] maps [conditions](Condition) to [actions](Action). Signal
//! delivery is asynchronous: the OS handler installed through the
//! [`System`] only records the signal, and the execution engine polls for
//! recorded signals at suspension points and runs the corresponding
//! handler commands as trap-handler frames. A handler cannot interrupt
//! another handler; signals caught during one are held until it finishes.

use crate::signal::Signal;
use crate::system::{Disposition, System};
use std::collections::btree_map::BTreeMap;
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

/// Condition under which a trap action is taken
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Condition {
    /// The shell is exiting.
    Exit,
    /// The shell received the signal.
    Signal(Signal),
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Exit => f.write_str("EXIT"),
            Condition::Signal(signal) => f.write_str(crate::signal::signal_name(*signal)),
        }
    }
}

/// Action taken on a trap condition
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Action {
    /// Performs the default signal disposition.
    #[default]
    Default,
    /// Ignores the condition.
    Ignore,
    /// Executes the command string.
    ///
    /// The string is reference-counted so that executing the trap does not
    /// clone it out of the trap set.
    Command(Rc<str>),
}

/// Error setting a trap action
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SetActionError {
    /// SIGKILL cannot be caught or ignored.
    #[error("SIGKILL cannot be trapped")]
    SigKill,
    /// SIGSTOP cannot be caught or ignored.
    #[error("SIGSTOP cannot be trapped")]
    SigStop,
    /// Error in the underlying system call
    #[error("{0}")]
    SystemError(crate::system::Errno),
}

/// Collection of trap settings
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    /// Actions per condition, ordered for reproducible `trap` output
    actions: BTreeMap<Condition, Action>,
    /// Signals caught but not yet handled
    pending: VecDeque<Signal>,
    /// Whether a trap handler is currently executing
    ///
    /// While a handler runs, no other handler is started; this is what
    /// makes handlers non-reentrant.
    in_handler: bool,
}

impl TrapSet {
    /// Returns the action for a condition.
    #[must_use]
    pub fn get_action(&self, condition: Condition) -> &Action {
        self.actions.get(&condition).unwrap_or(&Action::Default)
    }

    /// Sets the action for a condition, updating the signal disposition in
    /// the system accordingly.
    pub fn set_action(
        &mut self,
        system: &mut dyn System,
        condition: Condition,
        action: Action,
    ) -> Result<(), SetActionError> {
        if let Condition::Signal(signal) = condition {
            match signal {
                Signal::SIGKILL => return Err(SetActionError::SigKill),
                Signal::SIGSTOP => return Err(SetActionError::SigStop),
                _ => {}
            }
            let disposition = match &action {
                Action::Default => Disposition::Default,
                Action::Ignore => Disposition::Ignore,
                Action::Command(_) => Disposition::Catch,
            };
            system
                .set_disposition(signal, disposition)
                .map_err(SetActionError::SystemError)?;
        }
        if action == Action::Default {
            self.actions.remove(&condition);
        } else {
            self.actions.insert(condition, action);
        }
        Ok(())
    }

    /// Iterates over the conditions with non-default actions.
    pub fn iter(&self) -> impl Iterator<Item = (Condition, &Action)> {
        self.actions
            .iter()
            .map(|(&condition, action)| (condition, action))
    }

    /// Resets caught-signal actions on entering a subshell.
    ///
    /// POSIX requires a subshell to reset traps that execute commands to
    /// the default action while keeping ignored signals ignored.
    pub fn enter_subshell(&mut self, system: &mut dyn System) {
        self.pending.clear();
        let conditions: Vec<Condition> = self
            .actions
            .iter()
            .filter(|(_, action)| matches!(action, Action::Command(_)))
            .map(|(&condition, _)| condition)
            .collect();
        for condition in conditions {
            self.actions.remove(&condition);
            if let Condition::Signal(signal) = condition {
                system.set_disposition(signal, Disposition::Default).ok();
            }
        }
    }

    /// Records signals reported by the system for later handling.
    pub fn catch_signals<I: IntoIterator<Item = Signal>>(&mut self, signals: I) {
        self.pending.extend(signals);
    }

    /// Takes one caught signal whose trap action is a command.
    ///
    /// Returns `None` while a handler is executing, so that handlers do
    /// not interrupt each other.
    pub fn take_caught_signal(&mut self) -> Option<(Signal, Rc<str>)> {
        if self.in_handler {
            return None;
        }
        while let Some(signal) = self.pending.pop_front() {
            if let Action::Command(command) = self.get_action(Condition::Signal(signal)) {
                return Some((signal, Rc::clone(command)));
            }
        }
        None
    }

    /// Marks the beginning of trap handler execution.
    pub fn enter_handler(&mut self) {
        self.in_handler = true;
    }

    /// Marks the end of trap handler execution.
    pub fn leave_handler(&mut self) {
        self.in_handler = false;
    }

    /// Whether a trap handler is currently executing.
    #[must_use]
    pub fn in_handler(&self) -> bool {
        self.in_handler
    }

    /// Removes and returns the EXIT action, if it is a command.
    ///
    /// The EXIT trap runs at most once; taking it prevents a nested exit
    /// from running it again.
    pub fn take_exit_action(&mut self) -> Option<Rc<str>> {
        match self.actions.remove(&Condition::Exit) {
            Some(Action::Command(command)) => Some(command),
            Some(other) => {
                self.actions.insert(Condition::Exit, other);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::test_helper::DummySystem;

    #[test]
    fn default_action_for_unset_condition() {
        let traps = TrapSet::default();
        assert_eq!(
            traps.get_action(Condition::Signal(Signal::SIGINT)),
            &Action::Default
        );
        assert_eq!(traps.get_action(Condition::Exit), &Action::Default);
    }

    #[test]
    fn set_and_get_action() {
        let mut system = DummySystem::default();
        let mut traps = TrapSet::default();
        let action = Action::Command("echo int".into());
        traps
            .set_action(
                &mut system,
                Condition::Signal(Signal::SIGINT),
                action.clone(),
            )
            .unwrap();
        assert_eq!(traps.get_action(Condition::Signal(Signal::SIGINT)), &action);
        assert_eq!(
            system.dispositions.get(&Signal::SIGINT),
            Some(&Disposition::Catch)
        );
    }

    #[test]
    fn sigkill_and_sigstop_cannot_be_trapped() {
        let mut system = DummySystem::default();
        let mut traps = TrapSet::default();
        let result = traps.set_action(
            &mut system,
            Condition::Signal(Signal::SIGKILL),
            Action::Ignore,
        );
        assert_eq!(result, Err(SetActionError::SigKill));
        let result = traps.set_action(
            &mut system,
            Condition::Signal(Signal::SIGSTOP),
            Action::Ignore,
        );
        assert_eq!(result, Err(SetActionError::SigStop));
    }

    #[test]
    fn caught_signals_run_their_commands() {
        let mut system = DummySystem::default();
        let mut traps = TrapSet::default();
        traps
            .set_action(
                &mut system,
                Condition::Signal(Signal::SIGUSR1),
                Action::Command("handler".into()),
            )
            .unwrap();

        traps.catch_signals([Signal::SIGUSR2, Signal::SIGUSR1]);
        // SIGUSR2 has no command action and is discarded.
        let (signal, command) = traps.take_caught_signal().unwrap();
        assert_eq!(signal, Signal::SIGUSR1);
        assert_eq!(&*command, "handler");
        assert_eq!(traps.take_caught_signal(), None);
    }

    #[test]
    fn handlers_do_not_interrupt_each_other() {
        let mut system = DummySystem::default();
        let mut traps = TrapSet::default();
        traps
            .set_action(
                &mut system,
                Condition::Signal(Signal::SIGUSR1),
                Action::Command("handler".into()),
            )
            .unwrap();
        traps.catch_signals([Signal::SIGUSR1]);

        traps.enter_handler();
        assert_eq!(traps.take_caught_signal(), None);
        traps.leave_handler();
        assert!(traps.take_caught_signal().is_some());
    }

    #[test]
    fn subshell_resets_command_actions() {
        let mut system = DummySystem::default();
        let mut traps = TrapSet::default();
        traps
            .set_action(
                &mut system,
                Condition::Signal(Signal::SIGINT),
                Action::Command("x".into()),
            )
            .unwrap();
        traps
            .set_action(
                &mut system,
                Condition::Signal(Signal::SIGQUIT),
                Action::Ignore,
            )
            .unwrap();

        traps.enter_subshell(&mut system);
        assert_eq!(
            traps.get_action(Condition::Signal(Signal::SIGINT)),
            &Action::Default
        );
        assert_eq!(
            traps.get_action(Condition::Signal(Signal::SIGQUIT)),
            &Action::Ignore
        );
    }

    #[test]
    fn exit_action_is_taken_once() {
        let mut system = DummySystem::default();
        let mut traps = TrapSet::default();
        traps
            .set_action(&mut system, Condition::Exit, Action::Command("bye".into()))
            .unwrap();
        assert_eq!(traps.take_exit_action().as_deref(), Some("bye"));
        assert_eq!(traps.take_exit_action(), None);
    }
}
