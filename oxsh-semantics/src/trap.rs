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

//! Trap handler execution
//!
//! Signals are only recorded when they arrive; the executor calls
//! [`run_traps`] at suspension points (between commands, after pipelines,
//! on loop iterations) to run the handlers for the recorded signals. A
//! handler runs in a trap-handler frame, which shares every store with the
//! interrupted context — a handler observes assignments the interrupted
//! command has performed — and suppresses handler re-entry for its
//! duration. `$?` is restored after the handler unless the handler
//! diverts.

use crate::runner;
use oxsh_env::frame::FrameKind;
use oxsh_env::semantics::Result;
use oxsh_env::trap::Condition;
use oxsh_env::Env;

/// Runs the handlers for all signals caught since the last call.
pub fn run_traps(env: &mut Env) -> Result {
    let signals = env.system.caught_signals();
    env.traps.catch_signals(signals);

    while let Some((signal, command)) = env.traps.take_caught_signal() {
        let saved_exit_status = env.exit_status;
        let mut guard = env.push_frame(FrameKind::TrapHandler {
            condition: Condition::Signal(signal),
        });
        let result = runner::run_string(&mut guard, &command);
        drop(guard);
        result?;
        env.exit_status = saved_exit_status;
    }
    std::ops::ControlFlow::Continue(())
}

/// Runs the EXIT trap, if one is set.
///
/// The action is removed from the trap set before running so that an
/// `exit` inside the handler cannot run it again. A divert from the
/// handler only updates the exit status.
pub fn run_exit_trap(env: &mut Env) {
    if let Some(command) = env.traps.take_exit_action() {
        let saved_exit_status = env.exit_status;
        let mut guard = env.push_frame(FrameKind::TrapHandler {
            condition: Condition::Exit,
        });
        let result = runner::run_string(&mut guard, &command);
        drop(guard);
        if oxsh_env::semantics::apply_divert(result, env).is_none() {
            env.exit_status = saved_exit_status;
        }
    }
}
