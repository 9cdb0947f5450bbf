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

//! Runtime execution context frames
//!
//! Execution enters a nested context by pushing a [`Frame`] onto the
//! environment's [`FrameStack`]. Each [frame kind](FrameKind) declares a
//! fixed [policy](FramePolicies) for every sub-store of the environment:
//! whether the frame [shares](StorePolicy::Share) the enclosing store,
//! [owns](StorePolicy::Own) a fresh one, or works on a
//! [copy](StorePolicy::Copy) taken when the frame is pushed. Popping a
//! frame releases exactly the stores it acquired and nothing else.
//!
//! Frames of forking kinds (subshells, pipeline members, background jobs)
//! get the `Copy` policy for every store: the copy is realized by the
//! process fork itself, since the child's address space is a copy of the
//! parent's and the child cannot affect the parent by construction.
//!
//! Within one process, the `Copy` policy for positional parameters is
//! realized by pushing a [variable context](crate::variable::VariableSet)
//! that also hosts the frame's local variables. The share-with-restore
//! policy for file descriptors is realized by the redirection guard of
//! the command that applied the redirections, whose lifetime ends with
//! the frame (see [`fd`](crate::fd)).
//!
//! [`Env::push_frame`] returns a guard that pops the frame when dropped,
//! so a frame can never leak or be popped twice. The guard implements
//! `Deref` and `DerefMut`, allowing access to the borrowed environment.

use crate::trap::Condition;
use crate::Env;
use std::ops::Deref;
use std::ops::DerefMut;

/// Ownership policy of one sub-store in a frame
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorePolicy {
    /// The frame uses the enclosing context's store and must not release
    /// it.
    Share,
    /// The frame allocates a fresh store and releases it when popped.
    Own,
    /// The frame works on a copy of the enclosing context's store and
    /// releases the copy when popped.
    Copy,
}

/// Policies of all sub-stores for one frame kind
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FramePolicies {
    pub variables: StorePolicy,
    pub positional_params: StorePolicy,
    pub functions: StorePolicy,
    pub aliases: StorePolicy,
    /// File descriptors; `Share` here still restores any descriptor the
    /// frame itself redirected
    pub file_descriptors: StorePolicy,
    pub traps: StorePolicy,
    /// Process-wide attributes: umask and working directory
    pub process_attrs: StorePolicy,
}

impl FramePolicies {
    const ALL_SHARE: FramePolicies = FramePolicies {
        variables: StorePolicy::Share,
        positional_params: StorePolicy::Share,
        functions: StorePolicy::Share,
        aliases: StorePolicy::Share,
        file_descriptors: StorePolicy::Share,
        traps: StorePolicy::Share,
        process_attrs: StorePolicy::Share,
    };

    const ALL_COPY: FramePolicies = FramePolicies {
        variables: StorePolicy::Copy,
        positional_params: StorePolicy::Copy,
        functions: StorePolicy::Copy,
        aliases: StorePolicy::Copy,
        file_descriptors: StorePolicy::Copy,
        traps: StorePolicy::Copy,
        process_attrs: StorePolicy::Copy,
    };
}

/// Type of a runtime execution context frame
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FrameKind {
    /// Subshell running in a forked child
    Subshell,
    /// Brace group (`{ ... }`)
    BraceGroup,
    /// Function invocation
    Function,
    /// Script read by the `.` built-in
    DotScript {
        /// Whether the dot script was given arguments that replace the
        /// positional parameters for its duration
        replaces_positional: bool,
    },
    /// Iteration of a `for`, `while`, or `until` loop
    Loop,
    /// Body of a matched `case` branch
    CaseBody,
    /// Trap handler execution
    TrapHandler {
        /// Condition that triggered the handler
        condition: Condition,
    },
    /// Member of a pipeline running in a forked child
    PipelineMember,
    /// Asynchronous command running in a forked child
    BackgroundJob,
    /// Commands run by the `eval` built-in
    Eval,
    /// Context in which the `ErrExit` option is suppressed
    ///
    /// This frame is pushed for the condition of `if`, `while`, and
    /// `until` commands, the operands of `&&` and `||`, and negated
    /// pipelines.
    Condition,
    /// Built-in utility execution
    Builtin {
        /// Whether the utility acts as a special built-in
        is_special: bool,
    },
}

impl FrameKind {
    /// Returns the store policies of this frame kind.
    ///
    /// This table is the single source of truth for what a frame acquires
    /// when pushed and releases when popped.
    #[must_use]
    pub fn policies(&self) -> FramePolicies {
        use StorePolicy::*;
        match self {
            // Forked children: everything is the child's own copy.
            FrameKind::Subshell | FrameKind::PipelineMember | FrameKind::BackgroundJob => {
                FramePolicies::ALL_COPY
            }

            FrameKind::Function => FramePolicies {
                // Shared, but the frame's variable context hosts locals.
                variables: Share,
                positional_params: Copy,
                ..FramePolicies::ALL_SHARE
            },

            FrameKind::DotScript {
                replaces_positional,
            } => FramePolicies {
                positional_params: if *replaces_positional { Copy } else { Share },
                ..FramePolicies::ALL_SHARE
            },

            // The remaining kinds share everything; a brace group or
            // function still restores descriptors it redirected, which
            // the redirection guard tracks rather than the policy.
            FrameKind::BraceGroup
            | FrameKind::Loop
            | FrameKind::CaseBody
            | FrameKind::TrapHandler { .. }
            | FrameKind::Eval
            | FrameKind::Condition
            | FrameKind::Builtin { .. } => FramePolicies::ALL_SHARE,
        }
    }
}

/// Element of the runtime execution context stack
#[derive(Debug)]
pub struct Frame {
    /// Type of the frame
    pub kind: FrameKind,
    /// Whether pushing this frame pushed a variable context
    pushed_var_context: bool,
}

/// Runtime execution context stack
#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    /// Iterates over the frames, innermost first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Frame> {
        self.frames.iter().rev()
    }

    /// Returns the number of lexically enclosing loops.
    ///
    /// Only `Loop` frames inside the current function, dot script, trap
    /// handler, or process are counted: a loop outside those boundaries
    /// does not lexically enclose the current command. Counting stops when
    /// `max_count` is reached.
    #[must_use]
    pub fn loop_count(&self, max_count: usize) -> usize {
        self.iter()
            .take_while(|frame| !is_lexical_boundary(&frame.kind))
            .filter(|frame| frame.kind == FrameKind::Loop)
            .take(max_count)
            .count()
    }

    /// Whether the current context can `return`: a function or dot script
    /// is being executed in this process.
    #[must_use]
    pub fn in_returnable_context(&self) -> bool {
        self.iter()
            .take_while(|frame| {
                !matches!(
                    frame.kind,
                    FrameKind::Subshell | FrameKind::PipelineMember | FrameKind::BackgroundJob
                )
            })
            .any(|frame| {
                matches!(
                    frame.kind,
                    FrameKind::Function | FrameKind::DotScript { .. }
                )
            })
    }

    /// Whether a trap handler is currently executing.
    #[must_use]
    pub fn in_trap_handler(&self) -> bool {
        self.iter()
            .any(|frame| matches!(frame.kind, FrameKind::TrapHandler { .. }))
    }

    /// Whether the innermost special-built-in or condition frame suppresses
    /// the `ErrExit` option.
    #[must_use]
    pub fn in_condition_context(&self) -> bool {
        self.iter()
            .any(|frame| frame.kind == FrameKind::Condition)
    }
}

/// Whether the frame kind bounds the lexical scope of `break` and
/// `continue`.
fn is_lexical_boundary(kind: &FrameKind) -> bool {
    matches!(
        kind,
        FrameKind::Subshell
            | FrameKind::PipelineMember
            | FrameKind::BackgroundJob
            | FrameKind::Function
            | FrameKind::DotScript { .. }
            | FrameKind::TrapHandler { .. }
    )
}

/// RAII-style guard that pops a frame when dropped
///
/// The guard is created by [`Env::push_frame`]. Dropping it restores the
/// file descriptors the frame redirected, pops the frame's variable
/// context if it pushed one, and removes the frame from the stack.
#[derive(Debug)]
#[must_use = "the frame is popped when the guard is dropped"]
pub struct FrameGuard<'a> {
    env: &'a mut Env,
}

impl Env {
    /// Pushes a new frame onto the runtime execution context stack.
    ///
    /// The frame's [policies](FrameKind::policies) are applied: a kind
    /// with the `Copy` policy for positional parameters gets a fresh
    /// variable context holding a copy of the current parameters (which
    /// also hosts the frame's local variables), and a trap-handler kind
    /// marks the trap set as busy to suppress handler re-entry.
    ///
    /// The returned guard pops the frame when dropped.
    pub fn push_frame(&mut self, kind: FrameKind) -> FrameGuard<'_> {
        let policies = kind.policies();
        let pushed_var_context = policies.positional_params == StorePolicy::Copy
            && !matches!(
                kind,
                FrameKind::Subshell | FrameKind::PipelineMember | FrameKind::BackgroundJob
            );
        if pushed_var_context {
            let params = self.variables.positional_params().clone();
            self.variables.push_context(Some(params));
        }
        if matches!(kind, FrameKind::TrapHandler { .. }) {
            self.traps.enter_handler();
        }
        self.stack.frames.push(Frame {
            kind,
            pushed_var_context,
        });
        FrameGuard { env: self }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let frame = self
            .env
            .stack
            .frames
            .pop()
            .expect("a frame guard always has a frame to pop");
        if frame.pushed_var_context {
            self.env.variables.pop_context();
        }
        if matches!(frame.kind, FrameKind::TrapHandler { .. }) {
            self.env.traps.leave_handler();
        }
    }
}

impl Deref for FrameGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forked_kinds_copy_everything() {
        for kind in [
            FrameKind::Subshell,
            FrameKind::PipelineMember,
            FrameKind::BackgroundJob,
        ] {
            assert_eq!(kind.policies(), FramePolicies::ALL_COPY);
        }
    }

    #[test]
    fn function_copies_positional_params_only() {
        let policies = FrameKind::Function.policies();
        assert_eq!(policies.positional_params, StorePolicy::Copy);
        assert_eq!(policies.variables, StorePolicy::Share);
        assert_eq!(policies.functions, StorePolicy::Share);
        assert_eq!(policies.traps, StorePolicy::Share);
    }

    #[test]
    fn dot_script_positional_policy_depends_on_args() {
        let with_args = FrameKind::DotScript {
            replaces_positional: true,
        };
        assert_eq!(with_args.policies().positional_params, StorePolicy::Copy);

        let without_args = FrameKind::DotScript {
            replaces_positional: false,
        };
        assert_eq!(
            without_args.policies().positional_params,
            StorePolicy::Share
        );
    }

    #[test]
    fn loop_count_stops_at_boundaries() {
        let mut stack = FrameStack::default();
        let frame = |kind| Frame {
            kind,
            pushed_var_context: false,
        };
        stack.frames.push(frame(FrameKind::Loop));
        stack.frames.push(frame(FrameKind::Function));
        stack.frames.push(frame(FrameKind::Loop));
        stack.frames.push(frame(FrameKind::Loop));
        stack.frames.push(frame(FrameKind::CaseBody));
        assert_eq!(stack.loop_count(usize::MAX), 2);
        assert_eq!(stack.loop_count(1), 1);
    }

    #[test]
    fn returnable_context() {
        let mut stack = FrameStack::default();
        let frame = |kind| Frame {
            kind,
            pushed_var_context: false,
        };
        assert!(!stack.in_returnable_context());
        stack.frames.push(frame(FrameKind::Function));
        stack.frames.push(frame(FrameKind::Loop));
        assert!(stack.in_returnable_context());
        stack.frames.push(frame(FrameKind::Subshell));
        assert!(!stack.in_returnable_context());
    }
}
