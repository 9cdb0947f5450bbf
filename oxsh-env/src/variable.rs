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

//! Items for shell variables
//!
//! A [`Variable`] is a named parameter with `exported` and `read-only`
//! attributes. Variables live in a [`VariableSet`], which is a stack of
//! contexts: the base context is always present, and a new context is
//! pushed for every function call (holding the function's local variables
//! and its positional parameters). A variable in an upper context hides a
//! variable of the same name in a lower context.
//!
//! All variables of all contexts live in one hash map keyed by name, each
//! entry holding a stack of variables ordered by context index. This makes
//! lookup a single hash access regardless of context depth.

use crate::semantics::Field;
use itertools::Itertools;
use oxsh_syntax::source::Location;
use std::collections::HashMap;
use thiserror::Error;

/// Definition of a variable
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// Value of the variable
    ///
    /// `None` means the variable is declared but unset, as after `local x`
    /// without an assignment.
    pub value: Option<String>,

    /// Whether the variable is exported to the environment of executed
    /// commands
    pub exported: bool,

    /// Location of the command that made the variable read-only, if any
    pub read_only_location: Option<Location>,
}

impl Variable {
    /// Creates a variable with the given value and no attributes.
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Variable {
        Variable {
            value: Some(value.into()),
            exported: false,
            read_only_location: None,
        }
    }

    /// Whether the variable is read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only_location.is_some()
    }
}

/// Positional parameters (`$1`, `$2`, ...)
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionalParams {
    /// Values of the positional parameters
    pub values: Vec<String>,
}

impl PositionalParams {
    /// Creates positional parameters from expanded fields.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        PositionalParams {
            values: fields.into_iter().map(|field| field.value).collect(),
        }
    }
}

/// Error that occurs when assigning to a read-only variable
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot assign to read-only variable `{name}`")]
pub struct AssignError {
    /// Name of the variable
    pub name: String,
    /// Location where the variable was made read-only
    pub read_only_location: Location,
}

/// Error that occurs when unsetting a read-only variable
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("cannot unset read-only variable `{name}`")]
pub struct UnsetError {
    /// Name of the variable
    pub name: String,
    /// Location where the variable was made read-only
    pub read_only_location: Location,
}

/// Choice of the context a variable is assigned in
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// Assign to the existing visible variable, or create one in the base
    /// context.
    ///
    /// This is the scope of ordinary assignments: an assignment in a
    /// function updates a local variable if one has been declared, and the
    /// global variable otherwise.
    Global,

    /// Assign to or create a variable in the topmost context.
    ///
    /// This is the scope of function-local declarations.
    Local,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct VariableInContext {
    variable: Variable,
    context_index: usize,
}

/// Variable context
///
/// Contexts other than the base context are pushed for function calls and
/// dot scripts. A context optionally carries its own positional
/// parameters; a context without them sees the parameters of the next
/// lower context that has them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Context {
    positional_params: Option<PositionalParams>,
}

/// Collection of variables and positional parameters
///
/// See the [module documentation](self) for details.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableSet {
    /// All variables of all contexts, keyed by name
    ///
    /// The value is a stack of variables defined in different contexts,
    /// in ascending order of context index.
    all_variables: HashMap<String, Vec<VariableInContext>>,

    /// Stack of contexts; the base context is always the first item
    contexts: Vec<Context>,
}

impl Default for VariableSet {
    fn default() -> Self {
        VariableSet {
            all_variables: HashMap::new(),
            contexts: vec![Context {
                positional_params: Some(PositionalParams::default()),
            }],
        }
    }
}

impl VariableSet {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> VariableSet {
        Default::default()
    }

    /// Returns a reference to the visible variable with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.all_variables
            .get(name)
            .and_then(|stack| stack.last())
            .map(|vic| &vic.variable)
    }

    /// Returns the value of the visible variable with the given name, if
    /// the variable is set.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.value.as_deref())
    }

    /// Assigns a variable.
    ///
    /// With [`Scope::Global`], the value is assigned to the existing
    /// visible variable wherever it is defined, or to a new variable in
    /// the base context. With [`Scope::Local`], the value is assigned to a
    /// variable in the topmost context, hiding any lower definition.
    ///
    /// The `exported` and read-only attributes of an existing variable are
    /// preserved; assigning to a read-only variable fails without changing
    /// anything.
    pub fn assign(
        &mut self,
        scope: Scope,
        name: &str,
        value: Option<String>,
    ) -> Result<(), AssignError> {
        let top = self.contexts.len() - 1;
        let stack = self.all_variables.entry(name.to_string()).or_default();

        let target = match scope {
            Scope::Global => stack.last_mut(),
            Scope::Local => stack.last_mut().filter(|vic| vic.context_index == top),
        };

        match target {
            Some(vic) => {
                if let Some(location) = &vic.variable.read_only_location {
                    return Err(AssignError {
                        name: name.to_string(),
                        read_only_location: location.clone(),
                    });
                }
                vic.variable.value = value;
                Ok(())
            }
            None => {
                let context_index = match scope {
                    Scope::Global => 0,
                    Scope::Local => top,
                };
                let variable = Variable {
                    value,
                    exported: false,
                    read_only_location: None,
                };
                let position = stack
                    .iter()
                    .position(|vic| vic.context_index > context_index)
                    .unwrap_or(stack.len());
                stack.insert(
                    position,
                    VariableInContext {
                        variable,
                        context_index,
                    },
                );
                Ok(())
            }
        }
    }

    /// Sets the `exported` attribute of a variable, creating an unset
    /// variable if none exists.
    pub fn set_exported(&mut self, name: &str, exported: bool) {
        let stack = self.all_variables.entry(name.to_string()).or_default();
        match stack.last_mut() {
            Some(vic) => vic.variable.exported = exported,
            None => stack.push(VariableInContext {
                variable: Variable {
                    value: None,
                    exported,
                    read_only_location: None,
                },
                context_index: 0,
            }),
        }
    }

    /// Makes a variable read-only, creating an unset variable if none
    /// exists.
    pub fn set_read_only(&mut self, name: &str, location: Location) {
        let stack = self.all_variables.entry(name.to_string()).or_default();
        match stack.last_mut() {
            Some(vic) => vic.variable.read_only_location.get_or_insert(location),
            None => {
                stack.push(VariableInContext {
                    variable: Variable {
                        value: None,
                        exported: false,
                        read_only_location: Some(location),
                    },
                    context_index: 0,
                });
                return;
            }
        };
    }

    /// Removes the visible variable with the given name.
    ///
    /// Removing the visible variable may reveal a variable of the same
    /// name in a lower context. Unsetting a read-only variable fails.
    pub fn unset(&mut self, name: &str) -> Result<(), UnsetError> {
        if let Some(stack) = self.all_variables.get_mut(name) {
            if let Some(vic) = stack.last() {
                if let Some(location) = &vic.variable.read_only_location {
                    return Err(UnsetError {
                        name: name.to_string(),
                        read_only_location: location.clone(),
                    });
                }
                stack.pop();
                if stack.is_empty() {
                    self.all_variables.remove(name);
                }
            }
        }
        Ok(())
    }

    /// Iterates over the visible name-variable pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.all_variables
            .iter()
            .filter_map(|(name, stack)| stack.last().map(|vic| (name.as_str(), &vic.variable)))
    }

    /// Returns the `name=value` strings of exported variables, sorted by
    /// name.
    ///
    /// This is the environment passed to executed programs.
    #[must_use]
    pub fn environ(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, variable)| variable.exported)
            .filter_map(|(name, variable)| {
                variable.value.as_ref().map(|value| format!("{name}={value}"))
            })
            .sorted()
            .collect()
    }

    /// Pushes a variable context.
    ///
    /// If `positional_params` is `Some`, the new context has its own
    /// positional parameters; otherwise it sees those of the enclosing
    /// context.
    pub fn push_context(&mut self, positional_params: Option<PositionalParams>) {
        self.contexts.push(Context { positional_params });
    }

    /// Pops the topmost variable context, dropping its local variables.
    ///
    /// # Panics
    ///
    /// If only the base context remains.
    pub fn pop_context(&mut self) {
        assert!(
            self.contexts.len() > 1,
            "the base context must not be popped"
        );
        self.contexts.pop();
        let remaining = self.contexts.len();
        self.all_variables.retain(|_, stack| {
            while stack
                .last()
                .is_some_and(|vic| vic.context_index >= remaining)
            {
                stack.pop();
            }
            !stack.is_empty()
        });
    }

    /// Returns a reference to the effective positional parameters.
    #[must_use]
    pub fn positional_params(&self) -> &PositionalParams {
        self.contexts
            .iter()
            .rev()
            .find_map(|context| context.positional_params.as_ref())
            .expect("the base context always has positional parameters")
    }

    /// Returns a mutable reference to the effective positional parameters.
    pub fn positional_params_mut(&mut self) -> &mut PositionalParams {
        self.contexts
            .iter_mut()
            .rev()
            .find_map(|context| context.positional_params.as_mut())
            .expect("the base context always has positional parameters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_get() {
        let mut set = VariableSet::new();
        assert_eq!(set.get("foo"), None);
        set.assign(Scope::Global, "foo", Some("value".to_string()))
            .unwrap();
        assert_eq!(set.get_value("foo"), Some("value"));
    }

    #[test]
    fn assignment_preserves_export_attribute() {
        let mut set = VariableSet::new();
        set.assign(Scope::Global, "foo", Some("1".to_string()))
            .unwrap();
        set.set_exported("foo", true);
        set.assign(Scope::Global, "foo", Some("2".to_string()))
            .unwrap();
        let variable = set.get("foo").unwrap();
        assert_eq!(variable.value.as_deref(), Some("2"));
        assert!(variable.exported);
    }

    #[test]
    fn read_only_assignment_fails_and_preserves_value() {
        let mut set = VariableSet::new();
        set.assign(Scope::Global, "foo", Some("old".to_string()))
            .unwrap();
        set.set_read_only("foo", Location::dummy());
        let error = set
            .assign(Scope::Global, "foo", Some("new".to_string()))
            .unwrap_err();
        assert_eq!(error.name, "foo");
        assert_eq!(set.get_value("foo"), Some("old"));
    }

    #[test]
    fn read_only_unset_fails() {
        let mut set = VariableSet::new();
        set.assign(Scope::Global, "foo", Some("x".to_string()))
            .unwrap();
        set.set_read_only("foo", Location::dummy());
        set.unset("foo").unwrap_err();
        assert_eq!(set.get_value("foo"), Some("x"));
    }

    #[test]
    fn unset_removes_and_reveals() {
        let mut set = VariableSet::new();
        set.assign(Scope::Global, "foo", Some("global".to_string()))
            .unwrap();
        set.push_context(None);
        set.assign(Scope::Local, "foo", Some("local".to_string()))
            .unwrap();
        assert_eq!(set.get_value("foo"), Some("local"));
        set.unset("foo").unwrap();
        assert_eq!(set.get_value("foo"), Some("global"));
        set.unset("foo").unwrap();
        assert_eq!(set.get("foo"), None);
        set.unset("foo").unwrap();
    }

    #[test]
    fn local_variables_disappear_on_context_pop() {
        let mut set = VariableSet::new();
        set.assign(Scope::Global, "x", Some("0".to_string())).unwrap();
        set.push_context(None);
        set.assign(Scope::Local, "x", Some("1".to_string())).unwrap();
        set.assign(Scope::Local, "y", Some("2".to_string())).unwrap();
        assert_eq!(set.get_value("x"), Some("1"));
        set.pop_context();
        assert_eq!(set.get_value("x"), Some("0"));
        assert_eq!(set.get("y"), None);
    }

    #[test]
    fn global_assignment_in_function_without_local() {
        let mut set = VariableSet::new();
        set.assign(Scope::Global, "x", Some("0".to_string())).unwrap();
        set.push_context(None);
        set.assign(Scope::Global, "x", Some("1".to_string())).unwrap();
        set.pop_context();
        assert_eq!(set.get_value("x"), Some("1"));
    }

    #[test]
    fn global_assignment_updates_existing_local() {
        let mut set = VariableSet::new();
        set.push_context(None);
        set.assign(Scope::Local, "x", Some("local".to_string()))
            .unwrap();
        set.assign(Scope::Global, "x", Some("updated".to_string()))
            .unwrap();
        assert_eq!(set.get_value("x"), Some("updated"));
        set.pop_context();
        assert_eq!(set.get("x"), None);
    }

    #[test]
    fn global_creation_is_hidden_by_existing_local() {
        // Creating a global under a local of the same name keeps the local
        // visible.
        let mut set = VariableSet::new();
        set.push_context(None);
        set.assign(Scope::Local, "x", Some("local".to_string()))
            .unwrap();
        set.pop_context();
        assert_eq!(set.get("x"), None);
    }

    #[test]
    fn environ_lists_exported_variables_sorted() {
        let mut set = VariableSet::new();
        set.assign(Scope::Global, "B", Some("2".to_string())).unwrap();
        set.assign(Scope::Global, "A", Some("1".to_string())).unwrap();
        set.assign(Scope::Global, "C", Some("3".to_string())).unwrap();
        set.set_exported("A", true);
        set.set_exported("B", true);
        assert_eq!(set.environ(), ["A=1", "B=2"]);
    }

    #[test]
    fn positional_params_per_context() {
        let mut set = VariableSet::new();
        set.positional_params_mut().values = vec!["a".to_string()];

        set.push_context(Some(PositionalParams {
            values: vec!["b".to_string(), "c".to_string()],
        }));
        assert_eq!(set.positional_params().values, ["b", "c"]);

        // A context without its own parameters sees the enclosing ones.
        set.push_context(None);
        assert_eq!(set.positional_params().values, ["b", "c"]);
        set.pop_context();

        set.pop_context();
        assert_eq!(set.positional_params().values, ["a"]);
    }
}
