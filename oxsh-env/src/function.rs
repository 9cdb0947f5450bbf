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

//! Type definitions for shell functions

use oxsh_syntax::source::Location;
use oxsh_syntax::syntax::FullCompoundCommand;
use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;

/// Definition of a function
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    /// Name of the function
    pub name: String,

    /// Command that is executed when the function is called
    ///
    /// The body is reference-counted so that a function can be called
    /// while its definition remains in the function set.
    pub body: Rc<FullCompoundCommand>,

    /// Location of the function definition command that defined this
    /// function
    pub origin: Location,
}

/// Wrapper of [`Function`] for inserting into a hash set
///
/// The `Hash` and `PartialEq` implementations compare only names.
#[derive(Clone, Debug, Eq)]
pub struct HashEntry(pub Rc<Function>);

impl HashEntry {
    /// Convenience method for creating a new function definition as a
    /// `HashEntry`
    #[must_use]
    pub fn new(name: String, body: Rc<FullCompoundCommand>, origin: Location) -> HashEntry {
        HashEntry(Rc::new(Function { name, body, origin }))
    }
}

impl PartialEq for HashEntry {
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Hash for HashEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Collection of functions
pub type FunctionSet = HashSet<HashEntry>;

#[cfg(test)]
mod tests {
    use super::*;
    use oxsh_syntax::syntax::{CompoundCommand, List};

    fn dummy_body() -> Rc<FullCompoundCommand> {
        Rc::new(FullCompoundCommand {
            command: CompoundCommand::Grouping(List(vec![])),
            redirs: vec![],
        })
    }

    #[test]
    fn lookup_by_name() {
        let mut functions = FunctionSet::new();
        functions.insert(HashEntry::new(
            "f".to_string(),
            dummy_body(),
            Location::dummy(),
        ));
        assert!(functions.get("f").is_some());
        assert!(functions.get("g").is_none());
    }

    #[test]
    fn redefinition_replaces() {
        let mut functions = FunctionSet::new();
        functions.insert(HashEntry::new(
            "f".to_string(),
            dummy_body(),
            Location::dummy(),
        ));
        let new = HashEntry::new("f".to_string(), dummy_body(), Location::dummy());
        functions.replace(new);
        assert_eq!(functions.len(), 1);
    }
}
