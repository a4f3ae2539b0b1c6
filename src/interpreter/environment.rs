use std::collections::HashMap;

use crate::ast::{DeclId, DeclRef};

use super::value::Value;

/// Environment
///
/// Maps declarations (by identity) to values. Extending an environment
/// copies it; an activation never writes into its parent's bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    bindings: HashMap<DeclId, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn get(&self, decl: &DeclRef) -> Option<&Value> {
        self.bindings.get(&decl.id())
    }

    pub fn contains(&self, decl: &DeclRef) -> bool {
        self.bindings.contains_key(&decl.id())
    }

    /// Returns a copy of this environment with `bindings` added.
    pub fn extend<'a>(&self, bindings: impl IntoIterator<Item = (&'a DeclRef, Value)>) -> Self {
        let mut env = self.clone();
        for (decl, value) in bindings {
            env.bindings.insert(decl.id(), value);
        }
        env
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Heap
///
/// Append-only store of reference cells; a location is a stable index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heap {
    cells: Vec<Value>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    /// Stores `value` in a new cell and returns its index.
    pub fn alloc(&mut self, value: Value) -> usize {
        self.cells.push(value);
        let index = self.cells.len() - 1;
        tracing::trace!(index, "allocated heap cell");
        index
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.cells.get(index)
    }

    /// Overwrites the cell at `index`. Returns `false` if no such cell exists.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                tracing::trace!(index, value = %value, "assigned heap cell");
                *cell = value;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
