//! Lexical scope map for the Mocha semantic analyzer
//!
//! A scope is a first-writer-wins mapping from declared names to their
//! declaration nodes, attached to every scope-bearing AST node.

use std::collections::HashMap;

use crate::ast::NodeId;

/// A name-to-declaration map with first-insertion semantics
///
/// Lookups are by name; iteration visits entries in the order they were
/// first declared, which is what keeps diagnostic order deterministic when
/// a scope is replayed (interface obligations, inheritance merge).
#[derive(Debug, Default)]
pub struct Scope {
    /// Declarations by name
    entries: HashMap<String, NodeId>,

    /// First-declaration order of the names
    order: Vec<String>,
}

impl Scope {
    /// Create an empty scope
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` as `decl`
    ///
    /// The first declaration of a name wins. A later declaration leaves the
    /// scope untouched and hands back the previous binding so the caller
    /// can report the conflict.
    pub fn declare(&mut self, name: &str, decl: NodeId) -> Result<(), NodeId> {
        if let Some(&prev) = self.entries.get(name) {
            return Err(prev);
        }
        self.entries.insert(name.to_string(), decl);
        self.order.push(name.to_string());
        Ok(())
    }

    /// Replace the binding of an already-declared name, keeping its position
    ///
    /// Used by the inheritance merge when the base entry must shadow an
    /// override that failed the signature check. Declares the name if it
    /// was absent.
    pub fn rebind(&mut self, name: &str, decl: NodeId) {
        if self.entries.insert(name.to_string(), decl).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Look up a name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.entries.get(name).copied()
    }

    /// Number of declared names
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing has been declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate over `(name, declaration)` pairs in first-declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.entries[name]))
    }
}
