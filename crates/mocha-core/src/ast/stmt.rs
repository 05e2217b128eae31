//! Statement AST nodes for the Mocha programming language

use std::cell::RefCell;

use super::NodeId;
use crate::types::Scope;

/// The kind of statement
///
/// Expression nodes are valid in any statement position; statement lists
/// hold plain `NodeId`s and the analyzer dispatches on the node kind.
#[derive(Debug)]
pub enum Stmt {
    /// A braced block with its own scope: declarations, then statements
    Block {
        /// Local variable declarations in source order
        decls: Vec<NodeId>,
        /// Statements (or expressions) in source order
        stmts: Vec<NodeId>,
        /// Block-local scope
        scope: RefCell<Scope>,
    },

    /// Conditional with optional else branch
    If {
        /// Test expression, must be boolean
        cond: NodeId,
        /// Then branch
        then_body: NodeId,
        /// Else branch, if any
        else_body: Option<NodeId>,
    },

    /// While loop
    While {
        /// Test expression, must be boolean
        cond: NodeId,
        /// Loop body
        body: NodeId,
    },

    /// For loop; init and step are expressions checked for effect only
    For {
        /// Initialization expression
        init: NodeId,
        /// Test expression, must be boolean
        cond: NodeId,
        /// Step expression
        step: NodeId,
        /// Loop body
        body: NodeId,
    },

    /// Return from the enclosing function; a bare `return` carries an
    /// empty expression
    Return {
        /// Returned value expression
        value: NodeId,
    },

    /// Break out of the nearest enclosing loop
    Break,

    /// Print each argument; arguments must be `int`, `bool`, or `string`
    Print {
        /// Argument expressions in source order
        args: Vec<NodeId>,
    },
}

impl Stmt {
    /// Returns true for loop statements, the targets of `break`
    #[must_use]
    pub const fn is_loop(&self) -> bool {
        matches!(self, Stmt::While { .. } | Stmt::For { .. })
    }
}
