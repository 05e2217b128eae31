//! Expression AST nodes for the Mocha programming language

use std::cell::RefCell;

use super::{Ident, NodeId};
use crate::types::Type;

/// An expression node: its kind plus the type computed during analysis
#[derive(Debug)]
pub struct Expr {
    /// The kind of expression
    pub kind: ExprKind,
    /// Computed type, set exactly once during checking
    ty: RefCell<Option<Type>>,
}

impl Expr {
    /// Create a new, untyped expression
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            ty: RefCell::new(None),
        }
    }

    /// The computed type, or `None` before this node has been checked
    #[must_use]
    pub fn ty(&self) -> Option<Type> {
        self.ty.borrow().clone()
    }

    /// Record the computed type
    pub(crate) fn set_ty(&self, ty: Type) {
        *self.ty.borrow_mut() = Some(ty);
    }
}

/// The kind of expression
#[derive(Debug)]
pub enum ExprKind {
    /// Integer literal
    IntLit(i64),

    /// Double literal
    DoubleLit(f64),

    /// Boolean literal
    BoolLit(bool),

    /// String literal
    StringLit(String),

    /// The `null` literal
    NullLit,

    /// The receiver of the enclosing method
    This,

    /// Field access; a bare identifier in expression position has no base
    FieldAccess {
        /// Receiver expression, if written
        base: Option<NodeId>,
        /// Accessed field
        field: Ident,
    },

    /// Function or method call
    Call {
        /// Receiver expression, if written
        base: Option<NodeId>,
        /// Called name
        field: Ident,
        /// Actual arguments in source order
        actuals: Vec<NodeId>,
    },

    /// Array element access
    ArrayAccess {
        /// Array expression
        base: NodeId,
        /// Index expression, must be `int`
        subscript: NodeId,
    },

    /// Arithmetic; unary negation has no left operand
    Arithmetic {
        /// Left operand, absent for unary negation
        left: Option<NodeId>,
        /// Operator
        op: ArithOp,
        /// Right operand
        right: NodeId,
    },

    /// Relational comparison, always of two numeric operands
    Relational {
        left: NodeId,
        op: RelOp,
        right: NodeId,
    },

    /// Equality comparison of two mutually compatible operands
    Equality {
        left: NodeId,
        op: EqOp,
        right: NodeId,
    },

    /// Logical connective; unary not has no left operand
    Logical {
        /// Left operand, absent for unary not
        left: Option<NodeId>,
        /// Operator
        op: LogicOp,
        /// Right operand
        right: NodeId,
    },

    /// Assignment; evaluates to the left-hand side's type
    Assign { left: NodeId, right: NodeId },

    /// Class instantiation (`new T`)
    New {
        /// Named type annotation of the instantiated class
        class: NodeId,
    },

    /// Array allocation (`NewArray(size, T)`)
    NewArray {
        /// Element count, must be `int`
        size: NodeId,
        /// Element type annotation
        element: NodeId,
    },

    /// Read an integer from the input stream
    ReadInteger,

    /// Read a line from the input stream
    ReadLine,

    /// The absent expression (a bare `return`'s value)
    Empty,
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// Addition (+), or unary negation when there is no left operand
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Modulo (%)
    Mod,
}

impl ArithOp {
    /// Returns the symbol representation of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        }
    }
}

/// Relational operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
}

impl RelOp {
    /// Returns the symbol representation of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        }
    }
}

/// Equality operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EqOp {
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
}

impl EqOp {
    /// Returns the symbol representation of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EqOp::Eq => "==",
            EqOp::Ne => "!=",
        }
    }
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
    /// Logical NOT (!), always unary
    Not,
}

impl LogicOp {
    /// Returns the symbol representation of the operator
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
            LogicOp::Not => "!",
        }
    }
}
