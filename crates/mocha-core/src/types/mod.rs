//! Type system for the Mocha programming language
//!
//! This module provides:
//! - Internal type representation (`Type`) and the equivalence relation
//! - Lexical scope map (`Scope`)
//! - Diagnostic categories and the reporter (`Diagnostic`, `Reporter`)
//! - Semantic analyzer (`Analyzer`)

mod checker;
mod error;
mod scope;

pub use checker::{AnalysisResult, Analyzer};
pub use error::{Diagnostic, DiagnosticKind, LookupKind, Reporter};
pub use scope::Scope;

use std::fmt;

/// Internal type representation used by the semantic analyzer
///
/// This is distinct from `TypeAnnotation` in the AST, which represents the
/// syntactic form of types as written by the user. Every expression node is
/// assigned one of these during checking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Machine integer
    Int,

    /// Double-precision float
    Double,

    /// Boolean
    Bool,

    /// The absent return type of a procedure
    Void,

    /// The type of the `null` literal
    Null,

    /// Immutable string
    String,

    /// The bottom type assigned once a violation has been reported; it
    /// compares equivalent to everything so derived diagnostics stay quiet
    Error,

    /// A class or interface type, identified by its declared name
    Named(std::string::String),

    /// Homogeneous array type
    Array(Box<Type>),
}

impl Type {
    /// Create a named (class or interface) type
    #[must_use]
    pub fn named(name: impl Into<std::string::String>) -> Self {
        Self::Named(name.into())
    }

    /// Create an array type
    #[must_use]
    pub fn array(element: Type) -> Self {
        Self::Array(Box::new(element))
    }

    /// Returns true if this is a numeric type (`int` or `double`)
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }

    /// Returns true if this is the error type
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Returns true if this is a named (class or interface) type
    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(self, Type::Named(_))
    }

    /// Returns true if this is an array type
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    /// The element type if this is an array
    #[must_use]
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    /// The language's type equivalence relation
    ///
    /// Either side being `error` makes the pair equivalent; otherwise the
    /// relation is structural: matching primitives, name-equal named types,
    /// arrays with equivalent elements.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Error, _) | (_, Type::Error) => true,
            (Type::Named(a), Type::Named(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a.is_equivalent_to(b),
            _ => self == other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::Bool => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::String => write!(f, "string"),
            Type::Error => write!(f, "error"),
            Type::Named(name) => write!(f, "{name}"),
            Type::Array(element) => write!(f, "{element}[]"),
        }
    }
}
