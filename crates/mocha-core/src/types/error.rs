//! Diagnostic categories for the Mocha semantic analyzer

use std::fmt;

use thiserror::Error;

use super::Type;
use crate::location::Location;

/// A semantic diagnostic with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// The kind of violation
    pub kind: DiagnosticKind,
    /// Source location the message is anchored at
    pub loc: Location,
}

impl Diagnostic {
    /// Create a new diagnostic
    #[must_use]
    pub fn new(kind: DiagnosticKind, loc: Location) -> Self {
        Self { kind, loc }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.loc, self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// The kind of semantic violation
///
/// The vocabulary is fixed; drivers and tests match on these variants
/// rather than on message text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    #[error("declaration of `{name}` here conflicts with declaration on line {prev_line}")]
    DeclConflict { name: String, prev_line: u32 },

    #[error("no declaration found for {expected} `{name}`")]
    IdentifierNotDeclared { name: String, expected: LookupKind },

    #[error("field `{field}` of `{base}` is only accessible within class scope")]
    InaccessibleField { field: String, base: Type },

    #[error("`{base}` has no such field `{field}`")]
    FieldNotFoundInBase { field: String, base: Type },

    #[error("function `{name}` expects {expected} argument(s) but {given} given")]
    NumArgsMismatch {
        name: String,
        expected: usize,
        given: usize,
    },

    #[error("incompatible argument {position}: `{given}` given, `{expected}` expected")]
    ArgMismatch {
        position: usize,
        given: Type,
        expected: Type,
    },

    #[error("incompatible argument {position}: `{given}` given, `int`, `bool`, or `string` expected")]
    PrintArgMismatch { position: usize, given: Type },

    #[error("incompatible operand: {op} `{operand}`")]
    IncompatibleOperand { op: &'static str, operand: Type },

    #[error("incompatible operands: `{left}` {op} `{right}`")]
    IncompatibleOperands {
        op: &'static str,
        left: Type,
        right: Type,
    },

    #[error("`this` is only valid within class scope")]
    ThisOutsideClassScope,

    #[error("`break` is only allowed inside a loop")]
    BreakOutsideLoop,

    #[error("incompatible return: `{given}` given, `{expected}` expected")]
    ReturnMismatch { given: Type, expected: Type },

    #[error("test expression must have boolean type")]
    TestNotBoolean,

    #[error("array subscript must be an integer")]
    SubscriptNotInteger,

    #[error("`[]` can only be applied to arrays")]
    BracketsOnNonArray,

    #[error("array size must be an integer")]
    NewArraySizeNotInteger,

    #[error("method `{name}` must match inherited type signature")]
    OverrideMismatch { name: String },

    #[error("class `{class}` does not implement entire interface `{interface}`")]
    InterfaceNotImplemented { class: String, interface: String },
}

/// What category of declaration a failed lookup was asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Variable,
    Function,
    Class,
    Interface,
    Type,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LookupKind::Variable => "variable",
            LookupKind::Function => "function",
            LookupKind::Class => "class",
            LookupKind::Interface => "interface",
            LookupKind::Type => "type",
        };
        write!(f, "{label}")
    }
}

/// Ordered sink for diagnostics
///
/// Emission order is the analyzer's visit order and is part of the
/// contract; the reporter never sorts or deduplicates.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    /// Create an empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation anchored at `loc`
    pub fn report(&mut self, kind: DiagnosticKind, loc: Location) {
        self.diagnostics.push(Diagnostic::new(kind, loc));
    }

    /// Number of diagnostics recorded so far
    #[must_use]
    pub fn num_errors(&self) -> usize {
        self.diagnostics.len()
    }

    /// Consume the reporter, yielding the diagnostics in emission order
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
