//! Mocha Core - Semantic analysis engine for the Mocha programming language
//!
//! This crate provides the core functionality:
//! - Location: line/column source spans for diagnostics
//! - AST: arena-backed tree with parent links and per-node semantic state
//! - Type System: the semantic type model and its relations
//! - Analyzer: scope construction, name resolution, and type checking
//!
//! The analyzer consumes an already-built [`ast::Ast`] and produces an
//! ordered stream of diagnostics; the tree itself stays structurally
//! intact. Parsing and driving the pipeline are up to the caller.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source location tracking
pub mod location;

/// Abstract Syntax Tree - arena, node kinds, and builders
pub mod ast;

/// Type system module - types, scopes, diagnostics, and the analyzer
pub mod types;

/// Convenience re-export of the analyzer
pub use types::Analyzer;

/// Convenience re-export of the analysis result
pub use types::AnalysisResult;
