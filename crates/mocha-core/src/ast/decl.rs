//! Declaration AST nodes for the Mocha programming language

use std::cell::RefCell;

use super::{Ident, NodeId};
use crate::types::Scope;

/// A declaration: an identifier plus the declared entity
#[derive(Debug)]
pub struct Decl {
    /// The declared name and its location
    pub name: Ident,
    /// The kind of declaration
    pub kind: DeclKind,
}

impl Decl {
    /// The variable payload, if this declares a variable
    #[must_use]
    pub fn as_var(&self) -> Option<&VarDecl> {
        match &self.kind {
            DeclKind::Var(var) => Some(var),
            _ => None,
        }
    }

    /// The function payload, if this declares a function
    #[must_use]
    pub fn as_fn(&self) -> Option<&FnDecl> {
        match &self.kind {
            DeclKind::Fn(fun) => Some(fun),
            _ => None,
        }
    }

    /// The class payload, if this declares a class
    #[must_use]
    pub fn as_class(&self) -> Option<&ClassDecl> {
        match &self.kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The interface payload, if this declares an interface
    #[must_use]
    pub fn as_interface(&self) -> Option<&InterfaceDecl> {
        match &self.kind {
            DeclKind::Interface(interface) => Some(interface),
            _ => None,
        }
    }

    /// Returns true for variable declarations
    #[must_use]
    pub const fn is_var(&self) -> bool {
        matches!(self.kind, DeclKind::Var(_))
    }

    /// Returns true for function declarations
    #[must_use]
    pub const fn is_fn(&self) -> bool {
        matches!(self.kind, DeclKind::Fn(_))
    }
}

/// The kind of declaration
#[derive(Debug)]
pub enum DeclKind {
    /// Variable (global, field, formal, or block-local)
    Var(VarDecl),

    /// Function or method; interface members have no body
    Fn(FnDecl),

    /// Class, optionally extending one base and implementing interfaces
    Class(ClassDecl),

    /// Interface: a bag of bodiless method signatures
    Interface(InterfaceDecl),
}

/// A variable declaration
#[derive(Debug)]
pub struct VarDecl {
    /// Declared type annotation
    pub ty: NodeId,
}

/// A function declaration
#[derive(Debug)]
pub struct FnDecl {
    /// Return type annotation
    pub return_ty: NodeId,
    /// Formal parameters, each a variable declaration, in source order
    pub formals: Vec<NodeId>,
    /// Body block; `None` for interface members
    pub body: Option<NodeId>,
    /// Scope holding the formals
    pub scope: RefCell<Scope>,
}

/// A class declaration
#[derive(Debug)]
pub struct ClassDecl {
    /// Base class named type annotation, if any
    pub extends: Option<NodeId>,
    /// Implemented interfaces as named type annotations, in source order
    pub implements: Vec<NodeId>,
    /// Member declarations in source order
    pub members: Vec<NodeId>,
    /// Member scope; after the inheritance merge it holds own and
    /// inherited members
    pub scope: RefCell<Scope>,
}

/// An interface declaration
#[derive(Debug)]
pub struct InterfaceDecl {
    /// Method signatures in source order
    pub members: Vec<NodeId>,
    /// Scope holding the method signatures
    pub scope: RefCell<Scope>,
}
