//! Abstract Syntax Tree (AST) for the Mocha programming language
//!
//! Nodes live in an arena ([`Ast`]) and refer to each other through
//! [`NodeId`] handles. Children are owned by their parent's variant; the
//! back-link from child to parent is navigational only and is wired up by
//! the arena's constructor methods. Every node carries a source
//! [`Location`] for error reporting and a checked-once latch; scope-bearing
//! nodes carry a local scope and expression nodes a computed type.

mod decl;
mod expr;
mod pretty;
mod stmt;
mod types;

pub use decl::{ClassDecl, Decl, DeclKind, FnDecl, InterfaceDecl, VarDecl};
pub use expr::{ArithOp, EqOp, Expr, ExprKind, LogicOp, RelOp};
pub use pretty::Pretty;
pub use stmt::Stmt;
pub use types::{PrimType, TypeAnnotation, TypeKind};

use std::cell::{Cell, RefCell};

use crate::location::Location;
use crate::types::Scope;

/// Handle to a node in the [`Ast`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An identifier with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// The identifier name
    pub name: String,
    /// Source location
    pub loc: Location,
}

impl Ident {
    /// Create a new identifier
    #[must_use]
    pub fn new(name: impl Into<String>, loc: Location) -> Self {
        Self {
            name: name.into(),
            loc,
        }
    }
}

/// A node in the arena: its kind plus the cross-cutting semantic state
#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    loc: Location,
    parent: Cell<Option<NodeId>>,
    checked: Cell<bool>,
}

impl Node {
    fn new(kind: NodeKind, loc: Location) -> Self {
        Self {
            kind,
            loc,
            parent: Cell::new(None),
            checked: Cell::new(false),
        }
    }

    /// The node's kind
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node's source location
    #[must_use]
    pub fn loc(&self) -> Location {
        self.loc
    }

    /// The parent node, if any (only the program root has none)
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent.get()
    }

    /// Whether the checked-once latch has been set
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    /// Set the checked-once latch
    ///
    /// The analyzer sets this on entry, before running the node's check
    /// body; that ordering is what breaks recursion through forward
    /// references and inheritance chains.
    pub(crate) fn set_checked(&self) {
        self.checked.set(true);
    }
}

/// The kind of node, dispatched by pattern match during analysis
#[derive(Debug)]
pub enum NodeKind {
    /// The program root
    Program(Program),
    /// A declaration
    Decl(Decl),
    /// A statement
    Stmt(Stmt),
    /// An expression (valid in statement position too)
    Expr(Expr),
    /// A syntactic type annotation
    Type(TypeAnnotation),
}

/// The program root: an ordered list of top-level declarations
#[derive(Debug)]
pub struct Program {
    /// Top-level declarations in source order
    pub decls: Vec<NodeId>,
    /// Global scope
    pub scope: RefCell<Scope>,
}

/// Arena holding one program's AST
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    /// Create an empty arena
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The program root
    ///
    /// # Panics
    /// Panics if no program node has been built; handing the analyzer an
    /// AST without a root is a programmer error.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root.expect("AST has no program root")
    }

    /// Number of nodes in the arena
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Access a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Access a node known to be a program
    ///
    /// # Panics
    /// Panics on kind mismatch; a mis-kinded `NodeId` is a malformed AST.
    #[must_use]
    pub fn program(&self, id: NodeId) -> &Program {
        match &self.node(id).kind {
            NodeKind::Program(program) => program,
            other => panic!("expected program node, found {other:?}"),
        }
    }

    /// Access a node known to be a declaration
    #[must_use]
    pub fn decl(&self, id: NodeId) -> &Decl {
        match &self.node(id).kind {
            NodeKind::Decl(decl) => decl,
            other => panic!("expected declaration node, found {other:?}"),
        }
    }

    /// Access a node known to be a statement
    #[must_use]
    pub fn stmt(&self, id: NodeId) -> &Stmt {
        match &self.node(id).kind {
            NodeKind::Stmt(stmt) => stmt,
            other => panic!("expected statement node, found {other:?}"),
        }
    }

    /// Access a node known to be an expression
    #[must_use]
    pub fn expr(&self, id: NodeId) -> &Expr {
        match &self.node(id).kind {
            NodeKind::Expr(expr) => expr,
            other => panic!("expected expression node, found {other:?}"),
        }
    }

    /// Access a node known to be a type annotation
    #[must_use]
    pub fn type_annotation(&self, id: NodeId) -> &TypeAnnotation {
        match &self.node(id).kind {
            NodeKind::Type(annotation) => annotation,
            other => panic!("expected type annotation node, found {other:?}"),
        }
    }

    fn alloc(&mut self, kind: NodeKind, loc: Location) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, loc));
        id
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        let slot = &self.nodes[child.index()].parent;
        debug_assert!(slot.get().is_none(), "node adopted twice");
        slot.set(Some(parent));
    }

    fn adopt_all(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.adopt(parent, child);
        }
    }

    // ------------------------------------------------------------------
    // Constructors: program and declarations
    // ------------------------------------------------------------------

    /// Build the program root and record it
    pub fn build_program(&mut self, decls: Vec<NodeId>, loc: Location) -> NodeId {
        let id = self.alloc(
            NodeKind::Program(Program {
                decls: decls.clone(),
                scope: RefCell::new(Scope::new()),
            }),
            loc,
        );
        self.adopt_all(id, &decls);
        self.root = Some(id);
        id
    }

    /// Build a variable declaration; its location is the identifier's
    pub fn var_decl(&mut self, name: Ident, ty: NodeId) -> NodeId {
        let loc = name.loc;
        let id = self.alloc(
            NodeKind::Decl(Decl {
                name,
                kind: DeclKind::Var(VarDecl { ty }),
            }),
            loc,
        );
        self.adopt(id, ty);
        id
    }

    /// Build a function declaration
    ///
    /// Formals must be variable declarations; interface members pass
    /// `None` for the body.
    pub fn fn_decl(
        &mut self,
        name: Ident,
        return_ty: NodeId,
        formals: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let loc = name.loc;
        let id = self.alloc(
            NodeKind::Decl(Decl {
                name,
                kind: DeclKind::Fn(FnDecl {
                    return_ty,
                    formals: formals.clone(),
                    body,
                    scope: RefCell::new(Scope::new()),
                }),
            }),
            loc,
        );
        self.adopt(id, return_ty);
        self.adopt_all(id, &formals);
        if let Some(body) = body {
            self.adopt(id, body);
        }
        id
    }

    /// Build a class declaration
    ///
    /// `extends` and each `implements` entry must be named type
    /// annotations.
    pub fn class_decl(
        &mut self,
        name: Ident,
        extends: Option<NodeId>,
        implements: Vec<NodeId>,
        members: Vec<NodeId>,
    ) -> NodeId {
        let loc = name.loc;
        let id = self.alloc(
            NodeKind::Decl(Decl {
                name,
                kind: DeclKind::Class(ClassDecl {
                    extends,
                    implements: implements.clone(),
                    members: members.clone(),
                    scope: RefCell::new(Scope::new()),
                }),
            }),
            loc,
        );
        if let Some(extends) = extends {
            self.adopt(id, extends);
        }
        self.adopt_all(id, &implements);
        self.adopt_all(id, &members);
        id
    }

    /// Build an interface declaration; members are bodiless functions
    pub fn interface_decl(&mut self, name: Ident, members: Vec<NodeId>) -> NodeId {
        let loc = name.loc;
        let id = self.alloc(
            NodeKind::Decl(Decl {
                name,
                kind: DeclKind::Interface(InterfaceDecl {
                    members: members.clone(),
                    scope: RefCell::new(Scope::new()),
                }),
            }),
            loc,
        );
        self.adopt_all(id, &members);
        id
    }

    // ------------------------------------------------------------------
    // Constructors: type annotations
    // ------------------------------------------------------------------

    /// Build a primitive type annotation
    pub fn prim_type(&mut self, prim: PrimType, loc: Location) -> NodeId {
        self.alloc(
            NodeKind::Type(TypeAnnotation {
                kind: TypeKind::Prim(prim),
            }),
            loc,
        )
    }

    /// Build a named type annotation
    pub fn named_type(&mut self, name: Ident) -> NodeId {
        let loc = name.loc;
        self.alloc(
            NodeKind::Type(TypeAnnotation {
                kind: TypeKind::Named(name),
            }),
            loc,
        )
    }

    /// Build an array type annotation
    pub fn array_type(&mut self, element: NodeId, loc: Location) -> NodeId {
        let id = self.alloc(
            NodeKind::Type(TypeAnnotation {
                kind: TypeKind::Array(element),
            }),
            loc,
        );
        self.adopt(id, element);
        id
    }

    // ------------------------------------------------------------------
    // Constructors: statements
    // ------------------------------------------------------------------

    /// Build a block: local declarations, then statements
    ///
    /// Statement positions may hold statement or expression nodes.
    pub fn block(&mut self, decls: Vec<NodeId>, stmts: Vec<NodeId>, loc: Location) -> NodeId {
        let id = self.alloc(
            NodeKind::Stmt(Stmt::Block {
                decls: decls.clone(),
                stmts: stmts.clone(),
                scope: RefCell::new(Scope::new()),
            }),
            loc,
        );
        self.adopt_all(id, &decls);
        self.adopt_all(id, &stmts);
        id
    }

    /// Build an if statement
    pub fn if_stmt(
        &mut self,
        cond: NodeId,
        then_body: NodeId,
        else_body: Option<NodeId>,
        loc: Location,
    ) -> NodeId {
        let id = self.alloc(
            NodeKind::Stmt(Stmt::If {
                cond,
                then_body,
                else_body,
            }),
            loc,
        );
        self.adopt(id, cond);
        self.adopt(id, then_body);
        if let Some(else_body) = else_body {
            self.adopt(id, else_body);
        }
        id
    }

    /// Build a while loop
    pub fn while_stmt(&mut self, cond: NodeId, body: NodeId, loc: Location) -> NodeId {
        let id = self.alloc(NodeKind::Stmt(Stmt::While { cond, body }), loc);
        self.adopt(id, cond);
        self.adopt(id, body);
        id
    }

    /// Build a for loop; init and step are expressions checked only for
    /// their side effects
    pub fn for_stmt(
        &mut self,
        init: NodeId,
        cond: NodeId,
        step: NodeId,
        body: NodeId,
        loc: Location,
    ) -> NodeId {
        let id = self.alloc(
            NodeKind::Stmt(Stmt::For {
                init,
                cond,
                step,
                body,
            }),
            loc,
        );
        self.adopt(id, init);
        self.adopt(id, cond);
        self.adopt(id, step);
        self.adopt(id, body);
        id
    }

    /// Build a return statement; a bare `return` carries an empty
    /// expression
    pub fn return_stmt(&mut self, value: NodeId, loc: Location) -> NodeId {
        let id = self.alloc(NodeKind::Stmt(Stmt::Return { value }), loc);
        self.adopt(id, value);
        id
    }

    /// Build a break statement
    pub fn break_stmt(&mut self, loc: Location) -> NodeId {
        self.alloc(NodeKind::Stmt(Stmt::Break), loc)
    }

    /// Build a print statement
    pub fn print_stmt(&mut self, args: Vec<NodeId>, loc: Location) -> NodeId {
        let id = self.alloc(NodeKind::Stmt(Stmt::Print { args: args.clone() }), loc);
        self.adopt_all(id, &args);
        id
    }

    // ------------------------------------------------------------------
    // Constructors: expressions
    // ------------------------------------------------------------------

    fn expr_node(&mut self, kind: ExprKind, loc: Location) -> NodeId {
        self.alloc(NodeKind::Expr(Expr::new(kind)), loc)
    }

    /// Build an integer literal
    pub fn int_lit(&mut self, value: i64, loc: Location) -> NodeId {
        self.expr_node(ExprKind::IntLit(value), loc)
    }

    /// Build a double literal
    pub fn double_lit(&mut self, value: f64, loc: Location) -> NodeId {
        self.expr_node(ExprKind::DoubleLit(value), loc)
    }

    /// Build a boolean literal
    pub fn bool_lit(&mut self, value: bool, loc: Location) -> NodeId {
        self.expr_node(ExprKind::BoolLit(value), loc)
    }

    /// Build a string literal
    pub fn string_lit(&mut self, value: impl Into<String>, loc: Location) -> NodeId {
        self.expr_node(ExprKind::StringLit(value.into()), loc)
    }

    /// Build a null literal
    pub fn null_lit(&mut self, loc: Location) -> NodeId {
        self.expr_node(ExprKind::NullLit, loc)
    }

    /// Build a `this` expression
    pub fn this_expr(&mut self, loc: Location) -> NodeId {
        self.expr_node(ExprKind::This, loc)
    }

    /// Build a field access; a bare identifier in expression position is a
    /// field access with no base
    pub fn field_access(&mut self, base: Option<NodeId>, field: Ident) -> NodeId {
        let loc = match base {
            Some(base) => self.node(base).loc().join(field.loc),
            None => field.loc,
        };
        let id = self.expr_node(ExprKind::FieldAccess { base, field }, loc);
        if let Some(base) = base {
            self.adopt(id, base);
        }
        id
    }

    /// Build a call
    pub fn call(
        &mut self,
        base: Option<NodeId>,
        field: Ident,
        actuals: Vec<NodeId>,
        loc: Location,
    ) -> NodeId {
        let id = self.expr_node(
            ExprKind::Call {
                base,
                field,
                actuals: actuals.clone(),
            },
            loc,
        );
        if let Some(base) = base {
            self.adopt(id, base);
        }
        self.adopt_all(id, &actuals);
        id
    }

    /// Build an array access
    pub fn array_access(&mut self, base: NodeId, subscript: NodeId, loc: Location) -> NodeId {
        let id = self.expr_node(ExprKind::ArrayAccess { base, subscript }, loc);
        self.adopt(id, base);
        self.adopt(id, subscript);
        id
    }

    /// Build an arithmetic expression; unary negation passes no left
    /// operand
    pub fn arithmetic(&mut self, left: Option<NodeId>, op: ArithOp, right: NodeId) -> NodeId {
        let loc = match left {
            Some(left) => self.node(left).loc().join(self.node(right).loc()),
            None => self.node(right).loc(),
        };
        let id = self.expr_node(ExprKind::Arithmetic { left, op, right }, loc);
        if let Some(left) = left {
            self.adopt(id, left);
        }
        self.adopt(id, right);
        id
    }

    /// Build a relational comparison
    pub fn relational(&mut self, left: NodeId, op: RelOp, right: NodeId) -> NodeId {
        let loc = self.node(left).loc().join(self.node(right).loc());
        let id = self.expr_node(ExprKind::Relational { left, op, right }, loc);
        self.adopt(id, left);
        self.adopt(id, right);
        id
    }

    /// Build an equality comparison
    pub fn equality(&mut self, left: NodeId, op: EqOp, right: NodeId) -> NodeId {
        let loc = self.node(left).loc().join(self.node(right).loc());
        let id = self.expr_node(ExprKind::Equality { left, op, right }, loc);
        self.adopt(id, left);
        self.adopt(id, right);
        id
    }

    /// Build a logical expression; unary not passes no left operand
    pub fn logical(&mut self, left: Option<NodeId>, op: LogicOp, right: NodeId) -> NodeId {
        let loc = match left {
            Some(left) => self.node(left).loc().join(self.node(right).loc()),
            None => self.node(right).loc(),
        };
        let id = self.expr_node(ExprKind::Logical { left, op, right }, loc);
        if let Some(left) = left {
            self.adopt(id, left);
        }
        self.adopt(id, right);
        id
    }

    /// Build an assignment
    pub fn assign(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let loc = self.node(left).loc().join(self.node(right).loc());
        let id = self.expr_node(ExprKind::Assign { left, right }, loc);
        self.adopt(id, left);
        self.adopt(id, right);
        id
    }

    /// Build a class instantiation; `class` must be a named type
    /// annotation
    pub fn new_expr(&mut self, class: NodeId, loc: Location) -> NodeId {
        let id = self.expr_node(ExprKind::New { class }, loc);
        self.adopt(id, class);
        id
    }

    /// Build an array allocation
    pub fn new_array(&mut self, size: NodeId, element: NodeId, loc: Location) -> NodeId {
        let id = self.expr_node(ExprKind::NewArray { size, element }, loc);
        self.adopt(id, size);
        self.adopt(id, element);
        id
    }

    /// Build a `ReadInteger()` expression
    pub fn read_integer(&mut self, loc: Location) -> NodeId {
        self.expr_node(ExprKind::ReadInteger, loc)
    }

    /// Build a `ReadLine()` expression
    pub fn read_line(&mut self, loc: Location) -> NodeId {
        self.expr_node(ExprKind::ReadLine, loc)
    }

    /// Build an empty expression (the absent value of a bare `return`)
    pub fn empty_expr(&mut self, loc: Location) -> NodeId {
        self.expr_node(ExprKind::Empty, loc)
    }
}
