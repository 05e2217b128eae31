//! Semantic analyzer for Mocha programs
//!
//! Builds the scope hierarchy and type-checks the AST in one memoized
//! traversal. Declarations are not topologically ordered, so the walk is
//! demand-driven: resolving a name may recursively check the declaration
//! it lands on. The checked-once latch on every node keeps that recursion
//! finite and makes the emitted diagnostic order a deterministic function
//! of the tree shape.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::ast::{
    Ast, ClassDecl, DeclKind, ExprKind, FnDecl, Ident, NodeId, NodeKind, Stmt, TypeKind,
};

use super::error::{DiagnosticKind, LookupKind, Reporter};
use super::{Diagnostic, Scope, Type};

/// Result of analyzing one program
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Diagnostics in emission order
    pub diagnostics: Vec<Diagnostic>,

    /// Whether analysis found no violations
    pub success: bool,
}

/// Semantic analyzer over one [`Ast`]
pub struct Analyzer<'a> {
    /// The tree under analysis; scopes, latches, and computed types live
    /// on its nodes
    ast: &'a Ast,

    /// Ordered diagnostic sink
    reporter: Reporter,
}

impl<'a> Analyzer<'a> {
    /// Create an analyzer for `ast`
    #[must_use]
    pub fn new(ast: &'a Ast) -> Self {
        Self {
            ast,
            reporter: Reporter::new(),
        }
    }

    /// Analyze the whole program
    pub fn analyze(mut self) -> AnalysisResult {
        self.check(self.ast.root());
        let diagnostics = self.reporter.into_diagnostics();
        AnalysisResult {
            success: diagnostics.is_empty(),
            diagnostics,
        }
    }

    // ------------------------------------------------------------------
    // Check-once entry points
    // ------------------------------------------------------------------

    /// Check a node exactly once
    ///
    /// The latch is set before the body runs, so re-entrant checks caused
    /// by forward references, inheritance chains, and mutual calls return
    /// immediately instead of recursing forever. Observing the latch set
    /// does not mean the body has finished.
    fn check(&mut self, id: NodeId) {
        if matches!(self.ast.node(id).kind(), NodeKind::Expr(_)) {
            self.check_expr(id);
            return;
        }
        let node = self.ast.node(id);
        if node.is_checked() {
            return;
        }
        node.set_checked();
        match node.kind() {
            NodeKind::Program(_) => self.check_program(id),
            NodeKind::Decl(decl) => match &decl.kind {
                DeclKind::Var(_) => self.check_var_decl(id),
                DeclKind::Fn(_) => self.check_fn_decl(id),
                DeclKind::Class(_) => self.check_class_decl(id),
                DeclKind::Interface(_) => self.check_interface_decl(id),
            },
            NodeKind::Stmt(_) => self.check_stmt(id),
            NodeKind::Type(_) => self.check_type_annotation(id),
            NodeKind::Expr(_) => unreachable!("expressions are checked via check_expr"),
        }
    }

    /// Check an expression exactly once and yield its computed type
    fn check_expr(&mut self, id: NodeId) -> Type {
        let node = self.ast.node(id);
        if !node.is_checked() {
            node.set_checked();
            let ty = self.compute_expr_type(id);
            self.ast.expr(id).set_ty(ty);
        }
        self.ast.expr(id).ty().unwrap_or(Type::Error)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn check_program(&mut self, id: NodeId) {
        let ast = self.ast;
        let program = ast.program(id);

        // The whole global scope is built before any declaration is
        // checked; forward references would fail otherwise.
        for &decl in &program.decls {
            self.declare_into(&program.scope, decl);
        }
        for &decl in &program.decls {
            self.check(decl);
        }
    }

    fn check_var_decl(&mut self, id: NodeId) {
        let var = self.ast.decl(id).as_var().expect("var decl");
        self.check(var.ty);
    }

    fn check_fn_decl(&mut self, id: NodeId) {
        let ast = self.ast;
        let fun = ast.decl(id).as_fn().expect("fn decl");

        for &formal in &fun.formals {
            self.declare_into(&fun.scope, formal);
        }
        self.check(fun.return_ty);
        for &formal in &fun.formals {
            self.check(formal);
        }
        if let Some(body) = fun.body {
            self.check(body);
        }
    }

    fn check_class_decl(&mut self, id: NodeId) {
        let ast = self.ast;
        let decl = ast.decl(id);
        let class = decl.as_class().expect("class decl");

        for &member in &class.members {
            self.declare_into(&class.scope, member);
        }
        if let Some(extends) = class.extends {
            self.merge_base_class(id, extends);
        }
        for &implemented in &class.implements {
            self.check_implements(id, implemented);
        }
        for &member in &class.members {
            self.check(member);
        }
    }

    fn check_interface_decl(&mut self, id: NodeId) {
        let ast = self.ast;
        let interface = ast.decl(id).as_interface().expect("interface decl");

        for &member in &interface.members {
            self.declare_into(&interface.scope, member);
        }
        for &member in &interface.members {
            self.check(member);
        }
    }

    /// Declare `decl_id` in `scope`, reporting a conflict when the name is
    /// already bound; the first binding stays in place
    fn declare_into(&mut self, scope: &RefCell<Scope>, decl_id: NodeId) {
        let ast = self.ast;
        let decl = ast.decl(decl_id);
        if let Err(prev) = scope.borrow_mut().declare(&decl.name.name, decl_id) {
            self.reporter.report(
                DiagnosticKind::DeclConflict {
                    name: decl.name.name.clone(),
                    prev_line: ast.node(prev).loc().first_line,
                },
                ast.node(decl_id).loc(),
            );
        }
    }

    /// Fold the base class's scope into the subclass's
    ///
    /// The base is scope-built on demand first. Inherited entries land
    /// behind the subclass's own; on collision the subclass entry wins,
    /// except that a method override failing the signature check is
    /// replaced by the base entry so later calls resolve against the
    /// signature that was promised.
    fn merge_base_class(&mut self, class_id: NodeId, extends: NodeId) {
        let ast = self.ast;
        let base_ident = ast
            .type_annotation(extends)
            .kind
            .as_named()
            .expect("extends must be a named type");
        ast.node(extends).set_checked();

        let Some(base_id) = self.lookup_class(&base_ident.name) else {
            self.reporter.report(
                DiagnosticKind::IdentifierNotDeclared {
                    name: base_ident.name.clone(),
                    expected: LookupKind::Class,
                },
                base_ident.loc,
            );
            return;
        };
        if base_id == class_id {
            return;
        }
        self.check(base_id);

        let class = ast.decl(class_id).as_class().expect("class decl");
        let base = ast.decl(base_id).as_class().expect("class decl");
        let inherited: Vec<(String, NodeId)> = base
            .scope
            .borrow()
            .iter()
            .map(|(name, decl)| (name.to_string(), decl))
            .collect();

        for (name, base_member) in inherited {
            let own = class.scope.borrow().lookup(&name);
            let Some(own) = own else {
                let _ = class.scope.borrow_mut().declare(&name, base_member);
                continue;
            };
            if ast.decl(own).is_fn() && ast.decl(base_member).is_fn() {
                if !self.signatures_equivalent(own, base_member) {
                    self.reporter.report(
                        DiagnosticKind::OverrideMismatch { name: name.clone() },
                        ast.node(own).loc(),
                    );
                    // keep the base entry so downstream calls do not
                    // cascade off the bad override
                    class.scope.borrow_mut().rebind(&name, base_member);
                }
            } else {
                self.reporter.report(
                    DiagnosticKind::DeclConflict {
                        name,
                        prev_line: ast.node(base_member).loc().first_line,
                    },
                    ast.node(own).loc(),
                );
            }
        }
    }

    /// Check one entry of a class's implements list
    ///
    /// Every method of the interface must have a signature-equivalent
    /// member function in the class's merged scope. The not-implemented
    /// report fires at most once per interface.
    fn check_implements(&mut self, class_id: NodeId, implemented: NodeId) {
        let ast = self.ast;
        let iface_ident = ast
            .type_annotation(implemented)
            .kind
            .as_named()
            .expect("implements must be a named type");
        ast.node(implemented).set_checked();

        let Some(iface_id) = self.lookup_interface(&iface_ident.name) else {
            self.reporter.report(
                DiagnosticKind::IdentifierNotDeclared {
                    name: iface_ident.name.clone(),
                    expected: LookupKind::Interface,
                },
                iface_ident.loc,
            );
            return;
        };
        self.check(iface_id);

        let class_decl = ast.decl(class_id);
        let class = class_decl.as_class().expect("class decl");
        let iface = ast.decl(iface_id).as_interface().expect("interface decl");
        let required: Vec<(String, NodeId)> = iface
            .scope
            .borrow()
            .iter()
            .map(|(name, decl)| (name.to_string(), decl))
            .collect();

        let mut reported = false;
        for (name, signature) in required {
            let member = class.scope.borrow().lookup(&name);
            let implemented = match member {
                Some(member) if ast.decl(member).is_fn() => {
                    if self.signatures_equivalent(member, signature) {
                        true
                    } else {
                        self.reporter.report(
                            DiagnosticKind::OverrideMismatch { name },
                            ast.node(member).loc(),
                        );
                        false
                    }
                }
                _ => false,
            };
            if !implemented && !reported {
                reported = true;
                self.reporter.report(
                    DiagnosticKind::InterfaceNotImplemented {
                        class: class_decl.name.name.clone(),
                        interface: iface_ident.name.clone(),
                    },
                    ast.node(class_id).loc(),
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Type annotations
    // ------------------------------------------------------------------

    fn check_type_annotation(&mut self, id: NodeId) {
        let ast = self.ast;
        match &ast.type_annotation(id).kind {
            TypeKind::Prim(_) => {}
            TypeKind::Named(ident) => {
                if self.lookup_class(&ident.name).is_none()
                    && self.lookup_interface(&ident.name).is_none()
                {
                    self.reporter.report(
                        DiagnosticKind::IdentifierNotDeclared {
                            name: ident.name.clone(),
                            expected: LookupKind::Type,
                        },
                        ident.loc,
                    );
                }
            }
            TypeKind::Array(element) => self.check(*element),
        }
    }

    /// Lower a syntactic annotation to its semantic type
    ///
    /// Purely structural; whether a named annotation resolves is checked
    /// separately by `check_type_annotation`.
    fn lower_type(&self, id: NodeId) -> Type {
        match &self.ast.type_annotation(id).kind {
            TypeKind::Prim(prim) => prim.ty(),
            TypeKind::Named(ident) => Type::named(ident.name.clone()),
            TypeKind::Array(element) => Type::array(self.lower_type(*element)),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn check_stmt(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.stmt(id) {
            Stmt::Block { decls, stmts, scope } => {
                // Scope first, bodies second, or forward references
                // inside the block would fail.
                for &decl in decls {
                    self.declare_into(scope, decl);
                }
                for &decl in decls {
                    self.check(decl);
                }
                for &stmt in stmts {
                    self.check(stmt);
                }
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let test = self.check_expr(*cond);
                self.check(*then_body);
                if let Some(else_body) = else_body {
                    self.check(*else_body);
                }
                self.require_bool_test(&test, *cond);
            }
            Stmt::While { cond, body } => {
                let test = self.check_expr(*cond);
                self.check(*body);
                self.require_bool_test(&test, *cond);
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                self.check_expr(*init);
                let test = self.check_expr(*cond);
                self.check_expr(*step);
                self.check(*body);
                self.require_bool_test(&test, *cond);
            }
            Stmt::Return { value } => {
                let given = self.check_expr(*value);
                if let Some(fn_id) = self.current_fn(id) {
                    let fun = ast.decl(fn_id).as_fn().expect("fn decl");
                    let expected = self.lower_type(fun.return_ty);
                    if !self.is_compatible(&given, &expected) {
                        self.reporter.report(
                            DiagnosticKind::ReturnMismatch { given, expected },
                            ast.node(id).loc(),
                        );
                    }
                }
            }
            Stmt::Break => {
                if !self.inside_loop(id) {
                    self.reporter
                        .report(DiagnosticKind::BreakOutsideLoop, ast.node(id).loc());
                }
            }
            Stmt::Print { args } => {
                let arg_types: Vec<(NodeId, Type)> = args
                    .iter()
                    .map(|&arg| (arg, self.check_expr(arg)))
                    .collect();
                for (position, (arg, ty)) in arg_types.into_iter().enumerate() {
                    let printable = ty.is_equivalent_to(&Type::Int)
                        || ty.is_equivalent_to(&Type::Bool)
                        || ty.is_equivalent_to(&Type::String);
                    if !printable {
                        self.reporter.report(
                            DiagnosticKind::PrintArgMismatch {
                                position: position + 1,
                                given: ty,
                            },
                            ast.node(arg).loc(),
                        );
                    }
                }
            }
        }
    }

    fn require_bool_test(&mut self, test: &Type, cond: NodeId) {
        // equivalence lets `error` through, which keeps an already
        // reported test expression quiet
        if !test.is_equivalent_to(&Type::Bool) {
            self.reporter
                .report(DiagnosticKind::TestNotBoolean, self.ast.node(cond).loc());
        }
    }

    /// Whether `id` sits inside some loop statement of its function
    fn inside_loop(&self, id: NodeId) -> bool {
        let mut cursor = self.ast.node(id).parent();
        while let Some(current) = cursor {
            match self.ast.node(current).kind() {
                NodeKind::Stmt(stmt) if stmt.is_loop() => return true,
                NodeKind::Stmt(_) | NodeKind::Expr(_) => cursor = self.ast.node(current).parent(),
                _ => return false,
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn compute_expr_type(&mut self, id: NodeId) -> Type {
        let ast = self.ast;
        let loc = ast.node(id).loc();
        match &ast.expr(id).kind {
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::DoubleLit(_) => Type::Double,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::StringLit(_) => Type::String,
            ExprKind::NullLit => Type::Null,
            ExprKind::Empty => Type::Void,
            ExprKind::ReadInteger => Type::Int,
            ExprKind::ReadLine => Type::String,

            ExprKind::This => match self.current_class(id) {
                Some(class_id) => Type::named(ast.decl(class_id).name.name.clone()),
                None => {
                    self.reporter
                        .report(DiagnosticKind::ThisOutsideClassScope, loc);
                    Type::Error
                }
            },

            ExprKind::FieldAccess { base: None, field } => match self.lookup_var(id, &field.name) {
                Some(var_id) => {
                    self.check(var_id);
                    let var = ast.decl(var_id).as_var().expect("var decl");
                    self.lower_type(var.ty)
                }
                None => {
                    self.reporter.report(
                        DiagnosticKind::IdentifierNotDeclared {
                            name: field.name.clone(),
                            expected: LookupKind::Variable,
                        },
                        field.loc,
                    );
                    Type::Error
                }
            },

            ExprKind::FieldAccess {
                base: Some(base),
                field,
            } => self.check_member_access(id, *base, field),

            ExprKind::Call {
                base,
                field,
                actuals,
            } => self.check_call(id, *base, field, actuals),

            ExprKind::ArrayAccess { base, subscript } => {
                let base_ty = self.check_expr(*base);
                let subscript_ty = self.check_expr(*subscript);
                let result = match base_ty {
                    Type::Array(element) => *element,
                    Type::Error => Type::Error,
                    _ => {
                        self.reporter
                            .report(DiagnosticKind::BracketsOnNonArray, loc);
                        Type::Error
                    }
                };
                if !subscript_ty.is_equivalent_to(&Type::Int) {
                    self.reporter.report(
                        DiagnosticKind::SubscriptNotInteger,
                        ast.node(*subscript).loc(),
                    );
                }
                result
            }

            ExprKind::Arithmetic {
                left: None,
                op,
                right,
            } => {
                let operand = self.check_expr(*right);
                if operand.is_error() {
                    Type::Error
                } else if operand.is_numeric() {
                    operand
                } else {
                    self.reporter.report(
                        DiagnosticKind::IncompatibleOperand {
                            op: op.as_str(),
                            operand,
                        },
                        loc,
                    );
                    Type::Error
                }
            }

            ExprKind::Arithmetic {
                left: Some(left),
                op,
                right,
            } => {
                let lhs = self.check_expr(*left);
                let rhs = self.check_expr(*right);
                if lhs.is_error() || rhs.is_error() {
                    Type::Error
                } else if lhs.is_numeric() && lhs == rhs {
                    lhs
                } else {
                    self.reporter.report(
                        DiagnosticKind::IncompatibleOperands {
                            op: op.as_str(),
                            left: lhs,
                            right: rhs,
                        },
                        loc,
                    );
                    Type::Error
                }
            }

            ExprKind::Relational { left, op, right } => {
                let lhs = self.check_expr(*left);
                let rhs = self.check_expr(*right);
                let well_typed = lhs.is_numeric() && lhs == rhs;
                if !lhs.is_error() && !rhs.is_error() && !well_typed {
                    self.reporter.report(
                        DiagnosticKind::IncompatibleOperands {
                            op: op.as_str(),
                            left: lhs,
                            right: rhs,
                        },
                        loc,
                    );
                }
                Type::Bool
            }

            ExprKind::Equality { left, op, right } => {
                let lhs = self.check_expr(*left);
                let rhs = self.check_expr(*right);
                let comparable =
                    self.is_compatible(&lhs, &rhs) || self.is_compatible(&rhs, &lhs);
                if !lhs.is_error() && !rhs.is_error() && !comparable {
                    self.reporter.report(
                        DiagnosticKind::IncompatibleOperands {
                            op: op.as_str(),
                            left: lhs,
                            right: rhs,
                        },
                        loc,
                    );
                }
                Type::Bool
            }

            ExprKind::Logical {
                left: None,
                op,
                right,
            } => {
                let operand = self.check_expr(*right);
                if !operand.is_error() && operand != Type::Bool {
                    self.reporter.report(
                        DiagnosticKind::IncompatibleOperand {
                            op: op.as_str(),
                            operand,
                        },
                        loc,
                    );
                }
                Type::Bool
            }

            ExprKind::Logical {
                left: Some(left),
                op,
                right,
            } => {
                let lhs = self.check_expr(*left);
                let rhs = self.check_expr(*right);
                let well_typed = lhs == Type::Bool && rhs == Type::Bool;
                if !lhs.is_error() && !rhs.is_error() && !well_typed {
                    self.reporter.report(
                        DiagnosticKind::IncompatibleOperands {
                            op: op.as_str(),
                            left: lhs,
                            right: rhs,
                        },
                        loc,
                    );
                }
                Type::Bool
            }

            ExprKind::Assign { left, right } => {
                let lhs = self.check_expr(*left);
                let rhs = self.check_expr(*right);
                if lhs.is_error() || rhs.is_error() {
                    Type::Error
                } else if self.is_compatible(&rhs, &lhs) {
                    lhs
                } else {
                    self.reporter.report(
                        DiagnosticKind::IncompatibleOperands {
                            op: "=",
                            left: lhs,
                            right: rhs,
                        },
                        loc,
                    );
                    Type::Error
                }
            }

            ExprKind::New { class } => {
                let ident = ast
                    .type_annotation(*class)
                    .kind
                    .as_named()
                    .expect("new must name a class");
                ast.node(*class).set_checked();
                if self.lookup_class(&ident.name).is_some() {
                    Type::named(ident.name.clone())
                } else {
                    self.reporter.report(
                        DiagnosticKind::IdentifierNotDeclared {
                            name: ident.name.clone(),
                            expected: LookupKind::Class,
                        },
                        ident.loc,
                    );
                    Type::Error
                }
            }

            ExprKind::NewArray { size, element } => {
                let size_ty = self.check_expr(*size);
                if !size_ty.is_equivalent_to(&Type::Int) {
                    self.reporter
                        .report(DiagnosticKind::NewArraySizeNotInteger, ast.node(*size).loc());
                }
                self.check(*element);
                Type::array(self.lower_type(*element))
            }
        }
    }

    /// Check `base.field` where a base expression was written
    fn check_member_access(&mut self, access: NodeId, base: NodeId, field: &Ident) -> Type {
        let ast = self.ast;
        let base_ty = self.check_expr(base);
        let class_id = match &base_ty {
            Type::Error => return Type::Error,
            Type::Named(name) => self.lookup_class(name),
            _ => None,
        };
        let Some(class_id) = class_id else {
            self.reporter.report(
                DiagnosticKind::FieldNotFoundInBase {
                    field: field.name.clone(),
                    base: base_ty,
                },
                field.loc,
            );
            return Type::Error;
        };
        self.check(class_id);

        let class = ast.decl(class_id).as_class().expect("class decl");
        let member = class.scope.borrow().lookup(&field.name);
        let var_id = match member {
            Some(member) if ast.decl(member).is_var() => member,
            _ => {
                self.reporter.report(
                    DiagnosticKind::FieldNotFoundInBase {
                        field: field.name.clone(),
                        base: base_ty,
                    },
                    field.loc,
                );
                return Type::Error;
            }
        };
        self.check(var_id);

        // Fields are protected: the access site must sit in the declaring
        // class or one of its subclasses.
        let accessible = match self.current_class(access) {
            Some(current) => {
                let current_name = ast.decl(current).name.name.clone();
                let mut seen = HashSet::new();
                match &base_ty {
                    Type::Named(base_name) => {
                        self.named_compatible(&current_name, base_name, &mut seen)
                    }
                    _ => false,
                }
            }
            None => false,
        };
        if !accessible {
            self.reporter.report(
                DiagnosticKind::InaccessibleField {
                    field: field.name.clone(),
                    base: base_ty,
                },
                field.loc,
            );
        }

        let var = ast.decl(var_id).as_var().expect("var decl");
        self.lower_type(var.ty)
    }

    /// Check a call, with or without a receiver
    fn check_call(
        &mut self,
        call: NodeId,
        base: Option<NodeId>,
        field: &Ident,
        actuals: &[NodeId],
    ) -> Type {
        let ast = self.ast;
        let Some(base) = base else {
            let Some(fn_id) = self.lookup_fn(call, &field.name) else {
                self.reporter.report(
                    DiagnosticKind::IdentifierNotDeclared {
                        name: field.name.clone(),
                        expected: LookupKind::Function,
                    },
                    field.loc,
                );
                self.check_actuals_only(actuals);
                return Type::Error;
            };
            return self.check_call_against(fn_id, field, actuals);
        };

        let base_ty = self.check_expr(base);
        match &base_ty {
            Type::Error => {
                self.check_actuals_only(actuals);
                Type::Error
            }
            // arrays expose a synthesized zero-argument length() -> int
            Type::Array(_) if field.name == "length" => {
                self.check_actuals_only(actuals);
                if !actuals.is_empty() {
                    self.reporter.report(
                        DiagnosticKind::NumArgsMismatch {
                            name: field.name.clone(),
                            expected: 0,
                            given: actuals.len(),
                        },
                        field.loc,
                    );
                }
                Type::Int
            }
            Type::Named(name) => {
                let holder = self
                    .lookup_class(name)
                    .or_else(|| self.lookup_interface(name));
                let method = holder.and_then(|holder_id| {
                    self.check(holder_id);
                    let found = match &ast.decl(holder_id).kind {
                        DeclKind::Class(class) => class.scope.borrow().lookup(&field.name),
                        DeclKind::Interface(iface) => iface.scope.borrow().lookup(&field.name),
                        _ => None,
                    };
                    found.filter(|&member| ast.decl(member).is_fn())
                });
                match method {
                    Some(fn_id) => self.check_call_against(fn_id, field, actuals),
                    None => {
                        self.reporter.report(
                            DiagnosticKind::FieldNotFoundInBase {
                                field: field.name.clone(),
                                base: base_ty,
                            },
                            field.loc,
                        );
                        self.check_actuals_only(actuals);
                        Type::Error
                    }
                }
            }
            _ => {
                self.reporter.report(
                    DiagnosticKind::FieldNotFoundInBase {
                        field: field.name.clone(),
                        base: base_ty,
                    },
                    field.loc,
                );
                self.check_actuals_only(actuals);
                Type::Error
            }
        }
    }

    /// Check actual arguments when no callee signature is available
    fn check_actuals_only(&mut self, actuals: &[NodeId]) {
        for &actual in actuals {
            self.check_expr(actual);
        }
    }

    /// Check a resolved call: arity, then per-position compatibility
    fn check_call_against(&mut self, fn_id: NodeId, field: &Ident, actuals: &[NodeId]) -> Type {
        let ast = self.ast;
        self.check(fn_id);

        let actual_types: Vec<(NodeId, Type)> = actuals
            .iter()
            .map(|&actual| (actual, self.check_expr(actual)))
            .collect();

        let fun = ast.decl(fn_id).as_fn().expect("fn decl");
        let formal_types: Vec<Type> = fun
            .formals
            .iter()
            .map(|&formal| {
                let var = ast.decl(formal).as_var().expect("formal must be a variable");
                self.lower_type(var.ty)
            })
            .collect();

        if actual_types.len() != formal_types.len() {
            self.reporter.report(
                DiagnosticKind::NumArgsMismatch {
                    name: field.name.clone(),
                    expected: formal_types.len(),
                    given: actual_types.len(),
                },
                field.loc,
            );
        } else {
            for (position, ((actual, given), expected)) in
                actual_types.into_iter().zip(formal_types).enumerate()
            {
                if !self.is_compatible(&given, &expected) {
                    self.reporter.report(
                        DiagnosticKind::ArgMismatch {
                            position: position + 1,
                            given,
                            expected,
                        },
                        ast.node(actual).loc(),
                    );
                }
            }
        }

        self.lower_type(fun.return_ty)
    }

    // ------------------------------------------------------------------
    // Name resolution
    // ------------------------------------------------------------------

    /// Resolve a variable by climbing the scope chain from `from`
    ///
    /// Entries of the wrong category do not shadow; the walk keeps going
    /// outward past them.
    fn lookup_var(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.lookup_in_chain(from, name, |analyzer, decl| analyzer.ast.decl(decl).is_var())
    }

    /// Resolve a callable by climbing the scope chain from the call site
    ///
    /// Inside a method this consults the enclosing class's merged scope
    /// before escalating to the globals, so `m(...)` and `this.m(...)`
    /// resolve identically.
    fn lookup_fn(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.lookup_in_chain(from, name, |analyzer, decl| analyzer.ast.decl(decl).is_fn())
    }

    fn lookup_in_chain(
        &self,
        from: NodeId,
        name: &str,
        matches_demand: impl Fn(&Self, NodeId) -> bool,
    ) -> Option<NodeId> {
        let ast = self.ast;
        let mut cursor = Some(from);
        while let Some(current) = cursor {
            if let Some(scope) = self.local_scope(current) {
                let hit = scope.borrow().lookup(name);
                if let Some(decl) = hit {
                    if matches_demand(self, decl) {
                        return Some(decl);
                    }
                }
            }
            cursor = ast.node(current).parent();
        }
        None
    }

    /// The scope attached to `id`, if it is a scope-bearing node
    fn local_scope(&self, id: NodeId) -> Option<&'a RefCell<Scope>> {
        let ast = self.ast;
        match ast.node(id).kind() {
            NodeKind::Program(program) => Some(&program.scope),
            NodeKind::Decl(decl) => match &decl.kind {
                DeclKind::Fn(FnDecl { scope, .. })
                | DeclKind::Class(ClassDecl { scope, .. }) => Some(scope),
                DeclKind::Interface(interface) => Some(&interface.scope),
                DeclKind::Var(_) => None,
            },
            NodeKind::Stmt(Stmt::Block { scope, .. }) => Some(scope),
            _ => None,
        }
    }

    /// Resolve a class name in the global scope
    fn lookup_class(&self, name: &str) -> Option<NodeId> {
        let program = self.ast.program(self.ast.root());
        let hit = program.scope.borrow().lookup(name)?;
        match &self.ast.decl(hit).kind {
            DeclKind::Class(_) => Some(hit),
            _ => None,
        }
    }

    /// Resolve an interface name in the global scope
    fn lookup_interface(&self, name: &str) -> Option<NodeId> {
        let program = self.ast.program(self.ast.root());
        let hit = program.scope.borrow().lookup(name)?;
        match &self.ast.decl(hit).kind {
            DeclKind::Interface(_) => Some(hit),
            _ => None,
        }
    }

    /// The class declaration enclosing `id`, if any
    fn current_class(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.ast.node(id).parent();
        while let Some(current) = cursor {
            if let NodeKind::Decl(decl) = self.ast.node(current).kind() {
                if decl.as_class().is_some() {
                    return Some(current);
                }
            }
            cursor = self.ast.node(current).parent();
        }
        None
    }

    /// The function declaration enclosing `id`, if any
    fn current_fn(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.ast.node(id).parent();
        while let Some(current) = cursor {
            if let NodeKind::Decl(decl) = self.ast.node(current).kind() {
                if decl.is_fn() {
                    return Some(current);
                }
            }
            cursor = self.ast.node(current).parent();
        }
        None
    }

    // ------------------------------------------------------------------
    // Type relations
    // ------------------------------------------------------------------

    /// Signature equivalence of two function declarations: equivalent
    /// return types, same arity, pairwise equivalent formal types
    fn signatures_equivalent(&self, a: NodeId, b: NodeId) -> bool {
        let ast = self.ast;
        let fa = ast.decl(a).as_fn().expect("fn decl");
        let fb = ast.decl(b).as_fn().expect("fn decl");
        if !self
            .lower_type(fa.return_ty)
            .is_equivalent_to(&self.lower_type(fb.return_ty))
        {
            return false;
        }
        if fa.formals.len() != fb.formals.len() {
            return false;
        }
        fa.formals.iter().zip(&fb.formals).all(|(&x, &y)| {
            let tx = self.lower_type(ast.decl(x).as_var().expect("formal").ty);
            let ty = self.lower_type(ast.decl(y).as_var().expect("formal").ty);
            tx.is_equivalent_to(&ty)
        })
    }

    /// The directional compatibility relation: `given` usable where
    /// `expected` is demanded
    fn is_compatible(&self, given: &Type, expected: &Type) -> bool {
        if given.is_equivalent_to(expected) {
            return true;
        }
        if matches!(given, Type::Null) && expected.is_named() {
            return true;
        }
        if let (Type::Named(given_name), Type::Named(expected_name)) = (given, expected) {
            let mut seen = HashSet::new();
            return self.named_compatible(given_name, expected_name, &mut seen);
        }
        false
    }

    /// Walk `given`'s extends chain and implements lists looking for
    /// `expected`
    ///
    /// `seen` guards hand-built inheritance cycles. A name that resolves
    /// to nothing at all is treated as compatible with anything; its use
    /// has already been reported and carries the error type downstream.
    fn named_compatible(&self, given: &str, expected: &str, seen: &mut HashSet<String>) -> bool {
        if given == expected {
            return true;
        }
        if !seen.insert(given.to_string()) {
            return false;
        }
        let Some(class_id) = self.lookup_class(given) else {
            return self.lookup_interface(given).is_none();
        };
        let class = self.ast.decl(class_id).as_class().expect("class decl");
        for &implemented in &class.implements {
            if let Some(ident) = self.ast.type_annotation(implemented).kind.as_named() {
                if ident.name == expected {
                    return true;
                }
            }
        }
        if let Some(extends) = class.extends {
            if let Some(base) = self.ast.type_annotation(extends).kind.as_named() {
                return self.named_compatible(&base.name, expected, seen);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithOp, EqOp, LogicOp, PrimType, RelOp};
    use crate::location::Location;

    fn loc(line: u32) -> Location {
        Location::span(line, 1, 10)
    }

    fn ident(name: &str, line: u32) -> Ident {
        Ident::new(name, loc(line))
    }

    fn prim_var(ast: &mut Ast, name: &str, line: u32, prim: PrimType) -> NodeId {
        let ty = ast.prim_type(prim, loc(line));
        ast.var_decl(ident(name, line), ty)
    }

    fn class_var(ast: &mut Ast, name: &str, line: u32, class: &str) -> NodeId {
        let ty = ast.named_type(ident(class, line));
        ast.var_decl(ident(name, line), ty)
    }

    fn name_expr(ast: &mut Ast, name: &str, line: u32) -> NodeId {
        ast.field_access(None, ident(name, line))
    }

    /// Wrap locals and statements into `void main() { ... }` after the
    /// given top-level declarations
    fn program(
        ast: &mut Ast,
        decls: Vec<NodeId>,
        locals: Vec<NodeId>,
        stmts: Vec<NodeId>,
    ) -> AnalysisResult {
        let body = ast.block(locals, stmts, loc(90));
        let ret = ast.prim_type(PrimType::Void, loc(91));
        let main = ast.fn_decl(ident("main", 91), ret, Vec::new(), Some(body));
        let mut top = decls;
        top.push(main);
        ast.build_program(top, loc(1));
        Analyzer::new(ast).analyze()
    }

    #[test]
    fn undeclared_variable() {
        let mut ast = Ast::new();
        let use_x = name_expr(&mut ast, "x", 2);
        let result = program(&mut ast, vec![], vec![], vec![use_x]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::IdentifierNotDeclared {
                name,
                expected: LookupKind::Variable,
            } if name == "x"
        ));
        assert_eq!(ast.expr(use_x).ty(), Some(Type::Error));
    }

    #[test]
    fn duplicate_local_declaration() {
        let mut ast = Ast::new();
        let first = prim_var(&mut ast, "x", 2, PrimType::Int);
        let second = prim_var(&mut ast, "x", 3, PrimType::Bool);
        let result = program(&mut ast, vec![], vec![first, second], vec![]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].loc.first_line, 3);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::DeclConflict { name, prev_line: 2 } if name == "x"
        ));
    }

    #[test]
    fn this_outside_class_scope() {
        let mut ast = Ast::new();
        let this = ast.this_expr(loc(2));
        let result = program(&mut ast, vec![], vec![], vec![this]);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::ThisOutsideClassScope)));
        assert_eq!(ast.expr(this).ty(), Some(Type::Error));
    }

    #[test]
    fn unary_operators_demand_matching_operands() {
        let mut ast = Ast::new();
        let flag = ast.bool_lit(true, loc(2));
        let neg = ast.arithmetic(None, ArithOp::Sub, flag);
        let one = ast.int_lit(1, loc(3));
        let not = ast.logical(None, LogicOp::Not, one);
        let result = program(&mut ast, vec![], vec![], vec![neg, not]);
        assert_eq!(result.diagnostics.len(), 2);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::IncompatibleOperand {
                op: "-",
                operand: Type::Bool,
            }
        ));
        assert!(matches!(
            result.diagnostics[1].kind,
            DiagnosticKind::IncompatibleOperand {
                op: "!",
                operand: Type::Int,
            }
        ));
        assert_eq!(ast.expr(neg).ty(), Some(Type::Error));
        assert_eq!(ast.expr(not).ty(), Some(Type::Bool));
    }

    #[test]
    fn arithmetic_error_does_not_cascade() {
        let mut ast = Ast::new();
        let one = ast.int_lit(1, loc(2));
        let text = ast.string_lit("s", loc(2));
        let bad = ast.arithmetic(Some(one), ArithOp::Add, text);
        let two = ast.int_lit(2, loc(2));
        let outer = ast.arithmetic(Some(bad), ArithOp::Mul, two);
        let result = program(&mut ast, vec![], vec![], vec![outer]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::IncompatibleOperands {
                op: "+",
                left: Type::Int,
                right: Type::String,
            }
        ));
        assert_eq!(ast.expr(outer).ty(), Some(Type::Error));
    }

    #[test]
    fn relational_mixed_numerics_still_bool() {
        let mut ast = Ast::new();
        let one = ast.int_lit(1, loc(2));
        let half = ast.double_lit(0.5, loc(2));
        let cmp = ast.relational(one, RelOp::Lt, half);
        let result = program(&mut ast, vec![], vec![], vec![cmp]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::IncompatibleOperands { op: "<", .. }
        ));
        assert_eq!(ast.expr(cmp).ty(), Some(Type::Bool));
    }

    #[test]
    fn equality_requires_mutual_compatibility() {
        let mut ast = Ast::new();
        let class = ast.class_decl(ident("A", 1), None, vec![], vec![]);
        let a = class_var(&mut ast, "a", 2, "A");
        let lhs = name_expr(&mut ast, "a", 3);
        let null = ast.null_lit(loc(3));
        let ok = ast.equality(lhs, EqOp::Eq, null);
        let one = ast.int_lit(1, loc(4));
        let text = ast.string_lit("x", loc(4));
        let bad = ast.equality(one, EqOp::Ne, text);
        let result = program(&mut ast, vec![class], vec![a], vec![ok, bad]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::IncompatibleOperands { op: "!=", .. }
        ));
    }

    #[test]
    fn assignment_takes_lhs_type_or_errors() {
        let mut ast = Ast::new();
        let x = prim_var(&mut ast, "x", 2, PrimType::Int);
        let lhs = name_expr(&mut ast, "x", 3);
        let text = ast.string_lit("s", loc(3));
        let bad = ast.assign(lhs, text);
        let result = program(&mut ast, vec![], vec![x], vec![bad]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::IncompatibleOperands {
                op: "=",
                left: Type::Int,
                right: Type::String,
            }
        ));
        assert_eq!(ast.expr(bad).ty(), Some(Type::Error));
    }

    #[test]
    fn subclass_compatible_with_base_and_interface() {
        let mut ast = Ast::new();
        let iface = ast.interface_decl(ident("Drawable", 1), vec![]);
        let imp = ast.named_type(ident("Drawable", 2));
        let base = ast.class_decl(ident("Shape", 2), None, vec![imp], vec![]);
        let ext = ast.named_type(ident("Shape", 3));
        let derived = ast.class_decl(ident("Circle", 3), Some(ext), vec![], vec![]);

        let b = class_var(&mut ast, "b", 4, "Shape");
        let i = class_var(&mut ast, "i", 5, "Drawable");
        let d = class_var(&mut ast, "d", 6, "Circle");

        let b_use = name_expr(&mut ast, "b", 7);
        let d_use = name_expr(&mut ast, "d", 7);
        let assign_base = ast.assign(b_use, d_use);
        let i_use = name_expr(&mut ast, "i", 8);
        let d_use2 = name_expr(&mut ast, "d", 8);
        let assign_iface = ast.assign(i_use, d_use2);

        let result = program(
            &mut ast,
            vec![iface, base, derived],
            vec![b, i, d],
            vec![assign_base, assign_iface],
        );
        assert!(result.success, "diagnostics: {:?}", result.diagnostics);
    }

    #[test]
    fn base_not_compatible_with_subclass() {
        let mut ast = Ast::new();
        let base = ast.class_decl(ident("Shape", 1), None, vec![], vec![]);
        let ext = ast.named_type(ident("Shape", 2));
        let derived = ast.class_decl(ident("Circle", 2), Some(ext), vec![], vec![]);
        let b = class_var(&mut ast, "b", 3, "Shape");
        let d = class_var(&mut ast, "d", 4, "Circle");
        let d_use = name_expr(&mut ast, "d", 5);
        let b_use = name_expr(&mut ast, "b", 5);
        let bad = ast.assign(d_use, b_use);
        let result = program(&mut ast, vec![base, derived], vec![b, d], vec![bad]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::IncompatibleOperands { op: "=", .. }
        ));
    }

    #[test]
    fn call_arity_and_argument_compatibility() {
        let mut ast = Ast::new();
        let a = prim_var(&mut ast, "a", 1, PrimType::Int);
        let b = prim_var(&mut ast, "b", 1, PrimType::Bool);
        let ret = ast.prim_type(PrimType::Void, loc(1));
        let body = ast.block(vec![], vec![], loc(1));
        let f = ast.fn_decl(ident("f", 1), ret, vec![a, b], Some(body));

        let one = ast.int_lit(1, loc(3));
        let short_call = ast.call(None, ident("f", 3), vec![one], loc(3));
        let two = ast.int_lit(2, loc(4));
        let three = ast.int_lit(3, loc(4));
        let bad_call = ast.call(None, ident("f", 4), vec![two, three], loc(4));

        let result = program(&mut ast, vec![f], vec![], vec![short_call, bad_call]);
        assert_eq!(result.diagnostics.len(), 2);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::NumArgsMismatch {
                name,
                expected: 2,
                given: 1,
            } if name == "f"
        ));
        assert!(matches!(
            result.diagnostics[1].kind,
            DiagnosticKind::ArgMismatch {
                position: 2,
                given: Type::Int,
                expected: Type::Bool,
            }
        ));
    }

    #[test]
    fn undeclared_function_call() {
        let mut ast = Ast::new();
        let call = ast.call(None, ident("missing", 2), vec![], loc(2));
        let result = program(&mut ast, vec![], vec![], vec![call]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::IdentifierNotDeclared {
                name,
                expected: LookupKind::Function,
            } if name == "missing"
        ));
        assert_eq!(ast.expr(call).ty(), Some(Type::Error));
    }

    #[test]
    fn array_length_is_a_zero_argument_callable() {
        let mut ast = Ast::new();
        let elem = ast.prim_type(PrimType::Int, loc(1));
        let arr_ty = ast.array_type(elem, loc(1));
        let arr = ast.var_decl(ident("xs", 1), arr_ty);

        let n = prim_var(&mut ast, "n", 2, PrimType::Int);
        let n_use = name_expr(&mut ast, "n", 3);
        let xs = name_expr(&mut ast, "xs", 3);
        let len = ast.call(Some(xs), ident("length", 3), vec![], loc(3));
        let ok = ast.assign(n_use, len);

        let xs2 = name_expr(&mut ast, "xs", 4);
        let one = ast.int_lit(1, loc(4));
        let bad_len = ast.call(Some(xs2), ident("length", 4), vec![one], loc(4));

        let xs3 = name_expr(&mut ast, "xs", 5);
        let missing = ast.call(Some(xs3), ident("size", 5), vec![], loc(5));

        let result = program(&mut ast, vec![], vec![arr, n], vec![ok, bad_len, missing]);
        assert_eq!(result.diagnostics.len(), 2);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::NumArgsMismatch {
                name,
                expected: 0,
                given: 1,
            } if name == "length"
        ));
        assert!(matches!(
            &result.diagnostics[1].kind,
            DiagnosticKind::FieldNotFoundInBase { field, .. } if field == "size"
        ));
        assert_eq!(ast.expr(len).ty(), Some(Type::Int));
    }

    #[test]
    fn subscript_and_bracket_misuse() {
        let mut ast = Ast::new();
        let elem = ast.prim_type(PrimType::Int, loc(1));
        let arr_ty = ast.array_type(elem, loc(1));
        let arr = ast.var_decl(ident("xs", 1), arr_ty);
        let x = prim_var(&mut ast, "x", 2, PrimType::Int);

        let xs = name_expr(&mut ast, "xs", 3);
        let text = ast.string_lit("i", loc(3));
        let bad_index = ast.array_access(xs, text, loc(3));

        let x_use = name_expr(&mut ast, "x", 4);
        let zero = ast.int_lit(0, loc(4));
        let not_array = ast.array_access(x_use, zero, loc(4));

        let result = program(&mut ast, vec![], vec![arr, x], vec![bad_index, not_array]);
        assert_eq!(result.diagnostics.len(), 2);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::SubscriptNotInteger
        ));
        assert!(matches!(
            result.diagnostics[1].kind,
            DiagnosticKind::BracketsOnNonArray
        ));
        // element type survives a bad subscript
        assert_eq!(ast.expr(bad_index).ty(), Some(Type::Int));
        assert_eq!(ast.expr(not_array).ty(), Some(Type::Error));
    }

    #[test]
    fn new_demands_a_class() {
        let mut ast = Ast::new();
        let iface = ast.interface_decl(ident("I", 1), vec![]);
        let missing_ty = ast.named_type(ident("Ghost", 2));
        let new_missing = ast.new_expr(missing_ty, loc(2));
        let iface_ty = ast.named_type(ident("I", 3));
        let new_iface = ast.new_expr(iface_ty, loc(3));
        let result = program(&mut ast, vec![iface], vec![], vec![new_missing, new_iface]);
        assert_eq!(result.diagnostics.len(), 2);
        for diag in &result.diagnostics {
            assert!(matches!(
                diag.kind,
                DiagnosticKind::IdentifierNotDeclared {
                    expected: LookupKind::Class,
                    ..
                }
            ));
        }
    }

    #[test]
    fn new_array_size_must_be_integer() {
        let mut ast = Ast::new();
        let size = ast.string_lit("ten", loc(2));
        let elem = ast.prim_type(PrimType::Double, loc(2));
        let alloc = ast.new_array(size, elem, loc(2));
        let result = program(&mut ast, vec![], vec![], vec![alloc]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::NewArraySizeNotInteger
        ));
        assert_eq!(ast.expr(alloc).ty(), Some(Type::array(Type::Double)));
    }

    #[test]
    fn fields_are_protected_outside_class_scope() {
        let mut ast = Ast::new();
        let field = prim_var(&mut ast, "v", 2, PrimType::Int);
        let class = ast.class_decl(ident("A", 1), None, vec![], vec![field]);
        let a = class_var(&mut ast, "a", 3, "A");
        let a_use = name_expr(&mut ast, "a", 4);
        let access = ast.field_access(Some(a_use), ident("v", 4));
        let result = program(&mut ast, vec![class], vec![a], vec![access]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::InaccessibleField { field, .. } if field == "v"
        ));
        // the declared type still comes through
        assert_eq!(ast.expr(access).ty(), Some(Type::Int));
    }

    #[test]
    fn this_field_access_inside_method() {
        let mut ast = Ast::new();
        let field = prim_var(&mut ast, "v", 2, PrimType::Int);
        let this = ast.this_expr(loc(3));
        let access = ast.field_access(Some(this), ident("v", 3));
        let one = ast.int_lit(1, loc(3));
        let store = ast.assign(access, one);
        let body = ast.block(vec![], vec![store], loc(3));
        let ret = ast.prim_type(PrimType::Void, loc(3));
        let method = ast.fn_decl(ident("bump", 3), ret, vec![], Some(body));
        let class = ast.class_decl(ident("A", 1), None, vec![], vec![field, method]);
        let result = program(&mut ast, vec![class], vec![], vec![]);
        assert!(result.success, "diagnostics: {:?}", result.diagnostics);
    }

    #[test]
    fn interface_typed_receiver_dispatches() {
        let mut ast = Ast::new();
        let sig_ret = ast.prim_type(PrimType::Int, loc(1));
        let sig = ast.fn_decl(ident("m", 1), sig_ret, vec![], None);
        let iface = ast.interface_decl(ident("I", 1), vec![sig]);
        let i = class_var(&mut ast, "i", 2, "I");

        let n = prim_var(&mut ast, "n", 3, PrimType::Int);
        let n_use = name_expr(&mut ast, "n", 4);
        let i_use = name_expr(&mut ast, "i", 4);
        let call = ast.call(Some(i_use), ident("m", 4), vec![], loc(4));
        let ok = ast.assign(n_use, call);

        let i_use2 = name_expr(&mut ast, "i", 5);
        let missing = ast.call(Some(i_use2), ident("q", 5), vec![], loc(5));

        let result = program(&mut ast, vec![iface], vec![i, n], vec![ok, missing]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::FieldNotFoundInBase { field, .. } if field == "q"
        ));
    }

    #[test]
    fn test_expressions_must_be_boolean() {
        let mut ast = Ast::new();
        let one = ast.int_lit(1, loc(2));
        let body = ast.block(vec![], vec![], loc(2));
        let bad_while = ast.while_stmt(one, body, loc(2));
        let result = program(&mut ast, vec![], vec![], vec![bad_while]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::TestNotBoolean
        ));
    }

    #[test]
    fn return_type_compatibility() {
        let mut ast = Ast::new();
        let truth = ast.bool_lit(true, loc(2));
        let bad_return = ast.return_stmt(truth, loc(2));
        let body = ast.block(vec![], vec![bad_return], loc(2));
        let ret = ast.prim_type(PrimType::Int, loc(1));
        let f = ast.fn_decl(ident("f", 1), ret, vec![], Some(body));
        ast.build_program(vec![f], loc(1));
        let result = Analyzer::new(&ast).analyze();
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::ReturnMismatch {
                given: Type::Bool,
                expected: Type::Int,
            }
        ));
    }

    #[test]
    fn void_function_returns_no_value() {
        let mut ast = Ast::new();
        let none = ast.empty_expr(loc(2));
        let bare = ast.return_stmt(none, loc(2));
        let one = ast.int_lit(1, loc(3));
        let with_value = ast.return_stmt(one, loc(3));
        let body = ast.block(vec![], vec![bare, with_value], loc(2));
        let ret = ast.prim_type(PrimType::Void, loc(1));
        let f = ast.fn_decl(ident("f", 1), ret, vec![], Some(body));
        ast.build_program(vec![f], loc(1));
        let result = Analyzer::new(&ast).analyze();
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::ReturnMismatch {
                given: Type::Int,
                expected: Type::Void,
            }
        ));
    }

    #[test]
    fn print_accepts_int_bool_string_only() {
        let mut ast = Ast::new();
        let n = ast.int_lit(3, loc(2));
        let half = ast.double_lit(0.5, loc(2));
        let text = ast.string_lit("hi", loc(2));
        let print = ast.print_stmt(vec![n, half, text], loc(2));
        let result = program(&mut ast, vec![], vec![], vec![print]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics[0].kind,
            DiagnosticKind::PrintArgMismatch {
                position: 2,
                given: Type::Double,
            }
        ));
    }

    #[test]
    fn undeclared_named_type_annotation() {
        let mut ast = Ast::new();
        let ghost = class_var(&mut ast, "g", 2, "Ghost");
        let result = program(&mut ast, vec![], vec![ghost], vec![]);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            &result.diagnostics[0].kind,
            DiagnosticKind::IdentifierNotDeclared {
                name,
                expected: LookupKind::Type,
            } if name == "Ghost"
        ));
    }
}
