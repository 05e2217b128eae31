//! Pretty printing for AST nodes
//!
//! Renders arena nodes back to readable Mocha source. Handy in tests and
//! when dumping a tree next to its diagnostics.

use std::fmt::{self, Display, Formatter};

use super::{Ast, Decl, DeclKind, Expr, ExprKind, Ident, NodeId, NodeKind, Stmt, TypeKind};

/// Displayable view of one node in an [`Ast`]
///
/// ```
/// use mocha_core::ast::{Ast, Ident, Pretty, PrimType};
/// use mocha_core::location::Location;
///
/// let mut ast = Ast::new();
/// let ty = ast.prim_type(PrimType::Int, Location::span(1, 1, 4));
/// let var = ast.var_decl(Ident::new("x", Location::span(1, 5, 6)), ty);
/// assert_eq!(Pretty::new(&ast, var).to_string(), "int x;");
/// ```
pub struct Pretty<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl<'a> Pretty<'a> {
    /// Create a pretty-printing view of `id`
    #[must_use]
    pub fn new(ast: &'a Ast, id: NodeId) -> Self {
        Self { ast, id }
    }

    fn write_node(&self, f: &mut Formatter<'_>, id: NodeId, indent: usize) -> fmt::Result {
        match self.ast.node(id).kind() {
            NodeKind::Program(program) => {
                for (i, &decl) in program.decls.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    self.write_node(f, decl, indent)?;
                }
                Ok(())
            }
            NodeKind::Decl(decl) => self.write_decl(f, decl, indent),
            NodeKind::Stmt(stmt) => self.write_stmt(f, stmt, indent),
            NodeKind::Expr(expr) => self.write_expr(f, expr),
            NodeKind::Type(_) => self.write_type(f, id),
        }
    }

    fn write_decl(&self, f: &mut Formatter<'_>, decl: &Decl, indent: usize) -> fmt::Result {
        match &decl.kind {
            DeclKind::Var(var) => {
                self.write_type(f, var.ty)?;
                write!(f, " {};", decl.name)
            }
            DeclKind::Fn(fun) => {
                self.write_type(f, fun.return_ty)?;
                write!(f, " {}(", decl.name)?;
                for (i, &formal) in fun.formals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let formal = self.ast.decl(formal);
                    let var = formal.as_var().expect("formal must be a variable");
                    self.write_type(f, var.ty)?;
                    write!(f, " {}", formal.name)?;
                }
                write!(f, ")")?;
                match fun.body {
                    Some(body) => {
                        write!(f, " ")?;
                        self.write_node(f, body, indent)
                    }
                    None => write!(f, ";"),
                }
            }
            DeclKind::Class(class) => {
                write!(f, "class {}", decl.name)?;
                if let Some(extends) = class.extends {
                    write!(f, " extends ")?;
                    self.write_type(f, extends)?;
                }
                for (i, &imp) in class.implements.iter().enumerate() {
                    write!(f, "{}", if i == 0 { " implements " } else { ", " })?;
                    self.write_type(f, imp)?;
                }
                writeln!(f, " {{")?;
                for &member in &class.members {
                    self.write_indent(f, indent + 1)?;
                    self.write_node(f, member, indent + 1)?;
                    writeln!(f)?;
                }
                self.write_indent(f, indent)?;
                write!(f, "}}")
            }
            DeclKind::Interface(interface) => {
                writeln!(f, "interface {} {{", decl.name)?;
                for &member in &interface.members {
                    self.write_indent(f, indent + 1)?;
                    self.write_node(f, member, indent + 1)?;
                    writeln!(f)?;
                }
                self.write_indent(f, indent)?;
                write!(f, "}}")
            }
        }
    }

    fn write_stmt(&self, f: &mut Formatter<'_>, stmt: &Stmt, indent: usize) -> fmt::Result {
        match stmt {
            Stmt::Block { decls, stmts, .. } => {
                writeln!(f, "{{")?;
                for &decl in decls {
                    self.write_indent(f, indent + 1)?;
                    self.write_node(f, decl, indent + 1)?;
                    writeln!(f)?;
                }
                for &stmt in stmts {
                    self.write_indent(f, indent + 1)?;
                    self.write_node(f, stmt, indent + 1)?;
                    if matches!(self.ast.node(stmt).kind(), NodeKind::Expr(_)) {
                        write!(f, ";")?;
                    }
                    writeln!(f)?;
                }
                self.write_indent(f, indent)?;
                write!(f, "}}")
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                write!(f, "if (")?;
                self.write_node(f, *cond, indent)?;
                write!(f, ") ")?;
                self.write_node(f, *then_body, indent)?;
                if let Some(else_body) = else_body {
                    write!(f, " else ")?;
                    self.write_node(f, *else_body, indent)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                write!(f, "while (")?;
                self.write_node(f, *cond, indent)?;
                write!(f, ") ")?;
                self.write_node(f, *body, indent)
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                write!(f, "for (")?;
                self.write_node(f, *init, indent)?;
                write!(f, "; ")?;
                self.write_node(f, *cond, indent)?;
                write!(f, "; ")?;
                self.write_node(f, *step, indent)?;
                write!(f, ") ")?;
                self.write_node(f, *body, indent)
            }
            Stmt::Return { value } => {
                if matches!(&self.ast.expr(*value).kind, ExprKind::Empty) {
                    write!(f, "return;")
                } else {
                    write!(f, "return ")?;
                    self.write_node(f, *value, indent)?;
                    write!(f, ";")
                }
            }
            Stmt::Break => write!(f, "break;"),
            Stmt::Print { args } => {
                write!(f, "Print(")?;
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.write_node(f, arg, indent)?;
                }
                write!(f, ");")
            }
        }
    }

    fn write_expr(&self, f: &mut Formatter<'_>, expr: &Expr) -> fmt::Result {
        match &expr.kind {
            ExprKind::IntLit(value) => write!(f, "{value}"),
            ExprKind::DoubleLit(value) => {
                if value.fract() == 0.0 {
                    write!(f, "{value}.0")
                } else {
                    write!(f, "{value}")
                }
            }
            ExprKind::BoolLit(value) => write!(f, "{value}"),
            ExprKind::StringLit(value) => write!(f, "\"{value}\""),
            ExprKind::NullLit => write!(f, "null"),
            ExprKind::This => write!(f, "this"),
            ExprKind::Empty => Ok(()),
            ExprKind::ReadInteger => write!(f, "ReadInteger()"),
            ExprKind::ReadLine => write!(f, "ReadLine()"),
            ExprKind::FieldAccess { base, field } => {
                if let Some(base) = base {
                    self.write_node(f, *base, 0)?;
                    write!(f, ".")?;
                }
                write!(f, "{field}")
            }
            ExprKind::Call {
                base,
                field,
                actuals,
            } => {
                if let Some(base) = base {
                    self.write_node(f, *base, 0)?;
                    write!(f, ".")?;
                }
                write!(f, "{field}(")?;
                for (i, &actual) in actuals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.write_node(f, actual, 0)?;
                }
                write!(f, ")")
            }
            ExprKind::ArrayAccess { base, subscript } => {
                self.write_node(f, *base, 0)?;
                write!(f, "[")?;
                self.write_node(f, *subscript, 0)?;
                write!(f, "]")
            }
            ExprKind::Arithmetic { left, op, right } => {
                self.write_compound(f, *left, op.as_str(), *right)
            }
            ExprKind::Relational { left, op, right } => {
                self.write_compound(f, Some(*left), op.as_str(), *right)
            }
            ExprKind::Equality { left, op, right } => {
                self.write_compound(f, Some(*left), op.as_str(), *right)
            }
            ExprKind::Logical { left, op, right } => {
                self.write_compound(f, *left, op.as_str(), *right)
            }
            ExprKind::Assign { left, right } => {
                self.write_node(f, *left, 0)?;
                write!(f, " = ")?;
                self.write_node(f, *right, 0)
            }
            ExprKind::New { class } => {
                write!(f, "new ")?;
                self.write_type(f, *class)
            }
            ExprKind::NewArray { size, element } => {
                write!(f, "NewArray(")?;
                self.write_node(f, *size, 0)?;
                write!(f, ", ")?;
                self.write_type(f, *element)?;
                write!(f, ")")
            }
        }
    }

    fn write_compound(
        &self,
        f: &mut Formatter<'_>,
        left: Option<NodeId>,
        op: &str,
        right: NodeId,
    ) -> fmt::Result {
        match left {
            Some(left) => {
                write!(f, "(")?;
                self.write_node(f, left, 0)?;
                write!(f, " {op} ")?;
                self.write_node(f, right, 0)?;
                write!(f, ")")
            }
            None => {
                write!(f, "{op}")?;
                self.write_node(f, right, 0)
            }
        }
    }

    fn write_type(&self, f: &mut Formatter<'_>, id: NodeId) -> fmt::Result {
        match &self.ast.type_annotation(id).kind {
            TypeKind::Prim(prim) => write!(f, "{}", prim.as_str()),
            TypeKind::Named(ident) => write!(f, "{ident}"),
            TypeKind::Array(element) => {
                self.write_type(f, *element)?;
                write!(f, "[]")
            }
        }
    }

    fn write_indent(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        for _ in 0..indent {
            write!(f, "  ")?;
        }
        Ok(())
    }
}

impl Display for Pretty<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.id, 0)
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArithOp, PrimType};
    use crate::location::Location;

    fn loc() -> Location {
        Location::span(1, 1, 2)
    }

    #[test]
    fn renders_expressions_source_like() {
        let mut ast = Ast::new();
        let one = ast.int_lit(1, loc());
        let two = ast.int_lit(2, loc());
        let sum = ast.arithmetic(Some(one), ArithOp::Add, two);
        let name = ast.field_access(None, Ident::new("total", loc()));
        let assign = ast.assign(name, sum);
        assert_eq!(Pretty::new(&ast, assign).to_string(), "total = (1 + 2)");
    }

    #[test]
    fn renders_class_with_heritage() {
        let mut ast = Ast::new();
        let base = ast.named_type(Ident::new("Shape", loc()));
        let iface = ast.named_type(Ident::new("Printable", loc()));
        let field_ty = ast.prim_type(PrimType::Double, loc());
        let field = ast.var_decl(Ident::new("area", loc()), field_ty);
        let class = ast.class_decl(
            Ident::new("Circle", loc()),
            Some(base),
            vec![iface],
            vec![field],
        );
        assert_eq!(
            Pretty::new(&ast, class).to_string(),
            "class Circle extends Shape implements Printable {\n  double area;\n}"
        );
    }

    #[test]
    fn renders_array_types_with_suffix() {
        let mut ast = Ast::new();
        let elem = ast.prim_type(PrimType::Int, loc());
        let arr = ast.array_type(elem, loc());
        let var = ast.var_decl(Ident::new("xs", loc()), arr);
        assert_eq!(Pretty::new(&ast, var).to_string(), "int[] xs;");
    }
}
