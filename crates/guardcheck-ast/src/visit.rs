// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Read-only traversal of statement and expression trees.
//!
//! Implementors override the hooks they care about and call the matching
//! `walk_*` function to continue into the children. Local and anonymous
//! class bodies are handed to [`Visitor::visit_class`] and lambda bodies to
//! [`Visitor::visit_lambda`]; neither is entered unless the implementor
//! does so.

use crate::decl::ClassDecl;
use crate::expr::{Expr, ExprKind, LambdaBody};
use crate::stmt::{Stmt, StmtKind, TryStmt};

pub trait Visitor<'a> {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'a Expr) {
        walk_expr(self, expr);
    }

    fn visit_class(&mut self, _class: &'a ClassDecl) {}

    fn visit_lambda(&mut self, _body: &'a LambdaBody) {}
}

pub fn walk_stmts<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, stmts: &'a [Stmt]) {
    for stmt in stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, stmt: &'a Stmt) {
    match &stmt.kind {
        StmtKind::Expr(expr) | StmtKind::Throw(expr) => visitor.visit_expr(expr),
        StmtKind::Local { declarators, .. } => {
            for init in declarators.iter().filter_map(|d| d.init.as_ref()) {
                visitor.visit_expr(init);
            }
        }
        StmtKind::Block(stmts) => walk_stmts(visitor, stmts),
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(body);
        }
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => {
            walk_stmts(visitor, init);
            if let Some(cond) = cond {
                visitor.visit_expr(cond);
            }
            for expr in update {
                visitor.visit_expr(expr);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::ForEach { iter, body, .. } => {
            visitor.visit_expr(iter);
            visitor.visit_stmt(body);
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        StmtKind::Try(try_stmt) => walk_try(visitor, try_stmt),
        StmtKind::Synchronized { lock, body } => {
            visitor.visit_expr(lock);
            walk_stmts(visitor, body);
        }
        StmtKind::Switch { selector, cases } => {
            visitor.visit_expr(selector);
            for case in cases {
                walk_stmts(visitor, &case.body);
            }
        }
        StmtKind::Labeled { body, .. } => visitor.visit_stmt(body),
        StmtKind::Assert { cond, message } => {
            visitor.visit_expr(cond);
            if let Some(message) = message {
                visitor.visit_expr(message);
            }
        }
        StmtKind::LocalClass(decl) => visitor.visit_class(decl),
        StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => {}
    }
}

/// Resources, then the body, the handlers and `finally`, in source order.
pub fn walk_try<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, try_stmt: &'a TryStmt) {
    for resource in &try_stmt.resources {
        visitor.visit_expr(&resource.init);
    }
    walk_stmts(visitor, &try_stmt.body);
    for catch in &try_stmt.catches {
        walk_stmts(visitor, &catch.body);
    }
    if let Some(finally) = &try_stmt.finally {
        walk_stmts(visitor, finally);
    }
}

pub fn walk_expr<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, expr: &'a Expr) {
    match &expr.kind {
        ExprKind::Select { object, .. } => visitor.visit_expr(object),
        ExprKind::Call { receiver, args, .. } => {
            if let Some(receiver) = receiver {
                visitor.visit_expr(receiver);
            }
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::New { args, body, .. } => {
            for arg in args {
                visitor.visit_expr(arg);
            }
            if let Some(body) = body {
                visitor.visit_class(body);
            }
        }
        ExprKind::Lambda { body, .. } => visitor.visit_lambda(body),
        ExprKind::NewArray { dims, init, .. } => {
            for expr in dims.iter().chain(init.iter().flatten()) {
                visitor.visit_expr(expr);
            }
        }
        ExprKind::ArrayInit(items) => {
            for item in items {
                visitor.visit_expr(item);
            }
        }
        ExprKind::Index { object, index } => {
            visitor.visit_expr(object);
            visitor.visit_expr(index);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Assign { target, value, .. } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_expr(then_expr);
            visitor.visit_expr(else_expr);
        }
        ExprKind::InstanceOf { expr, .. } | ExprKind::Cast { expr, .. } => visitor.visit_expr(expr),
        ExprKind::MethodRef { target, .. } => visitor.visit_expr(target),
        ExprKind::Paren(inner) => visitor.visit_expr(inner),
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::String(_)
        | ExprKind::Char(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Ident(_)
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::QualifiedThis(_)
        | ExprKind::ClassLit(_) => {}
    }
}

pub fn walk_lambda<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, body: &'a LambdaBody) {
    match body {
        LambdaBody::Expr(expr) => visitor.visit_expr(expr),
        LambdaBody::Block(stmts) => walk_stmts(visitor, stmts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{ClassKind, Modifiers};
    use crate::stmt::VarDeclarator;
    use crate::{NodeId, Span};

    fn expr(kind: ExprKind) -> Expr {
        Expr {
            id: NodeId::DUMMY,
            kind,
            span: Span::new(0, 0),
        }
    }

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt {
            id: NodeId::DUMMY,
            kind,
            span: Span::new(0, 0),
        }
    }

    fn ident(name: &str) -> Expr {
        expr(ExprKind::Ident(name.to_string()))
    }

    #[derive(Default)]
    struct Names {
        idents: Vec<String>,
        classes: usize,
        lambdas: usize,
    }

    impl<'a> Visitor<'a> for Names {
        fn visit_expr(&mut self, expr: &'a Expr) {
            if let ExprKind::Ident(name) = &expr.kind {
                self.idents.push(name.clone());
            }
            walk_expr(self, expr);
        }

        fn visit_class(&mut self, _class: &'a ClassDecl) {
            self.classes += 1;
        }

        fn visit_lambda(&mut self, _body: &'a LambdaBody) {
            self.lambdas += 1;
        }
    }

    #[test]
    fn visits_children_in_source_order_without_entering_nested_bodies() {
        let anonymous = ClassDecl {
            id: NodeId::DUMMY,
            name: String::new(),
            kind: ClassKind::Anonymous,
            modifiers: Modifiers::default(),
            type_params: Vec::new(),
            superclass: Some("Runnable".to_string()),
            interfaces: Vec::new(),
            members: Vec::new(),
            span: Span::new(0, 0),
        };
        let body = vec![
            stmt(StmtKind::Local {
                ty: "int".to_string(),
                declarators: vec![VarDeclarator {
                    id: NodeId::DUMMY,
                    name: "x".to_string(),
                    init: Some(expr(ExprKind::Binary {
                        op: crate::expr::BinOp::Add,
                        left: Box::new(ident("a")),
                        right: Box::new(ident("b")),
                    })),
                    span: Span::new(0, 0),
                }],
            }),
            stmt(StmtKind::Synchronized {
                lock: ident("mu"),
                body: vec![stmt(StmtKind::Expr(expr(ExprKind::Call {
                    receiver: Some(Box::new(ident("c"))),
                    method: "run".to_string(),
                    args: vec![
                        ident("d"),
                        expr(ExprKind::Lambda {
                            params: Vec::new(),
                            body: LambdaBody::Expr(Box::new(ident("hidden"))),
                        }),
                    ],
                })))],
            }),
            stmt(StmtKind::Expr(expr(ExprKind::New {
                class: "Runnable".to_string(),
                args: vec![ident("e")],
                body: Some(Box::new(anonymous)),
            }))),
        ];

        let mut names = Names::default();
        walk_stmts(&mut names, &body);
        assert_eq!(names.idents, vec!["a", "b", "mu", "c", "d", "e"]);
        assert_eq!(names.classes, 1);
        assert_eq!(names.lambdas, 1);
    }
}
