// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::decl::ClassDecl;
use crate::expr::Expr;
use crate::{NodeId, Span};

/// A statement in the AST.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Expression statement
    Expr(Expr),
    /// Local variable declaration (`int a = 1, b;`)
    Local {
        ty: String,
        declarators: Vec<VarDeclarator>,
    },
    /// Nested block
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    /// Classic three-part for loop
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    /// Enhanced for loop (`for (T x : iter)`)
    ForEach {
        ty: String,
        name: String,
        iter: Expr,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Throw(Expr),
    Break(Option<String>),
    Continue(Option<String>),
    Try(TryStmt),
    /// `synchronized (lock) { body }`
    Synchronized {
        lock: Expr,
        body: Vec<Stmt>,
    },
    Switch {
        selector: Expr,
        cases: Vec<SwitchCase>,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    /// Class declared inside a method body
    LocalClass(ClassDecl),
    Assert {
        cond: Expr,
        message: Option<Expr>,
    },
    /// Lone `;`
    Empty,
}

/// A single variable in a field or local declaration.
#[derive(Debug, Clone)]
pub struct VarDeclarator {
    pub id: NodeId,
    pub name: String,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `try` statement, with or without resources.
#[derive(Debug, Clone)]
pub struct TryStmt {
    pub resources: Vec<Resource>,
    pub body: Vec<Stmt>,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Vec<Stmt>>,
}

/// A try-with-resources resource: either a declaration or an existing variable.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: NodeId,
    pub ty: Option<String>,
    pub name: Option<String>,
    pub init: Expr,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub id: NodeId,
    /// Alternatives of a multi-catch (`catch (A | B e)`).
    pub types: Vec<String>,
    pub name: String,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// Empty for `default:`.
    pub labels: Vec<Expr>,
    pub is_default: bool,
    pub body: Vec<Stmt>,
}
