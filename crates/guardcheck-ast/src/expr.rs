// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::decl::ClassDecl;
use crate::stmt::Stmt;
use crate::{NodeId, Span};

/// An expression in the AST.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// String literal
    String(String),
    /// Character literal
    Char(char),
    /// Boolean literal
    Bool(bool),
    /// `null`
    Null,
    /// Bare identifier
    Ident(String),
    /// `this`
    This,
    /// `super`
    Super,
    /// Qualified this (`Outer.this`), holding the qualifier as written
    QualifiedThis(String),
    /// Class literal (`Foo.class`), holding the type as written
    ClassLit(String),
    /// Member select (`object.name`)
    Select {
        object: Box<Expr>,
        name: String,
    },
    /// Method invocation, with an explicit receiver or an implicit one
    Call {
        receiver: Option<Box<Expr>>,
        method: String,
        args: Vec<Expr>,
    },
    /// Instance creation, optionally with an anonymous class body
    New {
        class: String,
        args: Vec<Expr>,
        body: Option<Box<ClassDecl>>,
    },
    /// Array creation (`new int[n]`, `new String[] { ... }`)
    NewArray {
        elem: String,
        dims: Vec<Expr>,
        init: Option<Vec<Expr>>,
    },
    /// Bare array initializer (`{1, 2}` in a declaration)
    ArrayInit(Vec<Expr>),
    /// Index access
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Unary operation (prefix or postfix)
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Binary operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Assignment; `op` is set for compound assignment (`+=`)
    Assign {
        op: Option<BinOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Ternary conditional
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// `expr instanceof Type`
    InstanceOf {
        expr: Box<Expr>,
        ty: String,
    },
    /// `(Type) expr`
    Cast {
        ty: String,
        expr: Box<Expr>,
    },
    /// Lambda expression
    Lambda {
        params: Vec<String>,
        body: LambdaBody,
    },
    /// Method reference (`Foo::bar`)
    MethodRef {
        target: Box<Expr>,
        name: String,
    },
    /// Parenthesized expression
    Paren(Box<Expr>),
}

/// Body of a lambda expression.
#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
        }
    }
}

impl Expr {
    /// Strip any number of enclosing parentheses.
    pub fn peel_parens(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }

    /// The dotted name this expression spells, if it is a plain
    /// identifier chain (`a`, `a.b.c`).
    pub fn dotted_name(&self) -> Option<String> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name.clone()),
            ExprKind::Select { object, name } => {
                let base = object.dotted_name()?;
                Some(format!("{}.{}", base, name))
            }
            _ => None,
        }
    }
}
