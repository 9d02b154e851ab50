// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration AST nodes.

use crate::expr::{Expr, ExprKind};
use crate::stmt::{Stmt, VarDeclarator};
use crate::{NodeId, Span};

/// Simple name of the annotation carrying a guard declaration.
///
/// Matches `javax.annotation.concurrent.GuardedBy`,
/// `net.jcip.annotations.GuardedBy` and friends by their last segment.
pub const GUARDED_BY: &str = "GuardedBy";

/// A parsed source file.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<ClassDecl>,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
    pub span: Span,
}

/// A class, interface, enum or anonymous class body.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    /// Body of `new T(...) { ... }`; `superclass` names `T`.
    Anonymous,
}

/// A member of a class body.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: NodeId,
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum MemberKind {
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer(Initializer),
    Class(ClassDecl),
    EnumConstant(EnumConstant),
}

/// A field declaration, possibly declaring several variables.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: String,
    pub declarators: Vec<VarDeclarator>,
}

/// A method or constructor.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: String,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    /// `None` for constructors, `Some("void")` for void methods.
    pub ret_ty: Option<String>,
    pub params: Vec<Param>,
    pub throws: Vec<String>,
    /// `None` for abstract/interface/native methods.
    pub body: Option<Vec<Stmt>>,
    pub span: Span,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.ret_ty.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub id: NodeId,
    pub name: String,
    pub ty: String,
    pub modifiers: Modifiers,
    pub is_varargs: bool,
    pub span: Span,
}

/// An instance (`{ ... }`) or static (`static { ... }`) initializer block.
#[derive(Debug, Clone)]
pub struct Initializer {
    pub is_static: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct EnumConstant {
    pub name: String,
    pub args: Vec<Expr>,
    pub body: Option<Box<ClassDecl>>,
}

/// Modifier keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Synchronized,
    Volatile,
    Transient,
    Native,
    Strictfp,
    Default,
}

/// Modifier keywords and annotations attached to a declaration.
#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    pub keywords: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.keywords.contains(&modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has(Modifier::Static)
    }

    pub fn is_synchronized(&self) -> bool {
        self.has(Modifier::Synchronized)
    }

    /// Raw guard string of a `@GuardedBy` annotation, if present.
    pub fn guarded_by(&self) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.simple_name() == GUARDED_BY)
            .and_then(|a| a.value())
    }
}

/// An annotation use (`@GuardedBy("mu")`).
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Name as written, possibly qualified.
    pub name: String,
    pub args: Vec<AnnotationArg>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct AnnotationArg {
    /// `None` for the single-element shorthand `@A("x")`.
    pub name: Option<String>,
    pub value: Expr,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// String value of the `value` element.
    pub fn value(&self) -> Option<&str> {
        let arg = self
            .args
            .iter()
            .find(|a| a.name.as_deref().map_or(true, |n| n == "value"))?;
        match &arg.value.kind {
            ExprKind::String(s) => Some(s),
            _ => None,
        }
    }
}
