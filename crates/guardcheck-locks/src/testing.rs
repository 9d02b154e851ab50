// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shared fixtures for unit tests.

use guardcheck_ast::decl::{ClassDecl, CompilationUnit, MemberKind, MethodDecl};
use guardcheck_ast::expr::Expr;
use guardcheck_ast::stmt::StmtKind;
use guardcheck_resolve::{Resolution, SymbolId};

use crate::binder::BindContext;

pub struct Fixture {
    pub unit: CompilationUnit,
    pub res: Resolution,
}

pub fn fixture(src: &str) -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();
    let parsed = guardcheck_parser::parse_compilation_unit(src);
    assert!(parsed.is_ok(), "Parse errors: {:?}", parsed.errors);
    let res = guardcheck_resolve::resolve(&parsed.unit);
    assert!(res.errors.is_empty(), "Resolve errors: {:?}", res.errors);
    Fixture {
        unit: parsed.unit,
        res,
    }
}

fn find_class<'a>(classes: &'a [ClassDecl], name: &str) -> Option<&'a ClassDecl> {
    classes.iter().find_map(|class| {
        if class.name == name {
            return Some(class);
        }
        class.members.iter().find_map(|member| match &member.kind {
            MemberKind::Class(nested) => find_class(std::slice::from_ref(nested), name),
            _ => None,
        })
    })
}

impl Fixture {
    /// A class by simple name, nested classes included.
    pub fn class(&self, name: &str) -> SymbolId {
        let decl = find_class(&self.unit.types, name).unwrap_or_else(|| panic!("no class {}", name));
        self.res.resolutions[&decl.id]
    }

    pub fn ctx(&self, class: SymbolId) -> BindContext<'_> {
        BindContext::new(&self.res, class)
    }

    pub fn method(&self, class: &str, name: &str) -> (&MethodDecl, SymbolId) {
        let decl = find_class(&self.unit.types, class).unwrap_or_else(|| panic!("no class {}", class));
        let method = decl
            .members
            .iter()
            .find_map(|member| match &member.kind {
                MemberKind::Method(method) if method.name == name => Some(method),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no method {}.{}", class, name));
        (method, self.res.resolutions[&decl.id])
    }
}

/// Expressions of the top-level expression statements in a method body.
pub fn expr_stmts(method: &MethodDecl) -> Vec<&Expr> {
    method
        .body
        .iter()
        .flatten()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Expr(expr) => Some(expr),
            _ => None,
        })
        .collect()
}
