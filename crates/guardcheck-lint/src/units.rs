// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Discovery of analysis units.
//!
//! Every method, constructor, initializer block and lambda body is analyzed
//! on its own, including those inside member, local and anonymous classes.

use guardcheck_ast::decl::{ClassDecl, CompilationUnit, MemberKind};
use guardcheck_ast::expr::LambdaBody;
use guardcheck_ast::visit::{walk_lambda, walk_stmts, Visitor};
use guardcheck_locks::AnalysisUnit;
use guardcheck_resolve::{Resolution, SymbolId};

/// A class body together with its symbol.
#[derive(Debug, Clone, Copy)]
pub struct ClassUnit<'a> {
    pub decl: &'a ClassDecl,
    pub id: SymbolId,
}

/// Everything the rules iterate over.
#[derive(Debug, Default)]
pub struct Units<'a> {
    pub classes: Vec<ClassUnit<'a>>,
    pub bodies: Vec<AnalysisUnit<'a>>,
}

/// Collect every class and analysis unit in `unit`, outer before inner.
pub fn collect_units<'a>(unit: &'a CompilationUnit, resolution: &Resolution) -> Units<'a> {
    let mut collector = UnitCollector {
        resolution,
        class: None,
        units: Units::default(),
    };
    for class in &unit.types {
        collector.walk_class(class);
    }
    log::debug!(
        "found {} classes and {} analysis units",
        collector.units.classes.len(),
        collector.units.bodies.len()
    );
    collector.units
}

struct UnitCollector<'r, 'a> {
    resolution: &'r Resolution,
    /// Innermost class being walked.
    class: Option<SymbolId>,
    units: Units<'a>,
}

impl<'a> UnitCollector<'_, 'a> {
    fn walk_class(&mut self, decl: &'a ClassDecl) {
        let Some(&id) = self.resolution.resolutions.get(&decl.id) else {
            log::debug!("class {} has no symbol, skipping", decl.name);
            return;
        };
        self.units.classes.push(ClassUnit { decl, id });
        let outer = self.class.replace(id);

        for member in &decl.members {
            match &member.kind {
                MemberKind::Field(field) => {
                    for init in field.declarators.iter().filter_map(|d| d.init.as_ref()) {
                        self.visit_expr(init);
                    }
                }
                MemberKind::Method(method) => {
                    self.units.bodies.push(AnalysisUnit::Method { decl: method, class: id });
                    if let Some(body) = &method.body {
                        walk_stmts(self, body);
                    }
                }
                MemberKind::Initializer(init) => {
                    self.units.bodies.push(AnalysisUnit::Initializer {
                        body: &init.body,
                        class: id,
                    });
                    walk_stmts(self, &init.body);
                }
                MemberKind::Class(nested) => self.walk_class(nested),
                MemberKind::EnumConstant(constant) => {
                    for arg in &constant.args {
                        self.visit_expr(arg);
                    }
                    if let Some(body) = &constant.body {
                        self.walk_class(body);
                    }
                }
            }
        }

        self.class = outer;
    }
}

impl<'a> Visitor<'a> for UnitCollector<'_, 'a> {
    fn visit_class(&mut self, class: &'a ClassDecl) {
        self.walk_class(class);
    }

    // `this` inside a lambda is the enclosing instance.
    fn visit_lambda(&mut self, body: &'a LambdaBody) {
        if let Some(class) = self.class {
            self.units.bodies.push(AnalysisUnit::Lambda { body, class });
        }
        walk_lambda(self, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(source: &str) -> (Vec<String>, Vec<String>) {
        let parsed = guardcheck_parser::parse_compilation_unit(source);
        assert!(parsed.is_ok(), "Parse errors: {:?}", parsed.errors);
        let res = guardcheck_resolve::resolve(&parsed.unit);
        let units = collect_units(&parsed.unit, &res);
        let name = |id: SymbolId| res.symbols.get(id).map(|s| s.name.clone()).unwrap_or_default();

        let classes = units.classes.iter().map(|c| name(c.id)).collect();
        let bodies = units
            .bodies
            .iter()
            .map(|unit| match unit {
                AnalysisUnit::Method { decl, class } => format!("{}.{}", name(*class), decl.name),
                AnalysisUnit::Initializer { class, .. } => format!("{}.<init>", name(*class)),
                AnalysisUnit::Lambda { class, .. } => format!("{}.<lambda>", name(*class)),
            })
            .collect();
        (classes, bodies)
    }

    #[test]
    fn finds_methods_initializers_and_member_classes() {
        let (classes, bodies) = describe(
            r#"class A {
                   static { }
                   A() { }
                   void f() { }
                   static class B { void g() { } }
                   enum E { X { void h() { } }; void k() { } }
               }"#,
        );
        assert_eq!(classes, vec!["A", "B", "E", "E$1"]);
        assert_eq!(
            bodies,
            vec!["A.<init>", "A.A", "A.f", "B.g", "E$1.h", "E.k"]
        );
    }

    #[test]
    fn finds_local_anonymous_and_lambda_bodies() {
        let (classes, bodies) = describe(
            r#"class A {
                   Runnable field = () -> { };
                   void f() {
                       class L { void g() { } }
                       Runnable r = new Runnable() {
                           public void run() { Runnable inner = () -> { }; }
                       };
                   }
               }"#,
        );
        assert_eq!(classes, vec!["A", "L", "A$2"]);
        assert_eq!(
            bodies,
            vec!["A.<lambda>", "A.f", "L.g", "A$2.run", "A$2.<lambda>"]
        );
    }
}
