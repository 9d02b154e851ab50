// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `@GuardedBy` rules.
//!
//! `guarded-by/unguarded-access` runs the held-lock analysis over every unit
//! and reports accesses whose required lock is not held.
//! `guarded-by/invalid` reports guard declarations that do not bind to a
//! lock; the analysis silently skips members carrying such guards.

use guardcheck_ast::decl::{Modifiers, MemberKind, GUARDED_BY};
use guardcheck_ast::expr::Expr;
use guardcheck_ast::Span;
use guardcheck_diagnostics::suggestions::did_you_mean;
use guardcheck_diagnostics::{Diagnostic, Severity};
use guardcheck_locks::{analyze, bind_string, BindContext, HeldLockSet, LockEventListener, LockExpr};
use guardcheck_resolve::{Resolution, SymbolId, SymbolKind, SymbolResolver};

use crate::rules::RuleContext;
use crate::units::ClassUnit;

pub const UNGUARDED_ACCESS: &str = "guarded-by/unguarded-access";
pub const INVALID: &str = "guarded-by/invalid";

// ============================================================================
// guarded-by/unguarded-access
// ============================================================================

pub fn check_unguarded_access(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let mut checker = GuardedByChecker::new(ctx.resolution);
    for unit in &ctx.units.bodies {
        analyze(*unit, ctx.resolution, &mut checker);
    }
    checker.into_diagnostics()
}

/// Listener turning guarded accesses without their lock into diagnostics.
pub struct GuardedByChecker<'a> {
    resolution: &'a Resolution,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> GuardedByChecker<'a> {
    pub fn new(resolution: &'a Resolution) -> Self {
        Self {
            resolution,
            diagnostics: Vec::new(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl LockEventListener for GuardedByChecker<'_> {
    fn handle_guarded_access(&mut self, access: &Expr, required: &LockExpr, held: &HeldLockSet) {
        if held.contains(required) {
            log::trace!("{} held at {:?}", required, access.span);
            return;
        }

        let member = self
            .resolution
            .resolution(access.id)
            .and_then(|id| self.resolution.symbol(id));
        let (verb, name) = match member {
            Some(symbol) if matches!(symbol.kind, SymbolKind::Method { .. }) => {
                ("call to", format!("{}()", symbol.name))
            }
            Some(symbol) => ("access to", symbol.name.clone()),
            None => ("access to", "member".to_string()),
        };

        let mut diag = Diagnostic::error(format!("{} `{}` requires holding `{}`", verb, name, required))
            .with_code(UNGUARDED_ACCESS)
            .with_primary(access.span, format!("`{}` is not held here", required));

        if let Some(symbol) = member {
            if !symbol.span.is_empty() {
                let guard = symbol.guard.as_deref().unwrap_or_default();
                diag = diag.with_secondary(symbol.span, format!("guarded by \"{}\"", guard));
            }
        }

        let held_note = if held.is_empty() {
            "no locks are held here".to_string()
        } else {
            format!("locks held here: {}", held)
        };
        self.diagnostics.push(
            diag.with_note(held_note)
                .with_help(format!("acquire `{}` before this {}", required, verb.trim_end_matches(" to"))),
        );
    }
}

// ============================================================================
// guarded-by/invalid
// ============================================================================

pub fn check_invalid_guards(ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let severity = if ctx.opts.unresolved_as_error {
        Severity::Error
    } else {
        Severity::Warning
    };
    let mut validator = GuardedByValidator {
        resolution: ctx.resolution,
        severity,
        diagnostics: Vec::new(),
    };
    for class in &ctx.units.classes {
        validator.check_class(class);
    }
    validator.diagnostics
}

/// Checks that every guard declaration binds to a lock expression.
struct GuardedByValidator<'a> {
    resolution: &'a Resolution,
    severity: Severity,
    diagnostics: Vec<Diagnostic>,
}

impl GuardedByValidator<'_> {
    fn check_class(&mut self, class: &ClassUnit<'_>) {
        for member in &class.decl.members {
            let (modifiers, node) = match &member.kind {
                // All declarators share the annotation; one report is enough.
                MemberKind::Field(field) => match field.declarators.first() {
                    Some(declarator) => (&field.modifiers, declarator.id),
                    None => continue,
                },
                MemberKind::Method(method) => (&method.modifiers, method.id),
                _ => continue,
            };
            let Some(guard) = modifiers.guarded_by() else {
                continue;
            };
            if self.resolution.resolution(node).is_none() {
                continue;
            }
            self.check_guard(guard, modifiers, class);
        }
    }

    fn check_guard(&mut self, guard: &str, modifiers: &Modifiers, class: &ClassUnit<'_>) {
        let ctx = BindContext::new(self.resolution, class.id);
        let err = match bind_string(guard, &ctx) {
            Ok(lock) => {
                log::trace!("guard \"{}\" binds to {}", guard, lock);
                return;
            }
            Err(err) => err,
        };

        let span = modifiers
            .annotations
            .iter()
            .find(|a| a.simple_name() == GUARDED_BY)
            .map(|a| a.span)
            .unwrap_or(Span::new(class.decl.span.start, class.decl.span.start));

        let class_name = self
            .resolution
            .symbol(class.id)
            .map(|s| s.name.as_str())
            .unwrap_or(&class.decl.name);
        let mut diag = Diagnostic::new(self.severity, format!("invalid @GuardedBy expression: `{}`", err.text))
            .with_code(INVALID)
            .with_primary(span, format!("does not name a lock visible from `{}`", class_name))
            .with_note("a guard is `this`, `Outer.this`, `Type.class`, or a chain of fields and no-argument methods");

        let name = guard.trim().strip_prefix("this.").unwrap_or(guard.trim());
        if is_identifier(name) {
            let fields = self.visible_fields(class.id);
            if let Some(help) = did_you_mean(name, fields.iter().map(String::as_str)) {
                diag = diag.with_help(help);
            }
        }
        self.diagnostics.push(diag);
    }

    /// Names of fields declared in `class` and its enclosing classes.
    fn visible_fields(&self, class: SymbolId) -> Vec<String> {
        let mut enclosing = vec![class];
        while let Some(outer) = enclosing.last().and_then(|&c| self.resolution.outer_class(c)) {
            enclosing.push(outer);
        }
        self.resolution
            .symbols
            .iter()
            .filter(|s| match s.kind {
                SymbolKind::Field { owner, .. } => enclosing.contains(&owner),
                _ => false,
            })
            .map(|s| s.name.clone())
            .collect()
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckOpts;
    use crate::units::collect_units;

    fn run(source: &str, opts: &CheckOpts, rule: fn(&RuleContext<'_>) -> Vec<Diagnostic>) -> Vec<Diagnostic> {
        let _ = env_logger::builder().is_test(true).try_init();
        let parsed = guardcheck_parser::parse_compilation_unit(source);
        assert!(parsed.is_ok(), "Parse errors: {:?}", parsed.errors);
        let resolution = guardcheck_resolve::resolve(&parsed.unit);
        let units = collect_units(&parsed.unit, &resolution);
        rule(&RuleContext {
            source,
            resolution: &resolution,
            units: &units,
            opts,
        })
    }

    #[test]
    fn reports_only_unheld_accesses() {
        let diags = run(
            r#"class Counter {
                   @GuardedBy("this") int count;
                   synchronized void inc() { count++; }
                   void racy() { count++; }
               }"#,
            &CheckOpts::default(),
            check_unguarded_access,
        );
        assert_eq!(diags.len(), 1);
        let diag = &diags[0];
        assert_eq!(diag.message, "access to `count` requires holding `this`");
        assert_eq!(diag.code.as_ref().unwrap().0, UNGUARDED_ACCESS);
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.notes, vec!["no locks are held here"]);
        assert_eq!(diag.help.as_ref().unwrap().message, "acquire `this` before this access");
    }

    #[test]
    fn calls_to_guarded_methods_are_reported() {
        let diags = run(
            r#"class Buffer {
                   final Object mu = new Object();
                   @GuardedBy("mu") void grow() { }
                   void caller() { synchronized (this) { grow(); } }
               }"#,
            &CheckOpts::default(),
            check_unguarded_access,
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "call to `grow()` requires holding `this.mu`");
        assert_eq!(diags[0].notes, vec!["locks held here: {this}"]);
    }

    #[test]
    fn invalid_guards_are_warnings_by_default() {
        let source = r#"class Broken {
                   final Object lock = new Object();
                   @GuardedBy("lokc") int a;
                   @GuardedBy("lock") int b;
                   @GuardedBy("lock + 1") void f() { }
               }"#;
        let diags = run(source, &CheckOpts::default(), check_invalid_guards);
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
        assert_eq!(diags[0].message, "invalid @GuardedBy expression: `lokc`");
        assert_eq!(diags[0].help.as_ref().unwrap().message, "did you mean `lock`?");
        assert!(diags[1].help.is_none());

        let strict = CheckOpts {
            unresolved_as_error: true,
            ..CheckOpts::default()
        };
        let diags = run(source, &strict, check_invalid_guards);
        assert!(diags.iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn guards_in_nested_classes_are_validated() {
        let diags = run(
            r#"class Outer {
                   final Object mu = new Object();
                   class Inner { @GuardedBy("mu") int ok; @GuardedBy("missing") int bad; }
                   void f() { new Object() { @GuardedBy("Outer.this") int fine; }; }
               }"#,
            &CheckOpts::default(),
            check_invalid_guards,
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "invalid @GuardedBy expression: `missing`");
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("mu"));
        assert!(is_identifier("_lock$2"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier(""));
    }
}
