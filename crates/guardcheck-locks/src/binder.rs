// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Binding guard strings and expressions to lock expressions.
//!
//! Guard strings are parsed with the expression parser and their names are
//! looked up from the class declaring the guarded member. Source
//! expressions use the resolver's per-node resolutions instead.

use guardcheck_ast::expr::{Expr, ExprKind};
use guardcheck_resolve::{Symbol, SymbolId, SymbolKind, SymbolResolver};

use crate::error::IllegalGuardedBy;
use crate::lock_expr::{LockExpr, LockSym};

/// Where names are resolved while binding.
#[derive(Clone, Copy)]
pub struct BindContext<'a> {
    pub resolver: &'a dyn SymbolResolver,
    /// Innermost class whose code is being bound; `this` refers to it.
    pub class: SymbolId,
}

/// A partially bound expression: a lock value, or a type qualifier.
enum Bound {
    Lock(LockExpr),
    Type(SymbolId),
}

impl<'a> BindContext<'a> {
    pub fn new(resolver: &'a dyn SymbolResolver, class: SymbolId) -> Self {
        Self { resolver, class }
    }

    /// The same resolver, seen from another class.
    pub fn with_class(self, class: SymbolId) -> Self {
        Self { class, ..self }
    }

    /// Context for binding the guard declared on `member`.
    pub fn for_member(self, member: &Symbol) -> Option<Self> {
        member.owner().map(|owner| self.with_class(owner))
    }

    fn symbol(&self, id: SymbolId) -> Result<&'a Symbol, IllegalGuardedBy> {
        self.resolver
            .symbol(id)
            .ok_or_else(|| IllegalGuardedBy::new(format!("unknown symbol {}", id.0)))
    }

    fn lock_sym(&self, id: SymbolId) -> Result<LockSym, IllegalGuardedBy> {
        self.symbol(id).map(LockSym::from_symbol)
    }

    /// `self.class` followed by its lexically enclosing classes.
    fn enclosing_classes(&self) -> Vec<SymbolId> {
        let mut classes = vec![self.class];
        let mut current = self.class;
        while let Some(outer) = self.resolver.outer_class(current) {
            if classes.contains(&outer) {
                break;
            }
            classes.push(outer);
            current = outer;
        }
        classes
    }

    /// `C.this` as seen from the context class.
    fn enclosing_instance(&self, class: SymbolId) -> Result<LockExpr, IllegalGuardedBy> {
        if class == self.class {
            return Ok(LockExpr::This);
        }
        if self.enclosing_classes().contains(&class) {
            return Ok(LockExpr::Outer(self.lock_sym(class)?));
        }
        let name = self.symbol(class)?.name.clone();
        Err(IllegalGuardedBy::new(format!("{}.this", name)))
    }

    /// The receiver a bare member name refers to: the innermost enclosing
    /// class that declares or inherits it.
    fn implicit_receiver(&self, member: &Symbol) -> Result<LockExpr, IllegalGuardedBy> {
        let owner = member
            .owner()
            .ok_or_else(|| IllegalGuardedBy::new(member.name.clone()))?;
        if member.is_static() {
            return Ok(LockExpr::TypeLiteral(self.lock_sym(owner)?));
        }
        let class = self
            .enclosing_classes()
            .into_iter()
            .find(|&class| self.resolver.is_subclass(class, owner))
            .ok_or_else(|| IllegalGuardedBy::new(member.name.clone()))?;
        self.enclosing_instance(class)
    }

    /// Static class of the object a lock expression denotes.
    pub fn static_class(&self, lock: &LockExpr) -> Option<SymbolId> {
        match lock {
            LockExpr::This => Some(self.class),
            LockExpr::Outer(class) => Some(class.id),
            LockExpr::Local(sym) | LockExpr::Select { member: sym, .. } => {
                self.resolver.type_of(sym.id)
            }
            LockExpr::ClassLiteral(_) | LockExpr::TypeLiteral(_) => None,
        }
    }

    /// `base.member`, where static members ignore the written qualifier.
    fn select(&self, base: Option<Bound>, member: SymbolId) -> Result<Bound, IllegalGuardedBy> {
        let symbol = self.symbol(member)?;
        match symbol.kind {
            SymbolKind::Class { .. } => return Ok(Bound::Type(member)),
            SymbolKind::Field { .. } | SymbolKind::Method { .. } => {}
            SymbolKind::Parameter { .. } | SymbolKind::Local { .. } => {
                return Err(IllegalGuardedBy::new(symbol.name.clone()));
            }
        }

        let base = if symbol.is_static() {
            let owner = symbol
                .owner()
                .ok_or_else(|| IllegalGuardedBy::new(symbol.name.clone()))?;
            LockExpr::TypeLiteral(self.lock_sym(owner)?)
        } else {
            match base {
                Some(Bound::Lock(base)) => base,
                Some(Bound::Type(_)) => {
                    return Err(IllegalGuardedBy::new(format!(
                        "instance member {} selected from a type",
                        symbol.name
                    )))
                }
                None => self.implicit_receiver(symbol)?,
            }
        };
        Ok(Bound::Lock(LockExpr::select(base, LockSym::from_symbol(symbol))))
    }

    fn finish(&self, bound: Bound) -> Result<LockExpr, IllegalGuardedBy> {
        match bound {
            Bound::Lock(lock) => Ok(lock),
            Bound::Type(class) => Ok(LockExpr::ClassLiteral(self.lock_sym(class)?)),
        }
    }
}

/// Bind the text of a `@GuardedBy` declaration.
///
/// `ctx.class` must be the class declaring the guarded member.
pub fn bind_string(guard: &str, ctx: &BindContext<'_>) -> Result<LockExpr, IllegalGuardedBy> {
    let expr = guardcheck_parser::parse_expression(guard)
        .map_err(|_| IllegalGuardedBy::new(guard))?;
    let bound = GuardBinder { ctx }
        .bind(&expr)
        .map_err(|_| IllegalGuardedBy::new(guard))?;
    ctx.finish(bound)
}

/// Bind a source expression, such as a `synchronized` operand.
pub fn bind_expr(expr: &Expr, ctx: &BindContext<'_>) -> Result<LockExpr, IllegalGuardedBy> {
    let bound = ExprBinder { ctx }.bind(expr, false)?;
    ctx.finish(bound)
}

/// Bind a guarded-member access site. Unlike [`bind_expr`], the outermost
/// node may be a call with arguments.
pub(crate) fn bind_access(expr: &Expr, ctx: &BindContext<'_>) -> Result<LockExpr, IllegalGuardedBy> {
    let bound = ExprBinder { ctx }.bind(expr, true)?;
    ctx.finish(bound)
}

fn unsupported(expr: &Expr) -> IllegalGuardedBy {
    let text = expr.dotted_name().unwrap_or_else(|| match &expr.kind {
        ExprKind::Call { method, .. } => format!("{}(...)", method),
        ExprKind::String(s) => format!("\"{}\"", s),
        ExprKind::Int(n) => n.to_string(),
        ExprKind::New { class, .. } => format!("new {}(...)", class),
        ExprKind::QualifiedThis(qualifier) => format!("{}.this", qualifier),
        ExprKind::ClassLit(ty) => format!("{}.class", ty),
        _ => "expression".to_string(),
    });
    IllegalGuardedBy::new(text)
}

/// Binds parsed guard text by looking names up.
struct GuardBinder<'c, 'a> {
    ctx: &'c BindContext<'a>,
}

impl GuardBinder<'_, '_> {
    fn bind(&self, expr: &Expr) -> Result<Bound, IllegalGuardedBy> {
        let ctx = self.ctx;
        let resolver = ctx.resolver;
        match &expr.kind {
            ExprKind::Paren(inner) => self.bind(inner),
            ExprKind::This | ExprKind::Super => Ok(Bound::Lock(LockExpr::This)),
            ExprKind::QualifiedThis(qualifier) => {
                let class = resolver
                    .find_type(ctx.class, qualifier)
                    .ok_or_else(|| unsupported(expr))?;
                Ok(Bound::Lock(ctx.enclosing_instance(class)?))
            }
            ExprKind::ClassLit(ty) => {
                let class = resolver.find_type(ctx.class, ty).ok_or_else(|| unsupported(expr))?;
                Ok(Bound::Lock(LockExpr::ClassLiteral(ctx.lock_sym(class)?)))
            }
            ExprKind::Ident(name) => {
                if let Some(field) = self.lookup_field(name) {
                    return ctx.select(None, field);
                }
                resolver
                    .find_type(ctx.class, name)
                    .map(Bound::Type)
                    .ok_or_else(|| unsupported(expr))
            }
            ExprKind::Select { object, name } => match self.bind(object) {
                Ok(base) => self.select_named(base, name, false),
                // `com.example.Locks.LOCK`: the head is a package name.
                Err(err) => expr
                    .dotted_name()
                    .and_then(|dotted| resolver.find_type(ctx.class, &dotted))
                    .map(Bound::Type)
                    .ok_or(err),
            },
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                if !args.is_empty() {
                    return Err(unsupported(expr));
                }
                match receiver {
                    Some(receiver) => {
                        let base = self.bind(receiver)?;
                        self.select_named(base, method, true)
                    }
                    None => {
                        let found = ctx
                            .enclosing_classes()
                            .into_iter()
                            .find_map(|class| self.zero_arg_method(class, method))
                            .ok_or_else(|| unsupported(expr))?;
                        ctx.select(None, found)
                    }
                }
            }
            _ => Err(unsupported(expr)),
        }
    }

    /// A field visible by simple name from the context class.
    fn lookup_field(&self, name: &str) -> Option<SymbolId> {
        let resolver = self.ctx.resolver;
        self.ctx.enclosing_classes().into_iter().find_map(|class| {
            resolver
                .find_member(class, name)
                .filter(|&id| matches!(resolver.symbol(id).map(|s| &s.kind), Some(SymbolKind::Field { .. })))
        })
    }

    /// A method of `class` taking no arguments. The resolver's lookup falls
    /// back to any overload, which a guard must not.
    fn zero_arg_method(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        let resolver = self.ctx.resolver;
        resolver.find_method(class, name, 0).filter(|&id| {
            matches!(
                resolver.symbol(id).map(|s| &s.kind),
                Some(SymbolKind::Method { arity: 0, .. })
            )
        })
    }

    fn select_named(&self, base: Bound, name: &str, call: bool) -> Result<Bound, IllegalGuardedBy> {
        let ctx = self.ctx;
        let resolver = ctx.resolver;
        let class = match &base {
            Bound::Type(class) => Some(*class),
            Bound::Lock(lock) => ctx.static_class(lock),
        }
        .ok_or_else(|| IllegalGuardedBy::new(name))?;

        let member = if call {
            self.zero_arg_method(class, name)
        } else {
            let field = resolver.find_member(class, name).filter(|&id| {
                matches!(resolver.symbol(id).map(|s| &s.kind), Some(SymbolKind::Field { .. }))
            });
            match (field, &base) {
                (Some(field), _) => Some(field),
                (None, Bound::Type(_)) => resolver.find_type(class, name),
                (None, Bound::Lock(_)) => None,
            }
        };
        let member = member.ok_or_else(|| IllegalGuardedBy::new(name))?;
        ctx.select(Some(base), member)
    }
}

/// Binds source expressions through recorded resolutions.
struct ExprBinder<'c, 'a> {
    ctx: &'c BindContext<'a>,
}

impl ExprBinder<'_, '_> {
    fn resolved(&self, expr: &Expr) -> Result<SymbolId, IllegalGuardedBy> {
        self.ctx
            .resolver
            .resolution(expr.id)
            .ok_or_else(|| unsupported(expr))
    }

    fn bind(&self, expr: &Expr, allow_args: bool) -> Result<Bound, IllegalGuardedBy> {
        let ctx = self.ctx;
        match &expr.kind {
            ExprKind::Paren(inner) => self.bind(inner, allow_args),
            ExprKind::This | ExprKind::Super => Ok(Bound::Lock(LockExpr::This)),
            ExprKind::QualifiedThis(_) => {
                let class = self.resolved(expr)?;
                Ok(Bound::Lock(ctx.enclosing_instance(class)?))
            }
            ExprKind::ClassLit(_) => {
                let class = self.resolved(expr)?;
                Ok(Bound::Lock(LockExpr::ClassLiteral(ctx.lock_sym(class)?)))
            }
            ExprKind::Ident(_) => {
                let id = self.resolved(expr)?;
                let symbol = ctx.symbol(id)?;
                if symbol.is_variable() {
                    return Ok(Bound::Lock(LockExpr::Local(LockSym::from_symbol(symbol))));
                }
                ctx.select(None, id)
            }
            ExprKind::Select { object, .. } => {
                let member = self.resolved(expr)?;
                let symbol = ctx.symbol(member)?;
                if symbol.is_class() || symbol.is_static() {
                    return ctx.select(None, member);
                }
                let base = self.bind(object, false)?;
                ctx.select(Some(base), member)
            }
            ExprKind::Call { receiver, args, .. } => {
                if !allow_args && !args.is_empty() {
                    return Err(unsupported(expr));
                }
                let method = self.resolved(expr)?;
                let is_static = ctx.symbol(method)?.is_static();
                let base = match receiver {
                    Some(receiver) if !is_static => Some(self.bind(receiver, false)?),
                    _ => None,
                };
                ctx.select(base, method)
            }
            _ => Err(unsupported(expr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture;
    use guardcheck_ast::stmt::StmtKind;

    const SOURCE: &str = r#"
        import java.util.concurrent.locks.*;
        class Locks {
            static final Object LOCK = new Object();
        }
        class Outer {
            final Object mu = new Object();
            static final Object STATIC_MU = new Object();
            final ReadWriteLock rw = new ReentrantReadWriteLock();
            Outer next;
            Object lock() { return mu; }
            Object withArg(int i) { return mu; }

            class Inner {
                final Object innerMu = new Object();
                void f() {}
            }
        }
        class Sub extends Outer {}
    "#;

    fn bind(class: &str, guard: &str) -> Result<String, IllegalGuardedBy> {
        let f = fixture(SOURCE);
        let ctx = f.ctx(f.class(class));
        bind_string(guard, &ctx).map(|lock| lock.to_string())
    }

    #[test]
    fn binds_supported_guard_forms() {
        assert_eq!(bind("Outer", "this").unwrap(), "this");
        assert_eq!(bind("Outer", "mu").unwrap(), "this.mu");
        assert_eq!(bind("Outer", "this.mu").unwrap(), "this.mu");
        assert_eq!(bind("Outer", "Outer.class").unwrap(), "Outer.class");
        assert_eq!(bind("Outer", "Outer").unwrap(), "Outer.class");
        assert_eq!(bind("Outer", "STATIC_MU").unwrap(), "Outer.STATIC_MU");
        assert_eq!(bind("Outer", "Locks.LOCK").unwrap(), "Locks.LOCK");
        assert_eq!(bind("Outer", "next.mu").unwrap(), "this.next.mu");
        assert_eq!(bind("Outer", "lock()").unwrap(), "this.lock()");
        assert_eq!(bind("Outer", "rw.readLock()").unwrap(), "this.rw.readLock()");
        assert_eq!(bind("Outer", "(mu)").unwrap(), "this.mu");
    }

    #[test]
    fn binds_from_inner_classes_and_subclasses() {
        assert_eq!(bind("Inner", "mu").unwrap(), "Outer.this.mu");
        assert_eq!(bind("Inner", "Outer.this").unwrap(), "Outer.this");
        assert_eq!(bind("Inner", "Outer.this.mu").unwrap(), "Outer.this.mu");
        assert_eq!(bind("Inner", "Inner.this").unwrap(), "this");
        assert_eq!(bind("Inner", "innerMu").unwrap(), "this.innerMu");
        assert_eq!(bind("Sub", "mu").unwrap(), "this.mu");
    }

    #[test]
    fn rejects_unsupported_guards() {
        for guard in [
            "nope",
            "mu.nope",
            "withArg(1)",
            "withArg()",
            "next.withArg()",
            "\"mu\"",
            "1 + 2",
            "mu +",
            "Inner.this",
            "",
        ] {
            let err = bind("Outer", guard).expect_err(guard);
            assert_eq!(err.text, guard);
        }
    }

    #[test]
    fn equal_locks_from_different_spellings() {
        let f = fixture(SOURCE);
        let outer = f.ctx(f.class("Outer"));
        let inner = f.ctx(f.class("Inner"));
        assert_eq!(bind_string("mu", &outer).unwrap(), bind_string("this.mu", &outer).unwrap());
        assert_eq!(
            bind_string("mu", &inner).unwrap(),
            bind_string("Outer.this.mu", &inner).unwrap()
        );
        assert_ne!(bind_string("mu", &outer).unwrap(), bind_string("mu", &inner).unwrap());
        assert_eq!(
            bind_string("Outer.STATIC_MU", &inner).unwrap(),
            bind_string("STATIC_MU", &outer).unwrap()
        );
        // Binding is pure.
        assert_eq!(bind_string("next.mu", &outer), bind_string("next.mu", &outer));
    }

    #[test]
    fn binds_source_expressions() {
        let f = fixture(
            r#"class A {
                   final Object mu = new Object();
                   static final Object S = new Object();
                   A other;
                   void f(Object param) {
                       synchronized (mu) {}
                       synchronized (other.mu) {}
                       synchronized (param) {}
                       synchronized (A.class) {}
                       synchronized ((this)) {}
                       synchronized (other.S) {}
                       synchronized (new Object()) {}
                   }
               }"#,
        );
        let ctx = f.ctx(f.class("A"));
        let (method, _) = f.method("A", "f");
        let bound: Vec<Result<String, IllegalGuardedBy>> = method
            .body
            .as_ref()
            .unwrap()
            .iter()
            .map(|stmt| match &stmt.kind {
                StmtKind::Synchronized { lock, .. } => bind_expr(lock, &ctx).map(|l| l.to_string()),
                other => panic!("unexpected statement {:?}", other),
            })
            .collect();
        assert_eq!(bound[0].as_deref(), Ok("this.mu"));
        assert_eq!(bound[1].as_deref(), Ok("this.other.mu"));
        assert_eq!(bound[2].as_deref(), Ok("param"));
        assert_eq!(bound[3].as_deref(), Ok("A.class"));
        assert_eq!(bound[4].as_deref(), Ok("this"));
        assert_eq!(bound[5].as_deref(), Ok("A.S"));
        assert!(bound[6].is_err());
    }
}
