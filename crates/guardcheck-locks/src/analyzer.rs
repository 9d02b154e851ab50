// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The held-lock analyzer.
//!
//! Walks one analysis unit top-down, carrying the set of held locks, and
//! reports every access to a guarded member together with the lock it
//! requires.

use guardcheck_ast::decl::MethodDecl;
use guardcheck_ast::expr::{Expr, ExprKind, LambdaBody};
use guardcheck_ast::stmt::{Stmt, StmtKind, TryStmt};
use guardcheck_ast::visit::{walk_expr, walk_lambda, walk_stmt, walk_stmts, Visitor};
use guardcheck_resolve::{Symbol, SymbolId, SymbolKind, SymbolResolver};

use crate::binder::{bind_expr, bind_string, BindContext};
use crate::error::IllegalGuardedBy;
use crate::expected::expected_lock;
use crate::held::HeldLockSet;
use crate::lock_expr::{LockExpr, LockSym};
use crate::released::find_released_locks;

/// Receives every guarded access found by [`analyze`].
pub trait LockEventListener {
    /// `access` is an identifier, member select or method call whose member
    /// is guarded; `required` is the lock it must hold.
    fn handle_guarded_access(&mut self, access: &Expr, required: &LockExpr, held: &HeldLockSet);
}

/// A body analyzed on its own, starting from no held locks.
#[derive(Debug, Clone, Copy)]
pub enum AnalysisUnit<'a> {
    /// A method or constructor declared in `class`.
    Method { decl: &'a MethodDecl, class: SymbolId },
    /// An instance or static initializer block.
    Initializer { body: &'a [Stmt], class: SymbolId },
    /// A lambda body; `class` is the class its `this` refers to.
    Lambda { body: &'a LambdaBody, class: SymbolId },
}

impl AnalysisUnit<'_> {
    pub fn class(&self) -> SymbolId {
        match *self {
            AnalysisUnit::Method { class, .. }
            | AnalysisUnit::Initializer { class, .. }
            | AnalysisUnit::Lambda { class, .. } => class,
        }
    }
}

/// Analyze one unit, reporting guarded accesses to `listener`.
///
/// Nested class bodies and lambdas are not entered; they are separate units.
pub fn analyze(
    unit: AnalysisUnit<'_>,
    resolver: &dyn SymbolResolver,
    listener: &mut dyn LockEventListener,
) {
    let ctx = BindContext::new(resolver, unit.class());
    let mut scanner = LockScanner {
        ctx,
        listener,
        held: HeldLockSet::empty(),
    };

    match unit {
        AnalysisUnit::Method { decl, .. } => {
            log::debug!("analyzing method {}", decl.name);
            scanner.held = scanner.method_entry_locks(decl);
            if let Some(body) = &decl.body {
                walk_stmts(&mut scanner, body);
            }
        }
        AnalysisUnit::Initializer { body, .. } => {
            log::debug!("analyzing initializer block");
            walk_stmts(&mut scanner, body);
        }
        AnalysisUnit::Lambda { body, .. } => {
            log::debug!("analyzing lambda body");
            walk_lambda(&mut scanner, body);
        }
    }
}

struct LockScanner<'a, 'l> {
    ctx: BindContext<'a>,
    listener: &'l mut dyn LockEventListener,
    /// Locks held at the current point; replaced on entry to a protected
    /// region and restored on exit.
    held: HeldLockSet,
}

impl<'v> Visitor<'v> for LockScanner<'_, '_> {
    fn visit_stmt(&mut self, stmt: &'v Stmt) {
        match &stmt.kind {
            // The operand is evaluated before the lock is taken and is not
            // itself checked.
            StmtKind::Synchronized { lock, body } => match bind_expr(lock, &self.ctx) {
                Ok(lock) => {
                    let held = self.held.plus(lock);
                    self.scan_holding(held, |scanner| walk_stmts(scanner, body));
                }
                Err(err) => {
                    log::debug!("synchronized operand not bound: {}", err);
                    walk_stmts(self, body);
                }
            },
            StmtKind::Try(try_stmt) => self.scan_try(try_stmt),
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &'v Expr) {
        if matches!(
            expr.kind,
            ExprKind::Ident(_) | ExprKind::Select { .. } | ExprKind::Call { .. }
        ) {
            self.check_access(expr);
        }
        walk_expr(self, expr);
    }
}

impl LockScanner<'_, '_> {
    /// Locks held on entry: the monitor of a synchronized method, and the
    /// method's own guard, which is trusted for its body.
    fn method_entry_locks(&self, decl: &MethodDecl) -> HeldLockSet {
        let mut held = HeldLockSet::empty();
        let resolver = self.ctx.resolver;
        let Some(symbol) = resolver.resolution(decl.id).and_then(|id| resolver.symbol(id)) else {
            log::debug!("method {} has no symbol", decl.name);
            return held;
        };

        if let SymbolKind::Method {
            owner,
            is_static,
            is_synchronized: true,
            ..
        } = symbol.kind
        {
            let lock = if is_static {
                resolver
                    .symbol(owner)
                    .map(|class| LockExpr::ClassLiteral(LockSym::from_symbol(class)))
            } else {
                Some(LockExpr::This)
            };
            if let Some(lock) = lock {
                held = held.plus(lock);
            }
        }

        if let Some(guard) = &symbol.guard {
            let ctx = self.ctx.for_member(symbol).unwrap_or(self.ctx);
            match bind_string(guard, &ctx) {
                Ok(lock) => held = held.plus(lock),
                Err(err) => log::debug!("skipping guard of {}: {}", decl.name, err),
            }
        }
        held
    }

    fn scan_holding(&mut self, held: HeldLockSet, scan: impl FnOnce(&mut Self)) {
        let outer = std::mem::replace(&mut self.held, held);
        scan(self);
        self.held = outer;
    }

    /// Locks released in `finally` are assumed held for the whole `try`
    /// block and its handlers. The `finally` block itself gets the outer set.
    fn scan_try(&mut self, try_stmt: &TryStmt) {
        for resource in &try_stmt.resources {
            self.visit_expr(&resource.init);
        }

        let released = find_released_locks(try_stmt.finally.as_deref(), &self.ctx);
        let protected = self.held.plus_all(released);
        self.scan_holding(protected, |scanner| {
            walk_stmts(scanner, &try_stmt.body);
            for catch in &try_stmt.catches {
                walk_stmts(scanner, &catch.body);
            }
        });

        if let Some(finally) = &try_stmt.finally {
            walk_stmts(self, finally);
        }
    }

    fn check_access(&mut self, access: &Expr) {
        let resolver = self.ctx.resolver;
        let Some(member) = resolver.resolution(access.id).and_then(|id| resolver.symbol(id)) else {
            return;
        };
        if !matches!(member.kind, SymbolKind::Field { .. } | SymbolKind::Method { .. }) {
            return;
        }
        let Some(guard) = &member.guard else {
            return;
        };

        match self.required_lock(access, guard, member) {
            Ok(required) => {
                log::trace!("{} requires {}, holding {}", member.name, required, self.held);
                self.listener.handle_guarded_access(access, &required, &self.held);
            }
            Err(err) => log::debug!("skipping access to {}: {}", member.name, err),
        }
    }

    fn required_lock(
        &self,
        access: &Expr,
        guard: &str,
        member: &Symbol,
    ) -> Result<LockExpr, IllegalGuardedBy> {
        let guard_ctx = self
            .ctx
            .for_member(member)
            .ok_or_else(|| IllegalGuardedBy::new(guard))?;
        let guard = bind_string(guard, &guard_ctx)?;
        expected_lock(access, &guard, &self.ctx)
    }
}
