// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Locks released in a `finally` block.
//!
//! Recognized releases are zero-argument calls on receivers whose static
//! type is a library lock:
//!
//! - `Lock.unlock()`
//! - `Monitor.leave()`
//! - `rw.readLock().unlock()` and `rw.writeLock().unlock()`, which also
//!   release `rw` itself. Members guarded by a read/write lock are
//!   satisfied by holding either half.

use guardcheck_ast::expr::{Expr, ExprKind};
use guardcheck_ast::stmt::Stmt;
use guardcheck_ast::visit::{walk_expr, walk_stmts, Visitor};
use guardcheck_resolve::{SymbolId, SymbolKind, LOCK, MONITOR, READ_WRITE_LOCK};

use crate::binder::{bind_expr, BindContext};
use crate::lock_expr::LockExpr;

/// Find the locks released by `finally`, without duplicates.
pub fn find_released_locks(finally: Option<&[Stmt]>, ctx: &BindContext<'_>) -> Vec<LockExpr> {
    let Some(stmts) = finally else {
        return Vec::new();
    };
    let mut finder = ReleasedLockFinder {
        ctx,
        locks: Vec::new(),
    };
    walk_stmts(&mut finder, stmts);
    if !finder.locks.is_empty() {
        log::trace!(
            "finally releases {}",
            finder.locks.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(", ")
        );
    }
    finder.locks
}

struct ReleasedLockFinder<'c, 'a> {
    ctx: &'c BindContext<'a>,
    locks: Vec<LockExpr>,
}

impl ReleasedLockFinder<'_, '_> {
    fn add(&mut self, lock: LockExpr) {
        if !self.locks.contains(&lock) {
            self.locks.push(lock);
        }
    }

    fn is_a(&self, lock: &LockExpr, qualified_name: &str) -> bool {
        self.ctx
            .static_class(lock)
            .is_some_and(|class| self.ctx.resolver.is_subtype(class, qualified_name))
    }

    fn is_read_write_accessor(&self, method: SymbolId) -> bool {
        self.ctx.resolver.symbol(method).is_some_and(|symbol| {
            matches!(symbol.kind, SymbolKind::Method { arity: 0, .. })
                && (symbol.name == "readLock" || symbol.name == "writeLock")
        })
    }

    fn check_call(&mut self, receiver: &Expr, method: &str) {
        let release_of = match method {
            "unlock" => LOCK,
            "leave" => MONITOR,
            _ => return,
        };
        let Ok(lock) = bind_expr(receiver, self.ctx) else {
            log::trace!("ignoring {}() on an unbindable receiver", method);
            return;
        };
        if !self.is_a(&lock, release_of) {
            return;
        }

        let outer = match &lock {
            LockExpr::Select { base, member }
                if self.is_read_write_accessor(member.id) && self.is_a(base, READ_WRITE_LOCK) =>
            {
                Some((**base).clone())
            }
            _ => None,
        };
        self.add(lock);
        if let Some(outer) = outer {
            self.add(outer);
        }
    }
}

// Class bodies and lambdas run later, outside the finally block; the
// default hooks do not enter them.
impl<'v> Visitor<'v> for ReleasedLockFinder<'_, '_> {
    fn visit_expr(&mut self, expr: &'v Expr) {
        if let ExprKind::Call {
            receiver: Some(receiver),
            method,
            args,
        } = &expr.kind
        {
            if args.is_empty() {
                self.check_call(receiver, method);
            }
        }
        walk_expr(self, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixture;
    use guardcheck_ast::stmt::{StmtKind, TryStmt};

    const SOURCE: &str = r#"
        import java.util.concurrent.locks.*;
        import com.google.common.util.concurrent.Monitor;
        class A {
            final Lock lock = new ReentrantLock();
            final ReentrantLock reentrant = new ReentrantLock();
            final ReadWriteLock rw = new ReentrantReadWriteLock();
            final Monitor monitor = new Monitor();
            final Object plain = new Object();

            void unlocks() { try {} finally { lock.unlock(); reentrant.unlock(); lock.unlock(); } }
            void reads() { try {} finally { rw.readLock().unlock(); } }
            void writes() { try {} finally { rw.writeLock().unlock(); } }
            void leaves() { try {} finally { if (true) { monitor.leave(); } } }
            void locals(Lock param) { try {} finally { param.unlock(); } }
            void ignored() {
                try {} finally {
                    plain.notify();
                    lock.lock();
                    Runnable r = () -> lock.unlock();
                    new Object() { void f() { lock.unlock(); } };
                }
            }
            void none() { try {} catch (Exception e) {} }
        }
    "#;

    fn released(method: &str) -> Vec<String> {
        let f = fixture(SOURCE);
        let ctx = f.ctx(f.class("A"));
        let (decl, _) = f.method("A", method);
        let body = decl.body.as_ref().unwrap();
        let StmtKind::Try(TryStmt { finally, .. }) = &body[0].kind else {
            panic!("expected try statement");
        };
        find_released_locks(finally.as_deref(), &ctx)
            .iter()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn lock_unlock_is_found_once() {
        assert_eq!(released("unlocks"), vec!["this.lock", "this.reentrant"]);
    }

    #[test]
    fn read_write_halves_release_the_outer_lock() {
        assert_eq!(released("reads"), vec!["this.rw.readLock()", "this.rw"]);
        assert_eq!(released("writes"), vec!["this.rw.writeLock()", "this.rw"]);
    }

    #[test]
    fn monitor_leave_in_nested_statements() {
        assert_eq!(released("leaves"), vec!["this.monitor"]);
    }

    #[test]
    fn parameters_can_be_released() {
        assert_eq!(released("locals"), vec!["param"]);
    }

    #[test]
    fn other_calls_and_nested_scopes_are_ignored() {
        assert!(released("ignored").is_empty());
        assert!(released("none").is_empty());
    }
}
