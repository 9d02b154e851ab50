// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lock a particular guarded access must hold.

use guardcheck_ast::expr::Expr;

use crate::binder::{bind_access, BindContext};
use crate::error::IllegalGuardedBy;
use crate::lock_expr::LockExpr;

/// Compute the lock required at `access` for a member guarded by `guard`.
///
/// Absolute guards (class literals, static selects, `Outer.this...`) name
/// the same lock whatever the access. Relative guards are rooted at `this`
/// and are rebased onto the receiver of the access: for a field `x`
/// guarded by `mu`, `obj.x` requires `obj.mu`.
pub fn expected_lock(
    access: &Expr,
    guard: &LockExpr,
    ctx: &BindContext<'_>,
) -> Result<LockExpr, IllegalGuardedBy> {
    if !guard.is_relative() {
        return Ok(guard.clone());
    }

    match bind_access(access, ctx)? {
        LockExpr::Select { base, .. } => rebase(guard, &base),
        other => Err(IllegalGuardedBy::new(other.to_string())),
    }
}

/// Replace the `this` at the root of `guard` with `receiver`.
fn rebase(guard: &LockExpr, receiver: &LockExpr) -> Result<LockExpr, IllegalGuardedBy> {
    match guard {
        LockExpr::This => Ok(receiver.clone()),
        LockExpr::Select { base, member } => {
            Ok(LockExpr::select(rebase(base, receiver)?, member.clone()))
        }
        LockExpr::Outer(_)
        | LockExpr::ClassLiteral(_)
        | LockExpr::TypeLiteral(_)
        | LockExpr::Local(_) => Err(IllegalGuardedBy::new(guard.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind_string;
    use crate::lock_expr::LockSym;
    use crate::testing::{expr_stmts, fixture};
    use guardcheck_resolve::SymbolId;

    const SOURCE: &str = r#"
        class Counter {
            final Object mu = new Object();
            static final Object LOCK = new Object();
            final Counter peer = null;
            @GuardedBy("mu") int x;
            @GuardedBy("Counter.LOCK") static int y;
            @GuardedBy("peer.mu") int z;

            void f(Counter a, Counter b) {
                a.x = 1;
                this.x = 2;
                x = 3;
                a.y = 4;
                b.y = 5;
                a.z = 6;
                (a).x = 7;
            }
        }
    "#;

    fn required(guard: &str) -> Vec<Result<String, IllegalGuardedBy>> {
        let f = fixture(SOURCE);
        let class = f.class("Counter");
        let ctx = f.ctx(class);
        let guard = bind_string(guard, &ctx).unwrap();
        let (method, _) = f.method("Counter", "f");
        expr_stmts(method)
            .into_iter()
            .map(|assign| {
                let guardcheck_ast::expr::ExprKind::Assign { target, .. } = &assign.kind else {
                    panic!("expected assignment");
                };
                expected_lock(target, &guard, &ctx).map(|l| l.to_string())
            })
            .collect()
    }

    #[test]
    fn relative_guards_follow_the_receiver() {
        let locks = required("mu");
        assert_eq!(locks[0].as_deref(), Ok("a.mu"));
        assert_eq!(locks[1].as_deref(), Ok("this.mu"));
        assert_eq!(locks[2].as_deref(), Ok("this.mu"));
        assert_eq!(locks[6].as_deref(), Ok("a.mu"));
    }

    #[test]
    fn chains_are_rebased_link_by_link() {
        let locks = required("peer.mu");
        assert_eq!(locks[5].as_deref(), Ok("a.peer.mu"));
    }

    #[test]
    fn absolute_guards_ignore_the_receiver() {
        let locks = required("Counter.LOCK");
        assert_eq!(locks[3].as_deref(), Ok("Counter.LOCK"));
        assert_eq!(locks[4].as_deref(), Ok("Counter.LOCK"));
        assert_eq!(locks[3], locks[4]);
    }

    #[test]
    fn non_substitutable_shapes_fail() {
        let outer = LockExpr::Outer(LockSym::new(SymbolId(1), "Outer"));
        let local = LockExpr::Local(LockSym::new(SymbolId(2), "lock"));
        assert!(rebase(&outer, &LockExpr::This).is_err());
        assert!(rebase(&LockExpr::select(local, LockSym::new(SymbolId(3), "mu")), &LockExpr::This).is_err());
        assert_eq!(rebase(&LockExpr::This, &outer), Ok(outer));
    }
}
