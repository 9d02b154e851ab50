// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Held-lock analysis for `@GuardedBy` checking.
//!
//! For every analysis unit (a method, initializer or lambda body) the
//! analyzer tracks which locks are held at each point and, at every access
//! to a guarded member, reports the lock that access requires together with
//! the locks held there. Deciding whether the access is safe is up to the
//! [`LockEventListener`].
//!
//! The analysis is a heuristic. Locks released in a `finally` block are
//! assumed held for the whole `try` block, and a read/write lock counts as
//! held when either of its halves is.

mod analyzer;
mod binder;
mod error;
mod expected;
mod held;
mod lock_expr;
mod released;

#[cfg(test)]
mod testing;

pub use analyzer::{analyze, AnalysisUnit, LockEventListener};
pub use binder::{bind_expr, bind_string, BindContext};
pub use error::IllegalGuardedBy;
pub use expected::expected_lock;
pub use held::HeldLockSet;
pub use lock_expr::{LockExpr, LockSym};
pub use released::find_released_locks;
