// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The set of locks held at a program point.

use std::collections::HashSet;
use std::fmt;

use crate::lock_expr::LockExpr;

/// An immutable set of held locks.
///
/// Sets only grow: `plus` returns a new set and leaves `self` untouched, so
/// sibling branches of a traversal never see each other's locks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldLockSet {
    locks: HashSet<LockExpr>,
}

impl HeldLockSet {
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn plus(&self, lock: LockExpr) -> Self {
        let mut locks = self.locks.clone();
        locks.insert(lock);
        Self { locks }
    }

    #[must_use]
    pub fn plus_all(&self, locks: impl IntoIterator<Item = LockExpr>) -> Self {
        let mut all = self.locks.clone();
        all.extend(locks);
        Self { locks: all }
    }

    pub fn contains(&self, lock: &LockExpr) -> bool {
        self.locks.contains(lock)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LockExpr> {
        self.locks.iter()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl fmt::Display for HeldLockSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.locks.iter().map(|l| l.to_string()).collect();
        names.sort();
        write!(f, "{{{}}}", names.join(", "))
    }
}
