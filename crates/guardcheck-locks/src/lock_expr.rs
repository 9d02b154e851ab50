// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbolic lock expressions.

use std::fmt;
use std::hash::{Hash, Hasher};

use guardcheck_resolve::{Symbol, SymbolId, SymbolKind};

/// A resolved symbol inside a lock expression.
///
/// Identity is the symbol id alone; the name is kept for display.
#[derive(Debug, Clone)]
pub struct LockSym {
    pub id: SymbolId,
    pub name: String,
}

impl LockSym {
    pub fn new(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Methods display with a trailing `()`.
    pub fn from_symbol(symbol: &Symbol) -> Self {
        let name = match symbol.kind {
            SymbolKind::Method { .. } => format!("{}()", symbol.name),
            _ => symbol.name.clone(),
        };
        Self::new(symbol.id, name)
    }
}

impl PartialEq for LockSym {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LockSym {}

impl Hash for LockSym {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A symbolic description of a particular lock object.
///
/// Two expressions are equal when they have the same shape and resolve to
/// the same symbols, however they were spelled in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LockExpr {
    /// The innermost enclosing instance.
    This,
    /// `Outer.this`, an enclosing instance other than the innermost.
    Outer(LockSym),
    /// `Foo.class`.
    ClassLiteral(LockSym),
    /// A type used as the qualifier of a static member (`Foo` in `Foo.lock`).
    TypeLiteral(LockSym),
    /// A local variable or parameter.
    Local(LockSym),
    /// `base.member`; zero-argument method calls select the method.
    Select { base: Box<LockExpr>, member: LockSym },
}

impl LockExpr {
    pub fn select(base: LockExpr, member: LockSym) -> Self {
        LockExpr::Select {
            base: Box::new(base),
            member,
        }
    }

    /// The bottom of a select chain.
    pub fn root(&self) -> &LockExpr {
        let mut expr = self;
        while let LockExpr::Select { base, .. } = expr {
            expr = base;
        }
        expr
    }

    /// Whether this expression is rooted at the innermost instance and so
    /// depends on how the guarded member was reached.
    pub fn is_relative(&self) -> bool {
        matches!(self.root(), LockExpr::This)
    }
}

impl fmt::Display for LockExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockExpr::This => write!(f, "this"),
            LockExpr::Outer(class) => write!(f, "{}.this", class.name),
            LockExpr::ClassLiteral(class) => write!(f, "{}.class", class.name),
            LockExpr::TypeLiteral(class) => write!(f, "{}", class.name),
            LockExpr::Local(local) => write!(f, "{}", local.name),
            LockExpr::Select { base, member } => write!(f, "{}.{}", base, member.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sym(id: u32, name: &str) -> LockSym {
        LockSym::new(SymbolId(id), name)
    }

    #[test]
    fn equality_ignores_display_names() {
        let a = LockExpr::select(LockExpr::This, sym(3, "mu"));
        let b = LockExpr::select(LockExpr::This, sym(3, "renamed"));
        let c = LockExpr::select(LockExpr::This, sym(4, "mu"));
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<LockExpr> = [a.clone(), b].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&a));
    }

    #[test]
    fn shape_matters() {
        let class = sym(1, "Foo");
        assert_ne!(
            LockExpr::ClassLiteral(class.clone()),
            LockExpr::TypeLiteral(class.clone())
        );
        assert_ne!(LockExpr::Outer(class.clone()), LockExpr::ClassLiteral(class));
    }

    #[test]
    fn roots_and_relativity() {
        let chain = LockExpr::select(LockExpr::select(LockExpr::This, sym(2, "a")), sym(3, "b"));
        assert_eq!(chain.root(), &LockExpr::This);
        assert!(chain.is_relative());

        let outer = LockExpr::select(LockExpr::Outer(sym(1, "Outer")), sym(2, "mu"));
        assert!(!outer.is_relative());
        assert!(!LockExpr::ClassLiteral(sym(1, "Foo")).is_relative());
        assert!(LockExpr::This.is_relative());
    }

    #[test]
    fn display() {
        let rw = LockExpr::select(LockExpr::This, sym(2, "rw"));
        let read = LockExpr::select(rw.clone(), sym(3, "readLock()"));
        assert_eq!(read.to_string(), "this.rw.readLock()");
        assert_eq!(
            LockExpr::select(LockExpr::Outer(sym(1, "Outer")), sym(4, "mu")).to_string(),
            "Outer.this.mu"
        );
        assert_eq!(
            LockExpr::select(LockExpr::TypeLiteral(sym(5, "Foo")), sym(6, "LOCK")).to_string(),
            "Foo.LOCK"
        );
        assert_eq!(LockExpr::ClassLiteral(sym(5, "Foo")).to_string(), "Foo.class");
        assert_eq!(LockExpr::Local(sym(7, "lock")).to_string(), "lock");
    }
}
