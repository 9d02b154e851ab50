// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Scope tree for name resolution.

use crate::symbol::SymbolId;
use std::collections::HashMap;

/// Unique identifier for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// The kind of scope.
#[derive(Debug, Clone)]
pub enum ScopeKind {
    /// Body of a class; names fall through to its fields.
    Class(SymbolId),
    /// Method, constructor or initializer body.
    Method(Option<SymbolId>),
    /// Block scope (within a method).
    Block,
    /// Lambda body.
    Lambda,
}

/// A scope in the scope tree.
#[derive(Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub bindings: HashMap<String, SymbolId>,
}

/// Tree of scopes for name lookup.
///
/// The root scope is an empty file scope; every class body, method and
/// block pushes a child.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    pub fn new() -> Self {
        let root = Scope {
            id: ScopeId(0),
            parent: None,
            kind: ScopeKind::Block,
            bindings: HashMap::new(),
        };
        Self {
            scopes: vec![root],
            current: ScopeId(0),
        }
    }

    /// Push a new scope.
    pub fn push(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            parent: Some(self.current),
            kind,
            bindings: HashMap::new(),
        });
        self.current = id;
        id
    }

    /// Pop the current scope and return to parent.
    pub fn pop(&mut self) {
        if let Some(scope) = self.scopes.get(self.current.0 as usize) {
            if let Some(parent) = scope.parent {
                self.current = parent;
            }
        }
    }

    /// Define a name in the current scope, shadowing outer bindings.
    pub fn define(&mut self, name: String, symbol: SymbolId) {
        let scope = &mut self.scopes[self.current.0 as usize];
        scope.bindings.insert(name, symbol);
    }

    /// Look up a variable name in the current scope chain.
    ///
    /// Class scopes consult `in_class`, so a field of an inner class
    /// shadows locals of the method that declares it.
    pub fn lookup(
        &self,
        name: &str,
        mut in_class: impl FnMut(SymbolId) -> Option<SymbolId>,
    ) -> Option<SymbolId> {
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            let scope = self.scopes.get(id.0 as usize)?;
            if let Some(&symbol) = scope.bindings.get(name) {
                return Some(symbol);
            }
            if let ScopeKind::Class(class) = scope.kind {
                if let Some(symbol) = in_class(class) {
                    return Some(symbol);
                }
            }
            scope_id = scope.parent;
        }
        None
    }

    /// Classes enclosing the current scope, innermost first.
    pub fn enclosing_classes(&self) -> Vec<SymbolId> {
        let mut classes = Vec::new();
        let mut scope_id = Some(self.current);
        while let Some(id) = scope_id {
            let Some(scope) = self.scopes.get(id.0 as usize) else {
                break;
            };
            if let ScopeKind::Class(class) = scope.kind {
                classes.push(class);
            }
            scope_id = scope.parent;
        }
        classes
    }

    /// Innermost enclosing class.
    pub fn current_class(&self) -> Option<SymbolId> {
        self.enclosing_classes().first().copied()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_bindings_shadow_outer() {
        let mut tree = ScopeTree::new();
        tree.push(ScopeKind::Class(SymbolId(0)));
        tree.push(ScopeKind::Method(None));
        tree.define("x".into(), SymbolId(1));
        tree.push(ScopeKind::Block);
        tree.define("x".into(), SymbolId(2));
        assert_eq!(tree.lookup("x", |_| None), Some(SymbolId(2)));
        tree.pop();
        assert_eq!(tree.lookup("x", |_| None), Some(SymbolId(1)));
    }

    #[test]
    fn class_scope_consults_members() {
        let mut tree = ScopeTree::new();
        tree.push(ScopeKind::Class(SymbolId(0)));
        tree.push(ScopeKind::Method(None));
        tree.define("local".into(), SymbolId(5));
        tree.push(ScopeKind::Class(SymbolId(7)));
        let found = tree.lookup("local", |class| (class == SymbolId(7)).then_some(SymbolId(9)));
        assert_eq!(found, Some(SymbolId(9)));
        assert_eq!(tree.enclosing_classes(), vec![SymbolId(7), SymbolId(0)]);
        tree.pop();
        assert_eq!(tree.current_class(), Some(SymbolId(0)));
    }
}
