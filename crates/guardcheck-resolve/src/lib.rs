// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Name resolution for the Java subset checked by guardcheck.
//!
//! This crate resolves identifiers, member selects, method invocations,
//! qualified `this` and class literals to their declarations, producing a
//! mapping from AST NodeIds to SymbolIds. Declarations are recorded in the
//! same map: the id of a `ClassDecl`, `MethodDecl`, field declarator or
//! parameter maps to the symbol it declares.
//!
//! The lock analysis consumes resolution through [`SymbolResolver`].

mod builtins;
mod error;
mod resolver;
mod scope;
mod symbol;

pub use builtins::{LOCK, MONITOR, OBJECT, READ_WRITE_LOCK};
pub use error::{ResolveError, ResolveErrorKind};
pub use resolver::Resolver;
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{base_type_name, Symbol, SymbolId, SymbolKind, SymbolTable};

use guardcheck_ast::decl::CompilationUnit;
use guardcheck_ast::NodeId;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Resolution queries the lock analysis depends on.
///
/// Implementations are shared read-only between analysis units.
pub trait SymbolResolver: Sync {
    /// Symbol data by id.
    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// The symbol a name, select, call, `X.this` or class-literal node
    /// resolved to.
    fn resolution(&self, node: NodeId) -> Option<SymbolId>;

    /// A type by simple, nested (`Outer.Inner`) or qualified name, as seen
    /// from code in `from_class`.
    fn find_type(&self, from_class: SymbolId, name: &str) -> Option<SymbolId>;

    /// A field or method declared in `class` or inherited; fields win.
    fn find_member(&self, class: SymbolId, name: &str) -> Option<SymbolId>;

    /// A method of `class` (or a supertype) with the given arity, falling
    /// back to any method of that name.
    fn find_method(&self, class: SymbolId, name: &str, arity: usize) -> Option<SymbolId>;

    /// Declared type of a field, variable or method return, as a class.
    fn type_of(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// Lexically enclosing class.
    fn outer_class(&self, class: SymbolId) -> Option<SymbolId>;

    /// Whether `class` is, or inherits from, the class named `qualified_name`.
    fn is_subtype(&self, class: SymbolId, qualified_name: &str) -> bool;

    /// Whether `ancestor` is `class` or one of its supertypes.
    fn is_subclass(&self, class: SymbolId, ancestor: SymbolId) -> bool;
}

/// Members declared directly in one class.
#[derive(Debug, Default)]
pub(crate) struct ClassMembers {
    pub fields: IndexMap<String, SymbolId>,
    pub methods: IndexMap<String, Vec<SymbolId>>,
    pub classes: IndexMap<String, SymbolId>,
}

/// The result of name resolution for one compilation unit.
#[derive(Debug, Default)]
pub struct Resolution {
    /// All symbols, including the built-in library classes.
    pub symbols: SymbolTable,
    /// Mapping from AST nodes to their resolved or declared symbols.
    pub resolutions: HashMap<NodeId, SymbolId>,
    /// Problems found; never fatal.
    pub errors: Vec<ResolveError>,
    package: Option<String>,
    members: HashMap<SymbolId, ClassMembers>,
    top_level: IndexMap<String, SymbolId>,
    by_qualified: HashMap<String, SymbolId>,
    builtins: HashMap<String, SymbolId>,
    /// Single-type imports: simple name to qualified name.
    imports: HashMap<String, String>,
}

/// Resolve all names in a compilation unit.
pub fn resolve(unit: &CompilationUnit) -> Resolution {
    Resolver::resolve(unit)
}

impl Resolution {
    pub(crate) fn new(package: Option<String>) -> Self {
        Self {
            package,
            ..Self::default()
        }
    }

    pub(crate) fn members_mut(&mut self, class: SymbolId) -> &mut ClassMembers {
        self.members.entry(class).or_default()
    }

    /// Top-level classes of the unit, in declaration order.
    pub fn top_level_classes(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.top_level.values().copied()
    }

    pub fn qualified_name(&self, class: SymbolId) -> Option<&str> {
        match &self.symbols.get(class)?.kind {
            SymbolKind::Class { qualified_name, .. } => Some(qualified_name),
            _ => None,
        }
    }

    pub fn superclass(&self, class: SymbolId) -> Option<SymbolId> {
        match &self.symbols.get(class)?.kind {
            SymbolKind::Class { superclass, .. } => *superclass,
            _ => None,
        }
    }

    /// `class` followed by all its supertypes, breadth first.
    pub fn ancestors(&self, class: SymbolId) -> Vec<SymbolId> {
        let mut seen = vec![class];
        let mut next = 0;
        while next < seen.len() {
            if let Some(SymbolKind::Class { superclass, interfaces, .. }) =
                self.symbols.get(seen[next]).map(|s| &s.kind)
            {
                for &sup in superclass.iter().chain(interfaces) {
                    if !seen.contains(&sup) {
                        seen.push(sup);
                    }
                }
            }
            next += 1;
        }
        seen
    }

    /// A field declared in `class` or inherited.
    pub fn find_field(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.ancestors(class)
            .into_iter()
            .find_map(|c| self.members.get(&c)?.fields.get(name).copied())
    }

    /// A member class declared in `class` or inherited.
    pub fn member_class(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.ancestors(class)
            .into_iter()
            .find_map(|c| self.members.get(&c)?.classes.get(name).copied())
    }

    pub(crate) fn direct_member_class(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.members.get(&class)?.classes.get(name).copied()
    }

    pub(crate) fn direct_field(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        self.members.get(&class)?.fields.get(name).copied()
    }

    fn find_qualified(&self, name: &str) -> Option<SymbolId> {
        if let Some(&id) = self.by_qualified.get(name) {
            return Some(id);
        }
        let package = self.package.as_ref()?;
        self.by_qualified.get(&format!("{}.{}", package, name)).copied()
    }
}

impl SymbolResolver for Resolution {
    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    fn resolution(&self, node: NodeId) -> Option<SymbolId> {
        self.resolutions.get(&node).copied()
    }

    fn find_type(&self, from_class: SymbolId, name: &str) -> Option<SymbolId> {
        if let Some((head, rest)) = name.split_once('.') {
            if let Some(id) = self.find_qualified(name) {
                return Some(id);
            }
            let mut class = self.find_type(from_class, head)?;
            for segment in rest.split('.') {
                class = self.member_class(class, segment)?;
            }
            return Some(class);
        }

        let mut current = Some(from_class);
        while let Some(class) = current {
            if self.symbols.get(class).is_some_and(|s| s.name == name) {
                return Some(class);
            }
            if let Some(nested) = self.member_class(class, name) {
                return Some(nested);
            }
            current = self.outer_class(class);
        }

        self.top_level
            .get(name)
            .copied()
            .or_else(|| self.imports.get(name).and_then(|q| self.by_qualified.get(q).copied()))
            .or_else(|| self.builtins.get(name).copied())
            .or_else(|| self.by_qualified.get(name).copied())
    }

    fn find_member(&self, class: SymbolId, name: &str) -> Option<SymbolId> {
        let ancestors = self.ancestors(class);
        ancestors
            .iter()
            .find_map(|c| self.members.get(c)?.fields.get(name).copied())
            .or_else(|| {
                ancestors.iter().find_map(|c| {
                    self.members.get(c)?.methods.get(name)?.first().copied()
                })
            })
    }

    fn find_method(&self, class: SymbolId, name: &str, arity: usize) -> Option<SymbolId> {
        let ancestors = self.ancestors(class);
        let candidates = || {
            ancestors
                .iter()
                .filter_map(|c| self.members.get(c)?.methods.get(name))
                .flatten()
                .copied()
        };
        candidates()
            .find(|&m| {
                matches!(
                    self.symbols.get(m).map(|s| &s.kind),
                    Some(SymbolKind::Method { arity: a, .. }) if *a == arity
                )
            })
            .or_else(|| candidates().next())
    }

    fn type_of(&self, symbol: SymbolId) -> Option<SymbolId> {
        let sym = self.symbols.get(symbol)?;
        if sym.is_class() {
            return None;
        }
        let name = base_type_name(sym.ty.as_deref()?)?;
        self.find_type(sym.context_class()?, name)
    }

    fn outer_class(&self, class: SymbolId) -> Option<SymbolId> {
        match &self.symbols.get(class)?.kind {
            SymbolKind::Class { outer, .. } => *outer,
            _ => None,
        }
    }

    fn is_subtype(&self, class: SymbolId, qualified_name: &str) -> bool {
        self.ancestors(class)
            .into_iter()
            .any(|c| self.qualified_name(c) == Some(qualified_name))
    }

    fn is_subclass(&self, class: SymbolId, ancestor: SymbolId) -> bool {
        self.ancestors(class).contains(&ancestor)
    }
}
