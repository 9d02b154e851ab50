// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol definitions and symbol table.

use guardcheck_ast::decl::ClassKind;
use guardcheck_ast::Span;

/// Unique identifier for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// The kind of symbol.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// A class, interface, enum, or anonymous class.
    Class {
        /// Lexically enclosing class, if any.
        outer: Option<SymbolId>,
        is_static: bool,
        kind: ClassKind,
        /// Dotted name (`com.example.Outer.Inner`); local and anonymous
        /// classes use `Outer$1`.
        qualified_name: String,
        superclass: Option<SymbolId>,
        interfaces: Vec<SymbolId>,
    },
    /// A field or enum constant.
    Field { owner: SymbolId, is_static: bool },
    /// A method or constructor.
    Method {
        owner: SymbolId,
        is_static: bool,
        is_synchronized: bool,
        arity: usize,
    },
    /// A method, constructor, lambda or catch parameter.
    Parameter {
        /// Class whose code declares the parameter.
        class: SymbolId,
    },
    /// A local variable or try resource.
    Local {
        /// Class whose code declares the local.
        class: SymbolId,
    },
}

/// A declared symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type as written; the return type for methods.
    pub ty: Option<String>,
    /// Raw `@GuardedBy` string on fields and methods.
    pub guard: Option<String>,
    /// Where this symbol was declared.
    pub span: Span,
}

impl Symbol {
    /// Declaring class of a field or method.
    pub fn owner(&self) -> Option<SymbolId> {
        match self.kind {
            SymbolKind::Field { owner, .. } | SymbolKind::Method { owner, .. } => Some(owner),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, SymbolKind::Class { .. })
    }

    pub fn is_static(&self) -> bool {
        match self.kind {
            SymbolKind::Class { is_static, .. }
            | SymbolKind::Field { is_static, .. }
            | SymbolKind::Method { is_static, .. } => is_static,
            SymbolKind::Parameter { .. } | SymbolKind::Local { .. } => false,
        }
    }

    pub fn is_synchronized(&self) -> bool {
        matches!(self.kind, SymbolKind::Method { is_synchronized: true, .. })
    }

    /// Whether this is a local variable or parameter.
    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Parameter { .. } | SymbolKind::Local { .. })
    }

    /// Class in whose context the declared type is resolved.
    pub fn context_class(&self) -> Option<SymbolId> {
        match self.kind {
            SymbolKind::Class { .. } => Some(self.id),
            SymbolKind::Field { owner, .. } | SymbolKind::Method { owner, .. } => Some(owner),
            SymbolKind::Parameter { class } | SymbolKind::Local { class } => Some(class),
        }
    }
}

/// Table of all symbols in a program.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { symbols: Vec::new() }
    }

    /// Insert a new symbol and return its ID.
    pub fn insert(
        &mut self,
        name: String,
        kind: SymbolKind,
        ty: Option<String>,
        guard: Option<String>,
        span: Span,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name,
            kind,
            ty,
            guard,
            span,
        });
        id
    }

    /// Get a symbol by ID.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Get a mutable reference to a symbol by ID.
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    /// Iterate over all symbols.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// The class name a declared type refers to, without type arguments.
///
/// Returns `None` for primitives and arrays, which never name a lock class.
pub fn base_type_name(ty: &str) -> Option<&str> {
    if ty.ends_with(']') || ty.ends_with("...") {
        return None;
    }
    let base = match ty.find('<') {
        Some(idx) => &ty[..idx],
        None => ty,
    };
    if base.is_empty() || PRIMITIVES.contains(&base) {
        return None;
    }
    Some(base)
}
