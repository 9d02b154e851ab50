// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Built-in model of the library lock types.
//!
//! Only the members the lock analysis looks at are modeled. Built-in
//! classes are found by qualified name, and by simple name when no class
//! of the compilation unit or its imports claims that name.

use crate::symbol::{SymbolId, SymbolKind};
use crate::Resolution;
use guardcheck_ast::decl::ClassKind;
use guardcheck_ast::Span;

pub const OBJECT: &str = "java.lang.Object";
pub const LOCK: &str = "java.util.concurrent.locks.Lock";
pub const READ_WRITE_LOCK: &str = "java.util.concurrent.locks.ReadWriteLock";
pub const MONITOR: &str = "com.google.common.util.concurrent.Monitor";

struct BuiltinClass {
    qualified: &'static str,
    kind: ClassKind,
    supertypes: &'static [&'static str],
    /// Zero-argument methods as `(name, return type)`.
    methods: &'static [(&'static str, &'static str)],
}

const CLASSES: &[BuiltinClass] = &[
    BuiltinClass {
        qualified: OBJECT,
        kind: ClassKind::Class,
        supertypes: &[],
        methods: &[],
    },
    BuiltinClass {
        qualified: LOCK,
        kind: ClassKind::Interface,
        supertypes: &[],
        methods: &[
            ("lock", "void"),
            ("lockInterruptibly", "void"),
            ("tryLock", "boolean"),
            ("unlock", "void"),
            ("newCondition", "java.util.concurrent.locks.Condition"),
        ],
    },
    BuiltinClass {
        qualified: "java.util.concurrent.locks.Condition",
        kind: ClassKind::Interface,
        supertypes: &[],
        methods: &[("await", "void"), ("signal", "void"), ("signalAll", "void")],
    },
    BuiltinClass {
        qualified: "java.util.concurrent.locks.ReentrantLock",
        kind: ClassKind::Class,
        supertypes: &[LOCK],
        methods: &[("isHeldByCurrentThread", "boolean"), ("isLocked", "boolean")],
    },
    BuiltinClass {
        qualified: READ_WRITE_LOCK,
        kind: ClassKind::Interface,
        supertypes: &[],
        methods: &[("readLock", LOCK), ("writeLock", LOCK)],
    },
    BuiltinClass {
        qualified: "java.util.concurrent.locks.ReentrantReadWriteLock",
        kind: ClassKind::Class,
        supertypes: &[READ_WRITE_LOCK],
        methods: &[("isWriteLocked", "boolean")],
    },
    BuiltinClass {
        qualified: MONITOR,
        kind: ClassKind::Class,
        supertypes: &[],
        methods: &[
            ("enter", "void"),
            ("leave", "void"),
            ("tryEnter", "boolean"),
            ("isOccupiedByCurrentThread", "boolean"),
        ],
    },
];

/// Declare the built-in classes into a fresh resolution.
pub(crate) fn install(out: &mut Resolution) {
    let mut declared: Vec<(SymbolId, &BuiltinClass)> = Vec::with_capacity(CLASSES.len());

    for class in CLASSES {
        let simple = class.qualified.rsplit('.').next().unwrap_or(class.qualified);
        let id = out.symbols.insert(
            simple.to_string(),
            SymbolKind::Class {
                outer: None,
                is_static: false,
                kind: class.kind,
                qualified_name: class.qualified.to_string(),
                superclass: None,
                interfaces: Vec::new(),
            },
            None,
            None,
            Span::default(),
        );
        out.by_qualified.insert(class.qualified.to_string(), id);
        out.builtins.insert(simple.to_string(), id);

        for (name, ret) in class.methods {
            let method = out.symbols.insert(
                name.to_string(),
                SymbolKind::Method {
                    owner: id,
                    is_static: false,
                    is_synchronized: false,
                    arity: 0,
                },
                Some(ret.to_string()),
                None,
                Span::default(),
            );
            out.members_mut(id)
                .methods
                .entry(name.to_string())
                .or_default()
                .push(method);
        }
        declared.push((id, class));
    }

    for (id, class) in declared {
        let supers: Vec<SymbolId> = class
            .supertypes
            .iter()
            .filter_map(|q| out.by_qualified.get(*q).copied())
            .collect();
        if let Some(symbol) = out.symbols.get_mut(id) {
            if let SymbolKind::Class { interfaces, .. } = &mut symbol.kind {
                *interfaces = supers;
            }
        }
    }
}
