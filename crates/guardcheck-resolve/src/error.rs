// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolution error types.

use guardcheck_ast::Span;
use thiserror::Error;

/// A name resolution error.
///
/// Resolution problems never stop checking; they are reported as warnings.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
}

impl ResolveError {
    pub fn duplicate_class(name: String, span: Span, previous: Span) -> Self {
        Self {
            kind: ResolveErrorKind::DuplicateClass { name, previous },
            span,
        }
    }

    pub fn duplicate_field(name: String, span: Span, previous: Span) -> Self {
        Self {
            kind: ResolveErrorKind::DuplicateField { name, previous },
            span,
        }
    }

    pub fn cyclic_inheritance(name: String, span: Span) -> Self {
        Self {
            kind: ResolveErrorKind::CyclicInheritance { name },
            span,
        }
    }
}

/// The kind of resolution error.
#[derive(Debug, Clone, Error)]
pub enum ResolveErrorKind {
    #[error("duplicate class: {name} (previously defined at {previous:?})")]
    DuplicateClass { name: String, previous: Span },

    #[error("duplicate field: {name} (previously defined at {previous:?})")]
    DuplicateField { name: String, previous: Span },

    #[error("cyclic inheritance involving {name}")]
    CyclicInheritance { name: String },
}
