// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from front-end error types to `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for guardcheck_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(&self.message)
            .with_code("E0001")
            .with_primary(self.span, "invalid token");

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }

        diag
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for guardcheck_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(&self.message)
            .with_code("E0100")
            .with_primary(self.span, "here");

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }

        diag
    }
}

// ============================================================================
// Resolve Errors
// ============================================================================

/// Resolution problems never stop checking, so they surface as warnings.
impl ToDiagnostic for guardcheck_resolve::ResolveError {
    fn to_diagnostic(&self) -> Diagnostic {
        use guardcheck_resolve::ResolveErrorKind::*;

        match &self.kind {
            DuplicateClass { name, previous } => {
                Diagnostic::warning(format!("duplicate class: `{}`", name))
                    .with_code("E0201")
                    .with_primary(self.span, "redefined here")
                    .with_secondary(*previous, "previously defined here")
            }

            DuplicateField { name, previous } => {
                Diagnostic::warning(format!("duplicate field: `{}`", name))
                    .with_code("E0202")
                    .with_primary(self.span, "redefined here")
                    .with_secondary(*previous, "previously defined here")
                    .with_note("accesses resolve to the first declaration")
            }

            CyclicInheritance { name } => {
                Diagnostic::warning(format!("cyclic inheritance involving `{}`", name))
                    .with_code("E0203")
                    .with_primary(self.span, "cycle detected here")
                    .with_note("the supertype closing the cycle is ignored")
            }
        }
    }
}
