// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lock analysis errors.

use thiserror::Error;

/// A guard that does not denote a supported lock expression.
///
/// Always recoverable: the offending guard or access is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid @GuardedBy expression: {text}")]
pub struct IllegalGuardedBy {
    /// The guard text, or a rendering of the expression that failed to bind.
    pub text: String,
}

impl IllegalGuardedBy {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
