// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Options and output types for `guardcheck check`.

use guardcheck_diagnostics::json::{to_json_report, DiagnosticReport};
use guardcheck_diagnostics::Diagnostic;

/// Complete check report for a file.
#[derive(Debug)]
pub struct CheckReport {
    pub file: String,
    pub source: String,
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl CheckReport {
    pub fn to_json_report(&self) -> DiagnosticReport {
        to_json_report(&self.diagnostics, &self.source, &self.file)
    }
}

/// Options for check.
#[derive(Debug, Clone, Default)]
pub struct CheckOpts {
    /// Include rules matching these patterns (e.g., "guarded-by/*")
    pub rules: Vec<String>,
    /// Exclude rules matching these patterns
    pub excludes: Vec<String>,
    /// Report guards that do not bind as errors instead of warnings.
    pub unresolved_as_error: bool,
}
