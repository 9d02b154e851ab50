// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Each diagnostic carries exact locations (line/col) and the source line
//! it points at, so editors and scripts need not re-read the file.
//! Selected with `guardcheck check --format json`.

use serde::Serialize;

use guardcheck_ast::LineMap;

use crate::{codes::ErrorCodeRegistry, Diagnostic, LabelStyle, Severity};

/// The JSON report for one checked file.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// The file that was checked.
    pub file: String,
    /// Whether the file produced no errors.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form, enriched with source context.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// "error", "warning", or "note".
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Code category (e.g., "Syntax", "Locking").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    /// Primary source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// A source location with line/column (1-based).
#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
    pub source_line: String,
}

/// A labeled span in JSON form.
#[derive(Debug, Serialize)]
pub struct JsonLabel {
    /// "primary" or "secondary".
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: LineCol,
    pub end: LineCol,
}

/// Line/column pair (1-based).
#[derive(Debug, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

/// Convert diagnostics for one file to a JSON report.
pub fn to_json_report(diagnostics: &[Diagnostic], source: &str, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let line_map = LineMap::new(source);
    let ctx = JsonContext {
        source,
        line_map: &line_map,
        registry: &registry,
    };

    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics: diagnostics.iter().map(|d| ctx.diagnostic(d)).collect(),
        error_count,
        warning_count,
    }
}

struct JsonContext<'a> {
    source: &'a str,
    line_map: &'a LineMap,
    registry: &'a ErrorCodeRegistry,
}

impl JsonContext<'_> {
    fn diagnostic(&self, diag: &Diagnostic) -> JsonDiagnostic {
        let severity = match diag.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };

        let code = diag.code.as_ref().map(|c| c.0.clone());
        let category = code
            .as_ref()
            .and_then(|c| self.registry.get(c))
            .map(|info| info.category.to_string());

        let location = diag.primary_span().map(|span| {
            let (line, column) = self.line_map.line_col(span.start);
            SourceLocation {
                line,
                column,
                byte_offset: span.start,
                source_line: self.line_map.line_text(self.source, line).unwrap_or("").to_string(),
            }
        });

        let labels = diag
            .labels
            .iter()
            .map(|l| JsonLabel {
                role: match l.style {
                    LabelStyle::Primary => "primary".to_string(),
                    LabelStyle::Secondary => "secondary".to_string(),
                },
                message: l.message.clone(),
                start: self.line_col(l.span.start),
                end: self.line_col(l.span.end),
            })
            .collect();

        JsonDiagnostic {
            severity: severity.to_string(),
            code,
            category,
            message: diag.message.clone(),
            location,
            labels,
            notes: diag.notes.clone(),
            help: diag.help.as_ref().map(|h| h.message.clone()),
        }
    }

    fn line_col(&self, offset: usize) -> LineCol {
        let (line, column) = self.line_map.line_col(offset);
        LineCol {
            line,
            column,
            byte_offset: offset,
        }
    }
}

/// Serialize reports to pretty JSON: a single object for one file, an
/// array otherwise.
pub fn to_json_string(reports: &[DiagnosticReport]) -> String {
    let result = match reports {
        [single] => serde_json::to_string_pretty(single),
        _ => serde_json::to_string_pretty(reports),
    };
    result.unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
