// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `guardcheck check`: lock discipline checks over a source file.
//!
//! Parses and resolves the file, discovers its analysis units and runs the
//! selected rules. Parse errors stop checking; resolution problems are
//! reported as warnings and checking continues.

pub mod config;
pub mod guarded_by;
pub mod rules;
pub mod types;
pub mod units;

pub use config::{Config, ConfigError, CONFIG_FILE};
pub use guarded_by::GuardedByChecker;
pub use types::{CheckOpts, CheckReport};

use guardcheck_diagnostics::json::to_json_string;
use guardcheck_diagnostics::{Diagnostic, Severity, ToDiagnostic};

/// Parse source and run the selected rules.
pub fn check(source: &str, file: &str, opts: &CheckOpts) -> CheckReport {
    let parsed = guardcheck_parser::parse_compilation_unit(source);
    let mut diagnostics: Vec<Diagnostic> = parsed.errors.iter().map(|e| e.to_diagnostic()).collect();

    if parsed.is_ok() {
        let resolution = guardcheck_resolve::resolve(&parsed.unit);
        diagnostics.extend(resolution.errors.iter().map(|e| e.to_diagnostic()));

        let units = units::collect_units(&parsed.unit, &resolution);
        let mut found = rules::run_rules(&rules::RuleContext {
            source,
            resolution: &resolution,
            units: &units,
            opts,
        });
        found.sort_by_key(|d| d.primary_span().map(|s| s.start));
        diagnostics.append(&mut found);
    } else {
        log::debug!("{}: skipping rules after {} parse errors", file, parsed.errors.len());
    }

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    CheckReport {
        file: file.to_string(),
        source: source.to_string(),
        success: error_count == 0,
        diagnostics,
        error_count,
        warning_count,
    }
}

/// Serialize a check report to JSON.
pub fn check_json(report: &CheckReport) -> String {
    to_json_string(&[report.to_json_report()])
}
