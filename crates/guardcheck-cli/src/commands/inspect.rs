// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Inspection commands: parse, locks.

use std::process;

use colored::Colorize;
use guardcheck_ast::decl::CompilationUnit;
use guardcheck_ast::expr::Expr;
use guardcheck_ast::LineMap;
use guardcheck_diagnostics::{Diagnostic, ToDiagnostic};
use guardcheck_lint::units::collect_units;
use guardcheck_locks::{analyze, AnalysisUnit, HeldLockSet, LockEventListener, LockExpr};
use guardcheck_resolve::{Resolution, SymbolId, SymbolResolver};

use crate::{output, read_source, show_diagnostics, Format};

/// Parse `path`, printing errors and exiting if it does not parse.
fn parse_or_exit(path: &str, source: &str) -> CompilationUnit {
    let parsed = guardcheck_parser::parse_compilation_unit(source);
    if !parsed.is_ok() {
        let diags: Vec<Diagnostic> = parsed.errors.iter().map(|e| e.to_diagnostic()).collect();
        show_diagnostics(&diags, source, path, Format::Human);
        eprintln!("{}", output::parse_failed(diags.len()));
        process::exit(1);
    }
    parsed.unit
}

pub fn cmd_parse(path: &str) {
    let source = read_source(path);
    let unit = parse_or_exit(path, &source);

    if let Some(package) = &unit.package {
        println!("package {}", package);
    }
    for import in &unit.imports {
        println!("import {}", import.path);
    }
    for (i, class) in unit.types.iter().enumerate() {
        println!("{} Type {}: {} {}", "---".dimmed(), i + 1, class.name, "---".dimmed());
        println!("{:#?}", class);
        println!();
    }
    println!("{}", output::parse_ok(unit.types.len()));
}

pub fn cmd_locks(path: &str) {
    let source = read_source(path);
    let unit = parse_or_exit(path, &source);
    let resolution = guardcheck_resolve::resolve(&unit);
    if !resolution.errors.is_empty() {
        let diags: Vec<Diagnostic> = resolution.errors.iter().map(|e| e.to_diagnostic()).collect();
        show_diagnostics(&diags, &source, path, Format::Human);
    }

    let units = collect_units(&unit, &resolution);
    let mut printer = AccessPrinter {
        source: &source,
        lines: LineMap::new(&source),
        accesses: 0,
        unheld: 0,
    };

    for body in &units.bodies {
        println!("{}", output::unit_header(&describe_unit(body, &resolution)));
        analyze(*body, &resolution, &mut printer);
    }

    println!();
    println!(
        "{} guarded accesses, {} without their lock",
        printer.accesses, printer.unheld
    );
}

fn class_name(resolution: &Resolution, class: SymbolId) -> String {
    resolution
        .symbol(class)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "<unknown>".to_string())
}

fn describe_unit(unit: &AnalysisUnit<'_>, resolution: &Resolution) -> String {
    let class = class_name(resolution, unit.class());
    match unit {
        AnalysisUnit::Method { decl, .. } => format!("{}.{}()", class, decl.name),
        AnalysisUnit::Initializer { .. } => format!("{} initializer", class),
        AnalysisUnit::Lambda { .. } => format!("lambda in {}", class),
    }
}

/// Prints one line per guarded access.
struct AccessPrinter<'s> {
    source: &'s str,
    lines: LineMap,
    accesses: usize,
    unheld: usize,
}

impl LockEventListener for AccessPrinter<'_> {
    fn handle_guarded_access(&mut self, access: &Expr, required: &LockExpr, held: &HeldLockSet) {
        let text = self.source.get(access.span.start..access.span.end).unwrap_or("?");
        let satisfied = held.contains(required);
        self.accesses += 1;
        if !satisfied {
            self.unheld += 1;
        }
        println!(
            "{}",
            output::access_line(
                self.lines.line_col(access.span.start),
                text,
                &required.to_string(),
                &held.to_string(),
                satisfied,
            )
        );
    }
}
