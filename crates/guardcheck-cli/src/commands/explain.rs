// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `guardcheck explain <code>`.

use std::process;

use colored::Colorize;
use guardcheck_diagnostics::codes::ErrorCodeRegistry;

use crate::output;

pub fn cmd_explain(code: &str) {
    let registry = ErrorCodeRegistry::default();

    let Some(info) = registry.get(code) else {
        eprintln!("{}: unknown code `{}`", output::error_label(), code);
        eprintln!();
        let mut known: Vec<&str> = registry.all().map(|info| info.code).collect();
        known.sort();
        eprintln!("Known codes: {}", known.join(", "));
        process::exit(1);
    };

    println!("{}: {}", info.code.bold(), info.title);
    println!();
    println!("  Category: {}", info.category);
    println!();
    println!("  Run `guardcheck check <file>` to see it in context.");
}
