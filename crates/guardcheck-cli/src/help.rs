// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text for CLI commands.

use crate::output;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_usage() {
    println!(
        "{} {} - @GuardedBy lock discipline checker",
        output::title("guardcheck"),
        output::version(VERSION)
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("guardcheck"),
        output::arg("<command>"),
        output::arg("[args]")
    );
    println!();
    println!("{}", output::section_header("Commands:"));
    println!("  {} {}  Check lock discipline of Java sources", output::command("check"), output::arg("<file|dir>"));
    println!("  {} {}       Show required and held locks at each guarded access", output::command("locks"), output::arg("<file>"));
    println!("  {} {}       Parse a file and print its AST", output::command("parse"), output::arg("<file>"));
    println!("  {} {}     Explain a diagnostic code", output::command("explain"), output::arg("<code>"));
    println!("  {}              Show this help", output::command("help"));
    println!("  {}           Show version", output::command("version"));

    println!();
    println!("{}", output::section_header("Check options:"));
    println!("  {}   Output format (default: human)", output::arg("--format human|json"));
    println!("  {}     Only run rules matching a pattern (repeatable)", output::arg("--rule <pattern>"));
    println!("  {}  Skip rules matching a pattern (repeatable)", output::arg("--exclude <pattern>"));
    println!("  {}      Read options from a config file", output::arg("--config <file>"));
    println!("  {}    Report unusable guards as errors", output::arg("--unresolved-as-error"));

    println!();
    println!("{}", output::section_header("Rules:"));
    for rule in guardcheck_lint::rules::all_rules() {
        println!("  {:<30} {}", output::command(rule.id), rule.summary);
    }

    println!();
    println!("{}", output::section_header("Environment:"));
    println!("  {}   Log filter, e.g. `debug` (default: warn)", output::arg("GUARDCHECK_LOG"));
    println!("  {}         Disable colored output", output::arg("NO_COLOR"));
    println!("  {}      Force colored output", output::arg("FORCE_COLOR"));
}

pub fn print_check_usage() {
    eprintln!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("guardcheck check"),
        output::arg("<file|dir>"),
        output::arg("[--format human|json] [--rule <pattern>]... [--exclude <pattern>]... [--config <file>]")
    );
}
