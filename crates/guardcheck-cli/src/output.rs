// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal styling for the guardcheck commands.
//!
//! Honors NO_COLOR and FORCE_COLOR; otherwise `colored` decides based on
//! whether the stream is a terminal.

use colored::{ColoredString, Colorize};

pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn file_path(path: &str) -> ColoredString {
    path.underline()
}

// === check ===

/// Closing line of `guardcheck check` in human mode.
pub fn check_summary(errors: usize, warnings: usize) -> String {
    if errors == 0 && warnings == 0 {
        return format!("{} No lock discipline issues found", "✓".green());
    }
    let mark = if errors > 0 { "✗".red() } else { "✗".yellow() };
    format!("{} {} error(s), {} warning(s)", mark, errors, warnings)
}

// === parse / locks ===

pub fn parse_ok(types: usize) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("Parse: {} types OK", types).green().bold(),
        "===".dimmed()
    )
}

pub fn parse_failed(errors: usize) -> String {
    let msg = match errors {
        1 => "Parse FAILED: 1 error".to_string(),
        n => format!("Parse FAILED: {} errors", n),
    };
    format!("{} {} {}", "===".dimmed(), msg.red().bold(), "===".dimmed())
}

pub fn unit_header(name: &str) -> ColoredString {
    name.bold()
}

/// One traced access: `✓ 9:9 count requires this, held {this}`.
pub fn access_line(
    (line, col): (usize, usize),
    access: &str,
    required: &str,
    held: &str,
    satisfied: bool,
) -> String {
    let mark = if satisfied { "✓".green() } else { "✗".red() };
    format!(
        "  {} {}:{} {} requires {}, held {}",
        mark,
        line,
        col,
        access,
        required.cyan(),
        held
    )
}

// === help ===

pub fn title(name: &str) -> ColoredString {
    name.bold()
}

pub fn version(v: &str) -> ColoredString {
    v.dimmed()
}

pub fn section_header(header: &str) -> ColoredString {
    header.yellow().bold()
}

pub fn command(name: &str) -> ColoredString {
    name.green()
}

pub fn arg(name: &str) -> ColoredString {
    name.cyan()
}
