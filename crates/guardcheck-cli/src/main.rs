// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! guardcheck CLI.

mod commands;
mod help;
mod output;

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use guardcheck_diagnostics::formatter::DiagnosticFormatter;
use guardcheck_diagnostics::json::{to_json_report, to_json_string};
use guardcheck_diagnostics::Diagnostic;

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

impl Format {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "human" => Ok(Format::Human),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format `{}` (expected human or json)", other)),
        }
    }
}

/// Arguments of `guardcheck check`.
#[derive(Debug, PartialEq, Eq)]
pub struct CheckArgs {
    pub path: String,
    pub format: Format,
    pub rules: Vec<String>,
    pub excludes: Vec<String>,
    pub config: Option<PathBuf>,
    pub unresolved_as_error: bool,
}

fn parse_check_args(args: &[String]) -> Result<CheckArgs, String> {
    let mut path = None;
    let mut format = Format::Human;
    let mut rules = Vec::new();
    let mut excludes = Vec::new();
    let mut config = None;
    let mut unresolved_as_error = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{} expects a value", flag))
        };
        match arg.as_str() {
            "--format" => format = Format::parse(&value("--format")?)?,
            "--json" => format = Format::Json,
            "--rule" => rules.push(value("--rule")?),
            "--exclude" => excludes.push(value("--exclude")?),
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--unresolved-as-error" => unresolved_as_error = true,
            flag if flag.starts_with("--") => return Err(format!("unknown option `{}`", flag)),
            _ if path.is_some() => return Err(format!("unexpected argument `{}`", arg)),
            _ => path = Some(arg.clone()),
        }
    }

    Ok(CheckArgs {
        path: path.ok_or("missing <file|dir>")?,
        format,
        rules,
        excludes,
        config,
        unresolved_as_error,
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("GUARDCHECK_LOG", "warn"))
        .format_timestamp(None)
        .init();
    output::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        help::print_usage();
        return;
    }

    match args[1].as_str() {
        "check" => match parse_check_args(&args[2..]) {
            Ok(check_args) => commands::check::cmd_check(check_args),
            Err(msg) => {
                eprintln!("{}: {}", output::error_label(), msg);
                help::print_check_usage();
                process::exit(1);
            }
        },
        "locks" => commands::inspect::cmd_locks(require_file(&args, "locks")),
        "parse" => commands::inspect::cmd_parse(require_file(&args, "parse")),
        "explain" => commands::explain::cmd_explain(require_file(&args, "explain")),
        "help" | "--help" | "-h" => help::print_usage(),
        "version" | "--version" | "-V" => println!("guardcheck {}", help::VERSION),
        other => {
            eprintln!("{}: unknown command `{}`", output::error_label(), other);
            eprintln!("Run `guardcheck help` for available commands.");
            process::exit(1);
        }
    }
}

fn require_file<'a>(args: &'a [String], command: &str) -> &'a str {
    match args.get(2) {
        Some(arg) => arg,
        None => {
            eprintln!("{}: missing argument", output::error_label());
            eprintln!("Usage: guardcheck {} <arg>", command);
            process::exit(1);
        }
    }
}

/// Read a source file, exiting with an error message on failure.
pub fn read_source(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: reading {}: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    }
}

/// Print diagnostics for one file in the requested format.
pub fn show_diagnostics(diags: &[Diagnostic], source: &str, path: &str, format: Format) {
    match format {
        Format::Human => {
            let formatter = DiagnosticFormatter::new(source).with_file_name(path);
            for diag in diags {
                eprintln!("{}", formatter.format(diag));
            }
        }
        Format::Json => {
            println!("{}", to_json_string(&[to_json_report(diags, source, path)]));
        }
    }
}

/// All `.java` files under `dir`, sorted.
pub fn collect_java_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        log::warn!("cannot read directory {}", dir.display());
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_java_files(&path));
        } else if path.extension().is_some_and(|ext| ext == "java") {
            files.push(path);
        }
    }
    files.sort();
    files
}
