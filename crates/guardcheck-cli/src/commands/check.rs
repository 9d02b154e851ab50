// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `guardcheck check`: run the lock discipline rules over files.

use std::path::{Path, PathBuf};
use std::process;

use guardcheck_diagnostics::json::to_json_string;
use guardcheck_lint::{CheckOpts, Config, ConfigError};

use crate::{collect_java_files, output, show_diagnostics, CheckArgs, Format};

pub fn cmd_check(args: CheckArgs) {
    let root = Path::new(&args.path);
    let files: Vec<PathBuf> = if root.is_dir() {
        collect_java_files(root)
    } else {
        vec![root.to_path_buf()]
    };

    if files.is_empty() {
        eprintln!("{}: no .java files found in {}", output::error_label(), output::file_path(&args.path));
        process::exit(1);
    }

    let opts = match load_opts(&args, root) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            process::exit(1);
        }
    };
    log::debug!("checking {} files with {:?}", files.len(), opts);

    let mut total_errors = 0;
    let mut total_warnings = 0;
    let mut reports = Vec::new();

    for file in &files {
        let name = file.display().to_string();
        let source = match std::fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: reading {}: {}", output::error_label(), output::file_path(&name), e);
                total_errors += 1;
                continue;
            }
        };

        let report = guardcheck_lint::check(&source, &name, &opts);
        total_errors += report.error_count;
        total_warnings += report.warning_count;

        match args.format {
            Format::Human => show_diagnostics(&report.diagnostics, &report.source, &name, Format::Human),
            Format::Json => reports.push(report.to_json_report()),
        }
    }

    match args.format {
        Format::Json => println!("{}", to_json_string(&reports)),
        Format::Human if total_errors == 0 && total_warnings == 0 => {
            println!("{}", output::check_summary(0, 0));
        }
        Format::Human => eprintln!("{}", output::check_summary(total_errors, total_warnings)),
    }

    if total_errors > 0 {
        process::exit(1);
    }
}

/// Config file options, extended by command-line flags.
fn load_opts(args: &CheckArgs, root: &Path) -> Result<CheckOpts, ConfigError> {
    let config = match &args.config {
        Some(path) => Some(Config::load(path)?),
        None if root.is_dir() => Config::discover(root)?,
        None => match root.parent() {
            Some(dir) => Config::discover(dir)?,
            None => None,
        },
    };

    let mut opts = config.unwrap_or_default().into_opts();
    opts.rules.extend(args.rules.iter().cloned());
    opts.excludes.extend(args.excludes.iter().cloned());
    opts.unresolved_as_error |= args.unresolved_as_error;
    Ok(opts)
}
