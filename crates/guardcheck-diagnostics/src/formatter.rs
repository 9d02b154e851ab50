// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rich terminal formatter for diagnostics.
//!
//! Produces multi-line, color-coded output:
//!
//! ```text
//! error[guarded-by/unguarded-access]: access to `balance` requires `this.mu`
//!   --> Account.java:9:9
//!    |
//!  9 |         balance -= 1;
//!    |         ^^^^^^^ `this.mu` is not held here
//!    |
//!    = note: held locks: {}
//! ```

use std::collections::BTreeMap;

use colored::Colorize;

use guardcheck_ast::LineMap;

use crate::{Diagnostic, Help, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: None,
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();

        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let Some(primary) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic);
            return out;
        };
        if annotated.is_empty() {
            self.format_footer(&mut out, diagnostic);
            return out;
        }

        let file = self.file_name.unwrap_or("<source>");
        let (line, col) = self.line_map.line_col(primary.start);
        out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), file, line, col));

        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);

        let mut prev_line_num: Option<usize> = None;
        for annotated_line in &annotated {
            match prev_line_num {
                Some(prev) if annotated_line.line_num > prev + 1 => {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
                Some(_) => {}
                None => {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
                }
            }

            out.push_str(&format!(
                "{:>width$} {} {}\n",
                annotated_line.line_num.to_string().blue().bold(),
                "|".blue(),
                annotated_line.text,
                width = gutter_width + 1,
            ));

            self.format_annotations(&mut out, annotated_line, gutter_width);
            prev_line_num = Some(annotated_line.line_num);
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        }
        self.format_footer(&mut out, diagnostic);

        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        if let Some(ref code) = diagnostic.code {
            let code = match diagnostic.severity {
                Severity::Error => code.0.red().bold(),
                Severity::Warning => code.0.yellow().bold(),
                Severity::Note => code.0.blue().bold(),
            };
            out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code,
                diagnostic.message.bold()
            ));
        } else {
            out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold()));
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        let gutter_width = 2;

        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }

        if let Some(ref help) = diagnostic.help {
            self.format_help(out, help, gutter_width);
        }
    }

    fn format_help(&self, out: &mut String, help: &Help, gutter_width: usize) {
        out.push_str(&format!(
            "{} {} {}: {}\n",
            " ".repeat(gutter_width + 1),
            "=".cyan(),
            "help".cyan().bold(),
            help.message
        ));
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines_map: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.line_map.line_col(label.span.start);
            let (end_line, col_end) = self.line_map.line_col(label.span.end);
            let text = self.line_map.line_text(self.source, line_num).unwrap_or("");

            // Multi-line spans are underlined to the end of their first line.
            let effective_col_end = if end_line == line_num {
                col_end
            } else {
                text.len() + 1
            };

            let entry = lines_map.entry(line_num).or_insert_with(|| AnnotatedLine {
                line_num,
                text: text.to_string(),
                annotations: Vec::new(),
            });

            entry.annotations.push(Annotation {
                col_start,
                col_end: effective_col_end.max(col_start + 1),
                style: label.style,
                message: label.message.clone(),
            });
        }

        lines_map.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, annotated_line: &AnnotatedLine, gutter_width: usize) {
        let mut sorted: Vec<&Annotation> = annotated_line.annotations.iter().collect();
        sorted.sort_by(|a, b| {
            a.style
                .cmp_priority()
                .cmp(&b.style.cmp_priority())
                .then(a.col_start.cmp(&b.col_start))
        });

        let line_len = annotated_line.text.len() + 10;
        let mut underline = vec![' '; line_len];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            let end = ann.col_end.saturating_sub(1).min(line_len);
            for slot in underline.iter_mut().take(end).skip(ann.col_start - 1) {
                *slot = ch;
            }
            if let Some(ref msg) = ann.message {
                messages.push((ann.col_start, ann.style, msg));
            }
        }

        let underline_str: String = underline.iter().collect::<String>().trim_end().to_string();
        if underline_str.is_empty() {
            return;
        }
        let colored_underline = color_underline(&underline_str);
        let pad = " ".repeat(gutter_width + 1);

        if messages.len() <= 1 {
            match messages.first() {
                Some((_, style, msg)) => out.push_str(&format!(
                    "{} {} {} {}\n",
                    pad,
                    "|".blue(),
                    colored_underline,
                    style_message(*style, msg),
                )),
                None => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline)),
            }
            return;
        }

        out.push_str(&format!("{} {} {}\n", pad, "|".blue(), colored_underline));
        for (col, style, msg) in messages.iter().rev() {
            let pipe = match style {
                LabelStyle::Primary => "|".red().bold().to_string(),
                LabelStyle::Secondary => "|".blue().to_string(),
            };
            out.push_str(&format!(
                "{} {} {}{} {}\n",
                pad,
                "|".blue(),
                " ".repeat(col.saturating_sub(1)),
                pipe,
                style_message(*style, msg),
            ));
        }
    }
}

impl LabelStyle {
    fn cmp_priority(&self) -> u8 {
        match self {
            LabelStyle::Primary => 0,
            LabelStyle::Secondary => 1,
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// Color the underline characters (^ in red, - in blue).
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut current_char = None;
    let mut run = String::new();

    for ch in s.chars() {
        let kind = match ch {
            '^' | '-' => Some(ch),
            _ => None,
        };
        if kind != current_char && !run.is_empty() {
            result.push_str(&flush_run(&run, current_char));
            run.clear();
        }
        run.push(ch);
        current_char = kind;
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current_char));
    }

    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardcheck_ast::Span;

    const SOURCE: &str = "class A {\n    @GuardedBy(\"mu\") int x;\n    void f() { x++; }\n}\n";

    fn plain(diag: &Diagnostic) -> String {
        colored::control::set_override(false);
        DiagnosticFormatter::new(SOURCE)
            .with_file_name("A.java")
            .format(diag)
    }

    #[test]
    fn renders_location_snippet_and_notes() {
        let start = SOURCE.find("x++").unwrap();
        let diag = Diagnostic::error("access to `x` requires `this.mu`")
            .with_code("guarded-by/unguarded-access")
            .with_primary(Span::new(start, start + 1), "`this.mu` is not held here")
            .with_note("held locks: {}");
        let out = plain(&diag);

        assert!(out.starts_with("error[guarded-by/unguarded-access]: access to `x` requires `this.mu`\n"));
        assert!(out.contains("  --> A.java:3:16\n"));
        assert!(out.contains(" 3 |     void f() { x++; }\n"));
        assert!(out.contains("^ `this.mu` is not held here"));
        assert!(out.contains("= note: held locks: {}"));
    }

    #[test]
    fn secondary_labels_get_their_own_line() {
        let decl = SOURCE.find("int x").unwrap() + 4;
        let access = SOURCE.find("x++").unwrap();
        let diag = Diagnostic::error("e")
            .with_primary(Span::new(access, access + 1), "here")
            .with_secondary(Span::new(decl, decl + 1), "declared here");
        let out = plain(&diag);

        assert!(out.contains(" 2 |     @GuardedBy(\"mu\") int x;\n"));
        assert!(out.contains("- declared here"));
        assert!(out.contains("^ here"));
    }

    #[test]
    fn diagnostics_without_labels_have_no_snippet() {
        let out = plain(&Diagnostic::warning("nothing to show").with_help("try again"));
        assert_eq!(out, "warning: nothing to show\n    = help: try again\n");
    }
}
