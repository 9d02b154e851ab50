// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end `check` scenarios.

use guardcheck_diagnostics::Severity;
use guardcheck_lint::{check, check_json, CheckOpts, CheckReport};

fn run(source: &str) -> CheckReport {
    let _ = env_logger::builder().is_test(true).try_init();
    check(source, "Test.java", &CheckOpts::default())
}

fn messages(report: &CheckReport) -> Vec<&str> {
    report.diagnostics.iter().map(|d| d.message.as_str()).collect()
}

/// 1-based line of each diagnostic's primary span.
fn lines(report: &CheckReport) -> Vec<usize> {
    let map = guardcheck_ast::LineMap::new(&report.source);
    report
        .diagnostics
        .iter()
        .filter_map(|d| d.primary_span())
        .map(|span| map.line_col(span.start).0)
        .collect()
}

#[test]
fn clean_file_passes() {
    let report = run(
        r#"package demo;
           import java.util.concurrent.locks.*;
           public class Account {
               private final Lock lock = new ReentrantLock();
               @GuardedBy("lock") private long balance;
               public void deposit(long amount) {
                   lock.lock();
                   try {
                       balance += amount;
                   } finally {
                       lock.unlock();
                   }
               }
               public synchronized String toString() { return "Account"; }
           }"#,
    );
    assert!(report.success, "{:?}", messages(&report));
    assert!(report.diagnostics.is_empty());
}

#[test]
fn unguarded_accesses_are_errors_in_source_order() {
    let report = run(
        r#"class Cache {
               final Object mu = new Object();
               @GuardedBy("mu") int hits;
               @GuardedBy("mu") int misses;
               void record(boolean hit) {
                   if (hit) {
                       hits++;
                   }
                   synchronized (mu) {
                       misses++;
                   }
                   misses--;
               }
           }"#,
    );
    assert!(!report.success);
    assert_eq!(report.error_count, 2);
    assert_eq!(
        messages(&report),
        vec![
            "access to `hits` requires holding `this.mu`",
            "access to `misses` requires holding `this.mu`",
        ]
    );
    assert_eq!(lines(&report), vec![7, 12]);
}

#[test]
fn receivers_are_tracked_separately() {
    let report = run(
        r#"class Node {
               final Object mu = new Object();
               @GuardedBy("mu") Node next;
               void link(Node other) {
                   synchronized (mu) {
                       other.next = this;
                   }
               }
           }"#,
    );
    assert_eq!(messages(&report), vec!["access to `next` requires holding `other.mu`"]);
}

#[test]
fn anonymous_classes_and_lambdas_start_without_locks() {
    let report = run(
        r#"class Worker {
               @GuardedBy("this") int jobs;
               synchronized void schedule() {
                   jobs++;
                   Runnable r = new Runnable() {
                       public void run() { jobs--; }
                   };
                   Runnable l = () -> jobs--;
               }
           }"#,
    );
    assert_eq!(
        messages(&report),
        vec![
            "access to `jobs` requires holding `Worker.this`",
            "access to `jobs` requires holding `this`",
        ]
    );
    assert_eq!(lines(&report), vec![6, 8]);
}

#[test]
fn invalid_guards_warn_and_are_not_checked() {
    let report = run(
        r#"class Odd {
               @GuardedBy("nowhere") int x;
               void f() { x++; }
           }"#,
    );
    assert!(report.success);
    assert_eq!(report.warning_count, 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Warning);
    assert_eq!(messages(&report), vec!["invalid @GuardedBy expression: `nowhere`"]);
}

#[test]
fn guard_calls_must_name_zero_argument_methods() {
    let report = run(
        r#"class Pool {
               Object m(int i) { return this; }
               @GuardedBy("m()") int x;
               void f() { x++; }
           }"#,
    );
    assert!(report.success, "{:?}", messages(&report));
    assert_eq!(report.error_count, 0);
    assert_eq!(messages(&report), vec!["invalid @GuardedBy expression: `m()`"]);
}

#[test]
fn rule_filters_apply() {
    let source = r#"class Odd {
               @GuardedBy("nowhere") int x;
               @GuardedBy("this") int y;
               void f() { x++; y++; }
           }"#;
    let only_access = CheckOpts {
        rules: vec!["guarded-by/unguarded-access".to_string()],
        ..CheckOpts::default()
    };
    let report = check(source, "Odd.java", &only_access);
    assert_eq!(messages(&report), vec!["access to `y` requires holding `this`"]);

    let none = CheckOpts {
        excludes: vec!["guarded-by/*".to_string()],
        ..CheckOpts::default()
    };
    assert!(check(source, "Odd.java", &none).diagnostics.is_empty());
}

#[test]
fn parse_errors_stop_checking() {
    let report = run("class Broken { @GuardedBy(\"this\") int x; void f() { x++ }");
    assert!(!report.success);
    assert!(report.diagnostics.iter().all(|d| d.code.as_ref().unwrap().0 == "E0100"));
}

#[test]
fn resolution_problems_are_warnings() {
    let report = run(
        r#"class Dup {
               @GuardedBy("this") int x;
               int x;
               synchronized void f() { x++; }
           }"#,
    );
    assert!(report.success);
    assert_eq!(messages(&report), vec!["duplicate field: `x`"]);
}

#[test]
fn json_output_has_locations() {
    let report = run(
        r#"class Counter {
               @GuardedBy("this") int count;
               void racy() { count++; }
           }"#,
    );
    let value: serde_json::Value = serde_json::from_str(&check_json(&report)).unwrap();
    assert_eq!(value["file"], "Test.java");
    assert_eq!(value["success"], false);
    assert_eq!(value["error_count"], 1);
    let diag = &value["diagnostics"][0];
    assert_eq!(diag["code"], "guarded-by/unguarded-access");
    assert_eq!(diag["category"], "Locking");
    assert_eq!(diag["location"]["line"], 3);
}
