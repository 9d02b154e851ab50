// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! End-to-end tests of the held-lock analyzer on small Java sources.

use guardcheck_ast::decl::{ClassDecl, MemberKind, MethodDecl};
use guardcheck_ast::expr::{Expr, ExprKind};
use guardcheck_ast::stmt::StmtKind;
use guardcheck_locks::{analyze, AnalysisUnit, HeldLockSet, LockEventListener, LockExpr};
use guardcheck_resolve::{Resolution, SymbolId};

#[derive(Debug)]
struct Event {
    access: String,
    required: String,
    held: String,
    satisfied: bool,
}

struct Recorder<'s> {
    source: &'s str,
    events: Vec<Event>,
}

impl LockEventListener for Recorder<'_> {
    fn handle_guarded_access(&mut self, access: &Expr, required: &LockExpr, held: &HeldLockSet) {
        self.events.push(Event {
            access: self.source[access.span.start..access.span.end].to_string(),
            required: required.to_string(),
            held: held.to_string(),
            satisfied: held.contains(required),
        });
    }
}

struct Program<'s> {
    source: &'s str,
    unit: guardcheck_ast::decl::CompilationUnit,
    res: Resolution,
}

fn program(source: &str) -> Program<'_> {
    let _ = env_logger::builder().is_test(true).try_init();
    let parsed = guardcheck_parser::parse_compilation_unit(source);
    assert!(parsed.is_ok(), "Parse errors: {:?}", parsed.errors);
    let res = guardcheck_resolve::resolve(&parsed.unit);
    Program {
        source,
        unit: parsed.unit,
        res,
    }
}

fn method<'a>(class: &'a ClassDecl, name: &str) -> &'a MethodDecl {
    class
        .members
        .iter()
        .find_map(|m| match &m.kind {
            MemberKind::Method(method) if method.name == name => Some(method),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no method {}", name))
}

impl Program<'_> {
    fn class(&self, name: &str) -> &ClassDecl {
        self.unit
            .types
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no class {}", name))
    }

    fn id(&self, class: &ClassDecl) -> SymbolId {
        self.res.resolutions[&class.id]
    }

    fn run_unit(&self, unit: AnalysisUnit<'_>) -> Vec<Event> {
        let mut recorder = Recorder {
            source: self.source,
            events: Vec::new(),
        };
        analyze(unit, &self.res, &mut recorder);
        recorder.events
    }

    fn run(&self, class: &str, name: &str) -> Vec<Event> {
        let decl = self.class(class);
        self.run_unit(AnalysisUnit::Method {
            decl: method(decl, name),
            class: self.id(decl),
        })
    }
}

/// Initializer of the `index`th local declaration in a method body.
fn local_init(method: &MethodDecl, index: usize) -> &Expr {
    method
        .body
        .iter()
        .flatten()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Local { declarators, .. } => declarators[0].init.as_ref(),
            _ => None,
        })
        .nth(index)
        .expect("local with initializer")
}

#[test]
fn synchronized_instance_method_holds_this() {
    let p = program(
        r#"class Counter {
               @GuardedBy("this") int count;
               synchronized void inc() { count++; this.count += 2; }
               void racy() { count++; }
           }"#,
    );
    let events = p.run("Counter", "inc");
    assert_eq!(events.len(), 2);
    for event in &events {
        assert_eq!(event.required, "this");
        assert!(event.satisfied, "{:?}", event);
    }
    assert_eq!(events[1].access, "this.count");

    let racy = p.run("Counter", "racy");
    assert_eq!(racy.len(), 1);
    assert_eq!(racy[0].held, "{}");
    assert!(!racy[0].satisfied);
}

#[test]
fn synchronized_static_method_holds_the_class() {
    let p = program(
        r#"class Registry {
               @GuardedBy("Registry.class") static int entries;
               static synchronized void add() { entries++; }
           }"#,
    );
    let events = p.run("Registry", "add");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].required, "Registry.class");
    assert_eq!(events[0].held, "{Registry.class}");
    assert!(events[0].satisfied);
}

#[test]
fn synchronized_block_holds_its_lock_for_the_body_only() {
    let p = program(
        r#"class Account {
               final Object mu = new Object();
               @GuardedBy("mu") long balance;
               void deposit(long amount) {
                   synchronized (mu) {
                       balance += amount;
                   }
                   balance -= 1;
               }
           }"#,
    );
    let events = p.run("Account", "deposit");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].required, "this.mu");
    assert_eq!(events[0].held, "{this.mu}");
    assert!(events[0].satisfied);
    assert_eq!(events[1].held, "{}");
    assert!(!events[1].satisfied);
}

#[test]
fn locks_released_in_finally_cover_try_and_catch() {
    let p = program(
        r#"import java.util.concurrent.locks.*;
           class Queue {
               final Lock lock = new ReentrantLock();
               @GuardedBy("lock") int size;
               void push() {
                   lock.lock();
                   try {
                       size++;
                   } catch (RuntimeException e) {
                       size--;
                   } finally {
                       lock.unlock();
                       size = 0;
                   }
               }
           }"#,
    );
    let events = p.run("Queue", "push");
    let held: Vec<&str> = events.iter().map(|e| e.held.as_str()).collect();
    assert_eq!(held, vec!["{this.lock}", "{this.lock}", "{}"]);
    assert!(events.iter().all(|e| e.required == "this.lock"));
    assert!(events[0].satisfied && events[1].satisfied);
    assert!(!events[2].satisfied);
}

#[test]
fn relative_guards_are_rebased_onto_the_receiver() {
    let p = program(
        r#"class Account {
               final Object mu = new Object();
               @GuardedBy("mu") long balance;
               void transfer(Account other) {
                   synchronized (other.mu) {
                       other.balance++;
                       balance++;
                   }
               }
           }"#,
    );
    let events = p.run("Account", "transfer");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].access, "other.balance");
    assert_eq!(events[0].required, "other.mu");
    assert!(events[0].satisfied);
    assert_eq!(events[1].required, "this.mu");
    assert!(!events[1].satisfied);
}

#[test]
fn static_guards_do_not_depend_on_the_receiver() {
    let p = program(
        r#"class Cache {
               static final Object LOCK = new Object();
               @GuardedBy("Cache.LOCK") static int hits;
               void touch(Cache a, Cache b) {
                   synchronized (LOCK) {
                       a.hits++;
                       b.hits++;
                   }
               }
           }"#,
    );
    let events = p.run("Cache", "touch");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].required, "Cache.LOCK");
    assert_eq!(events[1].required, "Cache.LOCK");
    assert!(events.iter().all(|e| e.satisfied));
}

#[test]
fn either_half_of_a_read_write_lock_satisfies_its_guard() {
    let p = program(
        r#"import java.util.concurrent.locks.*;
           class Table {
               final ReadWriteLock rw = new ReentrantReadWriteLock();
               @GuardedBy("rw") int rows;
               int read() {
                   rw.readLock().lock();
                   try { return rows; } finally { rw.readLock().unlock(); }
               }
               void write() {
                   rw.writeLock().lock();
                   try { rows++; } finally { rw.writeLock().unlock(); }
               }
           }"#,
    );
    for name in ["read", "write"] {
        let events = p.run("Table", name);
        assert_eq!(events.len(), 1, "{}", name);
        assert_eq!(events[0].required, "this.rw");
        assert!(events[0].satisfied, "{}: {:?}", name, events[0]);
    }
}

#[test]
fn unsupported_guards_are_skipped() {
    let p = program(
        r#"class Broken {
               @GuardedBy("nonexistent") int a;
               @GuardedBy("mu + 1") int b;
               @GuardedBy("this") int c;
               void f() { a++; b++; c++; }
           }"#,
    );
    let events = p.run("Broken", "f");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].access, "c");
}

#[test]
fn method_guards_are_trusted_and_checked_at_calls() {
    let p = program(
        r#"class Buffer {
               final Object mu = new Object();
               @GuardedBy("mu") int used;
               @GuardedBy("mu") void grow() { used++; }
               void caller() { grow(); this.grow(); }
           }"#,
    );
    let grow = p.run("Buffer", "grow");
    assert_eq!(grow.len(), 1);
    assert!(grow[0].satisfied);
    assert_eq!(grow[0].held, "{this.mu}");

    let caller = p.run("Buffer", "caller");
    assert_eq!(caller.len(), 2);
    assert!(caller.iter().all(|e| e.required == "this.mu" && !e.satisfied));
}

#[test]
fn unbindable_synchronized_operand_adds_nothing() {
    let p = program(
        r#"class Weird {
               final Object mu = new Object();
               @GuardedBy("mu") int x;
               void f() { synchronized (new Object()) { x++; } }
           }"#,
    );
    let events = p.run("Weird", "f");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].held, "{}");
}

#[test]
fn nested_scopes_are_separate_units() {
    let p = program(
        r#"class Outer {
               @GuardedBy("this") int x;
               static class Holder { Holder(int v) {} }
               synchronized void f() {
                   Runnable r = new Runnable() { public void run() { x++; } };
                   Runnable l = () -> x++;
                   class Local { void g() { x++; } }
                   Holder h = new Holder(x) {};
               }
           }"#,
    );
    let outer = p.class("Outer");
    let f = method(outer, "f");

    // Only the constructor argument of the last anonymous class is seen.
    let events = p.run("Outer", "f");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].held, "{this}");
    assert!(events[0].satisfied);

    let ExprKind::New { body: Some(anon), .. } = &local_init(f, 0).kind else {
        panic!("expected anonymous class");
    };
    let run = p.run_unit(AnalysisUnit::Method {
        decl: method(anon, "run"),
        class: p.id(anon),
    });
    assert_eq!(run.len(), 1);
    assert_eq!(run[0].required, "Outer.this");
    assert_eq!(run[0].held, "{}");
    assert!(!run[0].satisfied);

    let ExprKind::Lambda { body, .. } = &local_init(f, 1).kind else {
        panic!("expected lambda");
    };
    let lambda = p.run_unit(AnalysisUnit::Lambda {
        body,
        class: p.id(outer),
    });
    assert_eq!(lambda.len(), 1);
    assert_eq!(lambda[0].required, "this");
    assert!(!lambda[0].satisfied);
}

#[test]
fn inner_classes_reach_outer_locks() {
    let p = program(
        r#"class Outer {
               final Object mu = new Object();
               @GuardedBy("mu") int x;
               class Inner {
                   void f() { synchronized (mu) { x++; } }
                   void g() { synchronized (Outer.this.mu) { x++; } }
               }
           }"#,
    );
    let outer = p.class("Outer");
    let inner = outer
        .members
        .iter()
        .find_map(|m| match &m.kind {
            MemberKind::Class(c) => Some(c),
            _ => None,
        })
        .expect("inner class");
    for name in ["f", "g"] {
        let events = p.run_unit(AnalysisUnit::Method {
            decl: method(inner, name),
            class: p.id(inner),
        });
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].required, "Outer.this.mu");
        assert!(events[0].satisfied, "{}: {:?}", name, events[0]);
    }
}
