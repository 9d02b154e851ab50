// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The name resolver implementation.

use std::collections::HashMap;

use guardcheck_ast::decl::{ClassDecl, ClassKind, CompilationUnit, MemberKind, MethodDecl};
use guardcheck_ast::expr::{Expr, ExprKind, LambdaBody};
use guardcheck_ast::stmt::{Stmt, StmtKind, SwitchCase, TryStmt};
use guardcheck_ast::{NodeId, Span};

use crate::builtins;
use crate::error::ResolveError;
use crate::scope::{ScopeKind, ScopeTree};
use crate::symbol::{base_type_name, SymbolId, SymbolKind};
use crate::{Resolution, SymbolResolver};

/// What an expression denotes, as far as member lookup cares.
#[derive(Debug, Clone, Copy)]
enum Target {
    /// A value, with its static class when known.
    Value(Option<SymbolId>),
    /// A type name used as a qualifier (`Foo.bar`).
    Type(SymbolId),
}

impl Target {
    fn value_class(self) -> Option<SymbolId> {
        match self {
            Target::Value(class) => class,
            Target::Type(_) => None,
        }
    }

    fn member_class(self) -> Option<SymbolId> {
        match self {
            Target::Value(class) => class,
            Target::Type(class) => Some(class),
        }
    }
}

pub struct Resolver {
    out: Resolution,
    scopes: ScopeTree,
    /// Local and anonymous classes declared so far, per enclosing class.
    nested_counters: HashMap<SymbolId, u32>,
}

impl Resolver {
    /// Resolve a compilation unit in three passes: declare all named
    /// classes and their members, link supertypes, then resolve bodies.
    pub fn resolve(unit: &CompilationUnit) -> Resolution {
        let mut resolver = Resolver {
            out: Resolution::new(unit.package.clone()),
            scopes: ScopeTree::new(),
            nested_counters: HashMap::new(),
        };
        builtins::install(&mut resolver.out);

        for import in &unit.imports {
            if import.is_static || import.is_wildcard {
                continue;
            }
            let simple = import.path.rsplit('.').next().unwrap_or(&import.path);
            resolver.out.imports.insert(simple.to_string(), import.path.clone());
        }

        let mut declared = Vec::with_capacity(unit.types.len());
        for decl in &unit.types {
            let qualified = match &unit.package {
                Some(package) => format!("{}.{}", package, decl.name),
                None => decl.name.clone(),
            };
            let id = resolver.declare_class(decl, None, decl.name.clone(), qualified, false);
            match resolver.out.top_level.get(&decl.name) {
                Some(&previous) => {
                    let previous = resolver.out.symbols.get(previous).map(|s| s.span).unwrap_or_default();
                    resolver
                        .out
                        .errors
                        .push(ResolveError::duplicate_class(decl.name.clone(), decl.span, previous));
                }
                None => {
                    resolver.out.top_level.insert(decl.name.clone(), id);
                }
            }
            declared.push((decl, id));
        }

        for &(decl, id) in &declared {
            resolver.link_class(decl, id);
        }
        for &(decl, id) in &declared {
            resolver.resolve_class(decl, id);
        }

        log::debug!(
            "resolved {} classes: {} symbols, {} references, {} errors",
            declared.len(),
            resolver.out.symbols.len(),
            resolver.out.resolutions.len(),
            resolver.out.errors.len()
        );
        resolver.out
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Declare a class with its fields, methods and member classes.
    fn declare_class(
        &mut self,
        decl: &ClassDecl,
        outer: Option<SymbolId>,
        name: String,
        qualified: String,
        is_static: bool,
    ) -> SymbolId {
        let id = self.out.symbols.insert(
            name,
            SymbolKind::Class {
                outer,
                is_static,
                kind: decl.kind,
                qualified_name: qualified.clone(),
                superclass: None,
                interfaces: Vec::new(),
            },
            None,
            None,
            decl.span,
        );
        self.out.resolutions.insert(decl.id, id);
        self.out.by_qualified.entry(qualified.clone()).or_insert(id);
        self.out.members_mut(id);

        let in_interface = decl.kind == ClassKind::Interface;
        for member in &decl.members {
            match &member.kind {
                MemberKind::Field(field) => {
                    let is_static = field.modifiers.is_static() || in_interface;
                    for declarator in &field.declarators {
                        self.declare_field(
                            id,
                            &declarator.name,
                            Some(field.ty.clone()),
                            field.modifiers.guarded_by(),
                            is_static,
                            declarator.id,
                            declarator.span,
                        );
                    }
                }
                MemberKind::EnumConstant(constant) => {
                    self.declare_field(
                        id,
                        &constant.name,
                        Some(decl.name.clone()),
                        None,
                        true,
                        member.id,
                        member.span,
                    );
                }
                MemberKind::Method(method) => self.declare_method(id, method, in_interface),
                MemberKind::Class(nested) => {
                    let is_static = nested.modifiers.is_static()
                        || nested.kind != ClassKind::Class
                        || in_interface;
                    let nested_id = self.declare_class(
                        nested,
                        Some(id),
                        nested.name.clone(),
                        format!("{}.{}", qualified, nested.name),
                        is_static,
                    );
                    let previous = self.out.direct_member_class(id, &nested.name);
                    match previous {
                        Some(previous) => {
                            let previous = self.span_of(previous);
                            self.out.errors.push(ResolveError::duplicate_class(
                                nested.name.clone(),
                                nested.span,
                                previous,
                            ));
                        }
                        None => {
                            self.out.members_mut(id).classes.insert(nested.name.clone(), nested_id);
                        }
                    }
                }
                MemberKind::Initializer(_) => {}
            }
        }

        id
    }

    #[allow(clippy::too_many_arguments)]
    fn declare_field(
        &mut self,
        class: SymbolId,
        name: &str,
        ty: Option<String>,
        guard: Option<&str>,
        is_static: bool,
        node: NodeId,
        span: Span,
    ) {
        let id = self.out.symbols.insert(
            name.to_string(),
            SymbolKind::Field { owner: class, is_static },
            ty,
            guard.map(String::from),
            span,
        );
        self.out.resolutions.insert(node, id);

        if let Some(previous) = self.out.direct_field(class, name) {
            let previous = self.span_of(previous);
            self.out
                .errors
                .push(ResolveError::duplicate_field(name.to_string(), span, previous));
            return;
        }
        self.out.members_mut(class).fields.insert(name.to_string(), id);
    }

    fn declare_method(&mut self, class: SymbolId, method: &MethodDecl, in_interface: bool) {
        let is_static = method.modifiers.is_static();
        let id = self.out.symbols.insert(
            method.name.clone(),
            SymbolKind::Method {
                owner: class,
                is_static,
                is_synchronized: method.modifiers.is_synchronized() && !in_interface,
                arity: method.params.len(),
            },
            method.ret_ty.clone(),
            method.modifiers.guarded_by().map(String::from),
            method.span,
        );
        self.out.resolutions.insert(method.id, id);
        self.out
            .members_mut(class)
            .methods
            .entry(method.name.clone())
            .or_default()
            .push(id);
    }

    /// Resolve the declared supertypes of a class and its member classes.
    fn link_class(&mut self, decl: &ClassDecl, id: SymbolId) {
        let scope = self.out.outer_class(id).unwrap_or(id);
        let superclass = decl
            .superclass
            .as_deref()
            .and_then(|name| self.find_supertype(scope, name));
        let interfaces: Vec<SymbolId> = decl
            .interfaces
            .iter()
            .filter_map(|name| self.find_supertype(scope, name))
            .collect();
        self.set_supertypes(id, superclass, interfaces, decl.span);

        for member in &decl.members {
            if let MemberKind::Class(nested) = &member.kind {
                if let Some(nested_id) = self.out.resolutions.get(&nested.id).copied() {
                    self.link_class(nested, nested_id);
                }
            }
        }
    }

    fn find_supertype(&self, scope: SymbolId, name: &str) -> Option<SymbolId> {
        let found = base_type_name(name).and_then(|base| self.out.find_type(scope, base));
        if found.is_none() {
            log::debug!("supertype {} is not declared in this unit", name);
        }
        found
    }

    /// Record supertypes, dropping any that would close an inheritance cycle.
    fn set_supertypes(
        &mut self,
        id: SymbolId,
        superclass: Option<SymbolId>,
        interfaces: Vec<SymbolId>,
        span: Span,
    ) {
        let mut cyclic = false;
        let mut acyclic = |sup: SymbolId, out: &Resolution| {
            let closes_cycle = out.is_subclass(sup, id);
            cyclic |= closes_cycle;
            !closes_cycle
        };
        let superclass = superclass.filter(|&sup| acyclic(sup, &self.out));
        let interfaces: Vec<SymbolId> = interfaces
            .into_iter()
            .filter(|&sup| acyclic(sup, &self.out))
            .collect();

        if cyclic {
            let name = self
                .out
                .symbols
                .get(id)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            self.out.errors.push(ResolveError::cyclic_inheritance(name, span));
        }

        if let Some(symbol) = self.out.symbols.get_mut(id) {
            if let SymbolKind::Class {
                superclass: sup,
                interfaces: ifaces,
                ..
            } = &mut symbol.kind
            {
                *sup = superclass;
                *ifaces = interfaces;
            }
        }
    }

    fn span_of(&self, id: SymbolId) -> Span {
        self.out.symbols.get(id).map(|s| s.span).unwrap_or_default()
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    fn resolve_class(&mut self, decl: &ClassDecl, id: SymbolId) {
        self.scopes.push(ScopeKind::Class(id));

        for member in &decl.members {
            match &member.kind {
                MemberKind::Field(field) => {
                    for declarator in &field.declarators {
                        if let Some(init) = &declarator.init {
                            self.resolve_expr(init);
                        }
                    }
                }
                MemberKind::EnumConstant(constant) => {
                    for arg in &constant.args {
                        self.resolve_expr(arg);
                    }
                    if let Some(body) = &constant.body {
                        self.resolve_nested_class(body);
                    }
                }
                MemberKind::Method(method) => {
                    let symbol = self.out.resolutions.get(&method.id).copied();
                    self.resolve_method(method, symbol);
                }
                MemberKind::Initializer(init) => {
                    self.scopes.push(ScopeKind::Method(None));
                    self.resolve_stmts(&init.body);
                    self.scopes.pop();
                }
                MemberKind::Class(nested) => {
                    if let Some(nested_id) = self.out.resolutions.get(&nested.id).copied() {
                        self.resolve_class(nested, nested_id);
                    }
                }
            }
        }

        self.scopes.pop();
    }

    fn resolve_method(&mut self, method: &MethodDecl, symbol: Option<SymbolId>) {
        self.scopes.push(ScopeKind::Method(symbol));
        for param in &method.params {
            let ty = if param.is_varargs {
                format!("{}...", param.ty)
            } else {
                param.ty.clone()
            };
            self.declare_variable(&param.name, Some(ty), Some(param.id), param.span, true);
        }
        if let Some(body) = &method.body {
            self.resolve_stmts(body);
        }
        self.scopes.pop();
    }

    /// Declare, link and resolve a local or anonymous class in place.
    fn resolve_nested_class(&mut self, decl: &ClassDecl) -> Option<SymbolId> {
        let outer = self.scopes.current_class()?;
        let (outer_name, outer_qualified) = {
            let symbol = self.out.symbols.get(outer)?;
            let qualified = self.out.qualified_name(outer).unwrap_or(&symbol.name);
            (symbol.name.clone(), qualified.to_string())
        };
        let counter = self.nested_counters.entry(outer).or_insert(0);
        *counter += 1;
        let n = *counter;

        let id = if decl.kind == ClassKind::Anonymous {
            self.declare_class(
                decl,
                Some(outer),
                format!("{}${}", outer_name, n),
                format!("{}${}", outer_qualified, n),
                false,
            )
        } else {
            let id = self.declare_class(
                decl,
                Some(outer),
                decl.name.clone(),
                format!("{}${}{}", outer_qualified, n, decl.name),
                false,
            );
            self.out
                .members_mut(outer)
                .classes
                .entry(decl.name.clone())
                .or_insert(id);
            id
        };

        self.link_class(decl, id);
        self.resolve_class(decl, id);
        Some(id)
    }

    fn declare_variable(
        &mut self,
        name: &str,
        ty: Option<String>,
        node: Option<NodeId>,
        span: Span,
        is_param: bool,
    ) -> Option<SymbolId> {
        let class = self.scopes.current_class()?;
        let kind = if is_param {
            SymbolKind::Parameter { class }
        } else {
            SymbolKind::Local { class }
        };
        let id = self.out.symbols.insert(name.to_string(), kind, ty, None, span);
        self.scopes.define(name.to_string(), id);
        if let Some(node) = node {
            self.out.resolutions.insert(node, id);
        }
        Some(id)
    }

    fn resolve_block(&mut self, stmts: &[Stmt]) {
        self.scopes.push(ScopeKind::Block);
        self.resolve_stmts(stmts);
        self.scopes.pop();
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) | StmtKind::Throw(expr) => {
                self.resolve_expr(expr);
            }
            StmtKind::Local { ty, declarators } => {
                for declarator in declarators {
                    let init = declarator.init.as_ref().map(|init| self.resolve_expr(init));
                    let ty = if ty == "var" {
                        init.and_then(Target::value_class)
                            .and_then(|class| self.out.qualified_name(class))
                            .map(String::from)
                    } else {
                        Some(ty.clone())
                    };
                    self.declare_variable(
                        &declarator.name,
                        ty,
                        Some(declarator.id),
                        declarator.span,
                        false,
                    );
                }
            }
            StmtKind::Block(stmts) => self.resolve_block(stmts),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(cond);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            StmtKind::While { cond, body } | StmtKind::DoWhile { body, cond } => {
                self.resolve_expr(cond);
                self.resolve_stmt(body);
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                self.scopes.push(ScopeKind::Block);
                self.resolve_stmts(init);
                if let Some(cond) = cond {
                    self.resolve_expr(cond);
                }
                for expr in update {
                    self.resolve_expr(expr);
                }
                self.resolve_stmt(body);
                self.scopes.pop();
            }
            StmtKind::ForEach { ty, name, iter, body } => {
                self.resolve_expr(iter);
                self.scopes.push(ScopeKind::Block);
                let ty = (ty != "var").then(|| ty.clone());
                self.declare_variable(name, ty, Some(stmt.id), stmt.span, false);
                self.resolve_stmt(body);
                self.scopes.pop();
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            StmtKind::Try(try_stmt) => self.resolve_try(try_stmt),
            StmtKind::Synchronized { lock, body } => {
                self.resolve_expr(lock);
                self.resolve_block(body);
            }
            StmtKind::Switch { selector, cases } => {
                let selector = self.resolve_expr(selector).value_class();
                self.resolve_switch(selector, cases);
            }
            StmtKind::Labeled { body, .. } => self.resolve_stmt(body),
            StmtKind::LocalClass(decl) => {
                self.resolve_nested_class(decl);
            }
            StmtKind::Assert { cond, message } => {
                self.resolve_expr(cond);
                if let Some(message) = message {
                    self.resolve_expr(message);
                }
            }
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => {}
        }
    }

    fn resolve_try(&mut self, try_stmt: &TryStmt) {
        self.scopes.push(ScopeKind::Block);
        for resource in &try_stmt.resources {
            let init = self.resolve_expr(&resource.init);
            if let Some(name) = &resource.name {
                let ty = match resource.ty.as_deref() {
                    Some("var") | None => init
                        .value_class()
                        .and_then(|class| self.out.qualified_name(class))
                        .map(String::from),
                    Some(ty) => Some(ty.to_string()),
                };
                self.declare_variable(name, ty, Some(resource.id), resource.init.span, false);
            }
        }
        self.resolve_block(&try_stmt.body);
        self.scopes.pop();

        for catch in &try_stmt.catches {
            self.scopes.push(ScopeKind::Block);
            let ty = match catch.types.as_slice() {
                [single] => Some(single.clone()),
                _ => None,
            };
            self.declare_variable(&catch.name, ty, Some(catch.id), catch.span, true);
            self.resolve_stmts(&catch.body);
            self.scopes.pop();
        }

        if let Some(finally) = &try_stmt.finally {
            self.resolve_block(finally);
        }
    }

    fn resolve_switch(&mut self, selector: Option<SymbolId>, cases: &[SwitchCase]) {
        let selector_enum = selector.filter(|&class| {
            matches!(
                self.out.symbols.get(class).map(|s| &s.kind),
                Some(SymbolKind::Class { kind: ClassKind::Enum, .. })
            )
        });

        self.scopes.push(ScopeKind::Block);
        for case in cases {
            for label in &case.labels {
                // Enum case labels name constants of the selector's enum.
                let constant = match (&label.kind, selector_enum) {
                    (ExprKind::Ident(name), Some(enum_class)) => {
                        self.out.find_field(enum_class, name)
                    }
                    _ => None,
                };
                match constant {
                    Some(constant) => {
                        self.out.resolutions.insert(label.id, constant);
                    }
                    None => {
                        self.resolve_expr(label);
                    }
                }
            }
            self.resolve_stmts(&case.body);
        }
        self.scopes.pop();
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn record(&mut self, node: NodeId, symbol: SymbolId) {
        self.out.resolutions.insert(node, symbol);
    }

    /// Static class of a field, variable or method result.
    fn value_of(&self, symbol: SymbolId) -> Target {
        Target::Value(self.out.type_of(symbol))
    }

    fn current_class(&self) -> Option<SymbolId> {
        self.scopes.current_class()
    }

    fn find_type_here(&self, name: &str) -> Option<SymbolId> {
        let class = self.current_class()?;
        self.out.find_type(class, base_type_name(name)?)
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Target {
        match &expr.kind {
            ExprKind::Ident(name) => {
                let out = &self.out;
                let variable = self.scopes.lookup(name, |class| out.find_field(class, name));
                if let Some(symbol) = variable {
                    self.record(expr.id, symbol);
                    return self.value_of(symbol);
                }
                match self.find_type_here(name) {
                    Some(class) => {
                        self.record(expr.id, class);
                        Target::Type(class)
                    }
                    None => Target::Value(None),
                }
            }
            ExprKind::This => Target::Value(self.current_class()),
            ExprKind::Super => {
                Target::Value(self.current_class().and_then(|c| self.out.superclass(c)))
            }
            ExprKind::QualifiedThis(qualifier) => match self.find_type_here(qualifier) {
                Some(class) => {
                    self.record(expr.id, class);
                    Target::Value(Some(class))
                }
                None => Target::Value(None),
            },
            ExprKind::ClassLit(ty) => {
                if let Some(class) = self.find_type_here(ty) {
                    self.record(expr.id, class);
                }
                Target::Value(None)
            }
            ExprKind::Select { object, name } => self.resolve_select(expr, object, name),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                for arg in args {
                    self.resolve_expr(arg);
                }
                self.resolve_call(expr.id, receiver.as_deref(), method, args.len())
            }
            ExprKind::New { class, args, body } => {
                for arg in args {
                    self.resolve_expr(arg);
                }
                let created = match body {
                    Some(body) => self.resolve_nested_class(body),
                    None => self.find_type_here(class),
                };
                if let Some(created) = created {
                    self.record(expr.id, created);
                }
                Target::Value(created)
            }
            ExprKind::NewArray { dims, init, .. } => {
                for dim in dims {
                    self.resolve_expr(dim);
                }
                for item in init.iter().flatten() {
                    self.resolve_expr(item);
                }
                Target::Value(None)
            }
            ExprKind::ArrayInit(items) => {
                for item in items {
                    self.resolve_expr(item);
                }
                Target::Value(None)
            }
            ExprKind::Index { object, index } => {
                self.resolve_expr(object);
                self.resolve_expr(index);
                Target::Value(None)
            }
            ExprKind::Unary { operand, .. } => {
                self.resolve_expr(operand);
                Target::Value(None)
            }
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
                Target::Value(None)
            }
            ExprKind::Assign { target, value, .. } => {
                let target = self.resolve_expr(target);
                self.resolve_expr(value);
                target
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                self.resolve_expr(cond);
                let then_target = self.resolve_expr(then_expr);
                self.resolve_expr(else_expr);
                then_target
            }
            ExprKind::InstanceOf { expr, .. } => {
                self.resolve_expr(expr);
                Target::Value(None)
            }
            ExprKind::Cast { ty, expr } => {
                self.resolve_expr(expr);
                Target::Value(self.find_type_here(ty))
            }
            ExprKind::Lambda { params, body } => {
                self.scopes.push(ScopeKind::Lambda);
                for param in params {
                    self.declare_variable(param, None, None, expr.span, true);
                }
                match body {
                    LambdaBody::Expr(body) => {
                        self.resolve_expr(body);
                    }
                    LambdaBody::Block(stmts) => self.resolve_block(stmts),
                }
                self.scopes.pop();
                Target::Value(None)
            }
            ExprKind::MethodRef { target, .. } => {
                self.resolve_expr(target);
                Target::Value(None)
            }
            ExprKind::Paren(inner) => self.resolve_expr(inner),
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::String(_)
            | ExprKind::Char(_)
            | ExprKind::Bool(_)
            | ExprKind::Null => Target::Value(None),
        }
    }

    fn resolve_select(&mut self, expr: &Expr, object: &Expr, name: &str) -> Target {
        let qualifier = self.resolve_expr(object);

        if let Some(class) = qualifier.member_class() {
            if let Some(field) = self.out.find_field(class, name) {
                self.record(expr.id, field);
                return self.value_of(field);
            }
            if let Some(nested) = self.out.member_class(class, name) {
                self.record(expr.id, nested);
                return Target::Type(nested);
            }
            return Target::Value(None);
        }

        // `java.util.concurrent.locks.Lock` and friends.
        let qualified = expr
            .dotted_name()
            .and_then(|dotted| self.find_type_here(&dotted));
        match qualified {
            Some(class) => {
                self.record(expr.id, class);
                Target::Type(class)
            }
            None => Target::Value(None),
        }
    }

    fn resolve_call(
        &mut self,
        node: NodeId,
        receiver: Option<&Expr>,
        method: &str,
        arity: usize,
    ) -> Target {
        let found = match receiver {
            Some(receiver) => {
                let target = self.resolve_expr(receiver);
                target
                    .member_class()
                    .and_then(|class| self.out.find_method(class, method, arity))
            }
            // `this(...)` and `super(...)` delegate to constructors.
            None if method == "this" || method == "super" => None,
            None => self
                .scopes
                .enclosing_classes()
                .into_iter()
                .find_map(|class| self.out.find_method(class, method, arity)),
        };

        match found {
            Some(symbol) => {
                self.record(node, symbol);
                self.value_of(symbol)
            }
            None => Target::Value(None),
        }
    }
}
