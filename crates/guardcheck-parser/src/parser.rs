// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser implementation: recursive descent for declarations and
//! statements, precedence climbing for expressions.

use guardcheck_ast::decl::{
    Annotation, AnnotationArg, ClassDecl, ClassKind, CompilationUnit, EnumConstant, FieldDecl,
    Import, Initializer, Member, MemberKind, MethodDecl, Modifier, Modifiers, Param,
};
use guardcheck_ast::expr::{BinOp, Expr, ExprKind, LambdaBody, UnaryOp};
use guardcheck_ast::stmt::{
    CatchClause, Resource, Stmt, StmtKind, SwitchCase, TryStmt, VarDeclarator,
};
use guardcheck_ast::token::{Token, TokenKind};
use guardcheck_ast::{NodeId, Span};
use guardcheck_lexer::LexError;
use thiserror::Error;

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// Precedence of relational operators, shared with `instanceof`.
const RELATIONAL_PREC: u8 = 7;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

/// The parser for Java source code.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Cleared while parsing `case` labels, where `X ->` is not a lambda
    allow_lambda: bool,
    /// Collected errors during parsing
    errors: Vec<ParseError>,
    /// Counter for generating unique NodeIds
    next_node_id: u32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(end, end),
            });
        }
        Self {
            tokens,
            pos: 0,
            allow_lambda: true,
            errors: Vec::new(),
            next_node_id: 0,
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Record error, return if should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        self.errors.push(error);
        self.errors.len() < MAX_ERRORS
    }

    /// Skip to the next top-level declaration after an error.
    fn synchronize(&mut self) {
        let mut brace_depth = 0;
        self.advance();

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            return;
                        }
                    }
                }
                kind if brace_depth == 0
                    && (kind.is_modifier()
                        || matches!(
                            kind,
                            TokenKind::Class | TokenKind::Interface | TokenKind::Enum
                        )) =>
                {
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.kind_at(self.pos + n)
    }

    fn kind_at(&self, index: usize) -> &TokenKind {
        self.tokens
            .get(index)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        if !self.at_end() {
            self.pos += 1;
        }
        &self.tokens[index]
    }

    /// End offset of the last consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].span.end,
            None => 0,
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(
                kind.display_name(),
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::expected(
                "a name",
                self.current_kind(),
                self.current().span,
            ))
        }
    }

    /// Whether the tokens at `index` and `index + 1` touch with no gap.
    fn adjacent(&self, index: usize) -> bool {
        match (self.tokens.get(index), self.tokens.get(index + 1)) {
            (Some(a), Some(b)) => a.span.end == b.span.start,
            _ => false,
        }
    }

    fn mk_expr(&mut self, kind: ExprKind, start: usize) -> Expr {
        Expr {
            id: self.next_id(),
            kind,
            span: Span::new(start, self.prev_end()),
        }
    }

    fn mk_stmt(&mut self, kind: StmtKind, start: usize) -> Stmt {
        Stmt {
            id: self.next_id(),
            kind,
            span: Span::new(start, self.prev_end()),
        }
    }

    // =========================================================================
    // Compilation Units
    // =========================================================================

    /// Parse a whole compilation unit.
    pub fn parse(mut self) -> ParseResult {
        let mut unit = CompilationUnit::default();

        if self.check(&TokenKind::Package) {
            match self.parse_package() {
                Ok(package) => unit.package = Some(package),
                Err(e) => {
                    self.record_error(e);
                    self.skip_past_semi();
                }
            }
        }

        while self.check(&TokenKind::Import) {
            match self.parse_import() {
                Ok(import) => unit.imports.push(import),
                Err(e) => {
                    if !self.record_error(e) {
                        return ParseResult { unit, errors: self.errors };
                    }
                    self.skip_past_semi();
                }
            }
        }

        while !self.at_end() {
            if self.match_token(&TokenKind::Semi) {
                continue;
            }
            match self.parse_type_decl() {
                Ok(class) => unit.types.push(class),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize();
                }
            }
        }

        ParseResult { unit, errors: self.errors }
    }

    /// Parse the whole token stream as a single expression.
    pub fn parse_standalone_expr(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        if !self.at_end() {
            return Err(ParseError::expected(
                "end of expression",
                self.current_kind(),
                self.current().span,
            ));
        }
        Ok(expr)
    }

    fn skip_past_semi(&mut self) {
        while !self.at_end() && !self.match_token(&TokenKind::Semi) {
            self.advance();
        }
    }

    fn parse_package(&mut self) -> Result<String, ParseError> {
        self.expect(&TokenKind::Package)?;
        let name = self.parse_qualified_name()?;
        self.expect(&TokenKind::Semi)?;
        Ok(name)
    }

    fn parse_import(&mut self) -> Result<Import, ParseError> {
        let start = self.expect(&TokenKind::Import)?.span.start;
        let is_static = self.match_token(&TokenKind::Static);
        let mut path = self.expect_ident()?;
        let mut is_wildcard = false;
        while self.match_token(&TokenKind::Dot) {
            if self.match_token(&TokenKind::Star) {
                is_wildcard = true;
                break;
            }
            path.push('.');
            path.push_str(&self.expect_ident()?);
        }
        self.expect(&TokenKind::Semi)?;
        Ok(Import {
            path,
            is_static,
            is_wildcard,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_qualified_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident()?;
        while self.check(&TokenKind::Dot) && matches!(self.peek(1), TokenKind::Ident(_)) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_type_decl(&mut self) -> Result<ClassDecl, ParseError> {
        let start = self.current().span.start;
        let modifiers = self.parse_modifiers()?;
        self.parse_class_after_modifiers(modifiers, start)
    }

    fn parse_class_after_modifiers(
        &mut self,
        modifiers: Modifiers,
        start: usize,
    ) -> Result<ClassDecl, ParseError> {
        let kind = match self.current_kind() {
            TokenKind::Class => ClassKind::Class,
            TokenKind::Interface => ClassKind::Interface,
            TokenKind::Enum => ClassKind::Enum,
            // Annotation type: `@interface Name { ... }`
            TokenKind::At if matches!(self.peek(1), TokenKind::Interface) => {
                self.advance();
                ClassKind::Interface
            }
            _ => {
                return Err(ParseError::expected(
                    "type declaration (class, interface, enum)",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };
        self.advance();

        let id = self.next_id();
        let name = self.expect_ident()?;
        let type_params = self.parse_type_params()?;

        let mut superclass = None;
        let mut interfaces = Vec::new();
        if self.match_token(&TokenKind::Extends) {
            if kind == ClassKind::Interface {
                interfaces = self.parse_type_list()?;
            } else {
                superclass = Some(self.parse_type()?);
            }
        }
        if self.match_token(&TokenKind::Implements) {
            interfaces.extend(self.parse_type_list()?);
        }

        let members = self.parse_class_body(&name, kind == ClassKind::Enum)?;

        Ok(ClassDecl {
            id,
            name,
            kind,
            modifiers,
            type_params,
            superclass,
            interfaces,
            members,
            span: Span::new(start, self.prev_end()),
        })
    }

    /// Body of `new T(...) { ... }` or of an enum constant.
    fn parse_anonymous_body(
        &mut self,
        superclass: String,
        start: usize,
    ) -> Result<ClassDecl, ParseError> {
        let id = self.next_id();
        let members = self.parse_class_body("", false)?;
        Ok(ClassDecl {
            id,
            name: String::new(),
            kind: ClassKind::Anonymous,
            modifiers: Modifiers::default(),
            type_params: Vec::new(),
            superclass: Some(superclass),
            interfaces: Vec::new(),
            members,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::default();
        loop {
            match self.current_kind() {
                TokenKind::At if !matches!(self.peek(1), TokenKind::Interface) => {
                    let annotation = self.parse_annotation()?;
                    modifiers.annotations.push(annotation);
                }
                kind => match modifier_of(kind) {
                    Some(modifier) => {
                        self.advance();
                        modifiers.keywords.push(modifier);
                    }
                    None => break,
                },
            }
        }
        Ok(modifiers)
    }

    fn parse_annotation(&mut self) -> Result<Annotation, ParseError> {
        let start = self.expect(&TokenKind::At)?.span.start;
        let name = self.parse_qualified_name()?;
        let mut args = Vec::new();

        if self.match_token(&TokenKind::LParen) {
            if !self.check(&TokenKind::RParen) {
                let named = matches!(self.current_kind(), TokenKind::Ident(_))
                    && matches!(self.peek(1), TokenKind::Eq);
                if named {
                    loop {
                        let arg_name = self.expect_ident()?;
                        self.expect(&TokenKind::Eq)?;
                        let value = self.parse_element_value()?;
                        args.push(AnnotationArg { name: Some(arg_name), value });
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                } else {
                    let value = self.parse_element_value()?;
                    args.push(AnnotationArg { name: None, value });
                }
            }
            self.expect(&TokenKind::RParen)?;
        }

        Ok(Annotation {
            name,
            args,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_element_value(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        match self.current_kind() {
            TokenKind::LBrace => {
                let items = self.parse_array_items(Self::parse_element_value)?;
                Ok(self.mk_expr(ExprKind::ArrayInit(items), start))
            }
            TokenKind::At => {
                // Nested annotations carry no guard information.
                self.parse_annotation()?;
                Ok(self.mk_expr(ExprKind::Null, start))
            }
            _ => self.parse_ternary(),
        }
    }

    fn parse_type_params(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();
        if !self.match_token(&TokenKind::Lt) {
            return Ok(params);
        }
        loop {
            while self.check(&TokenKind::At) {
                self.parse_annotation()?;
            }
            params.push(self.expect_ident()?);
            if self.match_token(&TokenKind::Extends) {
                self.parse_type()?;
                while self.match_token(&TokenKind::Amp) {
                    self.parse_type()?;
                }
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok(params)
    }

    /// Parse a type, rendered back to source form without whitespace.
    fn parse_type(&mut self) -> Result<String, ParseError> {
        while self.check(&TokenKind::At) {
            self.parse_annotation()?;
        }
        if !matches!(self.current_kind(), TokenKind::Ident(_)) {
            return Err(ParseError::expected(
                "type",
                self.current_kind(),
                self.current().span,
            ));
        }

        let mut ty = String::new();
        loop {
            ty.push_str(&self.expect_ident()?);
            if self.check(&TokenKind::Lt) {
                ty.push_str(&self.parse_type_args()?);
            }
            if self.check(&TokenKind::Dot) && matches!(self.peek(1), TokenKind::Ident(_)) {
                self.advance();
                ty.push('.');
            } else {
                break;
            }
        }
        self.parse_dims(&mut ty);
        Ok(ty)
    }

    /// Consume `[]` pairs, appending them to `ty`.
    fn parse_dims(&mut self, ty: &mut String) {
        while self.check(&TokenKind::LBracket) && matches!(self.peek(1), TokenKind::RBracket) {
            self.advance();
            self.advance();
            ty.push_str("[]");
        }
    }

    fn parse_type_args(&mut self) -> Result<String, ParseError> {
        self.expect(&TokenKind::Lt)?;
        let mut rendered = String::from("<");
        if self.match_token(&TokenKind::Gt) {
            rendered.push('>');
            return Ok(rendered);
        }
        loop {
            if self.match_token(&TokenKind::Question) {
                rendered.push('?');
                if self.match_token(&TokenKind::Extends) {
                    rendered.push_str(" extends ");
                    rendered.push_str(&self.parse_type()?);
                } else if self.match_token(&TokenKind::Super) {
                    rendered.push_str(" super ");
                    rendered.push_str(&self.parse_type()?);
                }
            } else {
                rendered.push_str(&self.parse_type()?);
            }
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            rendered.push(',');
        }
        self.expect(&TokenKind::Gt)?;
        rendered.push('>');
        Ok(rendered)
    }

    fn parse_type_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut types = vec![self.parse_type()?];
        while self.match_token(&TokenKind::Comma) {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    fn parse_class_body(
        &mut self,
        class_name: &str,
        is_enum: bool,
    ) -> Result<Vec<Member>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();

        if is_enum {
            self.parse_enum_constants(class_name, &mut members)?;
        }

        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            match self.parse_member(class_name) {
                Ok(Some(member)) => members.push(member),
                Ok(None) => {}
                Err(e) => {
                    if !self.record_error(e) {
                        self.skip_to_closing_brace();
                        break;
                    }
                    self.synchronize_in_class();
                }
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(members)
    }

    fn parse_enum_constants(
        &mut self,
        enum_name: &str,
        members: &mut Vec<Member>,
    ) -> Result<(), ParseError> {
        loop {
            let start = self.current().span.start;
            while self.check(&TokenKind::At) {
                self.parse_annotation()?;
            }
            let name = match self.current_kind() {
                TokenKind::Ident(name) => name.clone(),
                _ => break,
            };
            self.advance();

            let args = if self.check(&TokenKind::LParen) {
                self.parse_args()?
            } else {
                Vec::new()
            };
            let body = if self.check(&TokenKind::LBrace) {
                Some(Box::new(self.parse_anonymous_body(enum_name.to_string(), start)?))
            } else {
                None
            };

            let id = self.next_id();
            members.push(Member {
                id,
                kind: MemberKind::EnumConstant(EnumConstant { name, args, body }),
                span: Span::new(start, self.prev_end()),
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        if !self.check(&TokenKind::RBrace) {
            self.expect(&TokenKind::Semi)?;
        }
        Ok(())
    }

    fn member(&mut self, kind: MemberKind, start: usize) -> Member {
        Member {
            id: self.next_id(),
            kind,
            span: Span::new(start, self.prev_end()),
        }
    }

    /// Parse one class member; `None` for a stray `;`.
    fn parse_member(&mut self, class_name: &str) -> Result<Option<Member>, ParseError> {
        let start = self.current().span.start;

        if self.match_token(&TokenKind::Semi) {
            return Ok(None);
        }

        // Initializer blocks
        if self.check(&TokenKind::LBrace) {
            let body = self.parse_block()?;
            let init = Initializer { is_static: false, body };
            return Ok(Some(self.member(MemberKind::Initializer(init), start)));
        }
        if self.check(&TokenKind::Static) && matches!(self.peek(1), TokenKind::LBrace) {
            self.advance();
            let body = self.parse_block()?;
            let init = Initializer { is_static: true, body };
            return Ok(Some(self.member(MemberKind::Initializer(init), start)));
        }

        let modifiers = self.parse_modifiers()?;

        let nested = matches!(
            self.current_kind(),
            TokenKind::Class | TokenKind::Interface | TokenKind::Enum
        ) || (self.check(&TokenKind::At) && matches!(self.peek(1), TokenKind::Interface));
        if nested {
            let class = self.parse_class_after_modifiers(modifiers, start)?;
            return Ok(Some(self.member(MemberKind::Class(class), start)));
        }

        let type_params = self.parse_type_params()?;

        // Constructor: the class name directly followed by `(`
        if let TokenKind::Ident(name) = self.current_kind() {
            if name == class_name && matches!(self.peek(1), TokenKind::LParen) {
                let name = name.clone();
                self.advance();
                let method = self.parse_method_rest(name, modifiers, type_params, None, start)?;
                return Ok(Some(self.member(MemberKind::Method(method), start)));
            }
        }

        let ty = if self.match_token(&TokenKind::Void) {
            "void".to_string()
        } else {
            self.parse_type()?
        };
        let name_start = self.current().span.start;
        let name = self.expect_ident()?;

        if self.check(&TokenKind::LParen) {
            let method = self.parse_method_rest(name, modifiers, type_params, Some(ty), start)?;
            return Ok(Some(self.member(MemberKind::Method(method), start)));
        }

        let declarators = self.parse_declarators(name, name_start)?;
        self.expect(&TokenKind::Semi)?;
        let field = FieldDecl { modifiers, ty, declarators };
        Ok(Some(self.member(MemberKind::Field(field), start)))
    }

    fn parse_method_rest(
        &mut self,
        name: String,
        modifiers: Modifiers,
        type_params: Vec<String>,
        ret_ty: Option<String>,
        start: usize,
    ) -> Result<MethodDecl, ParseError> {
        let id = self.next_id();
        let params = self.parse_params()?;
        let mut discarded = String::new();
        self.parse_dims(&mut discarded);

        let throws = if self.match_token(&TokenKind::Throws) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };

        // Annotation element default: `String value() default "";`
        if self.match_token(&TokenKind::Default) {
            self.parse_element_value()?;
        }

        let body = if self.match_token(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(MethodDecl {
            id,
            name,
            modifiers,
            type_params,
            ret_ty,
            params,
            throws,
            body,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            let start = self.current().span.start;
            let modifiers = self.parse_modifiers()?;
            let mut ty = self.parse_type()?;
            let is_varargs = self.match_token(&TokenKind::Ellipsis);

            // Explicit receiver parameter: `Foo this`
            if self.match_token(&TokenKind::This) {
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                continue;
            }

            let name = self.expect_ident()?;
            self.parse_dims(&mut ty);
            let id = self.next_id();
            params.push(Param {
                id,
                name,
                ty,
                modifiers,
                is_varargs,
                span: Span::new(start, self.prev_end()),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// Parse the declarators of a field or local, the first name already consumed.
    fn parse_declarators(
        &mut self,
        first: String,
        first_start: usize,
    ) -> Result<Vec<VarDeclarator>, ParseError> {
        let mut declarators = vec![self.parse_declarator_rest(first, first_start)?];
        while self.match_token(&TokenKind::Comma) {
            let start = self.current().span.start;
            let name = self.expect_ident()?;
            declarators.push(self.parse_declarator_rest(name, start)?);
        }
        Ok(declarators)
    }

    fn parse_declarator_rest(
        &mut self,
        name: String,
        start: usize,
    ) -> Result<VarDeclarator, ParseError> {
        let mut discarded = String::new();
        self.parse_dims(&mut discarded);
        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_var_init()?)
        } else {
            None
        };
        Ok(VarDeclarator {
            id: self.next_id(),
            name,
            init,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_var_init(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::LBrace) {
            let start = self.current().span.start;
            let items = self.parse_array_items(Self::parse_var_init)?;
            Ok(self.mk_expr(ExprKind::ArrayInit(items), start))
        } else {
            self.parse_expr()
        }
    }

    fn parse_array_items(
        &mut self,
        elem: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            items.push(elem(self)?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(items)
    }

    /// Skip to the next member boundary inside a class body.
    fn synchronize_in_class(&mut self) {
        let mut depth = 0;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse a block body (statements inside braces), with error recovery.
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let before = self.pos;
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    if !self.record_error(e) {
                        self.skip_to_closing_brace();
                        break;
                    }
                    self.recover_in_block(before);
                }
            }
        }

        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    /// Recover from a failed statement that began at token `before`.
    fn recover_in_block(&mut self, before: usize) {
        if self.pos == before && !self.check(&TokenKind::RBrace) {
            self.advance();
        }
        self.synchronize_in_block();
    }

    /// Synchronize within a block - skip to the next statement boundary.
    fn synchronize_in_block(&mut self) {
        let mut depth = 0;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::RBrace => depth -= 1,
                TokenKind::LBrace => depth += 1,
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Do
                | TokenKind::Return
                | TokenKind::Try
                | TokenKind::Throw
                | TokenKind::Switch
                | TokenKind::Synchronized
                    if depth == 0 =>
                {
                    return
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to the closing brace of a block.
    fn skip_to_closing_brace(&mut self) {
        let mut depth = 1;
        while !self.at_end() && depth > 0 {
            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                self.advance();
            }
        }
    }

    /// Parse a statement.
    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind() {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Semi => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => {
                self.advance();
                let cond = self.parse_paren_expr()?;
                let body = Box::new(self.parse_stmt()?);
                StmtKind::While { cond, body }
            }
            TokenKind::Do => {
                self.advance();
                let body = Box::new(self.parse_stmt()?);
                self.expect(&TokenKind::While)?;
                let cond = self.parse_paren_expr()?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::DoWhile { body, cond }
            }
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&TokenKind::Semi)?;
                StmtKind::Return(value)
            }
            TokenKind::Throw => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Throw(value)
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = self.check(&TokenKind::Break);
                self.advance();
                let label = match self.current_kind() {
                    TokenKind::Ident(_) => Some(self.expect_ident()?),
                    _ => None,
                };
                self.expect(&TokenKind::Semi)?;
                if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            TokenKind::Try => self.parse_try()?,
            TokenKind::Switch => self.parse_switch()?,
            TokenKind::Synchronized if matches!(self.peek(1), TokenKind::LParen) => {
                self.advance();
                let lock = self.parse_paren_expr()?;
                let body = self.parse_block()?;
                StmtKind::Synchronized { lock, body }
            }
            TokenKind::Assert => {
                self.advance();
                let cond = self.parse_expr()?;
                let message = if self.match_token(&TokenKind::Colon) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.expect(&TokenKind::Semi)?;
                StmtKind::Assert { cond, message }
            }
            TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Enum
            | TokenKind::Final
            | TokenKind::Abstract
            | TokenKind::Static
            | TokenKind::Strictfp
            | TokenKind::At => {
                let modifiers = self.parse_modifiers()?;
                if matches!(
                    self.current_kind(),
                    TokenKind::Class | TokenKind::Interface | TokenKind::Enum
                ) {
                    StmtKind::LocalClass(self.parse_class_after_modifiers(modifiers, start)?)
                } else {
                    self.parse_local_decl()?
                }
            }
            TokenKind::Ident(_) if matches!(self.peek(1), TokenKind::Colon) => {
                let label = self.expect_ident()?;
                self.advance();
                let body = Box::new(self.parse_stmt()?);
                StmtKind::Labeled { label, body }
            }
            _ if self.looks_like_local_decl() => self.parse_local_decl()?,
            _ => {
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::Semi)?;
                StmtKind::Expr(expr)
            }
        };

        Ok(self.mk_stmt(kind, start))
    }

    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_local_decl(&mut self) -> Result<StmtKind, ParseError> {
        let ty = self.parse_type()?;
        let name_start = self.current().span.start;
        let name = self.expect_ident()?;
        let declarators = self.parse_declarators(name, name_start)?;
        self.expect(&TokenKind::Semi)?;
        Ok(StmtKind::Local { ty, declarators })
    }

    fn parse_if(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::If)?;
        let cond = self.parse_paren_expr()?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(StmtKind::If { cond, then_branch, else_branch })
    }

    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::For)?;
        self.expect(&TokenKind::LParen)?;

        let mut init = Vec::new();
        let init_start = self.current().span.start;
        if self.check(&TokenKind::Final) || self.check(&TokenKind::At) || self.looks_like_local_decl() {
            self.parse_modifiers()?;
            let ty = self.parse_type()?;
            let name_start = self.current().span.start;
            let name = self.expect_ident()?;

            if self.match_token(&TokenKind::Colon) {
                let iter = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                return Ok(StmtKind::ForEach { ty, name, iter, body });
            }

            let declarators = self.parse_declarators(name, name_start)?;
            let local = self.mk_stmt(StmtKind::Local { ty, declarators }, init_start);
            init.push(local);
        } else if !self.check(&TokenKind::Semi) {
            for expr in self.parse_expr_list()? {
                let start = expr.span.start;
                let stmt = self.mk_stmt(StmtKind::Expr(expr), start);
                init.push(stmt);
            }
        }
        self.expect(&TokenKind::Semi)?;

        let cond = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semi)?;

        let update = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        self.expect(&TokenKind::RParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::For { init, cond, update, body })
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr()?];
        while self.match_token(&TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_try(&mut self) -> Result<StmtKind, ParseError> {
        let try_span = self.expect(&TokenKind::Try)?.span;

        let mut resources = Vec::new();
        if self.match_token(&TokenKind::LParen) {
            while !self.check(&TokenKind::RParen) && !self.at_end() {
                resources.push(self.parse_resource()?);
                if !self.match_token(&TokenKind::Semi) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }

        let body = self.parse_block()?;

        let mut catches = Vec::new();
        while self.check(&TokenKind::Catch) {
            let start = self.advance().span.start;
            self.expect(&TokenKind::LParen)?;
            self.parse_modifiers()?;
            let mut types = vec![self.parse_type()?];
            while self.match_token(&TokenKind::Pipe) {
                types.push(self.parse_type()?);
            }
            let name = self.expect_ident()?;
            self.expect(&TokenKind::RParen)?;
            let body = self.parse_block()?;
            let id = self.next_id();
            catches.push(CatchClause {
                id,
                types,
                name,
                body,
                span: Span::new(start, self.prev_end()),
            });
        }

        let finally = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if resources.is_empty() && catches.is_empty() && finally.is_none() {
            return Err(ParseError {
                span: try_span,
                message: "'try' without 'catch' or 'finally'".to_string(),
                hint: Some("add a 'catch' or 'finally' block".to_string()),
            });
        }

        Ok(StmtKind::Try(TryStmt { resources, body, catches, finally }))
    }

    fn parse_resource(&mut self) -> Result<Resource, ParseError> {
        let id = self.next_id();
        if self.check(&TokenKind::Final) || self.check(&TokenKind::At) || self.looks_like_local_decl() {
            self.parse_modifiers()?;
            let ty = self.parse_type()?;
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let init = self.parse_expr()?;
            Ok(Resource { id, ty: Some(ty), name: Some(name), init })
        } else {
            let init = self.parse_expr()?;
            Ok(Resource { id, ty: None, name: None, init })
        }
    }

    fn parse_switch(&mut self) -> Result<StmtKind, ParseError> {
        self.expect(&TokenKind::Switch)?;
        let selector = self.parse_paren_expr()?;
        self.expect(&TokenKind::LBrace)?;

        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let mut labels = Vec::new();
            let is_default = self.match_token(&TokenKind::Default);
            if !is_default {
                self.expect(&TokenKind::Case)?;
                self.allow_lambda = false;
                let parsed = self.parse_case_labels(&mut labels);
                self.allow_lambda = true;
                parsed?;
            }

            let body = if self.match_token(&TokenKind::Arrow) {
                if self.check(&TokenKind::LBrace) {
                    self.parse_block()?
                } else {
                    vec![self.parse_stmt()?]
                }
            } else {
                self.expect(&TokenKind::Colon)?;
                let mut body = Vec::new();
                while !matches!(
                    self.current_kind(),
                    TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
                ) {
                    let before = self.pos;
                    match self.parse_stmt() {
                        Ok(stmt) => body.push(stmt),
                        Err(e) => {
                            if !self.record_error(e) {
                                self.skip_to_closing_brace();
                                break;
                            }
                            self.recover_in_block(before);
                        }
                    }
                }
                body
            };

            cases.push(SwitchCase { labels, is_default, body });
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(StmtKind::Switch { selector, cases })
    }

    fn parse_case_labels(&mut self, labels: &mut Vec<Expr>) -> Result<(), ParseError> {
        loop {
            labels.push(self.parse_ternary()?);
            if !self.match_token(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    /// Whether the statement at the cursor starts with `Type name`.
    fn looks_like_local_decl(&self) -> bool {
        let mut i = self.pos;
        if !self.scan_type(&mut i) {
            return false;
        }
        matches!(self.kind_at(i), TokenKind::Ident(_))
            && matches!(
                self.kind_at(i + 1),
                TokenKind::Eq
                    | TokenKind::Semi
                    | TokenKind::Comma
                    | TokenKind::Colon
                    | TokenKind::LBracket
            )
    }

    /// Scan a type starting at `*i` without consuming tokens.
    fn scan_type(&self, i: &mut usize) -> bool {
        loop {
            if !matches!(self.kind_at(*i), TokenKind::Ident(_)) {
                return false;
            }
            *i += 1;
            if matches!(self.kind_at(*i), TokenKind::Lt) && !self.scan_type_args(i) {
                return false;
            }
            if matches!(self.kind_at(*i), TokenKind::Dot)
                && matches!(self.kind_at(*i + 1), TokenKind::Ident(_))
            {
                *i += 1;
            } else {
                break;
            }
        }
        while matches!(self.kind_at(*i), TokenKind::LBracket)
            && matches!(self.kind_at(*i + 1), TokenKind::RBracket)
        {
            *i += 2;
        }
        true
    }

    fn scan_type_args(&self, i: &mut usize) -> bool {
        let mut depth = 0usize;
        loop {
            match self.kind_at(*i) {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        *i += 1;
                        return true;
                    }
                }
                TokenKind::Ident(_)
                | TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::Question
                | TokenKind::Extends
                | TokenKind::Super
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::Amp => {}
                _ => return false,
            }
            *i += 1;
        }
    }

    /// Whether `(` at the cursor starts a cast.
    fn looks_like_cast(&self) -> bool {
        let mut i = self.pos + 1;
        let primitive = matches!(
            self.kind_at(i),
            TokenKind::Ident(name) if PRIMITIVES.contains(&name.as_str())
        );
        if !self.scan_type(&mut i) {
            return false;
        }
        while matches!(self.kind_at(i), TokenKind::Amp) {
            i += 1;
            if !self.scan_type(&mut i) {
                return false;
            }
        }
        if !matches!(self.kind_at(i), TokenKind::RParen) {
            return false;
        }
        // `(int) -x` is a cast, `(a) - x` is a subtraction.
        primitive
            || matches!(
                self.kind_at(i + 1),
                TokenKind::Ident(_)
                    | TokenKind::Int(_)
                    | TokenKind::Float(_)
                    | TokenKind::String(_)
                    | TokenKind::Char(_)
                    | TokenKind::Bool(_)
                    | TokenKind::Null
                    | TokenKind::LParen
                    | TokenKind::This
                    | TokenKind::Super
                    | TokenKind::New
                    | TokenKind::Bang
                    | TokenKind::Tilde
            )
    }

    /// Whether `(` at the cursor opens a lambda parameter list.
    fn looks_like_lambda(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.pos;
        loop {
            match self.kind_at(i) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.kind_at(i + 1), TokenKind::Arrow);
                    }
                }
                TokenKind::Eof | TokenKind::Semi | TokenKind::LBrace => return false,
                _ => {}
            }
            i += 1;
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parse an expression, including assignments.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let lhs = self.parse_ternary()?;

        if let Some(op) = assign_op(self.current_kind()) {
            self.advance();
            let value = self.parse_expr()?;
            return Ok(self.mk_expr(
                ExprKind::Assign {
                    op,
                    target: Box::new(lhs),
                    value: Box::new(value),
                },
                start,
            ));
        }

        Ok(lhs)
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let cond = self.parse_binary(0)?;

        if self.match_token(&TokenKind::Question) {
            let then_expr = self.parse_expr()?;
            self.expect(&TokenKind::Colon)?;
            let else_expr = self.parse_ternary()?;
            return Ok(self.mk_expr(
                ExprKind::Conditional {
                    cond: Box::new(cond),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                },
                start,
            ));
        }

        Ok(cond)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut lhs = self.parse_unary()?;

        loop {
            if self.check(&TokenKind::Instanceof) {
                if RELATIONAL_PREC < min_prec {
                    break;
                }
                self.advance();
                self.match_token(&TokenKind::Final);
                let ty = self.parse_type()?;
                // Pattern binding: `x instanceof Foo f`
                if matches!(self.current_kind(), TokenKind::Ident(_)) {
                    self.advance();
                }
                lhs = self.mk_expr(ExprKind::InstanceOf { expr: Box::new(lhs), ty }, start);
                continue;
            }

            let Some((op, prec, width)) = self.binary_op() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            for _ in 0..width {
                self.advance();
            }
            let rhs = self.parse_binary(prec + 1)?;
            lhs = self.mk_expr(
                ExprKind::Binary {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                start,
            );
        }

        Ok(lhs)
    }

    /// Binary operator at the cursor: operator, precedence, token count.
    ///
    /// `>>` and `>>>` arrive as adjacent `>` tokens so that nested type
    /// arguments close cleanly.
    fn binary_op(&self) -> Option<(BinOp, u8, usize)> {
        let op = match self.current_kind() {
            TokenKind::PipePipe => (BinOp::Or, 1, 1),
            TokenKind::AmpAmp => (BinOp::And, 2, 1),
            TokenKind::Pipe => (BinOp::BitOr, 3, 1),
            TokenKind::Caret => (BinOp::BitXor, 4, 1),
            TokenKind::Amp => (BinOp::BitAnd, 5, 1),
            TokenKind::EqEq => (BinOp::Eq, 6, 1),
            TokenKind::BangEq => (BinOp::Ne, 6, 1),
            TokenKind::Lt => (BinOp::Lt, RELATIONAL_PREC, 1),
            TokenKind::LtEq => (BinOp::Le, RELATIONAL_PREC, 1),
            TokenKind::GtEq => (BinOp::Ge, RELATIONAL_PREC, 1),
            TokenKind::Gt => {
                let pos = self.pos;
                if matches!(self.peek(1), TokenKind::Gt) && self.adjacent(pos) {
                    if matches!(self.peek(2), TokenKind::Gt) && self.adjacent(pos + 1) {
                        (BinOp::UShr, 8, 3)
                    } else {
                        (BinOp::Shr, 8, 2)
                    }
                } else {
                    (BinOp::Gt, RELATIONAL_PREC, 1)
                }
            }
            TokenKind::LtLt => (BinOp::Shl, 8, 1),
            TokenKind::Plus => (BinOp::Add, 9, 1),
            TokenKind::Minus => (BinOp::Sub, 9, 1),
            TokenKind::Star => (BinOp::Mul, 10, 1),
            TokenKind::Slash => (BinOp::Div, 10, 1),
            TokenKind::Percent => (BinOp::Mod, 10, 1),
            _ => return None,
        };
        Some(op)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let op = match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(self.mk_expr(ExprKind::Unary { op, operand: Box::new(operand) }, start));
        }

        if self.check(&TokenKind::LParen) && self.looks_like_cast() {
            self.advance();
            let ty = self.parse_type()?;
            while self.match_token(&TokenKind::Amp) {
                self.parse_type()?;
            }
            self.expect(&TokenKind::RParen)?;
            let operand = self.parse_unary()?;
            return Ok(self.mk_expr(ExprKind::Cast { ty, expr: Box::new(operand) }, start));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;
        let mut expr = self.parse_primary()?;
        if matches!(expr.kind, ExprKind::Lambda { .. }) {
            return Ok(expr);
        }

        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    expr = self.parse_after_dot(expr, start)?;
                }
                // Array class literal: `String[].class`
                TokenKind::LBracket if matches!(self.peek(1), TokenKind::RBracket) => {
                    let mut ty = self.type_name_of(&expr)?;
                    self.parse_dims(&mut ty);
                    self.expect(&TokenKind::Dot)?;
                    self.expect(&TokenKind::Class)?;
                    expr = self.mk_expr(ExprKind::ClassLit(ty), start);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(&TokenKind::RBracket)?;
                    expr = self.mk_expr(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        start,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check(&TokenKind::PlusPlus) {
                        UnaryOp::PostInc
                    } else {
                        UnaryOp::PostDec
                    };
                    self.advance();
                    expr = self.mk_expr(ExprKind::Unary { op, operand: Box::new(expr) }, start);
                }
                TokenKind::ColonColon => {
                    self.advance();
                    let name = if self.match_token(&TokenKind::New) {
                        "new".to_string()
                    } else {
                        self.expect_ident()?
                    };
                    expr = self.mk_expr(ExprKind::MethodRef { target: Box::new(expr), name }, start);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_after_dot(&mut self, object: Expr, start: usize) -> Result<Expr, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(self.mk_expr(
                        ExprKind::Call {
                            receiver: Some(Box::new(object)),
                            method: name,
                            args,
                        },
                        start,
                    ))
                } else {
                    Ok(self.mk_expr(ExprKind::Select { object: Box::new(object), name }, start))
                }
            }
            // Explicit type arguments: `this.<T>foo()`
            TokenKind::Lt => {
                self.parse_type_args()?;
                let method = self.expect_ident()?;
                let args = self.parse_args()?;
                Ok(self.mk_expr(
                    ExprKind::Call {
                        receiver: Some(Box::new(object)),
                        method,
                        args,
                    },
                    start,
                ))
            }
            TokenKind::This => {
                let qualifier = self.type_name_of(&object)?;
                self.advance();
                Ok(self.mk_expr(ExprKind::QualifiedThis(qualifier), start))
            }
            TokenKind::Class => {
                let ty = self.type_name_of(&object)?;
                self.advance();
                Ok(self.mk_expr(ExprKind::ClassLit(ty), start))
            }
            // `Iface.super.m()` dispatches like `super.m()`.
            TokenKind::Super => {
                self.advance();
                Ok(self.mk_expr(ExprKind::Super, start))
            }
            // Inner class creation: `outer.new Inner()`
            TokenKind::New => self.parse_new(start),
            _ => Err(ParseError::expected(
                "a name",
                self.current_kind(),
                self.current().span,
            )),
        }
    }

    fn type_name_of(&self, expr: &Expr) -> Result<String, ParseError> {
        expr.dotted_name().ok_or_else(|| ParseError {
            span: expr.span,
            message: "Expected a type name".to_string(),
            hint: Some("only 'Name.this' and 'Name.class' are allowed here".to_string()),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span.start;

        let kind = match self.current_kind().clone() {
            TokenKind::Int(n) => {
                self.advance();
                ExprKind::Int(n)
            }
            TokenKind::Float(n) => {
                self.advance();
                ExprKind::Float(n)
            }
            TokenKind::String(s) => {
                self.advance();
                ExprKind::String(s)
            }
            TokenKind::Char(c) => {
                self.advance();
                ExprKind::Char(c)
            }
            TokenKind::Bool(b) => {
                self.advance();
                ExprKind::Bool(b)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::This => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    ExprKind::Call { receiver: None, method: "this".to_string(), args }
                } else {
                    ExprKind::This
                }
            }
            TokenKind::Super => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    ExprKind::Call { receiver: None, method: "super".to_string(), args }
                } else {
                    ExprKind::Super
                }
            }
            TokenKind::New => return self.parse_new(start),
            TokenKind::Ident(name) => {
                if self.allow_lambda && matches!(self.peek(1), TokenKind::Arrow) {
                    return self.parse_lambda(start);
                }
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    ExprKind::Call { receiver: None, method: name, args }
                } else {
                    ExprKind::Ident(name)
                }
            }
            TokenKind::LParen => {
                if self.allow_lambda && self.looks_like_lambda() {
                    return self.parse_lambda(start);
                }
                self.advance();
                let saved = self.allow_lambda;
                self.allow_lambda = true;
                let inner = self.parse_expr();
                self.allow_lambda = saved;
                let inner = inner?;
                self.expect(&TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Void => {
                self.advance();
                self.expect(&TokenKind::Dot)?;
                self.expect(&TokenKind::Class)?;
                ExprKind::ClassLit("void".to_string())
            }
            _ => {
                return Err(ParseError::expected(
                    "expression",
                    self.current_kind(),
                    self.current().span,
                ))
            }
        };

        Ok(self.mk_expr(kind, start))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            args.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_new(&mut self, start: usize) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::New)?;
        while self.check(&TokenKind::At) {
            self.parse_annotation()?;
        }

        let mut class = String::new();
        loop {
            class.push_str(&self.expect_ident()?);
            if self.check(&TokenKind::Lt) {
                class.push_str(&self.parse_type_args()?);
            }
            if self.check(&TokenKind::Dot) && matches!(self.peek(1), TokenKind::Ident(_)) {
                self.advance();
                class.push('.');
            } else {
                break;
            }
        }

        if self.check(&TokenKind::LBracket) {
            let mut dims = Vec::new();
            while self.match_token(&TokenKind::LBracket) {
                if self.match_token(&TokenKind::RBracket) {
                    continue;
                }
                dims.push(self.parse_expr()?);
                self.expect(&TokenKind::RBracket)?;
            }
            let init = if self.check(&TokenKind::LBrace) {
                Some(self.parse_array_items(Self::parse_var_init)?)
            } else {
                None
            };
            return Ok(self.mk_expr(ExprKind::NewArray { elem: class, dims, init }, start));
        }

        let args = self.parse_args()?;
        let body = if self.check(&TokenKind::LBrace) {
            Some(Box::new(self.parse_anonymous_body(class.clone(), start)?))
        } else {
            None
        };
        Ok(self.mk_expr(ExprKind::New { class, args, body }, start))
    }

    fn parse_lambda(&mut self, start: usize) -> Result<Expr, ParseError> {
        let params = if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            vec![name]
        } else {
            self.expect(&TokenKind::LParen)?;
            let mut params = Vec::new();
            // Each parameter is `name`, `Type name` or `final Type name`;
            // the last identifier before the separator is the name.
            let mut last = None;
            let mut angle_depth = 0usize;
            loop {
                match self.current_kind() {
                    TokenKind::RParen | TokenKind::Eof => break,
                    TokenKind::Comma if angle_depth == 0 => {
                        params.extend(last.take());
                    }
                    TokenKind::Lt => angle_depth += 1,
                    TokenKind::Gt => angle_depth = angle_depth.saturating_sub(1),
                    TokenKind::Ident(name) => last = Some(name.clone()),
                    _ => {}
                }
                self.advance();
            }
            params.extend(last);
            self.expect(&TokenKind::RParen)?;
            params
        };

        self.expect(&TokenKind::Arrow)?;
        let body = if self.check(&TokenKind::LBrace) {
            LambdaBody::Block(self.parse_block()?)
        } else {
            LambdaBody::Expr(Box::new(self.parse_expr()?))
        };

        Ok(self.mk_expr(ExprKind::Lambda { params, body }, start))
    }
}

fn modifier_of(kind: &TokenKind) -> Option<Modifier> {
    let modifier = match kind {
        TokenKind::Public => Modifier::Public,
        TokenKind::Protected => Modifier::Protected,
        TokenKind::Private => Modifier::Private,
        TokenKind::Static => Modifier::Static,
        TokenKind::Final => Modifier::Final,
        TokenKind::Abstract => Modifier::Abstract,
        TokenKind::Synchronized => Modifier::Synchronized,
        TokenKind::Volatile => Modifier::Volatile,
        TokenKind::Transient => Modifier::Transient,
        TokenKind::Native => Modifier::Native,
        TokenKind::Strictfp => Modifier::Strictfp,
        TokenKind::Default => Modifier::Default,
        _ => return None,
    };
    Some(modifier)
}

/// Assignment operator at `kind`; the inner `Option` is the compound operator.
fn assign_op(kind: &TokenKind) -> Option<Option<BinOp>> {
    let op = match kind {
        TokenKind::Eq => None,
        TokenKind::PlusEq => Some(BinOp::Add),
        TokenKind::MinusEq => Some(BinOp::Sub),
        TokenKind::StarEq => Some(BinOp::Mul),
        TokenKind::SlashEq => Some(BinOp::Div),
        TokenKind::PercentEq => Some(BinOp::Mod),
        TokenKind::AmpEq => Some(BinOp::BitAnd),
        TokenKind::PipeEq => Some(BinOp::BitOr),
        TokenKind::CaretEq => Some(BinOp::BitXor),
        TokenKind::LtLtEq => Some(BinOp::Shl),
        TokenKind::GtGtEq => Some(BinOp::Shr),
        TokenKind::GtGtGtEq => Some(BinOp::UShr),
        _ => return None,
    };
    Some(op)
}

/// Result of parsing a compilation unit.
#[derive(Debug)]
pub struct ParseResult {
    pub unit: CompilationUnit,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parser error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self { span, message, hint }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            span: err.span,
            message: err.message,
            hint: err.hint,
        }
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "';'" => format!("Expected ';' after statement, found {}", found.display_name()),
        "'{'" => format!("Expected '{{' to start block, found {}", found.display_name()),
        "'}'" => format!("Expected '}}' to close block, found {}", found.display_name()),
        "')'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '(' - missing ')'".to_string()
            } else {
                format!("Expected ')', found {}", found.display_name())
            }
        }
        "']'" => {
            if matches!(found, TokenKind::Eof) {
                "Unclosed '[' - missing ']'".to_string()
            } else {
                format!("Expected ']', found {}", found.display_name())
            }
        }
        "a name" => format!("Expected name, found {}", found.display_name()),
        "end of expression" => {
            format!("Unexpected {} after expression", found.display_name())
        }
        s if s.starts_with("type declaration") => {
            format!("Expected type declaration, found {}", found.display_name())
        }
        _ => format!("Expected {}, found {}", expected, found.display_name()),
    }
}
