// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the Java subset checked by guardcheck.
//!
//! Transforms a token stream into an abstract syntax tree. Guard strings
//! found in `@GuardedBy` annotations are parsed with [`parse_expression`].

mod hints;
mod parser;

pub use parser::{ParseError, ParseResult, Parser};

use guardcheck_ast::expr::Expr;
use guardcheck_lexer::Lexer;

/// Lex and parse a source file. Lex errors are reported first.
pub fn parse_compilation_unit(source: &str) -> ParseResult {
    let lexed = Lexer::new(source).tokenize();
    let mut result = Parser::new(lexed.tokens).parse();

    let mut errors: Vec<ParseError> = lexed.errors.into_iter().map(ParseError::from).collect();
    errors.append(&mut result.errors);
    result.errors = errors;

    log::debug!(
        "parsed {} top-level types ({} errors)",
        result.unit.types.len(),
        result.errors.len()
    );
    result
}

/// Parse a standalone expression such as the text of a guard.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let lexed = Lexer::new(source).tokenize();
    if let Some(err) = lexed.errors.into_iter().next() {
        return Err(err.into());
    }
    Parser::new(lexed.tokens).parse_standalone_expr()
}
