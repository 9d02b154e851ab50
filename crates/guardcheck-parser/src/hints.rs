// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use guardcheck_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("';'", TokenKind::RBrace) => Some("the last statement of a block still needs ';'"),
        ("';'", _) => Some("statements and field declarations end with ';'"),

        // Block hints
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", TokenKind::Eof) => Some("every '{' needs a matching '}'"),

        // Parentheses and brackets
        ("'('", _) => Some("method calls and control statements need parentheses"),
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("'>'", _) => Some("close the type argument list with '>'"),

        // Expression hints
        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", _) => Some("try a value, variable, or method call"),
        ("end of expression", _) => Some("a guard names exactly one lock expression"),

        // Names and types
        ("a name", TokenKind::Int(_)) => Some("names can't start with a number"),
        ("a name", _) => Some("names start with a letter, '_' or '$'"),
        ("type", _) => Some("try a type like 'int', 'Object' or 'List<String>'"),
        (s, _) if s.starts_with("type declaration") => {
            Some("top-level declarations start with 'class', 'interface' or 'enum'")
        }

        _ => None,
    }
}
