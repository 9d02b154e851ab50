// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use guardcheck_ast::token::{Token, TokenKind};
use guardcheck_ast::Span;
use logos::Logos;
use thiserror::Error;

/// Raw token type for logos - literal values are parsed in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Keywords ===
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("public")]
    Public,
    #[token("protected")]
    Protected,
    #[token("private")]
    Private,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("abstract")]
    Abstract,
    #[token("synchronized")]
    Synchronized,
    #[token("volatile")]
    Volatile,
    #[token("transient")]
    Transient,
    #[token("native")]
    Native,
    #[token("strictfp")]
    Strictfp,
    #[token("default")]
    Default,
    #[token("void")]
    Void,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("new")]
    New,
    #[token("instanceof")]
    Instanceof,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("throw")]
    Throw,
    #[token("throws")]
    Throws,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("assert")]
    Assert,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Operators (logos picks the longest match) ===
    #[token(">>>=")]
    GtGtGtEq,
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,
    #[token("...")]
    Ellipsis,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<<")]
    LtLt,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    // `>>` and `>>>` are reassembled by the parser so nested generics close cleanly.
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("@")]
    At,
    #[token(".")]
    Dot,

    // === Delimiters ===
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // === Comments (skip them) ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F_]+[lL]?")]
    HexInt,

    #[regex(r"0[bB][01_]+[lL]?")]
    BinInt,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdD]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdD]?")]
    #[regex(r"[0-9][0-9_]*[fFdD]")]
    Float,

    #[regex(r"[0-9][0-9_]*[lL]?")]
    DecInt,

    #[regex(r"'([^'\\\n]|\\[^u\n]|\\u+[0-9a-fA-F]{4})'")]
    Char,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    // === Identifier (must come after keywords) ===
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,
}

/// Skip a (non-nesting) block comment.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let consumed = match lexer.remainder().find("*/") {
        Some(end) => end + 2,
        // Unterminated: swallow the rest of the file.
        None => lexer.remainder().len(),
    };
    lexer.bump(consumed);
    logos::Skip
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for Java source code.
pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, errors: Vec::new() }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut logos_lexer = RawToken::lexer(self.source);

        while let Some(result) = logos_lexer.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let span = logos_lexer.span();
            let slice = logos_lexer.slice();

            let kind = match result {
                Ok(raw) => match convert_token(raw, slice, span.start, span.end) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) => {
                    let ch = self.source[span.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, span.start));
                    continue;
                }
            };

            tokens.push(Token {
                kind,
                span: Span::new(span.start, span.end),
            });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }
}

/// Convert a raw logos token to a `TokenKind`, parsing literal values.
fn convert_token(raw: RawToken, slice: &str, start: usize, end: usize) -> Result<TokenKind, LexError> {
    Ok(match raw {
        RawToken::Package => TokenKind::Package,
        RawToken::Import => TokenKind::Import,
        RawToken::Class => TokenKind::Class,
        RawToken::Interface => TokenKind::Interface,
        RawToken::Enum => TokenKind::Enum,
        RawToken::Extends => TokenKind::Extends,
        RawToken::Implements => TokenKind::Implements,
        RawToken::Public => TokenKind::Public,
        RawToken::Protected => TokenKind::Protected,
        RawToken::Private => TokenKind::Private,
        RawToken::Static => TokenKind::Static,
        RawToken::Final => TokenKind::Final,
        RawToken::Abstract => TokenKind::Abstract,
        RawToken::Synchronized => TokenKind::Synchronized,
        RawToken::Volatile => TokenKind::Volatile,
        RawToken::Transient => TokenKind::Transient,
        RawToken::Native => TokenKind::Native,
        RawToken::Strictfp => TokenKind::Strictfp,
        RawToken::Default => TokenKind::Default,
        RawToken::Void => TokenKind::Void,
        RawToken::This => TokenKind::This,
        RawToken::Super => TokenKind::Super,
        RawToken::New => TokenKind::New,
        RawToken::Instanceof => TokenKind::Instanceof,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::For => TokenKind::For,
        RawToken::Return => TokenKind::Return,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Throw => TokenKind::Throw,
        RawToken::Throws => TokenKind::Throws,
        RawToken::Try => TokenKind::Try,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Finally => TokenKind::Finally,
        RawToken::Switch => TokenKind::Switch,
        RawToken::Case => TokenKind::Case,
        RawToken::Assert => TokenKind::Assert,
        RawToken::True => TokenKind::Bool(true),
        RawToken::False => TokenKind::Bool(false),
        RawToken::Null => TokenKind::Null,

        RawToken::GtGtGtEq => TokenKind::GtGtGtEq,
        RawToken::LtLtEq => TokenKind::LtLtEq,
        RawToken::GtGtEq => TokenKind::GtGtEq,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::LtLt => TokenKind::LtLt,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Question => TokenKind::Question,
        RawToken::Colon => TokenKind::Colon,
        RawToken::At => TokenKind::At,
        RawToken::Dot => TokenKind::Dot,

        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,

        RawToken::DecInt => {
            let digits = clean_digits(slice.trim_end_matches(['l', 'L']));
            let radix = if digits.len() > 1 && digits.starts_with('0') { 8 } else { 10 };
            TokenKind::Int(parse_int(&digits, radix, start, end)?)
        }
        RawToken::HexInt => {
            let digits = clean_digits(slice[2..].trim_end_matches(['l', 'L']));
            TokenKind::Int(parse_int(&digits, 16, start, end)?)
        }
        RawToken::BinInt => {
            let digits = clean_digits(slice[2..].trim_end_matches(['l', 'L']));
            TokenKind::Int(parse_int(&digits, 2, start, end)?)
        }
        RawToken::Float => {
            let digits = clean_digits(slice.trim_end_matches(['f', 'F', 'd', 'D']));
            let value = digits
                .parse::<f64>()
                .map_err(|_| LexError::invalid_number(start, end))?;
            TokenKind::Float(value)
        }
        RawToken::Char => {
            let inner = &slice[1..slice.len() - 1];
            let text = parse_string(inner, start)?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => TokenKind::Char(c),
                _ => return Err(LexError::invalid_escape(start)),
            }
        }
        RawToken::String => {
            let inner = &slice[1..slice.len() - 1];
            TokenKind::String(parse_string(inner, start)?)
        }
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        RawToken::LineComment | RawToken::BlockComment => {
            unreachable!("comments are skipped")
        }
    })
}

fn clean_digits(s: &str) -> String {
    s.chars().filter(|c| *c != '_').collect()
}

/// Parse an integer literal. Java allows literals up to 2^64 - 1 in
/// non-decimal radixes, so they are read unsigned and reinterpreted.
fn parse_int(digits: &str, radix: u32, start: usize, end: usize) -> Result<i64, LexError> {
    u64::from_str_radix(digits, radix)
        .map(|v| v as i64)
        .map_err(|_| LexError::invalid_number(start, end))
}

/// Parse the body of a string or character literal, handling escapes.
fn parse_string(s: &str, pos: usize) -> Result<String, LexError> {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('s') => ' ',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('u') => {
                while chars.peek() == Some(&'u') {
                    chars.next();
                }
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16).map_err(|_| LexError::invalid_escape(pos))?;
                char::from_u32(code).ok_or_else(|| LexError::invalid_escape(pos))?
            }
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(next) if value * 8 + next <= 0o377 => {
                            value = value * 8 + next;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                char::from_u32(value).ok_or_else(|| LexError::invalid_escape(pos))?
            }
            _ => return Err(LexError::invalid_escape(pos)),
        };
        result.push(escaped);
    }

    Ok(result)
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LexError {
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    fn unexpected_char(ch: char, pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("Unexpected character '{}'", ch),
            hint: None,
        }
    }

    fn invalid_escape(pos: usize) -> Self {
        Self {
            span: Span::new(pos, pos + 1),
            message: "Invalid escape sequence".to_string(),
            hint: Some("Valid: \\n \\r \\t \\b \\f \\s \\\\ \\' \\\" \\uXXXX and octal escapes".to_string()),
        }
    }

    fn invalid_number(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            message: "Invalid number".to_string(),
            hint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "Lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn guarded_field() {
        let toks = kinds("@GuardedBy(\"mu\") private int count;");
        assert_eq!(
            toks,
            vec![
                TokenKind::At,
                TokenKind::Ident("GuardedBy".into()),
                TokenKind::LParen,
                TokenKind::String("mu".into()),
                TokenKind::RParen,
                TokenKind::Private,
                TokenKind::Ident("int".into()),
                TokenKind::Ident("count".into()),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let toks = kinds("a /* block\n comment */ b // line\n c");
        assert_eq!(
            toks,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Ident("c".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        let toks = kinds("42 0x1F 10L 0b101 1.5f 017");
        assert_eq!(
            toks,
            vec![
                TokenKind::Int(42),
                TokenKind::Int(31),
                TokenKind::Int(10),
                TokenKind::Int(5),
                TokenKind::Float(1.5),
                TokenKind::Int(15),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn shift_operators_are_split() {
        let toks = kinds("Map<String, List<String>> m; x >>= 1;");
        assert!(toks.contains(&TokenKind::GtGtEq));
        assert_eq!(toks.iter().filter(|t| **t == TokenKind::Gt).count(), 2);
    }

    #[test]
    fn escapes() {
        let toks = kinds(r#"'\n' "a\tb" 'A' '\''"#);
        assert_eq!(
            toks,
            vec![
                TokenKind::Char('\n'),
                TokenKind::String("a\tb".into()),
                TokenKind::Char('A'),
                TokenKind::Char('\''),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unexpected_character_is_reported() {
        let result = Lexer::new("int # x;").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].span, Span::new(4, 5));
    }
}
