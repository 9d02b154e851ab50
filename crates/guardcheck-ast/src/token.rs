// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token.
///
/// Primitive type names (`int`, `boolean`, ...) are lexed as identifiers;
/// the parser tells them apart where it matters.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Float(f64),
    String(String),
    Char(char),
    Bool(bool),
    Null,

    // Identifier
    Ident(String),

    // Keywords
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Extends,
    Implements,
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Synchronized,
    Volatile,
    Transient,
    Native,
    Strictfp,
    Default,
    Void,
    This,
    Super,
    New,
    Instanceof,
    If,
    Else,
    While,
    Do,
    For,
    Return,
    Break,
    Continue,
    Throw,
    Throws,
    Try,
    Catch,
    Finally,
    Switch,
    Case,
    Assert,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AmpAmp,
    PipePipe,
    Bang,
    Tilde,
    Amp,          // &
    Pipe,         // |
    Caret,        // ^
    LtLt,         // <<
    PlusPlus,     // ++
    MinusMinus,   // --
    PlusEq,       // +=
    MinusEq,      // -=
    StarEq,       // *=
    SlashEq,      // /=
    PercentEq,    // %=
    AmpEq,        // &=
    PipeEq,       // |=
    CaretEq,      // ^=
    LtLtEq,       // <<=
    GtGtEq,       // >>=
    GtGtGtEq,     // >>>=
    Question,
    Colon,
    ColonColon,   // ::
    Arrow,        // ->
    At,
    Dot,
    Ellipsis,     // ...

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,

    // Special
    Eof,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Int(_) | TokenKind::Float(_) => "a number",
            TokenKind::String(_) => "a string",
            TokenKind::Char(_) => "a character",
            TokenKind::Bool(_) => "'true' or 'false'",
            TokenKind::Null => "'null'",
            TokenKind::Ident(_) => "a name",

            TokenKind::Package => "'package'",
            TokenKind::Import => "'import'",
            TokenKind::Class => "'class'",
            TokenKind::Interface => "'interface'",
            TokenKind::Enum => "'enum'",
            TokenKind::Extends => "'extends'",
            TokenKind::Implements => "'implements'",
            TokenKind::Public => "'public'",
            TokenKind::Protected => "'protected'",
            TokenKind::Private => "'private'",
            TokenKind::Static => "'static'",
            TokenKind::Final => "'final'",
            TokenKind::Abstract => "'abstract'",
            TokenKind::Synchronized => "'synchronized'",
            TokenKind::Volatile => "'volatile'",
            TokenKind::Transient => "'transient'",
            TokenKind::Native => "'native'",
            TokenKind::Strictfp => "'strictfp'",
            TokenKind::Default => "'default'",
            TokenKind::Void => "'void'",
            TokenKind::This => "'this'",
            TokenKind::Super => "'super'",
            TokenKind::New => "'new'",
            TokenKind::Instanceof => "'instanceof'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::For => "'for'",
            TokenKind::Return => "'return'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::Throw => "'throw'",
            TokenKind::Throws => "'throws'",
            TokenKind::Try => "'try'",
            TokenKind::Catch => "'catch'",
            TokenKind::Finally => "'finally'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Assert => "'assert'",

            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::BangEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::AmpAmp => "'&&'",
            TokenKind::PipePipe => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Tilde => "'~'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::LtLt => "'<<'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::AmpEq => "'&='",
            TokenKind::PipeEq => "'|='",
            TokenKind::CaretEq => "'^='",
            TokenKind::LtLtEq => "'<<='",
            TokenKind::GtGtEq => "'>>='",
            TokenKind::GtGtGtEq => "'>>>='",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::ColonColon => "'::'",
            TokenKind::Arrow => "'->'",
            TokenKind::At => "'@'",
            TokenKind::Dot => "'.'",
            TokenKind::Ellipsis => "'...'",

            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semi => "';'",
            TokenKind::Comma => "','",

            TokenKind::Eof => "end of file",
        }
    }

    /// Modifier keywords that may prefix a declaration.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Final
                | TokenKind::Abstract
                | TokenKind::Synchronized
                | TokenKind::Volatile
                | TokenKind::Transient
                | TokenKind::Native
                | TokenKind::Strictfp
                | TokenKind::Default
        )
    }
}
