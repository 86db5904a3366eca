//! Token definitions for the Volt language.
//!
//! [`TokenKind`] is a closed enum: single, double and triple punctuation,
//! the three literal categories, and the keyword set. The comment-delimiter
//! kinds (`//`, `/*`, `*/`) are part of the surface but are never produced,
//! since comments are consumed during lexing.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

/// Kind of a lexed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Single-character punctuation
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `/`
    Slash,
    /// `&`
    Ampersand,
    /// `@`
    At,
    /// `!`
    Bang,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `#`
    Hash,
    /// `*`
    Star,
    /// `_`
    Underscore,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `=`
    Eq,
    /// `|`
    Pipe,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `?`
    Question,
    /// `$`
    Dollar,

    // Two-character punctuation
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `&=`
    AmpersandEq,
    /// `~=`
    TildeEq,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `|=`
    PipeEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `^=`
    CaretEq,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `%=`
    PercentEq,
    /// `=>`
    FatArrow,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `->`
    Arrow,
    /// `+=`
    PlusEq,
    /// `*=`
    StarEq,
    /// `-=`
    MinusEq,
    /// `/=`
    SlashEq,
    /// `//` (never produced; comments are discarded)
    LineComment,
    /// `/*` (never produced; comments are discarded)
    BlockCommentOpen,
    /// `*/` (never produced; comments are discarded)
    BlockCommentClose,
    /// `..`
    DotDot,
    /// `::`
    ColonColon,

    // Three-character punctuation
    /// `..=`
    DotDotEq,
    /// `<<=`
    ShlEq,
    /// `>>=`
    ShrEq,

    // Literals
    /// Number literal, e.g. `42` or `3.14`
    Number,
    /// String literal (raw bytes between quotes)
    String,
    /// Identifier
    Identifier,

    // Keywords
    I8Kw,
    I16Kw,
    I32Kw,
    I64Kw,
    I128Kw,
    U8Kw,
    U16Kw,
    U32Kw,
    U64Kw,
    U128Kw,
    F16Kw,
    F32Kw,
    F64Kw,
    F128Kw,
    BoolKw,
    IsizeKw,
    UsizeKw,
    TypeKw,
    CstrKw,
    StrKw,
    VarKw,
    ValKw,
    StaticKw,
    AttachKw,
    StructKw,
    EnumKw,
    FnKw,
    ErrorKw,
    ComptimeKw,
    ReturnKw,
    BreakKw,
    ContinueKw,
    InternalKw,
    PublicKw,
    TraitKw,
    AsyncKw,
    TrueKw,
    FalseKw,
    ExternKw,
    ExportKw,
    NamespaceKw,
    UseKw,
    ThisKw,
    MoveKw,
    CopyKw,
    IfKw,
    ElseKw,
    ForKw,
    WhileKw,
    LoopKw,
    TryKw,
    CatchKw,
    InKw,
    NullKw,
    SuspendKw,
    ResumeKw,
    DeferKw,
    AsKw,
}

impl TokenKind {
    /// True for any keyword kind. Keywords form the tail of the enum.
    pub fn is_keyword(self) -> bool {
        self as u32 >= TokenKind::I8Kw as u32
    }
}

static KEYWORDS: OnceLock<FxHashMap<&'static str, TokenKind>> = OnceLock::new();

/// Look up an identifier against the keyword table.
///
/// Note that `match` and `default` are deliberately absent: the grammar
/// matches them as plain identifiers.
pub fn keyword_kind(ident: &str) -> Option<TokenKind> {
    let table = KEYWORDS.get_or_init(|| {
        FxHashMap::from_iter([
            ("i8", TokenKind::I8Kw),
            ("i16", TokenKind::I16Kw),
            ("i32", TokenKind::I32Kw),
            ("i64", TokenKind::I64Kw),
            ("i128", TokenKind::I128Kw),
            ("u8", TokenKind::U8Kw),
            ("u16", TokenKind::U16Kw),
            ("u32", TokenKind::U32Kw),
            ("u64", TokenKind::U64Kw),
            ("u128", TokenKind::U128Kw),
            ("f16", TokenKind::F16Kw),
            ("f32", TokenKind::F32Kw),
            ("f64", TokenKind::F64Kw),
            ("f128", TokenKind::F128Kw),
            ("bool", TokenKind::BoolKw),
            ("isize", TokenKind::IsizeKw),
            ("usize", TokenKind::UsizeKw),
            ("type", TokenKind::TypeKw),
            ("cstr", TokenKind::CstrKw),
            ("str", TokenKind::StrKw),
            ("var", TokenKind::VarKw),
            ("val", TokenKind::ValKw),
            ("static", TokenKind::StaticKw),
            ("attach", TokenKind::AttachKw),
            ("struct", TokenKind::StructKw),
            ("enum", TokenKind::EnumKw),
            ("fn", TokenKind::FnKw),
            ("error", TokenKind::ErrorKw),
            ("comptime", TokenKind::ComptimeKw),
            ("return", TokenKind::ReturnKw),
            ("break", TokenKind::BreakKw),
            ("continue", TokenKind::ContinueKw),
            ("internal", TokenKind::InternalKw),
            ("public", TokenKind::PublicKw),
            ("trait", TokenKind::TraitKw),
            ("async", TokenKind::AsyncKw),
            ("true", TokenKind::TrueKw),
            ("false", TokenKind::FalseKw),
            ("extern", TokenKind::ExternKw),
            ("export", TokenKind::ExportKw),
            ("namespace", TokenKind::NamespaceKw),
            ("use", TokenKind::UseKw),
            ("this", TokenKind::ThisKw),
            ("move", TokenKind::MoveKw),
            ("copy", TokenKind::CopyKw),
            ("if", TokenKind::IfKw),
            ("else", TokenKind::ElseKw),
            ("for", TokenKind::ForKw),
            ("while", TokenKind::WhileKw),
            ("loop", TokenKind::LoopKw),
            ("try", TokenKind::TryKw),
            ("catch", TokenKind::CatchKw),
            ("in", TokenKind::InKw),
            ("null", TokenKind::NullKw),
            ("suspend", TokenKind::SuspendKw),
            ("resume", TokenKind::ResumeKw),
            ("defer", TokenKind::DeferKw),
            ("as", TokenKind::AsKw),
        ])
    });
    table.get(ident).copied()
}

/// A lexed token.
///
/// Tokens own their lexeme bytes and are immutable after creation. Line
/// and column are 1-based and refer to the token's first byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(keyword_kind("fn"), Some(TokenKind::FnKw));
        assert_eq!(keyword_kind("i128"), Some(TokenKind::I128Kw));
        assert_eq!(keyword_kind("defer"), Some(TokenKind::DeferKw));
        assert_eq!(keyword_kind("as"), Some(TokenKind::AsKw));
    }

    #[test]
    fn test_non_keywords() {
        assert_eq!(keyword_kind("match"), None);
        assert_eq!(keyword_kind("default"), None);
        assert_eq!(keyword_kind("foo"), None);
        assert_eq!(keyword_kind("Fn"), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(TokenKind::FnKw.is_keyword());
        assert!(TokenKind::AsKw.is_keyword());
        assert!(TokenKind::I8Kw.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(!TokenKind::Plus.is_keyword());
    }

    #[test]
    fn test_token_new() {
        let token = Token::new(TokenKind::Identifier, "foo", 2, 7);
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.lexeme, "foo");
        assert_eq!(token.line, 2);
        assert_eq!(token.column, 7);
    }
}
