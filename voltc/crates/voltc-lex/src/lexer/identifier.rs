//! Identifier and keyword lexing.

use crate::token::{keyword_kind, Token, TokenKind};
use crate::Lexer;

/// `[A-Za-z_]`
pub(crate) fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// `[A-Za-z0-9_]`
pub(crate) fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'a> Lexer<'a> {
    /// Consume an identifier and classify it against the keyword table.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let lexeme = self.cursor.slice_from(self.token_start);
        let kind = keyword_kind(lexeme).unwrap_or(TokenKind::Identifier);
        self.token(kind, lexeme)
    }
}
