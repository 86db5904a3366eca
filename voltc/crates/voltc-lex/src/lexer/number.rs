//! Number literal lexing.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Consume a number literal: digits with an optional fractional part.
    ///
    /// The fractional dot is NOT consumed when the next byte is another
    /// dot, so `1..5` stays `1` `..` `5` instead of eating `1.` as a
    /// float. This is the load-bearing disambiguation for the range
    /// operators.
    pub(crate) fn lex_number(&mut self) -> Token {
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance();
        }

        if self.cursor.current() == b'.' && self.cursor.peek(1) != b'.' {
            self.cursor.advance();
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let lexeme = self.cursor.slice_from(self.token_start);
        self.token(TokenKind::Number, lexeme)
    }
}
