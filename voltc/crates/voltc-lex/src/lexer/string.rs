//! String literal lexing.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Consume a string literal opened by `quote` (either `"` or `'`).
    ///
    /// The opening quote has already been consumed by the caller. Bytes
    /// are taken verbatim up to the matching quote or end of input; escape
    /// sequences are not interpreted. Newlines inside the string keep the
    /// line/column accounting honest. The lexeme is the content between
    /// the quotes.
    pub(crate) fn lex_string(&mut self, quote: u8) -> Token {
        let start = self.cursor.position();
        while !self.cursor.is_at_end() && self.cursor.current() != quote {
            self.cursor.advance();
        }

        let lexeme = self.cursor.slice_from(start).to_string();

        // Closing quote, when the input didn't run out first.
        self.cursor.match_byte(quote);

        Token::new(TokenKind::String, lexeme, self.token_line, self.token_column)
    }
}
