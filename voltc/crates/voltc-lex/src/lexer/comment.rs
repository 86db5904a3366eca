//! Whitespace and comment skipping.

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skip whitespace, line comments and block comments.
    ///
    /// Line comments stop before the terminating LF so the newline itself
    /// still runs through normal line accounting. An unterminated block
    /// comment consumes the rest of the input.
    pub(crate) fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current() {
                b' ' | b'\t' | b'\r' | b'\n' => self.cursor.advance(),
                b'/' if self.cursor.peek(1) == b'/' => {
                    self.cursor.advance_n(2);
                    while !self.cursor.is_at_end() && self.cursor.current() != b'\n' {
                        self.cursor.advance();
                    }
                }
                b'/' if self.cursor.peek(1) == b'*' => {
                    self.cursor.advance_n(2);
                    self.skip_block_comment();
                }
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        while !self.cursor.is_at_end() {
            if self.cursor.current() == b'*' && self.cursor.peek(1) == b'/' {
                self.cursor.advance_n(2);
                return;
            }
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Lexer, TokenKind};
    use voltc_util::Handler;

    fn lex(source: &str) -> Vec<crate::Token> {
        let handler = Handler::new();
        Lexer::new(source, "test.vlt", &handler).tokenize()
    }

    #[test]
    fn test_line_comment() {
        let tokens = lex("a // comment\nb");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].lexeme, "b");
        assert_eq!((tokens[1].line, tokens[1].column), (2, 1));
    }

    #[test]
    fn test_line_comment_at_eof() {
        let tokens = lex("a // trailing");
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_block_comment() {
        let tokens = lex("a /* x */ b");
        assert_eq!(tokens.len(), 2);
        assert_eq!((tokens[1].line, tokens[1].column), (1, 11));
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let tokens = lex("a /* one\ntwo\nthree */ b");
        assert_eq!(tokens.len(), 2);
        assert_eq!((tokens[1].line, tokens[1].column), (3, 10));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let tokens = lex("a /* never closed");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].lexeme, "a");
    }

    #[test]
    fn test_comment_star_not_closing() {
        let tokens = lex("/* * ** */ x");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }
}
