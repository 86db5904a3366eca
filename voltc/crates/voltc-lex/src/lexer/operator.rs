//! Operator and punctuation lexing.
//!
//! Operators are matched by maximal munch with up to two bytes of
//! lookahead: the triple forms (`..=`, `<<=`, `>>=`) win over the double
//! forms, which win over the single forms.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Handles: `+`, `++`, `+=`
    pub(crate) fn lex_plus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'+') {
            self.token(TokenKind::PlusPlus, "++")
        } else if self.cursor.match_byte(b'=') {
            self.token(TokenKind::PlusEq, "+=")
        } else {
            self.token(TokenKind::Plus, "+")
        }
    }

    /// Handles: `-`, `--`, `-=`, `->`
    pub(crate) fn lex_minus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'-') {
            self.token(TokenKind::MinusMinus, "--")
        } else if self.cursor.match_byte(b'=') {
            self.token(TokenKind::MinusEq, "-=")
        } else if self.cursor.match_byte(b'>') {
            self.token(TokenKind::Arrow, "->")
        } else {
            self.token(TokenKind::Minus, "-")
        }
    }

    /// Handles: `*`, `*=`
    pub(crate) fn lex_star(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'=') {
            self.token(TokenKind::StarEq, "*=")
        } else {
            self.token(TokenKind::Star, "*")
        }
    }

    /// Handles: `/`, `/=`
    ///
    /// `//` and `/*` never reach this point; comments are consumed during
    /// whitespace skipping.
    pub(crate) fn lex_slash(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'=') {
            self.token(TokenKind::SlashEq, "/=")
        } else {
            self.token(TokenKind::Slash, "/")
        }
    }

    /// Handles: `%`, `%=`
    pub(crate) fn lex_percent(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'=') {
            self.token(TokenKind::PercentEq, "%=")
        } else {
            self.token(TokenKind::Percent, "%")
        }
    }

    /// Handles: `=`, `==`, `=>`
    pub(crate) fn lex_equals(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'=') {
            self.token(TokenKind::EqEq, "==")
        } else if self.cursor.match_byte(b'>') {
            self.token(TokenKind::FatArrow, "=>")
        } else {
            self.token(TokenKind::Eq, "=")
        }
    }

    /// Handles: `!`, `!=`
    pub(crate) fn lex_bang(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'=') {
            self.token(TokenKind::NotEq, "!=")
        } else {
            self.token(TokenKind::Bang, "!")
        }
    }

    /// Handles: `<`, `<=`, `<<`, `<<=`
    pub(crate) fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'<') {
            if self.cursor.match_byte(b'=') {
                self.token(TokenKind::ShlEq, "<<=")
            } else {
                self.token(TokenKind::Shl, "<<")
            }
        } else if self.cursor.match_byte(b'=') {
            self.token(TokenKind::LtEq, "<=")
        } else {
            self.token(TokenKind::Lt, "<")
        }
    }

    /// Handles: `>`, `>=`, `>>`, `>>=`
    pub(crate) fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'>') {
            if self.cursor.match_byte(b'=') {
                self.token(TokenKind::ShrEq, ">>=")
            } else {
                self.token(TokenKind::Shr, ">>")
            }
        } else if self.cursor.match_byte(b'=') {
            self.token(TokenKind::GtEq, ">=")
        } else {
            self.token(TokenKind::Gt, ">")
        }
    }

    /// Handles: `&`, `&&`, `&=`
    pub(crate) fn lex_ampersand(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'&') {
            self.token(TokenKind::AndAnd, "&&")
        } else if self.cursor.match_byte(b'=') {
            self.token(TokenKind::AmpersandEq, "&=")
        } else {
            self.token(TokenKind::Ampersand, "&")
        }
    }

    /// Handles: `|`, `||`, `|=`
    pub(crate) fn lex_pipe(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'|') {
            self.token(TokenKind::OrOr, "||")
        } else if self.cursor.match_byte(b'=') {
            self.token(TokenKind::PipeEq, "|=")
        } else {
            self.token(TokenKind::Pipe, "|")
        }
    }

    /// Handles: `^`, `^=`
    pub(crate) fn lex_caret(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'=') {
            self.token(TokenKind::CaretEq, "^=")
        } else {
            self.token(TokenKind::Caret, "^")
        }
    }

    /// Handles: `~`, `~=`
    pub(crate) fn lex_tilde(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'=') {
            self.token(TokenKind::TildeEq, "~=")
        } else {
            self.token(TokenKind::Tilde, "~")
        }
    }

    /// Handles: `:`, `::`
    pub(crate) fn lex_colon(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b':') {
            self.token(TokenKind::ColonColon, "::")
        } else {
            self.token(TokenKind::Colon, ":")
        }
    }

    /// Handles: `.`, `..`, `..=`
    pub(crate) fn lex_dot(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_byte(b'.') {
            if self.cursor.match_byte(b'=') {
                self.token(TokenKind::DotDotEq, "..=")
            } else {
                self.token(TokenKind::DotDot, "..")
            }
        } else {
            self.token(TokenKind::Dot, ".")
        }
    }
}
