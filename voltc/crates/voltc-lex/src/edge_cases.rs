//! Boundary behavior tests that cut across lexer modules.

use proptest::prelude::*;
use voltc_util::Handler;

use crate::{Lexer, Token, TokenKind};

fn lex(source: &str) -> Vec<Token> {
    let handler = Handler::new();
    Lexer::new(source, "test.vlt", &handler).tokenize()
}

#[test]
fn test_inclusive_range_between_identifiers() {
    let tokens = lex("a..=b");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::DotDotEq,
            TokenKind::Identifier,
        ]
    );
    assert_eq!(tokens[0].lexeme, "a");
    assert_eq!(tokens[2].lexeme, "b");
}

#[test]
fn test_double_dot_never_splits() {
    let tokens = lex("..");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::DotDot);
}

#[test]
fn test_shift_assign_disambiguation() {
    // `<<=` must be one token, not `<<` `=` or `<` `<=`.
    let tokens = lex("x <<= 1;");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::ShlEq,
            TokenKind::Number,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_for_loop_header() {
    let tokens = lex("for (i in 0..10) { }");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::ForKw,
            TokenKind::LParen,
            TokenKind::Identifier,
            TokenKind::InKw,
            TokenKind::Number,
            TokenKind::DotDot,
            TokenKind::Number,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
        ]
    );
}

#[test]
fn test_lexeme_matches_source_slice() {
    let source = "fn foo(x: i32) -> i32 { return x + 1.5; }";
    let tokens = lex(source);
    // Reconstructing the source from lexemes interleaved with single
    // spaces must preserve every lexeme byte-for-byte.
    for token in &tokens {
        assert!(
            source.contains(&token.lexeme),
            "lexeme {:?} not found in source",
            token.lexeme
        );
    }
}

#[test]
fn test_columns_after_multibyte_operators() {
    let tokens = lex("a..=bb<<=c");
    assert_eq!(tokens[0].column, 1); // a
    assert_eq!(tokens[1].column, 2); // ..=
    assert_eq!(tokens[2].column, 5); // bb
    assert_eq!(tokens[3].column, 7); // <<=
    assert_eq!(tokens[4].column, 10); // c
}

#[test]
fn test_warning_position_after_newlines() {
    let handler = Handler::new();
    let _ = Lexer::new("ok\n\n  `", "test.vlt", &handler).tokenize();
    let diags = handler.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!((diags[0].line, diags[0].column), (3, 3));
}

proptest! {
    /// Any sequence of identifiers and numbers joined by single spaces
    /// lexes back to exactly those lexemes, in order.
    #[test]
    fn prop_words_round_trip(
        words in proptest::collection::vec("[a-z][a-z0-9_]{0,8}|[0-9]{1,6}", 1..12)
    ) {
        let source = words.join(" ");
        let tokens = lex(&source);
        prop_assert_eq!(tokens.len(), words.len());
        for (token, word) in tokens.iter().zip(&words) {
            prop_assert_eq!(&token.lexeme, word);
        }
    }

    /// Line/column of every token agrees with a straightforward count of
    /// newlines and bytes preceding it in the source.
    #[test]
    fn prop_positions_consistent(
        lines in proptest::collection::vec("[a-z]{1,5}( [a-z]{1,5}){0,3}", 1..5)
    ) {
        let source = lines.join("\n");
        let tokens = lex(&source);
        for token in &tokens {
            let line_start: usize = source
                .split('\n')
                .take(token.line as usize - 1)
                .map(|l| l.len() + 1)
                .sum();
            let offset = line_start + token.column as usize - 1;
            prop_assert!(source[offset..].starts_with(&token.lexeme));
        }
    }
}
