//! voltc-par - Grammar-driven parser for the Volt language.
//!
//! The parser is a PEG interpreter, not hand-coded recursive descent: a
//! [`Grammar`] built by [`volt_grammar`] describes every rule as ordered
//! alternatives of required/optional token and rule elements, and the
//! engine walks that data with full backtracking. Ordered choice means the
//! first alternative that matches end-to-end wins.
//!
//! Error reporting follows the furthest-failure policy: individual
//! alternative failures are silent; the parser only remembers the deepest
//! token index any alternative died at, and a failed unit parse emits
//! exactly one diagnostic pointing there. This keeps one syntax error from
//! cascading into dozens of reports.
//!
//! # Example
//!
//! ```
//! use voltc_lex::Lexer;
//! use voltc_par::{volt_grammar, Parser};
//! use voltc_util::Handler;
//!
//! let handler = Handler::new();
//! let grammar = volt_grammar();
//! let tokens = Lexer::new("fn main() -> i32 { return 0; }", "demo.vlt", &handler).tokenize();
//! let root = Parser::new(&tokens, &grammar, "demo.vlt", &handler)
//!     .parse()
//!     .unwrap();
//! assert_eq!(root.rule_name(), Some("unit"));
//! ```

mod cst;
mod grammar;

#[cfg(test)]
mod edge_cases;

pub use cst::CstNode;
pub use grammar::{opt_rule, opt_tok, rule, tok, volt_grammar, Element, Grammar, Matcher, Rule};

use thiserror::Error;
use voltc_lex::Token;
use voltc_util::Handler;

/// Why a unit failed to parse. The diagnostic itself goes to the handler;
/// this is just the status for the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The start rule did not match.
    #[error("syntax error")]
    Syntax,
    /// The start rule matched but tokens remain.
    #[error("trailing input after unit")]
    TrailingInput,
}

/// The grammar interpreter for one translation unit.
pub struct Parser<'a> {
    /// Token vector produced by the lexer.
    tokens: &'a [Token],

    /// Current position in the token vector.
    position: usize,

    /// Shared, read-only grammar registry.
    grammar: &'a Grammar,

    /// File name used in diagnostics.
    filename: &'a str,

    /// Shared diagnostic sink.
    handler: &'a Handler,

    /// Deepest token index any alternative failed at.
    furthest_pos: usize,

    /// Message recorded at the furthest failure.
    furthest_msg: String,

    /// Ensures at most one diagnostic per failed parse.
    reported: bool,
}

impl<'a> Parser<'a> {
    pub fn new(
        tokens: &'a [Token],
        grammar: &'a Grammar,
        filename: &'a str,
        handler: &'a Handler,
    ) -> Self {
        Self {
            tokens,
            position: 0,
            grammar,
            filename,
            handler,
            furthest_pos: 0,
            furthest_msg: String::new(),
            reported: false,
        }
    }

    /// Parse the whole token vector starting at the `unit` rule.
    ///
    /// On failure exactly one diagnostic is emitted, located at the token
    /// where the parse got furthest. Leftover tokens after a successful
    /// `unit` match are a failure too.
    pub fn parse(&mut self) -> Result<CstNode, ParseError> {
        self.parse_as("unit")
    }

    /// Parse starting at a named rule; used by `parse` and by tests that
    /// target a single construct.
    pub fn parse_as(&mut self, start: &str) -> Result<CstNode, ParseError> {
        let grammar = self.grammar;
        let Some(start_rule) = grammar.get(start) else {
            self.record_failure(format!("No '{}' rule defined in grammar", start));
            self.report_failure();
            return Err(ParseError::Syntax);
        };

        let Some(root) = self.parse_rule(start_rule) else {
            self.report_failure();
            return Err(ParseError::Syntax);
        };

        if !self.is_at_end() {
            self.record_failure("Unexpected tokens after end of input".to_string());
            self.report_failure();
            return Err(ParseError::TrailingInput);
        }

        Ok(root)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Try every alternative of a rule in declaration order.
    fn parse_rule(&mut self, rule: &'a Rule) -> Option<CstNode> {
        for alternative in &rule.alternatives {
            if let Some(node) = self.try_alternative(rule.name, alternative) {
                return Some(node);
            }
        }
        self.record_failure(format!("Failed to parse '{}'", rule.name));
        None
    }

    /// Try one alternative from the current position.
    ///
    /// A failed required element restores the checkpoint and fails the
    /// whole alternative; a failed optional element is skipped without
    /// consuming input and without attaching a child.
    fn try_alternative(&mut self, rule_name: &'static str, alternative: &[Element]) -> Option<CstNode> {
        let checkpoint = self.position;
        let mut children = Vec::new();

        if alternative.is_empty() {
            children.push(CstNode::Empty);
        }

        for element in alternative {
            let child = match element.matcher {
                Matcher::Token(kind) => self.match_token(kind),
                Matcher::Rule(name) => self.parse_named(name),
            };

            match child {
                Some(node) => children.push(node),
                None if element.optional => continue,
                None => {
                    self.position = checkpoint;
                    return None;
                }
            }
        }

        Some(CstNode::Rule {
            name: rule_name,
            children,
        })
    }

    /// Match a specific token kind at the current position.
    fn match_token(&mut self, expected: voltc_lex::TokenKind) -> Option<CstNode> {
        let Some(token) = self.tokens.get(self.position) else {
            self.record_failure("Unexpected end of input".to_string());
            return None;
        };

        if token.kind != expected {
            return None;
        }

        self.position += 1;
        Some(CstNode::Token(token.clone()))
    }

    /// Parse a rule reference by name.
    fn parse_named(&mut self, name: &'static str) -> Option<CstNode> {
        let grammar = self.grammar;
        let Some(rule) = grammar.get(name) else {
            self.record_failure(format!("Unknown rule '{}'", name));
            return None;
        };
        self.parse_rule(rule)
    }

    /// Track the failure that got furthest. Earlier failures at the same
    /// depth keep their message.
    fn record_failure(&mut self, message: String) {
        if self.position > self.furthest_pos || self.furthest_msg.is_empty() {
            self.furthest_pos = self.position;
            self.furthest_msg = message;
            self.reported = false;
        }
    }

    /// Emit the single diagnostic for a failed parse, at the furthest
    /// failure token (or the last token when the failure is past the end).
    fn report_failure(&mut self) {
        if self.reported {
            return;
        }

        let token = self
            .tokens
            .get(self.furthest_pos)
            .or_else(|| self.furthest_pos.checked_sub(1).and_then(|p| self.tokens.get(p)));

        if let Some(token) = token {
            self.handler
                .error(self.filename, token.line, token.column, self.furthest_msg.clone());
        } else {
            self.handler.error(self.filename, 1, 1, self.furthest_msg.clone());
        }

        self.reported = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltc_lex::{Lexer, TokenKind};

    fn lex(source: &str, handler: &Handler) -> Vec<Token> {
        Lexer::new(source, "test.vlt", handler).tokenize()
    }

    /// A tiny grammar exercising the engine without the full language:
    ///   pair ::= ( NUMBER ,? NUMBER ) | ( )
    fn pair_grammar() -> Grammar {
        let mut g = Grammar::new();
        g.add(
            Rule::new("pair")
                .alt([
                    tok(TokenKind::LParen),
                    tok(TokenKind::Number),
                    opt_tok(TokenKind::Comma),
                    tok(TokenKind::Number),
                    tok(TokenKind::RParen),
                ])
                .alt([tok(TokenKind::LParen), tok(TokenKind::RParen)]),
        );
        g
    }

    #[test]
    fn test_required_token_match() {
        let handler = Handler::new();
        let tokens = lex("(1, 2)", &handler);
        let grammar = pair_grammar();
        let root = Parser::new(&tokens, &grammar, "test.vlt", &handler)
            .parse_as("pair")
            .unwrap();
        assert_eq!(root.children().len(), 5);
    }

    #[test]
    fn test_optional_element_skipped() {
        let handler = Handler::new();
        let tokens = lex("(1 2)", &handler);
        let grammar = pair_grammar();
        let root = Parser::new(&tokens, &grammar, "test.vlt", &handler)
            .parse_as("pair")
            .unwrap();
        // No child is attached for the skipped optional comma.
        assert_eq!(root.children().len(), 4);
    }

    #[test]
    fn test_ordered_choice_backtracks() {
        let handler = Handler::new();
        let tokens = lex("()", &handler);
        let grammar = pair_grammar();
        let root = Parser::new(&tokens, &grammar, "test.vlt", &handler)
            .parse_as("pair")
            .unwrap();
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn test_failure_reports_once() {
        let handler = Handler::new();
        let tokens = lex("(1,)", &handler);
        let grammar = pair_grammar();
        let result = Parser::new(&tokens, &grammar, "test.vlt", &handler).parse_as("pair");
        assert_eq!(result, Err(ParseError::Syntax));
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn test_trailing_input_rejected() {
        let handler = Handler::new();
        let tokens = lex("() ()", &handler);
        let grammar = pair_grammar();
        let result = Parser::new(&tokens, &grammar, "test.vlt", &handler).parse_as("pair");
        assert_eq!(result, Err(ParseError::TrailingInput));
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn test_empty_input_on_empty_admitting_rule() {
        let handler = Handler::new();
        let grammar = volt_grammar();
        let root = Parser::new(&[], &grammar, "test.vlt", &handler)
            .parse()
            .unwrap();
        assert_eq!(root.rule_name(), Some("unit"));
        assert!(handler.is_empty());
    }

    #[test]
    fn test_unknown_start_rule() {
        let handler = Handler::new();
        let grammar = pair_grammar();
        let result = Parser::new(&[], &grammar, "test.vlt", &handler).parse_as("nope");
        assert_eq!(result, Err(ParseError::Syntax));
        assert_eq!(handler.error_count(), 1);
    }

    #[test]
    fn test_cst_leaves_match_consumed_tokens() {
        let handler = Handler::new();
        let tokens = lex("(1, 2)", &handler);
        let grammar = pair_grammar();
        let root = Parser::new(&tokens, &grammar, "test.vlt", &handler)
            .parse_as("pair")
            .unwrap();
        let leaves = root.tokens();
        assert_eq!(leaves.len(), tokens.len());
        for (leaf, token) in leaves.iter().zip(&tokens) {
            assert_eq!(leaf.lexeme, token.lexeme);
        }
    }
}
