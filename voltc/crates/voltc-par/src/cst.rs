//! Concrete syntax tree.
//!
//! Every grammar rule that matches produces one node, regardless of
//! semantic role. A node is either a token leaf, a rule node with ordered
//! children, or the empty marker produced by an ε alternative.

use std::fmt;

use voltc_lex::{Token, TokenKind};
use voltc_util::Span;

/// One node of the concrete syntax tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CstNode {
    /// A matched token.
    Token(Token),
    /// A matched rule with its children in match order.
    Rule {
        name: &'static str,
        children: Vec<CstNode>,
    },
    /// Marker child of a rule that matched its ε alternative.
    Empty,
}

impl CstNode {
    /// The rule name, for rule nodes.
    pub fn rule_name(&self) -> Option<&'static str> {
        match self {
            CstNode::Rule { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Children of a rule node; leaves have none.
    pub fn children(&self) -> &[CstNode] {
        match self {
            CstNode::Rule { children, .. } => children,
            _ => &[],
        }
    }

    /// The token, for token leaves.
    pub fn token(&self) -> Option<&Token> {
        match self {
            CstNode::Token(token) => Some(token),
            _ => None,
        }
    }

    /// True for a rule node that matched the ε alternative.
    pub fn is_epsilon(&self) -> bool {
        matches!(self.children(), [CstNode::Empty])
    }

    /// First direct child that is a rule node with the given name.
    pub fn find_child(&self, name: &str) -> Option<&CstNode> {
        self.children()
            .iter()
            .find(|child| child.rule_name() == Some(name))
    }

    /// First direct child token of the given kind.
    pub fn find_token(&self, kind: TokenKind) -> Option<&Token> {
        self.children().iter().find_map(|child| match child {
            CstNode::Token(token) if token.kind == kind => Some(token),
            _ => None,
        })
    }

    /// Lexeme of the first direct identifier token, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.find_token(TokenKind::Identifier)
            .map(|token| token.lexeme.as_str())
    }

    /// First token leaf in tree order, descending through rule nodes.
    pub fn first_token(&self) -> Option<&Token> {
        match self {
            CstNode::Token(token) => Some(token),
            CstNode::Rule { children, .. } => {
                children.iter().find_map(|child| child.first_token())
            }
            CstNode::Empty => None,
        }
    }

    /// Source region covered by this node's tokens.
    pub fn span(&self) -> Span {
        let tokens = self.tokens();
        let Some(first) = tokens.first() else {
            return Span::DUMMY;
        };
        let span = Span::point(first.line, first.column);
        match tokens.last() {
            Some(last) => span.merge(Span::point(last.line, last.column)),
            None => span,
        }
    }

    /// All token leaves in tree order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a Token>) {
        match self {
            CstNode::Token(token) => out.push(token),
            CstNode::Rule { children, .. } => {
                for child in children {
                    child.collect_tokens(out);
                }
            }
            CstNode::Empty => {}
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for _ in 0..indent {
            write!(f, "  ")?;
        }
        match self {
            CstNode::Token(token) => match token.kind {
                TokenKind::Identifier | TokenKind::Number | TokenKind::String => {
                    writeln!(f, "TOKEN: {:?} = \"{}\"", token.kind, token.lexeme)
                }
                _ => writeln!(f, "TOKEN: {:?}", token.kind),
            },
            CstNode::Empty => writeln!(f, "EMPTY"),
            CstNode::Rule { name, children } => {
                writeln!(f, "EXPR: {} ({} children)", name, children.len())?;
                for child in children {
                    child.write_tree(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for CstNode {
    /// Indented tree rendering, used for debugging parses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> CstNode {
        CstNode::Token(Token::new(TokenKind::Identifier, name, 1, 1))
    }

    fn rule(name: &'static str, children: Vec<CstNode>) -> CstNode {
        CstNode::Rule { name, children }
    }

    #[test]
    fn test_find_child() {
        let tree = rule("item", vec![rule("fn_decl", vec![ident("foo")])]);
        assert!(tree.find_child("fn_decl").is_some());
        assert!(tree.find_child("struct_decl").is_none());
    }

    #[test]
    fn test_identifier() {
        let tree = rule("fn_decl", vec![ident("foo")]);
        assert_eq!(tree.identifier(), Some("foo"));
    }

    #[test]
    fn test_first_token_descends() {
        let tree = rule("a", vec![CstNode::Empty, rule("b", vec![ident("x")])]);
        assert_eq!(tree.first_token().unwrap().lexeme, "x");
    }

    #[test]
    fn test_tokens_in_order() {
        let tree = rule("a", vec![ident("x"), rule("b", vec![ident("y")]), ident("z")]);
        let lexemes: Vec<_> = tree.tokens().iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_span_covers_tokens() {
        let tree = rule(
            "a",
            vec![
                CstNode::Token(Token::new(TokenKind::Identifier, "x", 2, 5)),
                CstNode::Token(Token::new(TokenKind::Identifier, "y", 4, 1)),
            ],
        );
        let span = tree.span();
        assert_eq!((span.line, span.column), (2, 5));
        assert_eq!(CstNode::Empty.span(), Span::DUMMY);
    }

    #[test]
    fn test_is_epsilon() {
        let eps = rule("items", vec![CstNode::Empty]);
        assert!(eps.is_epsilon());
        let full = rule("items", vec![ident("x")]);
        assert!(!full.is_epsilon());
    }

    #[test]
    fn test_display_renders_tree() {
        let tree = rule("unit", vec![ident("x"), CstNode::Empty]);
        let text = format!("{}", tree);
        assert!(text.contains("EXPR: unit"));
        assert!(text.contains("TOKEN: Identifier = \"x\""));
        assert!(text.contains("EMPTY"));
    }
}
