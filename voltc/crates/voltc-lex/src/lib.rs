//! voltc-lex - Lexical analysis for the Volt language.
//!
//! Turns a source buffer into a token vector with exact line/column
//! provenance. Comments are consumed and discarded; unknown bytes produce
//! a warning and are skipped, so lexing always runs to completion.
//!
//! # Example
//!
//! ```
//! use voltc_lex::{Lexer, TokenKind};
//! use voltc_util::Handler;
//!
//! let handler = Handler::new();
//! let tokens = Lexer::new("a..=b", "demo.vlt", &handler).tokenize();
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![TokenKind::Identifier, TokenKind::DotDotEq, TokenKind::Identifier]
//! );
//! ```

pub mod cursor;
mod lexer;
mod token;

#[cfg(test)]
mod edge_cases;

pub use lexer::Lexer;
pub use token::{keyword_kind, Token, TokenKind};
