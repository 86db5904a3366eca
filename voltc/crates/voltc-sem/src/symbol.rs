//! Symbols: named entities owned by scopes.

use voltc_par::CstNode;
use voltc_util::Idx;

use crate::scope::ScopeId;
use crate::types::TypeId;

/// Arena id of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl Idx for SymbolId {
    fn from_usize(idx: usize) -> Self {
        SymbolId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a symbol names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Type,
    Namespace,
    EnumVariant,
    GenericParam,
}

/// One entry of the symbol graph.
///
/// A symbol's type may start out unset (functions and variables are
/// collected before their types resolve); `scope` is set when the symbol
/// is inserted into a scope, and stays `None` for struct fields and enum
/// variants, which live on their owning type instead.
#[derive(Clone, Debug)]
pub struct Symbol<'a> {
    pub kind: SymbolKind,
    pub name: String,
    pub ty: Option<TypeId>,
    pub declaration: Option<&'a CstNode>,
    pub scope: Option<ScopeId>,

    /// Parameter symbols, for functions.
    pub parameters: Vec<SymbolId>,

    pub is_comptime: bool,
    pub is_async: bool,
    pub is_extern: bool,
    pub is_mutable: bool,
    pub is_static: bool,
    pub is_resolved: bool,

    pub line: u32,
    pub column: u32,
}

impl<'a> Symbol<'a> {
    /// New symbol with position taken from the declaration node.
    pub fn new(kind: SymbolKind, name: impl Into<String>, declaration: &'a CstNode) -> Self {
        let (line, column) = declaration
            .first_token()
            .map(|t| (t.line, t.column))
            .unwrap_or((0, 0));
        Self {
            kind,
            name: name.into(),
            ty: None,
            declaration: Some(declaration),
            scope: None,
            parameters: Vec::new(),
            is_comptime: false,
            is_async: false,
            is_extern: false,
            is_mutable: false,
            is_static: false,
            is_resolved: false,
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltc_lex::{Token, TokenKind};

    #[test]
    fn test_symbol_position_from_declaration() {
        let node = CstNode::Rule {
            name: "var_decl",
            children: vec![CstNode::Token(Token::new(TokenKind::VarKw, "var", 4, 9))],
        };
        let symbol = Symbol::new(SymbolKind::Variable, "x", &node);
        assert_eq!((symbol.line, symbol.column), (4, 9));
        assert!(symbol.ty.is_none());
        assert!(!symbol.is_resolved);
    }
}
