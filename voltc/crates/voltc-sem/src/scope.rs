//! Lexical scopes.
//!
//! Scopes form a tree rooted at the single global scope shared by every
//! translation unit. Lookup walks the parent chain; insertion rejects
//! duplicates in the current scope only, so shadowing across parents is
//! allowed.

use voltc_util::Idx;

use crate::symbol::{Symbol, SymbolId};
use crate::types::TypeId;
use crate::Analyzer;

/// Arena id of a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl Idx for ScopeId {
    fn from_usize(idx: usize) -> Self {
        ScopeId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What introduced a scope; break/continue validation keys off this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
    Loop,
    Match,
}

/// One symbol-table frame.
#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Owned symbols, in insertion order.
    pub symbols: Vec<SymbolId>,
    /// Child scopes, in creation order.
    pub children: Vec<ScopeId>,
    pub kind: ScopeKind,
    /// Return type, for function scopes.
    pub return_type: Option<TypeId>,
}

impl<'a> Analyzer<'a> {
    /// Create a scope and attach it to its parent.
    pub(crate) fn create_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = self.scopes.push(Scope {
            parent,
            symbols: Vec::new(),
            children: Vec::new(),
            kind,
            return_type: None,
        });
        if let Some(parent) = parent {
            self.scopes[parent].children.push(id);
        }
        id
    }

    /// Create a child of the current scope and make it current.
    pub(crate) fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.create_scope(kind, Some(self.current_scope));
        self.current_scope = id;
        id
    }

    /// Pop back to the parent scope.
    pub(crate) fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current_scope].parent {
            self.current_scope = parent;
        }
    }

    /// Look a name up in a scope; with `recursive`, walk the parent chain.
    pub fn lookup_in(&self, scope: ScopeId, name: &str, recursive: bool) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            for &symbol in &scope.symbols {
                if self.symbols[symbol].name == name {
                    return Some(symbol);
                }
            }
            if !recursive {
                return None;
            }
            current = scope.parent;
        }
        None
    }

    /// Recursive lookup from the current scope.
    pub(crate) fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.lookup_in(self.current_scope, name, true)
    }

    /// Insert a symbol into the current scope.
    ///
    /// Duplicates within the current scope are a diagnostic, matching the
    /// redefinition rule: the existing symbol stays, the new one is
    /// dropped.
    pub(crate) fn insert_symbol(&mut self, symbol: Symbol<'a>) -> Option<SymbolId> {
        if self
            .lookup_in(self.current_scope, &symbol.name, false)
            .is_some()
        {
            let message = format!("Redefinition of symbol '{}'", symbol.name);
            let (line, column) = (symbol.line, symbol.column);
            self.error_at_position(line, column, message);
            return None;
        }

        let scope = self.current_scope;
        let mut symbol = symbol;
        symbol.scope = Some(scope);
        let id = self.symbols.push(symbol);
        self.scopes[scope].symbols.push(id);
        Some(id)
    }
}
