//! voltc-sem - Multi-pass semantic analysis for the Volt language.
//!
//! The analyzer spans all translation units of a build: every unit's CST
//! is walked three times against one shared global scope.
//!
//! - **Pass 1** collects top-level declarations as symbols.
//! - **Pass 2** resolves type references and completes struct/enum types.
//! - **Pass 3** type-checks function bodies, managing nested scopes.
//!
//! Pass 1 finishes for *all* units before Pass 2 begins, and likewise
//! Pass 2 before Pass 3; that staging is what makes forward references
//! across files work. Every finding is appended to the shared diagnostic
//! handler and no pass aborts early; the final status is failure iff the
//! error count is nonzero.
//!
//! Symbols, scopes and types live in typed arenas owned by the analyzer;
//! every cross-link between them is a plain copyable id, which keeps the
//! inherently cyclic symbol graph free of ownership cycles.

mod pass1;
mod pass2;
mod pass3;
mod scope;
mod symbol;
mod types;

#[cfg(test)]
mod edge_cases;

pub use scope::{Scope, ScopeId, ScopeKind};
pub use symbol::{Symbol, SymbolId, SymbolKind};
pub use types::{Builtins, TypeId, TypeInfo, TypeKind};

use thiserror::Error;
use voltc_par::CstNode;
use voltc_util::{Handler, IndexVec};

/// One parsed translation unit handed to the analyzer.
#[derive(Clone, Copy)]
pub struct SourceUnit<'a> {
    pub root: &'a CstNode,
    pub filename: &'a str,
}

impl<'a> SourceUnit<'a> {
    pub fn new(root: &'a CstNode, filename: &'a str) -> Self {
        Self { root, filename }
    }
}

/// Analysis outcome for the caller; diagnostics carry the details.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("semantic analysis failed with {0} error(s)")]
    Failed(usize),
}

/// The semantic analyzer: shared state across all units and passes.
pub struct Analyzer<'a> {
    units: &'a [SourceUnit<'a>],
    handler: &'a Handler,

    pub(crate) symbols: IndexVec<SymbolId, Symbol<'a>>,
    pub(crate) scopes: IndexVec<ScopeId, Scope>,
    pub(crate) types: IndexVec<TypeId, TypeInfo>,

    /// Built-in type cache, one complete instance per primitive kind.
    pub(crate) builtins: Builtins,

    global_scope: ScopeId,
    pub(crate) current_scope: ScopeId,

    /// Index of the unit being analyzed, for diagnostics.
    current_file: usize,

    /// Symbols whose declared type was still unknown after Pass 2.
    pub(crate) unresolved: Vec<SymbolId>,

    error_count: usize,
}

impl<'a> Analyzer<'a> {
    pub fn new(units: &'a [SourceUnit<'a>], handler: &'a Handler) -> Self {
        let mut types = IndexVec::new();
        let builtins = Builtins::install(&mut types);

        let mut analyzer = Self {
            units,
            handler,
            symbols: IndexVec::new(),
            scopes: IndexVec::new(),
            types,
            builtins,
            global_scope: ScopeId(0),
            current_scope: ScopeId(0),
            current_file: 0,
            unresolved: Vec::new(),
            error_count: 0,
        };

        let global = analyzer.create_scope(ScopeKind::Global, None);
        analyzer.global_scope = global;
        analyzer.current_scope = global;
        analyzer
    }

    /// Run all three passes over every unit.
    pub fn analyze(&mut self) -> Result<(), AnalysisError> {
        log::info!("Starting semantic analysis of {} unit(s)", self.units.len());

        log::info!("Pass 1: collecting declarations");
        for index in 0..self.units.len() {
            self.current_file = index;
            log::debug!("  processing {}", self.units[index].filename);
            let root = self.units[index].root;
            self.pass1_unit(root);
        }

        log::info!("Pass 2: resolving types");
        for index in 0..self.units.len() {
            self.current_file = index;
            let root = self.units[index].root;
            self.pass2_unit(root);
        }
        if !self.unresolved.is_empty() {
            log::debug!(
                "{} symbol(s) left for initializer inference",
                self.unresolved.len()
            );
        }

        log::info!("Pass 3: type checking");
        for index in 0..self.units.len() {
            self.current_file = index;
            let root = self.units[index].root;
            self.pass3_unit(root);
        }

        if self.error_count > 0 {
            log::error!(
                "Semantic analysis failed with {} error(s)",
                self.error_count
            );
            Err(AnalysisError::Failed(self.error_count))
        } else {
            log::info!("Semantic analysis completed successfully");
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub(crate) fn current_filename(&self) -> &'a str {
        self.units
            .get(self.current_file)
            .map(|unit| unit.filename)
            .unwrap_or("<unknown>")
    }

    /// Report an error at the start of a node's source span.
    pub(crate) fn error_at(&mut self, node: &CstNode, message: impl Into<String>) {
        let span = node.span();
        self.error_at_position(span.line, span.column, message);
    }

    pub(crate) fn error_at_position(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.handler
            .error(self.current_filename(), line, column, message);
        self.error_count += 1;
    }

    // ------------------------------------------------------------------
    // Query API (used by the driver and by tests)
    // ------------------------------------------------------------------

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global_scope
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol<'a> {
        &self.symbols[id]
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn type_info(&self, id: TypeId) -> &TypeInfo {
        &self.types[id]
    }

    /// Symbol names in the global scope, in insertion order.
    pub fn global_symbol_names(&self) -> Vec<&str> {
        self.scopes[self.global_scope]
            .symbols
            .iter()
            .map(|&id| self.symbols[id].name.as_str())
            .collect()
    }

    /// Non-recursive lookup in the global scope.
    pub fn lookup_global(&self, name: &str) -> Option<SymbolId> {
        self.lookup_in(self.global_scope, name, false)
    }

    /// Symbols still lacking a concrete type after Pass 2.
    pub fn unresolved_symbols(&self) -> &[SymbolId] {
        &self.unresolved
    }
}

/// Top-level declaration nodes of a unit: everything reachable through the
/// `unit`/`items`/`items_rest`/`item` wrappers, one level deep.
pub(crate) fn top_level_decls<'n>(root: &'n CstNode) -> Vec<&'n CstNode> {
    fn walk<'n>(node: &'n CstNode, out: &mut Vec<&'n CstNode>) {
        match node.rule_name() {
            Some("unit") | Some("items") | Some("items_rest") | Some("item") => {
                for child in node.children() {
                    walk(child, out);
                }
            }
            Some(_) => out.push(node),
            None => {}
        }
    }
    let mut out = Vec::new();
    walk(root, &mut out);
    out
}

/// Flatten a right-recursive list encoding: collect every `item`-named
/// child of `node`, recursing through `rest`-named children.
pub(crate) fn collect_list<'n>(node: &'n CstNode, item: &str, rest: &str) -> Vec<&'n CstNode> {
    fn walk<'n>(node: &'n CstNode, item: &str, rest: &str, out: &mut Vec<&'n CstNode>) {
        for child in node.children() {
            if child.rule_name() == Some(item) {
                out.push(child);
            } else if child.rule_name() == Some(rest) {
                walk(child, item, rest, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(node, item, rest, &mut out);
    out
}
