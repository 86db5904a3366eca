//! Pass 1: declaration collection.
//!
//! Walks every unit's `unit`/`items`/`item` wrappers and declares each
//! top-level function, struct, enum, error and variable into the global
//! scope. Types are left incomplete and parameter lists empty; both are
//! filled by the later passes. Duplicate names within a scope are
//! rejected with a redefinition error, but the pass keeps going.

use voltc_lex::TokenKind;
use voltc_par::CstNode;

use crate::symbol::{Symbol, SymbolKind};
use crate::types::{TypeInfo, TypeKind};
use crate::{top_level_decls, Analyzer};

impl<'a> Analyzer<'a> {
    pub(crate) fn pass1_unit(&mut self, root: &'a CstNode) {
        self.current_scope = self.global_scope();
        for decl in top_level_decls(root) {
            match decl.rule_name() {
                Some("fn_decl") | Some("extern_decl") | Some("export_decl") => {
                    self.pass1_function(decl);
                }
                Some("struct_decl") => self.pass1_type_decl(decl, TypeKind::Struct),
                Some("enum_decl") => self.pass1_type_decl(decl, TypeKind::Enum),
                Some("error_decl") => self.pass1_type_decl(decl, TypeKind::Error),
                Some("var_decl") | Some("val_decl") | Some("static_decl") => {
                    self.pass1_variable(decl);
                }
                _ => {}
            }
        }
    }

    fn pass1_function(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            self.error_at(node, "Function declaration missing name");
            return;
        };

        let mut symbol = Symbol::new(SymbolKind::Function, name, node);
        symbol.is_async = node.find_token(TokenKind::AsyncKw).is_some();
        symbol.is_comptime = node.find_token(TokenKind::ComptimeKw).is_some();
        symbol.is_extern = node.find_token(TokenKind::ExternKw).is_some();

        self.insert_symbol(symbol);
    }

    /// Struct, enum and error declarations: an incomplete type wrapped in
    /// a type-kind symbol. Fields and variants arrive in Pass 2.
    fn pass1_type_decl(&mut self, node: &'a CstNode, kind: TypeKind) {
        let Some(name) = node.identifier() else {
            self.error_at(node, "Type declaration missing name");
            return;
        };

        let mut info = TypeInfo::new(kind);
        info.name = Some(name.to_string());
        let type_id = self.types.push(info);

        let mut symbol = Symbol::new(SymbolKind::Type, name, node);
        symbol.ty = Some(type_id);

        self.insert_symbol(symbol);
    }

    fn pass1_variable(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            self.error_at(node, "Variable declaration missing name");
            return;
        };

        let mut symbol = Symbol::new(SymbolKind::Variable, name, node);
        symbol.is_mutable = node.find_token(TokenKind::VarKw).is_some();
        symbol.is_static = node.find_token(TokenKind::StaticKw).is_some();

        self.insert_symbol(symbol);
    }
}
