//! Pass 2: type resolution.
//!
//! Every type reference stubbed by Pass 1 is resolved here: primitive
//! names go through the built-in cache, named types through the scope
//! chain (all units' declarations already exist, so cross-file forward
//! references resolve), and composite types are built from the suffix
//! chain. Struct fields and enum/error variants are populated and their
//! types marked complete; function symbols get full function types.

use voltc_lex::TokenKind;
use voltc_par::CstNode;

use crate::symbol::{Symbol, SymbolKind};
use crate::types::{TypeId, TypeInfo, TypeKind};
use crate::{collect_list, top_level_decls, Analyzer};

impl<'a> Analyzer<'a> {
    pub(crate) fn pass2_unit(&mut self, root: &'a CstNode) {
        self.current_scope = self.global_scope();
        for decl in top_level_decls(root) {
            match decl.rule_name() {
                Some("fn_decl") | Some("extern_decl") | Some("export_decl") => {
                    self.pass2_function(decl);
                }
                Some("struct_decl") => self.pass2_struct(decl),
                Some("enum_decl") | Some("error_decl") => self.pass2_enum(decl),
                Some("var_decl") | Some("val_decl") | Some("static_decl") => {
                    self.pass2_variable(decl);
                }
                _ => {}
            }
        }
    }

    fn pass2_function(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            return;
        };
        // A rejected duplicate of another kind must not clobber the
        // surviving symbol.
        let Some(symbol_id) = self
            .lookup_global(name)
            .filter(|&id| self.symbols[id].kind == SymbolKind::Function)
        else {
            return;
        };

        let mut param_types = Vec::new();
        let mut is_variadic = false;
        if let Some(params) = node.find_child("params") {
            let param_nodes = collect_list(params, "param", "params_rest");
            if param_nodes.is_empty() && params.find_token(TokenKind::Identifier).is_some() {
                // Variadic form: `name: type[]` directly under `params`.
                is_variadic = true;
                if let Some(type_node) = params.find_child("type") {
                    let base = self.resolve_type(type_node, true);
                    param_types.push(self.wrap_type(TypeKind::Array, base));
                }
            } else {
                for param in param_nodes {
                    let ty = match param.find_child("type") {
                        Some(type_node) => self.resolve_type(type_node, true),
                        None => self.builtins.unknown, // bare `this`
                    };
                    param_types.push(ty);
                }
            }
        }

        let return_type = match node.find_child("type") {
            Some(type_node) => self.resolve_type(type_node, true),
            None => self.builtins.void,
        };

        let mut info = TypeInfo::new(TypeKind::Function);
        info.element_types = param_types;
        info.return_type = Some(return_type);
        info.is_variadic = is_variadic;
        info.is_complete = true;
        let fn_type = self.types.push(info);

        let symbol = &mut self.symbols[symbol_id];
        symbol.ty = Some(fn_type);
        symbol.is_resolved = true;
    }

    fn pass2_struct(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            return;
        };
        let Some(type_id) = self
            .lookup_global(name)
            .filter(|&id| self.symbols[id].kind == SymbolKind::Type)
            .and_then(|id| self.symbols[id].ty)
        else {
            return;
        };

        let mut field_ids = Vec::new();
        if let Some(fields) = node.find_child("fields") {
            for field in collect_list(fields, "field", "fields_rest") {
                let Some(field_name) = field.identifier() else {
                    continue;
                };
                let field_type = match field.find_child("type") {
                    Some(type_node) => self.resolve_type(type_node, true),
                    None => self.builtins.unknown,
                };
                let mut symbol = Symbol::new(SymbolKind::Variable, field_name, field);
                symbol.ty = Some(field_type);
                symbol.is_resolved = true;
                field_ids.push(self.symbols.push(symbol));
            }
        }

        let info = &mut self.types[type_id];
        info.fields = field_ids;
        info.is_complete = true;

        if let Some(symbol_id) = self.lookup_global(name) {
            self.symbols[symbol_id].is_resolved = true;
        }
    }

    fn pass2_enum(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            return;
        };
        let Some(type_id) = self
            .lookup_global(name)
            .filter(|&id| self.symbols[id].kind == SymbolKind::Type)
            .and_then(|id| self.symbols[id].ty)
        else {
            return;
        };

        let mut variant_ids = Vec::new();
        if let Some(variants) = node.find_child("enum_variants") {
            for variant in collect_list(variants, "enum_variant", "enum_variants_rest") {
                let Some(variant_name) = variant.identifier() else {
                    continue;
                };
                // Payload type when annotated, the enum itself otherwise.
                let variant_type = match variant.find_child("type") {
                    Some(type_node) => self.resolve_type(type_node, true),
                    None => type_id,
                };
                let mut symbol = Symbol::new(SymbolKind::EnumVariant, variant_name, variant);
                symbol.ty = Some(variant_type);
                symbol.is_resolved = true;
                variant_ids.push(self.symbols.push(symbol));
            }
        }

        let info = &mut self.types[type_id];
        info.variants = variant_ids;
        info.is_complete = true;

        if let Some(symbol_id) = self.lookup_global(name) {
            self.symbols[symbol_id].is_resolved = true;
        }
    }

    fn pass2_variable(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            return;
        };
        let Some(symbol_id) = self
            .lookup_global(name)
            .filter(|&id| self.symbols[id].kind == SymbolKind::Variable)
        else {
            return;
        };

        let declared = node
            .find_child("type")
            .map(|type_node| self.resolve_type(type_node, true))
            .unwrap_or(self.builtins.unknown);

        let symbol = &mut self.symbols[symbol_id];
        symbol.ty = Some(declared);
        symbol.is_resolved = true;

        if declared == self.builtins.unknown {
            // No annotation; Pass 3 infers from the initializer.
            self.unresolved.push(symbol_id);
        }
    }

    // ------------------------------------------------------------------
    // Type reference resolution
    // ------------------------------------------------------------------

    /// Resolve a `type` rule node into a type id.
    ///
    /// With `report`, a named type that is not in scope produces an
    /// error; either way the unknown sentinel is returned so checking can
    /// continue.
    pub(crate) fn resolve_type(&mut self, node: &'a CstNode, report: bool) -> TypeId {
        let Some(base_node) = node.find_child("base_type") else {
            return self.builtins.unknown;
        };

        let mut ty = self.resolve_base_type(base_node, report);

        if let Some(suffixes) = node.find_child("type_suffixes") {
            for suffix in collect_list(suffixes, "type_suffix", "type_suffixes_rest") {
                ty = self.apply_type_suffix(ty, suffix);
            }
        }

        ty
    }

    fn resolve_base_type(&mut self, node: &'a CstNode, report: bool) -> TypeId {
        let Some(inner) = node.children().first() else {
            return self.builtins.unknown;
        };

        match inner.rule_name() {
            Some("primitive_type") => {
                let lexeme = inner
                    .children()
                    .first()
                    .and_then(|c| c.token())
                    .map(|t| t.lexeme.as_str());
                lexeme
                    .and_then(|name| self.builtins.by_name(name))
                    .unwrap_or(self.builtins.unknown)
            }
            Some("named_type") => {
                let Some(name) = inner
                    .find_child("path")
                    .and_then(|path| path.identifier())
                else {
                    return self.builtins.unknown;
                };
                match self.lookup(name) {
                    Some(symbol_id) if self.symbols[symbol_id].kind == SymbolKind::Type => {
                        self.symbols[symbol_id].ty.unwrap_or(self.builtins.unknown)
                    }
                    _ => {
                        if report {
                            let message = format!("Unknown type '{}'", name);
                            self.error_at(inner, message);
                        }
                        self.builtins.unknown
                    }
                }
            }
            Some("error_wrapper_type") => {
                let base = inner
                    .find_child("type")
                    .map(|t| self.resolve_type(t, report))
                    .unwrap_or(self.builtins.unknown);
                self.wrap_type(TypeKind::Error, base)
            }
            Some("named_error_wrapper") => {
                let base = inner
                    .find_child("type")
                    .map(|t| self.resolve_type(t, report))
                    .unwrap_or(self.builtins.unknown);
                let wrapper = self.wrap_type(TypeKind::Error, base);
                if let Some(name) = inner.find_child("path").and_then(|p| p.identifier()) {
                    self.types[wrapper].name = Some(name.to_string());
                }
                wrapper
            }
            Some("tuple_type") => {
                let mut elements = Vec::new();
                if let Some(list) = inner.find_child("type_list") {
                    for field in collect_list(list, "tuple_field", "type_list_rest") {
                        let element = field
                            .find_child("type")
                            .map(|t| self.resolve_type(t, report))
                            .unwrap_or(self.builtins.unknown);
                        elements.push(element);
                    }
                }
                let mut info = TypeInfo::new(TypeKind::Tuple);
                info.element_types = elements;
                info.is_complete = true;
                self.types.push(info)
            }
            Some("closure_type") => {
                let mut elements = Vec::new();
                if let Some(list) = inner
                    .find_child("closure_params")
                    .and_then(|p| p.find_child("type_list"))
                {
                    for field in collect_list(list, "tuple_field", "type_list_rest") {
                        let element = field
                            .find_child("type")
                            .map(|t| self.resolve_type(t, report))
                            .unwrap_or(self.builtins.unknown);
                        elements.push(element);
                    }
                }
                let return_type = inner
                    .find_child("type")
                    .map(|t| self.resolve_type(t, report))
                    .unwrap_or(self.builtins.void);
                let mut info = TypeInfo::new(TypeKind::Function);
                info.element_types = elements;
                info.return_type = Some(return_type);
                info.is_complete = true;
                self.types.push(info)
            }
            _ => self.builtins.unknown,
        }
    }

    /// Wrap `base` according to one `type_suffix` node.
    fn apply_type_suffix(&mut self, base: TypeId, suffix: &CstNode) -> TypeId {
        let star = suffix.find_token(TokenKind::Star).is_some();
        let question = suffix.find_token(TokenKind::Question).is_some();
        let bracket = suffix.find_token(TokenKind::LBracket).is_some();
        let dotdot = suffix.find_token(TokenKind::DotDot).is_some();

        if star && question {
            let id = self.wrap_type(TypeKind::Pointer, base);
            self.types[id].is_nullable = true;
            id
        } else if star {
            self.wrap_type(TypeKind::Reference, base)
        } else if question {
            let mut info = self.types[base].clone();
            info.is_nullable = true;
            self.types.push(info)
        } else if bracket && dotdot {
            self.wrap_type(TypeKind::Slice, base)
        } else if bracket {
            // Both `[]` and `[expr]`; the size expression stays
            // unevaluated here.
            self.wrap_type(TypeKind::Array, base)
        } else {
            base
        }
    }

    /// New complete wrapper type around `base`.
    pub(crate) fn wrap_type(&mut self, kind: TypeKind, base: TypeId) -> TypeId {
        let mut info = TypeInfo::new(kind);
        info.base = Some(base);
        info.is_complete = true;
        self.types.push(info)
    }
}
