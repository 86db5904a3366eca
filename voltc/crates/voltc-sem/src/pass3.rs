//! Pass 3: expression type checking.
//!
//! Walks the body of every function, computing a type for each expression
//! and checking the rules the language actually pins down: numeric
//! operators want numeric operands, bitwise and shift operators want
//! integers, assignments want a mutable lvalue, calls want a callable
//! with compatible arguments, returns are checked against the enclosing
//! function scope. Everything the unknown sentinel touches is accepted,
//! so one unresolved name does not spray follow-on errors.
//!
//! Scope discipline: functions, blocks, loops and match statements each
//! push a scope of the matching kind on entry and pop it on exit;
//! break/continue are valid only with a loop scope between them and the
//! enclosing function.

use voltc_lex::{Token, TokenKind};
use voltc_par::CstNode;

use crate::scope::ScopeKind;
use crate::symbol::{Symbol, SymbolKind};
use crate::types::{TypeId, TypeKind};
use crate::{collect_list, top_level_decls, Analyzer};

/// Operator families with shared checking rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpClass {
    /// `&&` `||`: boolean operands, boolean result.
    Logical,
    /// `|` `^` `&` `<<` `>>`: integer operands, left operand's type.
    Bitwise,
    /// `==` `!=`: compatible operands, boolean result.
    Equality,
    /// `<` `>` `<=` `>=`: numeric operands, boolean result.
    Relational,
    /// `..` `..=`: integer operands, left operand's type.
    Range,
    /// `+` `-` `*` `/` `%`: numeric operands, left operand's type.
    Arithmetic,
}

const CHAIN_RULES: &[(&str, OpClass)] = &[
    ("logical_or_expr", OpClass::Logical),
    ("logical_and_expr", OpClass::Logical),
    ("bitwise_or_expr", OpClass::Bitwise),
    ("bitwise_xor_expr", OpClass::Bitwise),
    ("bitwise_and_expr", OpClass::Bitwise),
    ("equality_expr", OpClass::Equality),
    ("relational_expr", OpClass::Relational),
    ("shift_expr", OpClass::Bitwise),
    ("range_expr", OpClass::Range),
    ("additive_expr", OpClass::Arithmetic),
    ("multiplicative_expr", OpClass::Arithmetic),
];

impl<'a> Analyzer<'a> {
    pub(crate) fn pass3_unit(&mut self, root: &'a CstNode) {
        self.current_scope = self.global_scope();
        for decl in top_level_decls(root) {
            match decl.rule_name() {
                Some("fn_decl") | Some("export_decl") => self.check_function(decl),
                Some("var_decl") | Some("val_decl") | Some("static_decl") => {
                    self.check_global_variable(decl);
                }
                _ => {}
            }
        }
    }

    /// Check a top-level variable's initializer; when Pass 2 left the
    /// type unknown, infer it from the initializer.
    fn check_global_variable(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            return;
        };
        let Some(expr) = node.find_child("expression") else {
            return;
        };
        let inferred = self.check_expr(expr);
        let Some(symbol_id) = self
            .lookup_global(name)
            .filter(|&id| self.symbols[id].kind == SymbolKind::Variable)
        else {
            return;
        };

        let current = self.symbols[symbol_id].ty;
        let still_unknown = current
            .map(|t| self.types[t].kind == TypeKind::Unknown)
            .unwrap_or(true);
        if still_unknown {
            self.symbols[symbol_id].ty = Some(inferred);
        } else if let Some(declared) = current {
            if !self.types_compatible(declared, inferred) {
                let message = format!(
                    "Type mismatch: cannot initialize '{}' of type {} with {}",
                    name,
                    self.type_name(declared),
                    self.type_name(inferred)
                );
                self.error_at(node, message);
            }
        }
    }

    fn check_function(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            return;
        };
        let symbol_id = self
            .lookup_global(name)
            .filter(|&id| self.symbols[id].kind == SymbolKind::Function);
        let fn_type = symbol_id.and_then(|id| self.symbols[id].ty);
        let return_type = fn_type
            .and_then(|t| self.types[t].return_type)
            .unwrap_or(self.builtins.unknown);
        let param_types: Vec<TypeId> = fn_type
            .map(|t| self.types[t].element_types.clone())
            .unwrap_or_default();

        let saved = self.current_scope;
        self.current_scope = self.global_scope();
        let fn_scope = self.enter_scope(ScopeKind::Function);
        self.scopes[fn_scope].return_type = Some(return_type);

        let mut parameter_ids = Vec::new();
        if let Some(params) = node.find_child("params") {
            for (index, param) in collect_list(params, "param", "params_rest")
                .into_iter()
                .enumerate()
            {
                let param_name = param
                    .identifier()
                    .map(str::to_string)
                    .or_else(|| param.find_token(TokenKind::ThisKw).map(|_| "this".to_string()));
                let Some(param_name) = param_name else {
                    continue;
                };
                let mut symbol = Symbol::new(SymbolKind::Variable, param_name, param);
                symbol.ty = param_types.get(index).copied();
                symbol.is_resolved = true;
                if let Some(id) = self.insert_symbol(symbol) {
                    parameter_ids.push(id);
                }
            }
            // Variadic form: one array-typed parameter directly under
            // `params`.
            if parameter_ids.is_empty() && collect_list(params, "param", "params_rest").is_empty()
            {
                if let Some(token) = params.find_token(TokenKind::Identifier) {
                    let mut symbol = Symbol::new(SymbolKind::Variable, token.lexeme.clone(), params);
                    symbol.ty = param_types.first().copied();
                    symbol.is_resolved = true;
                    if let Some(id) = self.insert_symbol(symbol) {
                        parameter_ids.push(id);
                    }
                }
            }
        }
        if let Some(symbol_id) = symbol_id {
            self.symbols[symbol_id].parameters = parameter_ids;
        }

        if let Some(block) = node.find_child("block") {
            self.check_block_statements(block);
        }

        self.current_scope = saved;
    }

    /// Check the statements of a block node in the current scope.
    fn check_block_statements(&mut self, block: &'a CstNode) {
        if let Some(statements) = block.find_child("statements") {
            for statement in collect_list(statements, "statement", "statements_rest") {
                self.check_statement(statement);
            }
        }
    }

    /// Check a block in a fresh scope of the given kind.
    fn check_block_in_scope(&mut self, block: &'a CstNode, kind: ScopeKind) {
        self.enter_scope(kind);
        self.check_block_statements(block);
        self.exit_scope();
    }

    fn check_statement(&mut self, statement: &'a CstNode) {
        let Some(inner) = statement.children().first() else {
            return;
        };
        match inner.rule_name() {
            Some("var_decl") | Some("val_decl") | Some("static_decl") => {
                self.check_local_decl(inner);
            }
            Some("return_stmt") => self.check_return(inner),
            Some("break_stmt") => self.check_loop_exit(inner, "break"),
            Some("continue_stmt") => self.check_loop_exit(inner, "continue"),
            Some("if_stmt") => self.check_if(inner),
            Some("while_stmt") => self.check_while(inner),
            Some("loop_stmt") => self.check_loop(inner),
            Some("for_stmt") => self.check_for(inner),
            Some("match_stmt") => self.check_match(inner),
            Some("defer_stmt") | Some("resume_stmt") => {
                if let Some(expr) = inner.find_child("expression") {
                    self.check_expr(expr);
                }
            }
            Some("suspend_stmt") => {}
            Some("expr_stmt") => {
                if let Some(expr) = inner.find_child("expression") {
                    self.check_expr(expr);
                }
            }
            _ => {}
        }
    }

    /// Local var/val/static declaration: resolve the annotation or infer
    /// from the initializer, then declare the symbol in the current scope.
    fn check_local_decl(&mut self, node: &'a CstNode) {
        let Some(name) = node.identifier() else {
            return;
        };

        let annotated = node
            .find_child("type")
            .map(|type_node| self.resolve_type(type_node, true));
        let initializer = node
            .find_child("expression")
            .map(|expr| self.check_expr(expr));

        if let (Some(declared), Some(found)) = (annotated, initializer) {
            if !self.types_compatible(declared, found) {
                let message = format!(
                    "Type mismatch: cannot initialize '{}' of type {} with {}",
                    name,
                    self.type_name(declared),
                    self.type_name(found)
                );
                self.error_at(node, message);
            }
        }

        let mut symbol = Symbol::new(SymbolKind::Variable, name, node);
        symbol.is_mutable = node.find_token(TokenKind::VarKw).is_some();
        symbol.is_static = node.find_token(TokenKind::StaticKw).is_some();
        symbol.ty = annotated.or(initializer).or(Some(self.builtins.unknown));
        symbol.is_resolved = true;
        self.insert_symbol(symbol);
    }

    fn check_return(&mut self, node: &'a CstNode) {
        let expected = self.enclosing_return_type();
        let actual = match node.find_child("expression") {
            Some(expr) => self.check_expr(expr),
            None => self.builtins.void,
        };

        if let Some(expected) = expected {
            if !self.return_compatible(expected, actual) {
                let message = format!(
                    "Return type mismatch: expected {}, found {}",
                    self.type_name(expected),
                    self.type_name(actual)
                );
                self.error_at(node, message);
            }
        }
    }

    /// An `error!T` return type admits both the success value and an
    /// error value.
    fn return_compatible(&self, expected: TypeId, actual: TypeId) -> bool {
        if self.types_compatible(expected, actual) {
            return true;
        }
        let info = &self.types[expected];
        if info.kind == TypeKind::Error {
            if self.types[actual].kind == TypeKind::Error {
                return true;
            }
            if let Some(base) = info.base {
                return self.types_compatible(base, actual);
            }
        }
        false
    }

    /// Return type of the enclosing function scope, if any.
    fn enclosing_return_type(&self) -> Option<TypeId> {
        let mut scope = Some(self.current_scope);
        while let Some(id) = scope {
            let frame = &self.scopes[id];
            if frame.kind == ScopeKind::Function {
                return frame.return_type;
            }
            scope = frame.parent;
        }
        None
    }

    /// break/continue must have a loop scope between them and the
    /// enclosing function.
    fn check_loop_exit(&mut self, node: &'a CstNode, keyword: &str) {
        let mut scope = Some(self.current_scope);
        let mut inside_loop = false;
        while let Some(id) = scope {
            match self.scopes[id].kind {
                ScopeKind::Loop => {
                    inside_loop = true;
                    break;
                }
                ScopeKind::Function | ScopeKind::Global => break,
                _ => scope = self.scopes[id].parent,
            }
        }
        if !inside_loop {
            let message = format!("'{}' outside of a loop", keyword);
            self.error_at(node, message);
        }
    }

    fn check_condition(&mut self, expr: &'a CstNode) {
        let ty = self.check_expr(expr);
        let kind = self.types[ty].kind;
        if kind != TypeKind::Bool && kind != TypeKind::Unknown {
            let message = format!("Condition must be 'bool', found {}", self.type_name(ty));
            self.error_at(expr, message);
        }
    }

    fn check_if(&mut self, node: &'a CstNode) {
        if let Some(cond) = node.find_child("expression") {
            self.check_condition(cond);
        }
        if let Some(block) = node.find_child("block") {
            self.check_block_in_scope(block, ScopeKind::Block);
        }
        if let Some(else_clause) = node.find_child("else_clause") {
            if let Some(nested) = else_clause.find_child("if_stmt") {
                self.check_if(nested);
            } else if let Some(block) = else_clause.find_child("block") {
                self.check_block_in_scope(block, ScopeKind::Block);
            }
        }
    }

    fn check_while(&mut self, node: &'a CstNode) {
        if let Some(cond) = node.find_child("expression") {
            self.check_condition(cond);
        }
        if let Some(block) = node.find_child("block") {
            self.check_block_in_scope(block, ScopeKind::Loop);
        }
    }

    fn check_loop(&mut self, node: &'a CstNode) {
        if let Some(block) = node.find_child("block") {
            self.check_block_in_scope(block, ScopeKind::Loop);
        }
    }

    fn check_for(&mut self, node: &'a CstNode) {
        self.enter_scope(ScopeKind::Loop);

        // Loop bindings; element types are an inference extension point,
        // so they enter as unknown.
        if let Some(binding) = node.find_child("for_binding") {
            for token in binding_identifiers(binding) {
                let mut symbol = Symbol::new(SymbolKind::Variable, token.lexeme.clone(), binding);
                symbol.line = token.line;
                symbol.column = token.column;
                symbol.ty = Some(self.builtins.unknown);
                symbol.is_resolved = true;
                self.insert_symbol(symbol);
            }
        }

        if let Some(iterable) = node.find_child("for_iterable_expr") {
            self.check_expr(iterable);
        } else if let Some(expr) = node.find_child("expression") {
            self.check_expr(expr);
        }

        if let Some(pre) = node.find_child("for_pre_expr") {
            if let Some(expr) = pre.find_child("expression") {
                self.check_expr(expr);
            }
        }

        if let Some(captures) = node.find_child("for_captures") {
            if let Some(list) = captures.find_child("capture_list") {
                for capture in collect_list(list, "capture", "capture_list_rest") {
                    let Some(name) = capture.identifier() else {
                        continue;
                    };
                    let ty = capture
                        .find_child("type")
                        .map(|t| self.resolve_type(t, true))
                        .unwrap_or(self.builtins.unknown);
                    let mut symbol = Symbol::new(SymbolKind::Variable, name, capture);
                    symbol.is_mutable = true;
                    symbol.ty = Some(ty);
                    symbol.is_resolved = true;
                    self.insert_symbol(symbol);
                }
            }
        }

        if let Some(block) = node.find_child("block") {
            self.check_block_statements(block);
        }

        self.exit_scope();
    }

    fn check_match(&mut self, node: &'a CstNode) {
        if let Some(expr) = node.find_child("expression") {
            self.check_expr(expr);
        }

        self.enter_scope(ScopeKind::Match);
        if let Some(arms) = node.find_child("match_arms") {
            for arm in collect_list(arms, "match_arm", "match_arms_rest") {
                if let Some(pattern) = arm.find_child("match_pattern") {
                    if let Some(expr) = pattern.find_child("expression") {
                        self.check_expr(expr);
                    }
                }
                if let Some(body) = arm.find_child("expression") {
                    self.check_expr(body);
                } else if let Some(block) = arm.find_child("block") {
                    self.check_block_in_scope(block, ScopeKind::Block);
                }
            }
        }
        self.exit_scope();
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Compute the type of an expression subtree.
    pub(crate) fn check_expr(&mut self, node: &'a CstNode) -> TypeId {
        let Some(rule) = node.rule_name() else {
            return self.builtins.unknown;
        };

        if let Some(&(_, class)) = CHAIN_RULES.iter().find(|(name, _)| *name == rule) {
            return self.check_binary_chain(node, class);
        }

        match rule {
            "expression" | "match_pattern" | "for_iterable_expr" => node
                .children()
                .iter()
                .find(|c| c.rule_name().is_some())
                .map(|c| self.check_expr(c))
                .unwrap_or(self.builtins.unknown),
            "assignment_expr" => self.check_assignment(node),
            "cast_expr" => self.check_cast(node),
            "unary_expr" => self.check_unary(node),
            "postfix_expr" => self.check_postfix(node),
            "primary_expr" => self.check_primary(node),
            "paren_expr" => node
                .find_child("expression")
                .map(|e| self.check_expr(e))
                .unwrap_or(self.builtins.unknown),
            _ => self.builtins.unknown,
        }
    }

    /// Fold a `<operand> <rest>` chain, checking each operator.
    fn check_binary_chain(&mut self, node: &'a CstNode, class: OpClass) -> TypeId {
        let children = node.children();
        let Some(first) = children.first() else {
            return self.builtins.unknown;
        };
        let mut result = self.check_expr(first);

        let mut rest = children.get(1);
        while let Some(rest_node) = rest {
            if rest_node.is_epsilon() || rest_node.children().is_empty() {
                break;
            }
            let rest_children = rest_node.children();
            let operator = rest_children.first().and_then(|c| c.token());
            let Some(operand) = rest_children.iter().find(|c| c.rule_name().is_some()) else {
                break;
            };
            let right = self.check_expr(operand);
            result = self.check_binary_op(rest_node, operator, class, result, right);

            // The nested rest carries the same rule name; range and
            // assignment rests have none.
            rest = rest_children
                .iter()
                .find(|c| c.rule_name() == rest_node.rule_name());
        }

        result
    }

    fn check_binary_op(
        &mut self,
        node: &'a CstNode,
        operator: Option<&Token>,
        class: OpClass,
        left: TypeId,
        right: TypeId,
    ) -> TypeId {
        let op = operator.map(|t| t.lexeme.as_str()).unwrap_or("?");
        let lk = self.types[left].kind;
        let rk = self.types[right].kind;
        let unknown = lk == TypeKind::Unknown || rk == TypeKind::Unknown;

        match class {
            OpClass::Logical => {
                if !unknown && (lk != TypeKind::Bool || rk != TypeKind::Bool) {
                    let message = format!(
                        "Operator '{}' requires boolean operands, found {} and {}",
                        op,
                        self.type_name(left),
                        self.type_name(right)
                    );
                    self.error_at(node, message);
                }
                self.builtins.bool
            }
            OpClass::Bitwise | OpClass::Range => {
                if !unknown && (!lk.is_integer() || !rk.is_integer()) {
                    let message = format!(
                        "Operator '{}' requires integer operands, found {} and {}",
                        op,
                        self.type_name(left),
                        self.type_name(right)
                    );
                    self.error_at(node, message);
                }
                left
            }
            OpClass::Equality => {
                if !self.types_compatible(left, right) {
                    let message = format!(
                        "Cannot compare {} and {}",
                        self.type_name(left),
                        self.type_name(right)
                    );
                    self.error_at(node, message);
                }
                self.builtins.bool
            }
            OpClass::Relational => {
                if !unknown && (!lk.is_numeric() || !rk.is_numeric()) {
                    let message = format!(
                        "Operator '{}' requires numeric operands, found {} and {}",
                        op,
                        self.type_name(left),
                        self.type_name(right)
                    );
                    self.error_at(node, message);
                }
                self.builtins.bool
            }
            OpClass::Arithmetic => {
                if !unknown && (!lk.is_numeric() || !rk.is_numeric()) {
                    let message = format!(
                        "Operator '{}' requires numeric operands, found {} and {}",
                        op,
                        self.type_name(left),
                        self.type_name(right)
                    );
                    self.error_at(node, message);
                }
                left
            }
        }
    }

    fn check_assignment(&mut self, node: &'a CstNode) -> TypeId {
        let children = node.children();
        let Some(target_node) = children.first() else {
            return self.builtins.unknown;
        };
        let target = self.check_expr(target_node);

        let Some(rest) = children.get(1).filter(|r| !r.is_epsilon()) else {
            return target;
        };

        self.check_assignable(target_node);

        let value = rest
            .find_child("assignment_expr")
            .map(|v| self.check_expr(v))
            .unwrap_or(self.builtins.unknown);

        if !self.types_compatible(target, value) {
            let message = format!(
                "Type mismatch in assignment: expected {}, found {}",
                self.type_name(target),
                self.type_name(value)
            );
            self.error_at(node, message);
        }

        target
    }

    /// Verify that an expression subtree is a mutable lvalue.
    fn check_assignable(&mut self, node: &'a CstNode) {
        match node.rule_name() {
            Some(name) if CHAIN_RULES.iter().any(|(n, _)| *n == name) => {
                let children = node.children();
                let has_operator = children
                    .get(1)
                    .map(|rest| !rest.is_epsilon())
                    .unwrap_or(false);
                if has_operator {
                    self.error_at(node, "Invalid assignment target");
                    return;
                }
                if let Some(first) = children.first() {
                    self.check_assignable(first);
                }
            }
            Some("expression") | Some("assignment_expr") | Some("paren_expr") => {
                if let Some(inner) = node.children().iter().find(|c| c.rule_name().is_some()) {
                    self.check_assignable(inner);
                }
            }
            Some("cast_expr") => {
                let children = node.children();
                let cast = children
                    .get(1)
                    .map(|rest| !rest.is_epsilon())
                    .unwrap_or(false);
                if cast {
                    self.error_at(node, "Invalid assignment target");
                } else if let Some(first) = children.first() {
                    self.check_assignable(first);
                }
            }
            Some("unary_expr") => {
                // Only a dereference keeps lvalue-ness.
                if let Some(op) = node.find_child("unary_op") {
                    let is_deref = op.find_token(TokenKind::Star).is_some();
                    if !is_deref {
                        self.error_at(node, "Invalid assignment target");
                    }
                } else if let Some(first) = node.children().first() {
                    self.check_assignable(first);
                }
            }
            Some("postfix_expr") => {
                let children = node.children();
                let rest = children.get(1).filter(|r| !r.is_epsilon());
                if let Some(rest) = rest {
                    // Projections (index, member access) keep lvalue-ness;
                    // calls and increments do not.
                    for op in collect_list(rest, "postfix_op", "postfix_expr_rest") {
                        let invalid = op.find_child("call").is_some()
                            || op.find_child("catch_clause").is_some()
                            || op.find_token(TokenKind::PlusPlus).is_some()
                            || op.find_token(TokenKind::MinusMinus).is_some();
                        if invalid {
                            self.error_at(node, "Invalid assignment target");
                            return;
                        }
                    }
                }
                if let Some(first) = children.first() {
                    self.check_assignable(first);
                }
            }
            Some("primary_expr") => match node.children().first() {
                Some(CstNode::Token(token)) if token.kind == TokenKind::Identifier => {
                    if let Some(symbol_id) = self.lookup(&token.lexeme) {
                        let symbol = &self.symbols[symbol_id];
                        if symbol.kind == SymbolKind::Variable && !symbol.is_mutable {
                            let message =
                                format!("Cannot assign to immutable value '{}'", token.lexeme);
                            self.error_at(node, message);
                        }
                    }
                }
                Some(CstNode::Token(token)) if token.kind == TokenKind::ThisKw => {}
                Some(inner) if inner.rule_name() == Some("paren_expr") => {
                    self.check_assignable(inner);
                }
                _ => self.error_at(node, "Invalid assignment target"),
            },
            _ => {}
        }
    }

    fn check_cast(&mut self, node: &'a CstNode) -> TypeId {
        let children = node.children();
        let value = children
            .first()
            .map(|c| self.check_expr(c))
            .unwrap_or(self.builtins.unknown);

        match children.get(1).filter(|rest| !rest.is_epsilon()) {
            Some(rest) => rest
                .find_child("type")
                .map(|t| self.resolve_type(t, true))
                .unwrap_or(value),
            None => value,
        }
    }

    fn check_unary(&mut self, node: &'a CstNode) -> TypeId {
        let children = node.children();

        // try <expr>: unwrap the error wrapper.
        if children
            .first()
            .and_then(|c| c.token())
            .map(|t| t.kind == TokenKind::TryKw)
            .unwrap_or(false)
        {
            let operand = children
                .iter()
                .find(|c| c.rule_name().is_some())
                .map(|c| self.check_expr(c))
                .unwrap_or(self.builtins.unknown);
            return self.unwrap_error(operand);
        }

        let Some(op_node) = node.find_child("unary_op") else {
            // Plain postfix alternative.
            return children
                .first()
                .map(|c| self.check_expr(c))
                .unwrap_or(self.builtins.unknown);
        };

        let operand = children
            .iter()
            .skip(1)
            .find(|c| c.rule_name().is_some())
            .map(|c| self.check_expr(c))
            .unwrap_or(self.builtins.unknown);
        let kind = self.types[operand].kind;
        let op_token = op_node.children().first().and_then(|c| c.token());
        let Some(op_token) = op_token else {
            return operand;
        };

        match op_token.kind {
            TokenKind::Minus | TokenKind::PlusPlus | TokenKind::MinusMinus => {
                if kind != TypeKind::Unknown && !kind.is_numeric() {
                    let message = format!(
                        "Operator '{}' requires a numeric operand, found {}",
                        op_token.lexeme,
                        self.type_name(operand)
                    );
                    self.error_at(node, message);
                }
                operand
            }
            TokenKind::Bang => {
                if kind != TypeKind::Unknown && kind != TypeKind::Bool {
                    let message = format!(
                        "Operator '!' requires a boolean operand, found {}",
                        self.type_name(operand)
                    );
                    self.error_at(node, message);
                }
                self.builtins.bool
            }
            TokenKind::Tilde => {
                if kind != TypeKind::Unknown && !kind.is_integer() {
                    let message = format!(
                        "Operator '~' requires an integer operand, found {}",
                        self.type_name(operand)
                    );
                    self.error_at(node, message);
                }
                operand
            }
            TokenKind::Star => match kind {
                TypeKind::Pointer | TypeKind::Reference => self.types[operand]
                    .base
                    .unwrap_or(self.builtins.unknown),
                TypeKind::Unknown => self.builtins.unknown,
                _ => {
                    let message = format!(
                        "Cannot dereference value of type {}",
                        self.type_name(operand)
                    );
                    self.error_at(node, message);
                    self.builtins.unknown
                }
            },
            TokenKind::Ampersand => self.wrap_type(TypeKind::Reference, operand),
            // move/copy pass the operand through.
            _ => operand,
        }
    }

    fn check_postfix(&mut self, node: &'a CstNode) -> TypeId {
        let children = node.children();
        let Some(primary) = children.first() else {
            return self.builtins.unknown;
        };
        let mut ty = self.check_expr(primary);

        let Some(rest) = children.get(1).filter(|r| !r.is_epsilon()) else {
            return ty;
        };

        for op in collect_list(rest, "postfix_op", "postfix_expr_rest") {
            ty = self.check_postfix_op(ty, op);
        }
        ty
    }

    fn check_postfix_op(&mut self, ty: TypeId, op: &'a CstNode) -> TypeId {
        if let Some(call) = op.find_child("call") {
            return self.check_call(ty, call);
        }
        if let Some(index) = op.find_child("index") {
            return self.check_index(ty, index);
        }
        if let Some(member) = op.find_child("member_access") {
            return self.check_member(ty, member);
        }
        if let Some(catch) = op.find_child("catch_clause") {
            return self.check_catch(ty, catch);
        }
        if op.find_token(TokenKind::PlusPlus).is_some()
            || op.find_token(TokenKind::MinusMinus).is_some()
        {
            let kind = self.types[ty].kind;
            if kind != TypeKind::Unknown && !kind.is_numeric() {
                let message = format!(
                    "Increment requires a numeric operand, found {}",
                    self.type_name(ty)
                );
                self.error_at(op, message);
            }
            return ty;
        }
        ty
    }

    fn check_call(&mut self, callee: TypeId, call: &'a CstNode) -> TypeId {
        let mut argument_types = Vec::new();
        if let Some(args) = call.find_child("args") {
            for arg in collect_list(args, "expression", "args_rest") {
                argument_types.push((arg, self.check_expr(arg)));
            }
        }

        let info = &self.types[callee];
        match info.kind {
            TypeKind::Function => {
                let parameters = info.element_types.clone();
                let return_type = info.return_type;
                let variadic = info.is_variadic;

                if !variadic && parameters.len() != argument_types.len() {
                    let message = format!(
                        "Expected {} argument(s), found {}",
                        parameters.len(),
                        argument_types.len()
                    );
                    self.error_at(call, message);
                } else if !variadic {
                    for (index, (&parameter, &(arg_node, argument))) in
                        parameters.iter().zip(&argument_types).enumerate()
                    {
                        if !self.types_compatible(parameter, argument) {
                            let message = format!(
                                "Argument {} type mismatch: expected {}, found {}",
                                index + 1,
                                self.type_name(parameter),
                                self.type_name(argument)
                            );
                            self.error_at(arg_node, message);
                        }
                    }
                }

                return_type.unwrap_or(self.builtins.unknown)
            }
            TypeKind::Unknown => self.builtins.unknown,
            _ => {
                let message = format!("Cannot call value of type {}", self.type_name(callee));
                self.error_at(call, message);
                self.builtins.unknown
            }
        }
    }

    fn check_index(&mut self, ty: TypeId, index: &'a CstNode) -> TypeId {
        if let Some(expr) = index.find_child("expression") {
            let index_type = self.check_expr(expr);
            let kind = self.types[index_type].kind;
            if kind != TypeKind::Unknown && !kind.is_integer() {
                let message = format!(
                    "Array index must be an integer, found {}",
                    self.type_name(index_type)
                );
                self.error_at(expr, message);
            }
        }

        let info = &self.types[ty];
        match info.kind {
            TypeKind::Array | TypeKind::Slice | TypeKind::Pointer | TypeKind::Reference => {
                info.base.unwrap_or(self.builtins.unknown)
            }
            TypeKind::Str | TypeKind::Cstr => self.builtins.u8,
            TypeKind::Unknown => self.builtins.unknown,
            _ => {
                let message = format!("Cannot index value of type {}", self.type_name(ty));
                self.error_at(index, message);
                self.builtins.unknown
            }
        }
    }

    fn check_member(&mut self, ty: TypeId, member: &'a CstNode) -> TypeId {
        // Auto-deref through one wrapper level.
        let mut target = ty;
        loop {
            let info = &self.types[target];
            match info.kind {
                TypeKind::Pointer | TypeKind::Reference => {
                    let Some(base) = info.base else { break };
                    target = base;
                }
                _ => break,
            }
        }

        // Numeric tuple field.
        if let Some(number) = member.find_token(TokenKind::Number) {
            let info = &self.types[target];
            if info.kind == TypeKind::Tuple {
                if let Ok(position) = number.lexeme.parse::<usize>() {
                    if let Some(&element) = info.element_types.get(position) {
                        return element;
                    }
                    let message = format!(
                        "Tuple {} has no field {}",
                        self.type_name(target),
                        position
                    );
                    self.error_at(member, message);
                }
            }
            return self.builtins.unknown;
        }

        let Some(name) = member.identifier() else {
            return self.builtins.unknown;
        };

        let info = &self.types[target];
        match info.kind {
            TypeKind::Struct => {
                let fields = info.fields.clone();
                for field in fields {
                    if self.symbols[field].name == name {
                        return self.symbols[field].ty.unwrap_or(self.builtins.unknown);
                    }
                }
                let message = format!("No field '{}' on type {}", name, self.type_name(target));
                self.error_at(member, message);
                self.builtins.unknown
            }
            TypeKind::Enum | TypeKind::Error => {
                let variants = info.variants.clone();
                for variant in variants {
                    if self.symbols[variant].name == name {
                        return self.symbols[variant].ty.unwrap_or(target);
                    }
                }
                let message = format!("No variant '{}' on type {}", name, self.type_name(target));
                self.error_at(member, message);
                self.builtins.unknown
            }
            _ => self.builtins.unknown,
        }
    }

    /// `expr catch |e| { ... }`: bind the error, check the handler block,
    /// unwrap the wrapper.
    fn check_catch(&mut self, ty: TypeId, catch: &'a CstNode) -> TypeId {
        self.enter_scope(ScopeKind::Block);
        if let Some(binding) = catch.find_token(TokenKind::Identifier) {
            let mut symbol = Symbol::new(SymbolKind::Variable, binding.lexeme.clone(), catch);
            symbol.line = binding.line;
            symbol.column = binding.column;
            symbol.ty = Some(self.builtins.unknown);
            symbol.is_resolved = true;
            self.insert_symbol(symbol);
        }
        if let Some(block) = catch.find_child("block") {
            self.check_block_statements(block);
        }
        self.exit_scope();

        self.unwrap_error(ty)
    }

    fn unwrap_error(&self, ty: TypeId) -> TypeId {
        let info = &self.types[ty];
        if info.kind == TypeKind::Error {
            info.base.unwrap_or(self.builtins.unknown)
        } else {
            ty
        }
    }

    fn check_primary(&mut self, node: &'a CstNode) -> TypeId {
        let Some(inner) = node.children().first() else {
            return self.builtins.unknown;
        };

        if let Some(token) = inner.token() {
            return match token.kind {
                TokenKind::Identifier => match self.lookup(&token.lexeme) {
                    Some(symbol_id) => self.symbols[symbol_id]
                        .ty
                        .unwrap_or(self.builtins.unknown),
                    None => {
                        let message = format!("Undefined symbol '{}'", token.lexeme);
                        self.error_at_position(token.line, token.column, message);
                        self.builtins.unknown
                    }
                },
                // `this` resolves against the attached type, an extension
                // point for now.
                TokenKind::ThisKw => self.builtins.unknown,
                _ => self.builtins.unknown,
            };
        }

        match inner.rule_name() {
            Some("literal") => self.check_literal(inner),
            Some("paren_expr") => inner
                .find_child("expression")
                .map(|e| self.check_expr(e))
                .unwrap_or(self.builtins.unknown),
            Some("builtin") | Some("type_scoped_call") | Some("generic_call") => {
                if let Some(args) = inner.find_child("args") {
                    for arg in collect_list(args, "expression", "args_rest") {
                        self.check_expr(arg);
                    }
                }
                if let Some(call) = inner.find_child("call") {
                    if let Some(args) = call.find_child("args") {
                        for arg in collect_list(args, "expression", "args_rest") {
                            self.check_expr(arg);
                        }
                    }
                }
                self.builtins.unknown
            }
            Some("struct_literal") => {
                if let Some(inits) = inner.find_child("field_inits") {
                    for init in collect_list(inits, "field_init", "field_inits_rest") {
                        if let Some(expr) = init.find_child("expression") {
                            self.check_expr(expr);
                        }
                    }
                }
                self.builtins.unknown
            }
            Some("array_literal") => {
                let mut element_types = Vec::new();
                if let Some(elements) = inner.find_child("array_elements") {
                    for element in collect_list(elements, "expression", "array_elements_rest") {
                        element_types.push((element, self.check_expr(element)));
                    }
                }
                let Some(&(_, first)) = element_types.first() else {
                    return self.builtins.unknown;
                };
                for &(element_node, element) in &element_types[1..] {
                    if !self.types_compatible(first, element) {
                        let message = format!(
                            "Array elements must share one type: expected {}, found {}",
                            self.type_name(first),
                            self.type_name(element)
                        );
                        self.error_at(element_node, message);
                    }
                }
                self.wrap_type(TypeKind::Array, first)
            }
            Some("closure") => self.check_closure(inner),
            Some("error_literal") => {
                if let Some(expr) = inner.find_child("expression") {
                    self.check_expr(expr);
                }
                self.wrap_type(TypeKind::Error, self.builtins.unknown)
            }
            Some("for_stmt") => {
                self.check_for(inner);
                self.builtins.void
            }
            Some("primitive_type") => self.builtins.type_,
            _ => self.builtins.unknown,
        }
    }

    fn check_literal(&mut self, literal: &'a CstNode) -> TypeId {
        let Some(token) = literal.children().first().and_then(|c| c.token()) else {
            return self.builtins.unknown;
        };
        match token.kind {
            TokenKind::Number => {
                if token.lexeme.contains('.') {
                    self.builtins.f64
                } else {
                    self.builtins.i32
                }
            }
            TokenKind::String => self.builtins.str,
            TokenKind::TrueKw | TokenKind::FalseKw => self.builtins.bool,
            TokenKind::NullKw => self.builtins.null,
            _ => self.builtins.unknown,
        }
    }

    /// Closure literal: captures and parameters enter a function scope,
    /// the body is checked, and the value is a function type. Parameter
    /// and return types are an inference extension point.
    fn check_closure(&mut self, closure: &'a CstNode) -> TypeId {
        let saved = self.current_scope;
        self.enter_scope(ScopeKind::Function);

        if let Some(captures) = closure.find_child("closure_captures") {
            for capture in collect_list(captures, "closure_capture", "closure_captures_rest") {
                let Some(name) = capture.identifier() else {
                    continue;
                };
                let mut symbol = Symbol::new(SymbolKind::Variable, name, capture);
                symbol.ty = Some(self.builtins.unknown);
                symbol.is_resolved = true;
                self.insert_symbol(symbol);
            }
        }

        let mut parameter_count = 0;
        if let Some(params) = closure.find_child("params") {
            for param in collect_list(params, "param", "params_rest") {
                parameter_count += 1;
                let Some(name) = param.identifier() else {
                    continue;
                };
                let ty = param
                    .find_child("type")
                    .map(|t| self.resolve_type(t, true))
                    .unwrap_or(self.builtins.unknown);
                let mut symbol = Symbol::new(SymbolKind::Variable, name, param);
                symbol.ty = Some(ty);
                symbol.is_resolved = true;
                self.insert_symbol(symbol);
            }
        }

        if let Some(block) = closure.find_child("block") {
            self.check_block_statements(block);
        }

        self.current_scope = saved;

        let mut info = crate::types::TypeInfo::new(TypeKind::Function);
        info.element_types = vec![self.builtins.unknown; parameter_count];
        info.return_type = Some(self.builtins.unknown);
        info.is_complete = true;
        self.types.push(info)
    }
}

/// Identifier tokens bound by a `for_binding` node.
fn binding_identifiers<'n>(binding: &'n CstNode) -> Vec<&'n Token> {
    let mut out = Vec::new();
    fn walk<'n>(node: &'n CstNode, out: &mut Vec<&'n Token>) {
        match node {
            CstNode::Token(token) if token.kind == TokenKind::Identifier => out.push(token),
            CstNode::Rule { children, .. } => {
                for child in children {
                    walk(child, out);
                }
            }
            _ => {}
        }
    }
    walk(binding, &mut out);
    out
}
