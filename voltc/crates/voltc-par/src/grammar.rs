//! Grammar registry.
//!
//! The parser is data-driven: a [`Grammar`] maps rule names to [`Rule`]s,
//! each rule an ordered list of alternatives, each alternative an ordered
//! list of required/optional token or rule references. The registry is
//! built once by [`volt_grammar`] during bootstrap and shared by reference
//! among all parsers of a build; it is read-only afterwards.

use indexmap::IndexMap;
use voltc_lex::TokenKind;

/// What a single element of an alternative matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// A specific token kind.
    Token(TokenKind),
    /// A named rule.
    Rule(&'static str),
}

/// One element of an alternative.
///
/// An optional element whose match fails is skipped without consuming
/// input; a required element whose match fails fails the alternative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element {
    pub matcher: Matcher,
    pub optional: bool,
}

/// Required token element.
pub fn tok(kind: TokenKind) -> Element {
    Element {
        matcher: Matcher::Token(kind),
        optional: false,
    }
}

/// Optional token element.
pub fn opt_tok(kind: TokenKind) -> Element {
    Element {
        matcher: Matcher::Token(kind),
        optional: true,
    }
}

/// Required rule reference.
pub fn rule(name: &'static str) -> Element {
    Element {
        matcher: Matcher::Rule(name),
        optional: false,
    }
}

/// Optional rule reference.
pub fn opt_rule(name: &'static str) -> Element {
    Element {
        matcher: Matcher::Rule(name),
        optional: true,
    }
}

/// A named rule: ordered alternatives tried by the parser in declaration
/// order (PEG-style ordered choice).
#[derive(Clone, Debug)]
pub struct Rule {
    pub name: &'static str,
    pub alternatives: Vec<Vec<Element>>,
}

impl Rule {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            alternatives: Vec::new(),
        }
    }

    /// Append one alternative.
    pub fn alt(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.alternatives.push(elements.into_iter().collect());
        self
    }

    /// Append the ε alternative.
    pub fn epsilon(mut self) -> Self {
        self.alternatives.push(Vec::new());
        self
    }
}

/// Mapping from rule name to rule, populated once at startup.
#[derive(Default)]
pub struct Grammar {
    rules: IndexMap<&'static str, Rule>,
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    pub fn add(&mut self, rule: Rule) {
        self.rules.insert(rule.name, rule);
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Check that every rule name referenced from any alternative is
    /// defined. Returns the missing names, in reference order.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut missing = Vec::new();
        for rule in self.rules.values() {
            for alternative in &rule.alternatives {
                for element in alternative {
                    if let Matcher::Rule(name) = element.matcher {
                        if !self.rules.contains_key(name) && !missing.contains(&name.to_string()) {
                            missing.push(name.to_string());
                        }
                    }
                }
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

/// Build the Volt grammar. The start symbol is `unit`.
///
/// Left-associative binary operators are encoded with the right-recursive
/// "rest" idiom (`additive_expr := multiplicative_expr additive_expr_rest`)
/// so the ladder stays free of left recursion.
pub fn volt_grammar() -> Grammar {
    use TokenKind as T;

    let mut g = Grammar::new();

    // unit ::= items
    g.add(Rule::new("unit").alt([rule("items")]));

    // items ::= item items_rest | ε
    g.add(
        Rule::new("items")
            .alt([rule("item"), rule("items_rest")])
            .epsilon(),
    );

    // items_rest ::= item items_rest | ε
    g.add(
        Rule::new("items_rest")
            .alt([rule("item"), rule("items_rest")])
            .epsilon(),
    );

    // item ::= attributes? (extern_decl | export_decl | fn_decl | ...)
    g.add(
        Rule::new("item")
            .alt([opt_rule("attributes"), rule("extern_decl")])
            .alt([opt_rule("attributes"), rule("export_decl")])
            .alt([opt_rule("attributes"), rule("fn_decl")])
            .alt([opt_rule("attributes"), rule("use_decl")])
            .alt([opt_rule("attributes"), rule("namespace_decl")])
            .alt([opt_rule("attributes"), rule("struct_decl")])
            .alt([opt_rule("attributes"), rule("enum_decl")])
            .alt([opt_rule("attributes"), rule("error_decl")])
            .alt([opt_rule("attributes"), rule("trait_decl")])
            .alt([opt_rule("attributes"), rule("attach_decl")]),
    );

    // attributes ::= @ IDENTIFIER ( array_literal )
    g.add(Rule::new("attributes").alt([
        tok(T::At),
        tok(T::Identifier),
        tok(T::LParen),
        rule("array_literal"),
        tok(T::RParen),
    ]));

    // use_decl ::= use { string_list } as IDENTIFIER ;   (C header import, more specific)
    //            | use use_path ;
    g.add(
        Rule::new("use_decl")
            .alt([
                tok(T::UseKw),
                tok(T::LBrace),
                rule("string_list"),
                tok(T::RBrace),
                tok(T::AsKw),
                tok(T::Identifier),
                tok(T::Semicolon),
            ])
            .alt([tok(T::UseKw), rule("use_path"), tok(T::Semicolon)]),
    );

    // use_path ::= IDENTIFIER use_path_rest
    g.add(Rule::new("use_path").alt([tok(T::Identifier), rule("use_path_rest")]));

    // use_path_rest ::= :: IDENTIFIER use_path_rest | ε
    g.add(
        Rule::new("use_path_rest")
            .alt([tok(T::ColonColon), tok(T::Identifier), rule("use_path_rest")])
            .epsilon(),
    );

    // string_list ::= STRING string_list_rest
    g.add(Rule::new("string_list").alt([tok(T::String), rule("string_list_rest")]));

    // string_list_rest ::= , STRING string_list_rest | ε
    g.add(
        Rule::new("string_list_rest")
            .alt([tok(T::Comma), tok(T::String), rule("string_list_rest")])
            .epsilon(),
    );

    // namespace_decl ::= namespace namespace_path { items }
    g.add(Rule::new("namespace_decl").alt([
        tok(T::NamespaceKw),
        rule("namespace_path"),
        tok(T::LBrace),
        rule("items"),
        tok(T::RBrace),
    ]));

    // namespace_path ::= IDENTIFIER namespace_path_rest
    g.add(Rule::new("namespace_path").alt([tok(T::Identifier), rule("namespace_path_rest")]));

    // namespace_path_rest ::= :: IDENTIFIER namespace_path_rest | ε
    g.add(
        Rule::new("namespace_path_rest")
            .alt([
                tok(T::ColonColon),
                tok(T::Identifier),
                rule("namespace_path_rest"),
            ])
            .epsilon(),
    );

    // fn_decl ::= generics? visibility? comptime? async? attach? fn IDENTIFIER
    //             ( params ) error_type? -> type block
    g.add(Rule::new("fn_decl").alt([
        opt_rule("generics"),
        opt_rule("visibility"),
        opt_tok(T::ComptimeKw),
        opt_tok(T::AsyncKw),
        opt_tok(T::AttachKw),
        tok(T::FnKw),
        tok(T::Identifier),
        tok(T::LParen),
        rule("params"),
        tok(T::RParen),
        opt_rule("error_type"),
        tok(T::Arrow),
        rule("type"),
        rule("block"),
    ]));

    // visibility ::= public | internal
    g.add(
        Rule::new("visibility")
            .alt([tok(T::PublicKw)])
            .alt([tok(T::InternalKw)]),
    );

    // error_type ::= type !
    g.add(Rule::new("error_type").alt([rule("type"), tok(T::Bang)]));

    // extern_decl ::= generics? extern STRING? fn IDENTIFIER ( params )
    //                 error_type? -> type ;
    g.add(Rule::new("extern_decl").alt([
        opt_rule("generics"),
        tok(T::ExternKw),
        opt_tok(T::String),
        tok(T::FnKw),
        tok(T::Identifier),
        tok(T::LParen),
        rule("params"),
        tok(T::RParen),
        opt_rule("error_type"),
        tok(T::Arrow),
        rule("type"),
        tok(T::Semicolon),
    ]));

    // export_decl ::= generics? export STRING? fn IDENTIFIER ( params )
    //                 error_type? -> type block
    g.add(Rule::new("export_decl").alt([
        opt_rule("generics"),
        tok(T::ExportKw),
        opt_tok(T::String),
        tok(T::FnKw),
        tok(T::Identifier),
        tok(T::LParen),
        rule("params"),
        tok(T::RParen),
        opt_rule("error_type"),
        tok(T::Arrow),
        rule("type"),
        rule("block"),
    ]));

    // generics ::= < generic_params >     (definitions)
    g.add(Rule::new("generics").alt([tok(T::Lt), rule("generic_params"), tok(T::Gt)]));

    // generic_args ::= < type_list >      (calls/instantiations)
    g.add(Rule::new("generic_args").alt([tok(T::Lt), rule("type_list"), tok(T::Gt)]));

    // generic_params ::= generic_param generic_params_rest
    g.add(Rule::new("generic_params").alt([rule("generic_param"), rule("generic_params_rest")]));

    // generic_params_rest ::= , generic_param generic_params_rest | ε
    g.add(
        Rule::new("generic_params_rest")
            .alt([
                tok(T::Comma),
                rule("generic_param"),
                rule("generic_params_rest"),
            ])
            .epsilon(),
    );

    // generic_param ::= IDENTIFIER : type_constraint (= expression)?
    g.add(
        Rule::new("generic_param")
            .alt([
                tok(T::Identifier),
                tok(T::Colon),
                rule("type_constraint"),
                tok(T::Eq),
                rule("expression"),
            ])
            .alt([tok(T::Identifier), tok(T::Colon), rule("type_constraint")]),
    );

    // type_constraint ::= type | comptime_fn_call | type [ ]
    g.add(
        Rule::new("type_constraint")
            .alt([rule("type")])
            .alt([rule("comptime_fn_call")])
            .alt([rule("type"), tok(T::LBracket), tok(T::RBracket)]),
    );

    // comptime_fn_call ::= IDENTIFIER ( args )
    g.add(Rule::new("comptime_fn_call").alt([
        tok(T::Identifier),
        tok(T::LParen),
        rule("args"),
        tok(T::RParen),
    ]));

    // params ::= param params_rest | IDENTIFIER : type [ ] | ε
    g.add(
        Rule::new("params")
            .alt([rule("param"), rule("params_rest")])
            .alt([
                tok(T::Identifier),
                tok(T::Colon),
                rule("type"),
                tok(T::LBracket),
                tok(T::RBracket),
            ])
            .epsilon(),
    );

    // params_rest ::= , param params_rest | ε
    g.add(
        Rule::new("params_rest")
            .alt([tok(T::Comma), rule("param"), rule("params_rest")])
            .epsilon(),
    );

    // param ::= static? this : type (= expression)?
    //         | static? IDENTIFIER : type (= expression)?
    //         | this
    //         | type
    g.add(
        Rule::new("param")
            .alt([
                opt_tok(T::StaticKw),
                tok(T::ThisKw),
                tok(T::Colon),
                rule("type"),
                tok(T::Eq),
                rule("expression"),
            ])
            .alt([
                opt_tok(T::StaticKw),
                tok(T::ThisKw),
                tok(T::Colon),
                rule("type"),
            ])
            .alt([
                opt_tok(T::StaticKw),
                tok(T::Identifier),
                tok(T::Colon),
                rule("type"),
                tok(T::Eq),
                rule("expression"),
            ])
            .alt([
                opt_tok(T::StaticKw),
                tok(T::Identifier),
                tok(T::Colon),
                rule("type"),
            ])
            .alt([tok(T::ThisKw)])
            .alt([rule("type")]),
    );

    // type ::= base_type type_suffixes?
    g.add(Rule::new("type").alt([rule("base_type"), opt_rule("type_suffixes")]));

    // base_type ::= error_wrapper_type | named_error_wrapper | primitive_type |
    //               named_type | tuple_type | closure_type
    // The error wrappers must come first: `error!T` and `Name!T` both start
    // like plainer types.
    g.add(
        Rule::new("base_type")
            .alt([rule("error_wrapper_type")])
            .alt([rule("named_error_wrapper")])
            .alt([rule("primitive_type")])
            .alt([rule("named_type")])
            .alt([rule("tuple_type")])
            .alt([rule("closure_type")]),
    );

    // error_wrapper_type ::= error ! type
    g.add(Rule::new("error_wrapper_type").alt([tok(T::ErrorKw), tok(T::Bang), rule("type")]));

    // named_error_wrapper ::= path generic_args? ! type
    g.add(Rule::new("named_error_wrapper").alt([
        rule("path"),
        opt_rule("generic_args"),
        tok(T::Bang),
        rule("type"),
    ]));

    // primitive_type ::= i8 | i16 | ... | str
    g.add(
        Rule::new("primitive_type")
            .alt([tok(T::I8Kw)])
            .alt([tok(T::I16Kw)])
            .alt([tok(T::I32Kw)])
            .alt([tok(T::I64Kw)])
            .alt([tok(T::I128Kw)])
            .alt([tok(T::U8Kw)])
            .alt([tok(T::U16Kw)])
            .alt([tok(T::U32Kw)])
            .alt([tok(T::U64Kw)])
            .alt([tok(T::U128Kw)])
            .alt([tok(T::F16Kw)])
            .alt([tok(T::F32Kw)])
            .alt([tok(T::F64Kw)])
            .alt([tok(T::F128Kw)])
            .alt([tok(T::BoolKw)])
            .alt([tok(T::IsizeKw)])
            .alt([tok(T::UsizeKw)])
            .alt([tok(T::TypeKw)])
            .alt([tok(T::CstrKw)])
            .alt([tok(T::StrKw)]),
    );

    // named_type ::= !? path generic_args?
    g.add(Rule::new("named_type").alt([
        opt_tok(T::Bang),
        rule("path"),
        opt_rule("generic_args"),
    ]));

    // path ::= IDENTIFIER path_rest
    g.add(Rule::new("path").alt([tok(T::Identifier), rule("path_rest")]));

    // path_rest ::= :: IDENTIFIER path_rest | ε
    g.add(
        Rule::new("path_rest")
            .alt([tok(T::ColonColon), tok(T::Identifier), rule("path_rest")])
            .epsilon(),
    );

    // tuple_type ::= ( type_list )
    g.add(Rule::new("tuple_type").alt([tok(T::LParen), rule("type_list"), tok(T::RParen)]));

    // type_list ::= tuple_field type_list_rest | ε
    g.add(
        Rule::new("type_list")
            .alt([rule("tuple_field"), rule("type_list_rest")])
            .epsilon(),
    );

    // type_list_rest ::= , tuple_field type_list_rest | ε
    g.add(
        Rule::new("type_list_rest")
            .alt([tok(T::Comma), rule("tuple_field"), rule("type_list_rest")])
            .epsilon(),
    );

    // tuple_field ::= IDENTIFIER : type | type
    g.add(
        Rule::new("tuple_field")
            .alt([tok(T::Identifier), tok(T::Colon), rule("type")])
            .alt([rule("type")]),
    );

    // closure_type ::= | closure_params | -> type
    g.add(Rule::new("closure_type").alt([
        tok(T::Pipe),
        rule("closure_params"),
        tok(T::Pipe),
        tok(T::Arrow),
        rule("type"),
    ]));

    // closure_params ::= type_list
    g.add(Rule::new("closure_params").alt([rule("type_list")]));

    // type_suffixes ::= type_suffix type_suffixes_rest
    g.add(Rule::new("type_suffixes").alt([rule("type_suffix"), rule("type_suffixes_rest")]));

    // type_suffixes_rest ::= type_suffix type_suffixes_rest | ε
    g.add(
        Rule::new("type_suffixes_rest")
            .alt([rule("type_suffix"), rule("type_suffixes_rest")])
            .epsilon(),
    );

    // type_suffix ::= *? | * | ? | [ ] | [ .. ] | [ expression ]
    //
    // The pointer form `*?` comes before the bare reference `*`, or
    // ordered choice would never reach it.
    g.add(
        Rule::new("type_suffix")
            .alt([tok(T::Star), tok(T::Question)]) // pointer
            .alt([tok(T::Star)]) // reference
            .alt([tok(T::Question)]) // nullable
            .alt([tok(T::LBracket), tok(T::RBracket)]) // array
            .alt([tok(T::LBracket), tok(T::DotDot), tok(T::RBracket)]) // slice
            .alt([tok(T::LBracket), rule("expression"), tok(T::RBracket)]), // sized array
    );

    // struct_decl ::= generics? visibility? comptime? struct IDENTIFIER { fields }
    //              | generics? visibility? comptime? struct IDENTIFIER ;
    g.add(
        Rule::new("struct_decl")
            .alt([
                opt_rule("generics"),
                opt_rule("visibility"),
                opt_tok(T::ComptimeKw),
                tok(T::StructKw),
                tok(T::Identifier),
                tok(T::LBrace),
                rule("fields"),
                tok(T::RBrace),
            ])
            .alt([
                opt_rule("generics"),
                opt_rule("visibility"),
                opt_tok(T::ComptimeKw),
                tok(T::StructKw),
                tok(T::Identifier),
                tok(T::Semicolon),
            ]),
    );

    // fields ::= field fields_rest | ε
    g.add(
        Rule::new("fields")
            .alt([rule("field"), rule("fields_rest")])
            .epsilon(),
    );

    // fields_rest ::= field fields_rest | ε
    g.add(
        Rule::new("fields_rest")
            .alt([rule("field"), rule("fields_rest")])
            .epsilon(),
    );

    // field ::= IDENTIFIER : type (= expression)? ;
    g.add(Rule::new("field").alt([
        tok(T::Identifier),
        tok(T::Colon),
        rule("type"),
        opt_tok(T::Eq),
        opt_rule("expression"),
        tok(T::Semicolon),
    ]));

    // enum_decl ::= generics? visibility? enum IDENTIFIER { enum_variants }
    g.add(Rule::new("enum_decl").alt([
        opt_rule("generics"),
        opt_rule("visibility"),
        tok(T::EnumKw),
        tok(T::Identifier),
        tok(T::LBrace),
        rule("enum_variants"),
        tok(T::RBrace),
    ]));

    // enum_variants ::= enum_variant enum_variants_rest
    g.add(Rule::new("enum_variants").alt([rule("enum_variant"), rule("enum_variants_rest")]));

    // enum_variants_rest ::= , enum_variant enum_variants_rest | , | ε
    g.add(
        Rule::new("enum_variants_rest")
            .alt([
                tok(T::Comma),
                rule("enum_variant"),
                rule("enum_variants_rest"),
            ])
            .alt([tok(T::Comma)]) // trailing comma
            .epsilon(),
    );

    // enum_variant ::= IDENTIFIER (: type)?
    g.add(Rule::new("enum_variant").alt([
        tok(T::Identifier),
        opt_tok(T::Colon),
        opt_rule("type"),
    ]));

    // error_decl ::= generics? visibility? error IDENTIFIER { enum_variants }
    g.add(Rule::new("error_decl").alt([
        opt_rule("generics"),
        opt_rule("visibility"),
        tok(T::ErrorKw),
        tok(T::Identifier),
        tok(T::LBrace),
        rule("enum_variants"),
        tok(T::RBrace),
    ]));

    // trait_decl ::= generics? visibility? trait IDENTIFIER { trait_items }
    g.add(Rule::new("trait_decl").alt([
        opt_rule("generics"),
        opt_rule("visibility"),
        tok(T::TraitKw),
        tok(T::Identifier),
        tok(T::LBrace),
        rule("trait_items"),
        tok(T::RBrace),
    ]));

    // trait_items ::= trait_item trait_items_rest | ε
    g.add(
        Rule::new("trait_items")
            .alt([rule("trait_item"), rule("trait_items_rest")])
            .epsilon(),
    );

    // trait_items_rest ::= trait_item trait_items_rest | ε
    g.add(
        Rule::new("trait_items_rest")
            .alt([rule("trait_item"), rule("trait_items_rest")])
            .epsilon(),
    );

    // trait_item ::= generics? fn generics? IDENTIFIER ( params ) -> type ;
    g.add(Rule::new("trait_item").alt([
        opt_rule("generics"),
        tok(T::FnKw),
        opt_rule("generics"),
        tok(T::Identifier),
        tok(T::LParen),
        rule("params"),
        tok(T::RParen),
        tok(T::Arrow),
        rule("type"),
        tok(T::Semicolon),
    ]));

    // attach_decl ::= generics? attach path -> type { items }
    g.add(Rule::new("attach_decl").alt([
        opt_rule("generics"),
        tok(T::AttachKw),
        rule("path"),
        tok(T::Arrow),
        rule("type"),
        tok(T::LBrace),
        rule("items"),
        tok(T::RBrace),
    ]));

    // block ::= { statements }
    g.add(Rule::new("block").alt([tok(T::LBrace), rule("statements"), tok(T::RBrace)]));

    // statements ::= statement statements_rest | ε
    g.add(
        Rule::new("statements")
            .alt([rule("statement"), rule("statements_rest")])
            .epsilon(),
    );

    // statements_rest ::= statement statements_rest | ε
    g.add(
        Rule::new("statements_rest")
            .alt([rule("statement"), rule("statements_rest")])
            .epsilon(),
    );

    // var_decl ::= comptime? var IDENTIFIER (: type)? (= expression)? ;
    g.add(Rule::new("var_decl").alt([
        opt_tok(T::ComptimeKw),
        tok(T::VarKw),
        tok(T::Identifier),
        opt_tok(T::Colon),
        opt_rule("type"),
        opt_tok(T::Eq),
        opt_rule("expression"),
        tok(T::Semicolon),
    ]));

    // val_decl ::= comptime? val IDENTIFIER (: type)? = expression ;
    g.add(Rule::new("val_decl").alt([
        opt_tok(T::ComptimeKw),
        tok(T::ValKw),
        tok(T::Identifier),
        opt_tok(T::Colon),
        opt_rule("type"),
        tok(T::Eq),
        rule("expression"),
        tok(T::Semicolon),
    ]));

    // static_decl ::= static IDENTIFIER : type = expression ;
    g.add(Rule::new("static_decl").alt([
        tok(T::StaticKw),
        tok(T::Identifier),
        tok(T::Colon),
        rule("type"),
        tok(T::Eq),
        rule("expression"),
        tok(T::Semicolon),
    ]));

    // return_stmt ::= return expression? ;
    g.add(Rule::new("return_stmt").alt([
        tok(T::ReturnKw),
        opt_rule("expression"),
        tok(T::Semicolon),
    ]));

    // break_stmt ::= break (: IDENTIFIER)? ;
    g.add(Rule::new("break_stmt").alt([
        tok(T::BreakKw),
        opt_tok(T::Colon),
        opt_tok(T::Identifier),
        tok(T::Semicolon),
    ]));

    // defer_stmt ::= defer expression ;
    g.add(Rule::new("defer_stmt").alt([
        tok(T::DeferKw),
        rule("expression"),
        tok(T::Semicolon),
    ]));

    // continue_stmt ::= continue (: IDENTIFIER)? ;
    g.add(Rule::new("continue_stmt").alt([
        tok(T::ContinueKw),
        opt_tok(T::Colon),
        opt_tok(T::Identifier),
        tok(T::Semicolon),
    ]));

    // suspend_stmt ::= suspend ;
    g.add(Rule::new("suspend_stmt").alt([tok(T::SuspendKw), tok(T::Semicolon)]));

    // resume_stmt ::= resume expression ;
    g.add(Rule::new("resume_stmt").alt([
        tok(T::ResumeKw),
        rule("expression"),
        tok(T::Semicolon),
    ]));

    // if_stmt ::= comptime? if ( expression ) block (else else_clause)?
    g.add(Rule::new("if_stmt").alt([
        opt_tok(T::ComptimeKw),
        tok(T::IfKw),
        tok(T::LParen),
        rule("expression"),
        tok(T::RParen),
        rule("block"),
        opt_tok(T::ElseKw),
        opt_rule("else_clause"),
    ]));

    // else_clause ::= if_stmt | block
    g.add(
        Rule::new("else_clause")
            .alt([rule("if_stmt")])
            .alt([rule("block")]),
    );

    // while_stmt ::= label? while ( expression ) block
    g.add(Rule::new("while_stmt").alt([
        opt_rule("label"),
        tok(T::WhileKw),
        tok(T::LParen),
        rule("expression"),
        tok(T::RParen),
        rule("block"),
    ]));

    // loop_stmt ::= label? loop block
    g.add(Rule::new("loop_stmt").alt([opt_rule("label"), tok(T::LoopKw), rule("block")]));

    // identifier_list ::= IDENTIFIER identifier_list_rest
    g.add(Rule::new("identifier_list").alt([tok(T::Identifier), rule("identifier_list_rest")]));

    // identifier_list_rest ::= , IDENTIFIER identifier_list_rest | ε
    g.add(
        Rule::new("identifier_list_rest")
            .alt([
                tok(T::Comma),
                tok(T::Identifier),
                rule("identifier_list_rest"),
            ])
            .epsilon(),
    );

    // for_iterable_expr ::= bitwise_xor_expr
    //
    // Restricted iterable for `for` loops that carry a `|expr|` capture:
    // it stops below the bitwise-or level so the `|` delimiter is not
    // consumed by the iterable.
    g.add(Rule::new("for_iterable_expr").alt([rule("bitwise_xor_expr")]));

    // for_stmt ::= label? for ( for_binding in for_iterable_expr for_pre_expr )
    //              for_captures? block
    //            | label? for ( for_binding in expression ) for_captures? block
    //
    // The alternative WITH the `|expr|` capture is more specific and must
    // be tried first; ordered choice does the disambiguation.
    g.add(
        Rule::new("for_stmt")
            .alt([
                opt_rule("label"),
                tok(T::ForKw),
                tok(T::LParen),
                rule("for_binding"),
                tok(T::InKw),
                rule("for_iterable_expr"),
                rule("for_pre_expr"),
                tok(T::RParen),
                opt_rule("for_captures"),
                rule("block"),
            ])
            .alt([
                opt_rule("label"),
                tok(T::ForKw),
                tok(T::LParen),
                rule("for_binding"),
                tok(T::InKw),
                rule("expression"),
                tok(T::RParen),
                opt_rule("for_captures"),
                rule("block"),
            ]),
    );

    // for_pre_expr ::= | expression |
    g.add(Rule::new("for_pre_expr").alt([tok(T::Pipe), rule("expression"), tok(T::Pipe)]));

    // for_binding ::= IDENTIFIER | ( identifier_list )
    g.add(
        Rule::new("for_binding")
            .alt([tok(T::Identifier)])
            .alt([tok(T::LParen), rule("identifier_list"), tok(T::RParen)]),
    );

    // for_captures ::= [ capture_list ]
    g.add(Rule::new("for_captures").alt([
        tok(T::LBracket),
        rule("capture_list"),
        tok(T::RBracket),
    ]));

    // capture_list ::= capture capture_list_rest
    g.add(Rule::new("capture_list").alt([rule("capture"), rule("capture_list_rest")]));

    // capture_list_rest ::= , capture capture_list_rest | ε
    g.add(
        Rule::new("capture_list_rest")
            .alt([tok(T::Comma), rule("capture"), rule("capture_list_rest")])
            .epsilon(),
    );

    // capture ::= var IDENTIFIER (: type)?
    g.add(Rule::new("capture").alt([
        tok(T::VarKw),
        tok(T::Identifier),
        opt_tok(T::Colon),
        opt_rule("type"),
    ]));

    // label ::= : IDENTIFIER
    g.add(Rule::new("label").alt([tok(T::Colon), tok(T::Identifier)]));

    // match_stmt ::= comptime? "match" expression { match_arms }
    //
    // `match` is not a keyword; the grammar matches it as an identifier.
    g.add(Rule::new("match_stmt").alt([
        opt_tok(T::ComptimeKw),
        tok(T::Identifier),
        rule("expression"),
        tok(T::LBrace),
        rule("match_arms"),
        tok(T::RBrace),
    ]));

    // match_arms ::= match_arm match_arms_rest
    g.add(Rule::new("match_arms").alt([rule("match_arm"), rule("match_arms_rest")]));

    // match_arms_rest ::= match_arm match_arms_rest | ε
    g.add(
        Rule::new("match_arms_rest")
            .alt([rule("match_arm"), rule("match_arms_rest")])
            .epsilon(),
    );

    // match_arm ::= match_pattern => (expression ; | block ;?)
    g.add(
        Rule::new("match_arm")
            .alt([
                rule("match_pattern"),
                tok(T::FatArrow),
                rule("expression"),
                tok(T::Semicolon),
            ])
            .alt([
                rule("match_pattern"),
                tok(T::FatArrow),
                rule("block"),
                tok(T::Semicolon),
            ])
            .alt([rule("match_pattern"), tok(T::FatArrow), rule("block")]),
    );

    // match_pattern ::= expression | "default"
    g.add(
        Rule::new("match_pattern")
            .alt([rule("expression")])
            .alt([tok(T::Identifier)]),
    );

    // try_catch ::= expression catch (| IDENTIFIER |)? block
    g.add(Rule::new("try_catch").alt([
        rule("expression"),
        tok(T::CatchKw),
        opt_tok(T::Pipe),
        opt_tok(T::Identifier),
        opt_tok(T::Pipe),
        rule("block"),
    ]));

    // expr_stmt ::= expression ;
    g.add(Rule::new("expr_stmt").alt([rule("expression"), tok(T::Semicolon)]));

    // ------------------------------------------------------------------
    // Expression precedence ladder (all levels free of left recursion)
    // ------------------------------------------------------------------

    // expression ::= assignment_expr
    g.add(Rule::new("expression").alt([rule("assignment_expr")]));

    // assignment_expr ::= logical_or_expr assignment_expr_rest
    g.add(Rule::new("assignment_expr").alt([
        rule("logical_or_expr"),
        rule("assignment_expr_rest"),
    ]));

    // assignment_expr_rest ::= assign_op assignment_expr | ε
    g.add(
        Rule::new("assignment_expr_rest")
            .alt([rule("assign_op"), rule("assignment_expr")])
            .epsilon(),
    );

    // assign_op ::= = | += | -= | *= | /= | %= | &= | |= | ^= | <<= | >>=
    g.add(
        Rule::new("assign_op")
            .alt([tok(T::Eq)])
            .alt([tok(T::PlusEq)])
            .alt([tok(T::MinusEq)])
            .alt([tok(T::StarEq)])
            .alt([tok(T::SlashEq)])
            .alt([tok(T::PercentEq)])
            .alt([tok(T::AmpersandEq)])
            .alt([tok(T::PipeEq)])
            .alt([tok(T::CaretEq)])
            .alt([tok(T::ShlEq)])
            .alt([tok(T::ShrEq)]),
    );

    // logical_or_expr ::= logical_and_expr logical_or_expr_rest
    g.add(Rule::new("logical_or_expr").alt([
        rule("logical_and_expr"),
        rule("logical_or_expr_rest"),
    ]));

    // logical_or_expr_rest ::= || logical_and_expr logical_or_expr_rest | ε
    g.add(
        Rule::new("logical_or_expr_rest")
            .alt([
                tok(T::OrOr),
                rule("logical_and_expr"),
                rule("logical_or_expr_rest"),
            ])
            .epsilon(),
    );

    // logical_and_expr ::= bitwise_or_expr logical_and_expr_rest
    g.add(Rule::new("logical_and_expr").alt([
        rule("bitwise_or_expr"),
        rule("logical_and_expr_rest"),
    ]));

    // logical_and_expr_rest ::= && bitwise_or_expr logical_and_expr_rest | ε
    g.add(
        Rule::new("logical_and_expr_rest")
            .alt([
                tok(T::AndAnd),
                rule("bitwise_or_expr"),
                rule("logical_and_expr_rest"),
            ])
            .epsilon(),
    );

    // bitwise_or_expr ::= bitwise_xor_expr bitwise_or_expr_rest
    g.add(Rule::new("bitwise_or_expr").alt([
        rule("bitwise_xor_expr"),
        rule("bitwise_or_expr_rest"),
    ]));

    // bitwise_or_expr_rest ::= | bitwise_xor_expr bitwise_or_expr_rest | ε
    g.add(
        Rule::new("bitwise_or_expr_rest")
            .alt([
                tok(T::Pipe),
                rule("bitwise_xor_expr"),
                rule("bitwise_or_expr_rest"),
            ])
            .epsilon(),
    );

    // bitwise_xor_expr ::= bitwise_and_expr bitwise_xor_expr_rest
    g.add(Rule::new("bitwise_xor_expr").alt([
        rule("bitwise_and_expr"),
        rule("bitwise_xor_expr_rest"),
    ]));

    // bitwise_xor_expr_rest ::= ^ bitwise_and_expr bitwise_xor_expr_rest | ε
    g.add(
        Rule::new("bitwise_xor_expr_rest")
            .alt([
                tok(T::Caret),
                rule("bitwise_and_expr"),
                rule("bitwise_xor_expr_rest"),
            ])
            .epsilon(),
    );

    // bitwise_and_expr ::= equality_expr bitwise_and_expr_rest
    g.add(Rule::new("bitwise_and_expr").alt([
        rule("equality_expr"),
        rule("bitwise_and_expr_rest"),
    ]));

    // bitwise_and_expr_rest ::= & equality_expr bitwise_and_expr_rest | ε
    g.add(
        Rule::new("bitwise_and_expr_rest")
            .alt([
                tok(T::Ampersand),
                rule("equality_expr"),
                rule("bitwise_and_expr_rest"),
            ])
            .epsilon(),
    );

    // equality_expr ::= relational_expr equality_expr_rest
    g.add(Rule::new("equality_expr").alt([
        rule("relational_expr"),
        rule("equality_expr_rest"),
    ]));

    // equality_expr_rest ::= (== | !=) relational_expr equality_expr_rest | ε
    g.add(
        Rule::new("equality_expr_rest")
            .alt([
                tok(T::EqEq),
                rule("relational_expr"),
                rule("equality_expr_rest"),
            ])
            .alt([
                tok(T::NotEq),
                rule("relational_expr"),
                rule("equality_expr_rest"),
            ])
            .epsilon(),
    );

    // relational_expr ::= shift_expr relational_expr_rest
    g.add(Rule::new("relational_expr").alt([
        rule("shift_expr"),
        rule("relational_expr_rest"),
    ]));

    // relational_expr_rest ::= (< | > | <= | >=) shift_expr relational_expr_rest | ε
    g.add(
        Rule::new("relational_expr_rest")
            .alt([tok(T::Lt), rule("shift_expr"), rule("relational_expr_rest")])
            .alt([tok(T::Gt), rule("shift_expr"), rule("relational_expr_rest")])
            .alt([
                tok(T::LtEq),
                rule("shift_expr"),
                rule("relational_expr_rest"),
            ])
            .alt([
                tok(T::GtEq),
                rule("shift_expr"),
                rule("relational_expr_rest"),
            ])
            .epsilon(),
    );

    // shift_expr ::= range_expr shift_expr_rest
    g.add(Rule::new("shift_expr").alt([rule("range_expr"), rule("shift_expr_rest")]));

    // shift_expr_rest ::= (<< | >>) range_expr shift_expr_rest | ε
    g.add(
        Rule::new("shift_expr_rest")
            .alt([tok(T::Shl), rule("range_expr"), rule("shift_expr_rest")])
            .alt([tok(T::Shr), rule("range_expr"), rule("shift_expr_rest")])
            .epsilon(),
    );

    // range_expr ::= additive_expr range_expr_rest
    g.add(Rule::new("range_expr").alt([rule("additive_expr"), rule("range_expr_rest")]));

    // range_expr_rest ::= (.. | ..=) additive_expr | ε
    g.add(
        Rule::new("range_expr_rest")
            .alt([tok(T::DotDot), rule("additive_expr")])
            .alt([tok(T::DotDotEq), rule("additive_expr")])
            .epsilon(),
    );

    // additive_expr ::= multiplicative_expr additive_expr_rest
    g.add(Rule::new("additive_expr").alt([
        rule("multiplicative_expr"),
        rule("additive_expr_rest"),
    ]));

    // additive_expr_rest ::= (+ | -) multiplicative_expr additive_expr_rest | ε
    g.add(
        Rule::new("additive_expr_rest")
            .alt([
                tok(T::Plus),
                rule("multiplicative_expr"),
                rule("additive_expr_rest"),
            ])
            .alt([
                tok(T::Minus),
                rule("multiplicative_expr"),
                rule("additive_expr_rest"),
            ])
            .epsilon(),
    );

    // multiplicative_expr ::= cast_expr multiplicative_expr_rest
    g.add(Rule::new("multiplicative_expr").alt([
        rule("cast_expr"),
        rule("multiplicative_expr_rest"),
    ]));

    // multiplicative_expr_rest ::= (* | / | %) cast_expr multiplicative_expr_rest | ε
    g.add(
        Rule::new("multiplicative_expr_rest")
            .alt([
                tok(T::Star),
                rule("cast_expr"),
                rule("multiplicative_expr_rest"),
            ])
            .alt([
                tok(T::Slash),
                rule("cast_expr"),
                rule("multiplicative_expr_rest"),
            ])
            .alt([
                tok(T::Percent),
                rule("cast_expr"),
                rule("multiplicative_expr_rest"),
            ])
            .epsilon(),
    );

    // cast_expr ::= unary_expr cast_expr_rest
    g.add(Rule::new("cast_expr").alt([rule("unary_expr"), rule("cast_expr_rest")]));

    // cast_expr_rest ::= as type | ε
    g.add(
        Rule::new("cast_expr_rest")
            .alt([tok(T::AsKw), rule("type")])
            .epsilon(),
    );

    // unary_expr ::= postfix_expr | unary_op unary_expr | try unary_expr
    g.add(
        Rule::new("unary_expr")
            .alt([rule("postfix_expr")])
            .alt([rule("unary_op"), rule("unary_expr")])
            .alt([tok(T::TryKw), rule("unary_expr")]),
    );

    // unary_op ::= - | ! | ~ | * | & | ++ | -- | move | copy
    g.add(
        Rule::new("unary_op")
            .alt([tok(T::Minus)])
            .alt([tok(T::Bang)])
            .alt([tok(T::Tilde)])
            .alt([tok(T::Star)])
            .alt([tok(T::Ampersand)])
            .alt([tok(T::PlusPlus)])
            .alt([tok(T::MinusMinus)])
            .alt([tok(T::MoveKw)])
            .alt([tok(T::CopyKw)]),
    );

    // postfix_expr ::= primary_expr postfix_expr_rest
    g.add(Rule::new("postfix_expr").alt([rule("primary_expr"), rule("postfix_expr_rest")]));

    // postfix_expr_rest ::= postfix_op postfix_expr_rest | ε
    g.add(
        Rule::new("postfix_expr_rest")
            .alt([rule("postfix_op"), rule("postfix_expr_rest")])
            .epsilon(),
    );

    // postfix_op ::= call | index | member_access | ++ | -- | catch_clause
    g.add(
        Rule::new("postfix_op")
            .alt([rule("call")])
            .alt([rule("index")])
            .alt([rule("member_access")])
            .alt([tok(T::PlusPlus)])
            .alt([tok(T::MinusMinus)])
            .alt([rule("catch_clause")]),
    );

    // catch_clause ::= catch (| IDENTIFIER |)? block
    g.add(Rule::new("catch_clause").alt([
        tok(T::CatchKw),
        opt_tok(T::Pipe),
        opt_tok(T::Identifier),
        opt_tok(T::Pipe),
        rule("block"),
    ]));

    // call ::= generic_args? ( args )
    g.add(Rule::new("call").alt([
        opt_rule("generic_args"),
        tok(T::LParen),
        rule("args"),
        tok(T::RParen),
    ]));

    // args ::= expression args_rest | ε
    g.add(
        Rule::new("args")
            .alt([rule("expression"), rule("args_rest")])
            .epsilon(),
    );

    // args_rest ::= , expression args_rest | ε
    g.add(
        Rule::new("args_rest")
            .alt([tok(T::Comma), rule("expression"), rule("args_rest")])
            .epsilon(),
    );

    // index ::= [ expression ]
    g.add(Rule::new("index").alt([tok(T::LBracket), rule("expression"), tok(T::RBracket)]));

    // member_access ::= . IDENTIFIER | . NUMBER | -> IDENTIFIER | :: IDENTIFIER
    g.add(
        Rule::new("member_access")
            .alt([tok(T::Dot), tok(T::Identifier)])
            .alt([tok(T::Dot), tok(T::Number)]) // numeric tuple field
            .alt([tok(T::Arrow), tok(T::Identifier)])
            .alt([tok(T::ColonColon), tok(T::Identifier)]),
    );

    // primary_expr ::= IDENTIFIER | literal | this | builtin | paren_expr |
    //                  struct_literal | array_literal | closure | error_literal |
    //                  generic_call | for_stmt | type_scoped_call | primitive_type
    g.add(
        Rule::new("primary_expr")
            .alt([tok(T::Identifier)])
            .alt([rule("literal")])
            .alt([tok(T::ThisKw)])
            .alt([rule("builtin")])
            .alt([rule("paren_expr")])
            .alt([rule("struct_literal")])
            .alt([rule("array_literal")])
            .alt([rule("closure")])
            .alt([rule("error_literal")])
            .alt([rule("generic_call")])
            .alt([rule("for_stmt")]) // for loops as expressions
            .alt([rule("type_scoped_call")]) // i32::parse(...)
            .alt([rule("primitive_type")]), // type literals, e.g. `return i32;`
    );

    // type_scoped_call ::= primitive_type :: IDENTIFIER generic_args? ( args )
    g.add(Rule::new("type_scoped_call").alt([
        rule("primitive_type"),
        tok(T::ColonColon),
        tok(T::Identifier),
        opt_rule("generic_args"),
        tok(T::LParen),
        rule("args"),
        tok(T::RParen),
    ]));

    // literal ::= NUMBER | STRING | true | false | null
    g.add(
        Rule::new("literal")
            .alt([tok(T::Number)])
            .alt([tok(T::String)])
            .alt([tok(T::TrueKw)])
            .alt([tok(T::FalseKw)])
            .alt([tok(T::NullKw)]),
    );

    // builtin ::= @ IDENTIFIER ( args ) | @ IDENTIFIER < type > ( args )
    g.add(
        Rule::new("builtin")
            .alt([
                tok(T::At),
                tok(T::Identifier),
                tok(T::LParen),
                rule("args"),
                tok(T::RParen),
            ])
            .alt([
                tok(T::At),
                tok(T::Identifier),
                tok(T::Lt),
                rule("type"),
                tok(T::Gt),
                tok(T::LParen),
                rule("args"),
                tok(T::RParen),
            ]),
    );

    // paren_expr ::= ( expression )
    g.add(Rule::new("paren_expr").alt([tok(T::LParen), rule("expression"), tok(T::RParen)]));

    // struct_literal ::= { field_inits }
    g.add(Rule::new("struct_literal").alt([
        tok(T::LBrace),
        rule("field_inits"),
        tok(T::RBrace),
    ]));

    // field_inits ::= field_init field_inits_rest | ε
    g.add(
        Rule::new("field_inits")
            .alt([rule("field_init"), rule("field_inits_rest")])
            .epsilon(),
    );

    // field_inits_rest ::= , field_init field_inits_rest | ε
    g.add(
        Rule::new("field_inits_rest")
            .alt([tok(T::Comma), rule("field_init"), rule("field_inits_rest")])
            .epsilon(),
    );

    // field_init ::= IDENTIFIER (: expression)?
    g.add(Rule::new("field_init").alt([
        tok(T::Identifier),
        opt_tok(T::Colon),
        opt_rule("expression"),
    ]));

    // array_literal ::= [ array_elements ] | { array_elements }
    g.add(
        Rule::new("array_literal")
            .alt([tok(T::LBracket), rule("array_elements"), tok(T::RBracket)])
            .alt([tok(T::LBrace), rule("array_elements"), tok(T::RBrace)]),
    );

    // array_elements ::= expression array_elements_rest | ε
    g.add(
        Rule::new("array_elements")
            .alt([rule("expression"), rule("array_elements_rest")])
            .epsilon(),
    );

    // array_elements_rest ::= , expression array_elements_rest | ε
    g.add(
        Rule::new("array_elements_rest")
            .alt([
                tok(T::Comma),
                rule("expression"),
                rule("array_elements_rest"),
            ])
            .epsilon(),
    );

    // closure ::= | closure_captures | (( params ))? block
    g.add(Rule::new("closure").alt([
        tok(T::Pipe),
        rule("closure_captures"),
        tok(T::Pipe),
        opt_tok(T::LParen),
        opt_rule("params"),
        opt_tok(T::RParen),
        rule("block"),
    ]));

    // closure_captures ::= closure_capture closure_captures_rest | ε
    g.add(
        Rule::new("closure_captures")
            .alt([rule("closure_capture"), rule("closure_captures_rest")])
            .epsilon(),
    );

    // closure_captures_rest ::= , closure_capture closure_captures_rest | ε
    g.add(
        Rule::new("closure_captures_rest")
            .alt([
                tok(T::Comma),
                rule("closure_capture"),
                rule("closure_captures_rest"),
            ])
            .epsilon(),
    );

    // closure_capture ::= IDENTIFIER (*)?
    g.add(Rule::new("closure_capture").alt([tok(T::Identifier), opt_tok(T::Star)]));

    // error_literal ::= path :: IDENTIFIER (( expression ))? | error
    g.add(
        Rule::new("error_literal")
            .alt([
                rule("path"),
                tok(T::ColonColon),
                tok(T::Identifier),
                opt_tok(T::LParen),
                opt_rule("expression"),
                opt_tok(T::RParen),
            ])
            .alt([tok(T::ErrorKw)]),
    );

    // generic_call ::= IDENTIFIER generic_args call
    g.add(Rule::new("generic_call").alt([
        tok(T::Identifier),
        rule("generic_args"),
        rule("call"),
    ]));

    // statement ::= var_decl | val_decl | static_decl | return_stmt | break_stmt |
    //               continue_stmt | if_stmt | defer_stmt | while_stmt | for_stmt |
    //               loop_stmt | match_stmt | suspend_stmt | resume_stmt | expr_stmt
    g.add(
        Rule::new("statement")
            .alt([rule("var_decl")])
            .alt([rule("val_decl")])
            .alt([rule("static_decl")])
            .alt([rule("return_stmt")])
            .alt([rule("break_stmt")])
            .alt([rule("continue_stmt")])
            .alt([rule("if_stmt")])
            .alt([rule("defer_stmt")])
            .alt([rule("while_stmt")])
            .alt([rule("for_stmt")])
            .alt([rule("loop_stmt")])
            .alt([rule("match_stmt")])
            .alt([rule("suspend_stmt")])
            .alt([rule("resume_stmt")])
            .alt([rule("expr_stmt")]),
    );

    debug_assert!(
        g.validate().is_ok(),
        "grammar references undefined rules: {:?}",
        g.validate().err()
    );

    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let grammar = volt_grammar();
        assert!(grammar.get("unit").is_some());
        assert!(grammar.get("statement").is_some());
        assert!(grammar.get("no_such_rule").is_none());
    }

    #[test]
    fn test_every_referenced_rule_is_defined() {
        let grammar = volt_grammar();
        if let Err(missing) = grammar.validate() {
            panic!("undefined rules referenced: {:?}", missing);
        }
    }

    #[test]
    fn test_for_stmt_capture_alternative_first() {
        // Ordered choice resolves the `|expr|` ambiguity; the capture
        // form has to be declared first.
        let grammar = volt_grammar();
        let for_stmt = grammar.get("for_stmt").unwrap();
        assert_eq!(for_stmt.alternatives.len(), 2);
        let first = &for_stmt.alternatives[0];
        assert!(first
            .iter()
            .any(|e| e.matcher == Matcher::Rule("for_pre_expr")));
        assert!(first
            .iter()
            .any(|e| e.matcher == Matcher::Rule("for_iterable_expr")));
    }

    #[test]
    fn test_registry_is_populated_once() {
        let grammar = volt_grammar();
        assert!(!grammar.is_empty());
        assert!(grammar.len() > 100);
        assert_eq!(grammar.iter().count(), grammar.len());
    }

    #[test]
    fn test_epsilon_alternatives_present() {
        let grammar = volt_grammar();
        let items = grammar.get("items").unwrap();
        assert!(items.alternatives.iter().any(|alt| alt.is_empty()));
    }

    #[test]
    fn test_builder_shapes() {
        let r = Rule::new("demo")
            .alt([tok(TokenKind::Plus), opt_rule("x")])
            .epsilon();
        assert_eq!(r.alternatives.len(), 2);
        assert!(!r.alternatives[0][0].optional);
        assert!(r.alternatives[0][1].optional);
        assert!(r.alternatives[1].is_empty());
    }
}
