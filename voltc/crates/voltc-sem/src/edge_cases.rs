//! Analyzer tests driving the full lex → parse → analyze pipeline.

use voltc_lex::Lexer;
use voltc_par::{volt_grammar, Parser};
use voltc_util::Handler;

use crate::{AnalysisError, Analyzer, SourceUnit, TypeKind};

/// Lex, parse and analyze the given (source, filename) pairs, then hand
/// the analyzer to the assertion closure.
fn with_analyzer<R>(
    sources: &[(&str, &str)],
    assertions: impl FnOnce(&Analyzer<'_>, &Handler, Result<(), AnalysisError>) -> R,
) -> R {
    let handler = Handler::new();
    let grammar = volt_grammar();

    let mut roots = Vec::new();
    for (source, name) in sources {
        let tokens = Lexer::new(source, name, &handler).tokenize();
        let root = Parser::new(&tokens, &grammar, name, &handler)
            .parse()
            .unwrap_or_else(|_| panic!("parse failed for {}: {:?}", name, handler.diagnostics()));
        roots.push((root, *name));
    }

    let units: Vec<SourceUnit<'_>> = roots
        .iter()
        .map(|(root, name)| SourceUnit::new(root, name))
        .collect();

    let mut analyzer = Analyzer::new(&units, &handler);
    let result = analyzer.analyze();
    assertions(&analyzer, &handler, result)
}

#[test]
fn test_duplicate_symbol_across_files() {
    let source = "fn foo() -> i32 { return 0; }";
    with_analyzer(&[(source, "a.vlt"), (source, "b.vlt")], |analyzer, handler, result| {
        assert_eq!(result, Err(AnalysisError::Failed(1)));
        let diags = handler.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Redefinition of symbol 'foo'");
        assert_eq!(diags[0].file, "b.vlt");
        // Pass 1 still completed for both files; the first foo survives.
        assert_eq!(analyzer.global_symbol_names(), vec!["foo"]);
    });
}

#[test]
fn test_forward_reference_across_files() {
    with_analyzer(
        &[
            ("fn g(x: T) -> i32 { return 0; }", "a.vlt"),
            ("struct T { x: i32; }", "b.vlt"),
        ],
        |analyzer, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
            let g = analyzer.lookup_global("g").expect("g not declared");
            let g_type = analyzer.symbol(g).ty.expect("g unresolved");
            let param = analyzer.type_info(g_type).element_types[0];
            assert_eq!(analyzer.type_info(param).kind, TypeKind::Struct);
            assert!(analyzer.type_info(param).is_complete);
        },
    );
}

#[test]
fn test_pass1_is_deterministic() {
    let sources = [(
        "fn a() -> i32 { return 0; }\nstruct B { x: i32; }\nval c = 1;\n",
        "m.vlt",
    )];
    let first = with_analyzer(&sources, |analyzer, _, _| {
        analyzer
            .global_symbol_names()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
    });
    let second = with_analyzer(&sources, |analyzer, _, _| {
        analyzer
            .global_symbol_names()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
    });
    assert_eq!(first, vec!["a", "B", "c"]);
    assert_eq!(first, second);
}

#[test]
fn test_inserted_symbols_are_found() {
    with_analyzer(
        &[("fn f() -> i32 { return 0; }\nstruct S { a: i32; }", "m.vlt")],
        |analyzer, _, _| {
            for name in analyzer.global_symbol_names() {
                assert!(analyzer.lookup_global(name).is_some());
            }
        },
    );
}

#[test]
fn test_undefined_symbol() {
    with_analyzer(
        &[("fn f() -> i32 { return q; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            let diags = handler.diagnostics();
            assert_eq!(diags.len(), 1);
            assert_eq!(diags[0].message, "Undefined symbol 'q'");
        },
    );
}

#[test]
fn test_return_type_mismatch() {
    with_analyzer(
        &[("fn f() -> i32 { return true; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            let diags = handler.diagnostics();
            assert_eq!(diags.len(), 1);
            assert_eq!(
                diags[0].message,
                "Return type mismatch: expected i32, found bool"
            );
        },
    );
}

#[test]
fn test_break_outside_loop() {
    with_analyzer(
        &[("fn f() -> i32 { break; return 0; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(handler.diagnostics()[0].message, "'break' outside of a loop");
        },
    );
}

#[test]
fn test_break_inside_loop_ok() {
    with_analyzer(
        &[(
            "fn f() -> i32 { while (true) { break; } loop { continue; } return 0; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
        },
    );
}

#[test]
fn test_assign_to_immutable() {
    with_analyzer(
        &[("fn f() -> i32 { val x = 1; x = 2; return x; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "Cannot assign to immutable value 'x'"
            );
        },
    );
}

#[test]
fn test_assign_to_mutable_ok() {
    with_analyzer(
        &[("fn f() -> i32 { var x = 1; x = 2; x += 3; return x; }", "m.vlt")],
        |_, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
        },
    );
}

#[test]
fn test_arithmetic_requires_numeric() {
    with_analyzer(
        &[("fn f() -> i32 { return 1 + true; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "Operator '+' requires numeric operands, found i32 and bool"
            );
        },
    );
}

#[test]
fn test_call_arity_mismatch() {
    with_analyzer(
        &[(
            "fn g(x: i32) -> i32 { return x; }\nfn f() -> i32 { return g(1, 2); }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "Expected 1 argument(s), found 2"
            );
        },
    );
}

#[test]
fn test_call_argument_type_mismatch() {
    with_analyzer(
        &[(
            "fn g(x: i32) -> i32 { return x; }\nfn f() -> i32 { return g(true); }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "Argument 1 type mismatch: expected i32, found bool"
            );
        },
    );
}

#[test]
fn test_shadowing_across_scopes_allowed() {
    with_analyzer(
        &[(
            "fn f() -> i32 { val x = 1; if (true) { val x = 2; } return x; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
        },
    );
}

#[test]
fn test_duplicate_in_same_scope_rejected() {
    with_analyzer(
        &[("fn f() -> i32 { val x = 1; val x = 2; return 0; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "Redefinition of symbol 'x'"
            );
        },
    );
}

#[test]
fn test_declaration_type_mismatch() {
    with_analyzer(
        &[("fn f() -> i32 { var x: i32 = true; return 0; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "Type mismatch: cannot initialize 'x' of type i32 with bool"
            );
        },
    );
}

#[test]
fn test_unknown_type_reported() {
    with_analyzer(
        &[("fn f(x: Foo) -> i32 { return 0; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(handler.diagnostics()[0].message, "Unknown type 'Foo'");
        },
    );
}

#[test]
fn test_struct_field_access() {
    with_analyzer(
        &[(
            "struct Point { x: i32; y: i32; }\nfn get_x(p: Point) -> i32 { return p.x; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
        },
    );
}

#[test]
fn test_missing_struct_field() {
    with_analyzer(
        &[(
            "struct Point { x: i32; }\nfn f(p: Point) -> i32 { return p.z; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "No field 'z' on type Point"
            );
        },
    );
}

#[test]
fn test_enum_variant_access() {
    with_analyzer(
        &[(
            "enum Color { Red, Green, Blue }\nfn pick() -> Color { return Color::Red; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
        },
    );
}

#[test]
fn test_condition_must_be_bool() {
    with_analyzer(
        &[("fn f() -> i32 { if (1) { } return 0; }", "m.vlt")],
        |_, handler, result| {
            assert!(result.is_err());
            assert_eq!(
                handler.diagnostics()[0].message,
                "Condition must be 'bool', found i32"
            );
        },
    );
}

#[test]
fn test_global_inference_from_initializer() {
    with_analyzer(
        &[("val answer = 42;\nval pi = 3.14;", "m.vlt")],
        |analyzer, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
            // Both lacked annotations, so Pass 2 queued them.
            assert_eq!(analyzer.unresolved_symbols().len(), 2);
            let answer = analyzer.lookup_global("answer").unwrap();
            let answer_ty = analyzer.symbol(answer).ty.unwrap();
            assert_eq!(analyzer.type_info(answer_ty).kind, TypeKind::I32);
            let pi = analyzer.lookup_global("pi").unwrap();
            let pi_ty = analyzer.symbol(pi).ty.unwrap();
            assert_eq!(analyzer.type_info(pi_ty).kind, TypeKind::F64);
        },
    );
}

#[test]
fn test_errors_accumulate_without_aborting() {
    with_analyzer(
        &[(
            "fn f() -> i32 { return q; }\nfn g() -> i32 { return true; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert_eq!(result, Err(AnalysisError::Failed(2)));
            assert_eq!(handler.error_count(), 2);
        },
    );
}

#[test]
fn test_struct_types_complete_after_pass2() {
    with_analyzer(
        &[("struct A { n: i32; }\nenum B { X, Y }", "m.vlt")],
        |analyzer, _, result| {
            assert_eq!(result, Ok(()));
            for name in ["A", "B"] {
                let id = analyzer.lookup_global(name).unwrap();
                let ty = analyzer.symbol(id).ty.unwrap();
                assert!(analyzer.type_info(ty).is_complete, "{} incomplete", name);
            }
        },
    );
}

#[test]
fn test_catch_unwraps_error_type() {
    with_analyzer(
        &[(
            "fn risky() -> error!i32 { return 0; }\nfn f() -> i32 { val x = risky() catch |e| { return 1; }; return x; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
        },
    );
}

#[test]
fn test_for_loop_bindings_in_scope() {
    with_analyzer(
        &[(
            "fn f() -> i32 { var total = 0; for (i in 0..10) { total += i; } return total; }",
            "m.vlt",
        )],
        |_, handler, result| {
            assert_eq!(result, Ok(()), "{:?}", handler.diagnostics());
        },
    );
}
