//! Full-grammar parse tests: whole constructs through lexer + parser.

use voltc_lex::Lexer;
use voltc_util::Handler;

use crate::{volt_grammar, CstNode, Parser};

fn parse_start(source: &str, start: &str) -> (Result<CstNode, crate::ParseError>, Handler) {
    let handler = Handler::new();
    let grammar = volt_grammar();
    let tokens = Lexer::new(source, "test.vlt", &handler).tokenize();
    let result = Parser::new(&tokens, &grammar, "test.vlt", &handler).parse_as(start);
    (result, handler)
}

fn parse_unit(source: &str) -> (Result<CstNode, crate::ParseError>, Handler) {
    parse_start(source, "unit")
}

/// Depth-first search for a rule node by name.
fn find_rule<'a>(node: &'a CstNode, name: &str) -> Option<&'a CstNode> {
    if node.rule_name() == Some(name) {
        return Some(node);
    }
    node.children().iter().find_map(|child| find_rule(child, name))
}

#[test]
fn test_simple_function() {
    let (result, handler) = parse_unit("fn main() -> i32 { return 0; }");
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    assert!(handler.is_empty());
    let root = result.unwrap();
    assert!(find_rule(&root, "fn_decl").is_some());
    assert!(find_rule(&root, "return_stmt").is_some());
}

#[test]
fn test_for_with_range_iterable() {
    let (result, handler) = parse_start("for (i in 0..10) { }", "for_stmt");
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    assert!(handler.is_empty());
    let root = result.unwrap();
    assert_eq!(root.rule_name(), Some("for_stmt"));
    assert!(find_rule(&root, "range_expr").is_some());
}

#[test]
fn test_for_with_capture_uses_restricted_iterable() {
    let (result, _handler) = parse_start("for (x in items |x * 2|) { }", "for_stmt");
    let root = result.unwrap();
    // The capture form is the first alternative, so the iterable must be
    // the restricted rule that stops below bitwise-or.
    assert!(find_rule(&root, "for_iterable_expr").is_some());
    assert!(find_rule(&root, "for_pre_expr").is_some());
}

#[test]
fn test_return_type_keyword_expression() {
    let (result, handler) = parse_start("return type;", "return_stmt");
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    let root = result.unwrap();
    assert!(find_rule(&root, "primitive_type").is_some());
}

#[test]
fn test_inclusive_range_expression() {
    let (result, _) = parse_start("a..=b", "expression");
    let root = result.unwrap();
    assert!(find_rule(&root, "range_expr_rest").is_some());
}

#[test]
fn test_furthest_failure_single_diagnostic() {
    let (result, handler) = parse_unit("fn f() -> i32 { return 1 + ; }");
    assert!(result.is_err());
    let diags = handler.diagnostics();
    assert_eq!(diags.len(), 1, "expected one diagnostic, got {:?}", diags);
    // Located at the `;`, naming a failure inside the expression ladder.
    assert_eq!((diags[0].line, diags[0].column), (1, 28));
    assert!(diags[0].message.starts_with("Failed to parse"));
}

#[test]
fn test_struct_and_enum_declarations() {
    let source = "\
struct Point { x: i32; y: i32; }
enum Color { Red, Green, Blue }
error ParseError { BadInput: str, Eof }
";
    let (result, handler) = parse_unit(source);
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    let root = result.unwrap();
    assert!(find_rule(&root, "struct_decl").is_some());
    assert!(find_rule(&root, "enum_decl").is_some());
    assert!(find_rule(&root, "error_decl").is_some());
}

#[test]
fn test_trait_and_attach() {
    let source = "\
trait Printable { fn print(this) -> i8; }
attach Printable -> Point { fn print(this) -> i8 { return 0; } }
";
    let (result, handler) = parse_unit(source);
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    let root = result.unwrap();
    assert!(find_rule(&root, "trait_decl").is_some());
    assert!(find_rule(&root, "attach_decl").is_some());
}

#[test]
fn test_namespace_and_use() {
    let source = "\
use std::io;
namespace app::core { fn boot() -> i32 { return 0; } }
";
    let (result, handler) = parse_unit(source);
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
}

#[test]
fn test_statement_variety() {
    let source = "\
fn demo() -> i32 {
    var x: i32 = 1;
    val y = 2;
    static z: i32 = 3;
    while (x < 10) { x += 1; }
    loop { break; }
    if (x == y) { x = 0; } else { x = 1; }
    defer cleanup();
    match x { 1 => 2; default => { return 1; } }
    return x;
}
";
    let (result, handler) = parse_unit(source);
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    let root = result.unwrap();
    for name in [
        "var_decl",
        "val_decl",
        "static_decl",
        "while_stmt",
        "loop_stmt",
        "if_stmt",
        "defer_stmt",
        "match_stmt",
    ] {
        assert!(find_rule(&root, name).is_some(), "missing {}", name);
    }
}

#[test]
fn test_catch_postfix() {
    let (result, handler) = parse_unit("fn f() -> i32 { val x = risky() catch |e| { return 1; }; return x; }");
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    let root = result.unwrap();
    assert!(find_rule(&root, "catch_clause").is_some());
}

#[test]
fn test_error_wrapper_types() {
    let (result, handler) = parse_start("error!i32", "type");
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
    let (result, handler) = parse_start("ParseError!i32", "type");
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
}

#[test]
fn test_type_suffix_chain() {
    for source in ["i32*", "i32*?", "i32?", "i32[]", "i32[..]", "i32[4]", "u8*[]"] {
        let (result, handler) = parse_start(source, "type");
        assert!(result.is_ok(), "{}: {:?}", source, handler.diagnostics());
    }
}

#[test]
fn test_tuple_and_closure_types() {
    for source in ["(i32, f64)", "(x: i32, y: f64)", "|i32, i32| -> bool"] {
        let (result, handler) = parse_start(source, "type");
        assert!(result.is_ok(), "{}: {:?}", source, handler.diagnostics());
    }
}

#[test]
fn test_generic_function_declaration() {
    let source = "<T: type> fn identity(x: T) -> T { return x; }";
    let (result, handler) = parse_unit(source);
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
}

#[test]
fn test_extern_and_export() {
    let source = "\
extern \"C\" fn puts(s: cstr) -> i32;
export fn entry() -> i32 { return 0; }
";
    let (result, handler) = parse_unit(source);
    assert!(result.is_ok(), "{:?}", handler.diagnostics());
}

#[test]
fn test_cast_uses_as_keyword() {
    let (result, _) = parse_start("x as i64", "expression");
    let root = result.unwrap();
    assert!(find_rule(&root, "cast_expr_rest").map(|n| !n.is_epsilon()).unwrap_or(false));
}

#[test]
fn test_empty_unit() {
    let (result, handler) = parse_unit("");
    assert!(result.is_ok());
    assert!(handler.is_empty());
}

#[test]
fn test_leaf_tokens_are_contiguous_slice() {
    let source = "fn f(a: i32, b: i32) -> i32 { return a + b; }";
    let handler = Handler::new();
    let grammar = volt_grammar();
    let tokens = Lexer::new(source, "test.vlt", &handler).tokenize();
    let root = Parser::new(&tokens, &grammar, "test.vlt", &handler)
        .parse()
        .unwrap();
    let leaves = root.tokens();
    assert_eq!(leaves.len(), tokens.len());
    for (leaf, token) in leaves.iter().zip(&tokens) {
        assert_eq!(*leaf, token);
    }
}
