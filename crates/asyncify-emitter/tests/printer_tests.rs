use asyncify_emitter::{PrintOptions, Printer};
use asyncify_parser::node::{BinaryExprData, IdentifierData, UnaryExprDataEx};
use asyncify_parser::{NodeArena, NodeIndex, ParserState, syntax_kind_ext};
use asyncify_scanner::SyntaxKind;

fn parse(source: &str) -> (NodeArena, Vec<NodeIndex>) {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(parser.get_diagnostics().is_empty(), "parse errors in {source:?}");
    let arena = parser.into_arena();
    let statements = arena
        .get_statements(root)
        .expect("source file statements")
        .nodes
        .clone();
    (arena, statements)
}

fn reprint(source: &str) -> String {
    let (arena, statements) = parse(source);
    Printer::new(&arena, PrintOptions::default()).print_statements(&statements)
}

fn ident(arena: &mut NodeArena, name: &str) -> NodeIndex {
    arena.add_identifier(
        SyntaxKind::Identifier as u16,
        0,
        0,
        IdentifierData {
            escaped_text: name.to_string(),
        },
    )
}

fn binary(arena: &mut NodeArena, left: NodeIndex, op: SyntaxKind, right: NodeIndex) -> NodeIndex {
    arena.add_binary_expr(
        syntax_kind_ext::BINARY_EXPRESSION,
        0,
        0,
        BinaryExprData {
            left,
            operator_token: op as u16,
            right,
        },
    )
}

#[test]
fn test_simple_statements_reprint_unchanged() {
    let source = "const x = a + b * c;\nlet y;\nfoo(1, \"two\", `t${x}s`);\nreturn;";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_function_with_block_body() {
    let source = "function f(a: number, b = 2): Promise<void> {\n    return g(a).then(r => r.json());\n}";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_async_arrow_and_await() {
    let source = "const f = async (x) => {\n    const y = await g(x);\n    return y;\n};";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_try_catch_finally() {
    let source = "try {\n    a();\n} catch (e) {\n    b(e);\n} finally {\n    c();\n}";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_optional_binding_catch() {
    let source = "try {\n    a();\n} catch {\n    b();\n}";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_if_else_chain() {
    let source = "if (a) {\n    b();\n} else if (c) {\n    d();\n} else {\n    e();\n}";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_non_block_if_body_is_indented() {
    assert_eq!(reprint("if (a) b();"), "if (a)\n    b();");
}

#[test]
fn test_object_literal_statement_is_parenthesized() {
    assert_eq!(reprint("({ a: 1 }).a;"), "({ a: 1 }).a;");
}

#[test]
fn test_arrow_returning_object_is_parenthesized() {
    assert_eq!(reprint("const f = () => ({ a });"), "const f = () => ({ a });");
}

#[test]
fn test_destructuring_declarations() {
    let source = "const { a, b: c, ...rest } = o;\nconst [x, , z] = arr;";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_class_members() {
    let source = "class A extends B {\n    private x: number = 1;\n    constructor() {\n        super();\n    }\n    async load(): Promise<void> {\n        await this.fetch();\n    }\n    get size() {\n        return this.x;\n    }\n}";
    assert_eq!(reprint(source), source);
}

#[test]
fn test_switch_and_loops() {
    let source = "switch (k) {\n    case 1:\n        a();\n        break;\n    default:\n        b();\n}\nfor (const x of xs) {\n    use(x);\n}\nwhile (i > 0) i--;";
    let expected = "switch (k) {\n    case 1:\n        a();\n        break;\n    default:\n        b();\n}\nfor (const x of xs) {\n    use(x);\n}\nwhile (i > 0)\n    i--;";
    assert_eq!(reprint(source), expected);
}

#[test]
fn test_synthesized_operands_get_parentheses() {
    let mut arena = NodeArena::new();
    let a = ident(&mut arena, "a");
    let b = ident(&mut arena, "b");
    let c = ident(&mut arena, "c");
    let sum = binary(&mut arena, a, SyntaxKind::PlusToken, b);
    let product = binary(&mut arena, sum, SyntaxKind::AsteriskToken, c);

    let mut printer = Printer::new(&arena, PrintOptions::default());
    assert_eq!(printer.print_node(product), "(a + b) * c");
}

#[test]
fn test_synthesized_await_of_binary_is_parenthesized() {
    let mut arena = NodeArena::new();
    let a = ident(&mut arena, "a");
    let b = ident(&mut arena, "b");
    let either = binary(&mut arena, a, SyntaxKind::BarBarToken, b);
    let awaited = arena.add_unary_expr_ex(
        syntax_kind_ext::AWAIT_EXPRESSION,
        0,
        0,
        UnaryExprDataEx {
            expression: either,
            asterisk_token: false,
        },
    );

    let mut printer = Printer::new(&arena, PrintOptions::default());
    assert_eq!(printer.print_node(awaited), "await (a || b)");
}

#[test]
fn test_right_associative_assignment_needs_no_parentheses() {
    let mut arena = NodeArena::new();
    let a = ident(&mut arena, "a");
    let b = ident(&mut arena, "b");
    let c = ident(&mut arena, "c");
    let inner = binary(&mut arena, b, SyntaxKind::EqualsToken, c);
    let outer = binary(&mut arena, a, SyntaxKind::EqualsToken, inner);

    let mut printer = Printer::new(&arena, PrintOptions::default());
    assert_eq!(printer.print_node(outer), "a = b = c");
}

#[test]
fn test_base_indent_applies_after_first_line() {
    let (arena, statements) = parse("if (a) {\n    b();\n}");
    let options = PrintOptions {
        base_indent: "  ".to_string(),
        ..PrintOptions::default()
    };
    let printed = Printer::new(&arena, options).print_statements(&statements);
    assert_eq!(printed, "if (a) {\n      b();\n  }");
}

#[test]
fn test_indent_size_option() {
    let (arena, statements) = parse("function f() {\n  return 1;\n}");
    let options = PrintOptions {
        indent_size: 2,
        ..PrintOptions::default()
    };
    let printed = Printer::new(&arena, options).print_statements(&statements);
    assert_eq!(printed, "function f() {\n  return 1;\n}");
}

#[test]
fn test_print_options_from_json() {
    let options: PrintOptions = serde_json::from_str(r#"{"indentSize": 2}"#).expect("options");
    assert_eq!(options.indent_size, 2);
    assert_eq!(options.new_line, "\n");
}
