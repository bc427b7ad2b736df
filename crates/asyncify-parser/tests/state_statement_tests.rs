use asyncify_parser::{NodeArena, NodeIndex, ParserState, node_flags, syntax_kind_ext};

fn parse(source: &str) -> (NodeArena, Vec<NodeIndex>, usize) {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    let errors = parser.get_diagnostics().len();
    let arena = parser.into_arena();
    let statements = {
        let node = arena.get(root).expect("root");
        arena
            .get_source_file(node)
            .expect("source file")
            .statements
            .nodes
            .clone()
    };
    (arena, statements, errors)
}

fn kinds(arena: &NodeArena, nodes: &[NodeIndex]) -> Vec<u16> {
    nodes
        .iter()
        .map(|&idx| arena.get(idx).expect("node").kind)
        .collect()
}

#[test]
fn test_statement_kinds() {
    let source = r#"
var a = 1;
let b = 2;
const c = 3;
function f() {}
class C {}
if (a) b; else c;
while (a) {}
do {} while (a);
for (let i = 0; i < 3; i++) {}
for (const k in o) {}
for (const v of xs) {}
switch (a) { case 1: break; default: }
try {} catch (e) {} finally {}
label: for (;;) { continue label; }
throw err;
;
"#;
    let (arena, statements, errors) = parse(source);
    assert_eq!(errors, 0);
    assert_eq!(
        kinds(&arena, &statements),
        vec![
            syntax_kind_ext::VARIABLE_STATEMENT,
            syntax_kind_ext::VARIABLE_STATEMENT,
            syntax_kind_ext::VARIABLE_STATEMENT,
            syntax_kind_ext::FUNCTION_DECLARATION,
            syntax_kind_ext::CLASS_DECLARATION,
            syntax_kind_ext::IF_STATEMENT,
            syntax_kind_ext::WHILE_STATEMENT,
            syntax_kind_ext::DO_STATEMENT,
            syntax_kind_ext::FOR_STATEMENT,
            syntax_kind_ext::FOR_IN_STATEMENT,
            syntax_kind_ext::FOR_OF_STATEMENT,
            syntax_kind_ext::SWITCH_STATEMENT,
            syntax_kind_ext::TRY_STATEMENT,
            syntax_kind_ext::LABELED_STATEMENT,
            syntax_kind_ext::THROW_STATEMENT,
            syntax_kind_ext::EMPTY_STATEMENT,
        ]
    );
}

#[test]
fn test_variable_flags() {
    let (arena, statements, _) = parse("var a; let b; const c = 1;");
    let flags: Vec<u16> = statements
        .iter()
        .map(|&idx| arena.get(idx).expect("node").flags)
        .collect();
    assert_eq!(
        flags,
        vec![0, node_flags::LET as u16, node_flags::CONST as u16]
    );
}

#[test]
fn test_let_as_identifier() {
    let (arena, statements, errors) = parse("let = 5;");
    assert_eq!(errors, 0);
    assert_eq!(
        kinds(&arena, &statements),
        vec![syntax_kind_ext::EXPRESSION_STATEMENT]
    );
}

#[test]
fn test_automatic_semicolon_insertion() {
    let (arena, statements, errors) = parse("a()\nb()\nreturn\nc");
    assert_eq!(errors, 0);
    assert_eq!(statements.len(), 4);
    let ret = arena
        .get_return_statement(arena.get(statements[2]).expect("return"))
        .expect("return data");
    assert!(ret.expression.is_none());
}

#[test]
fn test_statement_range_includes_semicolon() {
    let source = "  foo();  ";
    let (arena, statements, _) = parse(source);
    let node = arena.get(statements[0]).expect("statement");
    assert_eq!(&source[node.pos as usize..node.end as usize], "foo();");
}

#[test]
fn test_type_only_declarations_are_verbatim() {
    let source = r#"interface A { x: number }
type B = string | number;
enum E { One, Two }
declare const d: number;
import { x } from "y";
export { x };
const after = 1;
"#;
    let (arena, statements, errors) = parse(source);
    assert_eq!(errors, 0);
    assert_eq!(
        kinds(&arena, &statements),
        vec![
            syntax_kind_ext::INTERFACE_DECLARATION,
            syntax_kind_ext::TYPE_ALIAS_DECLARATION,
            syntax_kind_ext::ENUM_DECLARATION,
            syntax_kind_ext::MODULE_DECLARATION,
            syntax_kind_ext::IMPORT_DECLARATION,
            syntax_kind_ext::EXPORT_DECLARATION,
            syntax_kind_ext::VARIABLE_STATEMENT,
        ]
    );
    let import = arena.get(statements[4]).expect("import");
    assert_eq!(
        arena.get_type_node(import).map(|t| t.text.as_str()),
        Some(r#"import { x } from "y";"#)
    );
}

#[test]
fn test_multiline_union_type_alias() {
    let source = "type T =\n  | A\n  | B\nconst x = 1;";
    let (arena, statements, errors) = parse(source);
    assert_eq!(errors, 0);
    assert_eq!(
        kinds(&arena, &statements),
        vec![
            syntax_kind_ext::TYPE_ALIAS_DECLARATION,
            syntax_kind_ext::VARIABLE_STATEMENT,
        ]
    );
}

#[test]
fn test_export_modifiers_on_declarations() {
    let (arena, statements, errors) =
        parse("export function f() {}\nexport default async function g() {}\nexport default 1;");
    assert_eq!(errors, 0);
    let f = arena
        .get_function(arena.get(statements[0]).expect("f"))
        .expect("function");
    assert_eq!(f.modifiers.as_ref().map(|m| m.len()), Some(1));
    let g = arena
        .get_function(arena.get(statements[1]).expect("g"))
        .expect("function");
    assert!(g.is_async);
    assert_eq!(g.modifiers.as_ref().map(|m| m.len()), Some(2));
    assert_eq!(
        arena.get(statements[2]).expect("default").kind,
        syntax_kind_ext::EXPORT_ASSIGNMENT
    );
}

#[test]
fn test_class_members() {
    let source = r#"class Service<T> extends Base<T> implements I {
    private readonly cache = new Map();
    static count: number;
    constructor(private http: Http) { super(); }
    async load(id: string): Promise<T> { return this.http.get(id); }
    get size() { return 0; }
    fetch(): Promise<void> { return run(); }
    [key: string]: unknown;
}"#;
    let (arena, statements, errors) = parse(source);
    assert_eq!(errors, 0);
    let class = arena
        .get_class(arena.get(statements[0]).expect("class"))
        .expect("class data");
    assert_eq!(
        kinds(&arena, &class.members.nodes),
        vec![
            syntax_kind_ext::PROPERTY_DECLARATION,
            syntax_kind_ext::PROPERTY_DECLARATION,
            syntax_kind_ext::CONSTRUCTOR,
            syntax_kind_ext::METHOD_DECLARATION,
            syntax_kind_ext::GET_ACCESSOR,
            syntax_kind_ext::METHOD_DECLARATION,
            syntax_kind_ext::TYPE_NODE,
        ]
    );
    let load = arena
        .get_function(arena.get(class.members.nodes[3]).expect("load"))
        .expect("method");
    assert!(load.is_async);
    let return_type = arena.get(load.type_annotation).expect("type");
    assert_eq!(
        arena.get_type_node(return_type).map(|t| t.text.as_str()),
        Some("Promise<T>")
    );
}

#[test]
fn test_catch_clause_binding() {
    let (arena, statements, errors) = parse("try { a(); } catch ({ message }) { log(message); }");
    assert_eq!(errors, 0);
    let try_data = arena
        .get_try(arena.get(statements[0]).expect("try"))
        .expect("try data");
    let clause = arena
        .get_catch_clause(arena.get(try_data.catch_clause).expect("clause"))
        .expect("catch");
    let decl = arena
        .get_variable_declaration(arena.get(clause.variable_declaration).expect("decl"))
        .expect("declaration");
    assert_eq!(
        arena.get(decl.name).expect("name").kind,
        syntax_kind_ext::OBJECT_BINDING_PATTERN
    );
}

#[test]
fn test_stray_close_brace_recovers() {
    let (arena, statements, errors) = parse("a();\n}\nb();");
    assert_eq!(errors, 1);
    assert_eq!(
        kinds(&arena, &statements),
        vec![
            syntax_kind_ext::EXPRESSION_STATEMENT,
            syntax_kind_ext::EXPRESSION_STATEMENT,
        ]
    );
}

#[test]
fn test_unterminated_string_is_reported() {
    let (_, _, errors) = parse("const s = 'abc");
    assert!(errors >= 1);
}
