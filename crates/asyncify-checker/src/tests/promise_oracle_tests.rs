use super::*;
use asyncify_parser::ParserState;

struct Bound {
    arena: NodeArena,
    binder: BinderState,
    options: OracleOptions,
}

fn bind(source: &str) -> Bound {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(parser.get_diagnostics().is_empty(), "unexpected parse errors");
    let arena = parser.into_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, root);
    Bound {
        arena,
        binder,
        options: OracleOptions::default(),
    }
}

/// Expression of the last expression statement in the file.
fn last_expression(arena: &NodeArena) -> NodeIndex {
    let root = (0..arena.len() as u32)
        .map(NodeIndex)
        .find(|&idx| arena.get(idx).is_some_and(|n| n.kind == syntax_kind_ext::SOURCE_FILE))
        .expect("source file");
    let stmts = arena.get_statements(root).expect("statements");
    let last = *stmts.nodes.last().expect("statement");
    let node = arena.get(last).expect("node");
    arena.get_expression_statement(node).expect("expression").expression
}

fn is_promise(source: &str) -> bool {
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    oracle.is_promise_like(last_expression(&bound.arena))
}

#[test]
fn test_promise_type_text() {
    let options = OracleOptions::default();
    assert!(is_promise_type_text("Promise<void>", &options));
    assert!(is_promise_type_text(" (PromiseLike<Map<string, number>>) ", &options));
    assert!(is_promise_type_text("Promise", &options));
    assert!(is_promise_type_text("Promise<(x: number) => void>", &options));
    assert!(!is_promise_type_text("Promise<void> | undefined", &options));
    assert!(!is_promise_type_text("Promise<void>[]", &options));
    assert!(!is_promise_type_text("Array<Promise<void>>", &options));
}

#[test]
fn test_returns_promise_type_text() {
    let options = OracleOptions::default();
    assert!(returns_promise_type_text("(url: string) => Promise<Response>", &options));
    assert!(!returns_promise_type_text("(cb: () => Promise<void>) => void", &options));
    assert!(!returns_promise_type_text("Promise<void>", &options));
}

#[test]
fn test_global_factories_and_statics() {
    assert!(is_promise("fetch(url);"));
    assert!(is_promise("Promise.all([a, b]);"));
    assert!(is_promise("Promise.resolve(1);"));
    assert!(is_promise("new Promise(r => r(1));"));
    assert!(!is_promise("setTimeout(f, 1);"));
    assert!(!is_promise("Promise.prototype;"));
}

#[test]
fn test_shadowed_global_is_not_a_factory() {
    assert!(!is_promise("function fetch(u) { return u; }\nfetch(url);"));
}

#[test]
fn test_then_chain_on_promise_receiver() {
    assert!(is_promise("fetch(url).then(r => r.json()).catch(e => null);"));
    assert!(!is_promise("items.then(x => x);"));
}

#[test]
fn test_response_members() {
    assert!(is_promise("res.json();"));
    assert!(is_promise("res.arrayBuffer();"));
    assert!(!is_promise("res.status();"));
}

#[test]
fn test_declared_functions() {
    assert!(is_promise("async function load() {}\nload();"));
    assert!(is_promise("function load(): Promise<number> { return x; }\nload();"));
    assert!(is_promise("function load() { return fetch(u); }\nload();"));
    assert!(!is_promise("function load() { if (a) return fetch(u); return 1; }\nload();"));
    assert!(is_promise("const load = async () => 1;\nload();"));
    assert!(is_promise("const load = () => fetch(u);\nload();"));
    assert!(!is_promise("async function* gen() {}\ngen();"));
}

#[test]
fn test_function_typed_bindings() {
    assert!(is_promise("declare const x: number;\nconst get: (u: string) => Promise<string> = impl;\nget(u);"));
    assert!(is_promise("function run(op: () => Promise<void>) {\n    return op();\n}\nrun(f);"));
    assert!(!is_promise("function run(op: () => void) {\n    return op();\n}\nrun(f);"));
}

#[test]
fn test_promise_typed_identifiers() {
    assert!(is_promise("const p: Promise<number> = make();\np;"));
    assert!(is_promise("const p = fetch(u);\np;"));
    assert!(is_promise("const p = fetch(u) as Promise<Response>;\np;"));
    assert!(!is_promise("const { p } = fetch(u);\np;"));
    assert!(!is_promise("let n = 1;\nn;"));
}

#[test]
fn test_conditional_requires_both_branches() {
    assert!(is_promise("ok ? fetch(a) : fetch(b);"));
    assert!(!is_promise("ok ? fetch(a) : null;"));
}

#[test]
fn test_recursive_initializers_terminate() {
    assert!(!is_promise("var a = b;\nvar b = a;\na;"));
    assert!(!is_promise("function f() { return f(); }\nf();"));
}

#[test]
fn test_this_method_in_class() {
    let source = "class Api {\n    async load() { return 1; }\n    run() {\n        return this.load();\n    }\n}\n";
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let call = (0..bound.arena.len() as u32)
        .map(NodeIndex)
        .find(|&idx| {
            bound
                .arena
                .get(idx)
                .is_some_and(|n| n.kind == syntax_kind_ext::CALL_EXPRESSION)
        })
        .expect("call");
    assert!(oracle.is_promise_like(call));
}

#[test]
fn test_signature_first_param_name() {
    let source = "function handle(result, extra) {}\nconst other = (value) => value;\nconst none = () => 0;\nhandle;\n";
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);

    let find = |name: &str| {
        let mut found: Vec<(u32, NodeIndex)> = (0..bound.arena.len() as u32)
            .map(NodeIndex)
            .filter(|&idx| bound.arena.identifier_text(idx) == Some(name))
            .filter_map(|idx| bound.arena.get(idx).map(|n| (n.pos, idx)))
            .collect();
        found.sort();
        found.last().map(|&(_, idx)| idx).expect(name)
    };
    assert_eq!(
        oracle.signature_first_param_name(find("handle")),
        Some("result".to_string())
    );
    assert_eq!(
        oracle.signature_first_param_name(find("other")),
        Some("value".to_string())
    );
    assert_eq!(oracle.signature_first_param_name(find("none")), None);
}
