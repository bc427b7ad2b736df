use super::*;
use crate::convert_to_async::chain_recognizer::{find_root_statements, is_chain_root};
use asyncify_checker::{OracleOptions, PromiseTypeOracle};
use asyncify_emitter::{PrintOptions, Printer};
use asyncify_parser::ParserState;

struct Bound {
    arena: NodeArena,
    binder: BinderState,
    options: OracleOptions,
}

fn bind(source: &str) -> Bound {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(parser.get_diagnostics().is_empty(), "parse errors in {source:?}");
    let arena = parser.into_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, root);
    Bound {
        arena,
        binder,
        options: OracleOptions::default(),
    }
}

fn first_of_kind(arena: &NodeArena, kind: u16) -> NodeIndex {
    (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| arena.get(idx).is_some_and(|n| n.kind == kind))
        .min_by_key(|&idx| arena.get(idx).map(|n| (n.pos, u32::MAX - n.end)))
        .expect("node of kind")
}

/// Glue the chains of the first function-like node of `kind`; returns each
/// group's statement count and printed chain.
fn glue(source: &str, kind: u16) -> Vec<(usize, RootKind, String)> {
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let func = first_of_kind(&bound.arena, kind);
    let roots = find_root_statements(&bound.arena, &oracle, func);

    let mut clone = bound.arena.clone();
    let groups = ChainGluer::new(&bound.binder, &oracle).glue(&mut clone, &roots);
    groups
        .iter()
        .map(|group| {
            let printed = Printer::new(&clone, PrintOptions::default()).print_node(group.chain);
            (group.statements.len(), group.kind, printed)
        })
        .collect()
}

fn glue_function(source: &str) -> Vec<(usize, RootKind, String)> {
    glue(source, syntax_kind_ext::FUNCTION_DECLARATION)
}

#[test]
fn test_split_chain_is_glued() {
    let groups = glue_function(
        "function f() {\n    const p = fetch(u).then(a);\n    return p.then(b);\n}",
    );
    assert_eq!(
        groups,
        vec![(2, RootKind::Return, "fetch(u).then(a).then(b)".to_string())]
    );
}

#[test]
fn test_glue_follows_several_declarations() {
    let groups = glue_function(
        "function f() {\n    log();\n    const p = fetch(u);\n    const q = p.then(a);\n    q.then(b);\n}",
    );
    assert_eq!(
        groups,
        vec![(3, RootKind::Expression, "fetch(u).then(a).then(b)".to_string())]
    );
}

#[test]
fn test_variable_read_twice_is_not_glued() {
    let groups = glue_function(
        "function f() {\n    const p = fetch(u);\n    log(p);\n    return p.then(b);\n}",
    );
    assert_eq!(groups, vec![(1, RootKind::Return, "p.then(b)".to_string())]);

    let groups = glue_function(
        "function f() {\n    const p = fetch(u);\n    return p.then(() => p);\n}",
    );
    assert_eq!(groups[0].0, 1);
}

#[test]
fn test_unrelated_declaration_is_not_glued() {
    let groups = glue_function(
        "function f() {\n    const p = fetch(a);\n    return fetch(b).then(x);\n}",
    );
    assert_eq!(groups, vec![(1, RootKind::Return, "fetch(b).then(x)".to_string())]);
}

#[test]
fn test_multiple_declarators_are_not_glued() {
    let groups = glue_function(
        "function f() {\n    const p = fetch(a), q = 1;\n    return p.then(x);\n}",
    );
    assert_eq!(groups[0].0, 1);
}

#[test]
fn test_non_promise_initializer_is_not_glued() {
    let groups = glue_function(
        "function f() {\n    const p: Promise<number> = load();\n    return p.then(x);\n}",
    );
    assert_eq!(groups, vec![(1, RootKind::Return, "p.then(x)".to_string())]);
}

#[test]
fn test_groups_never_share_statements() {
    let groups = glue_function(
        "function f() {\n    const p = fetch(a);\n    p.then(x);\n    fetch(b).then(y);\n}",
    );
    assert_eq!(
        groups,
        vec![
            (2, RootKind::Expression, "fetch(a).then(x)".to_string()),
            (1, RootKind::Expression, "fetch(b).then(y)".to_string()),
        ]
    );
}

#[test]
fn test_arrow_body_is_never_glued() {
    let groups = glue(
        "const f = () => fetch(u).then(x);",
        syntax_kind_ext::ARROW_FUNCTION,
    );
    assert_eq!(groups, vec![(1, RootKind::ArrowBody, "fetch(u).then(x)".to_string())]);
}

#[test]
fn test_glued_nodes_remember_their_source() {
    let bound = bind("function f() {\n    const p = fetch(u);\n    return p.then(b);\n}");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let func = first_of_kind(&bound.arena, syntax_kind_ext::FUNCTION_DECLARATION);
    let roots = find_root_statements(&bound.arena, &oracle, func);

    let mut clone = bound.arena.clone();
    let groups = ChainGluer::new(&bound.binder, &oracle).glue(&mut clone, &roots);
    let group = &groups[0];
    assert_ne!(group.chain, roots[0].expression);
    assert_eq!(clone.original_of(group.chain), roots[0].expression);
    assert_eq!(group.root(), roots[0].node);
    assert!(is_chain_root(&clone, &oracle, group.chain));
}

#[test]
fn test_reassigned_chain_is_glued() {
    let groups = glue_function(
        "function f() {\n    let p = fetch(u);\n    p = p.then(a);\n    return p.then(b);\n}",
    );
    assert_eq!(
        groups,
        vec![(3, RootKind::Return, "fetch(u).then(a).then(b)".to_string())]
    );
}

#[test]
fn test_reassigned_parameter_keeps_its_first_read() {
    let groups = glue_function(
        "function f(p: Promise<Response>) {\n    p = p.then(a);\n    p.then(b);\n}",
    );
    assert_eq!(
        groups,
        vec![(2, RootKind::Expression, "p.then(a).then(b)".to_string())]
    );
}

#[test]
fn test_reassignment_read_later_is_not_glued() {
    let groups = glue_function(
        "function f() {\n    let p = fetch(u);\n    p = p.then(a);\n    p.then(b);\n    log(p);\n}",
    );
    assert_eq!(groups, vec![(1, RootKind::Expression, "p.then(b)".to_string())]);
}

#[test]
fn test_returned_variable_binds_the_chain_value() {
    let source = "function f() {\n    var blob = fetch(u).then(a);\n    return blob;\n}";
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let func = first_of_kind(&bound.arena, syntax_kind_ext::FUNCTION_DECLARATION);
    let roots = find_root_statements(&bound.arena, &oracle, func);

    let mut clone = bound.arena.clone();
    let groups = ChainGluer::new(&bound.binder, &oracle).glue(&mut clone, &roots);
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.kind, RootKind::ReturnBinding);
    assert_eq!(group.statements.len(), 2);
    assert_eq!(group.result, bound.binder.get_node_symbol(roots[0].expression));
    assert!(group.result.is_some());
    assert_eq!(
        Printer::new(&clone, PrintOptions::default()).print_node(group.chain),
        "fetch(u).then(a)"
    );
}

#[test]
fn test_returned_variable_read_elsewhere_is_dropped() {
    let groups = glue_function(
        "function f() {\n    if (c) {\n        var blob = fetch(u).then(a);\n        return blob;\n    }\n    log(blob);\n}",
    );
    assert!(groups.is_empty());
}
