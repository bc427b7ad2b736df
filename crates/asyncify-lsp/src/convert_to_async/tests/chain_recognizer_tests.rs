use super::*;
use asyncify_binder::BinderState;
use asyncify_checker::{OracleOptions, PromiseTypeOracle};
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

/// Every node of `kind`, outermost first.
fn nodes_of_kind(arena: &NodeArena, kind: u16) -> Vec<NodeIndex> {
    let mut nodes: Vec<NodeIndex> = (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| arena.get(idx).is_some_and(|n| n.kind == kind))
        .collect();
    nodes.sort_by_key(|&idx| {
        let node = arena.get(idx).expect("node");
        (node.pos, u32::MAX - node.end)
    });
    nodes
}

/// Expression of the last top-level expression statement.
fn last_expression(arena: &NodeArena) -> NodeIndex {
    let root = nodes_of_kind(arena, syntax_kind_ext::SOURCE_FILE)[0];
    let stmts = arena.get_statements(root).expect("statements");
    let last = *stmts.nodes.last().expect("statement");
    let node = arena.get(last).expect("node");
    arena.get_expression_statement(node).expect("expression").expression
}

fn first_function(arena: &NodeArena) -> NodeIndex {
    nodes_of_kind(arena, syntax_kind_ext::FUNCTION_DECLARATION)[0]
}

#[test]
fn test_classify_then_on_fetch() {
    let bound = bind("fetch(url).then(r => r.json());");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);

    let ChainLink::ThenCall {
        receiver,
        on_fulfilled,
        on_rejected,
        ..
    } = classify(&bound.arena, &oracle, expr)
    else {
        panic!("expected a then link");
    };
    assert_eq!(
        classify(&bound.arena, &oracle, receiver),
        ChainLink::PromiseProducingCall
    );
    assert!(matches!(
        classify_callback(&bound.arena, &oracle, on_fulfilled),
        Callback::Literal(_)
    ));
    assert!(on_rejected.is_none());
}

#[test]
fn test_classify_then_on_non_promise_receiver() {
    let bound = bind("const o = { then(x) { return x; } };\no.then(x => x);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);
    assert_eq!(classify(&bound.arena, &oracle, expr), ChainLink::Other);
    assert!(!is_chain_root(&bound.arena, &oracle, expr));
}

#[test]
fn test_classify_catch_and_finally() {
    let bound = bind("fetch(url).catch(onError).finally(done);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);

    let ChainLink::FinallyCall { receiver } = classify(&bound.arena, &oracle, expr) else {
        panic!("expected a finally link");
    };
    assert!(matches!(
        classify(&bound.arena, &oracle, receiver),
        ChainLink::CatchCall { .. }
    ));
    assert!(!is_chain_root(&bound.arena, &oracle, expr));
    assert!(is_chain_root(&bound.arena, &oracle, receiver));
}

#[test]
fn test_spread_arguments_are_not_rewritten() {
    let bound = bind("fetch(url).then(...handlers);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);
    assert_eq!(
        classify(&bound.arena, &oracle, expr),
        ChainLink::PromiseProducingCall
    );
}

#[test]
fn test_then_with_three_arguments_is_not_a_link() {
    let bound = bind("fetch(url).then(a, b, c);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);
    assert_eq!(
        classify(&bound.arena, &oracle, expr),
        ChainLink::PromiseProducingCall
    );
}

#[test]
fn test_optional_call_is_not_a_link() {
    let bound = bind("fetch(url)?.then(a);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);
    assert!(!matches!(
        classify(&bound.arena, &oracle, expr),
        ChainLink::ThenCall { .. }
    ));
}

#[test]
fn test_parenthesized_chain_is_a_root() {
    let bound = bind("(fetch(url).then(a));");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);
    assert!(is_chain_root(&bound.arena, &oracle, expr));
}

#[test]
fn test_classify_callbacks() {
    let bound = bind(
        "function* gen() {}\n\
         fetch(url).then(null, undefined);\n\
         fetch(url).then(function* () {}, handler);\n\
         fetch(url).then(obj.method, makeHandler());",
    );
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let thens: Vec<(NodeIndex, NodeIndex)> = nodes_of_kind(&bound.arena, syntax_kind_ext::CALL_EXPRESSION)
        .into_iter()
        .filter_map(|idx| match classify(&bound.arena, &oracle, idx) {
            ChainLink::ThenCall {
                on_fulfilled,
                on_rejected,
                ..
            } => Some((on_fulfilled, on_rejected)),
            _ => None,
        })
        .collect();
    assert_eq!(thens.len(), 3);

    let shape = |idx| classify_callback(&bound.arena, &oracle, idx);
    assert_eq!(shape(thens[0].0), Callback::Absent);
    assert_eq!(shape(thens[0].1), Callback::Absent);
    assert!(matches!(shape(thens[1].0), Callback::Unsupported(_)));
    assert!(matches!(shape(thens[1].1), Callback::Reference(_)));
    assert!(matches!(shape(thens[2].0), Callback::Unsupported(_)));
    assert!(matches!(shape(thens[2].1), Callback::Unsupported(_)));
    assert_eq!(shape(NodeIndex::NONE), Callback::Absent);
}

#[test]
fn test_chain_spine_and_leaf() {
    let bound = bind("const p: Promise<number> = load();\np.then(a).catch(b).then(c);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let root = nodes_of_kind(&bound.arena, syntax_kind_ext::EXPRESSION_STATEMENT)[0];
    let expr = bound
        .arena
        .get_expression_statement(bound.arena.get(root).expect("node"))
        .expect("statement")
        .expression;

    let spine = chain_spine(&bound.arena, &oracle, expr);
    let kinds: Vec<&str> = spine
        .iter()
        .map(|(_, link)| match link {
            ChainLink::ThenCall { .. } => "then",
            ChainLink::CatchCall { .. } => "catch",
            ChainLink::PropertyChain { .. } => "property",
            ChainLink::PromiseProducingCall => "promise",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["then", "catch", "then", "promise"]);

    let leaf = chain_leaf(&bound.arena, &oracle, expr);
    assert_eq!(bound.arena.identifier_text(leaf), Some("p"));
}

#[test]
fn test_find_root_statements_in_block_body() {
    let bound = bind(
        "function f() {\n\
         \x20   fetch(a).then(log);\n\
         \x20   if (ok) {\n\
         \x20       return fetch(b).catch(log);\n\
         \x20   }\n\
         \x20   const inner = () => fetch(c).then(log);\n\
         \x20   fetch(d).finally(log);\n\
         \x20   return fetch(e);\n\
         }",
    );
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let roots = find_root_statements(&bound.arena, &oracle, first_function(&bound.arena));
    let kinds: Vec<RootKind> = roots.iter().map(|root| root.kind).collect();
    assert_eq!(kinds, vec![RootKind::Expression, RootKind::Return]);
}

#[test]
fn test_returned_variable_holding_a_chain_is_a_root() {
    let bound = bind(
        "function f() {\n\
         \x20   var blob = fetch(u).then(r => r.json());\n\
         \x20   return blob;\n\
         }\n\
         function g() {\n\
         \x20   const p = fetch(u);\n\
         \x20   return p;\n\
         }",
    );
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let functions = nodes_of_kind(&bound.arena, syntax_kind_ext::FUNCTION_DECLARATION);

    let roots = find_root_statements(&bound.arena, &oracle, functions[0]);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].kind, RootKind::ReturnBinding);
    assert_eq!(bound.arena.identifier_text(roots[0].expression), Some("blob"));

    assert!(find_root_statements(&bound.arena, &oracle, functions[1]).is_empty());
}

#[test]
fn test_definition_of_declarations_and_assignments() {
    let bound = bind("let p = fetch(u);\np = p.then(a);\nlet q, r = 1;\nthis.x = 1;");
    let statements = nodes_of_kind(&bound.arena, syntax_kind_ext::VARIABLE_STATEMENT)
        .into_iter()
        .chain(nodes_of_kind(&bound.arena, syntax_kind_ext::EXPRESSION_STATEMENT))
        .collect::<Vec<_>>();
    let described: Vec<Option<(String, bool)>> = statements
        .iter()
        .map(|&stmt| {
            definition_of(&bound.arena, stmt).map(|definition| {
                let name = bound.arena.identifier_text(definition.target).unwrap_or("");
                (name.to_string(), definition.declares)
            })
        })
        .collect();
    assert_eq!(
        described,
        vec![
            Some(("p".to_string(), true)),
            None,
            Some(("p".to_string(), false)),
            None,
        ]
    );
}

#[test]
fn test_find_root_statements_in_arrow_body() {
    let bound = bind("const f = () => fetch(url).then(r => r.json());");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let arrow = nodes_of_kind(&bound.arena, syntax_kind_ext::ARROW_FUNCTION)[0];
    let roots = find_root_statements(&bound.arena, &oracle, arrow);
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].kind, RootKind::ArrowBody);
    assert_eq!(roots[0].node, roots[0].expression);
}

#[test]
fn test_callback_chain_roots() {
    let bound = bind(
        "fetch(a).then(r => {\n\
         \x20   log(r);\n\
         \x20   fetch(b).then(log);\n\
         \x20   return fetch(c).then(log);\n\
         });",
    );
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let callback = nodes_of_kind(&bound.arena, syntax_kind_ext::ARROW_FUNCTION)[0];
    assert_eq!(callback_chain_roots(&bound.arena, &oracle, callback).len(), 2);
}

#[test]
fn test_is_inside_try_block() {
    let bound = bind(
        "function f() {\n\
         \x20   try {\n\
         \x20       fetch(a).then(log);\n\
         \x20   } catch (e) {\n\
         \x20       fetch(b).then(log);\n\
         \x20   }\n\
         }",
    );
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let func = first_function(&bound.arena);
    let roots = find_root_statements(&bound.arena, &oracle, func);
    assert_eq!(roots.len(), 2);
    assert!(is_inside_try_block(&bound.arena, roots[0].node, func));
    assert!(!is_inside_try_block(&bound.arena, roots[1].node, func));
}

#[test]
fn test_has_successor_for_then_catch() {
    let bound = bind("fetch(url).then(a).catch(b);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);

    let mut successors = HasSuccessorMap::new();
    successors.mark_chain(&bound.arena, &oracle, expr, false);

    let spine = chain_spine(&bound.arena, &oracle, expr);
    let flags: Vec<bool> = spine
        .iter()
        .filter(|(_, link)| !matches!(link, ChainLink::PropertyChain { .. }))
        .map(|&(idx, _)| successors.has_successor(idx))
        .collect();
    assert_eq!(flags, vec![false, false, true]);
    assert_eq!(successors.len(), 3);
}

#[test]
fn test_rejection_only_then_passes_value_through() {
    let bound = bind("fetch(url).then(null, onError).then(use);");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let expr = last_expression(&bound.arena);

    let mut successors = HasSuccessorMap::new();
    successors.mark_chain(&bound.arena, &oracle, expr, false);

    let spine = chain_spine(&bound.arena, &oracle, expr);
    let links: Vec<NodeIndex> = spine
        .iter()
        .filter(|(_, link)| !matches!(link, ChainLink::PropertyChain { .. }))
        .map(|&(idx, _)| idx)
        .collect();
    assert!(!successors.has_successor(links[0]));
    assert!(successors.has_successor(links[1]));
    assert!(successors.has_successor(links[2]));
}

#[test]
fn test_has_successor_never_lowers() {
    let mut successors = HasSuccessorMap::new();
    assert!(successors.is_empty());
    successors.raise(NodeIndex(7), true);
    successors.raise(NodeIndex(7), false);
    assert_eq!(successors.get(NodeIndex(7)), Some(true));
    successors.raise(NodeIndex(8), false);
    assert_eq!(successors.get(NodeIndex(8)), Some(false));
    assert!(!successors.has_successor(NodeIndex(9)));
}
