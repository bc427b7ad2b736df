use super::*;
use crate::convert_to_async::chain_recognizer::find_root_statements;
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

fn first_of_kind(arena: &NodeArena, kind: u16) -> NodeIndex {
    (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| arena.get(idx).is_some_and(|n| n.kind == kind))
        .min_by_key(|&idx| arena.get(idx).map(|n| (n.pos, u32::MAX - n.end)))
        .expect("node of kind")
}

/// Name the bindings of the first function declaration in `bound`.
fn synthesize(bound: &Bound, oracle: &dyn TypeOracle) -> (SynthTable, NodeArena) {
    let func = first_of_kind(&bound.arena, syntax_kind_ext::FUNCTION_DECLARATION);
    let chains: Vec<NodeIndex> = find_root_statements(&bound.arena, oracle, func)
        .iter()
        .map(|root| root.expression)
        .collect();
    let mut clone = bound.arena.clone();
    let synthesizer = IdentifierSynthesizer::new(&bound.arena, &bound.binder, oracle);
    let mut table = synthesizer
        .synthesize(func, &chains, &mut clone)
        .expect("free names");
    for &chain in &chains {
        synthesizer.seed_write_counts(&clone, &mut table, chain);
    }
    (table, clone)
}

/// Key of the parameter named `name` of the `nth` callback arrow.
fn arrow_param_key(bound: &Bound, nth: usize) -> SynthKey {
    let mut arrows: Vec<NodeIndex> = (0..bound.arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| {
            bound
                .arena
                .get(idx)
                .is_some_and(|n| n.kind == syntax_kind_ext::ARROW_FUNCTION)
        })
        .collect();
    arrows.sort_by_key(|&idx| bound.arena.get(idx).map_or(0, |n| n.pos));
    let func = bound.arena.get(arrows[nth]).expect("arrow");
    let data = bound.arena.get_function(func).expect("function data");
    let param = bound.arena.get(data.parameters.nodes[0]).expect("parameter");
    let name = bound.arena.get_parameter(param).expect("parameter data").name;
    SynthKey::Param(bound.binder.get_node_symbol(name).expect("symbol"))
}

fn identifier_texts(arena: &NodeArena, pos: u32, end: u32) -> Vec<String> {
    let mut found: Vec<(u32, String)> = (0..arena.len() as u32)
        .map(NodeIndex)
        .filter_map(|idx| {
            let node = arena.get(idx)?;
            if node.pos < pos || node.end > end || node.end == node.pos {
                return None;
            }
            arena.identifier_text(idx).map(|text| (node.pos, text.to_string()))
        })
        .collect();
    found.sort();
    found.into_iter().map(|(_, text)| text).collect()
}

#[test]
fn test_reserve_adds_smallest_free_suffix() {
    let mut table = SynthTable::new();
    assert_eq!(table.reserve("result").as_deref(), Some("result"));
    assert_eq!(table.reserve("result").as_deref(), Some("result_1"));
    table.pin("result_2");
    assert_eq!(table.reserve("result").as_deref(), Some("result_3"));
    assert!(table.is_taken("result_2"));
    assert!(!table.is_taken("e"));
}

#[test]
fn test_write_bookkeeping() {
    let mut table = SynthTable::new();
    let key = SynthKey::Minted(NodeIndex(3));
    table.insert(key, "result".to_string());
    table.seed_uses(key, 0);
    assert_eq!(table.get(key).map(|entry| entry.remaining_uses), Some(1));
    table.seed_uses(key, 2);

    assert!(!table.mark_declared(key));
    assert!(table.mark_declared(key));
    assert_eq!(table.consume(key), 1);
    assert_eq!(table.consume(key), 0);
    assert_eq!(table.consume(key), 0);
    assert_eq!(table.consume(SynthKey::Minted(NodeIndex(4))), 0);
}

#[test]
fn test_callback_parameter_keeps_its_name() {
    let bound = bind("function f() {\n    return fetch(u).then(res => log(res));\n}");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let (table, _) = synthesize(&bound, &oracle);

    let key = arrow_param_key(&bound, 0);
    assert_eq!(table.name(key), Some("res"));
    assert_eq!(table.get(key).map(|entry| entry.remaining_uses), Some(1));
    assert!(table.is_taken("log"));
    assert!(table.is_taken("fetch"));
}

#[test]
fn test_colliding_parameters_are_renamed_in_clone() {
    let source = "function f() {\n    const res = 1;\n    return fetch(u).then(res => log(res));\n}";
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let (table, clone) = synthesize(&bound, &oracle);

    assert_eq!(table.name(arrow_param_key(&bound, 0)), Some("res_1"));

    let arrow = first_of_kind(&bound.arena, syntax_kind_ext::ARROW_FUNCTION);
    let span = bound.arena.get(arrow).expect("arrow");
    assert_eq!(
        identifier_texts(&clone, span.pos, span.end),
        vec!["res_1", "log", "res_1"]
    );
    // The source arena is untouched.
    assert_eq!(
        identifier_texts(&bound.arena, span.pos, span.end),
        vec!["res", "log", "res"]
    );
}

#[test]
fn test_shorthand_property_keeps_its_key() {
    let source = "function f() {\n    const x = 0;\n    return fetch(u).then(x => ({ x }));\n}";
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let (_, clone) = synthesize(&bound, &oracle);

    let object = first_of_kind(&clone, syntax_kind_ext::OBJECT_LITERAL_EXPRESSION);
    let span = bound.arena.get(object).expect("object");
    assert_eq!(identifier_texts(&clone, span.pos, span.end), vec!["x", "x_1"]);
}

#[test]
fn test_outer_names_are_never_reused() {
    let source = "const data = 1;\n\
                  function f() {\n    log(data);\n    return fetch(u).then(handle);\n}\n\
                  function handle(data) {}";
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let (table, _) = synthesize(&bound, &oracle);

    let handle = (0..bound.arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| bound.arena.identifier_text(idx) == Some("handle"))
        .min_by_key(|&idx| bound.arena.get(idx).map_or(0, |n| n.pos))
        .expect("handle reference");
    assert_eq!(table.name(SynthKey::Minted(handle)), Some("data_1"));
}

#[test]
fn test_rejection_without_parameter_is_minted() {
    let bound = bind("function f() {\n    return fetch(u).catch(() => log());\n}");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let (table, _) = synthesize(&bound, &oracle);

    let arrow = first_of_kind(&bound.arena, syntax_kind_ext::ARROW_FUNCTION);
    assert_eq!(table.name(SynthKey::Minted(arrow)), Some("e"));
}

#[test]
fn test_unread_underscore_needs_no_binding() {
    let bound = bind("function f() {\n    return fetch(u).then(_ => log());\n}");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let arrow = first_of_kind(&bound.arena, syntax_kind_ext::ARROW_FUNCTION);
    assert_eq!(
        fulfillment_binding(&bound.arena, &bound.binder, Callback::Literal(arrow)),
        Ok(None)
    );
    let (table, _) = synthesize(&bound, &oracle);
    assert!(table.is_empty());
}

#[test]
fn test_unsupported_parameter_shapes() {
    let bound = bind(
        "fetch(u).then(({ a }) => a);\n\
         fetch(u).then((a, b) => a);\n\
         fetch(u).then((...a) => a);\n\
         fetch(u).then((a = 1) => a);",
    );
    let arrows: Vec<NodeIndex> = (0..bound.arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| {
            bound
                .arena
                .get(idx)
                .is_some_and(|n| n.kind == syntax_kind_ext::ARROW_FUNCTION)
        })
        .collect();
    assert_eq!(arrows.len(), 4);
    for arrow in arrows {
        assert_eq!(
            fulfillment_binding(&bound.arena, &bound.binder, Callback::Literal(arrow)),
            Err(Unsupported)
        );
    }
    assert_eq!(
        rejection_binding(&bound.arena, &bound.binder, Callback::Absent),
        Err(Unsupported)
    );
}

#[test]
fn test_value_written_on_both_paths_is_seeded_twice() {
    let bound = bind("function f() {\n    return fetch(u).catch(log).then(x => x);\n}");
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let (table, _) = synthesize(&bound, &oracle);

    let key = arrow_param_key(&bound, 0);
    assert_eq!(table.get(key).map(|entry| entry.remaining_uses), Some(2));
}

#[test]
fn test_nested_chain_handlers_are_named() {
    let source = "function f() {\n    \
                  return fetch(a).then(r => fetch(b).then(r => r));\n}";
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let (table, _) = synthesize(&bound, &oracle);

    assert_eq!(table.name(arrow_param_key(&bound, 0)), Some("r"));
    assert_eq!(table.name(arrow_param_key(&bound, 1)), Some("r_1"));
}
