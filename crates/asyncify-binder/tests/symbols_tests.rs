use asyncify_binder::{BinderState, symbol_flags};
use asyncify_parser::{NodeArena, NodeIndex, ParserState};

fn bind(source: &str) -> (NodeArena, BinderState) {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    assert!(parser.get_diagnostics().is_empty(), "unexpected parse errors");
    let arena = parser.into_arena();
    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, root);
    (arena, binder)
}

/// Identifier nodes spelled `name`, in source order.
fn identifiers(arena: &NodeArena, name: &str) -> Vec<NodeIndex> {
    let mut found: Vec<(u32, NodeIndex)> = (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| arena.identifier_text(idx) == Some(name))
        .filter_map(|idx| arena.get(idx).map(|n| (n.pos, idx)))
        .collect();
    found.sort();
    found.into_iter().map(|(_, idx)| idx).collect()
}

#[test]
fn test_declaration_kinds() {
    let source = "var a = 1;\nlet b = 2;\nconst c = 3;\nfunction d(e) {}\nclass F {}\n";
    let (arena, binder) = bind(source);

    let flags_of = |name: &str| {
        let idx = identifiers(&arena, name)[0];
        binder.symbol_of_node(idx).expect("symbol").flags
    };
    assert_eq!(flags_of("a"), symbol_flags::FUNCTION_SCOPED_VARIABLE);
    assert_eq!(flags_of("b"), symbol_flags::BLOCK_SCOPED_VARIABLE);
    assert_eq!(
        flags_of("c"),
        symbol_flags::BLOCK_SCOPED_VARIABLE | symbol_flags::CONST
    );
    assert_eq!(flags_of("d"), symbol_flags::FUNCTION);
    assert_eq!(flags_of("e"), symbol_flags::PARAMETER);
    assert_eq!(flags_of("F"), symbol_flags::CLASS);
}

#[test]
fn test_references_resolve_to_declaration() {
    let source = "const x = 1;\nfoo(x, x + 1);\n";
    let (arena, binder) = bind(source);

    let xs = identifiers(&arena, "x");
    assert_eq!(xs.len(), 3);
    let sym = binder.get_node_symbol(xs[0]).expect("declared");
    assert_eq!(binder.references_of(sym), &[xs[1], xs[2]]);
    assert_eq!(binder.get_symbol(sym).map(|s| s.name_node), Some(xs[0]));
}

#[test]
fn test_unresolved_globals() {
    let source = "fetch(url).then(res => res.json());\n";
    let (arena, binder) = bind(source);

    let fetch = identifiers(&arena, "fetch")[0];
    assert!(binder.is_unresolved(fetch));
    assert!(binder.has_unresolved_name("url"));
    assert!(!binder.has_unresolved_name("res"));
    // Property names are never references.
    assert!(!binder.has_unresolved_name("then"));
    assert!(!binder.has_unresolved_name("json"));
}

#[test]
fn test_property_keys_are_not_references() {
    let source = "const a = 1;\nconst o = { a: 2, [a]: 3, a };\nclass K { a = 1; a2() { return this.a; } }\n";
    let (arena, binder) = bind(source);

    let a_nodes = identifiers(&arena, "a");
    let sym = binder.get_node_symbol(a_nodes[0]).expect("declared");
    // Computed key and shorthand value refer to the binding.
    assert_eq!(binder.references_of(sym).len(), 2);
    assert!(!binder.has_unresolved_name("a"));
    assert!(!binder.has_unresolved_name("a2"));
}

#[test]
fn test_destructured_names_are_declared() {
    let source = "const { a, b: [c, d = a], ...rest } = obj;\nuse(a, c, d, rest);\n";
    let (arena, binder) = bind(source);

    for name in ["a", "c", "d", "rest"] {
        let nodes = identifiers(&arena, name);
        let sym = binder.get_node_symbol(nodes[0]).expect(name);
        assert!(!binder.references_of(sym).is_empty(), "{name} unused");
    }
    // `b` is a property key.
    assert!(identifiers(&arena, "b").iter().all(|&n| binder.get_node_symbol(n).is_none()));
    assert!(binder.has_unresolved_name("obj"));
}

#[test]
fn test_symbols_declared_in_range() {
    let source = "const outer = 1;\nfunction f() {\n    const inner = 2;\n    return inner;\n}\n";
    let (arena, binder) = bind(source);

    let f_start = source.find("function").expect("function") as u32;
    let declared = binder.symbols_declared_in(&arena, f_start, source.len() as u32);
    let names: Vec<&str> = declared
        .iter()
        .filter_map(|&id| binder.get_symbol(id))
        .map(|s| s.escaped_name.as_str())
        .collect();
    assert_eq!(names, vec!["f", "inner"]);
}
