use super::*;
use crate::convert_to_async::chain_recognizer::{find_root_statements, is_inside_try_block};
use crate::convert_to_async::{ChainGluer, IdentifierSynthesizer, terminal_sink};
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

fn first_function(arena: &NodeArena) -> NodeIndex {
    (0..arena.len() as u32)
        .map(NodeIndex)
        .filter(|&idx| {
            arena
                .get(idx)
                .is_some_and(|n| n.kind == syntax_kind_ext::FUNCTION_DECLARATION)
        })
        .min_by_key(|&idx| arena.get(idx).map(|n| n.pos))
        .expect("function declaration")
}

/// Rewrite every chain of the first function declaration and print each
/// root's statements.
fn rewrite_function(source: &str) -> Vec<(bool, String)> {
    let bound = bind(source);
    let oracle = PromiseTypeOracle::new(&bound.arena, &bound.binder, &bound.options);
    let func = first_function(&bound.arena);
    let roots = find_root_statements(&bound.arena, &oracle, func);

    let mut clone = bound.arena.clone();
    let groups = ChainGluer::new(&bound.binder, &oracle).glue(&mut clone, &roots);
    let chains: Vec<NodeIndex> = groups.iter().map(|group| group.chain).collect();

    let synthesizer = IdentifierSynthesizer::new(&bound.arena, &bound.binder, &oracle);
    let mut names = synthesizer
        .synthesize(func, &chains, &mut clone)
        .expect("free names");
    let mut successors = HasSuccessorMap::new();
    for &chain in &chains {
        synthesizer.seed_write_counts(&clone, &mut names, chain);
        successors.mark_chain(&clone, &oracle, chain, false);
    }

    let mut printed = Vec::new();
    for group in &groups {
        synthesizer.bind_result(&clone, &mut names, group);
        let terminal = terminal_sink(group);
        let in_try = is_inside_try_block(&bound.arena, group.root(), func);
        let mut rewrite =
            Rewriter::new(&mut clone, &oracle, &bound.binder, &mut names, &mut successors)
                .inside_try(in_try)
                .rewrite_root(group.chain, terminal);
        if group.result.is_some() {
            rewrite.statements.push(group.root());
        }
        let text = Printer::new(&clone, PrintOptions::default()).print_statements(&rewrite.statements);
        printed.push((rewrite.verbatim, text));
    }
    printed
}

fn rewrite_one(source: &str) -> String {
    let mut printed = rewrite_function(source);
    assert_eq!(printed.len(), 1, "expected one chain in {source:?}");
    let (verbatim, text) = printed.remove(0);
    assert!(!verbatim, "chain kept as written: {text}");
    text
}

#[test]
fn test_then_with_arrow() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(res => console.log(res));\n}",
    );
    assert_eq!(text, "const res = await fetch(u);\nreturn console.log(res);");
}

#[test]
fn test_then_catch() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(res => res.json()).catch(err => console.error(err));\n}",
    );
    assert_eq!(
        text,
        "try {\n    const res = await fetch(u);\n    return await res.json();\n} catch (err) {\n    return console.error(err);\n}"
    );
}

#[test]
fn test_then_with_both_handlers_feeding_a_successor() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(r => r.ok, e => false).then(ok => log(ok));\n}",
    );
    assert_eq!(
        text,
        "let ok;\ntry {\n    const r = await fetch(u);\n    ok = r.ok;\n} catch (e) {\n    ok = false;\n}\nreturn log(ok);"
    );
}

#[test]
fn test_named_handler_gets_minted_argument() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(handle);\n}\nfunction handle(data) {}",
    );
    assert_eq!(text, "const data = await fetch(u);\nreturn handle(data);");
}

#[test]
fn test_expression_statement_discards_value() {
    let text = rewrite_one("function f() {\n    fetch(u).then(() => log());\n}");
    assert_eq!(text, "await fetch(u);\nlog();");
}

#[test]
fn test_block_body_statements_are_inlined() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(r => {\n        log(r);\n        return r.json();\n    });\n}",
    );
    assert_eq!(text, "const r = await fetch(u);\nlog(r);\nreturn r.json();");
}

#[test]
fn test_nested_return_keeps_link_as_written() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(r => {\n        if (r.ok) {\n            return 1;\n        }\n        return 2;\n    }).then(x => log(x));\n}",
    );
    assert!(text.starts_with("const x = await fetch(u).then(r => {"), "{text}");
    assert!(text.ends_with("\nreturn log(x);"), "{text}");
}

#[test]
fn test_finally_is_awaited_as_written() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).finally(done).then(x => log(x));\n}",
    );
    assert_eq!(text, "const x = await fetch(u).finally(done);\nreturn log(x);");
}

#[test]
fn test_function_expression_using_this_is_kept() {
    let printed = rewrite_function(
        "function f() {\n    return fetch(u).then(function (r) { return this.x; });\n}",
    );
    assert_eq!(printed.len(), 1);
    assert!(printed[0].0);
    assert!(printed[0].1.starts_with("return fetch(u).then(function"), "{}", printed[0].1);
}

#[test]
fn test_chain_inside_user_try_awaits_returns() {
    let text = rewrite_one(
        "function f() {\n    try {\n        return fetch(u).then(r => r.json());\n    } catch (e) {\n        log(e);\n    }\n}",
    );
    assert_eq!(text, "const r = await fetch(u);\nreturn await r.json();");
}

#[test]
fn test_nested_return_inside_generated_try_is_awaited() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(r => {\n        if (r.ok) {\n            return r.json();\n        }\n        return null;\n    }).catch(e => 0);\n}",
    );
    assert_eq!(
        text,
        "try {\n    const r = await fetch(u);\n    if (r.ok) {\n        return await r.json();\n    }\n    return null;\n} catch (e) {\n    return 0;\n}"
    );
}

#[test]
fn test_nested_non_promise_return_inside_try_is_unchanged() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(r => {\n        if (r.ok) {\n            return r.status;\n        }\n        return null;\n    }).catch(e => 0);\n}",
    );
    assert!(text.contains("    if (r.ok) {\n        return r.status;\n    }"), "{text}");
}

#[test]
fn test_awaited_nested_return_is_undone_when_link_is_kept() {
    let mut printed = rewrite_function(
        "function f() {\n    return fetch(u).then(r => {\n        if (r.ok) {\n            return r.json();\n        }\n        return null;\n    }, async e => 0);\n}",
    );
    let (verbatim, text) = printed.remove(0);
    assert!(verbatim);
    assert!(text.contains("return r.json();"), "{text}");
    assert!(!text.contains("await r.json()"), "{text}");
}

#[test]
fn test_consecutive_catches_nest() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).catch(a => 1).catch(b => 2);\n}",
    );
    assert_eq!(
        text,
        "try {\n    try {\n        return await fetch(u);\n    } catch (a) {\n        return 1;\n    }\n} catch (b) {\n    return 2;\n}"
    );
}

#[test]
fn test_promise_all_receiver() {
    let text = rewrite_one(
        "function f() {\n    return Promise.all([fetch(a), fetch(b)]).then(results => log(results));\n}",
    );
    assert_eq!(
        text,
        "const results = await Promise.all([fetch(a), fetch(b)]);\nreturn log(results);"
    );
}

#[test]
fn test_nested_chain_in_handler() {
    let text = rewrite_one(
        "function f() {\n    return fetch(a).then(r => fetch(r.url).then(s => s.json()));\n}",
    );
    assert_eq!(
        text,
        "const r = await fetch(a);\nconst s = await fetch(r.url);\nreturn s.json();"
    );
}

#[test]
fn test_handler_without_return_binds_undefined() {
    let text = rewrite_one(
        "function f() {\n    return fetch(u).then(r => { log(r); }).then(x => use(x));\n}",
    );
    assert_eq!(
        text,
        "const r = await fetch(u);\nlog(r);\nconst x = undefined;\nreturn use(x);"
    );
}

#[test]
fn test_contains_return_ignores_nested_functions() {
    let bound = bind("function g() {\n    items.forEach(i => { return i; });\n    if (a) { return 1; }\n}");
    let func = first_function(&bound.arena);
    let body = bound
        .arena
        .get_function(bound.arena.get(func).expect("function"))
        .expect("function data")
        .body;
    let statements = bound.arena.get_statements(body).expect("statements").nodes.clone();
    assert!(!contains_return(&bound.arena, statements[0]));
    assert!(contains_return(&bound.arena, statements[1]));
}
