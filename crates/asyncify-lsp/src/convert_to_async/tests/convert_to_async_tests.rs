use super::*;
use crate::ParsedSource;
use crate::code_actions::apply_text_changes;
use asyncify_checker::{OracleOptions, PromiseTypeOracle};

/// Convert the outermost convertible function of `source`.
fn converted(source: &str) -> Option<String> {
    let parsed = ParsedSource::parse("test.ts", source);
    assert!(!parsed.has_parse_errors(), "parse errors in {source:?}");
    let options = OracleOptions::default();
    let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &options);
    let converter = ConvertToAsync::new(&parsed.arena, &parsed.binder, &oracle, source);
    let func = *converter.convertible_functions().first()?;
    let conversion = converter.convert_function(func)?;
    Some(apply_text_changes(source, &conversion.edits()))
}

fn function_kinds_at(source: &str, positions: &[u32]) -> Vec<Option<u16>> {
    let parsed = ParsedSource::parse("test.ts", source);
    let options = OracleOptions::default();
    let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &options);
    let converter = ConvertToAsync::new(&parsed.arena, &parsed.binder, &oracle, source);
    positions
        .iter()
        .map(|&pos| {
            converter
                .find_function_at(pos)
                .and_then(|idx| parsed.arena.get(idx))
                .map(|node| node.kind)
        })
        .collect()
}

#[test]
fn test_convert_function_declaration() {
    let source = "function f(): Promise<void> {\n    return fetch(\"https://typescriptlang.org\").then(res => console.log(res));\n}";
    assert_eq!(
        converted(source).as_deref(),
        Some(
            "async function f(): Promise<void> {\n    const res = await fetch(\"https://typescriptlang.org\");\n    return console.log(res);\n}"
        )
    );
}

#[test]
fn test_convert_arrow_expression_body() {
    let source = "const f = () => fetch(u).then(r => r.json());";
    assert_eq!(
        converted(source).as_deref(),
        Some("const f = async () => {\n    const r = await fetch(u);\n    return r.json();\n};")
    );
}

#[test]
fn test_convert_method_keeps_indentation() {
    let source = "class C {\n    load() {\n        return fetch(u).then(r => r.json());\n    }\n}";
    assert_eq!(
        converted(source).as_deref(),
        Some(
            "class C {\n    async load() {\n        const r = await fetch(u);\n        return r.json();\n    }\n}"
        )
    );
}

#[test]
fn test_convert_glued_chain() {
    let source = "function f() {\n    const p = fetch(u);\n    return p.then(r => r.json());\n}";
    assert_eq!(
        converted(source).as_deref(),
        Some("async function f() {\n    const r = await fetch(u);\n    return r.json();\n}")
    );
}

#[test]
fn test_untouched_statements_keep_their_text() {
    let source = "function f() {\n    // keep me\n    let   x =  1;\n    fetch(u).then(() => log(x));\n}";
    assert_eq!(
        converted(source).as_deref(),
        Some("async function f() {\n    // keep me\n    let   x =  1;\n    await fetch(u);\n    log(x);\n}")
    );
}

#[test]
fn test_already_async_function_gets_no_marker() {
    let source = "async function f() {\n    return fetch(u).then(r => r.json());\n}";
    let parsed = ParsedSource::parse("test.ts", source);
    let options = OracleOptions::default();
    let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &options);
    let converter = ConvertToAsync::new(&parsed.arena, &parsed.binder, &oracle, source);
    let func = converter.convertible_functions()[0];
    let conversion = converter.convert_function(func).expect("conversion");
    assert_eq!(conversion.async_marker, None);
    assert_eq!(conversion.statement_edits.len(), 1);
    assert_eq!(
        apply_text_changes(source, &conversion.edits()),
        "async function f() {\n    const r = await fetch(u);\n    return r.json();\n}"
    );
}

#[test]
fn test_no_conversion_without_chain() {
    assert_eq!(converted("function f() {\n    return fetch(u);\n}"), None);
    assert_eq!(converted("function f() {\n    return 1;\n}"), None);
}

#[test]
fn test_generators_are_not_convertible() {
    assert_eq!(
        converted("function* g() {\n    yield fetch(u).then(x => x);\n    return fetch(u).then(x => x);\n}"),
        None
    );
}

#[test]
fn test_all_chains_kept_as_written_is_no_conversion() {
    let source = "function f() {\n    return fetch(u).then(function (r) { return this.x; });\n}";
    assert_eq!(converted(source), None);
}

#[test]
fn test_find_function_at_prefers_innermost() {
    let source = "function outer() {\n    const inner = () => fetch(a).then(x => x);\n    return fetch(b).then(y => y);\n}";
    let inner_pos = source.find("fetch(a)").expect("inner") as u32;
    let outer_pos = source.find("fetch(b)").expect("outer") as u32;
    assert_eq!(
        function_kinds_at(source, &[inner_pos, outer_pos, source.len() as u32 + 5]),
        vec![
            Some(syntax_kind_ext::ARROW_FUNCTION),
            Some(syntax_kind_ext::FUNCTION_DECLARATION),
            None,
        ]
    );
}

#[test]
fn test_convertible_functions_are_outer_first() {
    let source = "function outer() {\n    const inner = () => fetch(a).then(x => x);\n    return fetch(b).then(y => y);\n}\nfunction plain() {\n    return 1;\n}";
    let parsed = ParsedSource::parse("test.ts", source);
    let options = OracleOptions::default();
    let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &options);
    let converter = ConvertToAsync::new(&parsed.arena, &parsed.binder, &oracle, source);
    let kinds: Vec<u16> = converter
        .convertible_functions()
        .iter()
        .filter_map(|&idx| parsed.arena.get(idx).map(|n| n.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![syntax_kind_ext::FUNCTION_DECLARATION, syntax_kind_ext::ARROW_FUNCTION]
    );
}

#[test]
fn test_conversion_span_covers_every_edit() {
    let conversion = FunctionConversion {
        function: NodeIndex(1),
        statement_edits: vec![TextEdit::replace(20, 40, "x"), TextEdit::replace(50, 60, "y")],
        async_marker: Some(TextEdit::insert(0, "async ")),
    };
    let starts: Vec<u32> = conversion.edits().iter().map(|e| e.span.start).collect();
    assert_eq!(starts, vec![0, 20, 50]);
    assert_eq!(conversion.span(), TextSpan::from_bounds(0, 60));
}

#[test]
fn test_functions_are_found_by_name() {
    let source = "function load() {\n    return fetch(a).then(x => x);\n}\nconst save = () => fetch(b).then(y => y);\nconst api = { remove: function () { return fetch(c).then(z => z); } };";
    let parsed = ParsedSource::parse("test.ts", source);
    let options = OracleOptions::default();
    let oracle = PromiseTypeOracle::new(&parsed.arena, &parsed.binder, &options);
    let converter = ConvertToAsync::new(&parsed.arena, &parsed.binder, &oracle, source);

    let names: Vec<Option<&str>> = converter
        .convertible_functions()
        .into_iter()
        .map(|func| converter.function_name(func))
        .collect();
    assert_eq!(names, vec![Some("load"), Some("save"), Some("remove")]);

    let save = converter.find_function_named("save").expect("save");
    assert_eq!(
        parsed.arena.get(save).map(|n| n.kind),
        Some(syntax_kind_ext::ARROW_FUNCTION)
    );
    assert_eq!(converter.find_function_named("missing"), None);
}
