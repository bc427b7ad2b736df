use asyncify_checker::OracleOptions;
use asyncify_emitter::PrintOptions;
use asyncify_lsp::{CodeFixPosition, ConvertToAsyncCodeFix, apply_text_changes};

const TWO_FUNCTIONS: &str = "function first() {\n    return fetch(a).then(r => r.json());\n}\n\nfunction second(): Promise<void> {\n    fetch(b).then(() => done());\n}\n";

#[test]
fn test_code_action_at_position() {
    let source = "function f() {\n    return fetch(u).then(r => r.json());\n}";
    let fix = ConvertToAsyncCodeFix::default();
    let actions = fix.get_code_actions("a.ts", source, 20);
    assert_eq!(actions.len(), 1);

    let action = &actions[0];
    assert_eq!(action.fix_name, "convertToAsyncFunction");
    assert_eq!(action.description, "Convert to async function");
    assert_eq!(action.fix_id.as_deref(), Some("convertToAsyncFunction"));
    assert_eq!(
        action.fix_all_description.as_deref(),
        Some("Convert all to async functions")
    );
    assert_eq!(action.changes.len(), 1);
    assert_eq!(action.changes[0].file_name, "a.ts");

    let changes = &action.changes[0].text_changes;
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].start, CodeFixPosition { line: 1, offset: 1 });
    assert_eq!(changes[0].new_text, "async ");
    assert_eq!(changes[1].start, CodeFixPosition { line: 2, offset: 5 });
    assert_eq!(changes[1].end, CodeFixPosition { line: 2, offset: 41 });
    assert_eq!(
        changes[1].new_text,
        "const r = await fetch(u);\n    return r.json();"
    );
}

#[test]
fn test_no_code_action_outside_convertible_function() {
    let source = "const x = 1;\nfunction f() {\n    return fetch(u).then(r => r.json());\n}";
    let fix = ConvertToAsyncCodeFix::default();
    assert!(fix.get_code_actions("a.ts", source, 3).is_empty());
}

#[test]
fn test_parse_errors_produce_nothing() {
    let source = "function f( {\n    return fetch(u).then(r => r.json());\n";
    let fix = ConvertToAsyncCodeFix::default();
    assert!(fix.get_suggestions("a.ts", source).is_empty());
    assert!(fix.get_code_actions("a.ts", source, 20).is_empty());
    assert!(fix.get_all_code_actions("a.ts", source).is_empty());
}

#[test]
fn test_suggestions_for_every_function() {
    let fix = ConvertToAsyncCodeFix::default();
    let suggestions = fix.get_suggestions("a.ts", TWO_FUNCTIONS);
    let names: Vec<&str> = suggestions
        .iter()
        .map(|d| &TWO_FUNCTIONS[d.start as usize..(d.start + d.length) as usize])
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn test_fix_all_converts_every_function() {
    let fix = ConvertToAsyncCodeFix::default();
    let conversions = fix.all_conversions("a.ts", TWO_FUNCTIONS);
    assert_eq!(conversions.len(), 2);

    let edits: Vec<_> = conversions.iter().flat_map(|c| c.edits()).collect();
    assert_eq!(
        apply_text_changes(TWO_FUNCTIONS, &edits),
        "async function first() {\n    const r = await fetch(a);\n    return r.json();\n}\n\nasync function second(): Promise<void> {\n    await fetch(b);\n    done();\n}\n"
    );
    assert_eq!(fix.get_all_code_actions("a.ts", TWO_FUNCTIONS).len(), 2);
}

#[test]
fn test_fix_all_skips_overlapping_conversions() {
    let source = "function outer() {\n    return fetch(a).then(r => {\n        const g = () => fetch(b).then(y => y);\n        return g();\n    });\n}";
    let fix = ConvertToAsyncCodeFix::default();
    assert_eq!(fix.get_suggestions("a.ts", source).len(), 2);

    let conversions = fix.all_conversions("a.ts", source);
    assert_eq!(conversions.len(), 1);
    assert_eq!(
        apply_text_changes(source, &conversions[0].edits()),
        "async function outer() {\n    const r = await fetch(a);\n    const g = () => fetch(b).then(y => y);\n    return g();\n}"
    );
}

#[test]
fn test_custom_oracle_options() {
    let source = "function f() {\n    return request(u).then(r => r.body);\n}";
    let default_fix = ConvertToAsyncCodeFix::default();
    assert!(default_fix.get_suggestions("a.ts", source).is_empty());

    let options = OracleOptions::from_json5_str("{ promiseGlobals: ['request'] }").expect("options");
    let fix = ConvertToAsyncCodeFix::new(options, PrintOptions::default());
    assert_eq!(fix.oracle_options().promise_globals, vec!["request".to_string()]);
    assert_eq!(fix.get_suggestions("a.ts", source).len(), 1);
}

#[test]
fn test_print_options_control_indentation() {
    let source = "function f() {\n  return fetch(u).then(r => {\n    log(r);\n    return r.ok;\n  }).catch(() => false);\n}";
    let print_options = PrintOptions {
        indent_size: 2,
        ..PrintOptions::default()
    };
    let fix = ConvertToAsyncCodeFix::new(OracleOptions::default(), print_options);
    let edits = fix.conversion_at("a.ts", source, 20);
    assert_eq!(
        apply_text_changes(source, &edits),
        "async function f() {\n  try {\n    const r = await fetch(u);\n    log(r);\n    return r.ok;\n  } catch (e) {\n    return false;\n  }\n}"
    );
}

#[test]
fn test_code_fix_serializes_in_tsserver_shape() {
    let source = "function f() {\n    return fetch(u).then(r => r.json());\n}";
    let fix = ConvertToAsyncCodeFix::default();
    let actions = fix.get_code_actions("a.ts", source, 20);
    let json = serde_json::to_value(&actions).expect("serialize");
    assert_eq!(json[0]["fixName"], "convertToAsyncFunction");
    assert_eq!(json[0]["fixId"], "convertToAsyncFunction");
    assert_eq!(json[0]["changes"][0]["textChanges"][0]["start"]["line"], 1);
    assert_eq!(json[0]["changes"][0]["textChanges"][0]["newText"], "async ");
}
