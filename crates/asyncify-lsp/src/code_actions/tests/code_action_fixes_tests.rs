use super::*;

#[test]
fn test_registry_knows_convert_to_async() {
    let fixes = CodeFixRegistry::fixes_for_error_code(
        diagnostic_codes::THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION,
    );
    assert_eq!(
        fixes,
        vec![(
            "convertToAsyncFunction",
            "convertToAsyncFunction",
            "Convert to async function",
            "Convert all to async functions",
        )]
    );
    assert!(CodeFixRegistry::fixes_for_error_code(2304).is_empty());
    assert_eq!(CodeFixRegistry::supported_error_codes(), vec![80006]);
}

#[test]
fn test_apply_text_changes_in_any_order() {
    let source = "function f() {\n    return p.then(g);\n}";
    let edits = vec![
        TextEdit::replace(19, 36, "const x = await p;\n    return g(x);"),
        TextEdit::insert(0, "async "),
    ];
    assert_eq!(
        apply_text_changes(source, &edits),
        "async function f() {\n    const x = await p;\n    return g(x);\n}"
    );
}

#[test]
fn test_apply_text_changes_skips_invalid_ranges() {
    let source = "héllo";
    let edits = vec![
        TextEdit::replace(2, 3, "x"),
        TextEdit::replace(4, 40, "y"),
        TextEdit::insert(0, ">"),
    ];
    assert_eq!(apply_text_changes(source, &edits), ">héllo");
    assert_eq!(apply_text_changes(source, &[]), source);
}

#[test]
fn test_text_change_positions_are_one_based() {
    let source = "ab\ncd\n";
    let line_map = LineMap::build(source);
    let change = CodeFixTextChange::from_edit(&TextEdit::replace(3, 5, "xy"), &line_map, source);
    assert_eq!(change.start, CodeFixPosition { line: 2, offset: 1 });
    assert_eq!(change.end, CodeFixPosition { line: 2, offset: 3 });
    assert_eq!(change.new_text, "xy");
}

#[test]
fn test_code_fix_info_serialization() {
    let info = CodeFixInfo {
        fix_name: "convertToAsyncFunction".to_string(),
        description: "Convert to async function".to_string(),
        changes: vec![CodeFixFileChange {
            file_name: "a.ts".to_string(),
            text_changes: vec![CodeFixTextChange {
                start: CodeFixPosition { line: 1, offset: 1 },
                end: CodeFixPosition { line: 1, offset: 1 },
                new_text: "async ".to_string(),
            }],
        }],
        commands: Vec::new(),
        fix_id: None,
        fix_all_description: None,
    };
    let json = serde_json::to_value(&info).expect("serialize");
    assert_eq!(json["fixName"], "convertToAsyncFunction");
    assert_eq!(json["changes"][0]["fileName"], "a.ts");
    assert_eq!(json["changes"][0]["textChanges"][0]["newText"], "async ");
    assert_eq!(json["changes"][0]["textChanges"][0]["start"]["offset"], 1);
    assert!(json.get("fixId").is_none());
    assert!(json.get("fixAllDescription").is_none());
}
