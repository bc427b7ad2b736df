use asyncify_common::diagnostics::{diagnostic_messages, format_message};
use asyncify_common::{DiagnosticCategory, LineMap, Position, TextSpan};

#[test]
fn test_line_map_simple() {
    let source = "line1\nline2\nline3";
    let map = LineMap::build(source);

    assert_eq!(map.line_count(), 3);
    assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
    assert_eq!(map.offset_to_position(4, source), Position::new(0, 4));
    assert_eq!(map.offset_to_position(6, source), Position::new(1, 0));
    assert_eq!(map.offset_to_position(12, source), Position::new(2, 0));
}

#[test]
fn test_line_map_windows_line_endings() {
    let source = "line1\r\nline2\r\nline3";
    let map = LineMap::build(source);

    assert_eq!(map.line_count(), 3);
    assert_eq!(map.offset_to_position(7, source), Position::new(1, 0));
    assert_eq!(map.line_start(2), Some(14));
}

#[test]
fn test_line_map_lone_carriage_return() {
    let source = "a\rb";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 2);
    assert_eq!(map.offset_to_position(2, source), Position::new(1, 0));
}

#[test]
fn test_position_to_offset_roundtrip() {
    let source = "const x = 1;\nlet y = 2;\nvar z = 3;";
    let map = LineMap::build(source);

    for offset in [0u32, 6, 13, 17, 24, 30] {
        let pos = map.offset_to_position(offset, source);
        assert_eq!(map.position_to_offset(pos, source), Some(offset));
    }
}

#[test]
fn test_line_offset_is_one_based() {
    let source = "function f() {\n    return 1;\n}";
    let map = LineMap::build(source);

    assert_eq!(map.offset_to_line_offset(0, source), (1, 1));
    assert_eq!(map.offset_to_line_offset(19, source), (2, 5));
    assert_eq!(map.line_offset_to_offset(2, 5, source), Some(19));
    assert_eq!(map.line_offset_to_offset(0, 1, source), None);
}

#[test]
fn test_text_span_contains_and_overlaps() {
    let span = TextSpan::from_bounds(10, 20);
    assert_eq!(span.length, 10);
    assert!(span.contains(10));
    assert!(span.contains(20));
    assert!(!span.contains(21));
    assert!(span.overlaps(&TextSpan::new(15, 10)));
    assert!(!span.overlaps(&TextSpan::new(20, 3)));
}

#[test]
fn test_suggestion_message() {
    let message = diagnostic_messages::THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION;
    assert_eq!(message.code, 80006);
    assert_eq!(message.category, DiagnosticCategory::Suggestion);
    assert_eq!(
        format_message(diagnostic_messages::TOKEN_EXPECTED.message, &[")"]),
        "')' expected."
    );
}
